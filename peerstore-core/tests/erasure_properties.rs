//! Property-based tests for the streamed erasure coder
//!
//! 1. encode -> verify holds for every layout and payload
//! 2. any subset of up to m absent shards reconstructs bit-exactly
//! 3. m + 1 absent shards is always reported as data loss

use peerstore_core::erasure::{ErasureCoder, ShardLayout};
use peerstore_core::StoreError;
use proptest::prelude::*;
use std::io::Cursor;

type Shard = Cursor<Vec<u8>>;

fn layout_strategy() -> impl Strategy<Value = (usize, usize)> {
    (1usize..=6, 1usize..=3)
}

fn data_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..5000)
}

/// Layout plus a set of absent shard indices no larger than `extra + m`
fn loss_strategy(extra: usize) -> impl Strategy<Value = (usize, usize, Vec<usize>)> {
    layout_strategy().prop_flat_map(move |(k, m)| {
        let total = k + m;
        let lost = (m + extra).min(total);
        (
            Just(k),
            Just(m),
            prop::sample::subsequence((0..total).collect::<Vec<_>>(), lost..=lost),
        )
    })
}

fn encode(k: usize, m: usize, payload: &[u8]) -> (ErasureCoder, Vec<Shard>, Vec<Shard>) {
    let coder = ErasureCoder::with_strategy(move |_| ShardLayout::new(k, m));
    let mut data: Vec<Shard> = (0..k).map(|_| Cursor::new(Vec::new())).collect();
    let mut parity: Vec<Shard> = (0..m).map(|_| Cursor::new(Vec::new())).collect();
    coder
        .encode(
            &mut [Cursor::new(payload)],
            payload.len() as u64,
            &mut data,
            &mut parity,
        )
        .unwrap();
    (coder, data, parity)
}

fn drop_slots(
    data: Vec<Shard>,
    parity: Vec<Shard>,
    lost: &[usize],
) -> (Vec<Option<Shard>>, Vec<Option<Shard>>) {
    let k = data.len();
    let mut data: Vec<Option<Shard>> = data.into_iter().map(Some).collect();
    let mut parity: Vec<Option<Shard>> = parity.into_iter().map(Some).collect();
    for &i in lost {
        if i < k {
            data[i] = None;
        } else {
            parity[i - k] = None;
        }
    }
    (data, parity)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_encode_then_verify((k, m) in layout_strategy(), payload in data_strategy()) {
        let (coder, data, parity) = encode(k, m, &payload);

        let mut joined: Vec<u8> = data.iter().flat_map(|s| s.get_ref().clone()).collect();
        joined.truncate(payload.len());
        prop_assert_eq!(&joined, &payload);

        let (mut data, mut parity) = drop_slots(data, parity, &[]);
        prop_assert!(coder.verify(&mut data, &mut parity).unwrap());
    }

    #[test]
    fn prop_reconstruct_up_to_parity((k, m, lost) in loss_strategy(0), payload in data_strategy()) {
        let (coder, data, parity) = encode(k, m, &payload);
        let originals: Vec<Vec<u8>> = data
            .iter()
            .chain(parity.iter())
            .map(|s| s.get_ref().clone())
            .collect();

        let (mut data, mut parity) = drop_slots(data, parity, &lost);
        let mut targets: Vec<Option<Shard>> = vec![None; k + m];
        for &i in &lost {
            targets[i] = Some(Cursor::new(Vec::new()));
        }

        coder.reconstruct(&mut data, &mut parity, &mut targets).unwrap();

        for &i in &lost {
            prop_assert_eq!(targets[i].as_ref().unwrap().get_ref(), &originals[i]);
        }
    }

    #[test]
    fn prop_one_loss_too_many((k, m, lost) in loss_strategy(1), payload in data_strategy()) {
        prop_assume!(lost.len() > m);
        let (coder, data, parity) = encode(k, m, &payload);

        let (mut data, mut parity) = drop_slots(data, parity, &lost);
        let mut targets: Vec<Option<Shard>> = vec![None; k + m];
        let result = coder.reconstruct(&mut data, &mut parity, &mut targets);
        prop_assert!(matches!(result, Err(StoreError::Unrecoverable { .. })), "expected Unrecoverable, got {:?}", result);
    }
}
