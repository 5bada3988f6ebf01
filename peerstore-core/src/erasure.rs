//! Reed-Solomon Erasure Coding
//!
//! Objects are split into `data_shards` equally sized data shards (the last
//! one zero-padded) and `parity_shards` parity shards, where the counts come
//! from a size-driven strategy:
//! - default: one data shard per started MiB, parity = data / 2
//! - any subset of up to `parity_shards` shards may be lost
//!
//! Shards are sequential byte containers (files on disk in production,
//! `Cursor`s in tests). The coder streams them stripe by stripe and rewinds
//! every handle to offset 0 when it is done, so the same handles can be fed
//! straight into the next verify/reconstruct pass.

use crate::error::{Result, StoreError};
use crate::{MAX_SHARD_SIZE, MAX_TOTAL_SHARDS};
use reed_solomon_erasure::galois_8::ReedSolomon;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Arc;
use tracing::debug;

/// Bytes of each shard processed per Reed-Solomon pass
const STRIPE_SIZE: u64 = 64 * 1024;

/// Shard counts for one object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardLayout {
    /// Number of data shards (k)
    pub data_shards: usize,
    /// Number of parity shards (m)
    pub parity_shards: usize,
}

impl ShardLayout {
    pub fn new(data_shards: usize, parity_shards: usize) -> Self {
        Self {
            data_shards,
            parity_shards,
        }
    }

    /// Total number of shards
    pub fn total_shards(&self) -> usize {
        self.data_shards + self.parity_shards
    }

    /// Maximum number of absent shards that can be tolerated
    pub fn max_failures(&self) -> usize {
        self.parity_shards
    }

    /// Storage overhead ratio (parity/data)
    pub fn overhead_ratio(&self) -> f64 {
        if self.data_shards == 0 {
            0.0
        } else {
            self.parity_shards as f64 / self.data_shards as f64
        }
    }

    /// Size of every shard for an object of `size` bytes
    pub fn shard_size(&self, size: u64) -> u64 {
        if self.data_shards == 0 {
            0
        } else {
            size.div_ceil(self.data_shards as u64)
        }
    }

    fn validate(&self) -> Result<()> {
        if self.total_shards() > MAX_TOTAL_SHARDS {
            return Err(StoreError::Configuration(format!(
                "{} shards exceed the Reed-Solomon limit of {}",
                self.total_shards(),
                MAX_TOTAL_SHARDS
            )));
        }
        if self.data_shards == 0 && self.parity_shards > 0 {
            return Err(StoreError::Configuration(
                "parity shards without data shards".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for ShardLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.data_shards, self.parity_shards)
    }
}

/// Whether a shard carries object bytes or redundancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShardRole {
    Data,
    Parity,
}

impl ShardRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShardRole::Data => "data",
            ShardRole::Parity => "parity",
        }
    }
}

impl fmt::Display for ShardRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps an object size to its shard layout
pub type Strategy = Arc<dyn Fn(u64) -> ShardLayout + Send + Sync>;

/// One data shard per started [`MAX_SHARD_SIZE`] bytes, parity = data / 2.
///
/// Integer division means single-shard objects get no parity at all.
pub fn default_strategy(size: u64) -> ShardLayout {
    layout_for_shard_size(size, MAX_SHARD_SIZE)
}

fn layout_for_shard_size(size: u64, max_shard_size: u64) -> ShardLayout {
    let data = size.div_ceil(max_shard_size) as usize;
    ShardLayout::new(data, data / 2)
}

/// Reed-Solomon encoder/verifier/reconstructor over streamed shards
#[derive(Clone)]
pub struct ErasureCoder {
    strategy: Strategy,
}

impl ErasureCoder {
    /// Create a coder using [`default_strategy`]
    pub fn new() -> Self {
        Self::with_strategy(default_strategy)
    }

    /// Create a coder with a custom layout strategy
    pub fn with_strategy<F>(strategy: F) -> Self
    where
        F: Fn(u64) -> ShardLayout + Send + Sync + 'static,
    {
        Self {
            strategy: Arc::new(strategy),
        }
    }

    /// Default strategy shape with a different maximum data shard size
    pub fn with_max_shard_size(max_shard_size: u64) -> Result<Self> {
        if max_shard_size == 0 {
            return Err(StoreError::Configuration(
                "max_shard_size must be > 0".to_string(),
            ));
        }
        Ok(Self::with_strategy(move |size| {
            layout_for_shard_size(size, max_shard_size)
        }))
    }

    /// Shard counts for an object of `size` bytes
    pub fn calc_shards_num(&self, size: u64) -> ShardLayout {
        (self.strategy)(size)
    }

    /// Split the concatenation of `sources` (exactly `size` bytes) across
    /// `data` and compute `parity` from it.
    ///
    /// Both shard slices must match [`calc_shards_num`](Self::calc_shards_num)
    /// for `size`. All shard handles are rewound on success.
    pub fn encode<R, S>(
        &self,
        sources: &mut [R],
        size: u64,
        data: &mut [S],
        parity: &mut [S],
    ) -> Result<()>
    where
        R: Read,
        S: Read + Write + Seek,
    {
        let layout = self.calc_shards_num(size);
        if data.len() != layout.data_shards || parity.len() != layout.parity_shards {
            return Err(StoreError::ShardCountMismatch {
                expected_data: layout.data_shards,
                expected_parity: layout.parity_shards,
                data: data.len(),
                parity: parity.len(),
            });
        }
        layout.validate()?;
        if layout.data_shards == 0 {
            if size > 0 {
                return Err(StoreError::Configuration(format!(
                    "strategy produced no data shards for {} bytes",
                    size
                )));
            }
            return Ok(());
        }

        let shard_size = layout.shard_size(size);
        split(sources, size, shard_size, data)?;
        rewind_all(data)?;

        if layout.parity_shards > 0 {
            let encoder = ReedSolomon::new(layout.data_shards, layout.parity_shards)?;
            let mut buffers = vec![Vec::new(); layout.total_shards()];
            let mut remaining = shard_size;

            while remaining > 0 {
                let n = remaining.min(STRIPE_SIZE) as usize;
                for buf in buffers.iter_mut() {
                    buf.resize(n, 0);
                }
                for (buf, shard) in buffers.iter_mut().zip(data.iter_mut()) {
                    shard.read_exact(buf)?;
                }

                encoder.encode(&mut buffers)?;

                for (buf, shard) in buffers[layout.data_shards..].iter().zip(parity.iter_mut()) {
                    shard.write_all(buf)?;
                }
                remaining -= n as u64;
            }
        }

        for shard in data.iter_mut().chain(parity.iter_mut()) {
            shard.flush()?;
        }
        rewind_all(parity)?;
        rewind_all(data)?;

        debug!(size, layout = %layout, shard_size, "Encoded object into shards");
        Ok(())
    }

    /// Check that every shard is present and parity matches the data.
    ///
    /// `Ok(false)` means "needs reconstruction" (absent shard, short shard or
    /// parity mismatch); errors are reserved for structural and I/O failures.
    /// Present shard handles are rewound afterwards.
    pub fn verify<S>(&self, data: &mut [Option<S>], parity: &mut [Option<S>]) -> Result<bool>
    where
        S: Read + Seek,
    {
        let layout = ShardLayout::new(data.len(), parity.len());
        layout.validate()?;

        let result = verify_stripes(layout, data, parity);
        rewind_slots(data)?;
        rewind_slots(parity)?;
        result
    }

    /// Recompute the absent shards of `data` + `parity` and write each one
    /// into the matching slot of `targets` (indexed data first, then parity).
    ///
    /// A target may only be set for an absent slot. Fails with
    /// [`StoreError::Unrecoverable`] when more slots are absent than there
    /// are parity shards. Every handle is rewound on success.
    pub fn reconstruct<S, W>(
        &self,
        data: &mut [Option<S>],
        parity: &mut [Option<S>],
        targets: &mut [Option<W>],
    ) -> Result<()>
    where
        S: Read + Seek,
        W: Write + Seek,
    {
        let layout = ShardLayout::new(data.len(), parity.len());
        layout.validate()?;
        if targets.len() != layout.total_shards() {
            return Err(StoreError::Configuration(format!(
                "{} reconstruction targets for {} shards",
                targets.len(),
                layout.total_shards()
            )));
        }

        let absent: Vec<usize> = data
            .iter()
            .chain(parity.iter())
            .enumerate()
            .filter_map(|(i, slot)| slot.is_none().then_some(i))
            .collect();

        for (i, target) in targets.iter().enumerate() {
            if target.is_some() && !absent.contains(&i) {
                return Err(StoreError::Configuration(format!(
                    "reconstruction target set for present shard {}",
                    i
                )));
            }
        }

        if absent.is_empty() {
            rewind_slots(data)?;
            rewind_slots(parity)?;
            return Ok(());
        }
        if absent.len() > layout.parity_shards {
            return Err(StoreError::Unrecoverable {
                absent: absent.len(),
                parity: layout.parity_shards,
            });
        }

        let shard_size = common_len(data, parity)?;
        if shard_size > 0 {
            let decoder = ReedSolomon::new(layout.data_shards, layout.parity_shards)?;
            let mut buffers: Vec<Option<Vec<u8>>> = vec![None; layout.total_shards()];
            let mut remaining = shard_size;

            while remaining > 0 {
                let n = remaining.min(STRIPE_SIZE) as usize;
                for (i, shard) in data.iter_mut().chain(parity.iter_mut()).enumerate() {
                    match shard {
                        Some(reader) => {
                            let buf = buffers[i].get_or_insert_with(Vec::new);
                            buf.resize(n, 0);
                            reader.read_exact(buf)?;
                        }
                        None => buffers[i] = None,
                    }
                }

                decoder.reconstruct(&mut buffers)?;

                for &i in &absent {
                    if let (Some(target), Some(buf)) = (targets[i].as_mut(), buffers[i].as_ref()) {
                        target.write_all(buf)?;
                    }
                }
                remaining -= n as u64;
            }
        }

        for target in targets.iter_mut().flatten() {
            target.flush()?;
            target.seek(SeekFrom::Start(0))?;
        }
        rewind_slots(data)?;
        rewind_slots(parity)?;

        debug!(
            layout = %layout,
            absent = absent.len(),
            shard_size,
            "Reconstructed absent shards"
        );
        Ok(())
    }
}

impl Default for ErasureCoder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ErasureCoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasureCoder").finish_non_exhaustive()
    }
}

fn verify_stripes<S: Read + Seek>(
    layout: ShardLayout,
    data: &mut [Option<S>],
    parity: &mut [Option<S>],
) -> Result<bool> {
    if data.iter().chain(parity.iter()).any(Option::is_none) {
        return Ok(false);
    }

    let mut lengths = Vec::with_capacity(layout.total_shards());
    for shard in data.iter_mut().chain(parity.iter_mut()).flatten() {
        lengths.push(stream_len(shard)?);
    }
    let shard_size = lengths.first().copied().unwrap_or(0);
    if lengths.iter().any(|&len| len != shard_size) {
        return Ok(false);
    }
    if layout.parity_shards == 0 || shard_size == 0 {
        return Ok(true);
    }

    let encoder = ReedSolomon::new(layout.data_shards, layout.parity_shards)?;
    let mut buffers = vec![Vec::new(); layout.total_shards()];
    let mut remaining = shard_size;

    while remaining > 0 {
        let n = remaining.min(STRIPE_SIZE) as usize;
        for (buf, shard) in buffers
            .iter_mut()
            .zip(data.iter_mut().chain(parity.iter_mut()).flatten())
        {
            buf.resize(n, 0);
            shard.read_exact(buf)?;
        }
        if !encoder.verify(&buffers)? {
            return Ok(false);
        }
        remaining -= n as u64;
    }

    Ok(true)
}

/// Copy `size` bytes from the concatenated sources into the data shards,
/// `shard_size` bytes each, zero-padding the tail.
fn split<R: Read, S: Write>(
    sources: &mut [R],
    size: u64,
    shard_size: u64,
    data: &mut [S],
) -> Result<()> {
    let mut input = Concat::new(sources).take(size);
    let mut copied = 0u64;

    for shard in data.iter_mut() {
        let n = io::copy(&mut (&mut input).take(shard_size), shard)?;
        copied += n;
        if n < shard_size {
            io::copy(&mut io::repeat(0).take(shard_size - n), shard)?;
        }
    }

    if copied < size {
        return Err(StoreError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("source ended after {} of {} bytes", copied, size),
        )));
    }
    Ok(())
}

/// Shared length of every present shard
fn common_len<S: Seek>(data: &mut [Option<S>], parity: &mut [Option<S>]) -> Result<u64> {
    let mut expected = None;
    for shard in data.iter_mut().chain(parity.iter_mut()).flatten() {
        let len = stream_len(shard)?;
        match expected {
            None => expected = Some(len),
            Some(size) if size != len => {
                return Err(StoreError::ErasureCoding(format!(
                    "shard size mismatch: expected {}, got {}",
                    size, len
                )));
            }
            Some(_) => {}
        }
    }
    Ok(expected.unwrap_or(0))
}

fn stream_len<S: Seek>(shard: &mut S) -> Result<u64> {
    let len = shard.seek(SeekFrom::End(0))?;
    shard.seek(SeekFrom::Start(0))?;
    Ok(len)
}

fn rewind_all<S: Seek>(shards: &mut [S]) -> Result<()> {
    for shard in shards.iter_mut() {
        shard.seek(SeekFrom::Start(0))?;
    }
    Ok(())
}

fn rewind_slots<S: Seek>(slots: &mut [Option<S>]) -> Result<()> {
    for shard in slots.iter_mut().flatten() {
        shard.seek(SeekFrom::Start(0))?;
    }
    Ok(())
}

/// Reads a list of sources back to back
struct Concat<'a, R> {
    sources: &'a mut [R],
    current: usize,
}

impl<'a, R> Concat<'a, R> {
    fn new(sources: &'a mut [R]) -> Self {
        Self {
            sources,
            current: 0,
        }
    }
}

impl<R: Read> Read for Concat<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.current < self.sources.len() {
            let n = self.sources[self.current].read(buf)?;
            if n > 0 || buf.is_empty() {
                return Ok(n);
            }
            self.current += 1;
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const MIB: u64 = 1024 * 1024;

    type Shard = Cursor<Vec<u8>>;

    fn fixed(data: usize, parity: usize) -> ErasureCoder {
        ErasureCoder::with_strategy(move |_| ShardLayout::new(data, parity))
    }

    fn shards(n: usize) -> Vec<Shard> {
        (0..n).map(|_| Cursor::new(Vec::new())).collect()
    }

    fn pattern(size: usize) -> Vec<u8> {
        (0..size).map(|i| (i * 7 % 251) as u8).collect()
    }

    fn encode(coder: &ErasureCoder, payload: &[u8]) -> (Vec<Shard>, Vec<Shard>) {
        let layout = coder.calc_shards_num(payload.len() as u64);
        let mut data = shards(layout.data_shards);
        let mut parity = shards(layout.parity_shards);
        coder
            .encode(
                &mut [Cursor::new(payload)],
                payload.len() as u64,
                &mut data,
                &mut parity,
            )
            .unwrap();
        (data, parity)
    }

    fn concat_data(data: &[Shard], size: usize) -> Vec<u8> {
        let mut out: Vec<u8> = data.iter().flat_map(|s| s.get_ref().clone()).collect();
        out.truncate(size);
        out
    }

    #[test]
    fn test_default_strategy() {
        assert_eq!(default_strategy(0), ShardLayout::new(0, 0));
        assert_eq!(default_strategy(1), ShardLayout::new(1, 0));
        assert_eq!(default_strategy(MIB), ShardLayout::new(1, 0));
        assert_eq!(default_strategy(MIB + 1), ShardLayout::new(2, 1));
        assert_eq!(default_strategy(3 * MIB), ShardLayout::new(3, 1));
        assert_eq!(default_strategy(10 * MIB), ShardLayout::new(10, 5));
    }

    #[test]
    fn test_layout_helpers() {
        let layout = ShardLayout::new(4, 2);
        assert_eq!(layout.total_shards(), 6);
        assert_eq!(layout.max_failures(), 2);
        assert!((layout.overhead_ratio() - 0.5).abs() < 0.001);
        assert_eq!(layout.shard_size(10), 3);
        assert_eq!(ShardLayout::new(0, 0).shard_size(0), 0);
    }

    #[test]
    fn test_custom_shard_size() {
        let coder = ErasureCoder::with_max_shard_size(1000).unwrap();
        assert_eq!(coder.calc_shards_num(4500), ShardLayout::new(5, 2));
        assert!(ErasureCoder::with_max_shard_size(0).is_err());
    }

    #[test]
    fn test_encode_rejects_shard_count_mismatch() {
        let coder = fixed(3, 2);
        let mut data = shards(2);
        let mut parity = shards(2);
        let result = coder.encode(&mut [Cursor::new(b"abc")], 3, &mut data, &mut parity);
        assert!(matches!(
            result,
            Err(StoreError::ShardCountMismatch {
                expected_data: 3,
                data: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_encode_splits_evenly_and_rewinds() {
        let coder = fixed(3, 2);
        let payload = pattern(1000);
        let (data, parity) = encode(&coder, &payload);

        for shard in data.iter().chain(parity.iter()) {
            assert_eq!(shard.get_ref().len(), 334);
            assert_eq!(shard.position(), 0);
        }
        assert_eq!(&data[0].get_ref()[..], &payload[..334]);
        assert_eq!(concat_data(&data, payload.len()), payload);
        // tail padding is zeroed
        assert_eq!(data[2].get_ref()[332..], [0, 0]);
    }

    #[test]
    fn test_encode_concatenates_sources() {
        let coder = fixed(2, 1);
        let payload = pattern(301);
        let mut sources = vec![
            Cursor::new(payload[..100].to_vec()),
            Cursor::new(Vec::new()),
            Cursor::new(payload[100..].to_vec()),
        ];
        let mut data = shards(2);
        let mut parity = shards(1);
        coder
            .encode(&mut sources, 301, &mut data, &mut parity)
            .unwrap();
        assert_eq!(concat_data(&data, 301), payload);
    }

    #[test]
    fn test_encode_short_source_fails() {
        let coder = fixed(2, 1);
        let mut data = shards(2);
        let mut parity = shards(1);
        let result = coder.encode(&mut [Cursor::new(pattern(50))], 100, &mut data, &mut parity);
        assert!(matches!(result, Err(StoreError::Io(_))));
    }

    #[test]
    fn test_encode_verify() {
        let coder = fixed(4, 2);
        let payload = pattern(200_000);
        let (data, parity) = encode(&coder, &payload);

        let mut data: Vec<Option<Shard>> = data.into_iter().map(Some).collect();
        let mut parity: Vec<Option<Shard>> = parity.into_iter().map(Some).collect();
        assert!(coder.verify(&mut data, &mut parity).unwrap());
        // handles are reusable right away
        assert!(coder.verify(&mut data, &mut parity).unwrap());
    }

    #[test]
    fn test_verify_detects_corruption() {
        let coder = fixed(3, 2);
        let payload = pattern(5000);
        let (mut data, parity) = encode(&coder, &payload);
        data[1].get_mut()[17] ^= 0xFF;

        let mut data: Vec<Option<Shard>> = data.into_iter().map(Some).collect();
        let mut parity: Vec<Option<Shard>> = parity.into_iter().map(Some).collect();
        assert!(!coder.verify(&mut data, &mut parity).unwrap());
    }

    #[test]
    fn test_verify_absent_shard_is_false() {
        let coder = fixed(3, 2);
        let (data, parity) = encode(&coder, &pattern(900));

        let mut data: Vec<Option<Shard>> = data.into_iter().map(Some).collect();
        let mut parity: Vec<Option<Shard>> = parity.into_iter().map(Some).collect();
        parity[0] = None;
        assert!(!coder.verify(&mut data, &mut parity).unwrap());
    }

    #[test]
    fn test_reconstruct_missing_data_and_parity() {
        let coder = fixed(4, 3);
        let payload = pattern(150_001);
        let (data, parity) = encode(&coder, &payload);
        let originals: Vec<Vec<u8>> = data
            .iter()
            .chain(parity.iter())
            .map(|s| s.get_ref().clone())
            .collect();

        let mut data: Vec<Option<Shard>> = data.into_iter().map(Some).collect();
        let mut parity: Vec<Option<Shard>> = parity.into_iter().map(Some).collect();
        data[0] = None;
        data[3] = None;
        parity[1] = None;

        let mut targets: Vec<Option<Shard>> = vec![None; 7];
        for i in [0, 3, 5] {
            targets[i] = Some(Cursor::new(Vec::new()));
        }

        assert!(!coder.verify(&mut data, &mut parity).unwrap());
        coder.reconstruct(&mut data, &mut parity, &mut targets).unwrap();

        for i in [0, 3, 5] {
            let target = targets[i].as_ref().unwrap();
            assert_eq!(target.position(), 0);
            assert_eq!(target.get_ref(), &originals[i]);
        }
    }

    #[test]
    fn test_reconstruct_too_many_missing() {
        let coder = fixed(3, 2);
        let (data, parity) = encode(&coder, &pattern(3000));

        let mut data: Vec<Option<Shard>> = data.into_iter().map(Some).collect();
        let mut parity: Vec<Option<Shard>> = parity.into_iter().map(Some).collect();
        data[0] = None;
        data[1] = None;
        parity[0] = None;

        let mut targets: Vec<Option<Shard>> = vec![None; 5];
        let result = coder.reconstruct(&mut data, &mut parity, &mut targets);
        assert!(matches!(
            result,
            Err(StoreError::Unrecoverable {
                absent: 3,
                parity: 2
            })
        ));
    }

    #[test]
    fn test_reconstruct_rejects_target_on_present_slot() {
        let coder = fixed(2, 1);
        let (data, parity) = encode(&coder, &pattern(10));

        let mut data: Vec<Option<Shard>> = data.into_iter().map(Some).collect();
        let mut parity: Vec<Option<Shard>> = parity.into_iter().map(Some).collect();
        let mut targets: Vec<Option<Shard>> = vec![Some(Cursor::new(Vec::new())), None, None];
        let result = coder.reconstruct(&mut data, &mut parity, &mut targets);
        assert!(matches!(result, Err(StoreError::Configuration(_))));
    }

    #[test]
    fn test_zero_parity_layout() {
        let coder = ErasureCoder::new();
        let payload = pattern(4096);
        let (data, parity) = encode(&coder, &payload);
        assert_eq!(data.len(), 1);
        assert!(parity.is_empty());

        let mut data: Vec<Option<Shard>> = data.into_iter().map(Some).collect();
        let mut parity: Vec<Option<Shard>> = Vec::new();
        assert!(coder.verify(&mut data, &mut parity).unwrap());

        data[0] = None;
        let mut targets: Vec<Option<Shard>> = vec![Some(Cursor::new(Vec::new()))];
        let result = coder.reconstruct(&mut data, &mut parity, &mut targets);
        assert!(matches!(result, Err(StoreError::Unrecoverable { .. })));
    }

    #[test]
    fn test_empty_object() {
        let coder = ErasureCoder::new();
        let mut data: Vec<Shard> = Vec::new();
        let mut parity: Vec<Shard> = Vec::new();
        let mut sources: [Cursor<Vec<u8>>; 0] = [];
        coder.encode(&mut sources, 0, &mut data, &mut parity).unwrap();
    }

    #[test]
    fn test_layout_beyond_field_limit() {
        let coder = fixed(200, 100);
        let mut data = shards(200);
        let mut parity = shards(100);
        let result = coder.encode(&mut [Cursor::new(pattern(300))], 300, &mut data, &mut parity);
        assert!(matches!(result, Err(StoreError::Configuration(_))));
    }
}
