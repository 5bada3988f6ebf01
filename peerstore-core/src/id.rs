//! Unique identifier generation
//!
//! Snowflake layout (most significant bit first):
//! - 41 bits: milliseconds since the generator epoch
//! - 10 bits: worker id (unique per node)
//! - 12 bits: per-millisecond sequence
//!
//! Ids from one generator are strictly increasing; ids from different
//! workers never collide.

use crate::error::{Result, StoreError};
use parking_lot::Mutex;

pub const WORKER_BITS: u32 = 10;
pub const SEQUENCE_BITS: u32 = 12;
pub const MAX_WORKER: u64 = 1 << WORKER_BITS;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;
const TIME_SHIFT: u32 = WORKER_BITS + SEQUENCE_BITS;

/// 2024-01-01T00:00:00Z in Unix milliseconds
pub const DEFAULT_EPOCH_MS: i64 = 1_704_067_200_000;

/// Source of process-wide unique 64-bit ids
pub trait IdGenerator: Send + Sync {
    fn generate_id(&self) -> u64;
}

struct SnowflakeState {
    last_ms: i64,
    sequence: u64,
}

/// Time-ordered, worker-tagged id generator
pub struct Snowflake {
    worker: u64,
    epoch_ms: i64,
    clock: fn() -> i64,
    state: Mutex<SnowflakeState>,
}

impl Snowflake {
    /// Create a generator for `worker` (must be < 1024)
    pub fn new(worker: u64) -> Result<Self> {
        Self::with_epoch(worker, DEFAULT_EPOCH_MS)
    }

    /// Create a generator counting from a custom epoch
    pub fn with_epoch(worker: u64, epoch_ms: i64) -> Result<Self> {
        Self::with_clock(worker, epoch_ms, crate::now_millis)
    }

    fn with_clock(worker: u64, epoch_ms: i64, clock: fn() -> i64) -> Result<Self> {
        if worker >= MAX_WORKER {
            return Err(StoreError::Configuration(format!(
                "worker id {} must be below {}",
                worker, MAX_WORKER
            )));
        }
        Ok(Self {
            worker,
            epoch_ms,
            clock,
            state: Mutex::new(SnowflakeState {
                last_ms: 0,
                sequence: 0,
            }),
        })
    }

    /// Worker id embedded in every generated id
    pub fn worker(&self) -> u64 {
        self.worker
    }

    /// Split an id into (milliseconds since epoch, worker, sequence)
    pub fn decompose(id: u64) -> (u64, u64, u64) {
        (
            id >> TIME_SHIFT,
            (id >> SEQUENCE_BITS) & (MAX_WORKER - 1),
            id & SEQUENCE_MASK,
        )
    }
}

impl IdGenerator for Snowflake {
    fn generate_id(&self) -> u64 {
        let mut state = self.state.lock();

        // Never step backwards, even if the wall clock does
        let mut now = (self.clock)().max(state.last_ms);
        if now == state.last_ms {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                while now <= state.last_ms {
                    std::hint::spin_loop();
                    now = (self.clock)().max(state.last_ms);
                }
            }
        } else {
            state.sequence = 0;
        }
        state.last_ms = now;

        let elapsed = now.saturating_sub(self.epoch_ms) as u64;
        (elapsed << TIME_SHIFT) | (self.worker << SEQUENCE_BITS) | state.sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_invalid_worker() {
        assert!(Snowflake::new(MAX_WORKER).is_err());
        assert!(Snowflake::new(MAX_WORKER - 1).is_ok());
    }

    #[test]
    fn test_ids_are_increasing() {
        let gen = Snowflake::new(3).unwrap();
        let mut last = 0;
        for _ in 0..10_000 {
            let id = gen.generate_id();
            assert!(id > last);
            last = id;
        }
    }

    #[test]
    fn test_worker_is_embedded() {
        let gen = Snowflake::new(517).unwrap();
        let (_, worker, _) = Snowflake::decompose(gen.generate_id());
        assert_eq!(worker, 517);
    }

    #[test]
    fn test_sequence_rollover_waits_for_next_ms() {
        static READS: AtomicI64 = AtomicI64::new(0);
        // The clock advances by one millisecond every 5000 reads
        fn slow_clock() -> i64 {
            DEFAULT_EPOCH_MS + 100 + READS.fetch_add(1, Ordering::SeqCst) / 5000
        }

        let gen = Snowflake::with_clock(1, DEFAULT_EPOCH_MS, slow_clock).unwrap();
        let mut last = 0;
        for _ in 0..=SEQUENCE_MASK {
            let id = gen.generate_id();
            assert!(id > last);
            last = id;
        }

        let (ms, _, seq) = Snowflake::decompose(last);
        assert_eq!((ms, seq), (100, SEQUENCE_MASK));

        let next = gen.generate_id();
        assert!(next > last);
        assert_eq!(Snowflake::decompose(next), (101, 1, 0));
    }

    #[test]
    fn test_unique_across_threads() {
        let gen = Arc::new(Snowflake::new(9).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let gen = gen.clone();
                std::thread::spawn(move || (0..2000).map(|_| gen.generate_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 8000);
    }
}
