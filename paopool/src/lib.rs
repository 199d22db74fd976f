//! Work distribution over a pool of ranks.
//!
//! All collective operations go through the Pool trait so that the
//! numerical code never talks to a transport directly. Rank 0 is the
//! coordinator. The serial pool runs everything in one process, which
//! is also what the unit tests use.

use std::ops::Range;
use types::c64;

pub trait Pool {
    fn size(&self) -> usize;

    fn rank(&self) -> usize;

    fn is_coordinator(&self) -> bool {
        self.rank() == 0
    }

    /// Contiguous block of 0..n owned by this rank.
    fn own_range(&self, n: usize) -> Range<usize> {
        let first = block_first(n, self.size(), self.rank());
        let len = block_len(n, self.size(), self.rank());

        first..first + len
    }

    fn barrier(&self);

    fn reduce_max(&self, local: f64) -> f64;

    fn broadcast_c64(&self, buf: &mut [c64]);

    /// Concatenate the blocks owned by each rank, in rank order, on
    /// every rank.
    fn allgather_c64(&self, local: &[c64], full: &mut [c64]);

    fn allgather_f64(&self, local: &[f64], full: &mut [f64]);

    /// Concatenate the blocks on the coordinator; the contents of
    /// full on other ranks are unspecified.
    fn gather_c64(&self, local: &[c64], full: &mut [c64]);
}

/// Single-process pool.
pub struct SerialPool;

impl SerialPool {
    pub fn new() -> SerialPool {
        SerialPool
    }
}

impl Pool for SerialPool {
    fn size(&self) -> usize {
        1
    }

    fn rank(&self) -> usize {
        0
    }

    fn barrier(&self) {}

    fn reduce_max(&self, local: f64) -> f64 {
        local
    }

    fn broadcast_c64(&self, _buf: &mut [c64]) {}

    fn allgather_c64(&self, local: &[c64], full: &mut [c64]) {
        assert_eq!(local.len(), full.len());

        full.copy_from_slice(local);
    }

    fn allgather_f64(&self, local: &[f64], full: &mut [f64]) {
        assert_eq!(local.len(), full.len());

        full.copy_from_slice(local);
    }

    fn gather_c64(&self, local: &[c64], full: &mut [c64]) {
        assert_eq!(local.len(), full.len());

        full.copy_from_slice(local);
    }
}

pub fn new(scheme: &str) -> Box<dyn Pool> {
    match scheme {
        "serial" => Box::new(SerialPool::new()),

        _ => {
            panic!("pool scheme '{}' not implemented", scheme);
        }
    }
}

/// First index of the block owned by rank irank when n items are
/// split over nrank ranks. The remainder goes to the leading ranks.
pub fn block_first(n: usize, nrank: usize, irank: usize) -> usize {
    let base = n / nrank;
    let rem = n % nrank;

    irank * base + irank.min(rem)
}

pub fn block_len(n: usize, nrank: usize, irank: usize) -> usize {
    let base = n / nrank;
    let rem = n % nrank;

    base + if irank < rem { 1 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_partition_covers() {
        for &n in &[0usize, 1, 7, 16, 33] {
            for &nrank in &[1usize, 2, 3, 5, 8] {
                let mut covered = 0;

                for irank in 0..nrank {
                    assert_eq!(block_first(n, nrank, irank), covered);
                    covered += block_len(n, nrank, irank);
                }

                assert_eq!(covered, n);
            }
        }
    }

    #[test]
    fn test_block_balance() {
        // no rank owns more than one extra item
        let n = 10;
        let nrank = 4;

        let lens: Vec<usize> = (0..nrank).map(|r| block_len(n, nrank, r)).collect();
        let max = *lens.iter().max().unwrap();
        let min = *lens.iter().min().unwrap();

        assert!(max - min <= 1);
    }

    #[test]
    fn test_serial_pool() {
        let pool = SerialPool::new();

        assert_eq!(pool.size(), 1);
        assert!(pool.is_coordinator());
        assert_eq!(pool.own_range(5), 0..5);
        assert_eq!(pool.reduce_max(3.25), 3.25);

        let local = vec![c64::new(1.0, -1.0); 4];
        let mut full = vec![c64::new(0.0, 0.0); 4];
        pool.allgather_c64(&local, &mut full);

        assert_eq!(full, local);

        let mut gathered = vec![c64::new(0.0, 0.0); 4];
        pool.gather_c64(&local, &mut gathered);

        assert_eq!(gathered, local);
    }

    #[test]
    fn test_factory() {
        let pool = new("serial");

        assert_eq!(pool.size(), 1);
    }
}
