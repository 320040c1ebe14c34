//! Traffic matrices.
//!
//! Row `i`, column `j` holds the bytes device `i` sends to device `j`. Zero or
//! negative entries mean "no transfer"; the diagonal is never sent.

mod all_to_all;

pub use all_to_all::{AllToAllReport, Arrival, RunSummary, simulate_all_to_all};

use std::fs;
use std::path::Path;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::TrafficError;
use crate::net::DeviceId;

/// One off-diagonal, positive matrix entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub src: DeviceId,
    pub dst: DeviceId,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficMatrix {
    rows: Vec<Vec<i64>>,
}

impl TrafficMatrix {
    /// Wraps `rows`, checking that the matrix is square and non-empty.
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Result<Self, TrafficError> {
        if rows.is_empty() {
            return Err(TrafficError::Empty);
        }
        let expected = rows.len();
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(TrafficError::NotSquare {
                row,
                expected,
                got: r.len(),
            });
        }
        Ok(Self { rows })
    }

    /// Parses whitespace-separated integers, one matrix row per line.
    /// Blank lines are skipped.
    pub fn parse(raw: &str) -> Result<Self, TrafficError> {
        let mut rows = Vec::new();
        for (idx, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row = line
                .split_whitespace()
                .map(|token| {
                    token.parse::<i64>().map_err(|_| TrafficError::Parse {
                        line: idx + 1,
                        token: token.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }
        Self::from_rows(rows)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TrafficError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| TrafficError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    /// Number of devices the matrix covers.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, src: usize, dst: usize) -> i64 {
        self.rows[src][dst]
    }

    /// Transfers in row-major order, skipping the diagonal and non-positive entries.
    pub fn transfers(&self) -> impl Iterator<Item = Transfer> + '_ {
        self.rows.iter().enumerate().flat_map(|(src, row)| {
            row.iter()
                .enumerate()
                .filter(move |&(dst, &bytes)| dst != src && bytes > 0)
                .map(move |(dst, &bytes)| Transfer {
                    src: DeviceId(src),
                    dst: DeviceId(dst),
                    bytes: bytes as u64,
                })
        })
    }

    pub fn total_bytes(&self) -> u64 {
        self.transfers().map(|t| t.bytes).sum()
    }

    /// Random matrix with a zero diagonal.
    ///
    /// Each off-diagonal entry is kept with probability `1 - sparsity` and then
    /// filled with a size drawn from `sizes`. With `symmetric`, the upper
    /// triangle is mirrored onto the lower one.
    pub fn generate<R: Rng>(
        nodes: usize,
        sizes: &[u64],
        sparsity: f64,
        symmetric: bool,
        rng: &mut R,
    ) -> Self {
        assert!(nodes > 0, "traffic matrix needs at least one node");
        assert!(!sizes.is_empty(), "at least one chunk size is required");
        let sparsity = sparsity.clamp(0.0, 1.0);

        let mut rows = vec![vec![0_i64; nodes]; nodes];
        for (src, row) in rows.iter_mut().enumerate() {
            for (dst, cell) in row.iter_mut().enumerate() {
                if src == dst {
                    continue;
                }
                if rng.gen_bool(sparsity) {
                    continue;
                }
                if let Some(&size) = sizes.choose(rng) {
                    *cell = size.min(i64::MAX as u64) as i64;
                }
            }
        }

        if symmetric {
            for src in 0..nodes {
                for dst in 0..src {
                    rows[src][dst] = rows[dst][src];
                }
            }
        }
        Self { rows }
    }

    /// Tab-separated text, one row per line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            out.push_str(&line.join("\t"));
            out.push('\n');
        }
        out
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TrafficError> {
        let path = path.as_ref();
        fs::write(path, self.to_text()).map_err(|source| TrafficError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
