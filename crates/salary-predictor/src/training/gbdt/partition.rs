//! Row partitioning for tree training.
//!
//! Rows of every leaf live in one contiguous range of a shared index buffer:
//!
//! ```text
//! indices:  [ 3 7 9 | 0 1 4 8 | 2 5 6 ]
//!             leaf 0  leaf 2    leaf 1
//! ```
//!
//! Splitting a leaf reorders its range in place (stable) so left rows come
//! first; the left child keeps the parent's leaf id and the right child gets
//! a new one.

/// Tracks which training rows belong to which leaf.
#[derive(Debug, Default)]
pub struct RowPartitioner {
    indices: Vec<u32>,
    /// `(begin, end)` range per leaf id.
    ranges: Vec<(usize, usize)>,
    scratch: Vec<u32>,
}

impl RowPartitioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new tree with `rows` in leaf 0.
    pub fn reset(&mut self, rows: &[u32]) {
        self.indices.clear();
        self.indices.extend_from_slice(rows);
        self.ranges.clear();
        self.ranges.push((0, rows.len()));
    }

    pub fn n_leaves(&self) -> usize {
        self.ranges.len()
    }

    pub fn leaf_rows(&self, leaf: usize) -> &[u32] {
        let (begin, end) = self.ranges[leaf];
        &self.indices[begin..end]
    }

    /// Split `leaf`: rows whose bin in `column` is `<= bin` stay in `leaf`,
    /// the rest move to the returned new leaf.
    pub fn split(&mut self, leaf: usize, column: &[u8], bin: u8) -> usize {
        let (begin, end) = self.ranges[leaf];
        self.scratch.clear();

        let mut write = begin;
        for read in begin..end {
            let row = self.indices[read];
            if column[row as usize] <= bin {
                self.indices[write] = row;
                write += 1;
            } else {
                self.scratch.push(row);
            }
        }
        self.indices[write..end].copy_from_slice(&self.scratch);

        self.ranges[leaf] = (begin, write);
        self.ranges.push((write, end));
        self.ranges.len() - 1
    }
}
