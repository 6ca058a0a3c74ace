//! Feature quantization for histogram-based training.
//!
//! Each feature gets a [`BinMapper`] holding ascending cut points. A value's
//! bin is the number of cuts `<= value`, so splitting after bin `b` is the
//! same as the raw test `value < cuts[b]`. Trees store `cuts[b]` as their
//! threshold and inference never needs the bins.

use ndarray::ArrayView2;

use crate::utils::Parallelism;

/// Cut points of one feature.
#[derive(Clone, Debug, PartialEq)]
pub struct BinMapper {
    cuts: Vec<f32>,
}

impl BinMapper {
    /// Fit cut points on the finite values of a column.
    ///
    /// With at most `max_bins` distinct values every value gets its own bin
    /// (cuts at midpoints); otherwise cuts are placed at evenly spaced
    /// quantiles of the sorted column.
    pub fn fit(values: &[f32], max_bins: usize) -> Self {
        let mut sorted: Vec<f32> = values.iter().copied().filter(|v| v.is_finite()).collect();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mut distinct = sorted.clone();
        distinct.dedup();

        let max_bins = max_bins.max(1);
        let mut cuts = Vec::new();
        if distinct.len() <= max_bins {
            for pair in distinct.windows(2) {
                let mid = pair[0] + (pair[1] - pair[0]) / 2.0;
                // Adjacent floats can have no midpoint strictly between them.
                cuts.push(if mid > pair[0] { mid } else { pair[1] });
            }
        } else {
            let n = sorted.len();
            for k in 1..max_bins {
                let cut = sorted[k * n / max_bins];
                if cut > sorted[0] && cuts.last().map_or(true, |&last| cut > last) {
                    cuts.push(cut);
                }
            }
        }
        cuts.dedup();
        Self { cuts }
    }

    pub fn n_bins(&self) -> usize {
        self.cuts.len() + 1
    }

    pub fn cuts(&self) -> &[f32] {
        &self.cuts
    }

    #[inline]
    pub fn bin(&self, value: f32) -> u8 {
        self.cuts.partition_point(|&c| c <= value) as u8
    }

    /// Raw threshold equivalent to splitting after `bin`.
    #[inline]
    pub fn threshold(&self, bin: usize) -> f32 {
        self.cuts[bin]
    }
}

/// Column-major matrix of bin indices plus the mappers that produced it.
#[derive(Clone, Debug)]
pub struct BinnedMatrix {
    n_rows: usize,
    bins: Vec<u8>,
    mappers: Vec<BinMapper>,
    offsets: Vec<usize>,
}

impl BinnedMatrix {
    /// Quantize a row-major `(n_rows, n_features)` matrix.
    pub fn from_features(features: ArrayView2<'_, f32>, max_bins: usize, parallelism: Parallelism) -> Self {
        let (n_rows, n_features) = features.dim();

        let columns: Vec<(BinMapper, Vec<u8>)> = parallelism.maybe_par_map(0..n_features, |f| {
            let column: Vec<f32> = features.column(f).iter().copied().collect();
            let mapper = BinMapper::fit(&column, max_bins);
            let bins = column.iter().map(|&v| mapper.bin(v)).collect();
            (mapper, bins)
        });

        let mut bins = Vec::with_capacity(n_rows * n_features);
        let mut mappers = Vec::with_capacity(n_features);
        let mut offsets = Vec::with_capacity(n_features + 1);
        offsets.push(0);
        for (mapper, column) in columns {
            offsets.push(offsets[offsets.len() - 1] + mapper.n_bins());
            bins.extend_from_slice(&column);
            mappers.push(mapper);
        }

        Self {
            n_rows,
            bins,
            mappers,
            offsets,
        }
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.mappers.len()
    }

    /// Bins of feature `f` for every row.
    #[inline]
    pub fn column(&self, f: usize) -> &[u8] {
        &self.bins[f * self.n_rows..(f + 1) * self.n_rows]
    }

    #[inline]
    pub fn mapper(&self, f: usize) -> &BinMapper {
        &self.mappers[f]
    }

    /// Start of each feature's block in a flat histogram; the last entry is
    /// the total number of bins.
    pub fn feature_offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn total_bins(&self) -> usize {
        self.offsets[self.offsets.len() - 1]
    }
}
