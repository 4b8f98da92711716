//! Numeric column statistics and equal-width binning.

/// Label returned for columns whose values are all equal.
pub const CONSTANT_BIN: &str = "constant";

/// Bin count used when the spread cannot size the bins.
const FALLBACK_BINS: usize = 5;

/// Statistics of one numeric column over the full input set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub count: usize,
}

impl ColumnStats {
    /// `None` when no finite value is present.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if values.is_empty() {
            return None;
        }
        let count = values.len();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
        Some(Self {
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
            count,
        })
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// `min(max_bins, ceil(range / std_dev))`, falling back to 5 bins when
    /// the ratio is zero or not finite.
    pub fn bin_count(&self, max_bins: usize) -> usize {
        let ratio = (self.range() / self.std_dev).ceil();
        let wanted = if ratio.is_finite() && ratio >= 1.0 {
            ratio as usize
        } else {
            FALLBACK_BINS
        };
        wanted.min(max_bins).max(1)
    }
}

/// Equal-width bin label of `value` within its column.
///
/// Bins are `bin_1..bin_N`; a value that falls outside every computed edge
/// lands in the last bin. A zero-range column is always [`CONSTANT_BIN`].
pub fn discretize(value: f64, stats: &ColumnStats, max_bins: usize) -> String {
    let range = stats.range();
    if range == 0.0 {
        return CONSTANT_BIN.to_string();
    }
    let bins = stats.bin_count(max_bins);
    let width = range / bins as f64;
    for index in 0..bins {
        let lower = stats.min + index as f64 * width;
        let upper = stats.min + (index + 1) as f64 * width;
        if value >= lower && value < upper {
            return format!("bin_{}", index + 1);
        }
    }
    format!("bin_{bins}")
}
