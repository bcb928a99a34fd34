use crate::utils::finite_or_zero;

/// Observed range of one feature across the wallet population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    /// `None` for an empty slice. Non-finite values are read as zero.
    pub fn observe(values: &[f64]) -> Option<Self> {
        let mut iter = values.iter().copied().map(finite_or_zero);
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some(Self { min, max })
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Maps `value` linearly from `[min, max]` onto `[0, ceiling]`.
    /// A constant feature (`min == max`) maps to 0 for every wallet.
    pub fn scale(&self, value: f64, ceiling: f64) -> f64 {
        let range = self.range();
        if !(range > 0.0) {
            return 0.0;
        }

        let value = finite_or_zero(value);
        // The maximum lands exactly on the ceiling so truncation cannot
        // knock the top wallet down by one.
        if value >= self.max {
            return ceiling;
        }
        ((value - self.min) * ceiling / range).clamp(0.0, ceiling)
    }
}
