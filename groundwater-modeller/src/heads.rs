use ndarray::{s, Array2, Array3, ArrayView2, Axis};

/// Heads at or beyond this magnitude mark dry or inactive cells.
pub const INACTIVE_HEAD: f64 = 1.0e29;

/// A solved head snapshot of shape `(nlay, nrow, ncol)`.
#[derive(Debug, Clone)]
pub struct HeadField {
    pub heads: Array3<f64>,
}

impl HeadField {
    pub fn new(heads: Array3<f64>) -> Self {
        HeadField { heads }
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        self.heads.dim()
    }

    pub fn layer(&self, layer: usize) -> ArrayView2<'_, f64> {
        self.heads.index_axis(Axis(0), layer)
    }

    /// Vertical section along `row`, shaped `(nlay, ncol)`.
    pub fn row_section(&self, row: usize) -> Array2<f64> {
        self.heads.slice(s![.., row, ..]).to_owned()
    }

    /// Smallest and largest active head.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.heads
            .iter()
            .copied()
            .filter(|h| h.is_finite() && h.abs() < INACTIVE_HEAD)
            .fold(None, |acc, h| match acc {
                None => Some((h, h)),
                Some((lo, hi)) => Some((lo.min(h), hi.max(h))),
            })
    }

    /// Drawdown `reference - head` for every cell.
    pub fn drawdown(&self, reference: f64) -> Array3<f64> {
        self.heads.mapv(|h| reference - h)
    }

    /// True if heads along `row` of `layer` never rise (beyond `tolerance`)
    /// walking from `from_col` to `to_col`, in either direction.
    pub fn non_increasing_along_row(
        &self,
        layer: usize,
        row: usize,
        from_col: usize,
        to_col: usize,
        tolerance: f64,
    ) -> bool {
        let line = self.heads.slice(s![layer, row, ..]);
        let cols: Vec<usize> = if from_col <= to_col {
            (from_col..=to_col).collect()
        } else {
            (to_col..=from_col).rev().collect()
        };
        cols.windows(2)
            .all(|w| line[w[1]] <= line[w[0]] + tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cone() -> HeadField {
        // Single layer, lowest head at column 2
        let heads = Array3::from_shape_fn((2, 3, 5), |(k, _, j)| {
            100.0 - 2.0 / (1.0 + (j as f64 - 2.0).abs()) - k as f64 * 0.1
        });
        HeadField::new(heads)
    }

    #[test]
    fn slices_have_expected_shapes() {
        let field = cone();
        assert_eq!(field.layer(1).dim(), (3, 5));
        assert_eq!(field.row_section(0).dim(), (2, 5));
    }

    #[test]
    fn min_max_skips_inactive_cells() {
        let mut field = cone();
        field.heads[[0, 0, 0]] = 1.0e30;
        let (lo, hi) = field.min_max().unwrap();
        assert!(hi < 100.0);
        assert!(lo > 97.0);
    }

    #[test]
    fn heads_fall_toward_the_sink_from_both_sides() {
        let field = cone();
        assert!(field.non_increasing_along_row(0, 1, 0, 2, 0.0));
        assert!(field.non_increasing_along_row(0, 1, 4, 2, 0.0));
        assert!(!field.non_increasing_along_row(0, 1, 2, 4, 0.0));
    }

    #[test]
    fn drawdown_is_relative_to_reference() {
        let field = cone();
        let dd = field.drawdown(100.0);
        assert!((dd[[0, 0, 2]] - 2.0).abs() < 1e-12);
    }
}
