//! Stress-period record builders for the constant-head and well packages.

use crate::grid::CellId;

/// A cell whose head is held fixed for the stress period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadRecord {
    pub cell: CellId,
    pub head: f64,
}

impl HeadRecord {
    pub fn new(cell: CellId, head: f64) -> Self {
        HeadRecord { cell, head }
    }
}

/// A point source or sink.
///
/// `rate` follows the MODFLOW sign convention: negative values extract water
/// from the aquifer (pumping), positive values inject it. Use
/// [`WellRecord::extraction`] and [`WellRecord::injection`] to build records
/// from a magnitude without worrying about the sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WellRecord {
    pub cell: CellId,
    pub rate: f64,
}

impl WellRecord {
    pub fn new(cell: CellId, rate: f64) -> Self {
        WellRecord { cell, rate }
    }

    pub fn extraction(cell: CellId, magnitude: f64) -> Self {
        Self::new(cell, -magnitude.abs())
    }

    pub fn injection(cell: CellId, magnitude: f64) -> Self {
        Self::new(cell, magnitude.abs())
    }

    pub fn is_extraction(&self) -> bool {
        self.rate < 0.0
    }
}

/// Constant-head records around the border of the top layer of an N x N grid.
///
/// Each border cell is listed once: the four corners come from the column
/// walk and are skipped by the row walk.
pub fn constant_head_perimeter(n: usize, head: f64) -> Vec<HeadRecord> {
    constant_head_ring(0, n, n, head)
}

/// Constant-head records around the border of `layer` on an `nrow` x `ncol`
/// grid. For square grids the order matches [`constant_head_perimeter`].
pub fn constant_head_ring(layer: usize, nrow: usize, ncol: usize, head: f64) -> Vec<HeadRecord> {
    let mut records = Vec::with_capacity(2 * (nrow + ncol));
    if nrow == 0 || ncol == 0 {
        return records;
    }

    for i in 0..nrow.max(ncol) {
        if i < nrow {
            records.push(HeadRecord::new(CellId::new(layer, i, 0), head));
            if ncol > 1 {
                records.push(HeadRecord::new(CellId::new(layer, i, ncol - 1), head));
            }
        }
        // Interior columns only, the corners were emitted above
        if i > 0 && i + 1 < ncol {
            records.push(HeadRecord::new(CellId::new(layer, 0, i), head));
            if nrow > 1 {
                records.push(HeadRecord::new(CellId::new(layer, nrow - 1, i), head));
            }
        }
    }
    records
}

/// Index `floor(n * fraction)`. No bounds check: fractions outside `[0, 1)`
/// give indices outside the grid (negative fractions saturate to 0).
pub fn fractional_index(n: usize, fraction: f64) -> usize {
    (n as f64 * fraction).floor() as usize
}

/// Single well at `(layer, floor(n * row_frac), floor(n * col_frac))`.
///
/// The location is not validated here; out-of-range cells are caught by the
/// simulation's data verification before files are written.
pub fn point_source(
    layer: usize,
    n: usize,
    row_frac: f64,
    col_frac: f64,
    rate: f64,
) -> Vec<WellRecord> {
    point_source_in(layer, n, n, row_frac, col_frac, rate)
}

/// [`point_source`] on an `nrow` x `ncol` grid.
pub fn point_source_in(
    layer: usize,
    nrow: usize,
    ncol: usize,
    row_frac: f64,
    col_frac: f64,
    rate: f64,
) -> Vec<WellRecord> {
    let cell = CellId::new(
        layer,
        fractional_index(nrow, row_frac),
        fractional_index(ncol, col_frac),
    );
    vec![WellRecord::new(cell, rate)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn tutorial_grid_has_400_boundary_cells() {
        let records = constant_head_perimeter(101, 100.0);
        assert_eq!(records.len(), 400);
        assert!(records.iter().all(|r| r.head == 100.0 && r.cell.layer == 0));
    }

    #[test]
    fn emission_order_walks_columns_then_interior_rows() {
        let cells: Vec<_> = constant_head_perimeter(3, 1.0)
            .into_iter()
            .map(|r| (r.cell.row, r.cell.col))
            .collect();
        assert_eq!(
            cells,
            vec![(0, 0), (0, 2), (1, 0), (1, 2), (0, 1), (2, 1), (2, 0), (2, 2)]
        );
    }

    #[test]
    fn degenerate_extents_list_each_cell_once() {
        assert_eq!(constant_head_perimeter(1, 5.0).len(), 1);
        assert!(constant_head_perimeter(0, 5.0).is_empty());
        assert_eq!(constant_head_ring(2, 1, 4, 0.0).len(), 4);
        assert_eq!(constant_head_ring(2, 4, 1, 0.0).len(), 4);
    }

    #[test]
    fn rectangular_ring_covers_border() {
        let records = constant_head_ring(1, 4, 6, 2.0);
        assert_eq!(records.len(), 2 * 4 + 2 * 4);
        let unique: HashSet<_> = records.iter().map(|r| r.cell).collect();
        assert_eq!(unique.len(), records.len());
    }

    #[test]
    fn point_source_uses_floor_of_fraction() {
        let wells = point_source(9, 101, 0.25, 0.25, -1000.0);
        assert_eq!(wells.len(), 1);
        assert_eq!(wells[0].cell, CellId::new(9, 25, 25));
        assert!(wells[0].is_extraction());
    }

    #[test]
    fn rectangular_point_source_scales_each_axis() {
        let wells = point_source_in(0, 4, 10, 0.5, 0.95, 25.0);
        assert_eq!(wells[0].cell, CellId::new(0, 2, 9));
        assert!(!wells[0].is_extraction());
    }

    #[test]
    fn out_of_range_fraction_is_not_checked() {
        let wells = point_source(0, 10, 1.5, -0.5, -1.0);
        assert_eq!(wells[0].cell, CellId::new(0, 15, 0));
    }

    #[test]
    fn sign_helpers_follow_convention() {
        let cell = CellId::new(0, 1, 1);
        assert_eq!(WellRecord::extraction(cell, 50.0).rate, -50.0);
        assert_eq!(WellRecord::extraction(cell, -50.0).rate, -50.0);
        assert_eq!(WellRecord::injection(cell, -5.0).rate, 5.0);
        assert!(!WellRecord::injection(cell, 5.0).is_extraction());
    }

    proptest! {
        #[test]
        fn perimeter_is_complete_and_unique(n in 2usize..200, head in -1.0e3f64..1.0e3) {
            let records = constant_head_perimeter(n, head);
            prop_assert_eq!(records.len(), 4 * (n - 1));

            let unique: HashSet<_> = records.iter().map(|r| r.cell).collect();
            prop_assert_eq!(unique.len(), records.len());

            for r in &records {
                prop_assert_eq!(r.head, head);
                let on_ring = r.cell.row == 0 || r.cell.row == n - 1
                    || r.cell.col == 0 || r.cell.col == n - 1;
                prop_assert!(on_ring);
            }
        }
    }
}
