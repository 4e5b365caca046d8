//! Per-cell mass-balance residuals from connection flows.

use crate::output::{CellBudgetFile, GridFile, KstpKper, OutputError, OutputResult};
use ndarray::Array3;

/// Residual of every cell for one FLOW-JA-FACE snapshot.
///
/// The solver accumulates each cell's net imbalance (face flows plus
/// boundary and storage terms) in the diagonal slot of its connection row,
/// `flowja[ia[n]]`. Cells with an empty row get `NaN`.
pub fn get_residuals(flowja: &[f64], grid: &GridFile) -> OutputResult<Array3<f64>> {
    let ia = grid.ia()?;
    check_length(flowja, &ia)?;

    let residual: Vec<f64> = ia
        .windows(2)
        .map(|w| if w[0] < w[1] { flowja[w[0]] } else { f64::NAN })
        .collect();

    let shape = grid.shape()?;
    Array3::from_shape_vec(shape, residual)
        .map_err(|e| OutputError::Malformed(format!("residual does not fit grid {shape:?}: {e}")))
}

/// Net face flow into every cell, ignoring boundary and storage terms.
pub fn face_imbalance(flowja: &[f64], ia: &[usize]) -> OutputResult<Vec<f64>> {
    check_length(flowja, ia)?;
    Ok(ia
        .windows(2)
        .map(|w| {
            if w[0] < w[1] {
                flowja[w[0] + 1..w[1]].iter().sum()
            } else {
                f64::NAN
            }
        })
        .collect())
}

/// Residuals for the snapshot at `kstpkper`.
pub fn residuals_at(
    budget: &CellBudgetFile,
    grid: &GridFile,
    kstpkper: KstpKper,
) -> OutputResult<Array3<f64>> {
    let flowja = budget.flowja(kstpkper)?;
    get_residuals(&flowja, grid)
}

/// Largest absolute residual, skipping cells without connections.
pub fn max_abs(residual: &Array3<f64>) -> f64 {
    residual
        .iter()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

fn check_length(flowja: &[f64], ia: &[usize]) -> OutputResult<()> {
    if let Some(w) = ia.windows(2).find(|w| w[0] > w[1]) {
        return Err(OutputError::Malformed(format!(
            "IA is not non-decreasing ({} then {})",
            w[0], w[1]
        )));
    }
    let nja = ia.last().copied().unwrap_or(0);
    if flowja.len() != nja {
        return Err(OutputError::Malformed(format!(
            "FLOW-JA-FACE has {} values, connectivity needs {}",
            flowja.len(),
            nja
        )));
    }
    Ok(())
}
