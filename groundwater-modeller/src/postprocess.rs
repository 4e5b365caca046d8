//! Loads solver output for a model and reduces it to the fields that get
//! plotted and summarised after a run.

use crate::grid::CellId;
use crate::heads::HeadField;
use crate::model::GwfModel;
use crate::output::{CellBudgetFile, GridFile, HeadFile, KstpKper};
use crate::residual::{face_imbalance, get_residuals, max_abs};
use anyhow::{anyhow, Context, Result};
use ndarray::Array3;
use std::path::Path;
use tracing::info;

/// Heads and mass-balance residuals of one saved snapshot.
#[derive(Debug, Clone)]
pub struct RunResults {
    pub kstpkper: KstpKper,
    pub totim: f64,
    pub heads: HeadField,
    pub residual: Array3<f64>,
    pub face_imbalance: Vec<f64>,
    pub chd_cells: Vec<CellId>,
}

impl RunResults {
    /// Reads the head, budget and grid files of `model` from `workspace`.
    pub fn load(workspace: &Path, model: &GwfModel, kstpkper: KstpKper) -> Result<Self> {
        let oc = model
            .oc
            .as_ref()
            .ok_or_else(|| anyhow!("Model '{}' has no output control", model.name))?;
        let head_file = oc
            .head_file
            .as_ref()
            .ok_or_else(|| anyhow!("Model '{}' does not save heads", model.name))?;
        let budget_file = oc
            .budget_file
            .as_ref()
            .ok_or_else(|| anyhow!("Model '{}' does not save budgets", model.name))?;

        let path = workspace.join(head_file);
        let hds = HeadFile::open(&path)
            .with_context(|| format!("Failed to read heads from '{}'", path.display()))?;
        let heads = hds.get_data(kstpkper)?;
        let totim = hds
            .headers()
            .find(|h| (h.kstp - 1, h.kper - 1) == kstpkper)
            .map(|h| h.totim)
            .unwrap_or_default();

        let path = workspace.join(budget_file);
        let cbc = CellBudgetFile::open(&path)
            .with_context(|| format!("Failed to read budget from '{}'", path.display()))?;
        let flowja = cbc.flowja(kstpkper)?;

        let path = workspace.join(model.grb_file());
        let grb = GridFile::open(&path)
            .with_context(|| format!("Failed to read grid from '{}'", path.display()))?;
        let residual = get_residuals(&flowja, &grb)?;
        let face_imbalance = face_imbalance(&flowja, &grb.ia()?)?;

        if residual.dim() != heads.dim() {
            return Err(anyhow!(
                "Grid file shape {:?} does not match head shape {:?}",
                residual.dim(),
                heads.dim()
            ));
        }

        let chd_cells = model
            .chd
            .as_ref()
            .map(|chd| chd.records.iter().map(|r| r.cell).collect())
            .unwrap_or_default();

        Ok(RunResults {
            kstpkper,
            totim,
            heads: HeadField::new(heads),
            residual,
            face_imbalance,
            chd_cells,
        })
    }

    pub fn max_residual(&self) -> f64 {
        max_abs(&self.residual)
    }

    pub fn log_summary(&self) {
        info!(
            "Snapshot kstp={} kper={} (t={})",
            self.kstpkper.0, self.kstpkper.1, self.totim
        );
        if let Some((lo, hi)) = self.heads.min_max() {
            info!("Head range: {:.4} to {:.4}", lo, hi);
        }
        info!("Max |residual|: {:.3e}", self.max_residual());
        let net = self
            .face_imbalance
            .iter()
            .filter(|v| v.is_finite())
            .fold(0.0_f64, |acc, v| acc.max(v.abs()));
        info!("Max |net face flow|: {:.3e}", net);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::StructuredGrid;
    use crate::output::{fixture, strip_grb};
    use crate::packages::{Chd, Dis, Oc};
    use crate::stress::HeadRecord;
    use approx::assert_relative_eq;
    use std::fs;

    fn strip_model() -> GwfModel {
        let mut gwf = GwfModel::new("strip");
        gwf.dis = Some(Dis::new(StructuredGrid::new(1, 1, 3, 1.0, 1.0, 1.0, vec![0.0])));
        gwf.chd = Some(Chd::new(vec![HeadRecord::new(CellId::new(0, 0, 0), 10.0)]));
        gwf.oc = Some(Oc {
            head_file: Some("strip.hds".to_string()),
            budget_file: Some("strip.cbc".to_string()),
            ..Oc::default()
        });
        gwf
    }

    fn write_outputs(dir: &Path) {
        let mut hds = Vec::new();
        fixture::i32s(&mut hds, &[1, 1]);
        fixture::f64s(&mut hds, &[1.0, 1.0]);
        fixture::text(&mut hds, "HEAD", 16);
        fixture::i32s(&mut hds, &[3, 1, 1]);
        fixture::f64s(&mut hds, &[10.0, 9.0, 9.5]);
        fs::write(dir.join("strip.hds"), hds).unwrap();

        let mut cbc = Vec::new();
        fixture::i32s(&mut cbc, &[1, 1]);
        fixture::text(&mut cbc, "FLOW-JA-FACE", 16);
        fixture::i32s(&mut cbc, &[7, 1, -1, 1]);
        fixture::f64s(&mut cbc, &[1.0, 1.0, 1.0]);
        fixture::f64s(&mut cbc, &[0.0, -1.5, 0.25, 1.5, 0.5, 0.0, -0.5]);
        fs::write(dir.join("strip.cbc"), cbc).unwrap();

        fs::write(dir.join("strip.dis.grb"), strip_grb()).unwrap();
    }

    #[test]
    fn loads_heads_and_residuals() {
        let dir = tempfile::tempdir().unwrap();
        write_outputs(dir.path());

        let results = RunResults::load(dir.path(), &strip_model(), (0, 0)).unwrap();
        assert_eq!(results.heads.shape(), (1, 1, 3));
        assert_relative_eq!(results.totim, 1.0);
        assert_relative_eq!(results.residual[[0, 0, 1]], 0.25);
        assert_relative_eq!(results.max_residual(), 0.25);
        assert_relative_eq!(results.face_imbalance[1], 2.0);
        assert_eq!(results.chd_cells, vec![CellId::new(0, 0, 0)]);
    }

    #[test]
    fn missing_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_outputs(dir.path());
        assert!(RunResults::load(dir.path(), &strip_model(), (0, 1)).is_err());
    }

    #[test]
    fn missing_files_name_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = RunResults::load(dir.path(), &strip_model(), (0, 0)).unwrap_err();
        assert!(format!("{err:#}").contains("strip.hds"));
    }
}
