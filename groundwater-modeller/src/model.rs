use crate::grid::StructuredGrid;
use crate::packages::{begin, end, line, ArrayValue, Chd, Dis, GridArray, Ic, Npf, Oc, Package, Wel};
use crate::settings::WriteOptions;
use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NewtonOptions {
    pub under_relaxation: bool,
}

/// Groundwater-flow model and the packages attached to it.
#[derive(Debug, Clone)]
pub struct GwfModel {
    pub name: String,
    pub nam_file: String,
    pub save_flows: bool,
    pub newton: Option<NewtonOptions>,
    pub dis: Option<Dis>,
    pub ic: Option<Ic>,
    pub npf: Option<Npf>,
    pub chd: Option<Chd>,
    pub wel: Option<Wel>,
    pub oc: Option<Oc>,
}

impl GwfModel {
    pub fn new(name: &str) -> Self {
        GwfModel {
            name: name.to_string(),
            nam_file: format!("{name}.nam"),
            save_flows: false,
            newton: None,
            dis: None,
            ic: None,
            npf: None,
            chd: None,
            wel: None,
            oc: None,
        }
    }

    pub fn model_type(&self) -> &'static str {
        "gwf6"
    }

    /// Attached packages in name-file order.
    pub fn package_list(&self) -> Vec<&dyn Package> {
        let mut list: Vec<&dyn Package> = Vec::new();
        if let Some(p) = &self.dis {
            list.push(p);
        }
        if let Some(p) = &self.ic {
            list.push(p);
        }
        if let Some(p) = &self.npf {
            list.push(p);
        }
        if let Some(p) = &self.chd {
            list.push(p);
        }
        if let Some(p) = &self.wel {
            list.push(p);
        }
        if let Some(p) = &self.oc {
            list.push(p);
        }
        list
    }

    /// Looks a package up by name (`chd_0`) or by type (`chd`).
    pub fn get_package(&self, name: &str) -> Option<&dyn Package> {
        let name = name.to_lowercase();
        let list = self.package_list();
        list.iter()
            .find(|p| p.package_name().eq_ignore_ascii_case(&name))
            .or_else(|| list.iter().find(|p| p.package_type() == name))
            .copied()
    }

    pub fn package_filename(&self, package: &dyn Package) -> String {
        format!("{}.{}", self.name, package.package_type())
    }

    pub fn grid(&self) -> Option<&StructuredGrid> {
        self.dis.as_ref().map(|d| &d.grid)
    }

    pub fn grb_file(&self) -> String {
        format!("{}.dis.grb", self.name)
    }

    /// Checks that stress records and arrays fit the grid.
    pub fn verify(&self) -> Result<()> {
        let grid = self
            .grid()
            .ok_or_else(|| anyhow!("Model '{}' has no DIS package", self.name))?;

        if let Some(ic) = &self.ic {
            check_array_shape(&ic.strt, grid, "strt")?;
        }
        if let Some(npf) = &self.npf {
            check_array_shape(&npf.icelltype, grid, "icelltype")?;
            check_array_shape(&npf.k, grid, "k")?;
        }

        if let Some(chd) = &self.chd {
            let mut seen = HashSet::new();
            for r in &chd.records {
                if !grid.in_bounds(r.cell) {
                    return Err(anyhow!(
                        "CHD cell {} is outside grid bounds {:?}",
                        r.cell,
                        grid.shape()
                    ));
                }
                if !seen.insert(r.cell) {
                    return Err(anyhow!("CHD cell {} is listed more than once", r.cell));
                }
            }
        }
        if let Some(wel) = &self.wel {
            for r in &wel.records {
                if !grid.in_bounds(r.cell) {
                    return Err(anyhow!(
                        "WEL cell {} is outside grid bounds {:?}",
                        r.cell,
                        grid.shape()
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn write_name_file(&self, out: &mut dyn Write, opts: &WriteOptions) -> std::io::Result<()> {
        begin(out, "options")?;
        if self.save_flows {
            line(out, opts, 1, "SAVE_FLOWS")?;
        }
        if let Some(newton) = self.newton {
            if newton.under_relaxation {
                line(out, opts, 1, "NEWTON  UNDER_RELAXATION")?;
            } else {
                line(out, opts, 1, "NEWTON")?;
            }
        }
        end(out, "options")?;

        begin(out, "packages")?;
        for p in self.package_list() {
            let text = format!("{}  {}  {}", p.ftype(), self.package_filename(p), p.package_name());
            line(out, opts, 1, &text)?;
        }
        end(out, "packages")
    }

    /// Writes the model name file and every package file into `workspace`.
    pub fn write(&self, workspace: &Path, opts: &WriteOptions) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        let path = workspace.join(&self.nam_file);
        write_file(&path, |out| self.write_name_file(out, opts))?;
        written.push(path);

        for p in self.package_list() {
            let path = workspace.join(self.package_filename(p));
            write_file(&path, |out| p.write_blocks(out, opts))?;
            tracing::debug!("Wrote {} package to {}", p.package_name(), path.display());
            written.push(path);
        }
        Ok(written)
    }
}

impl fmt::Display for GwfModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "name = {}", self.name)?;
        writeln!(f, "model_type = {}", self.model_type())?;
        writeln!(f, "nam_file = {}", self.nam_file)?;
        writeln!(f, "packages:")?;
        for p in self.package_list() {
            writeln!(f, "  {} ({})", p.package_name(), p.package_type())?;
        }
        Ok(())
    }
}

fn check_array_shape<T: ArrayValue>(
    array: &GridArray<T>,
    grid: &StructuredGrid,
    name: &str,
) -> Result<()> {
    let (expected, found) = match array {
        GridArray::Constant(_) => return Ok(()),
        GridArray::Layered(v) => (grid.nlay, v.len()),
        GridArray::Internal(v) => (grid.ncells(), v.len()),
    };
    if expected != found {
        return Err(anyhow!(
            "Array '{}' has {} values, grid needs {}",
            name,
            found,
            expected
        ));
    }
    Ok(())
}

pub(crate) fn write_file<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
{
    let file = File::create(path)
        .with_context(|| format!("Failed to create '{}'", path.display()))?;
    let mut out = BufWriter::new(file);
    body(&mut out).with_context(|| format!("Failed to write '{}'", path.display()))?;
    out.flush()
        .with_context(|| format!("Failed to write '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellId;
    use crate::stress::{constant_head_perimeter, HeadRecord, WellRecord};

    fn small_model() -> GwfModel {
        let mut gwf = GwfModel::new("demo");
        gwf.save_flows = true;
        gwf.dis = Some(Dis::new(StructuredGrid::new(3, 4, 5, 1.0, 1.0, 1.0, vec![0.0; 3])));
        gwf.ic = Some(Ic::default());
        gwf.npf = Some(Npf::default());
        gwf.chd = Some(Chd::new(vec![
            HeadRecord::new(CellId::new(0, 0, 0), 1.0),
            HeadRecord::new(CellId::new(2, 3, 4), 0.0),
        ]));
        gwf.oc = Some(Oc::default());
        gwf
    }

    #[test]
    fn package_lookup_by_name_or_type() {
        let gwf = small_model();
        assert_eq!(gwf.package_list().len(), 5);
        assert_eq!(gwf.get_package("chd_0").map(|p| p.package_type()), Some("chd"));
        assert_eq!(gwf.get_package("CHD").map(|p| p.package_name()), Some("chd_0"));
        assert!(gwf.get_package("wel").is_none());
    }

    #[test]
    fn name_file_lists_packages() {
        let mut gwf = small_model();
        gwf.newton = Some(NewtonOptions { under_relaxation: true });
        let mut buf = Vec::new();
        gwf.write_name_file(&mut buf, &WriteOptions::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("  SAVE_FLOWS\n  NEWTON  UNDER_RELAXATION\n"));
        assert!(text.contains("  CHD6  demo.chd  chd_0\n"));
        assert!(text.contains("  DIS6  demo.dis  dis\n"));
    }

    #[test]
    fn verify_rejects_out_of_grid_and_duplicate_cells() {
        let mut gwf = small_model();
        assert!(gwf.verify().is_ok());

        gwf.wel = Some(Wel::new(vec![WellRecord::new(CellId::new(3, 0, 0), -1.0)]));
        assert!(gwf.verify().unwrap_err().to_string().contains("WEL"));

        gwf.wel = None;
        let mut records = constant_head_perimeter(4, 1.0);
        records.push(records[0]);
        gwf.chd = Some(Chd::new(records));
        assert!(gwf.verify().unwrap_err().to_string().contains("more than once"));
    }

    #[test]
    fn verify_checks_array_lengths() {
        let mut gwf = small_model();
        gwf.ic = Some(Ic::new(GridArray::Layered(vec![1.0, 2.0])));
        assert!(gwf.verify().is_err());
        gwf.dis = None;
        assert!(gwf.verify().is_err());
    }
}
