use crate::model::{write_file, GwfModel};
use crate::packages::{begin, end, line, Ims, Package, Tdis};
use crate::runner::{Mf6Runner, RunReport};
use crate::settings::{SimulationSettings, Verbosity, WriteOptions};
use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Entries of `mfsim.nam`, kept in step with the models of the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationNameFile {
    pub name: String,
    pub tdis_file: String,
    pub ims_file: String,
    /// (model type, name file, model name)
    pub models: Vec<(String, String, String)>,
}

impl Package for SimulationNameFile {
    fn package_type(&self) -> &'static str {
        "nam"
    }

    fn package_name(&self) -> &str {
        &self.name
    }

    fn write_blocks(&self, out: &mut dyn Write, opts: &WriteOptions) -> io::Result<()> {
        begin(out, "options")?;
        end(out, "options")?;

        begin(out, "timing")?;
        line(out, opts, 1, &format!("TDIS6  {}", self.tdis_file))?;
        end(out, "timing")?;

        begin(out, "models")?;
        for (mtype, nam, name) in &self.models {
            line(out, opts, 1, &format!("{mtype}  {nam}  {name}"))?;
        }
        end(out, "models")?;

        begin(out, "exchanges")?;
        end(out, "exchanges")?;

        begin(out, "solutiongroup  1")?;
        let names: Vec<&str> = self.models.iter().map(|(_, _, n)| n.as_str()).collect();
        line(out, opts, 1, &format!("ims6  {}  {}", self.ims_file, names.join(" ")))?;
        end(out, "solutiongroup  1")
    }
}

/// A MODFLOW 6 simulation: timing, solution settings and its models.
pub struct Simulation {
    pub name: String,
    pub workspace: PathBuf,
    pub exe_name: String,
    pub settings: SimulationSettings,
    pub tdis: Tdis,
    pub ims: Ims,
    nam: SimulationNameFile,
    models: Vec<GwfModel>,
}

impl Simulation {
    pub fn new(name: &str, workspace: impl Into<PathBuf>, exe_name: &str) -> Self {
        Simulation {
            name: name.to_string(),
            workspace: workspace.into(),
            exe_name: exe_name.to_string(),
            settings: SimulationSettings::default(),
            tdis: Tdis::default(),
            ims: Ims::default(),
            nam: SimulationNameFile {
                name: "nam".to_string(),
                tdis_file: format!("{name}.tdis"),
                ims_file: format!("{name}.ims"),
                models: Vec::new(),
            },
            models: Vec::new(),
        }
    }

    pub fn add_model(&mut self, model: GwfModel) -> Result<()> {
        if self.get_model(&model.name).is_some() {
            return Err(anyhow!("Model '{}' already exists", model.name));
        }
        self.nam.models.push((
            model.model_type().to_string(),
            model.nam_file.clone(),
            model.name.clone(),
        ));
        self.models.push(model);
        Ok(())
    }

    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn get_model(&self, name: &str) -> Option<&GwfModel> {
        self.models.iter().find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn get_model_mut(&mut self, name: &str) -> Option<&mut GwfModel> {
        self.models.iter_mut().find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn models(&self) -> &[GwfModel] {
        &self.models
    }

    /// Simulation-level packages: `tdis`, `ims` and `nam`. The framework's
    /// `<type>_-1` names (`ims_-1`) resolve to the same packages.
    pub fn get_package(&self, name: &str) -> Option<&dyn Package> {
        let name = name.to_lowercase();
        let name = name.strip_suffix("_-1").unwrap_or(&name);
        let packages: [&dyn Package; 3] = [&self.tdis, &self.ims, &self.nam];
        packages
            .into_iter()
            .find(|p| p.package_type() == name || p.package_name() == name)
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.workspace.join(file)
    }

    /// Writes `mfsim.nam`, the simulation packages and every model.
    pub fn write_simulation(&self) -> Result<Vec<PathBuf>> {
        if self.models.is_empty() {
            return Err(anyhow!("Simulation '{}' has no models", self.name));
        }
        if self.settings.verify_data {
            for model in &self.models {
                model
                    .verify()
                    .with_context(|| format!("Data check failed for model '{}'", model.name))?;
            }
        }

        std::fs::create_dir_all(&self.workspace).with_context(|| {
            format!("Failed to create workspace '{}'", self.workspace.display())
        })?;

        let opts = self.settings.write_options();
        let mut written = Vec::new();

        let path = self.path("mfsim.nam");
        write_file(&path, |out| self.nam.write_blocks(out, &opts))?;
        written.push(path);

        let path = self.path(&self.nam.tdis_file);
        write_file(&path, |out| self.tdis.write_blocks(out, &opts))?;
        written.push(path);

        let path = self.path(&self.nam.ims_file);
        write_file(&path, |out| self.ims.write_blocks(out, &opts))?;
        written.push(path);

        for model in &self.models {
            if self.settings.verbosity == Verbosity::Verbose {
                info!("Writing model '{}'", model.name);
            }
            written.extend(model.write(&self.workspace, &opts)?);
        }

        match self.settings.verbosity {
            Verbosity::Quiet => debug!("Wrote {} files", written.len()),
            _ => info!(
                "Wrote {} files to {}",
                written.len(),
                self.workspace.display()
            ),
        }
        Ok(written)
    }

    /// Output files the solver is expected to produce for every model.
    pub fn expected_outputs(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for model in &self.models {
            if let Some(oc) = &model.oc {
                files.extend(oc.head_file.iter().map(|f| self.path(f)));
                files.extend(oc.budget_file.iter().map(|f| self.path(f)));
            }
        }
        files
    }

    /// Runs the solver on the written input files and waits for it to exit.
    pub fn run_simulation(&self) -> Result<RunReport> {
        let runner = Mf6Runner::new(&self.exe_name);
        let report = runner.run(&self.workspace, &self.expected_outputs())?;
        if self.settings.verbosity != Verbosity::Quiet {
            info!(
                "Solver finished in {:.2} s ({} lines of output)",
                report.elapsed.as_secs_f64(),
                report.stdout.len()
            );
        }
        Ok(report)
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }
}

impl fmt::Display for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "sim_name = {}", self.name)?;
        writeln!(f, "sim_path = {}", self.workspace.display())?;
        writeln!(f, "exe_name = {}", self.exe_name)?;
        writeln!(f)?;
        writeln!(f, "###################")?;
        writeln!(f, "Package mfsim.nam")?;
        writeln!(f, "###################")?;
        writeln!(f)?;
        writeln!(f, "{}", &self.nam as &dyn Package)?;
        writeln!(f, "###################")?;
        writeln!(f, "Package {}", self.tdis.name)?;
        writeln!(f, "###################")?;
        writeln!(f)?;
        writeln!(f, "{}", &self.tdis as &dyn Package)?;
        writeln!(f, "@@@@@@@@@@@@@@@@@@@@")?;
        writeln!(f, "Model {}", self.models.iter().map(|m| m.name.as_str()).collect::<Vec<_>>().join(", "))?;
        writeln!(f, "@@@@@@@@@@@@@@@@@@@@")?;
        for model in &self.models {
            writeln!(f, "{model}")?;
        }
        Ok(())
    }
}
