use crate::grid::{equal_layer_bottoms, StructuredGrid};
use crate::packages::{Complexity, LinearAcceleration, PeriodData, SaveFrequency, TimeUnits};
use crate::settings::SimulationSettings;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

const TUTORIAL01: &str = include_str!("../configs/tutorial01.toml");

/// Simulation name, workspace and solver executable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<PathBuf>, // Defaults to a directory named after the simulation
    #[serde(default = "default_exe_name")]
    pub exe_name: String,
}

fn default_exe_name() -> String {
    "mf6".to_string()
}

impl SimulationConfig {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.name.contains(char::is_whitespace) {
            return Err(anyhow!("Simulation name must be a single word, got '{}'", self.name));
        }
        Ok(())
    }

    pub fn workspace(&self) -> PathBuf {
        self.workspace
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.name))
    }
}

/// Stress periods
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    #[serde(default)]
    pub time_units: TimeUnits,
    #[serde(default = "default_periods")]
    pub periods: Vec<PeriodData>,
}

fn default_periods() -> Vec<PeriodData> {
    vec![PeriodData::default()]
}

impl Default for TimeConfig {
    fn default() -> Self {
        TimeConfig {
            time_units: TimeUnits::default(),
            periods: default_periods(),
        }
    }
}

impl TimeConfig {
    fn validate(&self) -> Result<()> {
        if self.periods.is_empty() {
            return Err(anyhow!("At least one stress period must be defined"));
        }
        for (i, p) in self.periods.iter().enumerate() {
            if p.perlen < 0.0 || p.nstp == 0 || p.tsmult <= 0.0 {
                return Err(anyhow!(
                    "Period {} is invalid (perlen={}, nstp={}, tsmult={})",
                    i + 1,
                    p.perlen,
                    p.nstp,
                    p.tsmult
                ));
            }
        }
        Ok(())
    }
}

/// Iterative model solution options, left to the solver when unset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolverConfig {
    pub complexity: Option<Complexity>,
    pub linear_acceleration: Option<LinearAcceleration>,
    pub outer_maximum: Option<usize>,
    pub outer_dvclose: Option<f64>,
    pub inner_maximum: Option<usize>,
    pub inner_dvclose: Option<f64>,
}

/// Groundwater-flow model options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub save_flows: bool,
    #[serde(default)]
    pub newton: bool,
    #[serde(default)]
    pub under_relaxation: bool,
}

/// Grid configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub nlay: usize,
    pub nrow: usize,
    pub ncol: usize,
    pub length: Option<f64>,    // Domain side; spacing becomes length / (n - 1)
    pub thickness: Option<f64>, // Split into equal layers below top
    pub delr: Option<f64>,
    pub delc: Option<f64>,
    #[serde(default = "default_top")]
    pub top: f64,
    pub botm: Option<Vec<f64>>,
    pub length_units: Option<String>, // feet, meters or centimeters
}

fn default_top() -> f64 {
    1.0
}

impl GridConfig {
    fn validate(&self) -> Result<()> {
        if self.nlay == 0 || self.nrow == 0 || self.ncol == 0 {
            return Err(anyhow!(
                "Grid dimensions must be positive (nlay={}, nrow={}, ncol={})",
                self.nlay,
                self.nrow,
                self.ncol
            ));
        }
        let grid = self.to_grid();
        if grid.delr <= 0.0 || grid.delc <= 0.0 || !grid.delr.is_finite() || !grid.delc.is_finite() {
            return Err(anyhow!(
                "Grid spacing must be positive (delr={}, delc={})",
                grid.delr,
                grid.delc
            ));
        }
        if let Some(units) = &self.length_units {
            if !["unknown", "feet", "meters", "centimeters"].contains(&units.to_lowercase().as_str()) {
                return Err(anyhow!("Unknown length_units '{}'", units));
            }
        }
        if grid.botm.len() != self.nlay {
            return Err(anyhow!(
                "botm has {} values for {} layers",
                grid.botm.len(),
                self.nlay
            ));
        }
        for k in 0..self.nlay {
            let dz = grid.layer_thickness(k);
            if dz < 0.0 {
                return Err(anyhow!(
                    "Layer {} has negative thickness (top={}, bottom={})",
                    k + 1,
                    grid.layer_top(k),
                    grid.botm[k]
                ));
            }
            if dz == 0.0 {
                warn!("Layer {} has zero thickness", k + 1);
            }
        }
        Ok(())
    }

    pub fn to_grid(&self) -> StructuredGrid {
        let spacing = |n: usize| self.length.map(|l| l / (n.max(2) - 1) as f64);
        let delr = self.delr.or_else(|| spacing(self.ncol)).unwrap_or(1.0);
        let delc = self.delc.or_else(|| spacing(self.nrow)).unwrap_or(1.0);
        let botm = match (&self.botm, self.thickness) {
            (Some(b), _) => b.clone(),
            (None, Some(h)) => equal_layer_bottoms(self.top, h, self.nlay),
            (None, None) => vec![0.0; self.nlay],
        };
        StructuredGrid::new(self.nlay, self.nrow, self.ncol, delr, delc, self.top, botm)
    }
}

/// Uniform aquifer properties and starting head
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AquiferConfig {
    #[serde(default = "default_k")]
    pub k: f64,
    #[serde(default)]
    pub icelltype: i32, // 0 confined, 1 convertible
    #[serde(default = "default_initial_head")]
    pub initial_head: f64,
    #[serde(default)]
    pub save_specific_discharge: bool,
}

fn default_k() -> f64 {
    1.0
}

fn default_initial_head() -> f64 {
    1.0
}

impl Default for AquiferConfig {
    fn default() -> Self {
        AquiferConfig {
            k: default_k(),
            icelltype: 0,
            initial_head: default_initial_head(),
            save_specific_discharge: false,
        }
    }
}

impl AquiferConfig {
    fn validate(&self) -> Result<()> {
        if self.k <= 0.0 {
            return Err(anyhow!("Hydraulic conductivity must be positive, got {}", self.k));
        }
        if !(0..=1).contains(&self.icelltype) {
            return Err(anyhow!("icelltype must be 0 or 1, got {}", self.icelltype));
        }
        Ok(())
    }
}

/// A single constant-head cell (zero-based)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadCellConfig {
    pub layer: usize,
    pub row: usize,
    pub col: usize,
    pub head: f64,
}

/// Constant-head boundary: a perimeter ring and/or explicit cells
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoundaryConfig {
    pub perimeter_head: Option<f64>,
    #[serde(default)]
    pub perimeter_layer: usize,
    #[serde(default)]
    pub cells: Vec<HeadCellConfig>,
}

/// Well placed by fractional position; negative rate extracts water
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellConfig {
    pub layer: usize,
    pub row_fraction: f64,
    pub col_fraction: f64,
    pub rate: f64,
}

impl WellConfig {
    fn validate(&self, nlay: usize) -> Result<()> {
        if self.layer >= nlay {
            return Err(anyhow!("Well layer {} is outside the {} model layers", self.layer, nlay));
        }
        for f in [self.row_fraction, self.col_fraction] {
            if !(0.0..1.0).contains(&f) {
                return Err(anyhow!("Well position fraction must be in [0, 1), got {}", f));
            }
        }
        Ok(())
    }
}

/// Output control and where figures go
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub head_file: Option<String>,
    pub budget_file: Option<String>,
    #[serde(default = "default_save")]
    pub save_head: SaveFrequency,
    #[serde(default = "default_save")]
    pub save_budget: SaveFrequency,
    pub print_head: Option<SaveFrequency>,
    #[serde(default = "default_plots_dir")]
    pub plots_dir: String,
}

fn default_save() -> SaveFrequency {
    SaveFrequency::All
}

fn default_plots_dir() -> String {
    "output".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            head_file: None,
            budget_file: None,
            save_head: default_save(),
            save_budget: default_save(),
            print_head: None,
            plots_dir: default_plots_dir(),
        }
    }
}

/// Visualization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizationConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    #[serde(default = "default_contour_interval")]
    pub contour_interval: f64,
    #[serde(default = "default_image_size")]
    pub image_width: u32,
    #[serde(default = "default_image_size")]
    pub image_height: u32,
}

fn default_enabled() -> bool {
    true
}

fn default_contour_interval() -> f64 {
    1.0
}

fn default_image_size() -> u32 {
    800
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        VisualizationConfig {
            enabled: default_enabled(),
            vmin: None,
            vmax: None,
            contour_interval: default_contour_interval(),
            image_width: default_image_size(),
            image_height: default_image_size(),
        }
    }
}

impl VisualizationConfig {
    fn validate(&self) -> Result<()> {
        if let (Some(lo), Some(hi)) = (self.vmin, self.vmax) {
            if lo >= hi {
                return Err(anyhow!("vmin must be below vmax (vmin={}, vmax={})", lo, hi));
            }
        }
        if self.contour_interval < 0.0 {
            return Err(anyhow!(
                "contour_interval must not be negative, got {}",
                self.contour_interval
            ));
        }
        if self.image_width == 0 || self.image_height == 0 {
            return Err(anyhow!(
                "Image dimensions must be positive (width={}, height={})",
                self.image_width,
                self.image_height
            ));
        }
        Ok(())
    }
}

/// Complete model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub time: TimeConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub model: ModelConfig,
    pub grid: GridConfig,
    #[serde(default)]
    pub aquifer: AquiferConfig,
    #[serde(default)]
    pub boundary: BoundaryConfig,
    #[serde(default)]
    pub wells: Vec<WellConfig>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub settings: SimulationSettings,
    #[serde(default)]
    pub visualization: VisualizationConfig,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file '{}': {}", path, e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| anyhow!("Failed to parse TOML config: {}", e))?;

        // Validate before returning
        config.validate()?;

        Ok(config)
    }

    /// The perimeter-head and pumping-well tutorial model.
    pub fn tutorial01() -> Result<Self> {
        Self::from_toml(TUTORIAL01)
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        self.time.validate()?;
        self.grid.validate()?;
        self.aquifer.validate()?;
        self.visualization.validate()?;

        for well in &self.wells {
            well.validate(self.grid.nlay)?;
        }

        if self.boundary.perimeter_head.is_some() && self.boundary.perimeter_layer >= self.grid.nlay {
            return Err(anyhow!(
                "Perimeter layer {} is outside the {} model layers",
                self.boundary.perimeter_layer,
                self.grid.nlay
            ));
        }
        if self.boundary.perimeter_head.is_none() && self.boundary.cells.is_empty() {
            warn!("No constant-head cells defined, the model may have no unique solution");
        }
        if self.settings.float_characters == 0 {
            return Err(anyhow!("float_characters must be positive"));
        }

        Ok(())
    }

    pub fn head_file(&self) -> String {
        self.output
            .head_file
            .clone()
            .unwrap_or_else(|| format!("{}.hds", self.simulation.name))
    }

    pub fn budget_file(&self) -> String {
        self.output
            .budget_file
            .clone()
            .unwrap_or_else(|| format!("{}.cbc", self.simulation.name))
    }

    /// Log configuration summary
    pub fn print_summary(&self) {
        let grid = self.grid.to_grid();
        info!("=== Model Configuration ===");
        info!(
            "Simulation: {} in {} (solver '{}')",
            self.simulation.name,
            self.simulation.workspace().display(),
            self.simulation.exe_name
        );
        info!(
            "Grid: {}x{}x{} ({} x {} m, delr={}, delc={})",
            grid.nlay,
            grid.nrow,
            grid.ncol,
            grid.width(),
            grid.height(),
            grid.delr,
            grid.delc
        );
        info!(
            "Time: {} period(s), {} {:?}",
            self.time.periods.len(),
            self.time.periods.iter().map(|p| p.perlen).sum::<f64>(),
            self.time.time_units
        );
        info!(
            "Aquifer: k={}, icelltype={}, initial head={}",
            self.aquifer.k, self.aquifer.icelltype, self.aquifer.initial_head
        );
        if let Some(h) = self.boundary.perimeter_head {
            info!("Boundary: perimeter of layer {} held at {}", self.boundary.perimeter_layer + 1, h);
        }
        if !self.boundary.cells.is_empty() {
            info!("Boundary: {} explicit constant-head cell(s)", self.boundary.cells.len());
        }
        for (i, w) in self.wells.iter().enumerate() {
            let kind = if w.rate < 0.0 { "extraction" } else { "injection" };
            info!(
                "  Well {}: layer {}, fractions ({}, {}), rate={} ({})",
                i, w.layer + 1, w.row_fraction, w.col_fraction, w.rate, kind
            );
        }
        info!("===========================");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bundled_tutorial_config_is_valid() {
        let config = Config::tutorial01().unwrap();
        let grid = config.grid.to_grid();
        assert_eq!(grid.shape(), (10, 101, 101));
        assert_relative_eq!(grid.delr, 4.0);
        assert_relative_eq!(grid.botm[9], -50.0);
        assert_eq!(config.wells[0].rate, -1000.0);
        assert_eq!(config.head_file(), "tutorial01_mf6.hds");
        assert_eq!(config.grid.length_units.as_deref(), Some("meters"));
        assert_eq!(config.budget_file(), "tutorial01_mf6.cbb");
    }

    #[test]
    fn minimal_config_uses_framework_defaults() {
        let config = Config::from_toml(
            r#"
            [simulation]
            name = "tiny"

            [grid]
            nlay = 3
            nrow = 4
            ncol = 5

            [[boundary.cells]]
            layer = 0
            row = 0
            col = 0
            head = 1.0
            "#,
        )
        .unwrap();
        let grid = config.grid.to_grid();
        assert_eq!(grid.delr, 1.0);
        assert_eq!(grid.top, 1.0);
        assert_eq!(grid.botm, vec![0.0; 3]);
        assert_eq!(config.time.periods.len(), 1);
        assert_eq!(config.simulation.exe_name, "mf6");
        assert_eq!(config.simulation.workspace(), PathBuf::from("tiny"));
        assert_eq!(config.budget_file(), "tiny.cbc");
    }

    #[test]
    fn rejects_bad_values() {
        let base = |extra: &str| {
            format!(
                "[simulation]\nname = \"x\"\n[grid]\nnlay = 1\nnrow = 2\nncol = 2\n{extra}"
            )
        };
        assert!(Config::from_toml(&base("[aquifer]\nk = -1.0\n")).is_err());
        let bad_units = "[simulation]\nname = \"x\"\n[grid]\nnlay = 1\nnrow = 2\nncol = 2\nlength_units = \"furlongs\"\n";
        assert!(Config::from_toml(bad_units).is_err());
        assert!(Config::from_toml(&base(
            "[[wells]]\nlayer = 0\nrow_fraction = 1.0\ncol_fraction = 0.0\nrate = -1.0\n"
        ))
        .is_err());
        assert!(Config::from_toml(&base("[visualization]\nvmin = 5.0\nvmax = 1.0\n")).is_err());
        assert!(Config::from_toml(&base("[boundary]\nperimeter_head = 1.0\nperimeter_layer = 3\n")).is_err());
    }

    #[test]
    fn inverted_layers_are_rejected() {
        let toml = "[simulation]\nname = \"x\"\n[grid]\nnlay = 2\nnrow = 2\nncol = 2\ntop = 0.0\nbotm = [-1.0, 1.0]\n";
        let err = Config::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("negative thickness"));
    }
}
