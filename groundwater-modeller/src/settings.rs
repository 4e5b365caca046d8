use serde::{Deserialize, Serialize};

/// How much the simulation reports while writing and running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

/// Simulation-wide switches that control how input files are produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub verbosity: Verbosity,
    /// Prefix for every data line inside a block
    pub indent: String,
    /// Digits after the decimal point for floating point values
    pub float_precision: usize,
    /// Minimum field width for floating point values
    pub float_characters: usize,
    /// Check record locations against the grid before writing
    pub verify_data: bool,
    /// Derive MAXBOUND from the record count
    pub auto_set_sizes: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            verbosity: Verbosity::Normal,
            indent: "  ".to_string(),
            float_precision: 8,
            float_characters: 15,
            verify_data: true,
            auto_set_sizes: true,
        }
    }
}

impl SimulationSettings {
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            indent: self.indent.clone(),
            float_precision: self.float_precision,
            float_characters: self.float_characters,
            auto_set_sizes: self.auto_set_sizes,
        }
    }
}

/// Formatting state handed to package writers.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOptions {
    pub indent: String,
    pub float_precision: usize,
    pub float_characters: usize,
    pub auto_set_sizes: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        SimulationSettings::default().write_options()
    }
}

impl WriteOptions {
    pub fn float(&self, value: f64) -> String {
        format!(
            "{:>width$.prec$}",
            value,
            width = self.float_characters,
            prec = self.float_precision
        )
    }

    pub fn indent(&self, depth: usize) -> String {
        self.indent.repeat(depth)
    }
}
