//! Builds, writes and runs MODFLOW 6 groundwater-flow simulations and reads
//! their results back for plotting and mass-balance checks.

pub mod config;
pub mod grid;
pub mod heads;
pub mod model;
pub mod output;
pub mod packages;
pub mod postprocess;
pub mod residual;
pub mod runner;
pub mod scenario;
pub mod settings;
pub mod simulation;
pub mod stress;
pub mod visualisation;
