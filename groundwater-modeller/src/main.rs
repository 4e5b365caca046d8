use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use groundwater_modeller::config::Config;
use groundwater_modeller::postprocess::RunResults;
use groundwater_modeller::scenario::build_simulation;
use groundwater_modeller::simulation::Simulation;
use groundwater_modeller::visualisation::FieldVisualiser;
use std::path::Path;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Build, run and inspect MODFLOW 6 groundwater-flow models
#[derive(Parser)]
#[command(name = "groundwater-modeller")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MODFLOW 6 groundwater-flow model builder", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the input files, run the solver, then summarise and plot
    Run(RunArgs),
    /// Write the input files only
    Write(ConfigArgs),
    /// List the models and packages of a simulation
    Info(InfoArgs),
}

#[derive(Args)]
struct ConfigArgs {
    /// TOML model configuration, the bundled tutorial model if omitted
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Zero-based time step of the snapshot to post-process
    #[arg(long, default_value_t = 0)]
    kstp: usize,

    /// Zero-based stress period of the snapshot to post-process
    #[arg(long, default_value_t = 0)]
    kper: usize,

    /// Skip figure output
    #[arg(long)]
    no_plots: bool,
}

#[derive(Args)]
struct InfoArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Print the contents of these packages (name or type)
    #[arg(short, long)]
    package: Vec<String>,
}

impl ConfigArgs {
    fn load(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::from_file(path),
            None => Config::tutorial01(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Write(args) => {
            let config = args.load()?;
            config.print_summary();
            build_simulation(&config)?.write_simulation()?;
            Ok(())
        }
        Commands::Info(args) => show_info(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let config = args.config.load()?;
    config.print_summary();

    let sim = build_simulation(&config)?;
    sim.write_simulation()?;
    sim.run_simulation()?;

    for model in sim.models() {
        let results = RunResults::load(sim.workspace(), model, (args.kstp, args.kper))?;
        results.log_summary();

        if config.visualization.enabled && !args.no_plots {
            let out_dir = sim.workspace().join(&config.output.plots_dir);
            plot_results(&config, &sim, &model.name, &results, &out_dir)?;
        }
    }

    info!("Run complete");
    Ok(())
}

fn plot_results(
    config: &Config,
    sim: &Simulation,
    model: &str,
    results: &RunResults,
    out_dir: &Path,
) -> Result<()> {
    let grid = sim
        .get_model(model)
        .and_then(|m| m.grid())
        .ok_or_else(|| anyhow!("Model '{}' has no grid", model))?;
    let vis = &config.visualization;
    let visualiser = FieldVisualiser::new(out_dir, vis.image_width, vis.image_height)?
        .with_range(vis.vmin, vis.vmax)
        .with_contour_interval(vis.contour_interval);

    visualiser.plot_run(results, grid)?;
    Ok(())
}

fn show_info(args: InfoArgs) -> Result<()> {
    let config = args.config.load()?;
    let sim = build_simulation(&config)?;

    println!("{sim}");
    for name in sim.model_names() {
        if let Some(model) = sim.get_model(name) {
            println!("{} is a {} model", name, model.model_type());
            let packages: Vec<&str> = model.package_list().iter().map(|p| p.package_name()).collect();
            println!("  packages: {}", packages.join(", "));
        }
    }

    for wanted in &args.package {
        let package = sim.get_package(wanted).or_else(|| {
            sim.models().iter().find_map(|m| m.get_package(wanted))
        });
        match package {
            Some(p) => println!("{p}"),
            None => warn!("No package named '{}'", wanted),
        }
    }
    Ok(())
}
