use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tc_components::{ComponentError, Heater, HeaterTarget};
use tc_core::units::{k, kgps, pa};
use tc_core::{Config, TcError};
use tc_cycle::{CycleError, CycleReport};
use tc_fluids::{FlowState, Fluid, FluidError, PerfectGasBackend, PropertyAdapter};
use tracing_subscriber::EnvFilter;

mod demos;

use demos::{BraytonParams, RankineParams};

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Config(#[from] TcError),
    #[error(transparent)]
    Fluid(#[from] FluidError),
    #[error(transparent)]
    Component(#[from] ComponentError),
    #[error(transparent)]
    Cycle(#[from] CycleError),
}

pub type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "tc-cli")]
#[command(about = "thermocycle CLI - steady-state thermodynamic cycle solver", long_about = None)]
struct Cli {
    /// YAML solver configuration; defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print the solved cycle as YAML instead of a table
    #[arg(long, global = true)]
    yaml: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    Coolprop,
    PerfectGas,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration
    Config,
    /// Solve a simple Rankine cycle
    Rankine {
        #[arg(long, default_value = "Water")]
        fluid: String,
        /// Mass flow [kg/s]
        #[arg(long, default_value_t = 1.0)]
        mass_flow: f64,
        /// Boiler pressure [Pa]
        #[arg(long, default_value_t = 8.0e6)]
        p_high: f64,
        /// Condenser pressure [Pa]
        #[arg(long, default_value_t = 1.0e4)]
        p_low: f64,
        /// Turbine inlet temperature [K]
        #[arg(long, default_value_t = 773.15)]
        t_max: f64,
        #[arg(long, default_value_t = 0.75)]
        eta_pump: f64,
        #[arg(long, default_value_t = 0.85)]
        eta_turbine: f64,
    },
    /// Solve a recuperated Brayton cycle
    Brayton {
        #[arg(long, default_value = "Helium")]
        fluid: String,
        #[arg(long, value_enum, default_value_t = Backend::PerfectGas)]
        backend: Backend,
        #[arg(long, default_value_t = 1.0)]
        mass_flow: f64,
        /// Compressor inlet pressure [Pa]
        #[arg(long, default_value_t = 2.0e6)]
        p_low: f64,
        #[arg(long, default_value_t = 2.0)]
        pressure_ratio: f64,
        /// Compressor inlet temperature [K]
        #[arg(long, default_value_t = 300.0)]
        t_min: f64,
        /// Turbine inlet temperature [K]
        #[arg(long, default_value_t = 900.0)]
        t_max: f64,
        #[arg(long, default_value_t = 0.85)]
        eta_compressor: f64,
        #[arg(long, default_value_t = 0.9)]
        eta_turbine: f64,
        /// Recuperator effectiveness
        #[arg(long, default_value_t = 0.8)]
        effectiveness: f64,
        /// Recuperator cells
        #[arg(long, default_value_t = 10)]
        cells: usize,
    },
    /// Heat duty to take a stream between two temperatures at constant pressure
    Heater {
        #[arg(long, default_value = "Helium")]
        fluid: String,
        #[arg(long, value_enum, default_value_t = Backend::Coolprop)]
        backend: Backend,
        #[arg(long, default_value_t = 1.0)]
        mass_flow: f64,
        /// Pressure [Pa]
        #[arg(long)]
        p: f64,
        /// Inlet temperature [K]
        #[arg(long)]
        t_in: f64,
        /// Outlet temperature [K]
        #[arg(long)]
        t_out: f64,
        /// Fraction of the external heat that reaches the fluid
        #[arg(long, default_value_t = 1.0)]
        efficiency: f64,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Config => {
            print!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
        Commands::Rankine {
            fluid,
            mass_flow,
            p_high,
            p_low,
            t_max,
            eta_pump,
            eta_turbine,
        } => {
            let params = RankineParams {
                fluid,
                mass_flow,
                p_high,
                p_low,
                t_max,
                eta_pump,
                eta_turbine,
            };
            let adapter = PropertyAdapter::from_config(&config);
            let cycle = demos::rankine(adapter, config, &params)?;
            solve_and_print(cycle, cli.yaml)
        }
        Commands::Brayton {
            fluid,
            backend,
            mass_flow,
            p_low,
            pressure_ratio,
            t_min,
            t_max,
            eta_compressor,
            eta_turbine,
            effectiveness,
            cells,
        } => {
            let params = BraytonParams {
                fluid,
                mass_flow,
                p_low,
                pressure_ratio,
                t_min,
                t_max,
                eta_compressor,
                eta_turbine,
                effectiveness,
                cells,
            };
            let adapter = adapter_for(backend, &config);
            let cycle = demos::brayton(adapter, config, &params)?;
            solve_and_print(cycle, cli.yaml)
        }
        Commands::Heater {
            fluid,
            backend,
            mass_flow,
            p,
            t_in,
            t_out,
            efficiency,
        } => {
            let adapter = adapter_for(backend, &config);
            let fluid = Fluid::new(&fluid);
            let inlet = FlowState::from_pt(&adapter, fluid.clone(), kgps(mass_flow), pa(p), k(t_in))?;
            let target = FlowState::from_pt(&adapter, fluid, kgps(mass_flow), pa(p), k(t_out))?;
            let heater = Heater::new(HeaterTarget::OutletTemperature(k(t_out))).with_efficiency(efficiency);
            let q_external = heater.size_duty(&inlet, &target)?;
            let solved = heater.solve(&adapter, &inlet)?;
            println!("fluid          {}", inlet.fluid());
            println!("h_in  [J/kg]   {:.3}", inlet.h());
            println!("h_out [J/kg]   {:.3}", solved.outlet.h());
            println!("Q fluid [W]    {:.3}", solved.q);
            println!("Q external [W] {:.3}", q_external);
            Ok(())
        }
    }
}

fn adapter_for(backend: Backend, config: &Config) -> PropertyAdapter {
    match backend {
        Backend::Coolprop => PropertyAdapter::from_config(config),
        Backend::PerfectGas => PropertyAdapter::perfect_gas(PerfectGasBackend::with_common_gases()),
    }
}

fn load_config(path: Option<&Path>) -> CliResult<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = serde_yaml::from_str(&text)?;
    config.validate()?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

#[derive(Serialize)]
struct ComponentRow {
    name: String,
    kind: String,
    work: f64,
    heat: f64,
    dp: f64,
    warnings: usize,
}

#[derive(Serialize)]
struct Summary {
    iterations: usize,
    residual: f64,
    work_net: f64,
    heat_in: f64,
    heat_out: f64,
    thermal_efficiency: Option<f64>,
    components: Vec<ComponentRow>,
}

impl From<&CycleReport> for Summary {
    fn from(report: &CycleReport) -> Self {
        Self {
            iterations: report.iterations,
            residual: report.final_residual(),
            work_net: report.work_net(),
            heat_in: report.energy.heat_in,
            heat_out: report.energy.heat_out,
            thermal_efficiency: report.thermal_efficiency(),
            components: report
                .components
                .iter()
                .map(|c| ComponentRow {
                    name: c.name.clone(),
                    kind: c.kind.to_string(),
                    work: c.introspection.work,
                    heat: c.introspection.heat,
                    dp: c.introspection.dp,
                    warnings: c.warnings.len(),
                })
                .collect(),
        }
    }
}

fn solve_and_print(mut cycle: tc_cycle::Cycle, yaml: bool) -> CliResult<()> {
    let start = Instant::now();
    let report = cycle.run()?;
    let elapsed = start.elapsed();
    let summary = Summary::from(&report);
    if yaml {
        print!("{}", serde_yaml::to_string(&summary)?);
        return Ok(());
    }

    println!(
        "Converged in {} iterations ({:.1} ms), residual {:.3e}",
        summary.iterations,
        elapsed.as_secs_f64() * 1e3,
        summary.residual
    );
    println!();
    println!(
        "{:<20} {:<16} {:>14} {:>14} {:>12} {:>4}",
        "component", "kind", "work [W]", "heat [W]", "dp [Pa]", "warn"
    );
    for row in &summary.components {
        println!(
            "{:<20} {:<16} {:>14.1} {:>14.1} {:>12.1} {:>4}",
            row.name, row.kind, row.work, row.heat, row.dp, row.warnings
        );
    }
    println!();
    println!("net work  [W] {:.1}", summary.work_net);
    println!("heat in   [W] {:.1}", summary.heat_in);
    println!("heat out  [W] {:.1}", summary.heat_out);
    if let Some(eta) = summary.thermal_efficiency {
        println!("efficiency    {:.4}", eta);
    }
    Ok(())
}
