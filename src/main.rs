//! run-dgcpm - Plasmasphere simulation driver.
//!
//! Runs the plasmasphere model over a Kp-driven interval and writes either
//! gzip-compressed state records or density samples.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dgcpm_spot::config::{ConfigError, OutputTarget, RunConfig, RunOptions, SpotOptions};
use dgcpm_spot::driver::{DriverError, OutputMode, SimulationDriver};
use dgcpm_spot::filling::{FillingConfig, Saturation};
use dgcpm_spot::input::{KpError, KpSeries, SampleError, SampleSchedule};
use dgcpm_spot::model::{GridConfig, GridError, PlasmasphereModel, PotentialModel};
use dgcpm_spot::output::{OutputError, SampleWriter, StateWriter};
use dgcpm_spot::time::{format_time, from_ymdh, SimTime};

/// Closed-field-line refilling timescale in days when `--filling` omits it.
const DEFAULT_TAU_CLOSED_DAYS: f64 = 10.0;
/// Open-field-line loss timescale in days when `--filling` omits it.
const DEFAULT_TAU_OPEN_DAYS: f64 = 1.0;

/// Plasmasphere simulation driver.
#[derive(Parser)]
#[command(name = "run-dgcpm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the model over a Kp-driven interval.
    Run(RunArgs),
    /// Summarize Kp input files without running the model.
    Inspect {
        /// WDC-format Kp files.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// WDC-format Kp files.
    files: Vec<PathBuf>,

    /// Run start (defaults to the first Kp entry).
    #[arg(short, long, num_args = 4, value_names = ["YR", "MO", "DY", "HR"])]
    start: Option<Vec<u32>>,

    /// Run end (takes priority over --duration).
    #[arg(short, long, num_args = 4, value_names = ["YR", "MO", "DY", "HR"])]
    end: Option<Vec<u32>>,

    /// First output time (defaults to the run start).
    #[arg(long, num_args = 4, value_names = ["YR", "MO", "DY", "HR"])]
    output_start: Option<Vec<u32>>,

    /// Seconds between outputs.
    #[arg(long, default_value = "900")]
    dt: f64,

    /// Run length in seconds when no end time is given.
    #[arg(short = 'T', long)]
    duration: Option<f64>,

    /// Output file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// File of `L longitude` sample locations; switches output to samples.
    #[arg(long)]
    samples: Option<PathBuf>,

    /// Custom filling: max flux, then closed and open timescales in days.
    #[arg(long, num_args = 1..=3, value_names = ["FMAX", "TAU_CLOSED", "TAU_OPEN"])]
    filling: Option<Vec<f64>>,

    /// Custom saturation density log10(n) = A + B*L (requires --filling).
    #[arg(long, num_args = 2, value_names = ["A", "B"], allow_negative_numbers = true)]
    saturation: Option<Vec<f64>>,

    /// Spot switch-on, seconds after run start.
    #[arg(long, default_value = "1e31", allow_negative_numbers = true)]
    spot_start: f64,

    /// Spot switch-off, seconds after run start.
    #[arg(long, default_value = "-1e31", allow_negative_numbers = true)]
    spot_stop: f64,

    /// Spot centre colatitude in degrees.
    #[arg(long, default_value = "30")]
    spot_colat: f64,

    /// Spot centre local time in degrees east of midnight.
    #[arg(long, default_value = "315")]
    spot_lon: f64,

    /// Spot radius in km.
    #[arg(long, default_value = "1000")]
    spot_radius: f64,

    /// Amplification of saturation density and max flux inside the spot.
    #[arg(long, default_value = "10")]
    spot_factor: f64,

    /// Electric potential model.
    #[arg(long, default_value = "sojka")]
    potential: PotentialArg,

    /// Number of L-shells in the model grid.
    #[arg(long, default_value = "41")]
    n_l: usize,

    /// Number of local-time bins in the model grid.
    #[arg(long, default_value = "48")]
    n_lon: usize,

    /// Print the resolved configuration as JSON and exit.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PotentialArg {
    Sojka,
    VollandStern,
}

impl From<PotentialArg> for PotentialModel {
    fn from(arg: PotentialArg) -> Self {
        match arg {
            PotentialArg::Sojka => PotentialModel::Sojka,
            PotentialArg::VollandStern => PotentialModel::VollandStern,
        }
    }
}

#[derive(Error, Debug)]
enum CliError {
    #[error("Invalid date {0:?}: expected YR MO DY HR")]
    InvalidDate(Vec<u32>),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Kp(#[from] KpError),
    #[error(transparent)]
    Samples(#[from] SampleError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dgcpm_spot=info,run_dgcpm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => run(args),
        Commands::Inspect { files } => inspect(&files),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn parse_date(fields: Option<Vec<u32>>) -> Result<Option<SimTime>, CliError> {
    let Some(fields) = fields else {
        return Ok(None);
    };
    let date = match fields.as_slice() {
        &[year, month, day, hour] => from_ymdh(year as i32, month, day, hour),
        _ => None,
    };
    date.map(Some).ok_or(CliError::InvalidDate(fields))
}

impl RunArgs {
    fn into_options(self) -> Result<RunOptions, CliError> {
        let filling = self.filling.map(|values| {
            FillingConfig::from_days(
                values[0],
                values.get(1).copied().unwrap_or(DEFAULT_TAU_CLOSED_DAYS),
                values.get(2).copied().unwrap_or(DEFAULT_TAU_OPEN_DAYS),
            )
        });
        let saturation = self.saturation.map(|values| Saturation {
            a: values[0],
            b: values[1],
        });

        Ok(RunOptions {
            input_files: self.files,
            start: parse_date(self.start)?,
            end: parse_date(self.end)?,
            output_start: parse_date(self.output_start)?,
            output_period: self.dt,
            duration: self.duration,
            output_file: self.output,
            samples_file: self.samples,
            filling,
            saturation,
            spot: SpotOptions {
                start_offset: self.spot_start,
                stop_offset: self.spot_stop,
                colatitude_deg: self.spot_colat,
                longitude_deg: self.spot_lon,
                radius_km: self.spot_radius,
                factor: self.spot_factor,
            },
            potential: self.potential.into(),
            grid: GridConfig {
                n_l: self.n_l,
                n_lon: self.n_lon,
                ..GridConfig::default()
            },
            ..RunOptions::default()
        })
    }
}

fn run(args: RunArgs) -> Result<(), CliError> {
    let dry_run = args.dry_run;
    let options = args.into_options()?;
    options.validate()?;

    let kp = KpSeries::from_files(&options.input_files)?;
    info!(
        "Loaded {} Kp entries from {} file(s)",
        kp.len(),
        options.input_files.len()
    );
    let config = options.resolve(&kp)?;

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let start = Instant::now();
    let engine = config.build_engine()?;
    info!(
        "Model grid {}x{} with {}",
        config.grid.n_lon,
        config.grid.n_l,
        engine.filling_name()
    );

    let output = open_output(&config, &engine)?;
    let mut driver = SimulationDriver::new(engine, kp, config.driver_config(), output)?;
    let summary = driver.run()?;
    driver.finish()?;

    info!(
        "Simulated {:.0} s in {} steps ({} state, {} sample records) in {:.2?}",
        summary.simulated_seconds,
        summary.steps,
        summary.state_writes,
        summary.sample_writes,
        start.elapsed()
    );
    Ok(())
}

fn open_output(
    config: &RunConfig,
    engine: &PlasmasphereModel,
) -> Result<OutputMode<BufWriter<File>>, CliError> {
    match &config.output {
        OutputTarget::State { path } => {
            info!("Writing state to {}", path.display());
            Ok(OutputMode::State(StateWriter::create(path, engine)?))
        }
        OutputTarget::Samples { locations, path } => {
            let schedule =
                SampleSchedule::load(locations, config.output_start, config.output_period)?;
            info!(
                "Writing {} sample locations to {}",
                schedule.locations().len(),
                path.display()
            );
            Ok(OutputMode::Samples {
                schedule,
                writer: SampleWriter::create(path)?,
            })
        }
    }
}

fn inspect(files: &[PathBuf]) -> Result<(), CliError> {
    let kp = KpSeries::from_files(files)?;
    println!("Kp entries: {}", kp.len());
    println!("First:      {}", format_time(kp.first().time));
    println!("Last:       {}", format_time(kp.last().time));
    println!("Max Kp:     {:.1}", kp.max_kp());
    Ok(())
}
