use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "stemsim CLI - Generate STEM probe scan patterns, partition grid scans into independent sub-scans, and evaluate contrast transfer functions.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the probe positions of a scan pattern and export them to CSV.
    Scan(ScanArgs),
    /// Evaluate a contrast transfer function profile and export it to CSV.
    Ctf(CtfArgs),
}

/// Kinds of scan pattern the `scan` command can build.
#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ScanKind {
    /// 2-D raster over the Cartesian product of two sampled axes.
    Grid,
    /// 1-D scan along a straight segment.
    Line,
    /// Explicit caller-supplied positions (requires a config file).
    Custom,
}

/// Arguments for the `scan` subcommand.
///
/// Every geometric parameter can come from the TOML config file instead;
/// flags given on the command line take precedence over file values.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Path to a TOML scan configuration file.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Scan pattern kind.
    #[arg(short, long, value_enum, value_name = "KIND")]
    pub kind: Option<ScanKind>,

    /// Scan start coordinate, e.g. "0,0".
    #[arg(long, value_name = "X,Y")]
    pub start: Option<String>,

    /// Scan end coordinate, e.g. "10,10".
    #[arg(long, value_name = "X,Y")]
    pub end: Option<String>,

    /// Number of positions; a single value or one per grid axis.
    #[arg(long, value_name = "N[,N]", conflicts_with = "sampling")]
    pub gpts: Option<String>,

    /// Distance between positions in Å; a single value or one per grid axis.
    #[arg(long, value_name = "STEP[,STEP]")]
    pub sampling: Option<String>,

    /// Exclude the end coordinate from the sampled interval.
    #[arg(long)]
    pub no_endpoint: bool,

    /// Split a grid scan into P1 x P2 independent sub-scans, one CSV each.
    #[arg(long, value_name = "P1,P2")]
    pub partitions: Option<String>,

    /// Number of positions generated per batch while exporting.
    #[arg(long, default_value_t = 1024, value_name = "N")]
    pub batch_size: usize,

    /// Path for the output CSV file (partitioned scans get a numbered
    /// suffix per sub-scan).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

/// Arguments for the `ctf` subcommand.
#[derive(Args, Debug)]
pub struct CtfArgs {
    /// Electron acceleration energy in eV.
    #[arg(short, long, required = true, value_name = "EV")]
    pub energy: f64,

    /// Objective aperture semiangle cutoff in mrad.
    #[arg(long, value_name = "MRAD")]
    pub semiangle_cutoff: Option<f64>,

    /// Aperture taper width as a fraction of the cutoff.
    #[arg(long, default_value_t = 0.0, value_name = "FRACTION")]
    pub rolloff: f64,

    /// 1/e focal spread in Å.
    #[arg(long, default_value_t = 0.0, value_name = "ANGSTROM")]
    pub focal_spread: f64,

    /// Illumination angular spread in mrad.
    #[arg(long, default_value_t = 0.0, value_name = "MRAD")]
    pub angular_spread: f64,

    /// Gaussian image spread in Å.
    #[arg(long, default_value_t = 0.0, value_name = "ANGSTROM")]
    pub gaussian_spread: f64,

    /// Defocus in Å (positive is underfocus).
    #[arg(long, default_value_t = 0.0, value_name = "ANGSTROM")]
    pub defocus: f64,

    /// Third-order spherical aberration in Å.
    #[arg(long, default_value_t = 0.0, value_name = "ANGSTROM")]
    pub cs: f64,

    /// Azimuth angle at which to sample the profile, in radians.
    #[arg(long, default_value_t = 0.0, value_name = "RAD")]
    pub phi: f64,

    /// Largest spatial frequency to sample, in 1/Å.
    #[arg(long, required = true, value_name = "PER_ANGSTROM")]
    pub max_k: f64,

    /// Number of frequency samples.
    #[arg(short, long, default_value_t = 1000, value_name = "N")]
    pub num_samples: usize,

    /// Path for the output CSV file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}
