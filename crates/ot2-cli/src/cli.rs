use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "OT2 Protocols contributors",
    version,
    about = "ot2 - Generate Opentrons OT-2 protocol scripts, including Sanger sequencing sample prep with dilution ladders and operator-validated NanoDrop selections.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Configuration file in TOML format.
    /// Defaults to `config.toml` in the platform configuration directory.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory of `<name>.ot2` templates that override the built-in ones.
    #[arg(long, global = true, value_name = "DIR")]
    pub templates_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Phase one of a Sanger run: print the dilution ladder for every sample.
    Plan(PlanArgs),
    /// Generate the Sanger sequencing prep protocol, report and order.
    Sanger(SangerArgs),
    /// Generate an ELISA protocol.
    Elisa(ElisaArgs),
    /// Generate the protocol that registers custom labware on a robot.
    Labware(OutputArgs),
    /// Generate a calibration protocol for one labware item.
    Calibrate(CalibrateArgs),
    /// Inspect the available protocol templates.
    Templates(TemplatesArgs),
    /// List the user-facing protocols.
    Protocols,
}

/// Selection and dilution settings shared by `plan` and `sanger`.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Minimum concentration (ng/µL) a selected dilution must reach.
    #[arg(long, value_name = "FLOAT")]
    pub min_concentration: Option<f64>,

    /// Mass (ng) the final transfer should deliver.
    #[arg(long, value_name = "FLOAT")]
    pub target_mass: Option<f64>,

    /// Fixed final transfer volume (µL).
    #[arg(long, value_name = "FLOAT")]
    pub transfer_volume: Option<f64>,

    /// How ladder steps are prepared: 'independent' or 'serial'.
    #[arg(long, value_name = "MODE")]
    pub preparation: Option<String>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S selection.target-mass=800
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `plan` subcommand.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Sanger request file (TOML, or JSON with a .json extension).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Arguments for the `sanger` subcommand.
#[derive(Args, Debug)]
pub struct SangerArgs {
    /// Sanger request file (TOML, or JSON with a .json extension).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the generated protocol script.
    #[arg(short, long, default_value = "sanger.ot2", value_name = "PATH")]
    pub output: PathBuf,

    /// Write the per-sample report as CSV.
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Write the script, report and order status as one JSON document.
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Fail when any selected dilution is below the minimum concentration.
    #[arg(long)]
    pub require_all: bool,

    /// API key for the sequence lookup service.
    #[arg(long, env = "BENCHLING_API_KEY", hide_env_values = true, value_name = "KEY")]
    pub benchling_api_key: Option<String>,

    /// API key for the order submission service.
    #[arg(long, env = "GENEWIZ_API_KEY", hide_env_values = true, value_name = "KEY")]
    pub genewiz_api_key: Option<String>,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Arguments for the `elisa` subcommand.
#[derive(Args, Debug)]
pub struct ElisaArgs {
    /// Number of samples (one plate column each).
    #[arg(short, long, required = true, value_name = "INT")]
    pub num_samples: usize,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Where to write a generated script.
#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Path for the generated protocol script. Defaults to `<protocol>.ot2`.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `calibrate` subcommand.
#[derive(Args, Debug)]
pub struct CalibrateArgs {
    /// Robot configuration: 'highvol' or 'lowvol'.
    #[arg(short, long, required_unless_present = "list", value_name = "CONFIG")]
    pub robot_config: Option<String>,

    /// Labware item to calibrate, or 'pipettes'.
    #[arg(long, required_unless_present = "list", value_name = "ITEM")]
    pub item: Option<String>,

    /// List every valid configuration and item instead of generating.
    #[arg(long)]
    pub list: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the `templates` subcommand.
#[derive(Args, Debug)]
pub struct TemplatesArgs {
    #[command(subcommand)]
    pub command: TemplatesCommands,
}

#[derive(Subcommand, Debug)]
pub enum TemplatesCommands {
    /// List template names.
    List,
    /// Print the text of a template.
    Show {
        #[arg(required = true)]
        name: String,
    },
}
