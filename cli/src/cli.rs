use std::path::PathBuf;

use clap::{Parser, Subcommand};
use planwright::render::RenderOptions;

#[derive(Parser, Debug)]
#[clap(name = "planwright", author, version, about, long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub subcommand: Commands,

    #[clap(
        global = true,
        short = 'v',
        action = clap::ArgAction::Count,
        help = VERBOSE_HELP,
    )]
    pub verbosity: u8,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Solve an intent file and write the plan as SVG and/or JSON.
    #[clap(arg_required_else_help = true)]
    Compile {
        #[clap(help = INTENT_HELP)]
        file: PathBuf,

        #[clap(long, help = "Also write the plan and score as JSON")]
        emit_json: bool,

        #[clap(
            long,
            default_value_t = true,
            action = clap::ArgAction::Set,
            help = "Write the rendered SVG"
        )]
        emit_svg: bool,

        #[clap(long, help = "Pretty-print emitted JSON")]
        pretty: bool,

        #[clap(long, help = "Print the solve trace to stderr")]
        inspect: bool,

        #[clap(
            short = 'o',
            long,
            help = "Directory for outputs. Defaults to the intent file's directory"
        )]
        out_dir: Option<PathBuf>,

        #[clap(flatten)]
        render_options: RenderOptions,
    },

    /// Solve an intent file and print the score breakdown.
    #[clap(arg_required_else_help = true)]
    Score {
        #[clap(help = INTENT_HELP)]
        file: PathBuf,
    },

    /// Validate an intent file without solving it.
    #[clap(arg_required_else_help = true)]
    Check {
        #[clap(help = INTENT_HELP)]
        file: PathBuf,
    },
}

const INTENT_HELP: &str = "Path to a layout intent JSON file.";

const VERBOSE_HELP: &str = "Log verbosity. -v prints warnings, -vv placement info, -vvv everything.";
