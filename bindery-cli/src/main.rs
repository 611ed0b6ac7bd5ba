use anyhow::Result;
use bindery_cli::{inspect_cmd, parse_assignment, parse_cmd, FormatArg, InspectOptions};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bindery", version, about = "Bindery CLI")]
struct Cli {
    /// More logging (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a template and print its element tree.
    Parse {
        /// Path to a .xml or .yaml template
        input: PathBuf,
        /// Force a format instead of going by extension
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },
    /// Inflate a template headlessly and print widgets, bindings and changes.
    Inspect {
        /// Path to the main template
        template: PathBuf,
        /// YAML model description
        #[arg(long)]
        model: Option<PathBuf>,
        /// Register a component: TAG=TEMPLATE_PATH
        #[arg(long = "component", value_parser = parse_assignment)]
        components: Vec<(String, String)>,
        /// Write a model property after inflation: PROP=VALUE (a.b.prop for sub-models)
        #[arg(long = "set", value_parser = parse_assignment)]
        sets: Vec<(String, String)>,
        /// Invoke a named widget after the writes
        #[arg(long = "click")]
        clicks: Vec<String>,
        #[arg(long)]
        title: Option<String>,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let report = match cli.command {
        Commands::Parse { input, format } => parse_cmd(&input, format)?,
        Commands::Inspect {
            template,
            model,
            components,
            sets,
            clicks,
            title,
        } => inspect_cmd(&InspectOptions {
            template,
            model,
            components: components
                .into_iter()
                .map(|(tag, path)| (tag, PathBuf::from(path)))
                .collect(),
            sets,
            clicks,
            title,
        })?,
    };
    print!("{report}");
    Ok(())
}
