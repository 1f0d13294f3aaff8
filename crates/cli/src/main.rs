mod cmd;
mod demos;
mod output;
mod prompts;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{BuildArgs, cmd_build, cmd_list};
use crate::output::{OutputFormat, print_error};

/// conduit - Build Minecraft data packs and resource packs from Rust
#[derive(Parser)]
#[command(name = "conduit")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// List the bundled demo packs
  List,

  /// Build a demo pack into the output directory
  Build(BuildArgs),
}

fn main() {
  let cli = Cli::parse();

  let filter = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
    .with_writer(std::io::stderr)
    .with_target(false)
    .without_time()
    .init();

  if let Err(err) = run(cli) {
    print_error(&format!("{:#}", err));
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  match cli.command {
    Commands::List => cmd_list(cli.output),
    Commands::Build(args) => cmd_build(args, cli.output),
  }
}
