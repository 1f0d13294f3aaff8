//! Implementation of the `conduit build` command.
//!
//! Defines one of the bundled demo packs and writes it below the output
//! directory, optionally as zip archives and optionally linked into a world
//! save.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use conduit_lib::MinecraftVersion;
use conduit_lib::build::{BuildConfig, artifact_name, build, output_paths, version_suffix};

use crate::demos::Demo;
use crate::output::{
  OutputFormat, format_bytes, format_duration, print_info, print_json, print_link, print_stat, print_success, print_warning,
};
use crate::prompts::confirm_overwrite;

#[derive(Debug, Args)]
pub struct BuildArgs {
  /// Demo pack to build
  #[arg(value_enum)]
  pub demo: Demo,

  /// Directory to write the packs to
  #[arg(short, long, default_value = "./out", value_name = "DIR")]
  pub out_dir: PathBuf,

  /// Write zip archives instead of directories
  #[arg(short, long)]
  pub zip: bool,

  /// Link the built data pack into this world save
  #[arg(long, value_name = "SAVE")]
  pub link_to: Option<String>,

  /// Path to the .minecraft directory
  #[arg(long = "mc-dir", env = "CONDUIT_MCDIR", value_name = "DIR")]
  pub minecraft_dir: Option<PathBuf>,

  /// Minecraft version to target
  #[arg(short, long, default_value = "1.21.5")]
  pub minecraft: MinecraftVersion,

  /// Overwrite existing output without asking
  #[arg(short, long)]
  pub force: bool,
}

/// Execute the build command.
///
/// Asks before replacing output from an earlier build unless `--force` is
/// given. Prints where each pack was written.
pub fn cmd_build(args: BuildArgs, output: OutputFormat) -> Result<()> {
  let start = Instant::now();

  let packs = args
    .demo
    .packs(args.minecraft)
    .with_context(|| format!("Failed to define demo '{}'", args.demo.name()))?;

  let config = BuildConfig {
    out_dir: args.out_dir,
    zip: args.zip,
    link_to: args.link_to,
    minecraft_dir: args.minecraft_dir,
  };

  let datapack = packs.datapack.as_ref();
  let resourcepack = packs.resourcepack.as_ref();

  let name = artifact_name(datapack, resourcepack)?;
  let (data_path, assets_path) = output_paths(&config, &name, &version_suffix(datapack, resourcepack));
  let existing: Vec<PathBuf> = [(datapack.is_some(), data_path), (resourcepack.is_some(), assets_path)]
    .into_iter()
    .filter(|(built, path)| *built && path.exists())
    .map(|(_, path)| path)
    .collect();

  if !confirm_overwrite(&existing, args.force)? {
    print_warning("Build cancelled");
    return Ok(());
  }

  info!(demo = args.demo.name(), minecraft = %args.minecraft, "building demo");
  if !output.is_json() {
    print_info(&format!("Building {} for Minecraft {}", args.demo.name(), args.minecraft));
  }

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt
    .block_on(build(&config, datapack, resourcepack))
    .context("Build failed")?;

  if output.is_json() {
    return print_json(&report);
  }

  print_success(&format!("Built {}", args.demo.name()));
  if let Some(path) = &report.datapack {
    print_stat("Datapack", &describe(path));
  }
  if let Some(path) = &report.resourcepack {
    print_stat("Resourcepack", &describe(path));
  }
  if let (Some(link), Some(target)) = (&report.link, &report.datapack) {
    print_link(&link.display().to_string(), &target.display().to_string());
  }
  print_stat("Duration", &format_duration(start.elapsed()));

  Ok(())
}

/// The path, plus its size for archives.
fn describe(path: &Path) -> String {
  match std::fs::metadata(path) {
    Ok(meta) if meta.is_file() => format!("{} ({})", path.display(), format_bytes(meta.len())),
    _ => path.display().to_string(),
  }
}
