use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::output::symbols::WARNING;

/// Ask before replacing output left by an earlier build.
///
/// Returns `true` when nothing would be replaced, when `force` is set, or when
/// the user agrees. Refuses outright when no one is there to answer.
pub fn confirm_overwrite(existing: &[PathBuf], force: bool) -> Result<bool> {
  if existing.is_empty() || force {
    return Ok(true);
  }

  if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
    bail!(
      "{} already exists. Use --force to overwrite.",
      describe(existing)
    );
  }

  let mut stderr = io::stderr().lock();
  writeln!(stderr, "{} These will be replaced:", WARNING)?;
  for path in existing {
    writeln!(stderr, "    {}", path.display())?;
  }
  write!(stderr, "Overwrite? [y/N] ")?;
  stderr.flush()?;

  let mut answer = String::new();
  io::stdin().lock().read_line(&mut answer)?;
  Ok(is_yes(&answer))
}

fn describe(existing: &[PathBuf]) -> String {
  existing
    .iter()
    .map(|path| path.display().to_string())
    .collect::<Vec<_>>()
    .join(", ")
}

fn is_yes(answer: &str) -> bool {
  matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
