use anyhow::Result;
use serde::Serialize;

use crate::demos::Demo;
use crate::output::{OutputFormat, print_json};

#[derive(Serialize)]
struct DemoEntry {
  name: &'static str,
  description: &'static str,
}

pub fn cmd_list(output: OutputFormat) -> Result<()> {
  let demos: Vec<DemoEntry> = Demo::ALL
    .into_iter()
    .map(|demo| DemoEntry {
      name: demo.name(),
      description: demo.description(),
    })
    .collect();

  if output.is_json() {
    return print_json(&demos);
  }

  println!("Demos:");
  let width = demos.iter().map(|demo| demo.name.len()).max().unwrap_or(0);
  for demo in &demos {
    println!("  {:width$}  {}", demo.name, demo.description, width = width);
  }
  Ok(())
}
