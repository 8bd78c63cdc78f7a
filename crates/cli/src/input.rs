//! Observation file loading.
//!
//! Accepts either one JSON array of observations or JSON lines, one
//! observation per line. Blank lines in JSON-lines input are skipped.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cobasket_core::errors::ApplicationError;
use cobasket_core::Observation;

pub fn load_observations(path: &Path) -> Result<Vec<Observation>, ApplicationError> {
    read_observations(path).map_err(|error| ApplicationError::Input(format!("{error:#}")))
}

fn read_observations(path: &Path) -> Result<Vec<Observation>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read input file `{}`", path.display()))?;
    let observations = parse_observations(&raw)
        .with_context(|| format!("could not parse input file `{}`", path.display()))?;

    tracing::debug!(
        event_name = "cli.input.loaded",
        path = %path.display(),
        observations = observations.len(),
        "observations loaded"
    );

    Ok(observations)
}

pub fn parse_observations(raw: &str) -> Result<Vec<Observation>> {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("invalid JSON array of observations");
    }

    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<Observation>(line)
                .with_context(|| format!("invalid observation on line {}", index + 1))
        })
        .collect()
}
