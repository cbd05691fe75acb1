//! Collecting target URLs from arguments and files.

use std::path::Path;

use anyhow::{bail, Context, Result};

/// Parse a target list: one URL per line, blank lines and `#` comments skipped.
pub fn parse_target_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Command-line URLs first, then any from the file, in the order given.
pub fn collect_targets(args: &[String], file: Option<&Path>) -> Result<Vec<String>> {
    let mut targets: Vec<String> = args
        .iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();

    if let Some(path) = file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read target list: {}", path.display()))?;
        targets.extend(parse_target_list(&text));
    }

    if targets.is_empty() {
        bail!("no target URLs given (pass URLs or --file <path>)");
    }
    Ok(targets)
}
