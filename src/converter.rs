use crate::cli::Cli;
use crate::rewrite::{self, RewriteStats};
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub fn convert(cli: &Cli) -> Result<()> {
    if cli.output.is_some() && cli.inputs.len() > 1 {
        bail!(
            "--output can only be used with a single input file ({} given)",
            cli.inputs.len()
        );
    }

    let mut totals = RewriteStats::default();

    for input in &cli.inputs {
        let output_path = resolve_output_path(cli, input);

        info!("Processing {}...", input.display());
        let stats = transform_file(input, &output_path, cli.dry_run)?;
        info!("Completed {}", output_path.display());

        totals.fields += stats.fields;
        totals.sections += stats.sections;
    }

    eprintln!("{}", summary(cli.inputs.len(), totals, cli.dry_run));

    Ok(())
}

fn summary(file_count: usize, totals: RewriteStats, dry_run: bool) -> String {
    format!(
        "{} {} ({}, {}){}",
        if dry_run { "Checked" } else { "Transformed" },
        count(file_count, "file"),
        count(totals.fields, "content field"),
        count(totals.sections, "section"),
        if dry_run { ", nothing written" } else { "" }
    )
}

fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

fn resolve_output_path(cli: &Cli, input: &Path) -> PathBuf {
    cli.output.clone().unwrap_or_else(|| input.to_path_buf())
}

/// Rewrite the "content" fields of one JSON file and write the result to `output`.
pub fn transform_file(input: &Path, output: &Path, dry_run: bool) -> Result<RewriteStats> {
    let raw = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;

    let (rendered, stats) = transform_str(&raw)
        .with_context(|| format!("Failed to transform {}", input.display()))?;

    debug!(
        "{}: {} content fields, {} sections",
        input.display(),
        stats.fields,
        stats.sections
    );

    if dry_run {
        warn!("Dry run, not writing {}", output.display());
        return Ok(stats);
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    fs::write(output, &rendered)
        .with_context(|| format!("Failed to write output file: {}", output.display()))?;

    Ok(stats)
}

/// Parse JSON text, rewrite it, and pretty-print it with two-space indentation
pub fn transform_str(raw: &str) -> Result<(String, RewriteStats)> {
    let document: Value = serde_json::from_str(raw).context("Failed to parse JSON")?;

    let mut stats = RewriteStats::default();
    let rewritten = rewrite::rewrite(document, &mut stats);

    let rendered = serde_json::to_string_pretty(&rewritten).context("Failed to serialize JSON")?;
    Ok((rendered, stats))
}
