use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use dirdelta_engine::{run_batch, BatchJob, ClassificationEngine, CompareConfig};
use tracing::info;

use crate::cli::*;
use crate::render;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    if cli.output.is_some() {
        colored::control::set_override(false);
    }
    let started = Instant::now();

    let report = match cli.command {
        Command::Compare(args) => cmd_compare(args, cli.format)?,
        Command::Batch(args) => cmd_batch(args, cli.format)?,
    };

    match &cli.output {
        Some(path) => std::fs::write(path, report)
            .with_context(|| format!("cannot write report to {}", path.display()))?,
        None => print!("{report}"),
    }

    info!(elapsed_ms = started.elapsed().as_millis() as u64, "done");
    Ok(())
}

fn cmd_compare(args: CompareArgs, format: OutputFormat) -> anyhow::Result<String> {
    let engine = build_engine(&args.options)?;
    let result = engine
        .classify(&args.dir1, &args.dir2)
        .with_context(|| {
            format!(
                "comparing {} with {}",
                args.dir1.display(),
                args.dir2.display()
            )
        })?;

    Ok(match format {
        OutputFormat::Text => render::comparison(&result),
        OutputFormat::Json => serde_json::to_string_pretty(&result)? + "\n",
    })
}

fn cmd_batch(args: BatchArgs, format: OutputFormat) -> anyhow::Result<String> {
    let engine = Arc::new(build_engine(&args.options)?);
    let jobs = BatchJob::load_list(&args.jobs)?;

    let runtime = tokio::runtime::Runtime::new().context("cannot start async runtime")?;
    let report = runtime.block_on(run_batch(jobs, engine));

    Ok(match format {
        OutputFormat::Text => render::batch(&report),
        OutputFormat::Json => serde_json::to_string_pretty(&report)? + "\n",
    })
}

/// Layer command-line flags over the optional config file.
fn build_engine(options: &CompareOptions) -> anyhow::Result<ClassificationEngine> {
    let config = resolve_config(options)?;
    Ok(ClassificationEngine::from_config(config)?)
}

fn resolve_config(options: &CompareOptions) -> anyhow::Result<CompareConfig> {
    let mut config = match &options.config {
        Some(path) => load_config(path)?,
        None => CompareConfig::default(),
    };
    if let Some(context) = options.context {
        config = config.with_context_lines(context);
    }
    config = config.with_hash_exts(options.hash_exts.iter().cloned());
    if let Some(tags) = &options.tags {
        config = config.with_tag_table(tags);
    }
    if let Some(secs) = options.timeout {
        config = config.with_file_timeout(secs);
    }
    if options.no_follow_links {
        config = config.with_follow_links(false);
    }
    Ok(config)
}

fn load_config(path: &Path) -> anyhow::Result<CompareConfig> {
    CompareConfig::load(path).with_context(|| format!("loading {}", path.display()))
}
