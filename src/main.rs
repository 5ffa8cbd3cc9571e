mod cli;
mod output;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use depgraph::config::DepGraphConfig;
use depgraph::query::{find_cycles, find_dependents, find_unused_files, find_warnings};
use depgraph::resolver::normalize_path;
use depgraph::{AnalysisOutput, ParseOptions, ProgressPhase, build_dependency_tree};

use cli::{Cli, ExitCase, SkipDynamicImports};
use output::{Report, Style, write_json};

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("depgraph=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("depgraph=warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    normalize_path(&base.join(path))
}

fn skip_dynamic_imports(cli: &Cli, config: &DepGraphConfig) -> Result<Option<SkipDynamicImports>> {
    if cli.skip_dynamic_imports.is_some() {
        return Ok(cli.skip_dynamic_imports);
    }
    match config.skip_dynamic_imports.as_deref() {
        None => Ok(None),
        Some(name) => match SkipDynamicImports::from_name(name) {
            Some(skip) => Ok(Some(skip)),
            None => bail!("invalid skip-dynamic-imports {name:?} in config, expected \"tree\" or \"circular\""),
        },
    }
}

/// Command-line flags over `depgraph.toml` over built-in defaults.
fn build_options(
    cli: &Cli,
    config: &DepGraphConfig,
    cwd: &Path,
    skip: Option<SkipDynamicImports>,
) -> Result<ParseOptions> {
    let context = cli
        .context
        .as_ref()
        .or(config.context.as_ref())
        .map_or_else(|| cwd.to_path_buf(), |c| absolutize(cwd, c));

    let mut options = ParseOptions::new(cwd).with_context(Some(context));
    if let Some(exts) = cli.extensions.as_ref().or(config.extensions.as_ref()) {
        options = options.with_extensions(exts);
    }
    if let Some(js) = cli.js.as_ref().or(config.js.as_ref()) {
        options = options.with_js(js);
    }
    if let Some(include) = cli.include.as_ref().or(config.include.as_ref()) {
        options = options.with_include(include)?;
    }
    if let Some(exclude) = cli.exclude.as_ref().or(config.exclude.as_ref()) {
        options = options.with_exclude(exclude)?;
    }
    options = options.with_tsconfig(
        cli.tsconfig
            .as_ref()
            .or(config.tsconfig.as_ref())
            .map(|p| absolutize(cwd, p)),
    );
    options.transform = cli.transform || config.transform.unwrap_or(false);
    options.skip_dynamic_imports = skip == Some(SkipDynamicImports::Tree);
    options.threads = cli.threads.or(config.threads);
    Ok(options)
}

/// Progress as `[ended/started]` debug lines.
fn log_progress(options: ParseOptions) -> ParseOptions {
    let started = Arc::new(AtomicUsize::new(0));
    let ended = Arc::new(AtomicUsize::new(0));
    let context = options.context.clone();
    options.with_progress(Arc::new(move |phase: ProgressPhase, id: &Path| match phase {
        ProgressPhase::Start => {
            let total = started.fetch_add(1, Ordering::Relaxed) + 1;
            let shown = context
                .as_deref()
                .and_then(|c| id.strip_prefix(c).ok())
                .unwrap_or(id);
            tracing::debug!(
                "[{}/{total}] analyzing {}",
                ended.load(Ordering::Relaxed),
                shown.display()
            );
        }
        ProgressPhase::End => {
            ended.fetch_add(1, Ordering::Relaxed);
        }
    }))
}

fn run(cli: Cli) -> Result<i32> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let config = DepGraphConfig::load(&cwd)?;
    let skip = skip_dynamic_imports(&cli, &config)?;
    let options = log_progress(build_options(&cli, &config, &cwd, skip)?);

    let build = build_dependency_tree(&cli.files, &options)?;
    if build.has_no_entries() {
        bail!("no entry files were matched");
    }
    if build.all_ignored() {
        tracing::warn!("every entry file is excluded by the include/exclude filters");
    }

    let cycles = find_cycles(&build.tree, skip == Some(SkipDynamicImports::Circular));
    let analysis = AnalysisOutput {
        entries: build.entries,
        tree: build.tree,
        cycles,
    };

    if let Some(path) = &cli.output {
        write_json(&absolutize(&cwd, path), &analysis)?;
    }

    let warnings = if cli.no_warning {
        Vec::new()
    } else {
        find_warnings(&analysis.tree, &find_dependents(&analysis.tree))
    };

    let unused = cli
        .detect_unused_files_from
        .as_deref()
        .map(|pattern| find_unused_files(pattern, &cwd, options.context.as_deref(), &analysis.tree))
        .transpose()?;

    let report = Report {
        analysis: &analysis,
        warnings: &warnings,
        unused: unused.as_deref(),
        show_tree: !cli.no_tree,
        show_cycles: !cli.no_circular,
        show_warnings: !cli.no_warning,
    };
    print!("{}", report.render(Style::detect()));

    let code = cli
        .exit_code
        .iter()
        .find(|rule| match rule.case {
            ExitCase::Circular => !analysis.cycles.is_empty(),
        })
        .map_or(0, |rule| rule.code);
    Ok(code)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = run(cli)?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
