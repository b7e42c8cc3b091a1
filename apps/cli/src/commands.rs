//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use contextkeys_core::{
    BatchSummary, DocumentStore, FsDocumentStore, TagProgress, TagResult, TaggingOptions,
    existing_keywords, tag_documents,
};
use contextkeys_generation::{FixedTextGenerator, OpenAiGenerator};
use contextkeys_shared::{
    AppConfig, MergePolicy, init_config, load_config, load_config_from, resolve_api_key,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, reload};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ContextKeys — keep note frontmatter keywords in step with note content.
#[derive(Parser)]
#[command(
    name = "contextkeys",
    version,
    about = "Generate keywords for Markdown notes and merge them into the frontmatter.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.contextkeys/contextkeys.toml.
    #[arg(long, global = true, env = "CONTEXTKEYS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate keywords for notes and merge them into their frontmatter.
    Tag {
        /// Markdown notes to tag.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print the rewritten notes instead of saving them.
        #[arg(long)]
        dry_run: bool,

        /// Drop case-insensitive duplicate keywords when merging.
        #[arg(long)]
        dedupe: bool,

        /// Use this file's text as the generator output instead of calling the API.
        #[arg(long, value_name = "FILE")]
        generated: Option<PathBuf>,

        /// Override the configured model.
        #[arg(long)]
        model: Option<String>,
    },

    /// Show the header and stored keywords of a note.
    Inspect {
        /// Markdown note to inspect.
        path: PathBuf,

        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Config + tracing setup
// ---------------------------------------------------------------------------

/// Load the config file named on the command line, or the default one.
pub(crate) fn load_app_config(cli: &Cli) -> Result<AppConfig> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

/// Handle for adjusting the log filter once the config file is loaded.
pub(crate) struct TracingHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

/// Default filter directive for a verbosity count and the config `debug` switch.
fn default_filter(verbose: u8, debug: bool) -> &'static str {
    match (verbose, debug) {
        (0, false) => "contextkeys=info",
        (0, true) | (1, _) => "contextkeys=debug",
        _ => "contextkeys=trace",
    }
}

/// Initialize tracing from CLI flags, before the config file is read.
pub(crate) fn init_tracing(cli: &Cli) -> TracingHandle {
    let (env_filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(default_filter(cli.verbose, false)), false),
    };
    let (filter_layer, filter) = reload::Layer::new(env_filter);

    let fmt_layer = match cli.log_format {
        LogFormat::Text => fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    TracingHandle { filter, from_env }
}

/// Apply the config `debug` switch unless `RUST_LOG` or `-v` already decided.
pub(crate) fn apply_config_logging(handle: &TracingHandle, cli: &Cli, debug: bool) -> Result<()> {
    if handle.from_env || !debug {
        return Ok(());
    }
    let directive = default_filter(cli.verbose, debug);
    handle.filter.modify(|filter| *filter = EnvFilter::new(directive))?;
    tracing::debug!(filter = directive, "log level raised by config");
    Ok(())
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    match cli.command {
        Command::Tag {
            paths,
            dry_run,
            dedupe,
            generated,
            model,
        } => cmd_tag(&config, &paths, dry_run, dedupe, generated.as_deref(), model).await,
        Command::Inspect { path, json } => cmd_inspect(&path, json).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(&config).await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_tag(
    config: &AppConfig,
    paths: &[PathBuf],
    dry_run: bool,
    dedupe: bool,
    generated: Option<&Path>,
    model: Option<String>,
) -> Result<()> {
    let mut options = TaggingOptions::from(config);
    options.dry_run |= dry_run;
    if dedupe {
        options.policy = MergePolicy::Dedupe;
    }

    info!(
        notes = paths.len(),
        dry_run = options.dry_run,
        policy = options.policy.as_str(),
        "tagging notes"
    );

    let store = FsDocumentStore;
    let reporter = CliProgress::new();

    let summary = match generated {
        Some(file) => {
            let text = std::fs::read_to_string(file)
                .map_err(|e| eyre!("cannot read generated text '{}': {e}", file.display()))?;
            let generator = FixedTextGenerator::new(text);
            tag_documents(&store, &generator, paths, &options, &reporter).await
        }
        None => {
            let mut generation = config.generation.clone();
            if let Some(model) = model {
                generation.model = model;
            }
            let api_key = resolve_api_key(&generation)?;
            let generator = OpenAiGenerator::new(&generation, api_key)?;
            tag_documents(&store, &generator, paths, &options, &reporter).await
        }
    };

    if options.dry_run {
        for result in &summary.tagged {
            println!("==> {} <==", result.path.display());
            println!("{}", result.outcome.document);
        }
    }

    print_summary(&summary, options.dry_run);

    if summary.has_failures() {
        return Err(eyre!(
            "{} of {} notes could not be tagged",
            summary.failed.len(),
            paths.len()
        ));
    }

    Ok(())
}

fn print_summary(summary: &BatchSummary, dry_run: bool) {
    println!();
    println!("  Tagged:  {}", summary.tagged.len());
    if dry_run {
        println!("  Written: 0 (dry run)");
    } else {
        println!("  Written: {}", summary.written());
    }
    println!("  Failed:  {}", summary.failed.len());
    for (path, error) in &summary.failed {
        println!("    {}: {error}", path.display());
    }
    println!("  Time:    {:.1}s", summary.elapsed.as_secs_f64());
    println!();
}

async fn cmd_inspect(path: &Path, json: bool) -> Result<()> {
    let doc = FsDocumentStore.read(path).await?;

    let existing = match existing_keywords(&doc) {
        Ok(existing) => existing,
        Err(e) if e.is_no_frontmatter() => {
            if json {
                let out = serde_json::json!({
                    "path": path.display().to_string(),
                    "header": null,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}: no frontmatter", path.display());
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        let out = serde_json::json!({
            "path": path.display().to_string(),
            "header": { "start": existing.header.start, "end": existing.header.end },
            "has_field": existing.has_field,
            "keywords": existing.keywords,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("  Note:     {}", path.display());
    println!("  Header:   bytes {}..{}", existing.header.start, existing.header.end);
    println!("  Field:    {}", if existing.has_field { "present" } else { "absent" });
    println!("  Keywords: {}", existing.keywords.len());
    for keyword in &existing.keywords {
        println!("    - {keyword}");
    }

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl TagProgress for CliProgress {
    fn document_started(&self, path: &Path, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Tagging [{current}/{total}] {}", path.display()));
    }

    fn document_finished(&self, path: &Path, result: &contextkeys_shared::Result<TagResult>) {
        match result {
            Ok(tagged) => self.spinner.println(format!(
                "  ok   {} (+{} keywords)",
                path.display(),
                tagged.outcome.incoming.len()
            )),
            Err(e) => self
                .spinner
                .println(format!("  fail {}: {e}", path.display())),
        }
    }

    fn done(&self, _summary: &BatchSummary) {
        self.spinner.finish_and_clear();
    }
}
