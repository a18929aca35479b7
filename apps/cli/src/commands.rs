//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use readmepage_core::pipeline::{BuildConfig, BuildResult, ProgressReporter};
use readmepage_shared::{AppConfig, init_config, load_config, resolve_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// readmepage — turn a remote README into a static showcase page.
#[derive(Parser)]
#[command(
    name = "readmepage",
    version,
    about = "Fetch a README, highlight its code, and write a single static HTML page.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ./readmepage.toml, then ~/.readmepage/readmepage.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
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
    /// Fetch the README and write the page (the default command).
    Build {
        /// Markdown URL to fetch instead of the configured one.
        #[arg(long)]
        url: Option<String>,

        /// Output HTML file.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Local markdown appended after the fetched document.
        #[arg(long)]
        fragment: Option<PathBuf>,

        /// Leave mermaid code blocks as ordinary code.
        #[arg(long)]
        no_mermaid: bool,
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
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "readmepage=info",
        1 => "readmepage=debug",
        _ => "readmepage=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Some(Command::Build {
            url,
            out,
            fragment,
            no_mermaid,
        }) => {
            let overrides = BuildOverrides {
                url,
                out,
                fragment,
                no_mermaid,
            };
            cmd_build(config_path, overrides).await
        }
        None => cmd_build(config_path, BuildOverrides::default()).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path).await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

/// CLI flags that override the config file.
#[derive(Default)]
struct BuildOverrides {
    url: Option<String>,
    out: Option<PathBuf>,
    fragment: Option<PathBuf>,
    no_mermaid: bool,
}

impl BuildOverrides {
    /// Apply the flags on top of the loaded file, before anything is validated.
    fn apply(self, config: &mut AppConfig) {
        if let Some(url) = self.url {
            config.source.url = url;
        }
        if let Some(out) = self.out {
            config.output.path = out;
        }
        if self.fragment.is_some() {
            config.source.fragment = self.fragment;
        }
        if self.no_mermaid {
            config.transform.mermaid = false;
        }
    }
}

async fn cmd_build(config_path: Option<&Path>, overrides: BuildOverrides) -> Result<()> {
    let mut config = load_config(config_path)?;
    overrides.apply(&mut config);
    let build_config = BuildConfig::try_from(&config)?;

    info!(
        url = %build_config.url,
        output = %build_config.output.display(),
        mermaid = build_config.transform.mermaid,
        "building page"
    );

    let reporter = CliProgress::new();
    let result = readmepage_core::pipeline::run_build(&build_config, &reporter).await?;

    println!();
    println!("  Page written!");
    println!("  Output:  {}", result.output.display());
    println!("  Header:  {} token(s)", result.header_tokens);
    println!("  Body:    {} token(s)", result.body_tokens);
    println!("  TOC:     {} entr(y/ies)", result.toc_entries);
    println!("  Size:    {} bytes", result.bytes_written);
    println!("  Time:    {:.1}s", result.elapsed.as_secs_f64());
    println!();

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
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        // Failed runs never reach `done`.
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _result: &BuildResult) {
        self.spinner.finish_and_clear();
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    match resolve_config(config_path)? {
        Some(path) => println!("# {}", path.display()),
        None => println!("# built-in defaults"),
    }
    let config: AppConfig = load_config(config_path)?;
    config.validate()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
