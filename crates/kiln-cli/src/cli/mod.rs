//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use kiln_core::domain::ConflictStrategy;

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name     = "kiln",
    bin_name = "kiln",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Blueprint-driven project generation",
    long_about = "Kiln turns a blueprint of modules and a requirements profile \
                  into a project tree, in dependency order, and undoes every \
                  write if any step fails.",
    after_help = "EXAMPLES:\n\
        \x20 kiln generate request.toml\n\
        \x20 kiln generate request.json -o ./out --on-conflict merge\n\
        \x20 kiln generate request.toml --dry-run --format json\n\
        \x20 kiln plan request.toml",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a project from a request file.
    #[command(
        visible_alias = "gen",
        about = "Generate a project",
        after_help = "EXAMPLES:\n\
            \x20 kiln generate request.toml\n\
            \x20 kiln generate request.toml -o ../shop -y\n\
            \x20 kiln generate request.toml --on-conflict overwrite\n\
            \x20 kiln generate request.toml --dry-run"
    )]
    Generate(GenerateArgs),

    /// Show module order and step count for a request.
    #[command(
        about = "Show the generation plan",
        after_help = "EXAMPLES:\n\
            \x20 kiln plan request.toml\n\
            \x20 kiln plan request.json --format json"
    )]
    Plan(PlanArgs),

    /// Write a default configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 kiln init\n\
            \x20 kiln init --force\n\
            \x20 kiln --config ./kiln.toml init"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 kiln completions bash > ~/.local/share/bash-completion/completions/kiln\n\
            \x20 kiln completions zsh  > ~/.zfunc/_kiln\n\
            \x20 kiln completions fish > ~/.config/fish/completions/kiln.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 kiln config get generation.conflict_strategy\n\
            \x20 kiln config list\n\
            \x20 kiln config path"
    )]
    Config(ConfigCommands),
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for `kiln generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Request file (`.toml` or `.json`) holding a blueprint and a profile.
    #[arg(value_name = "REQUEST", help = "Request file (.toml or .json)")]
    pub request: PathBuf,

    /// Project root. Defaults to `<generation.default_output>/<project_name>`.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Directory to generate into"
    )]
    pub output: Option<PathBuf>,

    /// What to do with files that already exist.
    #[arg(
        long = "on-conflict",
        value_name = "STRATEGY",
        value_enum,
        help = "Conflict strategy (default from config: skip)"
    )]
    pub on_conflict: Option<ConflictArg>,

    /// Run in memory and list the files that would be written.
    #[arg(long = "dry-run", help = "Show what would be created without creating")]
    pub dry_run: bool,

    /// Skip the confirmation prompt.
    #[arg(
        short = 'y',
        long = "yes",
        help = "Write into a non-empty directory without asking"
    )]
    pub yes: bool,
}

/// `--on-conflict` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConflictArg {
    Skip,
    /// Also accepted as `force`.
    #[value(alias = "force")]
    Overwrite,
    Merge,
}

impl From<ConflictArg> for ConflictStrategy {
    fn from(arg: ConflictArg) -> Self {
        match arg {
            ConflictArg::Skip => Self::Skip,
            ConflictArg::Overwrite => Self::Overwrite,
            ConflictArg::Merge => Self::Merge,
        }
    }
}

// ── plan ──────────────────────────────────────────────────────────────────────

/// Arguments for `kiln plan`.
#[derive(Debug, Args)]
pub struct PlanArgs {
    #[arg(value_name = "REQUEST", help = "Request file (.toml or .json)")]
    pub request: PathBuf,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `kiln init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `kiln completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `kiln config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `output.format`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
