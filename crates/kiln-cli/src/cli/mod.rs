//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "kiln",
    bin_name = "kiln",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{1f525} Add technology modules to an existing project",
    long_about = "Kiln installs self-describing modules (databases, auth, UI kits, ...) \
                  into a project: it orders them by dependency, rejects conflicting \
                  combinations, and runs each module's blueprint idempotently.",
    after_help = "EXAMPLES:\n\
        \x20 kiln add prisma next-auth\n\
        \x20 kiln add prisma --param prisma.provider=sqlite --dry-run\n\
        \x20 kiln resolve next-auth\n\
        \x20 kiln list --category orm\n\
        \x20 kiln completions bash > /usr/share/bash-completion/completions/kiln",
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
    /// Install modules into a project.
    #[command(
        visible_alias = "a",
        about = "Install modules into a project",
        after_help = "EXAMPLES:\n\
            \x20 kiln add prisma\n\
            \x20 kiln add next-auth --param next-auth.social=true --yes\n\
            \x20 kiln add prisma --root ../my-app --layout monorepo\n\
            \x20 kiln add shadcn --dry-run"
    )]
    Add(AddArgs),

    /// Show the install order for a set of modules without running anything.
    #[command(
        about = "Show install order and conflicts",
        after_help = "EXAMPLES:\n\
            \x20 kiln resolve next-auth\n\
            \x20 kiln resolve prisma drizzle"
    )]
    Resolve(ResolveArgs),

    /// List available modules.
    #[command(
        visible_alias = "ls",
        about = "List available modules",
        after_help = "EXAMPLES:\n\
            \x20 kiln list\n\
            \x20 kiln list --category auth\n\
            \x20 kiln list --format json"
    )]
    List(ListArgs),

    /// Initialise a Kiln configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 kiln init           # global config\n\
            \x20 kiln init --local   # .kiln.toml in CWD"
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

    /// Inspect the Kiln configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 kiln config get project.package_manager\n\
            \x20 kiln config list\n\
            \x20 kiln config path"
    )]
    Config(ConfigCommands),
}

// ── add ───────────────────────────────────────────────────────────────────────

/// Arguments for `kiln add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Modules to install; dependencies are pulled in automatically.
    #[arg(value_name = "MODULE", required = true, num_args = 1..)]
    pub modules: Vec<String>,

    /// Parameter assignment, repeatable.
    #[arg(
        short = 'p',
        long = "param",
        value_name = "MODULE.KEY=VALUE",
        help = "Set a module parameter (e.g. prisma.provider=sqlite)"
    )]
    pub params: Vec<String>,

    /// Project root.
    #[arg(
        short = 'r',
        long = "root",
        value_name = "DIR",
        default_value = ".",
        help = "Project root directory"
    )]
    pub root: PathBuf,

    /// Project name used in templates; defaults to the root directory name.
    #[arg(long = "name", value_name = "NAME", help = "Project name")]
    pub name: Option<String>,

    /// Package manager used for package installs.
    #[arg(
        long = "package-manager",
        value_name = "PM",
        help = "Package manager (npm, pnpm, yarn, bun); detected from lockfiles by default"
    )]
    pub package_manager: Option<String>,

    /// Project layout for `{{paths.*}}` lookups.
    #[arg(
        long = "layout",
        value_name = "LAYOUT",
        help = "Project layout: single-app, monorepo or auto"
    )]
    pub layout: Option<String>,

    /// Directory of module manifests to use instead of the defaults.
    #[arg(long = "modules-dir", value_name = "DIR", help = "Module manifest directory")]
    pub modules_dir: Option<PathBuf>,

    /// Preview what would be written without touching the project.
    #[arg(long = "dry-run", help = "Show what would change without changing it")]
    pub dry_run: bool,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long = "yes", help = "Skip confirmation")]
    pub yes: bool,

    /// Stop at the first module that reports an error.
    #[arg(long = "stop-on-failure", help = "Stop after the first failing module")]
    pub stop_on_failure: bool,
}

// ── resolve ───────────────────────────────────────────────────────────────────

/// Arguments for `kiln resolve`.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Modules to resolve.
    #[arg(value_name = "MODULE", required = true, num_args = 1..)]
    pub modules: Vec<String>,

    /// Directory of module manifests to use instead of the defaults.
    #[arg(long = "modules-dir", value_name = "DIR", help = "Module manifest directory")]
    pub modules_dir: Option<PathBuf>,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `kiln list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Filter by category.
    #[arg(long = "category", value_name = "CATEGORY", help = "Filter by category")]
    pub category: Option<String>,

    /// Directory of module manifests to use instead of the defaults.
    #[arg(long = "modules-dir", value_name = "DIR", help = "Module manifest directory")]
    pub modules_dir: Option<PathBuf>,

    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One id per line.
    List,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `kiln init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to the global config location (the default).
    #[arg(long = "global", conflicts_with = "local", help = "Create global configuration")]
    pub global: bool,

    /// Write to `.kiln.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

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
        /// Dotted key path, e.g. `project.layout`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the global configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
