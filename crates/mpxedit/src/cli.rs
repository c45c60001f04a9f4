//! Clap derive structures for the `mpxedit` CLI.
//!
//! Only depends on clap so `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// mpxedit -- stage and apply changes to the X input device hierarchy
#[derive(Debug, Parser)]
#[command(
    name = "mpxedit",
    version,
    about = "Rearrange MPX master pointers, keyboards and their devices",
    long_about = "Edit the X input device hierarchy without touching it until you are ready.\n\n\
        Moves, new master groups and deletions are staged first, shown as the\n\
        hierarchy would look afterwards, and only dispatched to xinput on apply.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Read devices from a saved `xinput list` output instead of running xinput
    #[arg(long, env = "MPXEDIT_LISTING", global = true, value_name = "FILE")]
    pub listing: Option<PathBuf>,

    /// xinput program to run (overrides config)
    #[arg(long, env = "MPXEDIT_PROGRAM", global = true, value_name = "PROGRAM")]
    pub xinput: Option<String>,

    /// Hide devices whose name contains this text (empty shows all)
    #[arg(long, env = "MPXEDIT_MARKER", global = true, value_name = "TEXT")]
    pub marker: Option<String>,

    /// Output format (overrides config)
    #[arg(long, short = 'o', env = "MPXEDIT_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output (overrides config)
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one line per entry (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the current device hierarchy
    #[command(alias = "ls")]
    List,

    /// Stage edits and show the resulting hierarchy and xinput commands
    Plan(EditArgs),

    /// Stage edits and dispatch the resulting xinput commands
    Apply(ApplyArgs),

    /// Interactive editing session
    #[command(alias = "sh")]
    Shell(ShellArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Edits ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
#[command(after_help = "Edits:\n  \
    move <device> <group>    stage moving a device into a group\n  \
    detach <device>          stage floating a device\n  \
    undo-move <device>       send a device back to its real parent\n  \
    create <name>            stage a new master group\n  \
    undo-create <#n|name>    drop a staged group\n  \
    delete <group>           stage removing a master group\n  \
    undo-delete <group>      keep a group staged for removal\n  \
    reset <group>            cancel every move into or out of a group\n  \
    detach-all <group>       stage floating everything in a group\n\n\
    Devices and groups are named by id or exact name; quote names with spaces.\n\
    The unattached group is `floating`, staged groups are `#1`, `#2`, ...")]
pub struct EditArgs {
    /// Edit to stage (repeatable, applied in order)
    #[arg(long = "edit", short = 'e', value_name = "EDIT")]
    pub edits: Vec<String>,

    /// Read edits from a file, one per line (`-` for stdin)
    #[arg(long, short = 'f', value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub edits: EditArgs,

    /// Print the commands instead of running them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct ShellArgs {
    /// Print commands on apply instead of running them
    #[arg(long)]
    pub dry_run: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file with guided setup
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Display the current resolved configuration
    Show,

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
