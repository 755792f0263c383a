use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "tripwire",
    about = "Trip named failure and logging scenarios against a telemetry sink",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/tripwire/logs/tripwire.log\n\nExit codes for `run`: 10 syntax, 11 uri, 12 reference, 13 thrown value, 14 http, 15 network"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to tripwire.yaml config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List registered scenarios
    List {
        /// Output format (default: one name per line)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Trigger a scenario by name
    Run {
        /// Scenario name (see `tripwire list`)
        scenario: String,
    },

    /// Run every log-emission scenario
    Smoke,

    /// Show entries written by the file sink
    Observe {
        /// Only show entries whose type or message contains this string
        #[arg(long, short)]
        filter: Option<String>,

        /// Number of recent entries to show
        #[arg(long, short = 'n', default_value_t = 20)]
        last: usize,

        /// Keep watching for new entries
        #[arg(long)]
        follow: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Get a configuration value
    Get {
        /// Configuration key (dot notation)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// New value
        value: String,
    },
}
