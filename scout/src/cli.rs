//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Scout - conversational travel planner
#[derive(Parser)]
#[command(
    name = "scout",
    about = "Conversational travel planner: research, compare, and book trips",
    version,
    after_help = "Logs are written to: ~/.local/share/scout/logs/scout.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// User the session belongs to (scopes stored preferences)
    #[arg(short, long, global = true, default_value = "default")]
    pub user: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Interactive planning session
    Chat,

    /// Plan one trip and print the result
    Plan {
        /// The trip request, e.g. "Tokyo for a week in April, $3000"
        #[arg(value_name = "REQUEST")]
        request: String,
    },

    /// List saved trips
    Trips {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List available tools
    Tools,
}

/// Output format for listing commands
#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert!(matches!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!(matches!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("invalid".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_cli_parses_plan_command() {
        let cli = Cli::try_parse_from(["scout", "plan", "Tokyo in April"]).unwrap();
        match cli.command {
            Some(Command::Plan { request }) => assert_eq!(request, "Tokyo in April"),
            _ => panic!("expected plan command"),
        }
        assert_eq!(cli.user, "default");
    }

    #[test]
    fn test_cli_user_flag() {
        let cli = Cli::try_parse_from(["scout", "--user", "alice", "chat"]).unwrap();
        assert_eq!(cli.user, "alice");
        assert!(matches!(cli.command, Some(Command::Chat)));
    }
}
