//! Runner configuration - command-line flags with environment fallbacks

use activation_core::application::{ActivationConfig, ResolutionMode};
use activation_core::application::coordinator::constants::{
    ACTIVATION_METADATA_KEY, PROCESS_DESCRIPTION, SCHEDULED_DATE_PROPERTY,
};
use activation_core::domain::DEFAULT_CONTENT_NODE;
use clap::{Parser, Subcommand};

pub const DEFAULT_DB_PATH: &str = "~/.deferred-activation/content.db";

#[derive(Parser, Debug)]
#[command(name = "deferred-activation")]
#[command(about = "Run deferred activation cycles for workflow tasks")]
#[command(long_about = PROCESS_DESCRIPTION)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// SQLite database holding content nodes and the task graph
    #[arg(long, env = "ACTIVATION_DB_PATH", default_value = DEFAULT_DB_PATH)]
    pub db_path: String,

    /// Content node property holding the scheduled date
    #[arg(long, env = "ACTIVATION_PROPERTY", default_value = SCHEDULED_DATE_PROPERTY)]
    pub property: String,

    /// Task metadata key receiving the activation value
    #[arg(long, env = "ACTIVATION_METADATA_KEY", default_value = ACTIVATION_METADATA_KEY)]
    pub metadata_key: String,

    /// Child node of the payload that carries its properties (read by the content repository)
    #[arg(long, env = "ACTIVATION_CONTENT_NODE", default_value = DEFAULT_CONTENT_NODE)]
    pub content_node: String,

    /// Written value: "absolute" instant or "relative" delay in ms
    #[arg(long, env = "ACTIVATION_MODE", default_value = "absolute")]
    pub mode: ResolutionMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one activation cycle per task, in order
    Activate {
        /// Task IDs
        #[arg(required = true)]
        task_ids: Vec<String>,
    },

    /// Print the metadata reachable from a task
    Show {
        /// Task ID
        task_id: String,
    },
}

impl Cli {
    /// Database URL with `~` expanded
    pub fn database_path(&self) -> String {
        shellexpand::tilde(&self.db_path).into_owned()
    }

    pub fn activation_config(&self) -> ActivationConfig {
        ActivationConfig {
            property: self.property.clone(),
            metadata_key: self.metadata_key.clone(),
            mode: self.mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["deferred-activation", "activate", "t1", "t2"]).unwrap();

        assert_eq!(cli.activation_config(), ActivationConfig::default());
        assert_eq!(cli.content_node, "jcr:content");
        assert!(cli.database_path().ends_with(".deferred-activation/content.db"));
        match cli.command {
            Commands::Activate { task_ids } => assert_eq!(task_ids, vec!["t1", "t2"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "deferred-activation",
            "--db-path",
            "/tmp/content.db",
            "--metadata-key",
            "activation-delay",
            "--mode",
            "relative",
            "--content-node",
            "body",
            "show",
            "t1",
        ])
        .unwrap();

        let config = cli.activation_config();
        assert_eq!(config.metadata_key, "activation-delay");
        assert_eq!(config.mode, ResolutionMode::RelativeDelay);
        assert_eq!(cli.database_path(), "/tmp/content.db");
        assert_eq!(cli.content_node, "body");
    }

    #[test]
    fn test_activate_requires_task() {
        assert!(Cli::try_parse_from(["deferred-activation", "activate"]).is_err());
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let result = Cli::try_parse_from(["deferred-activation", "--mode", "soon", "show", "t1"]);
        assert!(result.is_err());
    }
}
