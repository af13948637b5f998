//! CLI runner - executes commands

use crate::catalog::{discover, Catalog};
use crate::cli::commands::{Cli, Commands};
use crate::config::TapConfig;
use crate::engine::SyncEngine;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::output::JsonLinesSink;
use crate::state::{migrate, StateManager};
use crate::strategy::{fetch_records, PROJECTS_STREAM};
use serde_json::{json, Value};
use std::fs;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match self.cli.resolved_command() {
            Commands::Discover => self.discover(),
            Commands::Sync => self.sync().await,
            Commands::Check => self.check().await,
        }
    }

    /// Load and validate the config
    fn load_config(&self) -> Result<TapConfig> {
        // Inline config takes precedence
        if let Some(json_str) = &self.cli.config_json {
            return TapConfig::from_json(json_str);
        }

        if let Some(path) = &self.cli.config {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;
            return TapConfig::from_json(&content);
        }

        Err(Error::config(
            "No config provided (use --config or --config-json)",
        ))
    }

    /// Load the catalog, or select every discovered stream without one
    fn load_catalog(&self) -> Result<Catalog> {
        if let Some(path) = &self.cli.catalog {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::config(format!("Failed to read catalog file: {e}")))?;
            return Catalog::from_json(&content);
        }
        Ok(discover()?.select_all())
    }

    /// Load the incoming state document in whatever shape it was written
    fn load_raw_state(&self) -> Result<Value> {
        // Inline state takes precedence
        if let Some(state_json) = &self.cli.state_json {
            StateManager::parse_raw(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::read_raw_file(path)
        } else {
            Ok(json!({}))
        }
    }

    fn discover(&self) -> Result<()> {
        let catalog = discover()?;
        info!(streams = catalog.streams.len(), "Discovered streams");
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        Ok(())
    }

    async fn sync(&self) -> Result<()> {
        let config = self.load_config()?;
        let catalog = self.load_catalog()?;
        let state = migrate(&self.load_raw_state()?, &catalog);

        let mut manager = StateManager::new(state);
        if let Some(path) = &self.cli.state_output {
            manager = manager.with_output(path);
        }

        let client = HttpClient::from_tap_config(&config)?;
        let mut engine = SyncEngine::new(client, config, catalog).with_state(manager);
        let mut sink = JsonLinesSink::stdout();
        engine.run(&mut sink).await?;
        Ok(())
    }

    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        let client = HttpClient::from_tap_config(&config)?;

        match fetch_records(&client, PROJECTS_STREAM).await {
            Ok(projects) => {
                output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "SUCCEEDED",
                        "message": format!("Connection successful, {} projects visible", projects.len())
                    }
                }));
                Ok(())
            }
            Err(e) => {
                output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "FAILED",
                        "message": format!("Connection failed: {e}")
                    }
                }));
                Err(e)
            }
        }
    }
}

fn output_message(msg: &Value) {
    println!("{msg}");
}
