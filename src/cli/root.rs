use anyhow::Result;
use clap::{Parser, Subcommand};
use hookdialog::{config, DialogDefaults, DialogRejection, DialogService, LayerStack};
use serde_json::json;
use std::path::PathBuf;
use tracing::{debug, info};

use super::demo;
use crate::tui;

/// hookdialog - ask a question in the terminal and print the answer
#[derive(Parser)]
#[command(
    name = "hookdialog-demo",
    version,
    about = "Ask a question in a terminal dialog and print the answer as JSON",
    long_about = r#"Opens a modal dialog in the terminal, waits for the answer and prints the
outcome as JSON on stdout: {"status": "resolved" | "rejected", "value": ...}

Examples:
  hookdialog-demo confirm "Delete the branch?"
  hookdialog-demo alert "Build finished"
  hookdialog-demo form --field name --field email
  hookdialog-demo choices red green blue"#
)]
pub struct Cli {
    /// Read renderer defaults from this file instead of the search path
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Show a close button in the dialog corner
    #[arg(long = "close-button", global = true)]
    pub close_button: bool,

    /// Let a click outside the dialog cancel it
    #[arg(long = "backdrop-cancel", global = true)]
    pub backdrop_cancel: bool,

    /// Settle cancel buttons with a value instead of rejecting
    #[arg(long = "no-reject", global = true)]
    pub no_reject: bool,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Yes/no confirmation
    Confirm {
        /// Question to ask
        message: String,

        #[arg(short = 't', long = "title", default_value = "Please confirm")]
        title: String,

        /// Style the confirm button as dangerous
        #[arg(long = "danger")]
        danger: bool,
    },

    /// Message with a single OK button
    Alert {
        message: String,

        #[arg(short = 't', long = "title")]
        title: Option<String>,
    },

    /// Form whose values are returned on submit
    Form {
        /// Field names; repeat a name to collect a list
        #[arg(short = 'f', long = "field", required = true)]
        fields: Vec<String>,

        #[arg(short = 't', long = "title", default_value = "Fill in")]
        title: String,
    },

    /// Pick one of several options
    Choices {
        #[arg(required = true)]
        options: Vec<String>,

        #[arg(short = 't', long = "title", default_value = "Choose one")]
        title: String,
    },
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        if self.debug {
            debug!("Debug logging enabled");
        }

        let defaults = self.load_defaults().await?;
        debug!("Renderer defaults: {:?}", defaults);

        let service = DialogService::new(LayerStack::new());
        service.set_renderer_defaults(defaults);

        let request = match &self.command {
            Commands::Confirm {
                message,
                title,
                danger,
            } => demo::confirm(title, message, *danger),
            Commands::Alert { message, title } => demo::alert(title.as_deref(), message),
            Commands::Form { fields, title } => demo::form(title, fields),
            Commands::Choices { options, title } => demo::choices(title, options),
        };

        let handle = service.request(request)?;
        info!("Opened dialog {}", handle.id());

        let outcome = tui::run_dialog(&service, handle).await?;
        let report = match outcome {
            Ok(value) => json!({"status": "resolved", "value": value}),
            Err(DialogRejection::Rejected(value)) => json!({"status": "rejected", "value": value}),
            Err(DialogRejection::Dropped) => json!({"status": "dropped", "value": null}),
        };
        println!("{}", serde_json::to_string(&report)?);
        Ok(())
    }

    async fn load_defaults(&self) -> Result<DialogDefaults> {
        let mut defaults = match &self.config {
            Some(path) => {
                let mut defaults = config::load_from_path(path).await?;
                config::load_from_env(&mut defaults);
                defaults
            }
            None => config::load_defaults().await?,
        };

        // Flags win over files and environment
        let mut overrides = DialogDefaults::new();
        if self.close_button {
            overrides = overrides.show_close_button(true);
        }
        if self.backdrop_cancel {
            overrides = overrides.backdrop_cancel(true);
        }
        if self.no_reject {
            overrides = overrides.reject_on_cancel(false);
        }
        defaults.merge_with(overrides);
        Ok(defaults)
    }
}
