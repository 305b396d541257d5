// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use uprint_core::config::UploadMode;
use uprint_core::types::{ColorMode, Orientation};

#[derive(Parser, Debug)]
#[command(name = "uprint", version, about = "Universal Print over Microsoft Graph")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.  These override the config file and
/// `UPRINT_*` variables.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Directory holding config.json and device keys.
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,
    /// Pre-acquired bearer token; skips the client-credentials grant.
    #[arg(long, env = "UPRINT_ACCESS_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,
    /// Graph API root, e.g. https://graph.microsoft.com/beta.
    #[arg(long, value_name = "URL", global = true)]
    pub graph_base_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List printer shares visible to the signed-in user.
    Shares,
    /// Print a PDF or OXPS file on a printer share.
    Print {
        share_id: String,
        file: PathBuf,
        #[arg(long)]
        copies: Option<u32>,
        #[arg(long)]
        orientation: Option<Orientation>,
        #[arg(long)]
        color_mode: Option<ColorMode>,
        #[arg(long, value_enum)]
        upload_mode: Option<UploadModeArg>,
    },
    /// Register a new printer and wait for Universal Print to create it.
    Register {
        name: String,
        #[arg(long, default_value = "uprint")]
        manufacturer: String,
        #[arg(long, default_value = "virtual")]
        model: String,
        /// Physical device id; omit for a virtual printer.
        #[arg(long)]
        device_id: Option<String>,
    },
    /// Show a registered printer.
    Printer { printer_id: String },
    /// Send an encoded IPP attribute set to a printer.
    UpdatePrinter { printer_id: String, ipp_file: PathBuf },
    /// Create a print task definition.
    TaskDefinition {
        name: String,
        #[arg(long, default_value = "uprint")]
        app_name: String,
    },
    /// Subscribe the webhook to a task definition's tasks.
    Subscribe {
        task_definition_id: String,
        #[arg(long)]
        notification_url: Option<String>,
    },
    /// Extend a subscription's expiry.
    Renew { subscription_id: String },
    /// Run a task definition whenever a job starts on a printer.
    Trigger {
        task_definition_id: String,
        printer_id: String,
    },
    /// Run the notification webhook.
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print the effective configuration.
    Config {
        /// Also write it to config.json in the data directory.
        #[arg(long)]
        save: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UploadModeArg {
    /// createUploadSession followed by a PUT.
    Session,
    /// uploadData with a Range header.
    Data,
}

impl From<UploadModeArg> for UploadMode {
    fn from(arg: UploadModeArg) -> Self {
        match arg {
            UploadModeArg::Session => Self::UploadSession,
            UploadModeArg::Data => Self::UploadData,
        }
    }
}
