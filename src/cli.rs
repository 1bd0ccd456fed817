//! CLI argument parsing, validation, and startup helpers.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use url::Url;

use crate::ClientConfig;
use crate::api::{ReimbursementStatus, ReimbursementType};
use crate::auth::PermissionSets;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "ers", about = "Employee reimbursement system client")]
pub struct Args {
    /// Backend API base URL
    #[arg(
        long,
        env = "ERS_API_BASE_URL",
        default_value = "http://localhost:8080/api"
    )]
    pub api_base_url: String,

    /// Directory where the session is stored
    #[arg(long, env = "ERS_STORAGE_DIR", default_value = ".ers")]
    pub storage_dir: PathBuf,

    /// JSON file with the permission sets of each role
    #[arg(long, env = "ERS_PERMISSIONS_FILE")]
    pub permissions_file: Option<PathBuf>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        /// Prefer the ERS_PASSWORD env var over passing this on the command line
        #[arg(long, env = "ERS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create a restricted account and sign in to it
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ERS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the stored session
    Logout,
    /// Show the current session
    Whoami,
    /// Show where navigating to a path would end up
    Open { path: String },
    /// Request employee access for a restricted account
    Upgrade,
    /// Manage reimbursements
    #[command(subcommand)]
    Reimbursements(ReimbursementCommand),
    /// Manage user accounts (managers only)
    #[command(subcommand)]
    Users(UserCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum ReimbursementCommand {
    /// List own reimbursements, or every reimbursement with --all
    List {
        #[arg(long)]
        all: bool,
        #[arg(long, value_enum)]
        status: Option<ReimbursementStatus>,
    },
    Create {
        #[arg(long)]
        description: String,
        #[arg(long = "type", value_enum)]
        kind: ReimbursementType,
    },
    /// Edit a pending reimbursement
    Update {
        id: i64,
        #[arg(long)]
        description: String,
        #[arg(long = "type", value_enum)]
        kind: ReimbursementType,
    },
    /// Approve or deny a pending reimbursement
    Resolve {
        id: i64,
        #[arg(long, value_enum)]
        status: ReimbursementStatus,
        #[arg(long)]
        comment: Option<String>,
    },
    Show {
        id: i64,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum UserCommand {
    List,
    Delete { id: i64 },
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_writer(std::io::stderr).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .compact()
            .with_writer(std::io::stderr)
            .init(),
    }
}

/// Parse and validate the API base URL.
/// Returns None and logs an error if validation fails.
pub fn validate_api_base_url(api_base_url: &str) -> Option<Url> {
    let url = match Url::parse(api_base_url) {
        Ok(url) => url,
        Err(e) => {
            error!(url = %api_base_url, error = %e, "Invalid API base URL");
            return None;
        }
    };

    if !matches!(url.scheme(), "http" | "https") {
        error!(url = %api_base_url, "API base URL must use http or https");
        return None;
    }

    if url.query().is_some() || url.fragment().is_some() {
        error!(url = %api_base_url, "API base URL must not have a query or fragment");
        return None;
    }

    Some(url)
}

/// Load permission sets, or the empty default when no file is given.
/// Returns None and logs an error if the file cannot be used.
pub fn load_permissions(path: Option<&std::path::Path>) -> Option<PermissionSets> {
    let Some(path) = path else {
        return Some(PermissionSets::default());
    };

    match PermissionSets::load(path) {
        Ok(sets) => Some(sets),
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to load permission sets");
            None
        }
    }
}

/// Build ClientConfig from arguments, logging any validation failure.
pub fn build_config(args: &Args) -> Option<ClientConfig> {
    let api_base_url = validate_api_base_url(&args.api_base_url)?;
    let permissions = load_permissions(args.permissions_file.as_deref())?;

    info!(
        api = %api_base_url,
        storage = %args.storage_dir.display(),
        "Client configured"
    );

    Some(ClientConfig {
        api_base_url,
        storage_dir: args.storage_dir.clone(),
        permissions,
    })
}
