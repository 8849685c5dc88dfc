//! CLI commands and argument parsing

use crate::types::{Method, ResourceId};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Clinic appointments and records client
#[derive(Parser, Debug)]
#[command(name = "clinic-client")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides config and environment)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Credentials file (overrides config and environment)
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Password (read from CLINIC_PASSWORD if omitted)
        #[arg(long, env = "CLINIC_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log out and forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Send a raw request through the authenticated client
    Request {
        /// HTTP method
        method: Method,

        /// Path relative to the base URL
        path: String,

        /// JSON request body
        #[arg(long)]
        json: Option<String>,

        /// Query parameter (key=value), repeatable
        #[arg(short, long = "query", value_parser = parse_key_value)]
        query: Vec<(String, String)>,
    },

    /// Appointment commands
    #[command(subcommand)]
    Appointments(AppointmentCommands),

    /// List medical records
    Records {
        /// Only records of this patient
        #[arg(long)]
        patient: Option<ResourceId>,
    },

    /// List patients
    Patients {
        /// Free-text search
        #[arg(long)]
        search: Option<String>,
    },

    /// Ask the clinic chatbot a question
    Ask {
        /// The question
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
}

/// Appointment subcommands
#[derive(Subcommand, Debug)]
pub enum AppointmentCommands {
    /// List appointments
    List,

    /// Cancel an appointment
    Cancel {
        /// Appointment ID
        id: ResourceId,
    },

    /// Move an appointment to a new slot
    Reschedule {
        /// Appointment ID
        id: ResourceId,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: chrono::NaiveDate,

        /// New time (HH:MM:SS)
        #[arg(long)]
        time: chrono::NaiveTime,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable output
    Pretty,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
