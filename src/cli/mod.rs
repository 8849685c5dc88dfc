//! CLI module
//!
//! Command-line interface over the authenticated client.
//!
//! # Commands
//!
//! - `login` / `logout` / `whoami` - Manage the stored session
//! - `request` - Send an arbitrary request through the client
//! - `appointments` - List, cancel and reschedule appointments
//! - `records` - List medical records
//! - `patients` - List patients
//! - `ask` - Ask the clinic chatbot

mod commands;
mod runner;

pub use commands::{AppointmentCommands, Cli, Commands, OutputFormat};
pub use runner::Runner;
