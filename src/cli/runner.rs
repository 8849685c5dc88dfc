//! CLI runner - executes commands

use crate::api::{Appointment, MedicalRecord, Patient, Reschedule};
use crate::auth::{InvalidationReason, SessionEvent};
use crate::cli::commands::{AppointmentCommands, Cli, Commands, OutputFormat};
use crate::config::ClientSettings;
use crate::error::{Error, Result};
use crate::http::{ApiRequest, AuthenticatedClient};
use crate::store::FileCredentialStore;
use crate::types::{JsonValue, Method, ResourceId};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Resolve settings: file, then environment, then command-line flags
    pub fn settings(&self) -> Result<ClientSettings> {
        let mut settings = ClientSettings::load(self.cli.config.as_deref())?;
        if let Some(ref base_url) = self.cli.base_url {
            settings.base_url = Some(base_url.clone());
        }
        if let Some(ref path) = self.cli.credentials {
            settings.credentials_path = path.clone();
        }
        Ok(settings)
    }

    /// Build the authenticated client backed by the credentials file
    pub fn build_client(&self) -> Result<AuthenticatedClient> {
        let settings = self.settings()?;
        let store = FileCredentialStore::open(&settings.credentials_path)?;
        debug!(
            credentials = %settings.credentials_path.display(),
            "Using credential store"
        );
        AuthenticatedClient::new(settings.http_config()?, Arc::new(store))
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let client = self.build_client()?;
        let mut events = client.subscribe();

        let result = self.execute(&client).await;
        report_session_events(&mut events);
        result
    }

    async fn execute(&self, client: &AuthenticatedClient) -> Result<()> {
        match &self.cli.command {
            Commands::Login { email, password } => {
                let user = client.auth().login(email, password).await?;
                self.print_message(&format!("Logged in as {}", user.display_name()));
                Ok(())
            }
            Commands::Logout => {
                client.auth().logout().await?;
                self.print_message("Logged out");
                Ok(())
            }
            Commands::Whoami => match client.auth().current_user().await? {
                Some(user) => self.print_value(&user, |u| {
                    format!("{} <{}> ({:?})", u.display_name(), u.email, u.role)
                }),
                None => Err(Error::reauth("not logged in")),
            },
            Commands::Request {
                method,
                path,
                json,
                query,
            } => self.raw_request(client, *method, path, json.as_deref(), query).await,
            Commands::Appointments(cmd) => self.appointments(client, cmd).await,
            Commands::Records { patient } => {
                let records = client.records().list(*patient).await?;
                self.print_list(&records, format_record)
            }
            Commands::Patients { search } => {
                let patients = client.patients().list(search.as_deref()).await?;
                self.print_list(&patients, format_patient)
            }
            Commands::Ask { question } => {
                let answer = client.chatbot().ask(&question.join(" ")).await?;
                self.print_value(&serde_json::json!({ "answer": answer }), |_| {
                    answer.clone()
                })
            }
        }
    }

    async fn appointments(
        &self,
        client: &AuthenticatedClient,
        cmd: &AppointmentCommands,
    ) -> Result<()> {
        let api = client.appointments();
        match cmd {
            AppointmentCommands::List => {
                let appointments = api.list().await?;
                self.print_list(&appointments, format_appointment)
            }
            AppointmentCommands::Cancel { id } => {
                let appointment = api.cancel(*id).await?;
                self.print_value(&appointment, format_appointment)
            }
            AppointmentCommands::Reschedule { id, date, time } => {
                let appointment = api
                    .reschedule(
                        *id,
                        Reschedule {
                            date: *date,
                            time: *time,
                        },
                    )
                    .await?;
                self.print_value(&appointment, format_appointment)
            }
        }
    }

    async fn raw_request(
        &self,
        client: &AuthenticatedClient,
        method: Method,
        path: &str,
        json: Option<&str>,
        query: &[(String, String)],
    ) -> Result<()> {
        let mut request = ApiRequest::new(method, path);
        for (key, value) in query {
            request = request.query(key, value);
        }
        if let Some(body) = json {
            let body: JsonValue = serde_json::from_str(body)?;
            request = request.json(body);
        }

        let response = client.send(request).await?;
        let status = response.status();
        let text = response.text().await?;
        let body = serde_json::from_str::<JsonValue>(&text).unwrap_or(JsonValue::String(text));

        match self.cli.format {
            OutputFormat::Json => {
                let out = serde_json::json!({ "status": status.as_u16(), "body": body });
                println!("{}", serde_json::to_string(&out)?);
            }
            OutputFormat::Pretty => {
                println!("HTTP {status}");
                match body {
                    JsonValue::String(s) => println!("{s}"),
                    other => println!("{}", serde_json::to_string_pretty(&other)?),
                }
            }
        }
        Ok(())
    }

    fn print_message(&self, message: &str) {
        match self.cli.format {
            OutputFormat::Json => println!("{}", serde_json::json!({ "message": message })),
            OutputFormat::Pretty => println!("{message}"),
        }
    }

    fn print_value<T, F>(&self, value: &T, pretty: F) -> Result<()>
    where
        T: Serialize,
        F: Fn(&T) -> String,
    {
        match self.cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(value)?),
            OutputFormat::Pretty => println!("{}", pretty(value)),
        }
        Ok(())
    }

    fn print_list<T, F>(&self, items: &[T], pretty: F) -> Result<()>
    where
        T: Serialize,
        F: Fn(&T) -> String,
    {
        match self.cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(items)?),
            OutputFormat::Pretty => {
                if items.is_empty() {
                    println!("(none)");
                }
                for item in items {
                    println!("{}", pretty(item));
                }
            }
        }
        Ok(())
    }
}

/// Log sessions that were dropped while the command ran
fn report_session_events(events: &mut broadcast::Receiver<SessionEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            SessionEvent::Invalidated { reason } if reason != InvalidationReason::LoggedOut => {
                warn!(?reason, "Stored session was cleared");
            }
            other => debug!(?other, "Session event"),
        }
    }
}

fn format_appointment(a: &Appointment) -> String {
    let doctor = a
        .doctor
        .map_or_else(|| "-".to_string(), |d: ResourceId| d.to_string());
    format!(
        "#{:<5} {} {}  doctor {:<5} {:?}",
        a.id,
        a.date,
        a.time.format("%H:%M"),
        doctor,
        a.status
    )
}

fn format_record(r: &MedicalRecord) -> String {
    format!(
        "#{:<5} patient {:<5} {}",
        r.id,
        r.patient,
        r.diagnosis.as_deref().unwrap_or("(no diagnosis)")
    )
}

fn format_patient(p: &Patient) -> String {
    let name = [p.first_name.as_deref(), p.last_name.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "#{:<5} {}  {}",
        p.id,
        if name.is_empty() { "(unnamed)" } else { &name },
        p.email.as_deref().unwrap_or("")
    )
}
