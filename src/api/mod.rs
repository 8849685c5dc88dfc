//! Resource API wrappers
//!
//! Thin typed wrappers over the backend endpoints. They hold no state of
//! their own and apply no business rules; every call goes through the
//! `AuthenticatedClient`, so all of them share its token handling.
//!
//! ```rust,ignore
//! let client = AuthenticatedClient::new(config, Arc::new(store))?;
//! client.auth().login("ana@clinic.test", "secret").await?;
//! let upcoming = client.appointments().list().await?;
//! ```

mod appointments;
mod auth;
mod chatbot;
mod patients;
mod records;
mod types;

pub use appointments::AppointmentsApi;
pub use auth::AuthApi;
pub use chatbot::ChatbotApi;
pub use patients::PatientsApi;
pub use records::RecordsApi;
pub use types::{
    Appointment, AppointmentStatus, ChatReply, LoginResponse, MedicalRecord, NewAppointment,
    NewMedicalRecord, NewPatient, Patient, RegisterRequest, Reschedule, Role, User,
};

use crate::error::Result;
use crate::http::AuthenticatedClient;
use crate::types::{JsonValue, ResourceId};
use serde::Serialize;

impl AuthenticatedClient {
    /// Login, logout, registration and password reset
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// Appointment booking and management
    pub fn appointments(&self) -> AppointmentsApi<'_> {
        AppointmentsApi::new(self)
    }

    /// Medical records
    pub fn records(&self) -> RecordsApi<'_> {
        RecordsApi::new(self)
    }

    /// Patients visible to the signed-in doctor
    pub fn patients(&self) -> PatientsApi<'_> {
        PatientsApi::new(self)
    }

    /// Chatbot questions
    pub fn chatbot(&self) -> ChatbotApi<'_> {
        ChatbotApi::new(self)
    }
}

/// Path of a single item under a collection, e.g. `/appointments/5/`
fn item_path(collection: &str, id: ResourceId) -> String {
    format!("{}/{id}/", collection.trim_end_matches('/'))
}

fn to_body<T: Serialize + ?Sized>(value: &T) -> Result<JsonValue> {
    Ok(serde_json::to_value(value)?)
}
