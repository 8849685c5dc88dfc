//! Resource types exchanged with the backend
//!
//! Field sets are loose: anything the backend sends that is not modelled
//! here lands in `extra` instead of failing the decode. Field names are the
//! backend's JSON keys.

#![allow(missing_docs)]

use crate::types::{JsonObject, ResourceId};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Users and Auth
// ============================================================================

/// Role of the signed-in account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Patient,
    Doctor,
    Admin,
    #[serde(other)]
    Unknown,
}

/// Account of the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: ResourceId,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl User {
    /// Name for display, falling back to the email address
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            self.email.clone()
        } else {
            parts.join(" ")
        }
    }
}

/// Body returned by the login endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "access_token")]
    pub access: String,
    #[serde(alias = "refresh_token")]
    pub refresh: String,
    pub user: User,
}

/// Account registration payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub role: Role,
}

// ============================================================================
// Appointments
// ============================================================================

/// Appointment status as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// A booked appointment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: ResourceId,
    #[serde(default)]
    pub patient: Option<ResourceId>,
    #[serde(default)]
    pub doctor: Option<ResourceId>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// Booking payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAppointment {
    pub doctor: ResourceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<ResourceId>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Rescheduling payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reschedule {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

// ============================================================================
// Medical Records
// ============================================================================

/// A medical record entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: ResourceId,
    pub patient: ResourceId,
    #[serde(default)]
    pub doctor: Option<ResourceId>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub treatment: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// Payload for creating a medical record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMedicalRecord {
    pub patient: ResourceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ============================================================================
// Patients
// ============================================================================

/// A patient visible to the signed-in doctor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: ResourceId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// Payload for creating a patient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

// ============================================================================
// Chatbot
// ============================================================================

/// Answer from the chatbot endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    #[serde(alias = "response", alias = "reply")]
    pub answer: String,
}

// ============================================================================
// Lists
// ============================================================================

/// List endpoints answer either with a bare array or a paginated envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListResponse<T> {
    Plain(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> ListResponse<T> {
    pub(crate) fn into_items(self) -> Vec<T> {
        match self {
            ListResponse::Plain(items) | ListResponse::Paged { results: items } => items,
        }
    }
}
