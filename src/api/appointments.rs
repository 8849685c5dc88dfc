//! Appointment endpoints

use super::types::{Appointment, AppointmentStatus, ListResponse, NewAppointment, Reschedule};
use super::{item_path, to_body};
use crate::error::Result;
use crate::http::{ApiRequest, AuthenticatedClient};
use crate::types::{JsonValue, ResourceId};

const APPOINTMENTS_PATH: &str = "/appointments/";

/// Appointment booking and management
#[derive(Debug, Clone, Copy)]
pub struct AppointmentsApi<'a> {
    client: &'a AuthenticatedClient,
}

impl<'a> AppointmentsApi<'a> {
    pub(crate) fn new(client: &'a AuthenticatedClient) -> Self {
        Self { client }
    }

    /// Appointments visible to the signed-in user
    pub async fn list(&self) -> Result<Vec<Appointment>> {
        let list: ListResponse<Appointment> = self
            .client
            .send_json(ApiRequest::get(APPOINTMENTS_PATH))
            .await?;
        Ok(list.into_items())
    }

    /// Appointments with the given status
    pub async fn list_by_status(&self, status: AppointmentStatus) -> Result<Vec<Appointment>> {
        let status = serde_json::to_value(status)?;
        let status = status.as_str().unwrap_or_default().to_string();
        let list: ListResponse<Appointment> = self
            .client
            .send_json(ApiRequest::get(APPOINTMENTS_PATH).query("status", status))
            .await?;
        Ok(list.into_items())
    }

    /// Fetch one appointment
    pub async fn get(&self, id: ResourceId) -> Result<Appointment> {
        self.client
            .send_json(ApiRequest::get(item_path(APPOINTMENTS_PATH, id)))
            .await
    }

    /// Book an appointment
    pub async fn create(&self, appointment: &NewAppointment) -> Result<Appointment> {
        self.client
            .send_json(ApiRequest::post(APPOINTMENTS_PATH).json(to_body(appointment)?))
            .await
    }

    /// Partially update an appointment
    pub async fn update(&self, id: ResourceId, changes: JsonValue) -> Result<Appointment> {
        self.client
            .send_json(ApiRequest::patch(item_path(APPOINTMENTS_PATH, id)).json(changes))
            .await
    }

    /// Cancel an appointment
    pub async fn cancel(&self, id: ResourceId) -> Result<Appointment> {
        let path = format!("{}cancel/", item_path(APPOINTMENTS_PATH, id));
        self.client.send_json(ApiRequest::post(path)).await
    }

    /// Move an appointment to a new date and time
    pub async fn reschedule(&self, id: ResourceId, slot: Reschedule) -> Result<Appointment> {
        let path = format!("{}reschedule/", item_path(APPOINTMENTS_PATH, id));
        self.client
            .send_json(ApiRequest::post(path).json(to_body(&slot)?))
            .await
    }
}
