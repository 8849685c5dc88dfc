//! Patient endpoints (doctor-scoped on the backend)

use super::types::{ListResponse, NewPatient, Patient};
use super::{item_path, to_body};
use crate::error::Result;
use crate::http::{ApiRequest, AuthenticatedClient};
use crate::types::{JsonValue, ResourceId};

const PATIENTS_PATH: &str = "/patients/";

/// Patient CRUD
#[derive(Debug, Clone, Copy)]
pub struct PatientsApi<'a> {
    client: &'a AuthenticatedClient,
}

impl<'a> PatientsApi<'a> {
    pub(crate) fn new(client: &'a AuthenticatedClient) -> Self {
        Self { client }
    }

    /// Patients, optionally filtered by a free-text search
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Patient>> {
        let mut request = ApiRequest::get(PATIENTS_PATH);
        if let Some(search) = search.filter(|s| !s.is_empty()) {
            request = request.query("search", search);
        }
        let list: ListResponse<Patient> = self.client.send_json(request).await?;
        Ok(list.into_items())
    }

    /// Fetch one patient
    pub async fn get(&self, id: ResourceId) -> Result<Patient> {
        self.client
            .send_json(ApiRequest::get(item_path(PATIENTS_PATH, id)))
            .await
    }

    /// Register a patient
    pub async fn create(&self, patient: &NewPatient) -> Result<Patient> {
        self.client
            .send_json(ApiRequest::post(PATIENTS_PATH).json(to_body(patient)?))
            .await
    }

    /// Partially update a patient
    pub async fn update(&self, id: ResourceId, changes: JsonValue) -> Result<Patient> {
        self.client
            .send_json(ApiRequest::patch(item_path(PATIENTS_PATH, id)).json(changes))
            .await
    }

    /// Delete a patient
    pub async fn delete(&self, id: ResourceId) -> Result<()> {
        self.client
            .send_ok(ApiRequest::delete(item_path(PATIENTS_PATH, id)))
            .await
    }
}
