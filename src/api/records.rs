//! Medical record endpoints

use super::types::{ListResponse, MedicalRecord, NewMedicalRecord};
use super::{item_path, to_body};
use crate::error::Result;
use crate::http::{ApiRequest, AuthenticatedClient};
use crate::types::{JsonValue, ResourceId};

const RECORDS_PATH: &str = "/medical-records/";

/// Medical record CRUD
#[derive(Debug, Clone, Copy)]
pub struct RecordsApi<'a> {
    client: &'a AuthenticatedClient,
}

impl<'a> RecordsApi<'a> {
    pub(crate) fn new(client: &'a AuthenticatedClient) -> Self {
        Self { client }
    }

    /// Records visible to the signed-in user, optionally for one patient
    pub async fn list(&self, patient: Option<ResourceId>) -> Result<Vec<MedicalRecord>> {
        let mut request = ApiRequest::get(RECORDS_PATH);
        if let Some(patient) = patient {
            request = request.query("patient", patient.to_string());
        }
        let list: ListResponse<MedicalRecord> = self.client.send_json(request).await?;
        Ok(list.into_items())
    }

    /// Fetch one record
    pub async fn get(&self, id: ResourceId) -> Result<MedicalRecord> {
        self.client
            .send_json(ApiRequest::get(item_path(RECORDS_PATH, id)))
            .await
    }

    /// Create a record
    pub async fn create(&self, record: &NewMedicalRecord) -> Result<MedicalRecord> {
        self.client
            .send_json(ApiRequest::post(RECORDS_PATH).json(to_body(record)?))
            .await
    }

    /// Partially update a record
    pub async fn update(&self, id: ResourceId, changes: JsonValue) -> Result<MedicalRecord> {
        self.client
            .send_json(ApiRequest::patch(item_path(RECORDS_PATH, id)).json(changes))
            .await
    }

    /// Delete a record
    pub async fn delete(&self, id: ResourceId) -> Result<()> {
        self.client
            .send_ok(ApiRequest::delete(item_path(RECORDS_PATH, id)))
            .await
    }
}
