use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use super::client::ApiClient;
use super::traits::TradingApi;
use crate::errors::CoreError;
use crate::models::instance::Instance;
use crate::models::operation::Operation;
use crate::models::settings::Settings;

/// `TradingApi` over the dashboard's REST backend.
///
/// Endpoints (relative to the API prefix):
/// - `GET /operations`, `GET /instances`
/// - `POST /instances/{id}/start`, `POST /instances/{id}/stop`
/// - `DELETE /instances/{id}`
pub struct RestTradingApi {
    client: ApiClient,
}

impl RestTradingApi {
    pub fn new(settings: Settings) -> Result<Self, CoreError> {
        Ok(Self {
            client: ApiClient::new(settings)?,
        })
    }

    pub fn from_client(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl TradingApi for RestTradingApi {
    fn name(&self) -> &str {
        "REST"
    }

    async fn fetch_operations(&self) -> Result<Vec<Operation>, CoreError> {
        let rows: Vec<Value> = self.client.get_json("/operations").await?;
        Ok(decode_operations(rows))
    }

    async fn fetch_instances(&self) -> Result<Vec<Instance>, CoreError> {
        self.client.get_json("/instances").await
    }

    async fn start_instance(&self, instance_id: i64) -> Result<(), CoreError> {
        self.client
            .post_empty(&format!("/instances/{instance_id}/start"))
            .await?;
        info!(instance_id, "instance started");
        Ok(())
    }

    async fn stop_instance(&self, instance_id: i64) -> Result<(), CoreError> {
        self.client
            .post_empty(&format!("/instances/{instance_id}/stop"))
            .await?;
        info!(instance_id, "instance stopped");
        Ok(())
    }

    async fn delete_instance(&self, instance_id: i64) -> Result<(), CoreError> {
        self.client
            .delete(&format!("/instances/{instance_id}"))
            .await?;
        info!(instance_id, "instance deleted");
        Ok(())
    }
}

/// Decode operation rows one by one. A row that still cannot be read
/// (unknown side, missing symbol) is dropped with a warning so the rest of
/// the payload survives.
pub fn decode_operations(rows: Vec<Value>) -> Vec<Operation> {
    let total = rows.len();
    let operations: Vec<Operation> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(op) => Some(op),
            Err(e) => {
                warn!(index, error = %e, "dropping unreadable operation row");
                None
            }
        })
        .collect();

    if operations.len() < total {
        warn!(kept = operations.len(), total, "some operation rows were unreadable");
    }
    operations
}
