use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::instance::Instance;
use crate::models::operation::Operation;

/// The backend as seen by the dashboard.
///
/// `RestTradingApi` talks to the real REST service; tests and offline
/// tools provide their own implementation.
#[async_trait]
pub trait TradingApi: Send + Sync {
    /// Human-readable name of this backend (for logs/errors).
    fn name(&self) -> &str;

    /// All trade fills of the current user.
    async fn fetch_operations(&self) -> Result<Vec<Operation>, CoreError>;

    /// All strategy instances of the current user.
    async fn fetch_instances(&self) -> Result<Vec<Instance>, CoreError>;

    async fn start_instance(&self, instance_id: i64) -> Result<(), CoreError>;

    async fn stop_instance(&self, instance_id: i64) -> Result<(), CoreError>;

    async fn delete_instance(&self, instance_id: i64) -> Result<(), CoreError>;
}
