use async_trait::async_trait;
use serde_json::Value;

use super::models::{CollectionPage, PageRequest};
use crate::error::RemoteError;

/// The remote workspace API, as consumed by the resolution and write paths.
///
/// Implementations perform exactly one remote request per call: no internal
/// retrying or rate limiting, which belong to the shared dispatcher.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    fn name(&self) -> &str;

    async fn list_people(&self, req: PageRequest) -> Result<CollectionPage, RemoteError>;

    async fn query_records(
        &self,
        database_id: &str,
        req: PageRequest,
    ) -> Result<CollectionPage, RemoteError>;

    async fn create_record(&self, payload: Value) -> Result<Value, RemoteError>;
}
