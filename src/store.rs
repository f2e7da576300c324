use crate::api::models::{Beverage, BrewStatus, HistoryRecord, Machine, NewHistoryRecord};
use crate::api::{beverages, history, machines, status, ApiClient};
use crate::error::Result;
use async_trait::async_trait;

pub mod memory;

/// The records a monitoring session reads and writes.
#[async_trait]
pub trait BrewStore: Send + Sync {
    async fn machine(&self, id: &str) -> Result<Machine>;

    /// First status filed under `machine_id`, if any.
    async fn status_for(&self, machine_id: &str) -> Result<Option<BrewStatus>>;

    /// Full-record replace, returning what the store kept.
    async fn replace_status(&self, status: &BrewStatus) -> Result<BrewStatus>;

    async fn beverage(&self, name: &str) -> Result<Option<Beverage>>;

    async fn record_history(&self, record: &NewHistoryRecord) -> Result<HistoryRecord>;
}

#[async_trait]
impl BrewStore for ApiClient {
    async fn machine(&self, id: &str) -> Result<Machine> {
        machines::get_machine(self, id).await
    }

    async fn status_for(&self, machine_id: &str) -> Result<Option<BrewStatus>> {
        status::find_status(self, machine_id).await
    }

    async fn replace_status(&self, brew_status: &BrewStatus) -> Result<BrewStatus> {
        status::replace_status(self, brew_status).await
    }

    async fn beverage(&self, name: &str) -> Result<Option<Beverage>> {
        beverages::find_beverage(self, name).await
    }

    async fn record_history(&self, record: &NewHistoryRecord) -> Result<HistoryRecord> {
        history::record_brew(self, record).await
    }
}
