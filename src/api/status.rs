use super::{deleted, found, ApiClient};
use crate::api::models;
use crate::error::Result;

pub async fn list_statuses(client: &ApiClient) -> Result<Vec<models::BrewStatus>> {
    Ok(client
        .get("cafetera_status")
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<models::BrewStatus>>()
        .await?)
}

/// The status of a machine is the first record filed under its id.
pub async fn find_status(
    client: &ApiClient,
    machine_id: &str,
) -> Result<Option<models::BrewStatus>> {
    let statuses = client
        .get("cafetera_status")
        .query(&[("cafeteraId", machine_id)])
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<models::BrewStatus>>()
        .await?;
    Ok(statuses.into_iter().next())
}

pub async fn create_status(
    client: &ApiClient,
    status: &models::NewBrewStatus,
) -> Result<models::BrewStatus> {
    Ok(client
        .post("cafetera_status")
        .json(status)
        .send()
        .await?
        .error_for_status()?
        .json::<models::BrewStatus>()
        .await?)
}

/// Overwrites the whole record; the store never sees a partial update.
pub async fn replace_status(
    client: &ApiClient,
    status: &models::BrewStatus,
) -> Result<models::BrewStatus> {
    let res = client
        .put(&format!("cafetera_status/{}", status.id))
        .json(status)
        .send()
        .await?;
    found(res, format!("brew status {}", status.id)).await
}

pub async fn delete_status(client: &ApiClient, id: &str) -> Result<()> {
    let res = client
        .delete(&format!("cafetera_status/{id}"))
        .send()
        .await?;
    deleted(res, format!("brew status {id}"))
}
