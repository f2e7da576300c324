use super::{deleted, found, ApiClient};
use crate::api::models;
use crate::error::Result;

pub async fn list_machines(client: &ApiClient) -> Result<Vec<models::Machine>> {
    Ok(client
        .get("cafeteras")
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<models::Machine>>()
        .await?)
}

pub async fn get_machine(client: &ApiClient, id: &str) -> Result<models::Machine> {
    let res = client.get(&format!("cafeteras/{id}")).send().await?;
    found(res, format!("machine {id}")).await
}

pub async fn create_machine(
    client: &ApiClient,
    machine: &models::NewMachine,
) -> Result<models::Machine> {
    Ok(client
        .post("cafeteras")
        .json(machine)
        .send()
        .await?
        .error_for_status()?
        .json::<models::Machine>()
        .await?)
}

pub async fn update_machine(
    client: &ApiClient,
    id: &str,
    machine: &models::NewMachine,
) -> Result<models::Machine> {
    let res = client
        .put(&format!("cafeteras/{id}"))
        .json(machine)
        .send()
        .await?;
    found(res, format!("machine {id}")).await
}

pub async fn delete_machine(client: &ApiClient, id: &str) -> Result<()> {
    let res = client.delete(&format!("cafeteras/{id}")).send().await?;
    deleted(res, format!("machine {id}"))
}
