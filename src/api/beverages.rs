use super::{deleted, found, ApiClient};
use crate::api::models;
use crate::error::Result;

pub async fn list_beverages(client: &ApiClient) -> Result<Vec<models::Beverage>> {
    Ok(client
        .get("bebidas")
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<models::Beverage>>()
        .await?)
}

pub async fn find_beverage(client: &ApiClient, name: &str) -> Result<Option<models::Beverage>> {
    let beverages = client
        .get("bebidas")
        .query(&[("nombre", name)])
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<models::Beverage>>()
        .await?;
    Ok(beverages.into_iter().next())
}

pub async fn get_beverage(client: &ApiClient, id: &str) -> Result<models::Beverage> {
    let res = client.get(&format!("bebidas/{id}")).send().await?;
    found(res, format!("beverage {id}")).await
}

pub async fn create_beverage(
    client: &ApiClient,
    beverage: &models::NewBeverage,
) -> Result<models::Beverage> {
    Ok(client
        .post("bebidas")
        .json(beverage)
        .send()
        .await?
        .error_for_status()?
        .json::<models::Beverage>()
        .await?)
}

pub async fn delete_beverage(client: &ApiClient, id: &str) -> Result<()> {
    let res = client.delete(&format!("bebidas/{id}")).send().await?;
    deleted(res, format!("beverage {id}"))
}
