use crate::api::models::{
    Beverage, BrewStage, BrewStatus, Machine, NewBeverage, NewBrewStatus, NewMachine, StatusPatch,
};
use crate::api::{beverages, machines, status, ApiClient};
use crate::capsules::CapsuleInventory;
use crate::error::{Error, Result};
use chrono::Utc;
use futures::stream::FuturesOrdered;
use futures::StreamExt;
use itertools::Itertools;
use log::{debug, info, warn};

/// Catalog a fresh development store can be seeded with: name, coffee %, milk %.
pub const HOUSE_RECIPES: [(&str, u8, u8); 4] = [
    ("ESPRESSO", 100, 0),
    ("LATTE", 30, 70),
    ("CAPUCCINO", 40, 60),
    ("CORTADO", 50, 50),
];

/// Builds a catalog entry, rejecting it before anything is submitted when
/// the name is blank or the shares add up to more than the whole cup.
pub fn new_beverage(name: &str, coffee_percent: u8, milk_percent: u8) -> Result<NewBeverage> {
    let name = name.trim().to_uppercase();
    if name.is_empty() {
        return Err(Error::validation("a beverage needs a name"));
    }
    if u16::from(coffee_percent) + u16::from(milk_percent) > 100 {
        return Err(Error::validation(format!(
            "coffee ({coffee_percent}%) and milk ({milk_percent}%) cannot add up to more than 100%"
        )));
    }
    Ok(NewBeverage {
        name,
        coffee_percent,
        milk_percent,
    })
}

pub fn new_machine(name: &str, location: &str, ip_address: &str) -> Result<NewMachine> {
    let missing: Vec<&str> = [("name", name), ("location", location), ("ip_address", ip_address)]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| *field)
        .collect();
    if !missing.is_empty() {
        return Err(Error::validation(format!(
            "The following required parameters were not provided: {}",
            missing.iter().join(", ")
        )));
    }
    Ok(NewMachine {
        name: name.trim().to_string(),
        location: location.trim().to_string(),
        ip_address: ip_address.trim().to_string(),
    })
}

/// Registers a machine along with the idle status every machine starts in.
pub async fn create_machine(
    client: &ApiClient,
    machine: &NewMachine,
) -> Result<(Machine, BrewStatus)> {
    let machine = machines::create_machine(client, machine).await?;
    let initial = status::create_status(client, &NewBrewStatus::initial(&machine.id)).await?;
    info!("Registered machine {} ({})", machine.name, machine.id);
    Ok((machine, initial))
}

/// Replaces a machine's name, location and address after validating them.
pub async fn edit_machine(
    client: &ApiClient,
    id: &str,
    name: &str,
    location: &str,
    ip_address: &str,
) -> Result<Machine> {
    let update = new_machine(name, location, ip_address)?;
    let machine = machines::update_machine(client, id, &update).await?;
    info!("Updated machine {} ({})", machine.name, machine.id);
    Ok(machine)
}

/// Removes a machine, its status record and its capsules. The store does not
/// cascade on its own.
pub async fn delete_machine(
    client: &ApiClient,
    capsules: &CapsuleInventory,
    id: &str,
) -> Result<()> {
    let removed = capsules.remove_machine(id)?;
    if let Some(existing) = status::find_status(client, id).await? {
        status::delete_status(client, &existing.id).await?;
    }
    machines::delete_machine(client, id).await?;
    info!("Deleted machine {} and {} of its capsules", id, removed);
    Ok(())
}

pub async fn add_beverage(
    client: &ApiClient,
    name: &str,
    coffee_percent: u8,
    milk_percent: u8,
) -> Result<Beverage> {
    let beverage = new_beverage(name, coffee_percent, milk_percent)?;
    let created = beverages::create_beverage(client, &beverage).await?;
    info!(
        "Added beverage {} ({}% coffee / {}% milk)",
        created.name, created.coffee_percent, created.milk_percent
    );
    Ok(created)
}

/// Every machine with its status, fetched concurrently.
pub async fn fleet(client: &ApiClient) -> Result<Vec<(Machine, Option<BrewStatus>)>> {
    let machines = machines::list_machines(client).await?;
    let lookups: FuturesOrdered<_> = machines
        .iter()
        .map(|m| status::find_status(client, &m.id))
        .collect();
    let statuses: Vec<Result<Option<BrewStatus>>> = lookups.collect().await;

    Ok(machines
        .into_iter()
        .zip(statuses)
        .map(|(machine, status)| {
            let status = status.unwrap_or_else(|e| {
                warn!("Could not load the status of machine {}: {}", machine.id, e);
                None
            });
            (machine, status)
        })
        .collect())
}

async fn current_status(client: &ApiClient, machine_id: &str) -> Result<BrewStatus> {
    status::find_status(client, machine_id)
        .await?
        .ok_or_else(|| Error::StatusNotFound(machine_id.to_string()))
}

async fn write(client: &ApiClient, current: &BrewStatus, patch: &StatusPatch) -> Result<BrewStatus> {
    let mut next = patch.apply(current);
    next.last_updated = Some(Utc::now());
    status::replace_status(client, &next).await
}

/// Control panel change of power, cup size, beverage or temperature.
pub async fn update_settings(
    client: &ApiClient,
    machine_id: &str,
    patch: &StatusPatch,
) -> Result<BrewStatus> {
    let current = current_status(client, machine_id).await?;
    if patch.is_empty() {
        return Ok(current);
    }
    debug!("Updating settings of machine {}: {:?}", machine_id, patch);
    write(client, &current, patch).await
}

/// Applies `settings` and puts the machine into its first brewing stage.
pub async fn start_brew(
    client: &ApiClient,
    machine_id: &str,
    settings: &StatusPatch,
) -> Result<BrewStatus> {
    let current = current_status(client, machine_id).await?;
    let requested = settings.apply(&current);

    if !requested.power_status {
        return Err(Error::validation(format!(
            "machine {machine_id} is powered off"
        )));
    }
    if !matches!(requested.stage, BrewStage::Inactive | BrewStage::Finished) {
        return Err(Error::validation(format!(
            "machine {} is already brewing ({})",
            machine_id, requested.stage
        )));
    }
    if beverages::find_beverage(client, &requested.beverage)
        .await?
        .is_none()
    {
        warn!(
            "{} is not in the beverage catalog, it will brew as plain coffee",
            requested.beverage
        );
    }

    let mut patch = settings.clone();
    patch.stage = Some(BrewStage::HeatingCoffee);
    patch.progress = Some(0);
    let started = write(client, &current, &patch).await?;
    info!(
        "Started a {} {} on machine {}",
        started.cup_size, started.beverage, machine_id
    );
    Ok(started)
}
