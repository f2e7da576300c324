use super::BrewStore;
use crate::api::models::{
    Beverage, BrewStatus, HistoryRecord, Machine, NewBeverage, NewBrewStatus, NewHistoryRecord,
    NewMachine,
};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Tables {
    next_id: u64,
    machines: Vec<Machine>,
    statuses: Vec<BrewStatus>,
    beverages: Vec<Beverage>,
    history: Vec<HistoryRecord>,
}

impl Tables {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }
}

/// Record store kept in process memory. Backs the development server and
/// the session tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn machines(&self) -> Vec<Machine> {
        self.tables().machines.clone()
    }

    pub fn machine(&self, id: &str) -> Option<Machine> {
        self.tables().machines.iter().find(|m| m.id == id).cloned()
    }

    pub fn insert_machine(&self, machine: NewMachine) -> Machine {
        let mut tables = self.tables();
        let machine = Machine {
            id: tables.next_id(),
            name: machine.name,
            location: machine.location,
            ip_address: machine.ip_address,
            created_at: Some(Utc::now()),
        };
        tables.machines.push(machine.clone());
        machine
    }

    pub fn update_machine(&self, id: &str, update: NewMachine) -> Option<Machine> {
        let mut tables = self.tables();
        let machine = tables.machines.iter_mut().find(|m| m.id == id)?;
        machine.name = update.name;
        machine.location = update.location;
        machine.ip_address = update.ip_address;
        Some(machine.clone())
    }

    pub fn remove_machine(&self, id: &str) -> Option<Machine> {
        let mut tables = self.tables();
        let index = tables.machines.iter().position(|m| m.id == id)?;
        Some(tables.machines.remove(index))
    }

    pub fn statuses(&self, machine_id: Option<&str>) -> Vec<BrewStatus> {
        self.tables()
            .statuses
            .iter()
            .filter(|s| machine_id.map_or(true, |id| s.machine_id == id))
            .cloned()
            .collect()
    }

    pub fn status(&self, id: &str) -> Option<BrewStatus> {
        self.tables().statuses.iter().find(|s| s.id == id).cloned()
    }

    pub fn insert_status(&self, status: NewBrewStatus) -> BrewStatus {
        let mut tables = self.tables();
        let id = tables.next_id();
        let status = status.into_status(id, Utc::now());
        tables.statuses.push(status.clone());
        status
    }

    /// Swaps the whole record stored under `id`; the path id wins over the
    /// body's.
    pub fn put_status(&self, id: &str, mut status: BrewStatus) -> Option<BrewStatus> {
        let mut tables = self.tables();
        let slot = tables.statuses.iter_mut().find(|s| s.id == id)?;
        status.id = id.to_string();
        *slot = status;
        Some(slot.clone())
    }

    pub fn remove_status(&self, id: &str) -> Option<BrewStatus> {
        let mut tables = self.tables();
        let index = tables.statuses.iter().position(|s| s.id == id)?;
        Some(tables.statuses.remove(index))
    }

    pub fn beverages(&self, name: Option<&str>) -> Vec<Beverage> {
        self.tables()
            .beverages
            .iter()
            .filter(|b| name.map_or(true, |name| b.name == name))
            .cloned()
            .collect()
    }

    pub fn beverage_by_id(&self, id: &str) -> Option<Beverage> {
        self.tables().beverages.iter().find(|b| b.id == id).cloned()
    }

    pub fn insert_beverage(&self, beverage: NewBeverage) -> Beverage {
        let mut tables = self.tables();
        let beverage = Beverage {
            id: tables.next_id(),
            name: beverage.name,
            coffee_percent: beverage.coffee_percent,
            milk_percent: beverage.milk_percent,
        };
        tables.beverages.push(beverage.clone());
        beverage
    }

    pub fn remove_beverage(&self, id: &str) -> Option<Beverage> {
        let mut tables = self.tables();
        let index = tables.beverages.iter().position(|b| b.id == id)?;
        Some(tables.beverages.remove(index))
    }

    pub fn history(&self) -> Vec<HistoryRecord> {
        self.tables().history.clone()
    }

    pub fn insert_history(&self, record: NewHistoryRecord) -> HistoryRecord {
        let mut tables = self.tables();
        let record = HistoryRecord {
            id: tables.next_id(),
            machine_id: record.machine_id,
            ip_address: record.ip_address,
            location: record.location,
            beverage: record.beverage,
            temperature: record.temperature,
            cup_size: record.cup_size,
            created_at: Some(Utc::now()),
        };
        tables.history.push(record.clone());
        record
    }
}

#[async_trait]
impl BrewStore for MemoryStore {
    async fn machine(&self, id: &str) -> Result<Machine> {
        MemoryStore::machine(self, id).ok_or_else(|| Error::NotFound(format!("machine {id}")))
    }

    async fn status_for(&self, machine_id: &str) -> Result<Option<BrewStatus>> {
        Ok(self.statuses(Some(machine_id)).into_iter().next())
    }

    async fn replace_status(&self, status: &BrewStatus) -> Result<BrewStatus> {
        self.put_status(&status.id, status.clone())
            .ok_or_else(|| Error::NotFound(format!("brew status {}", status.id)))
    }

    async fn beverage(&self, name: &str) -> Result<Option<Beverage>> {
        Ok(self.beverages(Some(name)).into_iter().next())
    }

    async fn record_history(&self, record: &NewHistoryRecord) -> Result<HistoryRecord> {
        Ok(self.insert_history(record.clone()))
    }
}
