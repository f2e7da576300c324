use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "ubicacion")]
    pub location: String,
    pub ip_address: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMachine {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "ubicacion")]
    pub location: String,
    pub ip_address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CupSize {
    #[serde(rename = "ESTANDAR")]
    Standard,
    #[serde(rename = "GRANDE")]
    Large,
}

impl CupSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            CupSize::Standard => "ESTANDAR",
            CupSize::Large => "GRANDE",
        }
    }
}

impl fmt::Display for CupSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Temperature {
    #[serde(rename = "caliente")]
    Hot,
    #[serde(rename = "frio")]
    Cold,
}

impl Temperature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Temperature::Hot => "caliente",
            Temperature::Cold => "frio",
        }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase of a simulated brew cycle, in the order a cycle walks through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BrewStage {
    #[serde(rename = "inactivo")]
    Inactive,
    #[serde(rename = "calentando_cafe")]
    HeatingCoffee,
    #[serde(rename = "dispensando_cafe")]
    DispensingCoffee,
    #[serde(rename = "esperando_leche")]
    AwaitingMilk,
    #[serde(rename = "calentando_leche")]
    HeatingMilk,
    #[serde(rename = "dispensando_leche")]
    DispensingMilk,
    #[serde(rename = "finalizado")]
    Finished,
}

impl BrewStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrewStage::Inactive => "inactivo",
            BrewStage::HeatingCoffee => "calentando_cafe",
            BrewStage::DispensingCoffee => "dispensando_cafe",
            BrewStage::AwaitingMilk => "esperando_leche",
            BrewStage::HeatingMilk => "calentando_leche",
            BrewStage::DispensingMilk => "dispensando_leche",
            BrewStage::Finished => "finalizado",
        }
    }

    pub fn is_heating(&self) -> bool {
        matches!(self, BrewStage::HeatingCoffee | BrewStage::HeatingMilk)
    }

    pub fn is_dispensing(&self) -> bool {
        matches!(self, BrewStage::DispensingCoffee | BrewStage::DispensingMilk)
    }

    pub fn is_milk_phase(&self) -> bool {
        matches!(
            self,
            BrewStage::AwaitingMilk | BrewStage::HeatingMilk | BrewStage::DispensingMilk
        )
    }
}

impl fmt::Display for BrewStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrewStatus {
    pub id: String,
    #[serde(rename = "cafeteraId")]
    pub machine_id: String,
    pub power_status: bool,
    #[serde(rename = "tamano_taza")]
    pub cup_size: CupSize,
    #[serde(rename = "tipo_bebida")]
    pub beverage: String,
    #[serde(rename = "temperatura_setting")]
    pub temperature: Temperature,
    #[serde(rename = "brewing_status")]
    pub stage: BrewStage,
    #[serde(rename = "brewing_progreso")]
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBrewStatus {
    #[serde(rename = "cafeteraId")]
    pub machine_id: String,
    pub power_status: bool,
    #[serde(rename = "tamano_taza")]
    pub cup_size: CupSize,
    #[serde(rename = "tipo_bebida")]
    pub beverage: String,
    #[serde(rename = "temperatura_setting")]
    pub temperature: Temperature,
    #[serde(rename = "brewing_status")]
    pub stage: BrewStage,
    #[serde(rename = "brewing_progreso")]
    pub progress: u8,
}

impl NewBrewStatus {
    /// Status a freshly registered machine starts with.
    pub fn initial(machine_id: &str) -> Self {
        NewBrewStatus {
            machine_id: machine_id.to_string(),
            power_status: false,
            cup_size: CupSize::Standard,
            beverage: String::from("ESPRESSO"),
            temperature: Temperature::Hot,
            stage: BrewStage::Inactive,
            progress: 0,
        }
    }

    pub fn into_status(self, id: String, last_updated: DateTime<Utc>) -> BrewStatus {
        BrewStatus {
            id,
            machine_id: self.machine_id,
            power_status: self.power_status,
            cup_size: self.cup_size,
            beverage: self.beverage,
            temperature: self.temperature,
            stage: self.stage,
            progress: self.progress,
            last_updated: Some(last_updated),
        }
    }
}

/// Partial change to a [`BrewStatus`]. Never sent on its own: it is merged
/// over the last fetched record and the whole result is written back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusPatch {
    pub power_status: Option<bool>,
    pub cup_size: Option<CupSize>,
    pub beverage: Option<String>,
    pub temperature: Option<Temperature>,
    pub stage: Option<BrewStage>,
    pub progress: Option<u8>,
}

impl StatusPatch {
    pub fn stage(stage: BrewStage) -> Self {
        StatusPatch {
            stage: Some(stage),
            ..Default::default()
        }
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress.min(100));
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == StatusPatch::default()
    }

    pub fn apply(&self, base: &BrewStatus) -> BrewStatus {
        BrewStatus {
            id: base.id.clone(),
            machine_id: base.machine_id.clone(),
            power_status: self.power_status.unwrap_or(base.power_status),
            cup_size: self.cup_size.unwrap_or(base.cup_size),
            beverage: self
                .beverage
                .clone()
                .unwrap_or_else(|| base.beverage.clone()),
            temperature: self.temperature.unwrap_or(base.temperature),
            stage: self.stage.unwrap_or(base.stage),
            progress: self.progress.unwrap_or(base.progress),
            last_updated: base.last_updated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beverage {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "porcentaje_cafe")]
    pub coffee_percent: u8,
    #[serde(rename = "porcentaje_leche")]
    pub milk_percent: u8,
}

impl Beverage {
    pub fn recipe(&self) -> Recipe {
        Recipe {
            coffee: self.coffee_percent,
            milk: self.milk_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBeverage {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "porcentaje_cafe")]
    pub coffee_percent: u8,
    #[serde(rename = "porcentaje_leche")]
    pub milk_percent: u8,
}

/// Coffee/milk composition of a beverage, in percent of the cup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recipe {
    pub coffee: u8,
    pub milk: u8,
}

impl Recipe {
    pub const PURE_COFFEE: Recipe = Recipe {
        coffee: 100,
        milk: 0,
    };

    pub fn requires_milk(&self) -> bool {
        self.milk > 0
    }

    /// Progress at which the coffee-only part of the brew is complete.
    pub fn coffee_checkpoint(&self) -> u8 {
        if self.requires_milk() {
            self.coffee.min(100)
        } else {
            100
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    #[serde(rename = "cafeteraId")]
    pub machine_id: String,
    pub ip_address: String,
    #[serde(rename = "ubicacion")]
    pub location: String,
    #[serde(rename = "tipo_bebida")]
    pub beverage: String,
    #[serde(rename = "temperatura_setting")]
    pub temperature: Temperature,
    #[serde(rename = "tamano_taza")]
    pub cup_size: CupSize,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHistoryRecord {
    #[serde(rename = "cafeteraId")]
    pub machine_id: String,
    pub ip_address: String,
    #[serde(rename = "ubicacion")]
    pub location: String,
    #[serde(rename = "tipo_bebida")]
    pub beverage: String,
    #[serde(rename = "temperatura_setting")]
    pub temperature: Temperature,
    #[serde(rename = "tamano_taza")]
    pub cup_size: CupSize,
}

impl NewHistoryRecord {
    /// Snapshot of a completed brew on `machine`.
    pub fn completed(machine: &Machine, status: &BrewStatus) -> Self {
        NewHistoryRecord {
            machine_id: machine.id.clone(),
            ip_address: machine.ip_address.clone(),
            location: machine.location.clone(),
            beverage: status.beverage.clone(),
            temperature: status.temperature,
            cup_size: status.cup_size,
        }
    }
}
