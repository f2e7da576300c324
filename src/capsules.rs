use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One capsule placed in a machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capsule {
    #[serde(rename = "cafeteraId")]
    pub machine_id: String,
    /// Label of the machine when the capsule was added.
    #[serde(rename = "ubicacion")]
    pub location: String,
    #[serde(rename = "tipo")]
    pub beverage: String,
}

/// Capsule stock kept in a local JSON file, never shared with the store.
#[derive(Debug, Clone)]
pub struct CapsuleInventory {
    path: PathBuf,
}

impl CapsuleInventory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CapsuleInventory { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or empty file is an empty inventory.
    pub fn list(&self) -> Result<Vec<Capsule>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn add(&self, capsule: Capsule) -> Result<Vec<Capsule>> {
        if capsule.machine_id.trim().is_empty() || capsule.beverage.trim().is_empty() {
            return Err(Error::validation(
                "a machine and a beverage type must both be selected",
            ));
        }
        let mut capsules = self.list()?;
        capsules.push(capsule);
        self.save(&capsules)?;
        Ok(capsules)
    }

    /// Drops every capsule held by `machine_id`, returning how many went.
    pub fn remove_machine(&self, machine_id: &str) -> Result<usize> {
        let capsules = self.list()?;
        let before = capsules.len();
        let kept: Vec<Capsule> = capsules
            .into_iter()
            .filter(|c| c.machine_id != machine_id)
            .collect();
        let removed = before - kept.len();
        if removed > 0 {
            self.save(&kept)?;
        }
        debug!("Removed {} capsules of machine {}", removed, machine_id);
        Ok(removed)
    }

    fn save(&self, capsules: &[Capsule]) -> Result<()> {
        fs::write(&self.path, serde_json::to_string_pretty(capsules)?)?;
        Ok(())
    }
}
