use crate::api::models::{BrewStage, BrewStatus, Temperature};
use chrono::Local;
use serde::Serialize;
use std::fmt;

const COFFEE_COLOR: &str = "#654321";
const BLENDED_COLOR: &str = "#a05a2c";
const MILK_COLOR: &str = "#D2B48C";
const BASE_COLOR: &str = "#3a2411";

/// Beverages drawn with the milk-blended palette.
const BLENDED_BEVERAGES: [&str; 3] = ["LATTE", "CAPUCCINO", "CORTADO"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    Secondary,
    Warning,
    Info,
    Success,
    Light,
    Danger,
}

impl Badge {
    pub fn for_stage(stage: BrewStage) -> Self {
        if stage.is_heating() {
            Badge::Warning
        } else if stage.is_dispensing() {
            Badge::Info
        } else {
            match stage {
                BrewStage::Finished => Badge::Success,
                BrewStage::AwaitingMilk => Badge::Light,
                _ => Badge::Secondary,
            }
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Badge::Secondary => "badge bg-secondary",
            Badge::Warning => "badge bg-warning text-dark",
            Badge::Info => "badge bg-info text-dark",
            Badge::Success => "badge bg-success",
            Badge::Light => "badge bg-light text-dark border border-secondary",
            Badge::Danger => "badge bg-danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CupView {
    pub fill_percent: u8,
    pub liquid_color: &'static str,
    pub gradient: String,
    pub steam: bool,
    pub waves: bool,
}

/// Everything the monitoring view shows for one status record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub label: String,
    pub badge: Badge,
    pub progress: u8,
    pub progress_label: String,
    pub beverage_details: Option<String>,
    pub last_updated: Option<String>,
    pub cup: Option<CupView>,
}

pub fn render(status: &BrewStatus) -> StatusView {
    let progress = status.progress.min(100);
    StatusView {
        label: stage_label(status.stage),
        badge: Badge::for_stage(status.stage),
        progress,
        progress_label: format!("{progress}%"),
        beverage_details: Some(format!(
            "Preparando: {} {}",
            status.beverage, status.cup_size
        )),
        last_updated: status
            .last_updated
            .map(|at| at.with_timezone(&Local).format("%H:%M:%S").to_string()),
        cup: Some(render_cup(status)),
    }
}

/// Terminal state shown once monitoring has failed.
pub fn render_error() -> StatusView {
    StatusView {
        label: String::from("ERROR"),
        badge: Badge::Danger,
        progress: 0,
        progress_label: String::from("0%"),
        beverage_details: None,
        last_updated: None,
        cup: None,
    }
}

fn stage_label(stage: BrewStage) -> String {
    stage.as_str().replacen('_', " ", 1).to_uppercase()
}

fn render_cup(status: &BrewStatus) -> CupView {
    let liquid_color = if status.stage.is_milk_phase() {
        MILK_COLOR
    } else if BLENDED_BEVERAGES.contains(&status.beverage.as_str()) {
        BLENDED_COLOR
    } else {
        COFFEE_COLOR
    };
    let brewing = status.stage.is_heating() || status.stage.is_dispensing();

    CupView {
        fill_percent: status.progress.min(100),
        liquid_color,
        gradient: format!("linear-gradient(145deg, {liquid_color} 0%, {BASE_COLOR} 100%)"),
        steam: brewing && status.temperature == Temperature::Hot,
        waves: brewing,
    }
}

impl fmt::Display for StatusView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let filled = usize::from(self.progress / 5);
        write!(
            f,
            "[{:<17}] [{}{}] {:>4}",
            self.label,
            "#".repeat(filled),
            ".".repeat(20 - filled),
            self.progress_label
        )?;
        if let Some(details) = &self.beverage_details {
            write!(f, "  {details}")?;
        }
        if let Some(at) = &self.last_updated {
            write!(f, "  ({at})")?;
        }
        if let Some(cup) = &self.cup {
            if cup.steam {
                f.write_str("  ~steam~")?;
            } else if cup.waves {
                f.write_str("  ~")?;
            }
        }
        Ok(())
    }
}
