use crate::api::models::{BrewStage, BrewStatus, Recipe, StatusPatch};
use crate::config::{DelayRange, Timings};

/// Progress shown as soon as coffee starts flowing.
pub const DISPENSE_START_PROGRESS: u8 = 15;

/// Timed part of the cycle a scheduled transition waits out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    HeatingCoffee,
    DispensingCoffee,
    HeatingMilk,
    DispensingMilk,
    Cooldown,
}

impl Phase {
    pub fn delay(&self, timings: &Timings) -> DelayRange {
        match self {
            Phase::HeatingCoffee => timings.heating_coffee,
            Phase::DispensingCoffee => timings.dispensing_coffee,
            Phase::HeatingMilk => timings.heating_milk,
            Phase::DispensingMilk => timings.dispensing_milk,
            Phase::Cooldown => timings.cooldown,
        }
    }
}

/// A write to issue once `phase` has elapsed. `from` is the stage the
/// machine must still be in for the write to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: BrewStage,
    pub phase: Phase,
    pub patch: StatusPatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Nothing to do until someone starts a brew.
    Idle,
    Advance(Transition),
    /// Milk capsule has to be inserted by hand before the brew goes on.
    AwaitMilk,
    /// Brew is done: record it, then reset the machine after the cooldown.
    Complete(Transition),
}

/// Stages whose next step depends on the beverage's recipe.
pub fn needs_recipe(stage: BrewStage) -> bool {
    matches!(stage, BrewStage::HeatingCoffee | BrewStage::DispensingCoffee)
}

pub fn plan(status: &BrewStatus, recipe: &Recipe) -> Plan {
    let from = status.stage;
    match from {
        BrewStage::Inactive => Plan::Idle,
        BrewStage::HeatingCoffee => {
            let progress = DISPENSE_START_PROGRESS
                .min(recipe.coffee_checkpoint())
                .max(status.progress);
            Plan::Advance(Transition {
                from,
                phase: Phase::HeatingCoffee,
                patch: StatusPatch::stage(BrewStage::DispensingCoffee).with_progress(progress),
            })
        }
        BrewStage::DispensingCoffee => {
            let patch = if recipe.requires_milk() {
                StatusPatch::stage(BrewStage::AwaitingMilk)
                    .with_progress(recipe.coffee_checkpoint().max(status.progress))
            } else {
                StatusPatch::stage(BrewStage::Finished).with_progress(100)
            };
            Plan::Advance(Transition {
                from,
                phase: Phase::DispensingCoffee,
                patch,
            })
        }
        BrewStage::AwaitingMilk => Plan::AwaitMilk,
        BrewStage::HeatingMilk => Plan::Advance(Transition {
            from,
            phase: Phase::HeatingMilk,
            patch: StatusPatch::stage(BrewStage::DispensingMilk),
        }),
        BrewStage::DispensingMilk => Plan::Advance(Transition {
            from,
            phase: Phase::DispensingMilk,
            patch: StatusPatch::stage(BrewStage::Finished).with_progress(100),
        }),
        BrewStage::Finished => Plan::Complete(Transition {
            from,
            phase: Phase::Cooldown,
            patch: StatusPatch::stage(BrewStage::Inactive).with_progress(0),
        }),
    }
}

/// Change written when the user confirms the milk capsule is in. Only valid
/// while the machine is waiting for it.
pub fn continue_after_milk(status: &BrewStatus) -> Option<StatusPatch> {
    (status.stage == BrewStage::AwaitingMilk).then(|| StatusPatch::stage(BrewStage::HeatingMilk))
}
