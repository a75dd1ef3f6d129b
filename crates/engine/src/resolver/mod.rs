//! Zone click resolution. Resolution is pure: it reads one state snapshot and
//! returns the effects to commit plus the messages to deliver afterwards.

mod code_entry;
mod handlers;
mod puzzles;

use serde::Serialize;
use tracing::warn;

use crate::content::{Zone, ZoneKind};
use crate::state::{Effect, GameState};

pub use code_entry::{
    close_message, resolve_code_submission, CodeEntry, CodeEntryRequest, CodeSubmission,
    CodeVerdict,
};
pub use puzzles::{GatedRewardPuzzle, PuzzleRegistry, ZonePuzzle};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ZoneOutcome {
    pub effects: Vec<Effect>,
    pub messages: Vec<String>,
    pub code_entry: Option<CodeEntryRequest>,
}

impl ZoneOutcome {
    fn clicked(zone: &Zone) -> Self {
        Self {
            messages: vec![format!("Clicked [{}]", zone.name)],
            ..Self::default()
        }
    }

    pub fn say(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn push_effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn set_flag(&mut self, key: &str) {
        self.push_effect(Effect::SetFlag {
            key: key.to_string(),
            value: true,
        });
    }

    pub fn consume(&mut self, item: &str) {
        self.push_effect(Effect::ConsumeItem {
            item: item.to_string(),
        });
    }

    pub fn grant(&mut self, item: &str) {
        self.push_effect(Effect::AddToInventory {
            item: item.to_string(),
        });
    }

    pub fn is_noop(&self) -> bool {
        self.effects.is_empty() && self.code_entry.is_none()
    }
}

/// Resolves one click on `zone`. Player mistakes are successful outcomes with
/// negative feedback, never errors.
pub fn resolve_zone_click(zone: &Zone, state: &GameState, puzzles: &PuzzleRegistry) -> ZoneOutcome {
    let mut outcome = ZoneOutcome::clicked(zone);
    match &zone.kind {
        ZoneKind::PickupItem { item_name } => {
            handlers::pickup(zone, item_name, state, &mut outcome)
        }
        ZoneKind::ConditionalPickup {
            item_name,
            requires_state,
        } => {
            if state.flag(requires_state) {
                handlers::pickup(zone, item_name, state, &mut outcome);
            }
        }
        ZoneKind::LockedObject {
            required_item,
            opens_flag,
            noun,
        } => handlers::locked_object(required_item, opens_flag, noun, state, &mut outcome),
        ZoneKind::TvInteractive {
            knob_item,
            knob_flag,
            fixed_flag,
            display,
        } => handlers::tv_interactive(
            zone,
            handlers::TvFields {
                knob_item,
                knob_flag,
                fixed_flag,
                display,
            },
            state,
            &mut outcome,
        ),
        ZoneKind::Inspect { inspect_item } => {
            outcome.push_effect(Effect::Inspect {
                item: inspect_item.clone(),
            });
            outcome.say(format!("Inspecting [{}]", zone.name));
        }
        ZoneKind::CodeLock(spec) => handlers::code_lock(zone, spec, state, &mut outcome),
        ZoneKind::Conditional { required_state } => match puzzles.get(&zone.id) {
            Some(puzzle) => puzzle.resolve(zone, state.flag(required_state), state, &mut outcome),
            None => {
                warn!(zone_id = %zone.id, "conditional_zone_without_puzzle");
                outcome.say(format!("Unknown zone type: {}", zone.kind.type_tag()));
            }
        },
        ZoneKind::Placement(spec) => handlers::placement(spec, state, &mut outcome),
    }
    outcome
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
