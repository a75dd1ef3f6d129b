use std::collections::HashMap;
use std::fmt;

use crate::content::Zone;
use crate::state::GameState;

use super::ZoneOutcome;

/// Behaviour of one `conditional` zone, registered by zone id.
pub trait ZonePuzzle: fmt::Debug {
    /// `gate_open` is the value of the zone's required flag.
    fn resolve(&self, zone: &Zone, gate_open: bool, state: &GameState, outcome: &mut ZoneOutcome);
}

#[derive(Debug, Default)]
pub struct PuzzleRegistry {
    puzzles: HashMap<String, Box<dyn ZonePuzzle>>,
}

impl PuzzleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any puzzle already registered for `zone_id`.
    pub fn register(&mut self, zone_id: impl Into<String>, puzzle: impl ZonePuzzle + 'static) {
        self.puzzles.insert(zone_id.into(), Box::new(puzzle));
    }

    pub fn with(mut self, zone_id: impl Into<String>, puzzle: impl ZonePuzzle + 'static) -> Self {
        self.register(zone_id, puzzle);
        self
    }

    pub fn get(&self, zone_id: &str) -> Option<&dyn ZonePuzzle> {
        self.puzzles.get(zone_id).map(Box::as_ref)
    }

    pub fn contains(&self, zone_id: &str) -> bool {
        self.puzzles.contains_key(zone_id)
    }

    pub fn zone_ids(&self) -> impl Iterator<Item = &str> {
        self.puzzles.keys().map(String::as_str)
    }
}

/// Opens once its gate flag holds, granting a reward item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatedRewardPuzzle {
    pub open_flag: String,
    pub reward_item: String,
    pub opened_message: String,
    pub already_open_message: String,
    pub gated_message: String,
}

impl ZonePuzzle for GatedRewardPuzzle {
    fn resolve(&self, _zone: &Zone, gate_open: bool, state: &GameState, outcome: &mut ZoneOutcome) {
        if !gate_open {
            outcome.say(self.gated_message.clone());
        } else if state.flag(&self.open_flag) {
            outcome.say(self.already_open_message.clone());
        } else {
            outcome.set_flag(&self.open_flag);
            outcome.grant(&self.reward_item);
            outcome.say(self.opened_message.clone());
        }
    }
}
