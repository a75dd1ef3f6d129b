use tracing::debug;

use crate::content::{CodeLockSpec, PlacementSpec, Zone};
use crate::state::{Effect, GameState};

use super::code_entry::CodeEntryRequest;
use super::ZoneOutcome;

pub(super) struct TvFields<'a> {
    pub knob_item: &'a str,
    pub knob_flag: &'a str,
    pub fixed_flag: &'a str,
    pub display: &'a str,
}

pub(super) fn pickup(zone: &Zone, item_name: &str, state: &GameState, outcome: &mut ZoneOutcome) {
    if state.is_picked_up(&zone.id) {
        debug!(zone_id = %zone.id, "pickup_zone_already_taken");
        return;
    }
    outcome.grant(item_name);
    outcome.push_effect(Effect::PickUpZone {
        zone_id: zone.id.clone(),
    });
    outcome.say(format!("Picked up [{item_name}]"));
}

pub(super) fn locked_object(
    required_item: &str,
    opens_flag: &str,
    noun: &str,
    state: &GameState,
    outcome: &mut ZoneOutcome,
) {
    if state.flag(opens_flag) {
        outcome.say(format!("The {noun} is already open"));
    } else if state.active_item() == Some(required_item) {
        outcome.set_flag(opens_flag);
        outcome.consume(required_item);
        outcome.say(format!("The {noun} unlocks!"));
    } else {
        outcome.say("It is locked.");
    }
}

/// Knob missing, then knob attached, then fixed.
pub(super) fn tv_interactive(
    zone: &Zone,
    fields: TvFields<'_>,
    state: &GameState,
    outcome: &mut ZoneOutcome,
) {
    if !state.flag(fields.knob_flag) {
        if state.active_item() == Some(fields.knob_item) {
            outcome.set_flag(fields.knob_flag);
            outcome.consume(fields.knob_item);
            outcome.say(format!("You attach the {} to the {}", fields.knob_item, zone.name));
        } else {
            outcome.say("It's missing a knob. I can't change the channel.");
        }
    } else if !state.flag(fields.fixed_flag) {
        outcome.set_flag(fields.fixed_flag);
        outcome.say(format!("{} Fixed - Time: {}", zone.name, fields.display));
    } else {
        outcome.say(format!("The {} shows: {}", zone.name, fields.display));
    }
}

pub(super) fn code_lock(
    zone: &Zone,
    spec: &CodeLockSpec,
    state: &GameState,
    outcome: &mut ZoneOutcome,
) {
    let noun = &spec.noun;
    if state.flag(&spec.open_flag) {
        outcome.say(format!("The {noun} is already open"));
    } else if state.flag(&spec.unlocked_flag) {
        outcome.set_flag(&spec.open_flag);
        outcome.say(format!("You open the {noun}"));
    } else {
        outcome.code_entry = Some(CodeEntryRequest {
            zone_id: zone.id.clone(),
            code_length: spec.code_length(),
        });
    }
}

/// Completion is checked against the snapshot, so fill order does not matter.
pub(super) fn placement(spec: &PlacementSpec, state: &GameState, outcome: &mut ZoneOutcome) {
    let Some(item) = state.active_item() else {
        let filled = spec
            .slots
            .iter()
            .filter(|slot| state.flag(&slot.flag))
            .count();
        let summary = if filled == spec.slots.len() {
            &spec.complete_text
        } else if filled > 0 {
            &spec.partial_text
        } else {
            &spec.empty_text
        };
        outcome.say(summary.clone());
        return;
    };

    let Some(slot) = spec.slot_for_item(item) else {
        outcome.say("This item doesn't fit here");
        return;
    };
    if state.flag(&slot.flag) {
        outcome.say(format!("This piece is already in the {}", spec.noun));
        return;
    }

    outcome.set_flag(&slot.flag);
    outcome.consume(item);
    outcome.say(format!("Placed {item} in the {}", spec.noun));

    let others_filled = spec
        .slots
        .iter()
        .filter(|other| other.flag != slot.flag)
        .all(|other| state.flag(&other.flag));
    if others_filled && !state.flag(&spec.reveals_flag) {
        outcome.set_flag(&spec.reveals_flag);
        outcome.say(spec.reveal_text.clone());
        outcome.say(format!("A {} falls to the floor", spec.bonus_item));
    }
}
