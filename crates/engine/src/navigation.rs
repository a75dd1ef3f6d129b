//! Which zones, props and overlays the active wall shows for a given state.
//! Everything here is recomputed from the snapshot on each call.

use crate::content::{PercentRect, Prop, StateOverlay, Wall, Zone, ZoneKind};
use crate::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitTarget<'a> {
    Zone(&'a Zone),
    Prop(&'a Prop),
}

fn is_prop_linked(wall: &Wall, zone_id: &str) -> bool {
    wall.props
        .iter()
        .any(|prop| prop.zone_id.as_deref() == Some(zone_id))
}

/// Picked-up zones and unmet conditional pickups stay hidden.
pub fn is_clickable(zone: &Zone, state: &GameState) -> bool {
    if state.is_picked_up(&zone.id) {
        return false;
    }
    match &zone.kind {
        ZoneKind::ConditionalPickup { requires_state, .. } => state.flag(requires_state),
        _ => true,
    }
}

/// Zones drawn as hotspots. Prop-linked zones are drawn by their prop instead.
pub fn visible_zones<'a>(wall: &'a Wall, state: &GameState) -> Vec<&'a Zone> {
    wall.zones
        .iter()
        .filter(|zone| is_clickable(zone, state) && !is_prop_linked(wall, &zone.id))
        .collect()
}

pub fn active_overlays<'a>(wall: &'a Wall, state: &GameState) -> Vec<&'a StateOverlay> {
    wall.overlays
        .iter()
        .filter(|overlay| state.flag(&overlay.flag))
        .collect()
}

/// Hit rectangle of a prop. Without an explicit height, a linked zone's height
/// is used, then the prop's width.
pub fn prop_rect(wall: &Wall, prop: &Prop) -> PercentRect {
    let height = prop
        .height
        .or_else(|| {
            prop.zone_id
                .as_deref()
                .and_then(|zone_id| wall.zone(zone_id))
                .map(|zone| zone.rect.height)
        })
        .unwrap_or(prop.width);
    PercentRect {
        top: prop.top,
        left: prop.left,
        width: prop.width,
        height,
    }
}

/// Topmost target under a viewport point. Hotspots sit above props.
pub fn hit_test<'a>(wall: &'a Wall, state: &GameState, x_pct: f32, y_pct: f32) -> Option<HitTarget<'a>> {
    if let Some(zone) = visible_zones(wall, state)
        .into_iter()
        .rev()
        .find(|zone| zone.rect.contains(x_pct, y_pct))
    {
        return Some(HitTarget::Zone(zone));
    }
    wall.props
        .iter()
        .rev()
        .filter(|prop| prop.zone_id.is_some())
        .find(|prop| prop_rect(wall, prop).contains(x_pct, y_pct))
        .map(HitTarget::Prop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ColorType, WallId};
    use crate::state::Toast;

    fn zone(id: &str, top: f32, kind: ZoneKind) -> Zone {
        Zone {
            id: id.to_string(),
            name: id.to_string(),
            rect: PercentRect {
                top,
                left: 10.0,
                width: 20.0,
                height: 10.0,
            },
            color_type: ColorType::Default,
            kind,
        }
    }

    fn pickup(id: &str, top: f32) -> Zone {
        zone(
            id,
            top,
            ZoneKind::PickupItem {
                item_name: format!("{id} item"),
            },
        )
    }

    fn four_zone_wall() -> Wall {
        Wall {
            id: WallId::new(1).expect("wall"),
            name: "East".to_string(),
            color: [0, 0, 0],
            background: None,
            zones: vec![
                pickup("z1", 0.0),
                pickup("z2", 20.0),
                zone(
                    "z3",
                    40.0,
                    ZoneKind::ConditionalPickup {
                        item_name: "Knob".to_string(),
                        requires_state: "drawerOpen".to_string(),
                    },
                ),
                pickup("z4", 60.0),
            ],
            props: vec![Prop {
                id: "unit".to_string(),
                image: None,
                top: 20.0,
                left: 50.0,
                width: 10.0,
                height: None,
                zone_id: Some("z2".to_string()),
            }],
            overlays: vec![StateOverlay {
                flag: "drawerOpen".to_string(),
                label: "DRAWER OPEN".to_string(),
                rect: PercentRect::default(),
                tint: [0, 0, 0, 128],
            }],
        }
    }

    fn state() -> GameState {
        GameState::new(&["drawerOpen".to_string()], Toast::default())
    }

    #[test]
    fn visible_set_excludes_picked_prop_linked_and_gated_zones() {
        let wall = four_zone_wall();
        let mut state = state();
        state.pick_up_zone("z1");
        let ids = visible_zones(&wall, &state)
            .into_iter()
            .map(|zone| zone.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["z4"]);
    }

    #[test]
    fn gated_zone_appears_once_flag_is_set() {
        let wall = four_zone_wall();
        let mut state = state();
        state.update_game_state("drawerOpen", true);
        let ids = visible_zones(&wall, &state)
            .into_iter()
            .map(|zone| zone.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["z1", "z3", "z4"]);
        assert_eq!(active_overlays(&wall, &state).len(), 1);
    }

    #[test]
    fn prop_linked_zone_remains_clickable() {
        let wall = four_zone_wall();
        let state = state();
        let linked = wall.zone("z2").expect("zone");
        assert!(is_clickable(linked, &state));
    }

    #[test]
    fn hit_test_finds_zones_then_props() {
        let wall = four_zone_wall();
        let state = state();
        assert!(matches!(
            hit_test(&wall, &state, 15.0, 65.0),
            Some(HitTarget::Zone(zone)) if zone.id == "z4"
        ));
        // prop height falls back to the linked zone's height
        assert!(matches!(
            hit_test(&wall, &state, 55.0, 29.0),
            Some(HitTarget::Prop(prop)) if prop.id == "unit"
        ));
        assert_eq!(hit_test(&wall, &state, 15.0, 25.0), None);
        assert_eq!(hit_test(&wall, &state, 90.0, 90.0), None);
    }
}
