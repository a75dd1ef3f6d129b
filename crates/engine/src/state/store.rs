use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::content::{Direction, WallId};

use super::toast::{DismissalTicket, Toast};

/// One committed change produced by the zone resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    AddToInventory { item: String },
    ConsumeItem { item: String },
    PickUpZone { zone_id: String },
    SetFlag { key: String, value: bool },
    Inspect { item: String },
}

/// Mutable session state. Every change goes through one of the actions below.
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    current_wall: WallId,
    slide_direction: Option<Direction>,
    inventory: Vec<String>,
    active_item: Option<String>,
    picked_up_zones: BTreeSet<String>,
    flags: BTreeMap<String, bool>,
    inspecting_item: Option<String>,
    toast: Toast,
    debug_mode: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(&[], Toast::default())
    }
}

impl GameState {
    /// Fresh state on wall 0 with every declared flag false.
    pub fn new(declared_flags: &[String], toast: Toast) -> Self {
        Self {
            current_wall: WallId::NORTH,
            slide_direction: None,
            inventory: Vec::new(),
            active_item: None,
            picked_up_zones: BTreeSet::new(),
            flags: declared_flags
                .iter()
                .map(|flag| (flag.clone(), false))
                .collect(),
            inspecting_item: None,
            toast,
            debug_mode: false,
        }
    }

    pub fn current_wall(&self) -> WallId {
        self.current_wall
    }

    pub fn slide_direction(&self) -> Option<Direction> {
        self.slide_direction
    }

    pub fn inventory(&self) -> &[String] {
        &self.inventory
    }

    pub fn has_item(&self, item: &str) -> bool {
        self.inventory.iter().any(|held| held == item)
    }

    pub fn active_item(&self) -> Option<&str> {
        self.active_item.as_deref()
    }

    pub fn picked_up_zones(&self) -> &BTreeSet<String> {
        &self.picked_up_zones
    }

    pub fn is_picked_up(&self, zone_id: &str) -> bool {
        self.picked_up_zones.contains(zone_id)
    }

    pub fn flags(&self) -> &BTreeMap<String, bool> {
        &self.flags
    }

    /// Unset flags read as false.
    pub fn flag(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    pub fn inspecting_item(&self) -> Option<&str> {
        self.inspecting_item.as_deref()
    }

    pub fn toast(&self) -> &Toast {
        &self.toast
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    pub fn rotate_left(&mut self) -> WallId {
        self.rotate(Direction::Left)
    }

    pub fn rotate_right(&mut self) -> WallId {
        self.rotate(Direction::Right)
    }

    pub fn rotate(&mut self, direction: Direction) -> WallId {
        self.current_wall = self.current_wall.rotated(direction);
        self.slide_direction = Some(direction);
        self.current_wall
    }

    /// Returns false (and changes nothing) when the item is already held.
    pub fn add_to_inventory(&mut self, item: &str) -> bool {
        if self.has_item(item) {
            warn!(item = %item, "inventory_add_duplicate_ignored");
            return false;
        }
        self.inventory.push(item.to_string());
        true
    }

    pub fn remove_from_inventory(&mut self, item: &str) -> bool {
        let before = self.inventory.len();
        self.inventory.retain(|held| held != item);
        if self.active_item.as_deref() == Some(item) {
            self.active_item = None;
        }
        self.inventory.len() != before
    }

    /// Selecting the active item again deselects it.
    pub fn set_active_item(&mut self, item: &str) -> Option<&str> {
        if !self.has_item(item) {
            warn!(item = %item, "select_item_not_in_inventory_ignored");
            return self.active_item();
        }
        if self.active_item.as_deref() == Some(item) {
            self.active_item = None;
        } else {
            self.active_item = Some(item.to_string());
        }
        self.active_item()
    }

    pub fn clear_active_item(&mut self) {
        self.active_item = None;
    }

    /// Returns false (and changes nothing) when the zone was already picked up.
    pub fn pick_up_zone(&mut self, zone_id: &str) -> bool {
        if !self.picked_up_zones.insert(zone_id.to_string()) {
            warn!(zone_id = %zone_id, "zone_pickup_duplicate_ignored");
            return false;
        }
        true
    }

    pub fn update_game_state(&mut self, key: &str, value: bool) {
        self.flags.insert(key.to_string(), value);
    }

    pub fn set_inspecting_item(&mut self, item: &str) {
        self.inspecting_item = Some(item.to_string());
    }

    pub fn close_inspect(&mut self) {
        self.inspecting_item = None;
    }

    pub fn show_toast(&mut self, message: &str) -> DismissalTicket {
        self.toast.show(message)
    }

    pub fn advance_time(&mut self, dt: Duration) {
        if self.toast.advance(dt) {
            debug!("toast_dismissed");
        }
    }

    pub fn toggle_debug_mode(&mut self) -> bool {
        self.debug_mode = !self.debug_mode;
        self.debug_mode
    }

    pub fn set_debug_mode(&mut self, enabled: bool) {
        self.debug_mode = enabled;
    }

    /// Compact JSON view of the store, for debug logging.
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Commits a resolver delta in order.
    pub fn apply_effects(&mut self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::AddToInventory { item } => {
                    self.add_to_inventory(item);
                }
                Effect::ConsumeItem { item } => {
                    self.remove_from_inventory(item);
                }
                Effect::PickUpZone { zone_id } => {
                    self.pick_up_zone(zone_id);
                }
                Effect::SetFlag { key, value } => self.update_game_state(key, *value),
                Effect::Inspect { item } => self.set_inspecting_item(item),
            }
        }
    }
}
