use std::fmt;

use serde::Serialize;

pub const WALL_COUNT: usize = 4;

/// Index of one of the four walls. Always in `0..WALL_COUNT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WallId(u8);

impl WallId {
    pub const NORTH: WallId = WallId(0);

    pub fn new(index: usize) -> Option<Self> {
        (index < WALL_COUNT).then_some(Self(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn rotated(self, direction: Direction) -> Self {
        let count = WALL_COUNT as u8;
        match direction {
            Direction::Left => Self((self.0 + count - 1) % count),
            Direction::Right => Self((self.0 + 1) % count),
        }
    }
}

impl fmt::Display for WallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

/// Rectangle in percent of the room viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PercentRect {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

impl PercentRect {
    pub fn contains(&self, x_pct: f32, y_pct: f32) -> bool {
        x_pct >= self.left
            && x_pct < self.left + self.width
            && y_pct >= self.top
            && y_pct < self.top + self.height
    }

    pub fn fits_viewport(&self) -> bool {
        let values = [self.top, self.left, self.width, self.height];
        values.iter().all(|value| value.is_finite() && *value >= 0.0)
            && self.top + self.height <= 100.0
            && self.left + self.width <= 100.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ColorType {
    Exit,
    Puzzle,
    Item,
    Lore,
    #[default]
    Default,
}

impl ColorType {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "exit" => Some(Self::Exit),
            "puzzle" => Some(Self::Puzzle),
            "item" => Some(Self::Item),
            "lore" => Some(Self::Lore),
            "default" => Some(Self::Default),
            _ => None,
        }
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Self::Exit => "exit",
            Self::Puzzle => "puzzle",
            Self::Item => "item",
            Self::Lore => "lore",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub rect: PercentRect,
    pub color_type: ColorType,
    pub kind: ZoneKind,
}

/// Behaviour of a zone together with the fields that behaviour needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneKind {
    PickupItem {
        item_name: String,
    },
    ConditionalPickup {
        item_name: String,
        requires_state: String,
    },
    LockedObject {
        required_item: String,
        opens_flag: String,
        noun: String,
    },
    TvInteractive {
        knob_item: String,
        knob_flag: String,
        fixed_flag: String,
        display: String,
    },
    Inspect {
        inspect_item: String,
    },
    CodeLock(CodeLockSpec),
    Conditional {
        required_state: String,
    },
    Placement(PlacementSpec),
}

impl ZoneKind {
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::PickupItem { .. } => "pickupItem",
            Self::ConditionalPickup { .. } => "conditionalPickup",
            Self::LockedObject { .. } => "lockedObject",
            Self::TvInteractive { .. } => "tvInteractive",
            Self::Inspect { .. } => "inspect",
            Self::CodeLock(_) => "codelock",
            Self::Conditional { .. } => "conditional",
            Self::Placement(_) => "placement",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeLockSpec {
    pub correct_code: String,
    pub unlocked_flag: String,
    pub open_flag: String,
    pub noun: String,
    pub contents: Option<String>,
}

impl CodeLockSpec {
    pub fn code_length(&self) -> usize {
        self.correct_code.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementSpec {
    pub slots: Vec<PlacementSlot>,
    pub noun: String,
    pub reveals_flag: String,
    pub bonus_item: String,
    pub reveal_text: String,
    pub empty_text: String,
    pub partial_text: String,
    pub complete_text: String,
}

impl PlacementSpec {
    pub fn slot_for_item(&self, item: &str) -> Option<&PlacementSlot> {
        self.slots.iter().find(|slot| slot.item == item)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementSlot {
    pub item: String,
    pub flag: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    pub id: String,
    pub image: Option<String>,
    pub top: f32,
    pub left: f32,
    pub width: f32,
    /// Percent height; when absent the linked zone's height (or the width) is used.
    pub height: Option<f32>,
    pub zone_id: Option<String>,
}

/// Visual drawn over a wall while `flag` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct StateOverlay {
    pub flag: String,
    pub label: String,
    pub rect: PercentRect,
    pub tint: [u8; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    pub id: WallId,
    pub name: String,
    pub color: [u8; 3],
    pub background: Option<String>,
    pub zones: Vec<Zone>,
    pub props: Vec<Prop>,
    pub overlays: Vec<StateOverlay>,
}

impl Wall {
    pub fn zone(&self, zone_id: &str) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.id == zone_id)
    }

    pub fn prop(&self, prop_id: &str) -> Option<&Prop> {
        self.props.iter().find(|prop| prop.id == prop_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspectable {
    pub id: String,
    pub title: String,
    pub lines: Vec<String>,
}
