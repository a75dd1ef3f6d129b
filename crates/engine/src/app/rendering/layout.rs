use crate::content::{Direction, PercentRect};

const ROOM_ASPECT: f32 = 16.0 / 9.0;
/// Sidebar width as a fraction of the room height.
const SIDEBAR_RATIO: f32 = 0.3;
const SIDEBAR_TITLE_BAND_PX: i32 = 34;
const MIN_SLOT_HEIGHT_PX: i32 = 28;

const ROTATE_LEFT_BUTTON: PercentRect = PercentRect {
    top: 44.0,
    left: 0.5,
    width: 5.0,
    height: 12.0,
};
const ROTATE_RIGHT_BUTTON: PercentRect = PercentRect {
    top: 44.0,
    left: 94.5,
    width: 5.0,
    height: 12.0,
};
const TOAST_PANEL: PercentRect = PercentRect {
    top: 84.0,
    left: 10.0,
    width: 80.0,
    height: 12.0,
};
const INSPECT_PANEL: PercentRect = PercentRect {
    top: 12.0,
    left: 12.0,
    width: 76.0,
    height: 76.0,
};
const KEYPAD_PANEL: PercentRect = PercentRect {
    top: 12.0,
    left: 32.0,
    width: 36.0,
    height: 76.0,
};
static KEYPAD_ROWS: [[KeypadKey; 3]; 4] = [
    [KeypadKey::Digit('1'), KeypadKey::Digit('2'), KeypadKey::Digit('3')],
    [KeypadKey::Digit('4'), KeypadKey::Digit('5'), KeypadKey::Digit('6')],
    [KeypadKey::Digit('7'), KeypadKey::Digit('8'), KeypadKey::Digit('9')],
    [KeypadKey::Clear, KeypadKey::Digit('0'), KeypadKey::Enter],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PxRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl PxRect {
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }

    pub fn inset(&self, amount: i32) -> Self {
        Self {
            x: self.x + amount,
            y: self.y + amount,
            w: (self.w - amount * 2).max(0),
            h: (self.h - amount * 2).max(0),
        }
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypadKey {
    Digit(char),
    Clear,
    Enter,
}

impl KeypadKey {
    pub fn label(self) -> char {
        match self {
            Self::Digit(digit) => digit,
            Self::Clear => 'C',
            Self::Enter => 'E',
        }
    }
}

/// Letterboxed 16:9 room box with the inventory sidebar on its right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenLayout {
    pub room: PxRect,
    pub sidebar: PxRect,
}

impl ScreenLayout {
    pub fn compute(width: u32, height: u32) -> Self {
        let (width, height) = (width as f32, height as f32);
        let content_aspect = ROOM_ASPECT + SIDEBAR_RATIO;
        let room_h = height.min(width / content_aspect).max(0.0);
        let room_w = room_h * ROOM_ASPECT;
        let sidebar_w = room_h * SIDEBAR_RATIO;
        let x0 = ((width - room_w - sidebar_w) / 2.0).max(0.0);
        let y0 = ((height - room_h) / 2.0).max(0.0);

        let room = PxRect {
            x: x0.round() as i32,
            y: y0.round() as i32,
            w: room_w.round() as i32,
            h: room_h.round() as i32,
        };
        let sidebar = PxRect {
            x: room.x + room.w,
            y: room.y,
            w: sidebar_w.round() as i32,
            h: room.h,
        };
        Self { room, sidebar }
    }

    pub fn pct_rect(&self, rect: PercentRect) -> PxRect {
        let x = self.room.x as f32 + rect.left / 100.0 * self.room.w as f32;
        let y = self.room.y as f32 + rect.top / 100.0 * self.room.h as f32;
        PxRect {
            x: x.round() as i32,
            y: y.round() as i32,
            w: (rect.width / 100.0 * self.room.w as f32).round() as i32,
            h: (rect.height / 100.0 * self.room.h as f32).round() as i32,
        }
    }

    /// Window pixel to room percent, or `None` outside the room box.
    pub fn to_room_pct(&self, px: f32, py: f32) -> Option<(f32, f32)> {
        if self.room.w <= 0 || self.room.h <= 0 {
            return None;
        }
        let x_pct = (px - self.room.x as f32) / self.room.w as f32 * 100.0;
        let y_pct = (py - self.room.y as f32) / self.room.h as f32 * 100.0;
        ((0.0..100.0).contains(&x_pct) && (0.0..100.0).contains(&y_pct)).then_some((x_pct, y_pct))
    }

    pub fn rotate_button(&self, direction: Direction) -> PxRect {
        match direction {
            Direction::Left => self.pct_rect(ROTATE_LEFT_BUTTON),
            Direction::Right => self.pct_rect(ROTATE_RIGHT_BUTTON),
        }
    }

    pub fn rotate_button_at(&self, px: i32, py: i32) -> Option<Direction> {
        [Direction::Left, Direction::Right]
            .into_iter()
            .find(|direction| self.rotate_button(*direction).contains(px, py))
    }

    fn slot_padding(&self) -> i32 {
        (self.sidebar.w / 12).max(2)
    }

    pub fn inventory_slot(&self, index: usize) -> PxRect {
        let padding = self.slot_padding();
        let slot_w = (self.sidebar.w - padding * 2).max(0);
        let slot_h = (self.sidebar.w / 3).max(MIN_SLOT_HEIGHT_PX);
        PxRect {
            x: self.sidebar.x + padding,
            y: self.sidebar.y + SIDEBAR_TITLE_BAND_PX + index as i32 * (slot_h + padding),
            w: slot_w,
            h: slot_h,
        }
    }

    pub fn inventory_slot_at(&self, px: i32, py: i32, item_count: usize) -> Option<usize> {
        (0..item_count).find(|index| self.inventory_slot(*index).contains(px, py))
    }

    pub fn toast_panel(&self) -> PxRect {
        self.pct_rect(TOAST_PANEL)
    }

    pub fn inspect_panel(&self) -> PxRect {
        self.pct_rect(INSPECT_PANEL)
    }

    pub fn keypad_panel(&self) -> PxRect {
        self.pct_rect(KEYPAD_PANEL)
    }

    /// Readout band at the top of the keypad.
    pub fn keypad_display(&self) -> PxRect {
        let panel = self.keypad_panel();
        let band = panel.h / 5;
        PxRect {
            h: band,
            ..panel
        }
        .inset(band / 6)
    }

    pub fn keypad_keys(&self) -> impl Iterator<Item = (KeypadKey, PxRect)> + '_ {
        let panel = self.keypad_panel();
        let band = panel.h / 5;
        let cell_w = panel.w / 3;
        let cell_h = (panel.h - band) / 4;
        let gap = (cell_w.min(cell_h) / 10).max(1);
        KEYPAD_ROWS.iter().enumerate().flat_map(move |(row, keys)| {
            keys.iter().enumerate().map(move |(col, key)| {
                let cell = PxRect {
                    x: panel.x + col as i32 * cell_w,
                    y: panel.y + band + row as i32 * cell_h,
                    w: cell_w,
                    h: cell_h,
                };
                (*key, cell.inset(gap))
            })
        })
    }

    pub fn keypad_key_at(&self, px: i32, py: i32) -> Option<KeypadKey> {
        self.keypad_keys()
            .find(|(_, rect)| rect.contains(px, py))
            .map(|(key, _)| key)
    }
}
