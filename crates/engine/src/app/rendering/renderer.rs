use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::content::{ColorType, Direction, Wall};
use crate::image_keys::image_path_for_key;
use crate::navigation;
use crate::session::RoomSession;

use super::canvas::{
    blend_rect, clear, draw_image_stretched, draw_rect_outline, fill_rect, LoadedImage,
};
use super::layout::{PxRect, ScreenLayout};
use super::text::{
    chars_that_fit, draw_text, draw_text_centered, wrap_text, GLYPH_HEIGHT, LINE_ADVANCE,
    TEXT_SCALE,
};

const LETTERBOX_COLOR: [u8; 4] = [12, 12, 14, 255];
const PROP_PLACEHOLDER_COLOR: [u8; 4] = [96, 92, 104, 255];
const PROP_PLACEHOLDER_BORDER: [u8; 4] = [150, 146, 160, 255];
const TEXT_PRIMARY: [u8; 4] = [244, 248, 252, 255];
const TEXT_DIM: [u8; 4] = [176, 198, 220, 255];
const PANEL_BACKGROUND: [u8; 4] = [10, 12, 16, 210];
const PANEL_BORDER: [u8; 4] = [92, 106, 126, 255];
const MODAL_BACKDROP: [u8; 4] = [0, 0, 0, 150];
const SIDEBAR_BACKGROUND: [u8; 4] = [22, 24, 30, 255];
const SLOT_BACKGROUND: [u8; 4] = [36, 40, 48, 255];
const ACTIVE_SLOT_BORDER: [u8; 4] = [250, 204, 21, 255];
const DEBUG_OUTLINE: [u8; 4] = [255, 255, 255, 255];
const KEY_BACKGROUND: [u8; 4] = [44, 50, 60, 255];
const PANEL_PADDING_PX: i32 = 10;

pub fn zone_tint(color_type: ColorType) -> [u8; 4] {
    match color_type {
        ColorType::Exit => [220, 38, 38, 128],
        ColorType::Puzzle => [37, 99, 235, 128],
        ColorType::Item => [234, 179, 8, 128],
        ColorType::Lore => [22, 163, 74, 128],
        ColorType::Default => [255, 255, 255, 77],
    }
}

/// Decoded images by key. Failed loads are cached as `None` and warned once.
pub(crate) struct ImageCache {
    asset_root: PathBuf,
    images: HashMap<String, Option<LoadedImage>>,
    warned_missing_keys: HashSet<String>,
}

impl ImageCache {
    pub(crate) fn new(asset_root: PathBuf) -> Self {
        Self {
            asset_root,
            images: HashMap::new(),
            warned_missing_keys: HashSet::new(),
        }
    }

    pub(crate) fn get(&mut self, key: &str) -> Option<&LoadedImage> {
        if !self.images.contains_key(key) {
            let loaded = match image_path_for_key(&self.asset_root, key) {
                Ok(path) => match load_image_rgba(&path) {
                    Ok(image) => Some(image),
                    Err(reason) => {
                        warn_image_load_once(&mut self.warned_missing_keys, key, Some(&path), &reason);
                        None
                    }
                },
                Err(error) => {
                    warn_image_load_once(
                        &mut self.warned_missing_keys,
                        key,
                        None,
                        &error.to_string(),
                    );
                    None
                }
            };
            self.images.insert(key.to_string(), loaded);
        }
        self.images.get(key).and_then(Option::as_ref)
    }
}

fn load_image_rgba(path: &Path) -> Result<LoadedImage, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedImage {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

fn warn_image_load_once(
    warned_keys: &mut HashSet<String>,
    key: &str,
    resolved_path: Option<&Path>,
    reason: &str,
) {
    if !warned_keys.insert(key.to_string()) {
        return;
    }
    let path_display = resolved_path
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unresolved>".to_string());
    warn!(
        image_key = key,
        path = %path_display,
        reason = reason,
        "renderer_image_load_failed_using_placeholder"
    );
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
    images: ImageCache,
}

impl Renderer {
    pub fn new(window: Arc<Window>, asset_root: PathBuf) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            width: size.width,
            height: size.height,
            images: ImageCache::new(asset_root),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn layout(&self) -> ScreenLayout {
        ScreenLayout::compute(self.width, self.height)
    }

    pub fn render(&mut self, session: &RoomSession) -> Result<(), Error> {
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }
        let layout = self.layout();
        let mut canvas = Canvas {
            frame: self.pixels.frame_mut(),
            width: self.width,
            height: self.height,
        };
        draw_session(&mut canvas, &layout, session, &mut self.images);
        self.pixels.render()
    }
}

pub(crate) struct Canvas<'a> {
    pub frame: &'a mut [u8],
    pub width: u32,
    pub height: u32,
}

impl Canvas<'_> {
    fn fill(&mut self, rect: PxRect, color: [u8; 4]) {
        fill_rect(self.frame, self.width, self.height, rect, color);
    }

    fn blend(&mut self, rect: PxRect, color: [u8; 4]) {
        blend_rect(self.frame, self.width, self.height, rect, color);
    }

    fn outline(&mut self, rect: PxRect, thickness: i32, color: [u8; 4]) {
        draw_rect_outline(self.frame, self.width, self.height, rect, thickness, color);
    }

    fn text(&mut self, x: i32, y: i32, text: &str, color: [u8; 4]) {
        draw_text(self.frame, self.width, self.height, x, y, text, color);
    }

    fn text_centered(&mut self, rect: PxRect, text: &str, color: [u8; 4]) {
        let (cx, cy) = rect.center();
        let fitted = truncate_to(text, chars_that_fit(rect.w));
        draw_text_centered(self.frame, self.width, self.height, cx, cy, &fitted, color);
    }

    fn image(&mut self, rect: PxRect, image: &LoadedImage) {
        draw_image_stretched(self.frame, self.width, self.height, rect, image);
    }

    fn panel(&mut self, rect: PxRect) {
        self.blend(rect, PANEL_BACKGROUND);
        self.outline(rect, 2, PANEL_BORDER);
    }
}

fn truncate_to(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

pub(crate) fn draw_session(
    canvas: &mut Canvas<'_>,
    layout: &ScreenLayout,
    session: &RoomSession,
    images: &mut ImageCache,
) {
    let state = session.state();
    let wall = session.catalog().wall(session.current_wall());
    let debug = state.debug_mode();

    clear(canvas.frame, LETTERBOX_COLOR);
    draw_wall(canvas, layout, wall, images);
    draw_props(canvas, layout, wall, debug, images);

    for zone in session.visible_zones() {
        let rect = layout.pct_rect(zone.rect);
        canvas.blend(rect, zone_tint(zone.color_type));
        if debug {
            canvas.outline(rect, 1, DEBUG_OUTLINE);
            canvas.text(rect.x + 3, rect.y + 3, &zone.name, TEXT_PRIMARY);
            canvas.text(
                rect.x + 3,
                rect.y + 3 + LINE_ADVANCE,
                zone.kind.type_tag(),
                TEXT_DIM,
            );
        }
    }

    for overlay in session.active_overlays() {
        let rect = layout.pct_rect(overlay.rect);
        canvas.blend(rect, overlay.tint);
        canvas.text_centered(rect, &overlay.label, TEXT_PRIMARY);
    }

    for (direction, label) in [(Direction::Left, "<"), (Direction::Right, ">")] {
        let rect = layout.rotate_button(direction);
        canvas.panel(rect);
        canvas.text_centered(rect, label, TEXT_PRIMARY);
    }

    let title_band = PxRect {
        h: LINE_ADVANCE + PANEL_PADDING_PX,
        ..layout.room
    };
    canvas.text_centered(title_band, &wall.name.to_uppercase(), TEXT_PRIMARY);

    draw_inventory(canvas, layout, session);

    if debug {
        let set_flags = state
            .flags()
            .iter()
            .filter(|(_, value)| **value)
            .map(|(key, _)| key.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let line = format!("WALL {} FLAGS {}", wall.id, set_flags);
        let y = layout.room.y + layout.room.h - LINE_ADVANCE;
        canvas.text(
            layout.room.x + 4,
            y,
            &truncate_to(&line, chars_that_fit(layout.room.w - 8)),
            TEXT_DIM,
        );
    }

    if let Some(message) = state.toast().message() {
        draw_toast(canvas, layout, message);
    }

    if let Some(entry) = session.code_entry() {
        canvas.blend(layout.room, MODAL_BACKDROP);
        let panel = layout.keypad_panel();
        canvas.panel(panel);
        let display = layout.keypad_display();
        canvas.fill(display, SLOT_BACKGROUND);
        let readout = entry
            .entered()
            .chars()
            .chain(std::iter::repeat('_'))
            .take(entry.code_length())
            .collect::<String>();
        canvas.text_centered(display, &readout, TEXT_PRIMARY);
        for (key, rect) in layout.keypad_keys() {
            canvas.fill(rect, KEY_BACKGROUND);
            canvas.outline(rect, 1, PANEL_BORDER);
            canvas.text_centered(rect, &key.label().to_string(), TEXT_PRIMARY);
        }
    } else if let Some(inspectable) = session.inspecting() {
        canvas.blend(layout.room, MODAL_BACKDROP);
        let panel = layout.inspect_panel();
        canvas.panel(panel);
        let inner = panel.inset(PANEL_PADDING_PX * 2);
        let max_chars = chars_that_fit(inner.w);
        let mut y = inner.y;
        canvas.text(inner.x, y, &truncate_to(&inspectable.title, max_chars), TEXT_PRIMARY);
        y += LINE_ADVANCE * 2;
        for paragraph in &inspectable.lines {
            for line in wrap_text(paragraph, max_chars) {
                if y + GLYPH_HEIGHT * TEXT_SCALE > inner.y + inner.h - LINE_ADVANCE {
                    break;
                }
                canvas.text(inner.x, y, &line, TEXT_PRIMARY);
                y += LINE_ADVANCE;
            }
            y += LINE_ADVANCE / 2;
        }
        canvas.text(
            inner.x,
            inner.y + inner.h - GLYPH_HEIGHT * TEXT_SCALE,
            "CLICK TO CLOSE",
            TEXT_DIM,
        );
    }
}

fn draw_wall(canvas: &mut Canvas<'_>, layout: &ScreenLayout, wall: &Wall, images: &mut ImageCache) {
    let [r, g, b] = wall.color;
    canvas.fill(layout.room, [r, g, b, 255]);
    if let Some(key) = wall.background.as_deref() {
        if let Some(image) = images.get(key) {
            canvas.image(layout.room, image);
        }
    }
}

fn draw_props(
    canvas: &mut Canvas<'_>,
    layout: &ScreenLayout,
    wall: &Wall,
    debug: bool,
    images: &mut ImageCache,
) {
    for prop in &wall.props {
        let rect = layout.pct_rect(navigation::prop_rect(wall, prop));
        let image = match prop.image.as_deref() {
            Some(key) => images.get(key),
            None => None,
        };
        match image {
            Some(image) => canvas.image(rect, image),
            None => {
                canvas.fill(rect, PROP_PLACEHOLDER_COLOR);
                canvas.outline(rect, 1, PROP_PLACEHOLDER_BORDER);
            }
        }
        if debug {
            canvas.outline(rect, 1, DEBUG_OUTLINE);
            canvas.text(rect.x + 3, rect.y + rect.h - LINE_ADVANCE, &prop.id, TEXT_DIM);
        }
    }
}

fn draw_inventory(canvas: &mut Canvas<'_>, layout: &ScreenLayout, session: &RoomSession) {
    let state = session.state();
    canvas.fill(layout.sidebar, SIDEBAR_BACKGROUND);
    let title_band = PxRect {
        h: LINE_ADVANCE + PANEL_PADDING_PX,
        ..layout.sidebar
    };
    canvas.text_centered(title_band, "INVENTORY", TEXT_DIM);
    for (index, item) in state.inventory().iter().enumerate() {
        let slot = layout.inventory_slot(index);
        if slot.y + slot.h > layout.sidebar.y + layout.sidebar.h {
            break;
        }
        canvas.fill(slot, SLOT_BACKGROUND);
        if state.active_item() == Some(item.as_str()) {
            canvas.outline(slot, 3, ACTIVE_SLOT_BORDER);
        } else {
            canvas.outline(slot, 1, PANEL_BORDER);
        }
        canvas.text_centered(slot.inset(4), &item.to_uppercase(), TEXT_PRIMARY);
    }
}

fn draw_toast(canvas: &mut Canvas<'_>, layout: &ScreenLayout, message: &str) {
    let panel = layout.toast_panel();
    canvas.panel(panel);
    let inner = panel.inset(PANEL_PADDING_PX);
    let lines = wrap_text(message, chars_that_fit(inner.w));
    let max_lines = (inner.h / LINE_ADVANCE).max(1) as usize;
    let shown = lines.len().min(max_lines) as i32;
    let block_h = shown * LINE_ADVANCE - (LINE_ADVANCE - GLYPH_HEIGHT * TEXT_SCALE);
    let mut y = inner.y + (inner.h - block_h) / 2;
    for line in lines.iter().take(max_lines) {
        let row = PxRect {
            y,
            h: GLYPH_HEIGHT * TEXT_SCALE,
            ..inner
        };
        canvas.text_centered(row, line, TEXT_PRIMARY);
        y += LINE_ADVANCE;
    }
}
