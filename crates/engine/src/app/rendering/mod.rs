mod canvas;
mod layout;
mod renderer;
mod text;

pub use layout::{KeypadKey, PxRect, ScreenLayout};
pub use renderer::{zone_tint, Renderer};
