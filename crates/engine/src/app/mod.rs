mod controls;
mod input;
mod loop_runner;
mod rendering;

pub use controls::{dispatch_action, dispatch_click, LoopSignal};
pub use input::{action_for_key, InputAction};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{zone_tint, KeypadKey, PxRect, Renderer, ScreenLayout};
