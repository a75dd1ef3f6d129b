mod store;
mod toast;

pub use store::{Effect, GameState};
pub use toast::{DismissalTicket, Toast, DEFAULT_TOAST_DURATION};
