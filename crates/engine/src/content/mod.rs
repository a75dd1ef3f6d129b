mod catalog;
mod compiler;
mod pipeline;
mod types;
mod validation;

pub use catalog::RoomCatalog;
pub use compiler::{ContentCompileError, ContentErrorCode, SourceLocation};
pub use pipeline::{compile_room_catalog, load_room_catalog, ContentPipelineError};
pub use types::{
    CodeLockSpec, ColorType, Direction, Inspectable, PercentRect, PlacementSlot, PlacementSpec,
    Prop, StateOverlay, Wall, WallId, Zone, ZoneKind, WALL_COUNT,
};
pub use validation::CatalogIntegrityError;
