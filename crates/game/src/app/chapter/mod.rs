//! Puzzles that need code rather than catalog data, keyed by chapter.

use room_engine::{GatedRewardPuzzle, PuzzleRegistry};
use tracing::warn;

pub(crate) const MAJLIS: &str = "majlis";

/// The majlis clock opens once the TV shows the time, and holds the second photo half.
pub(crate) fn majlis_puzzles() -> PuzzleRegistry {
    PuzzleRegistry::new().with(
        "west-clock",
        GatedRewardPuzzle {
            open_flag: "clockOpen".to_string(),
            reward_item: "Photo Half B".to_string(),
            opened_message: "You set the time to 09:30. It opens.".to_string(),
            already_open_message: "The clock is already open".to_string(),
            gated_message: "The hands are stuck. I don't know the time.".to_string(),
        },
    )
}

pub(crate) fn puzzles_for(chapter: &str) -> PuzzleRegistry {
    match chapter {
        MAJLIS => majlis_puzzles(),
        other => {
            warn!(chapter = %other, "no_puzzles_registered_for_chapter");
            PuzzleRegistry::new()
        }
    }
}

#[cfg(test)]
mod tests;
