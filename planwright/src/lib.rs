//! planwright turns an abstract layout intent — a footprint, a list of
//! rooms with area/adjacency/orientation requirements, and global zoning
//! hints — into a concrete floor plan: axis-aligned room rectangles
//! packed into the footprint, with doors and windows placed on the
//! resulting walls, a quality score, and a guarantee that every room is
//! reachable from the entry.
//!
//! The pipeline is deterministic and single-threaded: identical intents
//! produce identical plans. See [`solve::solve`] for the entry point.

use errors::IntentError;
use intent::LayoutIntent;

// Modules whose related files live grouped in a folder are declared via
// #[path] so the folder's main file carries the module name rather than
// yet another mod.rs.

pub mod errors;
pub mod geom;
pub mod inspect;
pub mod plan;
pub mod reach;
pub mod solve;

#[cfg(test)]
pub(crate) mod testutil;

#[path = "frame/frame.rs"]
pub mod frame;

#[path = "intent/intent.rs"]
pub mod intent;

#[path = "openings/openings.rs"]
pub mod openings;

#[path = "render/render.rs"]
pub mod render;

#[path = "solver/solver.rs"]
pub mod solver;

pub use solve::{solve, Solution, SolveOptions};

/// Parses an intent from JSON text. Unknown fields are rejected so typos
/// in hand-written intents surface instead of silently doing nothing.
pub fn parse_intent(src: &str) -> Result<LayoutIntent, IntentError> {
    serde_json::from_str(src).map_err(|e| IntentError::Parse(e.to_string()))
}
