//! Opt-in solve trace. When enabled, every stage of the pipeline records
//! what it decided and why; the CLI prints the rendered report to stderr
//! so it never contaminates piped output.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct InspectTrace {
    pub ordering: Vec<OrderingEntry>,
    pub rooms: Vec<RoomTrace>,
    pub doors: Vec<DoorDecision>,
    pub reachability: Option<ReachTrace>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderingEntry {
    pub room_id: String,
    pub priority: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attached_to: Option<String>,
}

/// Candidate accounting for one room's placement attempt.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoomTrace {
    pub room_id: String,
    pub cells_considered: usize,
    pub candidates_generated: usize,
    pub rejected_overlap: u32,
    pub rejected_outside: u32,
    pub rejected_no_exterior: u32,
    pub rejected_wrong_edge: u32,
    pub rejected_detached: u32,
    /// Best combined scores among accepted candidates, at most three.
    pub top_scores: Vec<f64>,
    pub placed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoorDecision {
    pub room_a: String,
    pub room_b: String,
    pub verdict: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReachTrace {
    pub entry: Option<String>,
    pub reachable: Vec<String>,
    pub unreachable: Vec<String>,
}

impl Display for InspectTrace {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Placement order:")?;
        for entry in &self.ordering {
            write!(f, "\t{} (priority {:.1}", entry.room_id, entry.priority)?;
            if let Some(owner) = &entry.attached_to {
                write!(f, ", attached to {owner}")?;
            }
            writeln!(f, ")")?;
        }

        writeln!(f, "Rooms:")?;
        for room in &self.rooms {
            write!(
                f,
                "\t{}: {} cells, {} candidates",
                room.room_id, room.cells_considered, room.candidates_generated
            )?;
            let rejected = room.rejected_overlap
                + room.rejected_outside
                + room.rejected_no_exterior
                + room.rejected_wrong_edge
                + room.rejected_detached;
            if rejected > 0 {
                write!(
                    f,
                    ", rejected {} (overlap {}, outside {}, no-exterior {}, wrong-edge {}, detached {})",
                    rejected,
                    room.rejected_overlap,
                    room.rejected_outside,
                    room.rejected_no_exterior,
                    room.rejected_wrong_edge,
                    room.rejected_detached
                )?;
            }
            if !room.top_scores.is_empty() {
                let scores = room
                    .top_scores
                    .iter()
                    .map(|s| format!("{s:.1}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, ", top scores [{scores}]")?;
            }
            writeln!(f, " -> {}", if room.placed { "placed" } else { "UNPLACED" })?;
        }

        if !self.doors.is_empty() {
            writeln!(f, "Door decisions:")?;
            for door in &self.doors {
                writeln!(f, "\t{} <-> {}: {}", door.room_a, door.room_b, door.verdict)?;
            }
        }

        if let Some(reach) = &self.reachability {
            writeln!(
                f,
                "Reachability (entry: {}):",
                reach.entry.as_deref().unwrap_or("none")
            )?;
            writeln!(f, "\treachable: {}", reach.reachable.join(", "))?;
            if !reach.unreachable.is_empty() {
                writeln!(f, "\tUNREACHABLE: {}", reach.unreachable.join(", "))?;
            }
        }
        Ok(())
    }
}
