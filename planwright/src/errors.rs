use serde::Serialize;
use thiserror::Error;

use crate::plan::PlanState;

/// Schema-level problems with a [`LayoutIntent`](crate::intent::LayoutIntent).
/// All of these are detected by the normalizer before any placement runs.
#[derive(Debug, Clone, Error)]
pub enum IntentError {
    #[error("intent JSON is invalid: {0}")]
    Parse(String),

    #[error("duplicate room id '{0}'")]
    DuplicateRoomId(String),

    #[error("room '{room}' references unknown room '{target}'")]
    UnknownRoomReference { room: String, target: String },

    #[error("room '{0}' lists itself as an adjacency")]
    SelfAdjacency(String),

    #[error("room '{0}' has a non-positive minimum area")]
    NonPositiveArea(String),

    #[error("intent contains no rooms")]
    NoRooms,

    #[error("attached room '{0}' names no owner in adjacent_to")]
    AttachmentWithoutOwner(String),

    #[error("invalid footprint: {0}")]
    BadFootprint(String),

    #[error("invalid access rule: {0}")]
    BadAccessRule(String),
}

/// Why an individual room could not be placed. Recorded in the plan state
/// and carried through to the final result; placement of later rooms
/// continues regardless.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementFailure {
    pub room_id: String,
    pub reason: FailureReason,
    pub rejections: RejectionBreakdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// No frame cell matched the room's band/depth preferences.
    NoCells,
    /// The generator produced no geometrically feasible rectangle.
    NoCandidates,
    /// Candidates existed but every one violated a hard constraint.
    AllRejected,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::NoCells => write!(f, "no usable cells"),
            FailureReason::NoCandidates => write!(f, "no candidates generated"),
            FailureReason::AllRejected => write!(f, "all candidates rejected"),
        }
    }
}

/// Per-rule counts of hard-constraint rejections for one room, plus the
/// ids of rooms it collided with.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RejectionBreakdown {
    pub overlap: u32,
    pub outside_footprint: u32,
    pub no_exterior: u32,
    pub wrong_edge: u32,
    pub disconnected_from_owner: u32,
    pub conflicting_rooms: Vec<String>,
}

impl std::fmt::Display for PlacementFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "room '{}': {}", self.room_id, self.reason)?;
        let b = &self.rejections;
        if b.overlap + b.outside_footprint + b.no_exterior + b.wrong_edge + b.disconnected_from_owner > 0 {
            write!(
                f,
                " (overlap: {}, outside: {}, no exterior: {}, wrong edge: {}, detached: {})",
                b.overlap, b.outside_footprint, b.no_exterior, b.wrong_edge, b.disconnected_from_owner
            )?;
        }
        if !b.conflicting_rooms.is_empty() {
            write!(f, " conflicts: {}", b.conflicting_rooms.join(", "))?;
        }
        Ok(())
    }
}

/// Terminal solve outcomes. Partial state is carried along so callers can
/// render or dump whatever the solver did manage to place.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error(transparent)]
    Intent(#[from] IntentError),

    #[error("failed to place required rooms: {}", room_ids.join(", "))]
    UnplacedRooms {
        room_ids: Vec<String>,
        partial: Box<PlanState>,
    },

    #[error("rooms unreachable from the entry: {}", room_ids.join(", "))]
    UnreachableRooms {
        room_ids: Vec<String>,
        partial: Box<PlanState>,
    },

    #[error("no valid corridor strip could connect the plan")]
    CorridorImpossible { partial: Box<PlanState> },

    #[error("placement invariant broken: {detail}")]
    InvariantBroken {
        detail: String,
        partial: Box<PlanState>,
    },
}

impl SolveError {
    /// The partially-built plan, when one exists.
    pub fn partial_state(&self) -> Option<&PlanState> {
        match self {
            SolveError::Intent(_) => None,
            SolveError::UnplacedRooms { partial, .. }
            | SolveError::UnreachableRooms { partial, .. }
            | SolveError::CorridorImpossible { partial }
            | SolveError::InvariantBroken { partial, .. } => Some(partial),
        }
    }
}
