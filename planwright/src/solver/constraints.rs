//! Hard constraint checks. A candidate that fails any of these is
//! discarded outright; the rejection kind is counted so placement
//! failures can report what actually went wrong.

use crate::{
    geom::Rect,
    intent::{NormalizedIntent, RoomSpec},
    plan::{PlacedRoom, PlanState},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// Interior overlap with an already-placed room.
    Overlap(String),
    OutsideFootprint,
    NoExterior,
    WrongEdge,
    DisconnectedFromOwner,
}

/// Checks a candidate rect against every hard rule that applies to the
/// room. The cheapest checks run first; the first violation wins.
pub fn check_candidate(
    room: &RoomSpec,
    rect: &Rect,
    intent: &NormalizedIntent,
    state: &PlanState,
    owner: Option<&PlacedRoom>,
) -> Result<(), Rejection> {
    if intent.hard.no_overlap {
        for other in state.rooms() {
            if rect.overlaps(&other.rect) {
                return Err(Rejection::Overlap(other.id.clone()));
            }
        }
    }

    if intent.hard.inside_footprint && !intent.footprint.contains_rect(rect) {
        return Err(Rejection::OutsideFootprint);
    }

    if room.must_touch_exterior && !intent.footprint.touches_exterior(rect) {
        return Err(Rejection::NoExterior);
    }

    if let Some(edge) = room.must_touch_edge {
        if !intent.footprint.touches_edge(rect, edge) {
            return Err(Rejection::WrongEdge);
        }
    }

    // Attached rooms must share an edge with their owner once the owner
    // is placed. Before the owner exists there is nothing to check.
    if let Some(owner) = owner {
        if !rect.adjacent(&owner.rect) {
            return Err(Rejection::DisconnectedFromOwner);
        }
    }

    Ok(())
}
