//! The solve driver: normalize, frame, place, repair, open, connect,
//! validate, score. Per-room failures accumulate inside the plan state;
//! only unplaced rooms or unreachable rooms make the whole solve fail.

use log::{info, warn};
use serde::{ser::SerializeStruct, Serialize};

use crate::{
    errors::SolveError,
    frame::Frame,
    inspect::{InspectTrace, ReachTrace},
    intent::{normalize, LayoutIntent, NormalizedIntent, RoomType},
    openings,
    plan::{PlacedRoom, PlanState},
    reach,
    solver::{self, corridor, score::PlanScore},
};

#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Candidate budget per room per generation pass.
    pub max_candidates_per_room: usize,
    /// Record an [`InspectTrace`] alongside the result.
    pub inspect: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        SolveOptions {
            max_candidates_per_room: 15,
            inspect: false,
        }
    }
}

/// A successful solve: the frozen plan, its score, and the trace when
/// one was requested.
#[derive(Debug, Clone)]
pub struct Solution {
    pub state: PlanState,
    pub score: PlanScore,
    pub trace: Option<InspectTrace>,
}

impl Serialize for Solution {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // The trace goes to stderr, never into exported JSON.
        let mut state = serializer.serialize_struct("solution", 2)?;
        state.serialize_field("plan", &self.state)?;
        state.serialize_field("score", &self.score)?;
        state.end()
    }
}

pub fn solve(intent: LayoutIntent, options: &SolveOptions) -> Result<Solution, SolveError> {
    let intent = normalize(intent)?;
    solve_normalized(&intent, options)
}

/// Same as [`solve`] for callers that already normalized (the CLI's
/// `check` path normalizes without solving).
pub fn solve_normalized(intent: &NormalizedIntent, options: &SolveOptions) -> Result<Solution, SolveError> {
    let frame = Frame::build(intent);
    let mut trace = options.inspect.then(InspectTrace::default);

    let mut state = solver::place_rooms(intent, &frame, options.max_candidates_per_room, trace.as_mut());

    if intent.hard.all_rooms_reachable && !state.unplaced.is_empty() {
        return Err(SolveError::UnplacedRooms {
            room_ids: state.unplaced.clone(),
            partial: Box::new(state),
        });
    }

    verify_invariants(&state, intent)?;

    openings::place_openings(&mut state, &frame, intent, trace.as_mut());

    // A fragmented plan gets one corridor attempt. The corridor enters
    // the plan as a real room so doors can attach to it and the door
    // graph can traverse it.
    if corridor::connected_components(&state).len() > 1 {
        match corridor::generate_corridor(&state, &frame, intent) {
            Some(strip) => {
                for id in state.placed.keys().cloned().collect::<Vec<_>>() {
                    let carved = corridor::carve(&state.placed[&id].rect, &strip);
                    state.placed[&id].rect = carved;
                }
                state.corridor = Some(strip);
                state.insert_room(PlacedRoom {
                    id: "auto_corridor".into(),
                    rect: strip,
                    kind: RoomType::Corridor,
                    label: "corridor".into(),
                    band_id: None,
                    depth_id: None,
                });
                openings::place_openings(&mut state, &frame, intent, trace.as_mut());
            }
            None => {
                warn!("plan is fragmented and no corridor strip fits");
                if intent.hard.all_rooms_reachable {
                    return Err(SolveError::CorridorImpossible {
                        partial: Box::new(state),
                    });
                }
            }
        }
    }

    let report = reach::check_reachability(&state, intent, &frame);
    if let Some(t) = trace.as_mut() {
        t.reachability = Some(ReachTrace {
            entry: report.entry.clone(),
            reachable: report.reachable.clone(),
            unreachable: report.unreachable.clone(),
        });
    }
    if intent.hard.all_rooms_reachable && !report.unreachable.is_empty() {
        return Err(SolveError::UnreachableRooms {
            room_ids: report.unreachable,
            partial: Box::new(state),
        });
    }

    let score = solver::score::score_plan(&state, intent, &frame);
    info!(
        "solved: {} rooms, {} openings, score {:.1}",
        state.placed.len(),
        state.openings.len(),
        score.total
    );

    Ok(Solution { state, score, trace })
}

/// Post-placement sanity: these can only fail on a solver bug, so they
/// surface as their own error kind instead of a placement failure.
fn verify_invariants(state: &PlanState, intent: &NormalizedIntent) -> Result<(), SolveError> {
    let rooms: Vec<_> = state.rooms().collect();

    if intent.hard.no_overlap {
        for i in 0..rooms.len() {
            for j in i + 1..rooms.len() {
                if rooms[i].rect.overlaps(&rooms[j].rect) {
                    return Err(SolveError::InvariantBroken {
                        detail: format!("rooms '{}' and '{}' overlap", rooms[i].id, rooms[j].id),
                        partial: Box::new(state.clone()),
                    });
                }
            }
        }
    }

    if intent.hard.inside_footprint {
        for room in &rooms {
            if !intent.footprint.contains_rect(&room.rect) {
                return Err(SolveError::InvariantBroken {
                    detail: format!("room '{}' extends outside the footprint", room.id),
                    partial: Box::new(state.clone()),
                });
            }
        }
    }

    Ok(())
}
