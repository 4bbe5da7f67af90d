//! The greedy placer: rooms are ranked by how constrained they are,
//! placed one at a time against the frame's cells, and repaired
//! afterwards by gap filling and swap passes. Per-room failures are
//! recorded, never thrown; the driver decides what is fatal.

pub mod candidates;
pub mod constraints;
pub mod corridor;
pub mod repair;
pub mod score;

#[cfg(test)]
mod test;

use float_ord::FloatOrd;
use log::{debug, info};

use crate::{
    errors::{FailureReason, PlacementFailure, RejectionBreakdown},
    frame::Frame,
    inspect::{InspectTrace, OrderingEntry, RoomTrace},
    intent::{NormalizedIntent, RoomSpec, RoomType},
    plan::{PlacedRoom, PlanState},
};

use candidates::{Candidate, GenContext};
use constraints::Rejection;
use score::ScoreContext;

/// Placement priority: rooms that anchor the plan (circulation, edge
/// pinned, heavily depended-on) go first, service rooms that can live
/// anywhere go last. Attached rooms are spliced in separately and never
/// ranked on their own.
pub fn priority(room: &RoomSpec, intent: &NormalizedIntent) -> f64 {
    let mut p = room.min_area;
    if room.is_circulation() {
        p += if room.has_exterior_door { 500.0 } else { 300.0 };
    }
    if room.must_touch_edge.is_some() {
        p += 100.0;
    }
    if room.must_touch_exterior {
        p += 50.0;
    }
    let circ_adjacent = room
        .adjacent_to
        .iter()
        .any(|t| intent.room(t).is_some_and(|r| r.is_circulation()));
    if circ_adjacent {
        p += 80.0;
    }
    p += 5.0 * room.adjacent_to.len() as f64;
    if !room.preferred_bands.is_empty() {
        p += 5.0;
    }
    if !room.preferred_depths.is_empty() {
        p += 5.0;
    }
    // Shared baths that know which hall serves them are easy to anchor;
    // floating wet rooms are better placed after everything that pins
    // the plan down.
    if matches!(room.kind, RoomType::Bath | RoomType::Laundry) && !intent.is_attached(&room.id) {
        if room.kind == RoomType::Bath && circ_adjacent {
            p += 90.0;
        } else if !circ_adjacent {
            p -= 20.0;
        }
    }
    p
}

/// Standalone rooms in descending priority order (stable on input order),
/// with each owner's attached rooms spliced immediately after it.
pub fn ordered_rooms<'a>(intent: &'a NormalizedIntent) -> Vec<&'a RoomSpec> {
    let mut standalone: Vec<&RoomSpec> = intent
        .rooms
        .iter()
        .filter(|r| !intent.is_attached(&r.id))
        .collect();
    standalone.sort_by(|a, b| FloatOrd(priority(b, intent)).cmp(&FloatOrd(priority(a, intent))));

    let mut out = Vec::with_capacity(intent.rooms.len());
    for room in standalone {
        out.push(room);
        out.extend(intent.attachments_of(&room.id));
    }
    out
}

/// Places every room, then runs the repair passes. The returned state
/// carries per-room failures for anything that would not fit.
pub fn place_rooms(
    intent: &NormalizedIntent,
    frame: &Frame,
    max_candidates: usize,
    mut trace: Option<&mut InspectTrace>,
) -> PlanState {
    let mut state = PlanState::new(intent.footprint.clone());
    let order = ordered_rooms(intent);
    state.unplaced = order.iter().map(|r| r.id.clone()).collect();

    if let Some(t) = trace.as_deref_mut() {
        t.ordering = order
            .iter()
            .map(|r| OrderingEntry {
                room_id: r.id.clone(),
                priority: priority(r, intent),
                attached_to: intent.owner_of(&r.id).map(str::to_string),
            })
            .collect();
    }

    let order_ids: Vec<String> = order.iter().map(|r| r.id.clone()).collect();
    for (idx, room) in order.iter().copied().enumerate() {
        place_one(room, &order_ids[idx + 1..], intent, frame, &mut state, max_candidates, trace.as_deref_mut());
    }

    let grown = repair::fill_gaps(&mut state, frame, intent);
    if grown > 0 {
        debug!("gap fill adjusted {grown} rect(s)");
    }
    let swapped = repair::swap_repair(&mut state, frame, intent);
    if swapped > 0 {
        debug!("swap repair exchanged {swapped} pair(s)");
    }

    info!(
        "placed {}/{} rooms",
        state.placed.len(),
        intent.rooms.len()
    );
    state
}

fn place_one(
    room: &RoomSpec,
    remaining: &[String],
    intent: &NormalizedIntent,
    frame: &Frame,
    state: &mut PlanState,
    max_candidates: usize,
    trace: Option<&mut InspectTrace>,
) {
    let preferred: Vec<usize> = frame
        .cells
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            c.inside_footprint
                && (room.preferred_bands.is_empty() || room.preferred_bands.contains(&c.band_id))
                && (room.preferred_depths.is_empty() || room.preferred_depths.contains(&c.depth_id))
        })
        .map(|(i, _)| i)
        .collect();
    let all: Vec<usize> = frame.usable_cells().map(|(i, _)| i).collect();

    // Expanded adjacency: the room's own targets plus every placed room
    // that wants one of the same targets. Two bedrooms that both ask for
    // the hall should also end up against each other, otherwise they
    // fence off frontage neither can use.
    let mut required: Vec<String> = room.adjacent_to.clone();
    for placed in state.rooms() {
        if placed.id == room.id || required.contains(&placed.id) {
            continue;
        }
        if let Some(spec) = intent.room(&placed.id) {
            if spec.adjacent_to.iter().any(|t| room.adjacent_to.contains(t)) {
                required.push(placed.id.clone());
            }
        }
    }

    // Area the cell still owes to this room's attachments.
    let reserved_area: f64 = intent
        .attachments_of(&room.id)
        .filter(|a| state.get(&a.id).is_none())
        .map(|a| a.min_area)
        .sum();

    let owner: Option<PlacedRoom> = intent.owner_of(&room.id).and_then(|oid| state.get(oid)).cloned();

    let mut breakdown = RejectionBreakdown::default();
    let mut generated = 0usize;
    let mut cells_considered = 0usize;
    let mut passing_scores: Vec<f64> = Vec::new();
    let mut best: Option<(Candidate, f64)> = None;

    let passes: [&[usize]; 2] = [&preferred, &all];
    for (pass_idx, cells) in passes.iter().enumerate() {
        if cells.is_empty() {
            continue;
        }
        // The all-cells pass only runs as a fallback, and not when it
        // would repeat the preferred pass verbatim.
        if pass_idx == 1 && (best.is_some() || preferred.len() == all.len()) {
            break;
        }
        cells_considered = cells.len();

        let ctx = GenContext {
            frame,
            state,
            required_adjacent: &required,
            reserved_area,
        };
        let cands = candidates::generate(room, cells, &ctx, max_candidates);
        generated += cands.len();

        let score_ctx = ScoreContext {
            intent,
            frame,
            state,
            remaining,
        };
        for cand in cands {
            match constraints::check_candidate(room, &cand.rect, intent, state, owner.as_ref()) {
                Err(rejection) => record_rejection(&mut breakdown, rejection),
                Ok(()) => {
                    let total = cand.score + score::score_candidate(room, &cand, &score_ctx);
                    passing_scores.push(total);
                    let better = best.as_ref().map_or(true, |(_, b)| total > *b);
                    if better {
                        best = Some((cand, total));
                    }
                }
            }
        }
    }

    passing_scores.sort_by(|a, b| FloatOrd(*b).cmp(&FloatOrd(*a)));
    passing_scores.truncate(3);

    let placed = match best {
        Some((cand, total)) => {
            let cell = &frame.cells[cand.cell];
            debug!(
                "placing '{}' at {} (score {:.1})",
                room.id, cand.rect, total
            );
            state.insert_room(PlacedRoom {
                id: room.id.clone(),
                rect: cand.rect,
                kind: room.kind,
                label: room.label().to_string(),
                band_id: Some(cell.band_id.clone()),
                depth_id: Some(cell.depth_id.clone()),
            });
            true
        }
        None => {
            let reason = if preferred.is_empty() && all.is_empty() {
                FailureReason::NoCells
            } else if generated == 0 {
                FailureReason::NoCandidates
            } else {
                FailureReason::AllRejected
            };
            let failure = PlacementFailure {
                room_id: room.id.clone(),
                reason,
                rejections: breakdown.clone(),
            };
            debug!("could not place '{}': {}", room.id, failure);
            state.record_failure(failure);
            false
        }
    };

    if let Some(t) = trace {
        t.rooms.push(RoomTrace {
            room_id: room.id.clone(),
            cells_considered,
            candidates_generated: generated,
            rejected_overlap: breakdown.overlap,
            rejected_outside: breakdown.outside_footprint,
            rejected_no_exterior: breakdown.no_exterior,
            rejected_wrong_edge: breakdown.wrong_edge,
            rejected_detached: breakdown.disconnected_from_owner,
            top_scores: passing_scores,
            placed,
        });
    }
}

fn record_rejection(breakdown: &mut RejectionBreakdown, rejection: Rejection) {
    match rejection {
        Rejection::Overlap(other) => {
            breakdown.overlap += 1;
            if !breakdown.conflicting_rooms.contains(&other) {
                breakdown.conflicting_rooms.push(other);
            }
        }
        Rejection::OutsideFootprint => breakdown.outside_footprint += 1,
        Rejection::NoExterior => breakdown.no_exterior += 1,
        Rejection::WrongEdge => breakdown.wrong_edge += 1,
        Rejection::DisconnectedFromOwner => breakdown.disconnected_from_owner += 1,
    }
}
