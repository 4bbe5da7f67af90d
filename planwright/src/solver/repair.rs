//! Post-placement repair passes. Gap filling grows rooms into dead space
//! until everything is pinned against a neighbour, the footprint, or its
//! own size cap; swap repair exchanges the rects of two similar-sized
//! rooms when doing so satisfies more adjacency requests.

use log::debug;

use crate::{
    frame::Frame,
    geom::{snap, Edge, Rect, EPSILON},
    intent::NormalizedIntent,
    plan::PlanState,
};

const MAX_FILL_PASSES: usize = 5;
const MAX_SWAP_PASSES: usize = 10;

/// Expands every placed room in each cardinal direction until blocked.
/// Runs to a fixed point (bounded) and returns the number of rects that
/// changed overall.
pub fn fill_gaps(state: &mut PlanState, frame: &Frame, intent: &NormalizedIntent) -> usize {
    let mut total_changed = 0;
    for pass in 0..MAX_FILL_PASSES {
        let mut changed = 0;
        let ids: Vec<String> = state.placed.keys().cloned().collect();
        for id in &ids {
            for direction in Edge::ALL {
                if let Some(rect) = extended_rect(state, frame, intent, id, direction) {
                    state.placed[id].rect = rect;
                    changed += 1;
                }
            }
        }
        total_changed += changed;
        if changed == 0 {
            debug!("gap fill converged after {} pass(es)", pass);
            break;
        }
    }
    total_changed
}

/// The room's rect grown in one direction, or None when it cannot move.
fn extended_rect(
    state: &PlanState,
    frame: &Frame,
    intent: &NormalizedIntent,
    id: &str,
    direction: Edge,
) -> Option<Rect> {
    let rect = state.get(id)?.rect;
    let spec = intent.room(id);
    let max_w = spec.and_then(|s| s.max_width);
    let max_h = spec.and_then(|s| s.max_height);
    let bounds = frame.rect;

    // A neighbour blocks expansion iff it lies strictly beyond the moving
    // face and overlaps the room's extent on the perpendicular axis.
    let mut limit = match direction {
        Edge::North => bounds.y2,
        Edge::South => bounds.y1,
        Edge::East => bounds.x2,
        Edge::West => bounds.x1,
    };
    for other in state.rooms() {
        if other.id == id {
            continue;
        }
        let o = &other.rect;
        match direction {
            Edge::North if o.y1 >= rect.y2 - EPSILON && rect.x_overlap(o) > EPSILON => limit = limit.min(o.y1),
            Edge::South if o.y2 <= rect.y1 + EPSILON && rect.x_overlap(o) > EPSILON => limit = limit.max(o.y2),
            Edge::East if o.x1 >= rect.x2 - EPSILON && rect.y_overlap(o) > EPSILON => limit = limit.min(o.x1),
            Edge::West if o.x2 <= rect.x1 + EPSILON && rect.y_overlap(o) > EPSILON => limit = limit.max(o.x2),
            _ => {}
        }
    }

    let grown = match direction {
        Edge::North => {
            let cap = max_h.map_or(limit, |h| limit.min(rect.y1 + h));
            Rect::new(rect.x1, rect.y1, rect.x2, snap(cap))
        }
        Edge::South => {
            let cap = max_h.map_or(limit, |h| limit.max(rect.y2 - h));
            Rect::new(rect.x1, snap(cap), rect.x2, rect.y2)
        }
        Edge::East => {
            let cap = max_w.map_or(limit, |w| limit.min(rect.x1 + w));
            Rect::new(rect.x1, rect.y1, snap(cap), rect.y2)
        }
        Edge::West => {
            let cap = max_w.map_or(limit, |w| limit.max(rect.x2 - w));
            Rect::new(snap(cap), rect.y1, rect.x2, rect.y2)
        }
    };

    if grown.area() <= rect.area() + EPSILON {
        return None;
    }
    if frame.footprint.is_polygon() && !frame.footprint.contains_rect(&grown) {
        return None;
    }
    Some(grown)
}

/// Exchanges the rects of similar-sized room pairs while each exchange
/// strictly increases the number of satisfied adjacencies and preserves
/// both rooms' edge constraints. Terminates when a full pass finds no
/// profitable swap.
pub fn swap_repair(state: &mut PlanState, frame: &Frame, intent: &NormalizedIntent) -> usize {
    let mut swaps = 0;
    for _ in 0..MAX_SWAP_PASSES {
        let mut swapped_this_pass = false;
        let ids: Vec<String> = state.placed.keys().cloned().collect();
        for i in 0..ids.len() {
            for j in i + 1..ids.len() {
                if try_swap(state, frame, intent, &ids[i], &ids[j]) {
                    swaps += 1;
                    swapped_this_pass = true;
                }
            }
        }
        if !swapped_this_pass {
            break;
        }
    }
    swaps
}

fn try_swap(state: &mut PlanState, frame: &Frame, intent: &NormalizedIntent, a: &str, b: &str) -> bool {
    let (rect_a, rect_b) = match (state.get(a), state.get(b)) {
        (Some(ra), Some(rb)) => (ra.rect, rb.rect),
        _ => return false,
    };

    let max_area = rect_a.area().max(rect_b.area());
    if (rect_a.area() - rect_b.area()).abs() > 0.2 * max_area {
        return false;
    }

    // Each room must still satisfy its own edge rules at the other's
    // position.
    for (id, rect) in [(a, rect_b), (b, rect_a)] {
        let Some(spec) = intent.room(id) else { return false };
        if let Some(edge) = spec.must_touch_edge {
            if !frame.footprint.touches_edge(&rect, edge) {
                return false;
            }
        }
        if spec.must_touch_exterior && !frame.footprint.touches_exterior(&rect) {
            return false;
        }
    }

    let before = satisfied_adjacencies(state, intent);
    let mut trial = state.clone();
    trial.placed[a].rect = rect_b;
    trial.placed[b].rect = rect_a;

    // Attachments must stay glued to their owners through any swap.
    for room_id in trial.placed.keys() {
        if let (Some(owner_id), Some(attached)) = (intent.owner_of(room_id), trial.get(room_id)) {
            if let Some(owner) = trial.get(owner_id) {
                if !attached.rect.adjacent(&owner.rect) {
                    return false;
                }
            }
        }
    }

    if satisfied_adjacencies(&trial, intent) <= before {
        return false;
    }

    for id in [a, b] {
        let center = trial.placed[id].rect.center();
        trial.placed[id].band_id = frame.band_at(center.x).map(|band| band.id.clone());
        trial.placed[id].depth_id = frame
            .depths
            .iter()
            .find(|d| center.y >= d.y1 && center.y <= d.y2)
            .map(|d| d.id.clone());
    }

    debug!("swap repair: exchanged '{}' and '{}'", a, b);
    *state = trial;
    true
}

fn satisfied_adjacencies(state: &PlanState, intent: &NormalizedIntent) -> usize {
    let mut count = 0;
    for room in state.rooms() {
        let Some(spec) = intent.room(&room.id) else { continue };
        for target in &spec.adjacent_to {
            if let Some(other) = state.get(target) {
                if room.rect.shared_edge_len(&other.rect) >= EPSILON {
                    count += 1;
                }
            }
        }
    }
    count
}
