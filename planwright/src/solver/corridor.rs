//! Corridor generation. When placement leaves the plan in more than one
//! adjacency component, a straight corridor strip is inserted to stitch
//! the pieces together: first across the middle of the footprint, then
//! through the widest clean gap between room pairs.

use log::{debug, info};

use crate::{
    frame::Frame,
    geom::{Rect, EPSILON},
    intent::NormalizedIntent,
    plan::PlanState,
};

/// Connected components of the placed rooms under shared-edge adjacency,
/// in placement order.
pub fn connected_components(state: &PlanState) -> Vec<Vec<String>> {
    let ids: Vec<&str> = state.placed.keys().map(String::as_str).collect();
    let mut component_of: Vec<Option<usize>> = vec![None; ids.len()];
    let mut components: Vec<Vec<String>> = Vec::new();

    for start in 0..ids.len() {
        if component_of[start].is_some() {
            continue;
        }
        let comp_idx = components.len();
        let mut members = Vec::new();
        let mut stack = vec![start];
        component_of[start] = Some(comp_idx);
        while let Some(i) = stack.pop() {
            members.push(ids[i].to_string());
            let rect = state.placed[ids[i]].rect;
            for (j, other_id) in ids.iter().enumerate() {
                if component_of[j].is_none() && rect.adjacent(&state.placed[*other_id].rect) {
                    component_of[j] = Some(comp_idx);
                    stack.push(j);
                }
            }
        }
        components.push(members);
    }
    components
}

/// Finds a corridor strip connecting a fragmented plan, or None when no
/// strategy produces a valid one.
pub fn generate_corridor(state: &PlanState, frame: &Frame, intent: &NormalizedIntent) -> Option<Rect> {
    let width = intent.defaults.corridor_width;
    let components = connected_components(state);

    for candidate in horizontal_candidates(state, frame, width)
        .into_iter()
        .chain(vertical_candidates(state, frame, width))
        .chain(pairwise_candidates(state, width))
    {
        if corridor_valid(&candidate, state, frame, intent, &components) {
            info!("corridor: inserting strip {}", candidate);
            return Some(candidate);
        }
        debug!("corridor: rejected strip {}", candidate);
    }
    None
}

/// Full-width horizontal strips: one at the footprint midline, one at the
/// midpoint of every inter-room gap tall enough to hold the corridor.
fn horizontal_candidates(state: &PlanState, frame: &Frame, width: f64) -> Vec<Rect> {
    let mut ys = vec![frame.rect.center().y];
    ys.extend(gap_midpoints(
        state.rooms().map(|r| (r.rect.y1, r.rect.y2)).collect(),
        width,
    ));
    ys.into_iter()
        .map(|y| Rect::new(frame.rect.x1, y - width / 2.0, frame.rect.x2, y + width / 2.0))
        .collect()
}

fn vertical_candidates(state: &PlanState, frame: &Frame, width: f64) -> Vec<Rect> {
    let mut xs = vec![frame.rect.center().x];
    xs.extend(gap_midpoints(
        state.rooms().map(|r| (r.rect.x1, r.rect.x2)).collect(),
        width,
    ));
    xs.into_iter()
        .map(|x| Rect::new(x - width / 2.0, frame.rect.y1, x + width / 2.0, frame.rect.y2))
        .collect()
}

/// Midpoints of the gaps between merged occupied intervals.
fn gap_midpoints(mut intervals: Vec<(f64, f64)>, min_gap: f64) -> Vec<f64> {
    if intervals.is_empty() {
        return Vec::new();
    }
    intervals.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    let mut merged: Vec<(f64, f64)> = vec![intervals[0]];
    for (lo, hi) in intervals.into_iter().skip(1) {
        let last = merged.last_mut().expect("merged starts non-empty");
        if lo <= last.1 + EPSILON {
            last.1 = last.1.max(hi);
        } else {
            merged.push((lo, hi));
        }
    }
    merged
        .windows(2)
        .filter(|w| w[1].0 - w[0].1 >= min_gap)
        .map(|w| (w[0].1 + w[1].0) / 2.0)
        .collect()
}

/// Corridors filling the clean gap between two specific rooms, where the
/// facing extents overlap enough to make the strip useful.
fn pairwise_candidates(state: &PlanState, width: f64) -> Vec<Rect> {
    let rooms: Vec<_> = state.rooms().collect();
    let mut out = Vec::new();
    for i in 0..rooms.len() {
        for j in i + 1..rooms.len() {
            let (a, b) = (&rooms[i].rect, &rooms[j].rect);

            // Vertical gap between stacked rooms -> horizontal corridor.
            let (lower, upper) = if a.y2 <= b.y1 { (a, b) } else { (b, a) };
            if upper.y1 - lower.y2 >= width && a.x_overlap(b) >= 2.0 * width {
                out.push(Rect::new(
                    a.x1.max(b.x1),
                    lower.y2,
                    a.x2.min(b.x2),
                    upper.y1,
                ));
            }

            // Horizontal gap between side-by-side rooms -> vertical corridor.
            let (left, right) = if a.x2 <= b.x1 { (a, b) } else { (b, a) };
            if right.x1 - left.x2 >= width && a.y_overlap(b) >= 2.0 * width {
                out.push(Rect::new(
                    left.x2,
                    a.y1.max(b.y1),
                    right.x1,
                    a.y2.min(b.y2),
                ));
            }
        }
    }
    out
}

/// Shrinks a room rect so it no longer overlaps the corridor strip,
/// keeping whichever of the four possible clips preserves the most
/// area. The corridor validity check already guarantees the loss is
/// small.
pub fn carve(rect: &Rect, corridor: &Rect) -> Rect {
    if !rect.overlaps(corridor) {
        return *rect;
    }
    let clips = [
        Rect::new(rect.x1, rect.y1, rect.x2, corridor.y1.max(rect.y1)),
        Rect::new(rect.x1, corridor.y2.min(rect.y2), rect.x2, rect.y2),
        Rect::new(rect.x1, rect.y1, corridor.x1.max(rect.x1), rect.y2),
        Rect::new(corridor.x2.min(rect.x2), rect.y1, rect.x2, rect.y2),
    ];
    clips
        .into_iter()
        .max_by(|a, b| {
            a.area()
                .partial_cmp(&b.area())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(*rect)
}

/// A corridor is acceptable when it stays inside the footprint, only
/// skims the rooms it crosses rather than gutting one, and actually
/// reaches more than one of the fragments it is meant to join.
fn corridor_valid(
    corridor: &Rect,
    state: &PlanState,
    frame: &Frame,
    intent: &NormalizedIntent,
    components: &[Vec<String>],
) -> bool {
    if !frame.footprint.contains_rect(corridor) {
        return false;
    }
    let corridor_area = corridor.area();
    if corridor_area <= EPSILON {
        return false;
    }
    for room in state.rooms() {
        let circulation = intent.room(&room.id).map_or(false, |s| s.is_circulation());
        if circulation {
            continue;
        }
        if corridor.overlap_area(&room.rect) > 0.10 * corridor_area {
            return false;
        }
    }

    let touched = components
        .iter()
        .filter(|members| {
            members.iter().any(|id| {
                let rect = &state.placed[id].rect;
                corridor.adjacent(rect) || corridor.overlaps(rect)
            })
        })
        .count();
    touched >= 2
}
