//! Soft scoring: the per-candidate score added on top of the generator's
//! preliminary ranking, and the plan-level score reported with a solved
//! layout. Neither can reject a candidate; hard rules already ran.

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    frame::Frame,
    geom::{Edge, EPSILON},
    intent::{NormalizedIntent, RoomSpec, RoomType},
    plan::PlanState,
};

use super::candidates::{Candidate, MIN_DOOR_FRONTAGE};

pub struct ScoreContext<'a> {
    pub intent: &'a NormalizedIntent,
    pub frame: &'a Frame,
    pub state: &'a PlanState,
    /// Ids of rooms still waiting to be placed after the current one, in
    /// placement order.
    pub remaining: &'a [String],
}

pub fn score_candidate(room: &RoomSpec, cand: &Candidate, ctx: &ScoreContext) -> f64 {
    let w = &ctx.intent.weights;
    let cell = &ctx.frame.cells[cand.cell];
    let rect = &cand.rect;
    let mut score = 0.0;

    if room.preferred_bands.iter().any(|b| *b == cell.band_id) {
        score += 5.0 * w.zone;
    }
    if room.preferred_depths.iter().any(|d| *d == cell.depth_id) {
        score += 5.0 * w.zone;
    }

    for target in &room.adjacent_to {
        if let Some(other) = ctx.state.get(target) {
            let shared = rect.shared_edge_len(&other.rect);
            if shared >= EPSILON {
                score += (5.0 + shared) * w.adjacency;
            }
        }
    }
    for target in &room.avoid_adjacent_to {
        if let Some(other) = ctx.state.get(target) {
            if rect.adjacent(&other.rect) {
                score -= 10.0 * w.adjacency;
            }
        }
    }

    if room.kind.wants_daylight() {
        if ctx.frame.footprint.touches_exterior(rect) {
            score += 3.0 * w.glazing;
        }
        if let Some(garden) = ctx.frame.garden_edge {
            if ctx.frame.footprint.touches_edge(rect, garden) {
                score += 5.0 * w.glazing;
            }
        }
    }

    if matches!(room.kind, RoomType::Bath | RoomType::Ensuite) {
        for other in ctx.state.rooms() {
            if matches!(other.kind, RoomType::Bath | RoomType::Ensuite) && rect.adjacent(&other.rect) {
                score += 5.0 * w.bath_cluster;
            }
        }
    }

    let aspect = rect.aspect();
    if !(0.5..=2.0).contains(&aspect) {
        score -= 3.0;
    }

    if !room.fill_cell {
        let target_area = room.target_area.unwrap_or(room.min_area * 1.1);
        let deviation = (rect.area() - target_area).abs() / target_area;
        if deviation > 0.2 {
            score -= 5.0 * deviation;
        }
    }
    if let Some(max_area) = room.max_area {
        if rect.area() > max_area {
            score -= 10.0 * (rect.area() - max_area) / max_area;
        }
    }

    score + hall_lookahead(room, cand, ctx)
}

/// Penalizes candidates that would eat up the frontage along the hall's
/// band boundary when rooms placed later still need their own slice of
/// it for a door. Without this a large early room (typically the master
/// bedroom) grabs the whole hall edge and later rooms end up adjacent to
/// nothing they can open into.
fn hall_lookahead(room: &RoomSpec, cand: &Candidate, ctx: &ScoreContext) -> f64 {
    let hall = match ctx
        .state
        .rooms()
        .find(|r| ctx.intent.room(&r.id).is_some_and(|spec| spec.is_circulation()))
    {
        Some(hall) => hall,
        None => return 0.0,
    };

    let hall_band = match ctx.frame.band_at(hall.rect.center().x) {
        Some(b) => b,
        None => return 0.0,
    };
    let cand_band_id = &ctx.frame.cells[cand.cell].band_id;
    if *cand_band_id == hall_band.id {
        return 0.0;
    }
    let cand_band = match ctx.frame.band(cand_band_id) {
        Some(b) => b,
        None => return 0.0,
    };
    let neighbours =
        (cand_band.x2 - hall_band.x1).abs() <= EPSILON || (cand_band.x1 - hall_band.x2).abs() <= EPSILON;
    if !neighbours {
        return 0.0;
    }

    // Frontage accounting happens along the hall's y-span.
    let span_len = hall.rect.height();
    let span = (hall.rect.y1, hall.rect.y2);
    let y_claim = |y1: f64, y2: f64| (y2.min(span.1) - y1.max(span.0)).max(0.0);

    let mut used = 0.0;
    for other in ctx.state.rooms() {
        if other.id == hall.id {
            continue;
        }
        if ctx
            .frame
            .band_at(other.rect.center().x)
            .is_some_and(|b| b.id == cand_band.id)
        {
            used += y_claim(other.rect.y1, other.rect.y2);
        }
    }
    let claimed = y_claim(cand.rect.y1, cand.rect.y2);

    let future_rooms = ctx
        .remaining
        .iter()
        .filter_map(|id| ctx.intent.room(id))
        .filter(|spec| {
            spec.adjacent_to.iter().any(|t| *t == hall.id)
                && spec.preferred_bands.iter().any(|b| *b == cand_band.id)
                && !spec.is_attachment()
        })
        .count() as f64;

    let remaining_edge = span_len - used - claimed;
    let needed = future_rooms * ctx.intent.weights.hall_frontage_per_room;
    if remaining_edge < needed {
        -10.0 * (needed - remaining_edge)
    } else {
        0.0
    }
}

/// Final plan quality. Components are stored already weighted, so the
/// total is their plain sum and a zero weight removes a component.
#[derive(Debug, Clone, Serialize)]
pub struct PlanScore {
    pub total: f64,
    pub components: IndexMap<String, f64>,
}

pub fn score_plan(state: &PlanState, intent: &NormalizedIntent, frame: &Frame) -> PlanScore {
    let w = &intent.weights;
    let mut components = IndexMap::new();

    // Zone preference satisfaction: per preference axis of each placed
    // room, did the room land in one of its preferred slices?
    let mut zone_axes = 0u32;
    let mut zone_hits = 0u32;
    for room in state.rooms() {
        let Some(spec) = intent.room(&room.id) else { continue };
        if !spec.preferred_bands.is_empty() {
            zone_axes += 1;
            let hit = frame
                .band_at(room.rect.center().x)
                .is_some_and(|b| spec.preferred_bands.iter().any(|p| *p == b.id));
            zone_hits += hit as u32;
        }
        if !spec.preferred_depths.is_empty() {
            zone_axes += 1;
            let cy = room.rect.center().y;
            let hit = frame
                .depths
                .iter()
                .find(|d| cy >= d.y1 && cy <= d.y2)
                .is_some_and(|d| spec.preferred_depths.iter().any(|p| *p == d.id));
            zone_hits += hit as u32;
        }
    }
    let zone_ratio = if zone_axes > 0 {
        zone_hits as f64 / zone_axes as f64
    } else {
        1.0
    };
    components.insert("zone".into(), zone_ratio * 10.0 * w.zone);

    // Adjacency satisfaction over pairs where both rooms were placed.
    let mut adj_wanted = 0u32;
    let mut adj_got = 0u32;
    for room in state.rooms() {
        let Some(spec) = intent.room(&room.id) else { continue };
        for target in &spec.adjacent_to {
            if let Some(other) = state.get(target) {
                adj_wanted += 1;
                adj_got += (room.rect.shared_edge_len(&other.rect) >= MIN_DOOR_FRONTAGE * 0.9) as u32;
            }
        }
    }
    let adj_ratio = if adj_wanted > 0 {
        adj_got as f64 / adj_wanted as f64
    } else {
        1.0
    };
    components.insert("adjacency".into(), adj_ratio * 10.0 * w.adjacency);

    // Circulation area: 8-12% of the footprint is ideal, above 15% is
    // actively penalized.
    let footprint_area = frame.rect.width() * frame.rect.height();
    let hall_area: f64 = state
        .rooms()
        .filter(|r| intent.room(&r.id).map_or(r.kind.category() == crate::intent::RoomCategory::Circulation, |s| s.is_circulation()))
        .map(|r| r.rect.area())
        .sum();
    let hall_frac = hall_area / footprint_area;
    let hall_value = if (0.08..=0.12).contains(&hall_frac) {
        10.0
    } else if hall_frac < 0.08 {
        10.0 * hall_frac / 0.08
    } else if hall_frac <= 0.15 {
        10.0 - (hall_frac - 0.12) / 0.03 * 5.0
    } else {
        (5.0 - (hall_frac - 0.15) * 100.0).max(0.0)
    };
    components.insert("hall_area".into(), hall_value * w.hall_area);

    // Exterior glazing for daylight rooms, with the garden edge counting
    // extra.
    let daylight: Vec<_> = state.rooms().filter(|r| r.kind.wants_daylight()).collect();
    let glazing_value = if daylight.is_empty() {
        10.0
    } else {
        let exterior = daylight
            .iter()
            .filter(|r| frame.footprint.touches_exterior(&r.rect))
            .count() as f64;
        let garden = match frame.garden_edge {
            Some(edge) => daylight
                .iter()
                .filter(|r| frame.footprint.touches_edge(&r.rect, edge))
                .count() as f64,
            None => 0.0,
        };
        (exterior * 8.0 + garden * 2.0) / daylight.len() as f64
    };
    components.insert("glazing".into(), glazing_value * w.glazing);

    // Bathroom clustering: adjacent bath pairs out of all bath pairs.
    let baths: Vec<_> = state
        .rooms()
        .filter(|r| matches!(r.kind, RoomType::Bath | RoomType::Ensuite))
        .collect();
    let bath_value = if baths.len() < 2 {
        10.0
    } else {
        let mut pairs = 0u32;
        let mut adjacent = 0u32;
        for i in 0..baths.len() {
            for j in i + 1..baths.len() {
                pairs += 1;
                adjacent += baths[i].rect.adjacent(&baths[j].rect) as u32;
            }
        }
        adjacent as f64 / pairs as f64 * 10.0
    };
    components.insert("bath_cluster".into(), bath_value * w.bath_cluster);

    // Compactness saturates at 95% coverage; past that nothing improves.
    let coverage = state.placed_area() / footprint_area;
    components.insert("compactness".into(), (coverage / 0.95).min(1.0) * 10.0 * w.compactness);

    // Fewer distinct rooms per exterior edge reads as calmer elevations.
    let mut breaks = 0u32;
    for edge in Edge::ALL {
        let count = state
            .rooms()
            .filter(|r| frame.footprint.touches_edge(&r.rect, edge))
            .count() as u32;
        breaks += count.saturating_sub(1);
    }
    components.insert(
        "wall_breaks".into(),
        (10.0 - 2.0 * breaks as f64).max(0.0) * w.wall_breaks,
    );

    PlanScore {
        total: components.values().sum(),
        components,
    }
}
