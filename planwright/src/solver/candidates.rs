//! Candidate generation: concrete rectangles a room could occupy inside
//! a set of frame cells, ranked by a preliminary score. No exhaustive
//! grid scan happens here; corners, edge scans, and face-contact
//! positions against placed rooms cover everything placement cares
//! about while keeping the candidate count small.

use std::collections::HashSet;

use float_ord::FloatOrd;

use crate::{
    frame::Frame,
    geom::{snap, Rect, EPSILON, GRID},
    intent::RoomSpec,
    plan::PlanState,
};

/// Minimum shared-edge length that can later carry a door plus its
/// clearance. Adjacencies shorter than this are treated as unusable.
pub const MIN_DOOR_FRONTAGE: f64 = 1.0;

/// Width of the strip kept free in a cell when the room has attachments
/// (ensuite, closet) that still need to land next to it.
const ATTACHMENT_STRIP: f64 = 2.5;

/// How far an adjacency-driven candidate may poke outside its cell.
const CELL_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct Candidate {
    pub rect: Rect,
    pub cell: usize,
    pub score: f64,
}

pub struct GenContext<'a> {
    pub frame: &'a Frame,
    pub state: &'a PlanState,
    /// Rooms this candidate should end up sharing an edge with: the
    /// spec's own adjacency list expanded with placed siblings.
    pub required_adjacent: &'a [String],
    /// Area to keep free in the cell for attachments placed later.
    pub reserved_area: f64,
}

/// Generates up to `max` candidates for `room` against the given cells,
/// best preliminary score first, deduplicated at grid resolution.
pub fn generate(room: &RoomSpec, cells: &[usize], ctx: &GenContext, max: usize) -> Vec<Candidate> {
    let mut out: Vec<Candidate> = Vec::new();

    for &cell_idx in cells {
        let cell_rect = ctx.frame.cells[cell_idx].rect;
        for (w, h) in size_variants(room, &cell_rect, ctx.reserved_area) {
            for (rect, bonus) in positions(room, w, h, cell_idx, ctx) {
                if !placeable(&rect, cell_idx, ctx) {
                    continue;
                }
                let score = preliminary_score(room, &rect, bonus, cell_idx, ctx);
                out.push(Candidate {
                    rect,
                    cell: cell_idx,
                    score,
                });
            }
        }
    }

    out.sort_by(|a, b| FloatOrd(b.score).cmp(&FloatOrd(a.score)));

    // Grid-resolution dedup; the sort guarantees the best-scoring copy of
    // a rect survives.
    let mut seen = HashSet::new();
    out.retain(|c| seen.insert(rect_key(&c.rect)));
    out.truncate(max);
    out
}

fn rect_key(rect: &Rect) -> (i64, i64, i64, i64) {
    let q = |v: f64| (v / GRID).round() as i64;
    (q(rect.x1), q(rect.y1), q(rect.x2), q(rect.y2))
}

/// (width, height) pairs worth trying for this room in this cell.
fn size_variants(room: &RoomSpec, cell: &Rect, reserved_area: f64) -> Vec<(f64, f64)> {
    let mut target = room.target_area.unwrap_or(room.min_area * 1.1);

    // Leave room in the cell for attachments that follow this room.
    if reserved_area > 0.0 {
        let cap = cell.area() - ATTACHMENT_STRIP * cell.width().min(cell.height());
        if cap >= room.min_area {
            target = target.min(cap);
        }
    }

    let mut sizes: Vec<(f64, f64)> = Vec::new();

    if room.fill_cell {
        let w = clamp_dim(cell.width(), room.min_width, room.max_width);
        let h = clamp_dim(cell.height(), room.min_height, room.max_height);
        sizes.push((w, h));
        sizes.push((w * 0.9, h));
        sizes.push((w, h * 0.9));
    } else {
        for scale in [1.0, 0.95, 1.05] {
            for aspect in [1.0, 0.75, 1.33] {
                if let Some(bounds) = room.aspect {
                    if bounds.min.is_some_and(|min| aspect < min) || bounds.max.is_some_and(|max| aspect > max) {
                        continue;
                    }
                }
                let area = target * scale;
                let w = clamp_dim((area * aspect).sqrt(), room.min_width, room.max_width);
                let h = clamp_dim((area / aspect).sqrt(), room.min_height, room.max_height);
                if let Some(pair) = refit(room, cell, w, h) {
                    sizes.push(pair);
                }
                if let Some(pair) = refit(room, cell, h, w) {
                    sizes.push(pair);
                }
            }
        }
    }

    let mut seen = HashSet::new();
    sizes
        .into_iter()
        .map(|(w, h)| (snap(w), snap(h)))
        .filter(|&(w, h)| {
            w >= GRID
                && h >= GRID
                && w <= cell.width() + EPSILON
                && h <= cell.height() + EPSILON
                && room.min_width.map_or(true, |min| w + EPSILON >= min)
                && room.min_height.map_or(true, |min| h + EPSILON >= min)
        })
        .filter(|&(w, h)| seen.insert(((w / GRID).round() as i64, (h / GRID).round() as i64)))
        .collect()
}

fn clamp_dim(v: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    let v = match min {
        Some(min) => v.max(min),
        None => v,
    };
    match max {
        Some(max) => v.min(max),
        None => v,
    }
}

/// Shrinks an oversized side to the cell, recovering area on the other
/// side where the cell and the room's caps allow it. Returns None when
/// the result would drop below 95% of the room's minimum area.
fn refit(room: &RoomSpec, cell: &Rect, mut w: f64, mut h: f64) -> Option<(f64, f64)> {
    let floor_area = room.min_area * 0.95;
    w = clamp_dim(w, None, room.max_width).min(cell.width());
    h = clamp_dim(h, None, room.max_height).min(cell.height());
    if w * h < floor_area {
        let want = (floor_area / w).min(cell.height());
        h = clamp_dim(h.max(want), None, room.max_height).min(cell.height());
    }
    if w * h < floor_area {
        let want = (floor_area / h).min(cell.width());
        w = clamp_dim(w.max(want), None, room.max_width).min(cell.width());
    }
    (w * h + 1e-9 >= floor_area).then_some((w, h))
}

/// Strategic positions for one size in one cell, with their bonuses.
fn positions(room: &RoomSpec, w: f64, h: f64, cell_idx: usize, ctx: &GenContext) -> Vec<(Rect, f64)> {
    let cr = ctx.frame.cells[cell_idx].rect;
    let frame_rect = ctx.frame.rect;
    let mut out: Vec<(Rect, f64)> = Vec::new();
    let mut push = |x: f64, y: f64, bonus: f64| {
        out.push((Rect::from_corner_size(x, y, w, h), bonus));
    };

    // Cell corners. Full-cell-width rooms effectively choose only their
    // depth position, so alignment there is worth more.
    let corner_bonus = if (w - cr.width()).abs() <= EPSILON { 5.0 } else { 2.0 };
    push(cr.x1, cr.y1, corner_bonus);
    push(cr.x2 - w, cr.y1, corner_bonus);
    push(cr.x1, cr.y2 - h, corner_bonus);
    push(cr.x2 - w, cr.y2 - h, corner_bonus);

    // Scan along cell edges that sit on the footprint boundary.
    if room.must_touch_exterior {
        let step = 4.0 * GRID;
        let scan = |lo: f64, hi: f64| {
            let mut vs = Vec::new();
            let mut v = lo;
            while v <= hi + EPSILON {
                vs.push(v);
                v += step;
            }
            vs
        };
        if (cr.x1 - frame_rect.x1).abs() <= EPSILON {
            for y in scan(cr.y1, cr.y2 - h) {
                push(cr.x1, y, 5.0);
            }
        }
        if (cr.x2 - frame_rect.x2).abs() <= EPSILON {
            for y in scan(cr.y1, cr.y2 - h) {
                push(cr.x2 - w, y, 5.0);
            }
        }
        if (cr.y1 - frame_rect.y1).abs() <= EPSILON {
            for x in scan(cr.x1, cr.x2 - w) {
                push(x, cr.y1, 5.0);
            }
        }
        if (cr.y2 - frame_rect.y2).abs() <= EPSILON {
            for x in scan(cr.x1, cr.x2 - w) {
                push(x, cr.y2 - h, 5.0);
            }
        }
    }

    // Face-contact positions against placed rooms: required adjacencies
    // first (these carry the big bonus), then any placed room to keep
    // the plan gap-free.
    let clamp = |v: f64, lo: f64, hi: f64| v.max(lo).min(hi.max(lo));
    let face_positions = |other: &Rect, bonus: f64, push: &mut dyn FnMut(f64, f64, f64)| {
        let cy = clamp(other.center().y - h / 2.0, cr.y1, cr.y2 - h);
        let cx = clamp(other.center().x - w / 2.0, cr.x1, cr.x2 - w);
        push(other.x2, cy, bonus);
        push(other.x1 - w, cy, bonus);
        push(cx, other.y2, bonus);
        push(cx, other.y1 - h, bonus);
    };

    for id in ctx.required_adjacent {
        if let Some(other) = ctx.state.get(id) {
            face_positions(&other.rect, 20.0, &mut push);
        }
    }
    for other in ctx.state.rooms() {
        if !ctx.required_adjacent.contains(&other.id) {
            face_positions(&other.rect, 3.0, &mut push);
        }
    }

    out
}

/// Cheap geometric filters applied before scoring: inside the cell (with
/// the adjacency tolerance), inside the footprint, clear of placed rooms.
fn placeable(rect: &Rect, cell_idx: usize, ctx: &GenContext) -> bool {
    let cr = ctx.frame.cells[cell_idx].rect;
    let roomy_cell = Rect::new(
        cr.x1 - CELL_TOLERANCE,
        cr.y1 - CELL_TOLERANCE,
        cr.x2 + CELL_TOLERANCE,
        cr.y2 + CELL_TOLERANCE,
    );
    if !roomy_cell.contains_rect(rect) {
        return false;
    }
    if !ctx.frame.footprint.contains_rect(rect) {
        return false;
    }
    ctx.state.rooms().all(|other| !rect.overlaps(&other.rect))
}

fn preliminary_score(room: &RoomSpec, rect: &Rect, bonus: f64, cell_idx: usize, ctx: &GenContext) -> f64 {
    let cell = &ctx.frame.cells[cell_idx];
    let cr = cell.rect;
    let frame_rect = ctx.frame.rect;
    let mut score = bonus;

    let touches_w = (rect.x1 - cr.x1).abs() <= EPSILON;
    let touches_e = (rect.x2 - cr.x2).abs() <= EPSILON;
    let touches_s = (rect.y1 - cr.y1).abs() <= EPSILON;
    let touches_n = (rect.y2 - cr.y2).abs() <= EPSILON;

    if (touches_w || touches_e) && (touches_s || touches_n) {
        score += 3.0;
    }

    // Internal cell edges (band/depth boundaries) stitch neighbouring
    // rooms together; the footprint-side edges matter less here.
    let edge_value = |touches: bool, external: bool| {
        if !touches {
            0.0
        } else if external {
            1.0
        } else {
            4.0
        }
    };
    score += edge_value(touches_w, (cr.x1 - frame_rect.x1).abs() <= EPSILON);
    score += edge_value(touches_e, (cr.x2 - frame_rect.x2).abs() <= EPSILON);
    score += edge_value(touches_s, (cr.y1 - frame_rect.y1).abs() <= EPSILON);
    score += edge_value(touches_n, (cr.y2 - frame_rect.y2).abs() <= EPSILON);

    if room.must_touch_exterior && ctx.frame.footprint.touches_exterior(rect) {
        score += 5.0;
    }
    if let Some(edge) = room.must_touch_edge {
        if ctx.frame.footprint.touches_edge(rect, edge) {
            score += 8.0;
        }
    }

    let mut placed_targets = 0;
    let mut satisfied = 0;
    for id in ctx.required_adjacent {
        if let Some(other) = ctx.state.get(id) {
            placed_targets += 1;
            let shared = rect.shared_edge_len(&other.rect);
            if shared >= MIN_DOOR_FRONTAGE {
                score += 25.0 + shared;
                satisfied += 1;
            } else if shared >= EPSILON {
                // Touching but without room for a door is worse than not
                // touching at all.
                score -= 15.0;
            }
        }
    }
    if placed_targets > 0 && satisfied == 0 {
        score -= 30.0;
    }

    // fill_cell rooms are meant to take the whole cell; their size never
    // counts against them.
    if !room.fill_cell {
        let target = room.target_area.unwrap_or(room.min_area * 1.1);
        score -= 5.0 * (rect.area() - target).abs() / target;
    }

    let aspect = rect.aspect();
    if !(0.6..=1.67).contains(&aspect) {
        score -= 2.0;
    }

    score
}
