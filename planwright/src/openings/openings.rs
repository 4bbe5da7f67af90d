//! Opening placement: derives wall segments from the placed rooms, puts
//! the entry door on the front edge, cuts interior doors where the
//! access rules and the single-door rule allow, and glazes exterior
//! walls of the rooms that want daylight.

#[cfg(test)]
mod test;

use float_ord::FloatOrd;
use log::debug;

use crate::{
    frame::Frame,
    geom::{Edge, Footprint, Rect, EPSILON},
    inspect::{DoorDecision, InspectTrace},
    intent::{AccessSubject, NormalizedIntent, RoomSpec, RoomType},
    plan::{OpeningKind, PlacedOpening, PlanState},
    reach,
};

/// Clearance required on each side of a door leaf.
pub const DOOR_CLEARANCE: f64 = 0.2;

/// Margin required around a window.
const WINDOW_MARGIN: f64 = 0.6;

/// Generated rooms bypass access rules entirely.
const GENERATED_PREFIX: &str = "auto_";

/// One wall segment owned by a room. Shared walls carry the neighbour's
/// id and exist twice, once from each owner's perspective.
#[derive(Debug, Clone)]
pub struct Wall {
    pub id: usize,
    pub room_id: String,
    pub edge: Edge,
    /// Range along the wall's axis (x for horizontal walls, y for
    /// vertical ones) and the fixed cross-axis coordinate.
    pub start: f64,
    pub end: f64,
    pub at: f64,
    pub shared_with: Option<String>,
    pub is_exterior: bool,
}

impl Wall {
    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    fn mid(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Splits every room edge into shared and private wall segments. Walls
/// are emitted in placement order, edges in N/S/E/W order, so ids are
/// stable across runs.
pub fn derive_walls(state: &PlanState) -> Vec<Wall> {
    let mut walls = Vec::new();
    let mut next_id = 0usize;

    for room in state.rooms() {
        for edge in Edge::ALL {
            let (start, end, at) = room.rect.edge_segment(edge);

            // Overlapping collinear segments of other rooms' facing edges.
            let mut covered: Vec<(f64, f64, String)> = Vec::new();
            for other in state.rooms() {
                if other.id == room.id {
                    continue;
                }
                let (o_start, o_end, o_at) = other.rect.edge_segment(edge.opposite());
                if (o_at - at).abs() > EPSILON {
                    continue;
                }
                let lo = start.max(o_start);
                let hi = end.min(o_end);
                if hi - lo > EPSILON {
                    covered.push((lo, hi, other.id.clone()));
                }
            }
            covered.sort_by(|a, b| FloatOrd(a.0).cmp(&FloatOrd(b.0)));

            let mut emit = |s: f64, e: f64, shared: Option<String>| {
                if e - s <= EPSILON {
                    return;
                }
                let is_exterior = shared.is_none() && segment_on_exterior(&state.footprint, edge, at, s, e);
                walls.push(Wall {
                    id: next_id,
                    room_id: room.id.clone(),
                    edge,
                    start: s,
                    end: e,
                    at,
                    shared_with: shared,
                    is_exterior,
                });
                next_id += 1;
            };

            let mut cursor = start;
            for (lo, hi, other_id) in covered {
                emit(cursor, lo, None);
                emit(lo, hi, Some(other_id));
                cursor = cursor.max(hi);
            }
            emit(cursor, end, None);
        }
    }
    walls
}

/// Whether a wall segment lies on the footprint's outer boundary.
fn segment_on_exterior(footprint: &Footprint, edge: Edge, at: f64, start: f64, end: f64) -> bool {
    match footprint {
        Footprint::Rect(r) => {
            let boundary = match edge {
                Edge::North => r.y2,
                Edge::South => r.y1,
                Edge::East => r.x2,
                Edge::West => r.x1,
            };
            (at - boundary).abs() <= EPSILON
        }
        Footprint::Polygon(p) => {
            let strip = if edge.is_horizontal() {
                Rect::new(start, at, end, at)
            } else {
                Rect::new(at, start, at, end)
            };
            p.rect_touches_boundary(&strip)
        }
    }
}

/// Replaces the plan's openings from scratch. Invoked after placement
/// and again after corridor insertion, so it must be a pure function of
/// the placed rooms.
pub fn place_openings(
    state: &mut PlanState,
    frame: &Frame,
    intent: &NormalizedIntent,
    mut trace: Option<&mut InspectTrace>,
) {
    state.openings.clear();
    if let Some(t) = trace.as_deref_mut() {
        t.doors.clear();
    }

    let walls = derive_walls(state);

    place_entry_door(state, frame, intent, &walls);
    place_interior_doors(state, intent, &walls, trace.as_deref_mut());
    place_windows(state, frame, intent, &walls);
}

fn place_entry_door(state: &mut PlanState, frame: &Frame, intent: &NormalizedIntent, walls: &[Wall]) {
    let Some(entry_id) = reach::select_entry(state, intent, frame) else {
        return;
    };

    // Prefer the longest exterior wall on the front edge; fall back to
    // any exterior wall so the entry always gets its door.
    let wall = walls
        .iter()
        .filter(|w| w.room_id == entry_id && w.is_exterior && w.edge == frame.front_edge)
        .max_by_key(|w| FloatOrd(w.len()))
        .or_else(|| {
            walls
                .iter()
                .filter(|w| w.room_id == entry_id && w.is_exterior)
                .max_by_key(|w| FloatOrd(w.len()))
        });

    let Some(wall) = wall else {
        debug!("entry room '{entry_id}' has no exterior wall; skipping entry door");
        return;
    };

    let entry_rect = state.placed[&entry_id].rect;
    state.openings.push(PlacedOpening {
        kind: OpeningKind::Door,
        room_id: entry_id,
        edge: wall.edge,
        position: edge_fraction(&entry_rect, wall.edge, wall.mid()),
        width: intent.defaults.exterior_door_width,
        is_exterior: true,
        connects_to: None,
    });
}

/// Fraction of the room's own edge at which an absolute along-axis
/// coordinate sits.
fn edge_fraction(rect: &Rect, edge: Edge, coordinate: f64) -> f64 {
    let (start, end, _) = rect.edge_segment(edge);
    if end - start <= EPSILON {
        return 0.5;
    }
    ((coordinate - start) / (end - start)).clamp(0.0, 1.0)
}

#[derive(Debug, Clone)]
struct DoorCandidate {
    wall_idx: usize,
    a: String,
    b: String,
    shared_len: f64,
}

fn place_interior_doors(
    state: &mut PlanState,
    intent: &NormalizedIntent,
    walls: &[Wall],
    mut trace: Option<&mut InspectTrace>,
) {
    let door_width = intent.defaults.door_width;
    let min_len = door_width + 2.0 * DOOR_CLEARANCE;

    let mut record = |a: &str, b: &str, verdict: &str| {
        if let Some(t) = trace.as_deref_mut() {
            t.doors.push(DoorDecision {
                room_a: a.to_string(),
                room_b: b.to_string(),
                verdict: verdict.to_string(),
            });
        }
    };

    // One candidate per unordered room pair, keeping the longest shared
    // wall. Walls appear once per owner, so skip the mirrored copy.
    let mut candidates: Vec<DoorCandidate> = Vec::new();
    for (idx, wall) in walls.iter().enumerate() {
        let Some(partner) = &wall.shared_with else { continue };
        if let Some(existing) = candidates
            .iter_mut()
            .find(|c| pair_matches(c, &wall.room_id, partner))
        {
            if wall.len() > existing.shared_len {
                existing.shared_len = wall.len();
                if existing.a == wall.room_id {
                    existing.wall_idx = idx;
                }
            }
            continue;
        }
        candidates.push(DoorCandidate {
            wall_idx: idx,
            a: wall.room_id.clone(),
            b: partner.clone(),
            shared_len: wall.len(),
        });
    }

    // Access filtering.
    let mut allowed: Vec<DoorCandidate> = Vec::new();
    for cand in candidates {
        if cand.shared_len < min_len {
            record(&cand.a, &cand.b, "shared wall too short");
            continue;
        }
        if !door_allowed(&cand.a, &cand.b, intent) {
            record(&cand.a, &cand.b, "blocked by access rules");
            continue;
        }
        allowed.push(cand);
    }

    // Single-door service rooms pick exactly one partner each; a pair
    // survives only if every restricted endpoint chose it.
    let mut chosen: Vec<(String, usize)> = Vec::new();
    for room in state.rooms() {
        let Some(spec) = intent.room(&room.id) else { continue };
        if !single_door_room(spec) {
            continue;
        }
        let pick = allowed
            .iter()
            .enumerate()
            .filter(|(_, c)| c.a == room.id || c.b == room.id)
            .min_by_key(|(_, c)| {
                let partner = if c.a == room.id { &c.b } else { &c.a };
                (partner_rank(spec, partner, intent), FloatOrd(-c.shared_len))
            });
        if let Some((idx, cand)) = pick {
            let partner = if cand.a == room.id { &cand.b } else { &cand.a };
            debug!("single-door room '{}' keeps its door to '{}'", room.id, partner);
            chosen.push((room.id.clone(), idx));
        }
    }

    for (idx, cand) in allowed.iter().enumerate() {
        let mut ok = true;
        for id in [&cand.a, &cand.b] {
            let restricted = intent.room(id).map_or(false, single_door_room);
            if restricted && !chosen.iter().any(|(r, i)| r == id && *i == idx) {
                record(&cand.a, &cand.b, &format!("'{id}' keeps its single door elsewhere"));
                ok = false;
                break;
            }
        }
        if !ok {
            continue;
        }

        let wall = &walls[cand.wall_idx];
        let owner_rect = state.placed[&wall.room_id].rect;
        record(&cand.a, &cand.b, "door placed");
        state.openings.push(PlacedOpening {
            kind: OpeningKind::Door,
            room_id: wall.room_id.clone(),
            edge: wall.edge,
            position: edge_fraction(&owner_rect, wall.edge, wall.mid()),
            width: door_width,
            is_exterior: false,
            connects_to: wall.shared_with.clone(),
        });
    }
}

fn pair_matches(cand: &DoorCandidate, a: &str, b: &str) -> bool {
    (cand.a == a && cand.b == b) || (cand.a == b && cand.b == a)
}

/// Rooms restricted to a single interior door: baths (shared or
/// ensuite), closets, laundries, and anything flagged as an ensuite.
/// The flag only changes which partner wins, not the door count.
fn single_door_room(spec: &RoomSpec) -> bool {
    matches!(
        spec.kind,
        RoomType::Bath | RoomType::Closet | RoomType::Laundry | RoomType::Ensuite
    ) || spec.is_ensuite
}

/// Preference order for a single-door room's one partner. Attachments
/// want their owner, shared service rooms want circulation, then the
/// kitchen, then living space.
fn partner_rank(spec: &RoomSpec, partner_id: &str, intent: &NormalizedIntent) -> u8 {
    if intent.owner_of(&spec.id) == Some(partner_id) {
        return 0;
    }
    let Some(partner) = intent.room(partner_id) else {
        // Generated rooms (the corridor) count as circulation.
        return 1;
    };
    match partner.kind {
        _ if partner.is_circulation() => 1,
        RoomType::Kitchen => 2,
        RoomType::Living => 3,
        _ => 4,
    }
}

/// The access filter: a door is allowed unless both sides' rules forbid
/// it. Generated rooms are always allowed, and per-room
/// `needs_access_from` lists override the table for their room.
fn door_allowed(a: &str, b: &str, intent: &NormalizedIntent) -> bool {
    if a.starts_with(GENERATED_PREFIX) || b.starts_with(GENERATED_PREFIX) {
        return true;
    }
    let (Some(spec_a), Some(spec_b)) = (intent.room(a), intent.room(b)) else {
        return true;
    };

    if !needs_access_ok(spec_a, spec_b) || !needs_access_ok(spec_b, spec_a) {
        return false;
    }

    intent.access.door_allowed(spec_a.kind, spec_b.kind)
}

fn needs_access_ok(room: &RoomSpec, partner: &RoomSpec) -> bool {
    if room.needs_access_from.is_empty() {
        return true;
    }
    room.needs_access_from.iter().any(|entry| {
        entry == &partner.id
            || AccessSubject::parse(entry).map_or(false, |subject| subject.matches(partner.kind))
    })
}

fn place_windows(state: &mut PlanState, frame: &Frame, intent: &NormalizedIntent, walls: &[Wall]) {
    let window_width = intent.defaults.window_width;
    let mut new_windows: Vec<PlacedOpening> = Vec::new();

    for room in state.rooms() {
        if !room.kind.gets_windows() {
            continue;
        }
        let rect = room.rect;
        let mut glazed_edges: Vec<Edge> = Vec::new();

        for wall in walls.iter().filter(|w| w.room_id == room.id && w.is_exterior) {
            if wall.len() < window_width + WINDOW_MARGIN {
                continue;
            }
            new_windows.push(PlacedOpening {
                kind: OpeningKind::Window,
                room_id: room.id.clone(),
                edge: wall.edge,
                position: edge_fraction(&rect, wall.edge, wall.mid()),
                width: window_width,
                is_exterior: true,
                connects_to: None,
            });
            if !glazed_edges.contains(&wall.edge) {
                glazed_edges.push(wall.edge);
            }
        }

        // Living rooms and bedrooms touching the garden edge get a window
        // there when their primary glazing ended up on a different edge.
        if let Some(garden) = frame.garden_edge {
            let garden_worthy = matches!(room.kind, RoomType::Living | RoomType::Bedroom);
            if garden_worthy && !glazed_edges.is_empty() && !glazed_edges.contains(&garden) {
                let garden_wall = walls
                    .iter()
                    .filter(|w| w.room_id == room.id && w.is_exterior && w.edge == garden)
                    .max_by_key(|w| FloatOrd(w.len()));
                if let Some(wall) = garden_wall {
                    if wall.len() >= window_width + WINDOW_MARGIN {
                        new_windows.push(PlacedOpening {
                            kind: OpeningKind::Window,
                            room_id: room.id.clone(),
                            edge: garden,
                            position: edge_fraction(&rect, garden, wall.mid()),
                            width: window_width,
                            is_exterior: true,
                            connects_to: None,
                        });
                    }
                }
            }
        }
    }

    state.openings.extend(new_windows);
}
