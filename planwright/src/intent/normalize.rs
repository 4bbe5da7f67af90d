use std::collections::{HashMap, HashSet};

use log::debug;

use super::{
    access::{AccessRule, AccessSubject, AccessTable},
    BandSpec, DepthSpec, LayoutIntent, RoomSpec, RoomType, Units, Weights,
};
use crate::{
    errors::IntentError,
    geom::{Edge, Footprint, Point, Polygon, Rect},
    intent::HardRules,
};

/// Opening widths with every default applied, in meters.
#[derive(Debug, Clone, Copy)]
pub struct OpeningDefaults {
    pub door_width: f64,
    pub window_width: f64,
    pub exterior_door_width: f64,
    pub corridor_width: f64,
}

impl Default for OpeningDefaults {
    fn default() -> Self {
        OpeningDefaults {
            door_width: 0.9,
            window_width: 1.2,
            exterior_door_width: 1.0,
            corridor_width: 1.2,
        }
    }
}

/// An intent after validation, unit conversion and defaulting. This is
/// the only form the frame builder and solver accept; downstream code
/// never has to ask whether a field was user-supplied or defaulted.
#[derive(Debug, Clone)]
pub struct NormalizedIntent {
    pub footprint: Footprint,
    pub bands: Vec<BandSpec>,
    pub depths: Vec<DepthSpec>,
    pub front_edge: Edge,
    pub garden_edge: Option<Edge>,
    pub defaults: OpeningDefaults,
    pub rooms: Vec<RoomSpec>,
    pub hard: HardRules,
    pub weights: Weights,
    pub access: AccessTable,
    owner_of: HashMap<String, String>,
}

impl NormalizedIntent {
    pub fn room(&self, id: &str) -> Option<&RoomSpec> {
        self.rooms.iter().find(|r| r.id == id)
    }

    /// Owner of an attached room (ensuite, closet, or single-adjacency
    /// bath tied to a bedroom).
    pub fn owner_of(&self, id: &str) -> Option<&str> {
        self.owner_of.get(id).map(String::as_str)
    }

    pub fn is_attached(&self, id: &str) -> bool {
        self.owner_of.contains_key(id)
    }

    /// Attached rooms of an owner, in input order.
    pub fn attachments_of<'a>(&'a self, owner: &str) -> impl Iterator<Item = &'a RoomSpec> + 'a {
        let owner = owner.to_string();
        self.rooms
            .iter()
            .filter(move |r| self.owner_of.get(&r.id).map(String::as_str) == Some(owner.as_str()))
    }
}

/// Validates an intent and produces its normalized form. Runs exactly
/// once per solve, so everything downstream can assume meters, known
/// references, and a resolved access table.
pub fn normalize(intent: LayoutIntent) -> Result<NormalizedIntent, IntentError> {
    let LayoutIntent {
        units,
        footprint,
        mut bands,
        mut depths,
        front_edge,
        garden_edge,
        defaults,
        mut rooms,
        hard,
        access_rule_preset,
        access_rules,
        weights,
    } = intent;

    if rooms.is_empty() {
        return Err(IntentError::NoRooms);
    }

    let linear = match units {
        Units::M => 1.0,
        Units::Cm => 0.01,
    };
    let square = linear * linear;

    // Footprint: exactly one variant, positive extent.
    let footprint = match (footprint.rect, footprint.polygon) {
        (Some([x1, y1, x2, y2]), None) => {
            let rect = Rect::new(x1 * linear, y1 * linear, x2 * linear, y2 * linear);
            if rect.width() < crate::geom::GRID || rect.height() < crate::geom::GRID {
                return Err(IntentError::BadFootprint("rect has no extent".into()));
            }
            Footprint::Rect(rect)
        }
        (None, Some(points)) => {
            if points.len() < 3 {
                return Err(IntentError::BadFootprint(format!(
                    "polygon needs at least 3 points, got {}",
                    points.len()
                )));
            }
            let poly = Polygon::new(points.iter().map(|p| Point::new(p[0] * linear, p[1] * linear)).collect());
            let bounds = poly.bounding_rect();
            if bounds.width() < crate::geom::GRID || bounds.height() < crate::geom::GRID {
                return Err(IntentError::BadFootprint("polygon has no extent".into()));
            }
            Footprint::Polygon(poly)
        }
        (Some(_), Some(_)) => {
            return Err(IntentError::BadFootprint("both rect and polygon given".into()));
        }
        (None, None) => {
            return Err(IntentError::BadFootprint("neither rect nor polygon given".into()));
        }
    };

    // Room ids must be unique before reference checks make sense.
    let mut seen = HashSet::new();
    for room in &rooms {
        if !seen.insert(room.id.as_str()) {
            return Err(IntentError::DuplicateRoomId(room.id.clone()));
        }
        if room.min_area * square <= 0.0 {
            return Err(IntentError::NonPositiveArea(room.id.clone()));
        }
    }

    let ids: HashSet<&str> = rooms.iter().map(|r| r.id.as_str()).collect();
    for room in &rooms {
        for target in room.adjacent_to.iter().chain(room.avoid_adjacent_to.iter()) {
            if target == &room.id {
                return Err(IntentError::SelfAdjacency(room.id.clone()));
            }
            if !ids.contains(target.as_str()) {
                return Err(IntentError::UnknownRoomReference {
                    room: room.id.clone(),
                    target: target.clone(),
                });
            }
        }
        // needs_access_from entries may be ids, types, or categories.
        for target in &room.needs_access_from {
            if !ids.contains(target.as_str()) && AccessSubject::parse(target).is_err() {
                return Err(IntentError::UnknownRoomReference {
                    room: room.id.clone(),
                    target: target.clone(),
                });
            }
        }
    }

    if units == Units::Cm {
        for band in &mut bands {
            scale_opt(&mut band.min_width, linear);
            scale_opt(&mut band.target_width, linear);
            scale_opt(&mut band.max_width, linear);
        }
        for depth in &mut depths {
            scale_opt(&mut depth.min_depth, linear);
            scale_opt(&mut depth.target_depth, linear);
            scale_opt(&mut depth.max_depth, linear);
        }
        for room in &mut rooms {
            room.min_area *= square;
            scale_opt(&mut room.target_area, square);
            scale_opt(&mut room.max_area, square);
            scale_opt(&mut room.min_width, linear);
            scale_opt(&mut room.max_width, linear);
            scale_opt(&mut room.min_height, linear);
            scale_opt(&mut room.max_height, linear);
        }
    }

    let base = OpeningDefaults::default();
    let defaults = OpeningDefaults {
        door_width: defaults.door_width.map_or(base.door_width, |w| w * linear),
        window_width: defaults.window_width.map_or(base.window_width, |w| w * linear),
        exterior_door_width: defaults.exterior_door_width.map_or(base.exterior_door_width, |w| w * linear),
        corridor_width: defaults.corridor_width.map_or(base.corridor_width, |w| w * linear),
    };

    // Ownership edges for attached rooms. Recording these up front keeps
    // the room data flat: no room ever references an owner struct, only
    // an id, so the ensuite -> bedroom -> ensuite cycle never exists as
    // object references.
    let mut owner_of = HashMap::new();
    for room in &rooms {
        if room.is_attachment() {
            let owner = room
                .adjacent_to
                .first()
                .ok_or_else(|| IntentError::AttachmentWithoutOwner(room.id.clone()))?;
            owner_of.insert(room.id.clone(), owner.clone());
        } else if room.kind == RoomType::Bath && !room.is_ensuite && room.adjacent_to.len() == 1 {
            let target = &room.adjacent_to[0];
            if rooms.iter().any(|r| &r.id == target && r.kind == RoomType::Bedroom) {
                owner_of.insert(room.id.clone(), target.clone());
            }
        }
    }

    let access = if !access_rules.is_empty() {
        let rules = access_rules
            .iter()
            .map(AccessRule::try_from_spec)
            .collect::<Result<Vec<_>, _>>()?;
        AccessTable::from_rules(rules)
    } else {
        AccessTable::from_preset(access_rule_preset.unwrap_or(super::AccessPreset::OpenPlan))
    };

    debug!(
        "normalized intent: {} rooms, {} bands, {} depths, {} attachments",
        rooms.len(),
        bands.len(),
        depths.len(),
        owner_of.len()
    );

    Ok(NormalizedIntent {
        footprint,
        bands,
        depths,
        front_edge,
        garden_edge,
        defaults,
        rooms,
        hard,
        weights,
        access,
        owner_of,
    })
}

fn scale_opt(value: &mut Option<f64>, factor: f64) {
    if let Some(v) = value.as_mut() {
        *v *= factor;
    }
}
