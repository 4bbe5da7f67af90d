//! Concrete plan state: rooms that have been given rectangles, the
//! openings cut into their walls, and the bookkeeping for rooms that
//! could not be placed. Owned and mutated by exactly one solve.

use indexmap::IndexMap;
use serde::{ser::SerializeStruct, Serialize};

use crate::{
    errors::PlacementFailure,
    geom::{Edge, Footprint, Rect},
    intent::RoomType,
};

#[derive(Debug, Clone, Serialize)]
pub struct PlacedRoom {
    pub id: String,
    pub rect: Rect,
    #[serde(rename = "type")]
    pub kind: RoomType,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpeningKind {
    Door,
    Window,
}

/// A door or window on one room's edge. `position` is the fractional
/// offset of the opening's center along that edge (0 at the west/south
/// end). Doors between two rooms name the partner in `connects_to`.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOpening {
    pub kind: OpeningKind,
    pub room_id: String,
    pub edge: Edge,
    pub position: f64,
    pub width: f64,
    pub is_exterior: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connects_to: Option<String>,
}

impl PlacedOpening {
    pub fn is_interior_door(&self) -> bool {
        self.kind == OpeningKind::Door && !self.is_exterior
    }

    /// Whether this interior door involves the given room on either side.
    pub fn connects(&self, room_id: &str) -> bool {
        self.room_id == room_id || self.connects_to.as_deref() == Some(room_id)
    }
}

/// The mutable working state of a solve. Rooms are added monotonically in
/// placement order (swap repair may exchange two rects but never removes
/// an entry), then the state is frozen for opening placement and
/// validation.
#[derive(Debug, Clone)]
pub struct PlanState {
    pub footprint: Footprint,
    pub placed: IndexMap<String, PlacedRoom>,
    pub unplaced: Vec<String>,
    pub openings: Vec<PlacedOpening>,
    pub corridor: Option<Rect>,
    pub failures: Vec<PlacementFailure>,
}

impl PlanState {
    pub fn new(footprint: Footprint) -> Self {
        PlanState {
            footprint,
            placed: IndexMap::new(),
            unplaced: Vec::new(),
            openings: Vec::new(),
            corridor: None,
            failures: Vec::new(),
        }
    }

    pub fn insert_room(&mut self, room: PlacedRoom) {
        self.unplaced.retain(|id| id != &room.id);
        self.placed.insert(room.id.clone(), room);
    }

    pub fn get(&self, id: &str) -> Option<&PlacedRoom> {
        self.placed.get(id)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &PlacedRoom> {
        self.placed.values()
    }

    pub fn interior_doors(&self) -> impl Iterator<Item = &PlacedOpening> {
        self.openings.iter().filter(|o| o.is_interior_door())
    }

    pub fn interior_door_count(&self, room_id: &str) -> usize {
        self.interior_doors().filter(|o| o.connects(room_id)).count()
    }

    /// Total floor area of all placed rooms.
    pub fn placed_area(&self) -> f64 {
        self.rooms().map(|r| r.rect.area()).sum()
    }

    pub fn record_failure(&mut self, failure: PlacementFailure) {
        self.failures.push(failure);
    }
}

impl Serialize for PlanState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // The wire format flattens the room map into an ordered array; the
        // ids live inside the room objects already.
        let mut state = serializer.serialize_struct("plan", 6)?;
        state.serialize_field("footprint", &self.footprint)?;
        state.serialize_field("rooms", &self.placed.values().collect::<Vec<_>>())?;
        state.serialize_field("openings", &self.openings)?;
        state.serialize_field("corridor", &self.corridor)?;
        state.serialize_field("unplaced", &self.unplaced)?;
        state.serialize_field("failures", &self.failures)?;
        state.end()
    }
}
