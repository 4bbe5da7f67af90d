//! Builders shared by the module tests. Intents are tedious to spell
//! out field by field; these helpers keep the actual test bodies about
//! the behavior under test.

use crate::{
    geom::Edge,
    intent::{
        BandSpec, DefaultsSpec, FootprintSpec, HardRules, LayoutIntent, RoomSpec, RoomType, Units, Weights,
    },
};

pub(crate) fn room(id: &str, kind: RoomType, min_area: f64) -> RoomSpec {
    RoomSpec {
        id: id.into(),
        kind,
        label: None,
        min_area,
        target_area: None,
        max_area: None,
        min_width: None,
        max_width: None,
        min_height: None,
        max_height: None,
        aspect: None,
        fill_cell: false,
        preferred_bands: Vec::new(),
        preferred_depths: Vec::new(),
        must_touch_exterior: false,
        must_touch_edge: None,
        adjacent_to: Vec::new(),
        avoid_adjacent_to: Vec::new(),
        needs_access_from: Vec::new(),
        is_circulation: false,
        has_exterior_door: false,
        is_ensuite: false,
    }
}

pub(crate) fn band(id: &str, target_width: f64) -> BandSpec {
    BandSpec {
        id: id.into(),
        min_width: None,
        target_width: Some(target_width),
        max_width: None,
    }
}

pub(crate) fn intent(rect: [f64; 4], bands: Vec<BandSpec>, rooms: Vec<RoomSpec>) -> LayoutIntent {
    LayoutIntent {
        units: Units::M,
        footprint: FootprintSpec {
            rect: Some(rect),
            polygon: None,
        },
        bands,
        depths: Vec::new(),
        front_edge: Edge::South,
        garden_edge: None,
        defaults: DefaultsSpec::default(),
        rooms,
        hard: HardRules::default(),
        access_rule_preset: None,
        access_rules: Vec::new(),
        weights: Weights::default(),
    }
}
