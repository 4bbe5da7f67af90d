//! The layout intent: everything the caller tells us about the building
//! before any geometry exists. Intents arrive as JSON (the surface DSL is
//! compiled to this form upstream) and pass through [`normalize`] exactly
//! once; the solver only ever sees a [`NormalizedIntent`].

pub mod access;
mod normalize;

#[cfg(test)]
mod test;

use serde::{Deserialize, Serialize};

pub use access::{AccessPreset, AccessRule, AccessSubject, AccessTable};
pub use normalize::{normalize, NormalizedIntent, OpeningDefaults};

use crate::geom::Edge;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    M,
    Cm,
}

/// Raw footprint as it appears in intent JSON. Exactly one of the two
/// fields must be present; the normalizer enforces this.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FootprintSpec {
    /// `[x1, y1, x2, y2]`
    pub rect: Option<[f64; 4]>,
    /// Point loop, at least three `[x, y]` pairs.
    pub polygon: Option<Vec<[f64; 2]>>,
}

/// Vertical slice request. Widths are distributed proportionally from the
/// targets and clamped by min/max; omitted targets share evenly.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandSpec {
    pub id: String,
    pub min_width: Option<f64>,
    pub target_width: Option<f64>,
    pub max_width: Option<f64>,
}

/// Horizontal slice request, analogous to [`BandSpec`] along y.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepthSpec {
    pub id: String,
    pub min_depth: Option<f64>,
    pub target_depth: Option<f64>,
    pub max_depth: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AspectRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Broad architectural role a room type falls into. Access rules and the
/// plan score both work at this granularity when no per-type rule exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomCategory {
    Circulation,
    Private,
    Public,
    Service,
}

impl TryFrom<&str> for RoomCategory {
    type Error = String;
    fn try_from(input: &str) -> Result<Self, Self::Error> {
        match input.to_ascii_lowercase().as_str() {
            "circulation" => Ok(RoomCategory::Circulation),
            "private" => Ok(RoomCategory::Private),
            "public" => Ok(RoomCategory::Public),
            "service" => Ok(RoomCategory::Service),
            other => Err(format!("unrecognized room category '{other}'")),
        }
    }
}

impl std::fmt::Display for RoomCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RoomCategory::Circulation => "circulation",
            RoomCategory::Private => "private",
            RoomCategory::Public => "public",
            RoomCategory::Service => "service",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Bedroom,
    Bath,
    Kitchen,
    Dining,
    Living,
    Office,
    Garage,
    Laundry,
    Hall,
    Corridor,
    Foyer,
    Stairwell,
    Closet,
    Ensuite,
    Utility,
    Storage,
    Other,
}

impl RoomType {
    pub fn category(self) -> RoomCategory {
        match self {
            RoomType::Hall | RoomType::Corridor | RoomType::Foyer | RoomType::Stairwell => RoomCategory::Circulation,
            RoomType::Bedroom | RoomType::Bath | RoomType::Ensuite | RoomType::Closet | RoomType::Office => {
                RoomCategory::Private
            }
            RoomType::Kitchen | RoomType::Dining | RoomType::Living => RoomCategory::Public,
            RoomType::Garage | RoomType::Laundry | RoomType::Utility | RoomType::Storage | RoomType::Other => {
                RoomCategory::Service
            }
        }
    }

    /// Living spaces get the exterior glazing bonus in the plan score.
    pub fn wants_daylight(self) -> bool {
        matches!(self, RoomType::Living | RoomType::Bedroom | RoomType::Office | RoomType::Dining)
    }

    /// Room types that receive windows on their exterior walls.
    pub fn gets_windows(self) -> bool {
        matches!(
            self,
            RoomType::Living | RoomType::Bedroom | RoomType::Office | RoomType::Dining | RoomType::Kitchen
        )
    }
}

impl TryFrom<&str> for RoomType {
    type Error = String;
    fn try_from(input: &str) -> Result<Self, Self::Error> {
        match input.to_ascii_lowercase().as_str() {
            "bedroom" => Ok(RoomType::Bedroom),
            "bath" | "bathroom" => Ok(RoomType::Bath),
            "kitchen" => Ok(RoomType::Kitchen),
            "dining" => Ok(RoomType::Dining),
            "living" => Ok(RoomType::Living),
            "office" => Ok(RoomType::Office),
            "garage" => Ok(RoomType::Garage),
            "laundry" => Ok(RoomType::Laundry),
            "hall" => Ok(RoomType::Hall),
            "corridor" => Ok(RoomType::Corridor),
            "foyer" => Ok(RoomType::Foyer),
            "stairwell" => Ok(RoomType::Stairwell),
            "closet" => Ok(RoomType::Closet),
            "ensuite" => Ok(RoomType::Ensuite),
            "utility" => Ok(RoomType::Utility),
            "storage" => Ok(RoomType::Storage),
            "other" => Ok(RoomType::Other),
            other => Err(format!("unrecognized room type '{other}'")),
        }
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RoomType::Bedroom => "bedroom",
            RoomType::Bath => "bath",
            RoomType::Kitchen => "kitchen",
            RoomType::Dining => "dining",
            RoomType::Living => "living",
            RoomType::Office => "office",
            RoomType::Garage => "garage",
            RoomType::Laundry => "laundry",
            RoomType::Hall => "hall",
            RoomType::Corridor => "corridor",
            RoomType::Foyer => "foyer",
            RoomType::Stairwell => "stairwell",
            RoomType::Closet => "closet",
            RoomType::Ensuite => "ensuite",
            RoomType::Utility => "utility",
            RoomType::Storage => "storage",
            RoomType::Other => "other",
        };
        write!(f, "{name}")
    }
}

/// One requested room with all of its constraints. Everything except `id`,
/// `type` and `min_area` is optional; the normalizer fills in defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RoomType,
    pub label: Option<String>,

    pub min_area: f64,
    pub target_area: Option<f64>,
    pub max_area: Option<f64>,
    pub min_width: Option<f64>,
    pub max_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_height: Option<f64>,
    pub aspect: Option<AspectRange>,

    /// Grow to the full cell instead of sizing from area.
    #[serde(default)]
    pub fill_cell: bool,

    #[serde(default)]
    pub preferred_bands: Vec<String>,
    #[serde(default)]
    pub preferred_depths: Vec<String>,

    #[serde(default)]
    pub must_touch_exterior: bool,
    pub must_touch_edge: Option<Edge>,

    #[serde(default)]
    pub adjacent_to: Vec<String>,
    #[serde(default)]
    pub avoid_adjacent_to: Vec<String>,
    /// Restricts which rooms may hold this room's door. Entries are room
    /// ids, types, or categories.
    #[serde(default)]
    pub needs_access_from: Vec<String>,

    #[serde(default)]
    pub is_circulation: bool,
    #[serde(default)]
    pub has_exterior_door: bool,
    #[serde(default)]
    pub is_ensuite: bool,
}

impl RoomSpec {
    pub fn is_circulation(&self) -> bool {
        self.is_circulation || self.kind.category() == RoomCategory::Circulation
    }

    /// Attached rooms are forced adjacent to a single owner and get placed
    /// immediately after it: ensuites, closets, and baths whose only
    /// adjacency is their owner bedroom.
    pub fn is_attachment(&self) -> bool {
        self.is_ensuite || matches!(self.kind, RoomType::Ensuite | RoomType::Closet)
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// Opening widths applied when individual rooms don't override them. The
/// raw intake form; concrete values live in [`OpeningDefaults`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsSpec {
    pub door_width: Option<f64>,
    pub window_width: Option<f64>,
    pub exterior_door_width: Option<f64>,
    pub corridor_width: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HardRules {
    #[serde(default = "default_true")]
    pub no_overlap: bool,
    #[serde(default = "default_true")]
    pub inside_footprint: bool,
    #[serde(default = "default_true")]
    pub all_rooms_reachable: bool,
}

impl Default for HardRules {
    fn default() -> Self {
        HardRules {
            no_overlap: true,
            inside_footprint: true,
            all_rooms_reachable: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Multipliers for the soft score components. All default into the 1-3
/// range; zero disables a component entirely.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Weights {
    pub zone: f64,
    pub adjacency: f64,
    pub hall_area: f64,
    pub glazing: f64,
    pub bath_cluster: f64,
    pub compactness: f64,
    pub wall_breaks: f64,
    /// Meters of hall frontage the look-ahead reserves per future room
    /// that still needs direct hall adjacency.
    pub hall_frontage_per_room: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            zone: 2.0,
            adjacency: 3.0,
            hall_area: 1.0,
            glazing: 2.0,
            bath_cluster: 1.0,
            compactness: 2.0,
            wall_breaks: 1.0,
            hall_frontage_per_room: 2.0,
        }
    }
}

/// The complete solver input. See the crate docs for the full field
/// reference; this struct is the JSON schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutIntent {
    #[serde(default)]
    pub units: Units,
    pub footprint: FootprintSpec,
    #[serde(default)]
    pub bands: Vec<BandSpec>,
    #[serde(default)]
    pub depths: Vec<DepthSpec>,
    #[serde(default = "default_front_edge")]
    pub front_edge: Edge,
    pub garden_edge: Option<Edge>,
    #[serde(default)]
    pub defaults: DefaultsSpec,
    pub rooms: Vec<RoomSpec>,
    #[serde(default)]
    pub hard: HardRules,
    pub access_rule_preset: Option<AccessPreset>,
    #[serde(default)]
    pub access_rules: Vec<access::AccessRuleSpec>,
    #[serde(default)]
    pub weights: Weights,
}

fn default_front_edge() -> Edge {
    Edge::South
}
