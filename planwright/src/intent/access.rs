//! Access rules decide which pairs of rooms may be connected by an
//! interior door. Rules are keyed by room type or by category; three
//! presets cover the common cases and explicit rules override them.

use once_cell::sync::Lazy;
use serde::Deserialize;

use super::{RoomCategory, RoomType};
use crate::errors::IntentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPreset {
    OpenPlan,
    Traditional,
    PrivacyFocused,
}

/// Raw rule as written in intent JSON; subjects are strings naming a room
/// type or a category.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessRuleSpec {
    pub subject: String,
    pub accessible_from: Option<Vec<String>>,
    pub can_lead_to: Option<Vec<String>>,
}

/// A rule subject: either one concrete room type or a whole category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessSubject {
    Type(RoomType),
    Category(RoomCategory),
}

impl AccessSubject {
    pub fn parse(input: &str) -> Result<Self, IntentError> {
        if let Ok(kind) = RoomType::try_from(input) {
            return Ok(AccessSubject::Type(kind));
        }
        RoomCategory::try_from(input)
            .map(AccessSubject::Category)
            .map_err(IntentError::BadAccessRule)
    }

    pub fn matches(&self, kind: RoomType) -> bool {
        match self {
            AccessSubject::Type(t) => *t == kind,
            AccessSubject::Category(c) => kind.category() == *c,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccessRule {
    pub subject: AccessSubject,
    pub accessible_from: Option<Vec<AccessSubject>>,
    pub can_lead_to: Option<Vec<AccessSubject>>,
}

impl AccessRule {
    fn new(subject: AccessSubject, accessible_from: &[AccessSubject]) -> Self {
        AccessRule {
            subject,
            accessible_from: Some(accessible_from.to_vec()),
            can_lead_to: None,
        }
    }

    pub fn try_from_spec(spec: &AccessRuleSpec) -> Result<Self, IntentError> {
        let parse_all = |names: &Option<Vec<String>>| -> Result<Option<Vec<AccessSubject>>, IntentError> {
            names
                .as_ref()
                .map(|v| v.iter().map(|n| AccessSubject::parse(n)).collect())
                .transpose()
        };
        Ok(AccessRule {
            subject: AccessSubject::parse(&spec.subject)?,
            accessible_from: parse_all(&spec.accessible_from)?,
            can_lead_to: parse_all(&spec.can_lead_to)?,
        })
    }
}

use AccessSubject::{Category, Type};

static OPEN_PLAN: Lazy<Vec<AccessRule>> = Lazy::new(|| {
    vec![
        AccessRule::new(
            Type(RoomType::Bath),
            &[Category(RoomCategory::Circulation), Type(RoomType::Bedroom)],
        ),
        AccessRule::new(Type(RoomType::Ensuite), &[Type(RoomType::Bedroom)]),
        AccessRule::new(
            Type(RoomType::Closet),
            &[Type(RoomType::Bedroom), Category(RoomCategory::Circulation)],
        ),
        AccessRule::new(
            Type(RoomType::Garage),
            &[
                Category(RoomCategory::Circulation),
                Type(RoomType::Kitchen),
                Type(RoomType::Laundry),
                Type(RoomType::Utility),
            ],
        ),
    ]
});

static TRADITIONAL: Lazy<Vec<AccessRule>> = Lazy::new(|| {
    let mut rules = OPEN_PLAN.clone();
    rules.extend([
        AccessRule::new(Type(RoomType::Bedroom), &[Category(RoomCategory::Circulation)]),
        AccessRule::new(
            Type(RoomType::Kitchen),
            &[
                Category(RoomCategory::Circulation),
                Type(RoomType::Dining),
                Type(RoomType::Living),
                Type(RoomType::Laundry),
            ],
        ),
        AccessRule::new(
            Type(RoomType::Laundry),
            &[Category(RoomCategory::Circulation), Type(RoomType::Kitchen), Type(RoomType::Garage)],
        ),
        AccessRule::new(
            Type(RoomType::Office),
            &[Category(RoomCategory::Circulation), Type(RoomType::Living)],
        ),
    ]);
    rules
});

static PRIVACY_FOCUSED: Lazy<Vec<AccessRule>> = Lazy::new(|| {
    vec![
        AccessRule::new(Category(RoomCategory::Private), &[Category(RoomCategory::Circulation)]),
        AccessRule::new(Type(RoomType::Ensuite), &[Type(RoomType::Bedroom)]),
        AccessRule::new(Type(RoomType::Closet), &[Type(RoomType::Bedroom)]),
        AccessRule::new(
            Category(RoomCategory::Service),
            &[Category(RoomCategory::Circulation), Type(RoomType::Kitchen)],
        ),
        AccessRule::new(
            Type(RoomType::Kitchen),
            &[Category(RoomCategory::Circulation), Type(RoomType::Dining), Type(RoomType::Living)],
        ),
        // Public rooms open onto each other and circulation, never
        // straight into a private room.
        AccessRule {
            subject: Category(RoomCategory::Public),
            accessible_from: None,
            can_lead_to: Some(vec![
                Category(RoomCategory::Public),
                Category(RoomCategory::Circulation),
                Category(RoomCategory::Service),
            ]),
        },
    ]
});

/// The resolved rule set consulted during door placement.
#[derive(Debug, Clone)]
pub struct AccessTable {
    rules: Vec<AccessRule>,
}

impl AccessTable {
    pub fn from_preset(preset: AccessPreset) -> Self {
        let rules = match preset {
            AccessPreset::OpenPlan => OPEN_PLAN.clone(),
            AccessPreset::Traditional => TRADITIONAL.clone(),
            AccessPreset::PrivacyFocused => PRIVACY_FOCUSED.clone(),
        };
        AccessTable { rules }
    }

    pub fn from_rules(rules: Vec<AccessRule>) -> Self {
        AccessTable { rules }
    }

    /// The rule governing a room type. An exact type rule wins over a
    /// category rule; the first match in declaration order wins otherwise.
    fn rule_for(&self, kind: RoomType) -> Option<&AccessRule> {
        self.rules
            .iter()
            .find(|r| matches!(r.subject, AccessSubject::Type(t) if t == kind))
            .or_else(|| self.rules.iter().find(|r| r.subject.matches(kind)))
    }

    /// Whether one side of a prospective door accepts the pairing.
    /// Circulation rooms always accept as the "from" side, and generated
    /// rooms bypass rules entirely (checked by the caller on ids).
    fn side_accepts(&self, kind: RoomType, other: RoomType) -> bool {
        if kind.category() == RoomCategory::Circulation {
            return true;
        }
        let Some(rule) = self.rule_for(kind) else {
            return true;
        };
        let from_ok = rule
            .accessible_from
            .as_ref()
            .map_or(true, |subjects| subjects.iter().any(|s| s.matches(other)));
        let lead_ok = rule
            .can_lead_to
            .as_ref()
            .map_or(true, |subjects| subjects.iter().any(|s| s.matches(other)));
        from_ok && lead_ok
    }

    /// A door is allowed unless both rooms' rules forbid it.
    pub fn door_allowed(&self, a: RoomType, b: RoomType) -> bool {
        self.side_accepts(a, b) || self.side_accepts(b, a)
    }
}

impl Default for AccessTable {
    fn default() -> Self {
        AccessTable::from_preset(AccessPreset::OpenPlan)
    }
}
