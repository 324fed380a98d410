// 5.0: world-event shocks. events are opaque payloads from the outside world;
// the engine only uses the caller-supplied direction and magnitude to size an
// instantaneous multiplicative move. no RNG is consumed, so shocks never
// perturb a company's minute-price stream.

use crate::types::{OrgId, Price};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Opaque event payload. The price engine treats this as a label for the
/// shock; it never introspects the fields beyond logging them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub actors: Vec<OrgId>,
    pub description: String,
    #[serde(default)]
    pub related_question: Option<String>,
    #[serde(default)]
    pub points_toward: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
}

impl WorldEvent {
    pub fn new(id: impl Into<String>, event_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            actors: Vec::new(),
            description: description.into(),
            related_question: None,
            points_toward: None,
            visibility: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventDirection {
    Positive,
    Negative,
}

impl EventDirection {
    pub fn sign(&self) -> Decimal {
        match self {
            EventDirection::Positive => dec!(1),
            EventDirection::Negative => dec!(-1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventMagnitude {
    Minor,
    Moderate,
    Major,
}

impl EventMagnitude {
    // minor ~1%, moderate 2-3%, major >= 3%. fixed table, no jitter.
    pub fn shock_fraction(&self) -> Decimal {
        match self {
            EventMagnitude::Minor => dec!(0.01),
            EventMagnitude::Moderate => dec!(0.025),
            EventMagnitude::Major => dec!(0.04),
        }
    }
}

/// Result of applying an event shock to one company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceShock {
    pub company_id: OrgId,
    pub event_id: String,
    pub old_price: Price,
    pub new_price: Price,
    pub change_percent: Decimal,
    pub direction: EventDirection,
    pub magnitude: EventMagnitude,
}
