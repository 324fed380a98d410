// 3.0: organization inputs. the outside world hands both engines the same
// org list; only companies with a quoted starting price become tradable.
// everything else (media outlets, government bodies) is silently excluded.

use crate::types::OrgId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrgType {
    Company,
    Media,
    Government,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrgId,
    pub name: String,
    #[serde(rename = "type")]
    pub org_type: OrgType,
    #[serde(default)]
    pub initial_price: Option<Decimal>,
    #[serde(default)]
    pub can_be_involved: bool,
}

impl Organization {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        org_type: OrgType,
        initial_price: Option<Decimal>,
    ) -> Self {
        Self {
            id: OrgId::new(id),
            name: name.into(),
            org_type,
            initial_price,
            can_be_involved: true,
        }
    }

    pub fn company(id: impl Into<String>, name: impl Into<String>, initial_price: Decimal) -> Self {
        Self::new(id, name, OrgType::Company, Some(initial_price))
    }

    /// The single tradability filter both engines apply: a company with a
    /// positive starting price. Anything else yields no price state and no
    /// market.
    pub fn tradable(&self) -> bool {
        self.org_type == OrgType::Company
            && self.initial_price.is_some_and(|p| p > Decimal::ZERO)
    }
}
