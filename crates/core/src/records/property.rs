//! Real-estate listings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::null_as_default;
use crate::types::PropertyId;

/// Version of the `properties.interiors` JSON layout understood by
/// [`Interiors`].
///
/// Version 1: a flat JSON object mapping a feature name (e.g. `"bedrooms"`)
/// to a number, string or boolean, or `null` for no details. Any other
/// value (nested objects, arrays, `null` entries) is kept as raw JSON.
pub const INTERIORS_SCHEMA_VERSION: u32 = 1;

/// Value of one interior feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InteriorValue {
    Flag(bool),
    Count(i64),
    Text(String),
    Number(Decimal),
    Other(serde_json::Value),
}

impl std::fmt::Display for InteriorValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flag(true) => write!(f, "yes"),
            Self::Flag(false) => write!(f, "no"),
            Self::Count(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{}", n.normalize()),
            Self::Other(serde_json::Value::Null) => write!(f, "-"),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}

/// Interior details (see [`INTERIORS_SCHEMA_VERSION`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Interiors {
    pub features: BTreeMap<String, InteriorValue>,
}

/// Row in the `properties` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub title: String,
    pub price: Decimal,
    pub street_number: Option<String>,
    pub street_name: Option<String>,
    pub neighborhood: Option<String>,
    pub zipcode: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub interiors: Interiors,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub picture_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Property {
    /// Price in whole US dollars with thousands separators, e.g. `$425,000`.
    #[must_use]
    pub fn display_price(&self) -> String {
        let whole = self
            .price
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .trunc()
            .to_string();
        let (sign, digits) = whole
            .strip_prefix('-')
            .map_or(("", whole.as_str()), |d| ("-", d));

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        format!("{sign}${grouped}")
    }

    /// Street number, street, neighborhood and zipcode joined by spaces,
    /// skipping missing parts.
    #[must_use]
    pub fn address(&self) -> String {
        [
            &self.street_number,
            &self.street_name,
            &self.neighborhood,
            &self.zipcode,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref().filter(|s| !s.is_empty()))
        .collect::<Vec<_>>()
        .join(" ")
    }
}
