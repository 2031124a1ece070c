//! Response normalization.
//!
//! The share API has shipped several response revisions. Attribute names
//! vary (`lat` vs `latitude`, `lon`/`lng`/`longitude`, ...) and values
//! arrive as numbers, numeric strings, or loose boolean tokens. Each
//! attribute is therefore described by an ordered list of candidate field
//! names; the first candidate that is present *and* parses wins.

use serde_json::{Map, Value};
use sharewatch_types::{UnitId, UnitRecord, UnitTable};
use tracing::debug;

use crate::PollError;

/// Candidate fields for the unit identifier.
pub const UNIT_ID_FIELDS: &[&str] = &["unit_id"];
/// Candidate fields for the display name.
pub const NAME_FIELDS: &[&str] = &["name"];
/// Candidate fields for latitude.
pub const LATITUDE_FIELDS: &[&str] = &["lat", "latitude"];
/// Candidate fields for longitude.
pub const LONGITUDE_FIELDS: &[&str] = &["lon", "lng", "longitude"];
/// Candidate fields for speed (km/h).
pub const SPEED_FIELDS: &[&str] = &["speed"];
/// Candidate fields for heading.
pub const HEADING_FIELDS: &[&str] = &["angle", "heading"];
/// Candidate fields for the trip flag.
pub const IN_TRIP_FIELDS: &[&str] = &["in_trip"];
/// Candidate fields for position accuracy.
pub const ACCURACY_FIELDS: &[&str] = &["accuracy", "hdop", "radius"];
/// Candidate fields for the last fix timestamp.
pub const TIMESTAMP_FIELDS: &[&str] = &["dt_unit", "ts", "timestamp"];
/// Candidate fields for the vehicle image.
pub const IMAGE_FIELDS: &[&str] = &["image_filename"];

/// String tokens accepted as `true` (after trimming, case-insensitive).
pub const TRUE_TOKENS: &[&str] = &["1", "true", "yes", "y"];
/// String tokens accepted as `false` (after trimming, case-insensitive).
pub const FALSE_TOKENS: &[&str] = &["0", "false", "no", "n"];

/// What to do with an object payload that has no `data` field at all.
///
/// The service's own client treated such a payload as an unexpected
/// response, which is what `Reject` reproduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingData {
    /// Treat it like an empty `data` list.
    #[default]
    Empty,
    /// Fail with a schema violation.
    Reject,
}

/// Configurable normalizer.
///
/// `data: null` and `data: []` always yield an empty table; that means the
/// account currently shares no units and is not an error.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use sharewatch_adapter::{MissingData, Normalizer};
///
/// let lenient = Normalizer::new();
/// assert!(lenient.normalize(&json!({"success": true})).unwrap().is_empty());
///
/// let strict = Normalizer::new().missing_data(MissingData::Reject);
/// assert!(strict.normalize(&json!({"success": true})).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    missing_data: MissingData,
}

impl Normalizer {
    /// Create a normalizer with the default (lenient) policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the policy for payloads without a `data` field.
    pub fn missing_data(mut self, policy: MissingData) -> Self {
        self.missing_data = policy;
        self
    }

    /// Normalize a payload into a unit table.
    pub fn normalize(&self, payload: &Value) -> Result<UnitTable, PollError> {
        let object = payload.as_object().ok_or_else(|| {
            PollError::SchemaViolation(format!("expected an object, got {}", type_name(payload)))
        })?;

        if object.get("success") == Some(&Value::Bool(false)) {
            // Not authoritative across API revisions; status and `data` decide.
            debug!("share API reported success=false");
        }

        let units = match object.get("data") {
            None => match self.missing_data {
                MissingData::Reject => {
                    return Err(PollError::SchemaViolation(
                        "response has no data field".to_string(),
                    ))
                }
                MissingData::Empty => return Ok(UnitTable::new()),
            },
            Some(Value::Null) => return Ok(UnitTable::new()),
            Some(Value::Array(units)) => units,
            Some(other) => {
                return Err(PollError::SchemaViolation(format!(
                    "data is {}, expected a list",
                    type_name(other)
                )))
            }
        };

        let mut table = UnitTable::new();
        for unit in units {
            if let Some(record) = normalize_unit(unit) {
                table.insert(record.unit_id, record);
            }
        }

        if table.len() < units.len() {
            debug!(
                kept = table.len(),
                received = units.len(),
                "dropped unit entries without a usable unit_id"
            );
        }

        Ok(table)
    }
}

/// Normalize a payload with the default policy.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use sharewatch_adapter::normalize;
///
/// let payload = json!({
///     "data": [{"unit_id": 7, "lat": 52.5, "lng": 13.4, "speed": 42.3, "in_trip": true}]
/// });
/// let table = normalize(&payload).unwrap();
///
/// let unit = &table[&7];
/// assert_eq!(unit.position(), Some((52.5, 13.4)));
/// assert_eq!(unit.in_trip, Some(true));
/// ```
pub fn normalize(payload: &Value) -> Result<UnitTable, PollError> {
    Normalizer::default().normalize(payload)
}

/// Map one per-unit object to a record.
///
/// Returns `None` for non-objects and for objects without a usable `unit_id`.
pub fn normalize_unit(unit: &Value) -> Option<UnitRecord> {
    let fields = unit.as_object()?;
    let unit_id = lookup(fields, UNIT_ID_FIELDS, parse_unit_id)?;

    Some(UnitRecord {
        unit_id,
        name: lookup(fields, NAME_FIELDS, parse_text),
        latitude: lookup(fields, LATITUDE_FIELDS, parse_number),
        longitude: lookup(fields, LONGITUDE_FIELDS, parse_number),
        speed: lookup(fields, SPEED_FIELDS, parse_number),
        heading: lookup(fields, HEADING_FIELDS, parse_number),
        in_trip: lookup(fields, IN_TRIP_FIELDS, parse_trip_flag),
        accuracy: lookup(fields, ACCURACY_FIELDS, parse_number),
        last_update: lookup(fields, TIMESTAMP_FIELDS, parse_text),
        image_filename: lookup(fields, IMAGE_FIELDS, parse_text),
    })
}

/// Coerce a trip flag.
///
/// Booleans pass through; strings go through [`parse_trip_token`]; numbers
/// are `true` when non-zero. Anything else is `None`.
pub fn parse_trip_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(token) => parse_trip_token(token),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        _ => None,
    }
}

/// Coerce a loose boolean token.
///
/// ```rust
/// use sharewatch_adapter::parse_trip_token;
///
/// assert_eq!(parse_trip_token(" Yes "), Some(true));
/// assert_eq!(parse_trip_token("0"), Some(false));
/// assert_eq!(parse_trip_token("maybe"), None);
/// ```
pub fn parse_trip_token(token: &str) -> Option<bool> {
    let token = token.trim().to_ascii_lowercase();
    if TRUE_TOKENS.contains(&token.as_str()) {
        Some(true)
    } else if FALSE_TOKENS.contains(&token.as_str()) {
        Some(false)
    } else {
        None
    }
}

fn lookup<T>(
    fields: &Map<String, Value>,
    candidates: &[&str],
    parse: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    candidates
        .iter()
        .filter_map(|name| fields.get(*name))
        .find_map(parse)
}

fn parse_unit_id(value: &Value) -> Option<UnitId> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|v| v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64)
                .map(|v| v as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

fn parse_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
