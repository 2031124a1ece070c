//! Per-unit telemetry records.

use std::collections::BTreeMap;

/// Identifier of a tracked unit (vehicle or device).
pub type UnitId = i64;

/// Mapping from unit identifier to its latest record.
///
/// Keys are unique; a source that repeats an identifier keeps the last
/// occurrence.
pub type UnitTable = BTreeMap<UnitId, UnitRecord>;

/// One tracked vehicle's latest known telemetry.
///
/// Every attribute except the identifier is optional. A value the source
/// omitted, or sent in a form that cannot be parsed, is `None`; coordinates
/// in particular are never defaulted to zero.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitRecord {
    /// Unique key within a snapshot.
    pub unit_id: UnitId,

    /// Display name as sent by the source.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,

    /// Latitude in degrees.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub latitude: Option<f64>,

    /// Longitude in degrees.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub longitude: Option<f64>,

    /// Ground speed in km/h.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub speed: Option<f64>,

    /// Heading in degrees (the source calls it "angle").
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub heading: Option<f64>,

    /// Whether the unit is currently on a trip.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub in_trip: Option<bool>,

    /// Position accuracy in metres, when the source reports one.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub accuracy: Option<f64>,

    /// Source timestamp of the last fix, passed through uninterpreted.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub last_update: Option<String>,

    /// Vehicle image file name, passed through uninterpreted.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub image_filename: Option<String>,
}

impl UnitRecord {
    /// Create a record carrying only its identifier.
    pub fn new(unit_id: UnitId) -> Self {
        Self {
            unit_id,
            ..Default::default()
        }
    }

    /// Create a builder for a record.
    pub fn builder(unit_id: UnitId) -> UnitRecordBuilder {
        UnitRecordBuilder::new(unit_id)
    }

    /// Both coordinates, if the source sent a complete fix.
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// Builder for `UnitRecord`.
#[derive(Debug, Clone)]
pub struct UnitRecordBuilder {
    record: UnitRecord,
}

impl UnitRecordBuilder {
    /// Create a new builder.
    pub fn new(unit_id: UnitId) -> Self {
        Self {
            record: UnitRecord::new(unit_id),
        }
    }

    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.record.name = Some(name.into());
        self
    }

    /// Set latitude and longitude.
    pub fn position(mut self, latitude: f64, longitude: f64) -> Self {
        self.record.latitude = Some(latitude);
        self.record.longitude = Some(longitude);
        self
    }

    /// Set the speed (km/h).
    pub fn speed(mut self, speed: f64) -> Self {
        self.record.speed = Some(speed);
        self
    }

    /// Set the heading (degrees).
    pub fn heading(mut self, heading: f64) -> Self {
        self.record.heading = Some(heading);
        self
    }

    /// Set the trip flag.
    pub fn in_trip(mut self, in_trip: bool) -> Self {
        self.record.in_trip = Some(in_trip);
        self
    }

    /// Set the position accuracy (metres).
    pub fn accuracy(mut self, accuracy: f64) -> Self {
        self.record.accuracy = Some(accuracy);
        self
    }

    /// Set the source timestamp.
    pub fn last_update(mut self, ts: impl Into<String>) -> Self {
        self.record.last_update = Some(ts.into());
        self
    }

    /// Set the image file name.
    pub fn image_filename(mut self, file: impl Into<String>) -> Self {
        self.record.image_filename = Some(file.into());
        self
    }

    /// Build the record.
    pub fn build(self) -> UnitRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_no_telemetry() {
        let record = UnitRecord::new(3);
        assert_eq!(record.unit_id, 3);
        assert_eq!(record.latitude, None);
        assert_eq!(record.longitude, None);
        assert_eq!(record.speed, None);
        assert_eq!(record.in_trip, None);
        assert_eq!(record.position(), None);
    }

    #[test]
    fn test_builder() {
        let record = UnitRecord::builder(7)
            .name("Van")
            .position(52.5, 13.4)
            .speed(42.3)
            .heading(180.0)
            .in_trip(true)
            .last_update("2024-05-01 10:00:00")
            .build();

        assert_eq!(record.name.as_deref(), Some("Van"));
        assert_eq!(record.position(), Some((52.5, 13.4)));
        assert_eq!(record.speed, Some(42.3));
        assert_eq!(record.heading, Some(180.0));
        assert_eq!(record.in_trip, Some(true));
        assert_eq!(record.last_update.as_deref(), Some("2024-05-01 10:00:00"));
    }

    #[test]
    fn position_requires_both_coordinates() {
        let mut record = UnitRecord::new(1);
        record.latitude = Some(10.0);
        assert_eq!(record.position(), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_skips_absent_fields() {
        let record = UnitRecord::builder(7).speed(12.0).build();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json, serde_json::json!({"unit_id": 7, "speed": 12.0}));
    }
}
