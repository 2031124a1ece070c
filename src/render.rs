//! Presentation of unit records for the console.

use std::fmt;

use serde::Serialize;
use sharewatch_types::{Snapshot, UnitId, UnitRecord};

use crate::settings::{Settings, SpeedUnit};

/// Miles per kilometre.
const MPH_PER_KMH: f64 = 0.621371;

/// One unit as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitView {
    pub unit_id: UnitId,
    pub name: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Location accuracy in whole metres, never negative.
    pub accuracy_m: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    pub speed_unit: SpeedUnit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_trip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_filename: Option<String>,
}

/// Turns snapshot records into [`UnitView`]s.
#[derive(Debug, Clone, Copy)]
pub struct Presenter {
    speed_unit: SpeedUnit,
    coord_precision: u32,
}

impl Presenter {
    pub fn new(speed_unit: SpeedUnit, coord_precision: u32) -> Self {
        Self {
            speed_unit,
            coord_precision,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.speed_unit, settings.coord_precision)
    }

    /// View of one unit. A unit missing from the table is shown by its
    /// fallback name and marked unavailable.
    pub fn view(&self, snapshot: &Snapshot, unit_id: UnitId) -> UnitView {
        match snapshot.get(unit_id) {
            Some(record) => self.present(record, snapshot.last_success),
            None => UnitView {
                unit_id,
                name: fallback_name(unit_id),
                available: false,
                latitude: None,
                longitude: None,
                accuracy_m: 0,
                speed: None,
                speed_unit: self.speed_unit,
                heading: None,
                in_trip: None,
                last_update: None,
                image_filename: None,
            },
        }
    }

    /// Views of every unit in the table, ordered by identifier.
    pub fn views(&self, snapshot: &Snapshot) -> Vec<UnitView> {
        snapshot
            .iter()
            .map(|(_, record)| self.present(record, snapshot.last_success))
            .collect()
    }

    fn present(&self, record: &UnitRecord, last_success: bool) -> UnitView {
        UnitView {
            unit_id: record.unit_id,
            name: display_name(record),
            available: last_success,
            latitude: record.latitude.map(|v| round_to(v, self.coord_precision)),
            longitude: record.longitude.map(|v| round_to(v, self.coord_precision)),
            accuracy_m: accuracy_metres(record.accuracy),
            speed: record.speed.map(|kmh| convert_speed(kmh, self.speed_unit)),
            speed_unit: self.speed_unit,
            heading: record.heading,
            in_trip: record.in_trip,
            last_update: record.last_update.clone(),
            image_filename: record.image_filename.clone(),
        }
    }
}

impl fmt::Display for UnitView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: ", self.name, self.unit_id)?;
        if !self.available {
            return write!(f, "unavailable");
        }

        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => write!(f, "{}, {} ±{}m", lat, lon, self.accuracy_m)?,
            _ => write!(f, "no position")?,
        }
        if let Some(speed) = self.speed {
            write!(f, ", {:.1} {}", speed, self.speed_unit.label())?;
        }
        if let Some(heading) = self.heading {
            write!(f, ", heading {}°", heading)?;
        }
        match self.in_trip {
            Some(true) => write!(f, ", in trip")?,
            Some(false) => write!(f, ", parked")?,
            None => {}
        }
        if let Some(ts) = &self.last_update {
            write!(f, " ({})", ts)?;
        }
        Ok(())
    }
}

fn fallback_name(unit_id: UnitId) -> String {
    format!("Unit {}", unit_id)
}

fn display_name(record: &UnitRecord) -> String {
    match record.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => fallback_name(record.unit_id),
    }
}

/// Convert a speed reported in km/h into `unit`.
pub fn convert_speed(kmh: f64, unit: SpeedUnit) -> f64 {
    match unit {
        SpeedUnit::Kmh => kmh,
        SpeedUnit::Mph => kmh * MPH_PER_KMH,
    }
}

/// Round to `precision` decimal places.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

fn accuracy_metres(accuracy: Option<f64>) -> u32 {
    match accuracy {
        Some(acc) if acc > 0.0 => acc.round() as u32,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharewatch_types::{Failure, FailureKind, UnitTable};

    fn snapshot_with(records: Vec<UnitRecord>) -> Snapshot {
        let table: UnitTable = records.into_iter().map(|r| (r.unit_id, r)).collect();
        Snapshot::empty().succeeded(table, 1_000)
    }

    #[test]
    fn test_name_fallback() {
        let snapshot = snapshot_with(vec![
            UnitRecord::builder(1).name("  Van  ").build(),
            UnitRecord::builder(2).name("   ").build(),
            UnitRecord::new(3),
        ]);
        let presenter = Presenter::new(SpeedUnit::Kmh, 6);

        let names: Vec<String> = presenter.views(&snapshot).into_iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["Van", "Unit 2", "Unit 3"]);
    }

    #[test]
    fn test_speed_conversion() {
        let snapshot = snapshot_with(vec![UnitRecord::builder(1).speed(100.0).build()]);

        let kmh = Presenter::new(SpeedUnit::Kmh, 6).view(&snapshot, 1);
        assert_eq!(kmh.speed, Some(100.0));

        let mph = Presenter::new(SpeedUnit::Mph, 6).view(&snapshot, 1);
        let speed = mph.speed.unwrap();
        assert!((speed - 62.1371).abs() < 1e-9);
        assert_eq!(mph.speed_unit, SpeedUnit::Mph);
    }

    #[test]
    fn test_coordinate_precision() {
        let snapshot = snapshot_with(vec![UnitRecord::builder(1)
            .position(52.5200066, 13.4049540)
            .build()]);

        let view = Presenter::new(SpeedUnit::Kmh, 3).view(&snapshot, 1);
        assert_eq!(view.latitude, Some(52.52));
        assert_eq!(view.longitude, Some(13.405));

        let whole = Presenter::new(SpeedUnit::Kmh, 0).view(&snapshot, 1);
        assert_eq!(whole.latitude, Some(53.0));
    }

    #[test]
    fn test_accuracy_rounding() {
        assert_eq!(accuracy_metres(Some(4.6)), 5);
        assert_eq!(accuracy_metres(Some(-3.0)), 0);
        assert_eq!(accuracy_metres(None), 0);
    }

    #[test]
    fn availability_follows_last_cycle() {
        let ok = snapshot_with(vec![UnitRecord::new(1)]);
        let presenter = Presenter::new(SpeedUnit::Kmh, 6);

        assert!(presenter.view(&ok, 1).available);
        assert!(!presenter.view(&ok, 2).available);

        let failed = ok.failed(Failure::new(FailureKind::Timeout, ""), 2_000);
        let view = presenter.view(&failed, 1);
        assert!(!view.available);
        assert_eq!(view.to_string(), "Unit 1 [1]: unavailable");
    }

    #[test]
    fn test_display_line() {
        let snapshot = snapshot_with(vec![UnitRecord::builder(7)
            .name("Van")
            .position(52.5, 13.4)
            .accuracy(3.2)
            .speed(42.3)
            .heading(90.0)
            .in_trip(true)
            .build()]);

        let line = Presenter::new(SpeedUnit::Kmh, 6).view(&snapshot, 7).to_string();
        assert_eq!(line, "Van [7]: 52.5, 13.4 ±3m, 42.3 km/h, heading 90°, in trip");
    }

    #[test]
    fn json_omits_absent_fields() {
        let snapshot = snapshot_with(vec![UnitRecord::new(5)]);
        let view = Presenter::new(SpeedUnit::Mph, 6).view(&snapshot, 5);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["name"], "Unit 5");
        assert_eq!(json["speed_unit"], "mph");
        assert_eq!(json["accuracy_m"], 0);
        assert!(json.get("latitude").is_none());
    }
}
