use chrono::NaiveDate;

use crate::{
    api::models::{DailyRecord, SystemProfile, TelemetryPoint},
    core::normalize,
};

/// The one record the rest of the program reads: a flat merge of the three
/// gateway sources, every field independently nullable.
///
/// A source that failed, or a field the gateway left out, stays `None`;
/// partial upstream failure never aborts construction.
#[derive(Debug, Default, PartialEq)]
pub struct Snapshot {
    /// Instantaneous solar output in watts.
    pub current_power: Option<f64>,

    /// Today's production in kilowatt-hours.
    pub daily_production: Option<f64>,

    /// Lifetime production in kilowatt-hours.
    pub cumulative_production: Option<f64>,

    /// Household consumption in watts.
    pub consumption: Option<f64>,

    /// Grid export in watts.
    pub grid_export: Option<f64>,

    /// Grid import in watts.
    pub grid_import: Option<f64>,

    /// Solar power routed through the battery, in watts.
    pub battery_solar: Option<f64>,

    /// Timestamp of the newest telemetry sample, as served.
    pub last_update: Option<String>,

    /// Nameplate size in kilowatts.
    pub system_size: Option<f64>,

    pub num_panels: Option<u32>,

    /// Degrees from north, one decimal.
    pub system_azimuth: Option<f64>,

    /// Degrees from horizontal, one decimal.
    pub system_pitch: Option<f64>,

    pub has_battery: Option<bool>,

    pub has_consumption: Option<bool>,

    /// Permission-to-operate (commissioning) date.
    pub pto_date: Option<String>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    /// Monthly sun-exposure percentages, January first.
    pub sun_exposure: [Option<f64>; 12],
}

pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl Snapshot {
    /// Fold in the newest minute sample.
    ///
    /// The gateway appends samples in order, so the last element is the
    /// newest. Solar defaults to zero when absent; the other readings keep
    /// "missing" distinct from "zero".
    pub fn apply_telemetry(&mut self, points: &[TelemetryPoint]) {
        let Some(latest) = points.last() else { return };
        self.current_power = Some(normalize::to_watts(latest.solar.unwrap_or(0.0)));
        self.consumption = latest.consumption.map(normalize::to_watts);
        self.grid_export = latest.export.map(normalize::to_watts);
        self.grid_import = latest.import.map(normalize::to_watts);
        self.battery_solar = latest.battery_solar.map(normalize::to_watts);
        self.last_update = latest.timestamp.clone();
    }

    /// Fold in the daily record matching `today`, or the most recent one.
    pub fn apply_daily(&mut self, records: &[DailyRecord], today: NaiveDate) {
        let Some(record) = normalize::select_daily(records, today) else { return };
        self.daily_production = record.delivered_kwh;
        self.cumulative_production = record.cumulative_kwh;
    }

    /// Fold in the static system facts.
    pub fn apply_profile(&mut self, profile: &SystemProfile) {
        self.system_size = profile.system_size;
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            self.num_panels = profile.panel_count.map(|count| count as u32);
        }
        self.system_azimuth = profile.azimuth.map(normalize::round1);
        self.system_pitch = profile.pitch.map(normalize::round1);
        self.has_battery = Some(profile.has_battery);
        self.has_consumption = Some(profile.has_consumption);
        self.pto_date = profile.pto_date.clone();
        self.latitude = profile.latitude;
        self.longitude = profile.longitude;
        for (slot, shade) in self.sun_exposure.iter_mut().zip(profile.monthly_shade()) {
            *slot = shade.map(normalize::round1);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::prelude::*;

    #[test]
    fn test_apply_telemetry_scales_kilowatts() -> Result {
        let points: Vec<TelemetryPoint> =
            serde_json::from_value(json!([{"solar": 3.2, "timestamp": "T1"}]))?;
        let mut snapshot = Snapshot::default();
        snapshot.apply_telemetry(&points);
        assert_eq!(snapshot.current_power, Some(3200.0));
        assert_eq!(snapshot.last_update.as_deref(), Some("T1"));
        Ok(())
    }

    #[test]
    fn test_apply_telemetry_passes_watts_through() -> Result {
        let points: Vec<TelemetryPoint> =
            serde_json::from_value(json!([{"solar": 150, "timestamp": "T2"}]))?;
        let mut snapshot = Snapshot::default();
        snapshot.apply_telemetry(&points);
        assert_eq!(snapshot.current_power, Some(150.0));
        Ok(())
    }

    #[test]
    fn test_apply_telemetry_uses_last_point() -> Result {
        let points: Vec<TelemetryPoint> = serde_json::from_value(json!([
            {"solar": 1.0, "timestamp": "T1"},
            {"solar": 2.0, "timestamp": "T2"},
        ]))?;
        let mut snapshot = Snapshot::default();
        snapshot.apply_telemetry(&points);
        assert_eq!(snapshot.current_power, Some(2000.0));
        assert_eq!(snapshot.last_update.as_deref(), Some("T2"));
        Ok(())
    }

    #[test]
    fn test_apply_telemetry_secondary_fields_scale_independently() -> Result {
        let points: Vec<TelemetryPoint> = serde_json::from_value(json!([{
            "solar": 150,
            "consumption": 1.5,
            "exportReading": 250,
            "importReading": 0.4,
            "batterySolar": 2.0,
            "timestamp": "T1",
        }]))?;
        let mut snapshot = Snapshot::default();
        snapshot.apply_telemetry(&points);
        assert_eq!(snapshot.current_power, Some(150.0));
        assert_eq!(snapshot.consumption, Some(1500.0));
        assert_eq!(snapshot.grid_export, Some(250.0));
        assert_eq!(snapshot.grid_import, Some(400.0));
        assert_eq!(snapshot.battery_solar, Some(2000.0));
        Ok(())
    }

    #[test]
    fn test_apply_telemetry_missing_is_not_zero() -> Result {
        let points: Vec<TelemetryPoint> =
            serde_json::from_value(json!([{"timestamp": "T1", "consumption": 0.0}]))?;
        let mut snapshot = Snapshot::default();
        snapshot.apply_telemetry(&points);
        // Absent solar defaults to zero, absent secondary readings stay null.
        assert_eq!(snapshot.current_power, Some(0.0));
        assert_eq!(snapshot.consumption, Some(0.0));
        assert_eq!(snapshot.grid_export, None);
        assert_eq!(snapshot.grid_import, None);
        assert_eq!(snapshot.battery_solar, None);
        Ok(())
    }

    #[test]
    fn test_apply_telemetry_empty_list_contributes_nothing() {
        let mut snapshot = Snapshot::default();
        snapshot.apply_telemetry(&[]);
        assert_eq!(snapshot, Snapshot::default());
    }

    #[test]
    fn test_apply_daily_today() -> Result {
        let records: Vec<DailyRecord> = serde_json::from_value(json!([
            {"timestamp": "2025-01-01T00:00:00", "deliveredKwh": 3, "cumulativeKwh": 22.5},
        ]))?;
        let mut snapshot = Snapshot::default();
        snapshot.apply_daily(&records, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(snapshot.daily_production, Some(3.0));
        assert_eq!(snapshot.cumulative_production, Some(22.5));
        Ok(())
    }

    #[test]
    fn test_apply_profile() -> Result {
        let profile: SystemProfile = serde_json::from_value(json!({
            "system_size": 7.2,
            "numPanels": 24.6,
            "system_azimuth": 180.25,
            "system_pitch": 18.04,
            "brightBox": true,
            "ptoDate": "2023-06-01",
            "lat": 37.77,
            "lon": -122.42,
            "weighted_avg_jan_shade": 12.34,
            "weighted_avg_juy_shade": 5.67,
        }))?;
        let mut snapshot = Snapshot::default();
        snapshot.apply_profile(&profile);
        assert_eq!(snapshot.system_size, Some(7.2));
        assert_eq!(snapshot.num_panels, Some(24));
        assert_eq!(snapshot.system_azimuth, Some(180.3));
        assert_eq!(snapshot.system_pitch, Some(18.0));
        assert_eq!(snapshot.has_battery, Some(true));
        assert_eq!(snapshot.has_consumption, Some(false));
        assert_eq!(snapshot.pto_date.as_deref(), Some("2023-06-01"));
        assert_eq!(snapshot.sun_exposure[0], Some(12.3));
        assert_eq!(snapshot.sun_exposure[6], Some(5.7));
        assert_eq!(snapshot.sun_exposure[11], None);
        Ok(())
    }
}
