use serde::Deserialize;
use serde_json::Value;

/// One minute-resolution telemetry sample, as served.
///
/// Units are a mess upstream (kilowatts or watts depending on the
/// deployment); conversion happens in [`crate::core::normalize`].
#[derive(Debug, PartialEq, Deserialize)]
pub struct TelemetryPoint {
    pub timestamp: Option<String>,

    /// Solar output; newer gateway revisions serve it as `pvSolar`.
    #[serde(alias = "pvSolar")]
    pub solar: Option<f64>,

    pub consumption: Option<f64>,

    #[serde(rename = "exportReading")]
    pub export: Option<f64>,

    #[serde(rename = "importReading")]
    pub import: Option<f64>,

    #[serde(rename = "batterySolar")]
    pub battery_solar: Option<f64>,
}

/// One day of cumulative production, as served.
#[derive(Debug, PartialEq, Deserialize)]
pub struct DailyRecord {
    pub timestamp: Option<String>,

    #[serde(rename = "deliveredKwh")]
    pub delivered_kwh: Option<f64>,

    #[serde(rename = "cumulativeKwh")]
    pub cumulative_kwh: Option<f64>,
}

/// Static product and system facts from the offerings endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SystemProfile {
    #[serde(rename = "system_size")]
    pub system_size: Option<f64>,

    /// Occasionally fractional upstream.
    #[serde(rename = "numPanels")]
    pub panel_count: Option<f64>,

    #[serde(rename = "system_azimuth")]
    pub azimuth: Option<f64>,

    #[serde(rename = "system_pitch")]
    pub pitch: Option<f64>,

    #[serde(rename = "brightBox", default)]
    pub has_battery: bool,

    #[serde(rename = "hasConsumption", default)]
    pub has_consumption: bool,

    #[serde(rename = "ptoDate")]
    pub pto_date: Option<String>,

    #[serde(rename = "lat")]
    pub latitude: Option<f64>,

    #[serde(rename = "lon")]
    pub longitude: Option<f64>,

    #[serde(rename = "weighted_avg_jan_shade")]
    pub shade_jan: Option<f64>,

    #[serde(rename = "weighted_avg_feb_shade")]
    pub shade_feb: Option<f64>,

    #[serde(rename = "weighted_avg_mar_shade")]
    pub shade_mar: Option<f64>,

    #[serde(rename = "weighted_avg_apr_shade")]
    pub shade_apr: Option<f64>,

    #[serde(rename = "weighted_avg_may_shade")]
    pub shade_may: Option<f64>,

    #[serde(rename = "weighted_avg_jun_shade")]
    pub shade_jun: Option<f64>,

    /// July is misspelled upstream; match it as served, not as corrected.
    #[serde(rename = "weighted_avg_juy_shade")]
    pub shade_jul: Option<f64>,

    #[serde(rename = "weighted_avg_aug_shade")]
    pub shade_aug: Option<f64>,

    #[serde(rename = "weighted_avg_sep_shade")]
    pub shade_sep: Option<f64>,

    #[serde(rename = "weighted_avg_oct_shade")]
    pub shade_oct: Option<f64>,

    #[serde(rename = "weighted_avg_nov_shade")]
    pub shade_nov: Option<f64>,

    #[serde(rename = "weighted_avg_dec_shade")]
    pub shade_dec: Option<f64>,
}

impl SystemProfile {
    /// Monthly shade percentages, January first.
    #[must_use]
    pub const fn monthly_shade(&self) -> [Option<f64>; 12] {
        [
            self.shade_jan,
            self.shade_feb,
            self.shade_mar,
            self.shade_apr,
            self.shade_may,
            self.shade_jun,
            self.shade_jul,
            self.shade_aug,
            self.shade_sep,
            self.shade_oct,
            self.shade_nov,
            self.shade_dec,
        ]
    }
}

/// The minute endpoint answers with either a bare list or the same list
/// wrapped under a `data` key.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum MinuteProductionBody {
    Bare(Vec<TelemetryPoint>),
    Wrapped { data: Vec<TelemetryPoint> },
}

impl MinuteProductionBody {
    #[must_use]
    pub fn into_points(self) -> Vec<TelemetryPoint> {
        match self {
            Self::Bare(points) | Self::Wrapped { data: points } => points,
        }
    }
}

#[derive(Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub data: Option<VerifyData>,

    #[serde(rename = "opportunitiesWithContracts", default)]
    pub opportunities: Vec<Opportunity>,
}

#[derive(Deserialize)]
pub struct VerifyData {
    #[serde(rename = "accessToken")]
    pub access_token: Option<String>,
}

#[derive(Deserialize)]
pub struct Opportunity {
    #[serde(rename = "prospect_id")]
    pub prospect_id: Option<String>,

    #[serde(default)]
    pub contract: Option<Contract>,
}

#[derive(Deserialize)]
pub struct Contract {
    #[serde(rename = "ptoDate")]
    pub pto_date: Option<String>,
}

/// Candidate locations of the exchange token in the challenge response,
/// tried in order. The body shape drifts across gateway revisions.
const EXCHANGE_TOKEN_PATHS: &[&[&str]] =
    &[&["token"], &["data", "token"], &["data", "authToken"]];

/// Extract the exchange token: the first candidate path that holds a string
/// wins.
#[must_use]
pub fn probe_exchange_token(body: &Value) -> Option<String> {
    EXCHANGE_TOKEN_PATHS.iter().find_map(|path| {
        path.iter()
            .try_fold(body, |value, key| value.get(*key))
            .and_then(Value::as_str)
            .map(str::to_owned)
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::prelude::*;

    #[test]
    fn test_probe_exchange_token_top_level() {
        let body = json!({"token": "abc", "session": "xyz"});
        assert_eq!(probe_exchange_token(&body).as_deref(), Some("abc"));
    }

    #[test]
    fn test_probe_exchange_token_nested() {
        let body = json!({"data": {"token": "abc"}});
        assert_eq!(probe_exchange_token(&body).as_deref(), Some("abc"));
        let body = json!({"data": {"authToken": "def"}});
        assert_eq!(probe_exchange_token(&body).as_deref(), Some("def"));
    }

    #[test]
    fn test_probe_exchange_token_prefers_top_level() {
        let body = json!({"token": "outer", "data": {"authToken": "inner"}});
        assert_eq!(probe_exchange_token(&body).as_deref(), Some("outer"));
    }

    #[test]
    fn test_probe_exchange_token_absent() {
        assert_eq!(probe_exchange_token(&json!({"session": "xyz"})), None);
        assert_eq!(probe_exchange_token(&json!({"token": 42})), None);
    }

    #[test]
    fn test_minute_body_bare_and_wrapped_agree() -> Result {
        // language=JSON
        const POINTS: &str = r#"[{"timestamp": "2025-01-01T12:00:00", "solar": 3.2}]"#;
        let bare: MinuteProductionBody = serde_json::from_str(POINTS)?;
        let wrapped: MinuteProductionBody =
            serde_json::from_str(&format!(r#"{{"data": {POINTS}}}"#))?;
        assert_eq!(bare.into_points(), wrapped.into_points());
        Ok(())
    }

    #[test]
    fn test_telemetry_point_pv_solar_alias() -> Result {
        let point: TelemetryPoint =
            serde_json::from_value(json!({"pvSolar": 1.5, "timestamp": "T1"}))?;
        assert_eq!(point.solar, Some(1.5));
        Ok(())
    }

    #[test]
    fn test_system_profile_july_typo() -> Result {
        let profile: SystemProfile = serde_json::from_value(json!({
            "weighted_avg_jun_shade": 10.0,
            "weighted_avg_juy_shade": 20.0,
        }))?;
        assert_eq!(profile.shade_jun, Some(10.0));
        assert_eq!(profile.shade_jul, Some(20.0));
        Ok(())
    }

    #[test]
    fn test_system_profile_flags_default_false() -> Result {
        let profile: SystemProfile = serde_json::from_value(json!({}))?;
        assert!(!profile.has_battery);
        assert!(!profile.has_consumption);
        Ok(())
    }
}
