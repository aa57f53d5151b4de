//! [Sunrun](https://www.sunrun.com) consumer gateway client.

pub mod models;
mod session;

use chrono::{DateTime, Local, NaiveTime, TimeDelta, TimeZone};
use reqwest::{Client, StatusCode, Url, header::AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::json;

pub use self::session::{Challenge, Session};
use self::models::{
    DailyRecord, MinuteProductionBody, SystemProfile, TelemetryPoint, VerifyResponse,
    probe_exchange_token,
};
use crate::{
    api::{
        client,
        error::{ApiError, AuthError},
    },
    core::snapshot::Snapshot,
    prelude::*,
};

const BASE_URL: &str = "https://gateway.sunrun.com";
const CHALLENGE_PATH: &str = "portal-auth/request-passwordless";
const RESPOND_PATH: &str = "portal-auth/respond-passwordless";
const CUMULATIVE_DAILY_PATH: &str = "performance-api/v1/cumulative-production/daily";
const SITE_PRODUCTION_MINUTE_PATH: &str = "performance-api/v1/site-production-minute";
const PRODUCT_OFFERINGS_PATH: &str = "product-api/v1/offerings";

pub struct Api {
    client: Client,
    base_url: Url,
    session: Session,
}

/// Outcome of a successful verification, for the caller to persist.
#[derive(Debug)]
pub struct Verified {
    pub access_token: String,
    pub prospect_id: String,
    pub pto_date: Option<String>,
}

impl Api {
    pub fn try_new(session: Session) -> Result<Self> {
        Ok(Self { client: client::try_new()?, base_url: Url::parse(BASE_URL)?, session })
    }

    #[cfg(test)]
    fn with_base_url(session: Session, base_url: Url) -> Result<Self> {
        Ok(Self { client: client::try_new()?, base_url, session })
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Ask the gateway to text a one-time passcode to the phone number.
    #[instrument(skip_all, fields(phone = phone))]
    pub async fn request_challenge(&self, phone: &str) -> Result<Challenge, ApiError> {
        info!("Requesting a passcode…");
        let response = self
            .client
            .post(format!("{base}{CHALLENGE_PATH}", base = self.base_url))
            .json(&json!({"email": null, "phone": phone, "prospectId": null}))
            .send()
            .await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(AuthError::ChallengeRejected(status).into());
        }
        let body: serde_json::Value = parse_json(CHALLENGE_PATH, &response.text().await?)?;
        let exchange_token =
            probe_exchange_token(&body).ok_or(AuthError::MissingExchangeToken)?;
        debug!("Passcode requested");
        Ok(Challenge { exchange_token })
    }

    /// Exchange the texted passcode for the durable credentials.
    ///
    /// On a rejected code the challenge stays valid server-side, so the
    /// caller may retry with a freshly typed code without requesting a new
    /// one. Success installs the credentials into the session and returns a
    /// copy for persistence.
    #[instrument(skip_all, fields(phone = phone))]
    pub async fn verify_challenge(
        &mut self,
        challenge: &Challenge,
        phone: &str,
        code: &str,
    ) -> Result<Verified, ApiError> {
        let response = self
            .client
            .post(format!("{base}{RESPOND_PATH}", base = self.base_url))
            .header(AUTHORIZATION, &challenge.exchange_token)
            .json(&json!({
                "email": null,
                "phone": phone,
                "code": code,
                "token": challenge.exchange_token,
            }))
            .send()
            .await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(AuthError::CodeRejected(status).into());
        }
        let body: VerifyResponse = parse_json(RESPOND_PATH, &response.text().await?)?;
        let access_token = body.data.and_then(|data| data.access_token);
        let (prospect_id, pto_date) = match body.opportunities.into_iter().next() {
            Some(opportunity) => (
                opportunity.prospect_id,
                opportunity.contract.and_then(|contract| contract.pto_date),
            ),
            None => (None, None),
        };
        let (Some(access_token), Some(prospect_id)) = (access_token, prospect_id) else {
            return Err(AuthError::IncompleteVerification.into());
        };
        info!(prospect_id = %prospect_id, "Verified");
        self.session.install(access_token.clone(), prospect_id.clone());
        Ok(Verified { access_token, prospect_id, pto_date })
    }

    /// Daily cumulative production, defaulting to the last 30 days.
    ///
    /// Records come back exactly as served; selection and normalization
    /// happen in [`crate::core`].
    #[instrument(skip_all)]
    pub async fn get_cumulative_production(
        &self,
        start: Option<DateTime<Local>>,
        end: Option<DateTime<Local>>,
    ) -> Result<Vec<DailyRecord>, ApiError> {
        let end = end.unwrap_or_else(Local::now);
        let start = start.unwrap_or_else(|| end - TimeDelta::days(30));
        let query =
            [("startDate", format_day_start(&start)), ("endDate", format_day_end(&end))];
        self.get_scoped(CUMULATIVE_DAILY_PATH, &query).await
    }

    /// Minute-resolution site telemetry, defaulting to the local day so far.
    #[instrument(skip_all)]
    pub async fn get_site_production_minute(
        &self,
        start: Option<DateTime<Local>>,
        end: Option<DateTime<Local>>,
    ) -> Result<Vec<TelemetryPoint>, ApiError> {
        let end = end.unwrap_or_else(Local::now);
        let start = start.unwrap_or_else(|| start_of_day(end));
        let query = [("startDate", format_second(&start)), ("endDate", format_second(&end))];
        let body: MinuteProductionBody =
            self.get_scoped(SITE_PRODUCTION_MINUTE_PATH, &query).await?;
        Ok(body.into_points())
    }

    /// Static product and system facts.
    #[instrument(skip_all)]
    pub async fn get_product_offerings(&self) -> Result<SystemProfile, ApiError> {
        self.get_scoped(PRODUCT_OFFERINGS_PATH, &[]).await
    }

    /// One poll cycle: fetch the three endpoints and merge whatever they
    /// yield into a single snapshot.
    ///
    /// A failing endpoint only blanks its own portion of the snapshot.
    /// Authentication failures are different: they mean the whole session is
    /// dead, so they propagate for the caller to trigger a fresh login.
    #[instrument(skip_all)]
    pub async fn get_latest_data(&self) -> Result<Snapshot, ApiError> {
        let (minute, daily, offerings) = tokio::join!(
            self.get_site_production_minute(None, None),
            self.get_cumulative_production(None, None),
            self.get_product_offerings(),
        );

        let mut snapshot = Snapshot::default();
        if let Some(points) = absorb(minute, "minute telemetry")? {
            snapshot.apply_telemetry(&points);
        }
        if let Some(records) = absorb(daily, "cumulative production")? {
            snapshot.apply_daily(&records, Local::now().date_naive());
        }
        if let Some(profile) = absorb(offerings, "product offerings")? {
            snapshot.apply_profile(&profile);
        }
        Ok(snapshot)
    }

    /// Probe whether the stored credentials are still accepted.
    ///
    /// `false` only when the gateway rejects the credentials; upstream
    /// trouble is inconclusive and reported as `true`.
    #[instrument(skip_all)]
    pub async fn test_connection(&self) -> bool {
        match self.get_cumulative_production(None, None).await {
            Ok(_) => true,
            Err(ApiError::Auth(_)) => false,
            Err(error) => {
                warn!(%error, "Inconclusive, assuming the credentials are fine");
                true
            }
        }
    }

    /// Authorized GET against a prospect-scoped endpoint, with the uniform
    /// status mapping: 401 is an expired session, any other non-200 is an
    /// upstream failure.
    async fn get_scoped<R: DeserializeOwned>(
        &self,
        path: &'static str,
        query: &[(&str, String)],
    ) -> Result<R, ApiError> {
        let (access_token, prospect_id) = self.session.credentials()?;
        let response = self
            .client
            .get(format!("{base}{path}/{prospect_id}", base = self.base_url))
            .header(AUTHORIZATION, access_token)
            .query(query)
            .send()
            .await?;
        match response.status() {
            StatusCode::OK => parse_json(path, &response.text().await?),
            StatusCode::UNAUTHORIZED => Err(AuthError::Expired.into()),
            status => Err(ApiError::Status { path, status }),
        }
    }
}

/// Per-branch error capture for the aggregator: degrade the source to "no
/// contribution" unless the failure is an authentication one.
fn absorb<T>(result: Result<T, ApiError>, source: &str) -> Result<Option<T>, ApiError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ApiError::Auth(error)) => Err(error.into()),
        Err(error) => {
            warn!(source, %error, "Source unavailable, continuing without it");
            Ok(None)
        }
    }
}

fn parse_json<R: DeserializeOwned>(path: &'static str, body: &str) -> Result<R, ApiError> {
    serde_json::from_str(body)
        .map_err(|error| ApiError::Malformed { path, reason: error.to_string() })
}

fn start_of_day(at: DateTime<Local>) -> DateTime<Local> {
    at.with_time(NaiveTime::MIN).earliest().unwrap_or(at)
}

/// `2025-01-31T00:00:00.000-08:00`: the gateway insists on an explicit local
/// offset rather than `Z`.
fn format_day_start<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT00:00:00.000%:z").to_string()
}

fn format_day_end<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT23:59:59.999%:z").to_string()
}

/// Second precision, no milliseconds.
fn format_second<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}
