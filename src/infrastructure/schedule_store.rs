use crate::domain::models::Activity;
use crate::infrastructure::error::InfraError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT_SECONDS: u64 = 10;

/// The remote schedule store: one read and one write, both addressed by a
/// `DD/MM/YYYY` date key and authenticated with a bearer token.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn fetch_day(&self, token: &str, date_key: &str) -> Result<Vec<Activity>, InfraError>;

    async fn save_day(
        &self,
        token: &str,
        date_key: &str,
        activities: &[Activity],
    ) -> Result<(), InfraError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestScheduleStore {
    client: Client,
    base_url: Url,
}

impl ReqwestScheduleStore {
    pub fn new(base_url: &str) -> Result<Self, InfraError> {
        let base_url = Url::parse(base_url)
            .map_err(|error| InfraError::InvalidConfig(format!("invalid api base url: {error}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()
            .map_err(|error| InfraError::Transport(format!("failed to build http client: {error}")))?;
        Ok(Self { client, base_url })
    }

    fn ensure_non_empty(value: &str, field: &str) -> Result<(), InfraError> {
        if value.trim().is_empty() {
            return Err(InfraError::InvalidPayload(format!("{field} must not be empty")));
        }
        Ok(())
    }

    fn http_error(status: reqwest::StatusCode, body: &str) -> InfraError {
        InfraError::Api {
            status: status.as_u16(),
            body: body.trim().to_string(),
        }
    }

    fn schedule_endpoint(&self) -> Result<Url, InfraError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                InfraError::InvalidConfig("api base URL cannot be a base".to_string())
            })?;
            segments.push("schedule");
        }
        Ok(url)
    }

    /// The per-day endpoint. The date key contains slashes, so it is pushed
    /// as a single path segment and percent-encoded, matching
    /// `GET /api/schedule/16%2F02%2F2026`.
    fn schedule_day_endpoint(&self, date_key: &str) -> Result<Url, InfraError> {
        let mut url = self.schedule_endpoint()?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                InfraError::InvalidConfig("schedule URL cannot be a base".to_string())
            })?;
            segments.push(date_key);
        }
        Ok(url)
    }
}

/// The store is not the only writer of schedule documents, and different
/// backend revisions have wrapped the activity list differently. All three
/// observed envelopes are accepted and normalized to a bare list before the
/// session ever sees the data.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum ScheduleEnvelope {
    Bare(Vec<Activity>),
    Wrapped { activities: Vec<Activity> },
    Nested { schedule: NestedSchedule },
}

#[derive(Debug, serde::Deserialize)]
struct NestedSchedule {
    activities: Vec<Activity>,
}

impl ScheduleEnvelope {
    fn into_activities(self) -> Vec<Activity> {
        match self {
            ScheduleEnvelope::Bare(activities) => activities,
            ScheduleEnvelope::Wrapped { activities } => activities,
            ScheduleEnvelope::Nested { schedule } => schedule.activities,
        }
    }
}

fn parse_schedule_body(body: &str) -> Result<Vec<Activity>, InfraError> {
    let envelope: ScheduleEnvelope = serde_json::from_str(body).map_err(|error| {
        InfraError::InvalidPayload(format!("unrecognized schedule envelope: {error}; body={body}"))
    })?;
    Ok(envelope.into_activities())
}

#[derive(Debug, serde::Serialize)]
struct SaveScheduleRequest<'a> {
    date: &'a str,
    activities: &'a [Activity],
}

#[async_trait]
impl ScheduleStore for ReqwestScheduleStore {
    async fn fetch_day(&self, token: &str, date_key: &str) -> Result<Vec<Activity>, InfraError> {
        Self::ensure_non_empty(token, "bearer token")?;
        Self::ensure_non_empty(date_key, "date key")?;

        let endpoint = self.schedule_day_endpoint(date_key)?;
        let response = self
            .client
            .get(endpoint)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|error| {
                InfraError::Transport(format!("network error while fetching schedule: {error}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|error| {
            InfraError::Transport(format!("failed reading schedule response: {error}"))
        })?;

        if !status.is_success() {
            return Err(Self::http_error(status, &body));
        }

        parse_schedule_body(&body)
    }

    async fn save_day(
        &self,
        token: &str,
        date_key: &str,
        activities: &[Activity],
    ) -> Result<(), InfraError> {
        Self::ensure_non_empty(token, "bearer token")?;
        Self::ensure_non_empty(date_key, "date key")?;

        let endpoint = self.schedule_endpoint()?;
        let request = SaveScheduleRequest {
            date: date_key,
            activities,
        };

        let response = self
            .client
            .post(endpoint)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|error| {
                InfraError::Transport(format!("network error while saving schedule: {error}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|error| {
            InfraError::Transport(format!("failed reading schedule save response: {error}"))
        })?;

        if !status.is_success() {
            return Err(Self::http_error(status, &body));
        }
        log::debug!("schedule saved for {date_key}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::RepeatPolicy;

    fn run() -> Activity {
        Activity {
            time: "07:30".to_string(),
            label: "Run".to_string(),
            repeat: RepeatPolicy::Once,
            days: Vec::new(),
        }
    }

    #[test]
    fn parses_bare_activity_list() {
        let body = r#"[{"time":"07:30","activity":"Run","repeat":"once","days":[]}]"#;
        assert_eq!(parse_schedule_body(body).expect("parse"), vec![run()]);
    }

    #[test]
    fn parses_wrapped_activities_field() {
        let body = r#"{"activities":[{"time":"07:30","activity":"Run"}]}"#;
        assert_eq!(parse_schedule_body(body).expect("parse"), vec![run()]);
    }

    #[test]
    fn parses_nested_schedule_wrapper() {
        let body = r#"{"schedule":{"activities":[{"time":"07:30","activity":"Run"}]}}"#;
        assert_eq!(parse_schedule_body(body).expect("parse"), vec![run()]);
    }

    #[test]
    fn all_envelopes_normalize_identically() {
        let bare = parse_schedule_body(r#"[{"time":"09:00","activity":"Gym"}]"#).expect("bare");
        let nested =
            parse_schedule_body(r#"{"schedule":{"activities":[{"time":"09:00","activity":"Gym"}]}}"#)
                .expect("nested");
        assert_eq!(bare, nested);
    }

    #[test]
    fn rejects_unrecognized_envelope() {
        assert!(matches!(
            parse_schedule_body(r#"{"unexpected":true}"#),
            Err(InfraError::InvalidPayload(_))
        ));
    }

    #[test]
    fn save_request_serializes_date_and_activities() {
        let activities = vec![run()];
        let request = SaveScheduleRequest {
            date: "16/02/2026",
            activities: &activities,
        };
        let json = serde_json::to_value(&request).expect("serialize request");
        assert_eq!(
            json,
            serde_json::json!({
                "date": "16/02/2026",
                "activities": [
                    {"time": "07:30", "activity": "Run", "repeat": "once", "days": []}
                ],
            })
        );
    }

    #[test]
    fn day_endpoint_escapes_date_separators() {
        let store = ReqwestScheduleStore::new("http://localhost:5000/api").expect("store");
        let url = store.schedule_day_endpoint("16/02/2026").expect("endpoint");
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/schedule/16%2F02%2F2026"
        );
    }
}
