use crate::application::draft::DraftCommit;
use crate::domain::models::{format_date_key, Activity, ScheduleDay};
use crate::infrastructure::credential_store::CredentialStore;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::schedule_store::ScheduleStore;
use chrono::{Duration, Local, NaiveDate};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::{sleep, Duration as TokioDuration};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("no activity at index {0}")]
    InvalidIndex(usize),
    #[error(transparent)]
    Store(#[from] InfraError),
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u8,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
        }
    }
}

/// Owns the selected date and the committed activity list for that date,
/// and performs all remote synchronization: fetch on date change, push of
/// the whole day on every mutation.
///
/// Reads are fail-soft: any failure degrades to an empty list and a log
/// line, never an error to the caller. Writes return a `SessionError` so
/// callers can surface a failed save; the local list keeps the mutation
/// either way and stays the source of truth until the next load.
pub struct ScheduleSession<S, C>
where
    S: ScheduleStore,
    C: CredentialStore,
{
    store: Arc<S>,
    credentials: Arc<C>,
    day: ScheduleDay,
    retry_policy: RetryPolicy,
}

impl<S, C> ScheduleSession<S, C>
where
    S: ScheduleStore,
    C: CredentialStore,
{
    /// Creates a session selecting today's date. Nothing is fetched until
    /// the first `load_for_date` (or `select_date`/`refresh`) call.
    pub fn new(store: Arc<S>, credentials: Arc<C>) -> Self {
        Self {
            store,
            credentials,
            day: ScheduleDay::empty(Local::now().date_naive()),
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_selected_date(mut self, date: NaiveDate) -> Self {
        self.day = ScheduleDay::empty(date);
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.day.date
    }

    /// The `DD/MM/YYYY` key the remote store is addressed with.
    pub fn formatted_date(&self) -> String {
        self.day.formatted_date()
    }

    pub fn day(&self) -> &ScheduleDay {
        &self.day
    }

    pub fn activities(&self) -> &[Activity] {
        &self.day.activities
    }

    /// Selects a date and reloads. The committed list is left in place
    /// until the fetch resolves, matching the view keeping the previous
    /// day's entries on screen while the next day loads.
    pub async fn select_date(&mut self, date: NaiveDate) {
        self.day.date = date;
        self.load_for_date().await;
    }

    pub async fn next_day(&mut self) {
        let date = self.day.date + Duration::days(1);
        self.select_date(date).await;
    }

    pub async fn previous_day(&mut self) {
        let date = self.day.date - Duration::days(1);
        self.select_date(date).await;
    }

    /// Re-issues the load for the current date. Hook this to the timetable
    /// view becoming active again, so the list cannot go stale while the
    /// user was elsewhere.
    pub async fn refresh(&mut self) {
        self.load_for_date().await;
    }

    /// Fetches the committed list for the selected date.
    ///
    /// No token is the normal unauthenticated state: the list is cleared
    /// and no request is issued. Transport, HTTP, and payload failures are
    /// logged and degrade to an empty list.
    pub async fn load_for_date(&mut self) {
        let token = match self.credentials.load_token() {
            Ok(Some(token)) => token,
            Ok(None) => {
                log::info!("no session token, showing an empty schedule");
                self.day.activities.clear();
                return;
            }
            Err(error) => {
                log::warn!("failed to read session token: {error}");
                self.day.activities.clear();
                return;
            }
        };

        let requested = self.day.date;
        let date_key = format_date_key(requested);
        match self.fetch_with_retry(&token, &date_key).await {
            Ok(activities) => self.apply_loaded(requested, activities),
            Err(error) => {
                log::warn!("failed to load schedule for {date_key}: {error}");
                self.apply_loaded(requested, Vec::new());
            }
        }
    }

    /// Applies a fetched list, but only if the selection still matches the
    /// date the fetch was issued for. A result that raced with a newer
    /// date change is discarded instead of overwriting the current day.
    fn apply_loaded(&mut self, requested: NaiveDate, activities: Vec<Activity>) {
        if requested != self.day.date {
            log::debug!(
                "discarding stale schedule response for {}",
                format_date_key(requested)
            );
            return;
        }
        self.day.activities = activities;
        self.day.sort_by_time();
    }

    /// Replaces the committed list, restores the time ordering, and pushes
    /// the whole day to the remote store.
    pub async fn commit_mutation(
        &mut self,
        activities: Vec<Activity>,
    ) -> Result<(), SessionError> {
        self.day.activities = activities;
        self.day.sort_by_time();
        self.save_day().await
    }

    /// Applies a draft commit: replace at the recorded index in edit mode,
    /// append in create mode, then sort and save.
    pub async fn apply(&mut self, commit: DraftCommit) -> Result<(), SessionError> {
        let mut activities = self.day.activities.clone();
        match commit.editing {
            Some(index) => {
                let Some(slot) = activities.get_mut(index) else {
                    return Err(SessionError::InvalidIndex(index));
                };
                *slot = commit.activity;
            }
            None => activities.push(commit.activity),
        }
        self.commit_mutation(activities).await
    }

    /// Removes one activity by position, then saves the whole day.
    pub async fn delete_at(&mut self, index: usize) -> Result<(), SessionError> {
        if index >= self.day.activities.len() {
            return Err(SessionError::InvalidIndex(index));
        }
        self.day.activities.remove(index);
        self.save_day().await
    }

    async fn save_day(&self) -> Result<(), SessionError> {
        let token = self
            .credentials
            .load_token()
            .map_err(SessionError::Store)?
            .ok_or(SessionError::NotAuthenticated)?;
        self.store
            .save_day(&token, &self.day.formatted_date(), &self.day.activities)
            .await?;
        Ok(())
    }

    async fn fetch_with_retry(
        &self,
        token: &str,
        date_key: &str,
    ) -> Result<Vec<Activity>, InfraError> {
        let max_attempts = self.retry_policy.max_attempts.max(1);
        let mut attempt: u8 = 0;

        loop {
            match self.store.fetch_day(token, date_key).await {
                Ok(activities) => return Ok(activities),
                Err(error) if Self::should_retry(&error) && attempt + 1 < max_attempts => {
                    let delay = self
                        .retry_policy
                        .base_delay_ms
                        .saturating_mul(2u64.saturating_pow(attempt as u32));
                    sleep(TokioDuration::from_millis(delay)).await;
                    attempt = attempt.saturating_add(1);
                }
                Err(error) => return Err(error),
            }
        }
    }

    fn should_retry(error: &InfraError) -> bool {
        matches!(error, InfraError::Transport(_))
    }
}
