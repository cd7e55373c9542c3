//! Day-by-day activity schedule backend: a [`ScheduleSession`] that keeps
//! one date's committed activity list in sync with a remote store, and a
//! [`DraftBuffer`] for the in-progress add/edit form.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::draft::{DraftBuffer, DraftCommit};
pub use application::session::{RetryPolicy, ScheduleSession, SessionError};
pub use domain::models::{format_date_key, Activity, RepeatPolicy, ScheduleDay};
pub use infrastructure::config::{ensure_default_config, load_config, AppConfig};
pub use infrastructure::credential_store::{
    CredentialStore, InMemoryCredentialStore, KeyringCredentialStore,
};
pub use infrastructure::error::InfraError;
pub use infrastructure::schedule_store::{ReqwestScheduleStore, ScheduleStore};
