use crate::config::{Config, DayBoundary};
use crate::session::{InMemorySessions, SessionStore};
use crate::vendor::{Credentials, WellnessSource};
use regex::Regex;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub source: Arc<dyn WellnessSource>,
    pub day_boundary: DayBoundary,
    pub sync_secret: Option<Arc<str>>,
    pub default_credentials: Option<Credentials>,
    pub cors_origin: Regex,
}

impl AppState {
    pub fn new(config: &Config, source: Arc<dyn WellnessSource>) -> Self {
        Self {
            sessions: Arc::new(InMemorySessions::new(source.clone(), config.session_ttl)),
            source,
            day_boundary: config.day_boundary,
            sync_secret: config.sync_secret.as_deref().map(Arc::from),
            default_credentials: config.default_credentials.clone(),
            cors_origin: config.cors_origin.clone(),
        }
    }
}
