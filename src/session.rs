use crate::vendor::{AuthError, Credentials, SharedHandle, WellnessSource};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connected {
    pub user_id: String,
    pub replaced: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disconnected {
    pub user_id: String,
    pub removed: bool,
}

#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    async fn connect(
        &self,
        user_id: &str,
        credentials: &Credentials,
    ) -> Result<Connected, AuthError>;

    async fn status(&self, user_id: &str) -> bool;

    async fn disconnect(&self, user_id: &str) -> Disconnected;

    async fn handle(&self, user_id: &str) -> Option<SharedHandle>;
}

struct Session {
    handle: SharedHandle,
    created_at: Instant,
}

#[derive(Clone)]
pub struct InMemorySessions {
    source: Arc<dyn WellnessSource>,
    sessions: Arc<Mutex<HashMap<String, Session>>>,
    ttl: Option<Duration>,
}

impl InMemorySessions {
    pub fn new(source: Arc<dyn WellnessSource>, ttl: Option<Duration>) -> Self {
        Self {
            source,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    fn is_expired(&self, session: &Session) -> bool {
        self.ttl.is_some_and(|ttl| session.created_at.elapsed() >= ttl)
    }

    async fn live_handle(&self, user_id: &str) -> Option<SharedHandle> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get(user_id)?;
        if !self.is_expired(session) {
            return Some(Arc::clone(&session.handle));
        }
        sessions.remove(user_id);
        info!(user_id, "session expired");
        None
    }
}

#[async_trait]
impl SessionStore for InMemorySessions {
    async fn connect(
        &self,
        user_id: &str,
        credentials: &Credentials,
    ) -> Result<Connected, AuthError> {
        let handle = match self.source.authenticate(credentials).await {
            Ok(handle) => handle,
            Err(err) => {
                warn!(user_id, "login failed: {err}");
                return Err(err);
            }
        };

        let previous = self.sessions.lock().await.insert(
            user_id.to_string(),
            Session {
                handle,
                created_at: Instant::now(),
            },
        );
        info!(user_id, replaced = previous.is_some(), "session connected");

        Ok(Connected {
            user_id: user_id.to_string(),
            replaced: previous.is_some(),
        })
    }

    async fn status(&self, user_id: &str) -> bool {
        self.live_handle(user_id).await.is_some()
    }

    async fn disconnect(&self, user_id: &str) -> Disconnected {
        let removed = self.sessions.lock().await.remove(user_id).is_some();
        if removed {
            info!(user_id, "session disconnected");
        }
        Disconnected {
            user_id: user_id.to_string(),
            removed,
        }
    }

    async fn handle(&self, user_id: &str) -> Option<SharedHandle> {
        self.live_handle(user_id).await
    }
}
