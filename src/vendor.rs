use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Clone)]
pub struct Credentials {
    pub identity: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("secret", &"***")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("credentials rejected: {0}")]
    Rejected(String),
    #[error("login request failed: {0}")]
    Service(String),
}

#[derive(Debug, Error)]
#[error("daily fetch for {date} failed: {message}")]
pub struct TransientError {
    pub date: NaiveDate,
    pub message: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HrvCallError {
    /// The operation exists but not with this calling convention.
    #[error("operation does not accept this argument list")]
    ArityMismatch,
    #[error("operation not available on this handle")]
    Unsupported,
    #[error("operation failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HrvOperation {
    HrvData,
    Hrv,
    HeartRateVariability,
    HrvSummary,
}

impl HrvOperation {
    pub const ORDERED: [HrvOperation; 4] = [
        HrvOperation::HrvData,
        HrvOperation::Hrv,
        HrvOperation::HeartRateVariability,
        HrvOperation::HrvSummary,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HrvOperation::HrvData => "get_hrv_data",
            HrvOperation::Hrv => "get_hrv",
            HrvOperation::HeartRateVariability => "get_heart_rate_variability",
            HrvOperation::HrvSummary => "get_hrv_summary",
        }
    }
}

pub type SharedHandle = Arc<dyn WellnessHandle>;

#[async_trait]
pub trait WellnessHandle: Send + Sync + 'static {
    async fn fetch_daily_sleep(&self, date: NaiveDate) -> Result<Option<Value>, TransientError>;

    async fn call_hrv(
        &self,
        operation: HrvOperation,
        day: Option<NaiveDate>,
    ) -> Result<Value, HrvCallError>;

    fn operations(&self) -> Vec<String>;
}

#[async_trait]
pub trait WellnessSource: Send + Sync + 'static {
    async fn authenticate(&self, credentials: &Credentials) -> Result<SharedHandle, AuthError>;
}
