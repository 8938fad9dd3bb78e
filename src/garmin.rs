use crate::config::GarminConfig;
use crate::vendor::{
    AuthError, Credentials, HrvCallError, HrvOperation, SharedHandle, TransientError,
    WellnessHandle, WellnessSource,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

const SLEEP_OPERATION: &str = "get_sleep_data";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SocialProfile {
    display_name: String,
}

#[derive(Clone)]
pub struct GarminConnect {
    client: Client,
    api_base: String,
    token_url: String,
}

impl GarminConnect {
    pub fn new(config: &GarminConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token_url: config.token_url.clone(),
        })
    }

    async fn display_name(&self, token: &str) -> Result<String, AuthError> {
        let response = self
            .client
            .get(format!("{}/userprofile-service/socialProfile", self.api_base))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|err| AuthError::Service(err.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::Service(format!(
                "profile lookup returned {}",
                response.status()
            )));
        }

        let profile: SocialProfile = response
            .json()
            .await
            .map_err(|err| AuthError::Service(err.to_string()))?;
        Ok(profile.display_name)
    }
}

#[async_trait]
impl WellnessSource for GarminConnect {
    async fn authenticate(&self, credentials: &Credentials) -> Result<SharedHandle, AuthError> {
        let response = self
            .client
            .post(&self.token_url)
            .json(&json!({
                "username": credentials.identity,
                "password": credentials.secret,
            }))
            .send()
            .await
            .map_err(|err| AuthError::Service(err.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AuthError::Rejected(format!(
                    "token endpoint returned {}",
                    response.status()
                )));
            }
            status if !status.is_success() => {
                return Err(AuthError::Service(format!("token endpoint returned {status}")));
            }
            _ => {}
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|err| AuthError::Service(err.to_string()))?;
        let display_name = self.display_name(&token.access_token).await?;

        Ok(Arc::new(GarminHandle {
            client: self.client.clone(),
            api_base: self.api_base.clone(),
            token: token.access_token,
            display_name,
        }))
    }
}

pub struct GarminHandle {
    client: Client,
    api_base: String,
    token: String,
    display_name: String,
}

impl GarminHandle {
    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<Value>, String> {
        let response = self
            .client
            .get(format!("{}{path}", self.api_base))
            .query(query)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|err| err.to_string())?;

        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => return Ok(None),
            status if !status.is_success() => return Err(format!("vendor returned {status}")),
            _ => {}
        }

        let body: Value = response.json().await.map_err(|err| err.to_string())?;
        Ok((!body.is_null()).then_some(body))
    }

    async fn hrv_record(&self, path: &str) -> Result<Value, HrvCallError> {
        match self.get_json(path, &[]).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(HrvCallError::Failed(format!("no hrv data at {path}"))),
            Err(message) => Err(HrvCallError::Failed(message)),
        }
    }
}

#[async_trait]
impl WellnessHandle for GarminHandle {
    async fn fetch_daily_sleep(&self, date: NaiveDate) -> Result<Option<Value>, TransientError> {
        let path = format!(
            "/wellness-service/wellness/dailySleepData/{}",
            self.display_name
        );
        let query = [
            ("date", date.to_string()),
            ("nonSleepBufferMinutes", "60".to_string()),
        ];
        self.get_json(&path, &query)
            .await
            .map_err(|message| TransientError { date, message })
    }

    async fn call_hrv(
        &self,
        operation: HrvOperation,
        day: Option<NaiveDate>,
    ) -> Result<Value, HrvCallError> {
        match (operation, day) {
            (HrvOperation::HrvData, Some(day)) => {
                self.hrv_record(&format!("/hrv-service/hrv/{day}")).await
            }
            (HrvOperation::HrvSummary, None) => self.hrv_record("/hrv-service/hrv").await,
            (HrvOperation::HrvData, None) | (HrvOperation::HrvSummary, Some(_)) => {
                Err(HrvCallError::ArityMismatch)
            }
            _ => Err(HrvCallError::Unsupported),
        }
    }

    fn operations(&self) -> Vec<String> {
        vec![
            SLEEP_OPERATION.to_string(),
            HrvOperation::HrvData.name().to_string(),
            HrvOperation::HrvSummary.name().to_string(),
        ]
    }
}
