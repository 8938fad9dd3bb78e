use crate::vendor::{HrvCallError, HrvOperation, WellnessHandle};
use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedHrv {
    pub operation: &'static str,
    pub record: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No HRV data found")]
pub struct HrvNotFound {
    pub candidates: Vec<String>,
}

pub async fn resolve_hrv<H>(handle: &H, day: NaiveDate) -> Result<ResolvedHrv, HrvNotFound>
where
    H: WellnessHandle + ?Sized,
{
    for operation in HrvOperation::ORDERED {
        let outcome = match handle.call_hrv(operation, Some(day)).await {
            Err(HrvCallError::ArityMismatch) => {
                debug!(operation = operation.name(), "retrying without day argument");
                handle.call_hrv(operation, None).await
            }
            other => other,
        };

        match outcome {
            Ok(record) => {
                return Ok(ResolvedHrv {
                    operation: operation.name(),
                    record,
                });
            }
            Err(err) => debug!(operation = operation.name(), "hrv attempt failed: {err}"),
        }
    }

    Err(HrvNotFound {
        candidates: metric_operations(&handle.operations()),
    })
}

fn metric_operations(names: &[String]) -> Vec<String> {
    let mut found: Vec<String> = names
        .iter()
        .filter(|name| {
            let lower = name.to_ascii_lowercase();
            lower.contains("hrv") || lower.contains("heart")
        })
        .cloned()
        .collect();
    found.sort();
    found.dedup();
    found
}
