use crate::vendor::WellnessHandle;
use chrono::{Duration, NaiveDate};
use serde_json::Value;
use tracing::warn;

pub const LOOKBACK_DAYS: i64 = 7;

const SUMMARY_KEY: &str = "dailySleepDTO";

const SUMMARY_FIELDS: [&str; 7] = [
    "sleepTimeSeconds",
    "sleepStartTimestampGMT",
    "sleepEndTimestampGMT",
    "deepSleepSeconds",
    "lightSleepSeconds",
    "remSleepSeconds",
    "awakeSleepSeconds",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSleep {
    pub date: NaiveDate,
    pub record: Value,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("No valid data found")]
pub struct NotFound;

pub async fn resolve_sleep<H>(handle: &H, today: NaiveDate) -> Result<ResolvedSleep, NotFound>
where
    H: WellnessHandle + ?Sized,
{
    for offset in 0..LOOKBACK_DAYS {
        let date = today - Duration::days(offset);
        let record = match handle.fetch_daily_sleep(date).await {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(err) => {
                warn!("skipping day: {err}");
                continue;
            }
        };

        if is_valid_record(&record) {
            return Ok(ResolvedSleep { date, record });
        }
    }

    Err(NotFound)
}

pub fn is_valid_record(record: &Value) -> bool {
    if !is_truthy(record) {
        return false;
    }

    let Some(summary) = record.get(SUMMARY_KEY).and_then(Value::as_object) else {
        return false;
    };

    SUMMARY_FIELDS
        .iter()
        .any(|field| summary.get(*field).is_some_and(is_truthy))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}
