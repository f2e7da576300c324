use super::ApiClient;
use crate::api::models;
use crate::error::Result;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

pub async fn list_history(client: &ApiClient) -> Result<Vec<models::HistoryRecord>> {
    Ok(client
        .get("historial")
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<models::HistoryRecord>>()
        .await?)
}

/// The `limit` most recent brews, newest first.
pub async fn recent_history(
    client: &ApiClient,
    limit: usize,
) -> Result<Vec<models::HistoryRecord>> {
    Ok(most_recent(list_history(client).await?, limit))
}

pub async fn record_brew(
    client: &ApiClient,
    record: &models::NewHistoryRecord,
) -> Result<models::HistoryRecord> {
    Ok(client
        .post("historial")
        .json(record)
        .send()
        .await?
        .error_for_status()?
        .json::<models::HistoryRecord>()
        .await?)
}

/// Records without a creation time sort last.
pub fn most_recent(
    mut records: Vec<models::HistoryRecord>,
    limit: usize,
) -> Vec<models::HistoryRecord> {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records.truncate(limit);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{CupSize, HistoryRecord, Temperature};
    use chrono::{Duration, Utc};

    fn record(id: &str, minutes_ago: Option<i64>) -> HistoryRecord {
        HistoryRecord {
            id: id.to_string(),
            machine_id: String::from("1"),
            ip_address: String::from("10.0.0.2"),
            location: String::from("Lobby"),
            beverage: String::from("ESPRESSO"),
            temperature: Temperature::Hot,
            cup_size: CupSize::Standard,
            created_at: minutes_ago.map(|m| Utc::now() - Duration::minutes(m)),
        }
    }

    #[test]
    fn newest_first_and_capped() {
        let mut records: Vec<HistoryRecord> = (0..15)
            .map(|i| record(&i.to_string(), Some(i)))
            .collect();
        records.reverse();

        let recent = most_recent(records, DEFAULT_HISTORY_LIMIT);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].id, "0");
        assert_eq!(recent[9].id, "9");
    }

    #[test]
    fn undated_records_sort_last() {
        let recent = most_recent(vec![record("a", None), record("b", Some(3))], 10);
        assert_eq!(recent[0].id, "b");
        assert_eq!(recent[1].id, "a");
    }
}
