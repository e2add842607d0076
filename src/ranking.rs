//! Personal ranking and leaderboard contract
//!
//! Personal records are persisted to LocalStorage, fastest time first. The
//! leaderboard types mirror the JSON exchanged with the `/ranking` function.

use serde::{Deserialize, Serialize};

use crate::engine::SelectionState;
use crate::error::RankingError;
use crate::platform::storage;

/// Name/avatar pair stored with a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedPick {
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// One completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    /// Clear time in seconds
    pub time: u64,
    #[serde(default)]
    pub comment: String,
    /// ISO-8601 timestamp
    pub timestamp: String,
    #[serde(default)]
    pub sinner: Option<RecordedPick>,
    #[serde(default)]
    pub persona: Option<RecordedPick>,
}

impl PersonalRecord {
    /// Build a record for the current selection
    pub fn from_selection(
        time: u64,
        comment: &str,
        selection: &SelectionState,
        timestamp: String,
    ) -> Result<Self, RankingError> {
        if time == 0 {
            return Err(RankingError::ZeroTime);
        }

        let persona = selection.persona().map(|p| RecordedPick {
            name: p.name.clone(),
            avatar: p.avatar.clone(),
        });
        // The sinner entry shows the persona's art when it has one
        let sinner = selection.sinner().map(|s| RecordedPick {
            name: s.name.clone(),
            avatar: persona
                .as_ref()
                .and_then(|p| p.avatar.clone())
                .or_else(|| s.avatar.clone()),
        });

        Ok(Self {
            time,
            comment: comment.trim().to_string(),
            timestamp,
            sinner,
            persona,
        })
    }
}

/// Locally stored records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonalRanking {
    pub records: Vec<PersonalRecord>,
}

impl PersonalRanking {
    /// LocalStorage key (shared with the existing page)
    const STORAGE_KEY: &'static str = "personalRanking";

    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Insert keeping ascending time order.
    /// Returns the rank achieved (1-indexed).
    pub fn add_record(&mut self, record: PersonalRecord) -> Result<usize, RankingError> {
        if record.time == 0 {
            return Err(RankingError::ZeroTime);
        }
        let pos = self
            .records
            .iter()
            .position(|r| record.time < r.time)
            .unwrap_or(self.records.len());
        self.records.insert(pos, record);
        Ok(pos + 1)
    }

    /// Records sorted fastest first
    pub fn sorted(&self) -> Vec<&PersonalRecord> {
        let mut records: Vec<_> = self.records.iter().collect();
        records.sort_by_key(|r| r.time);
        records
    }

    pub fn best_time(&self) -> Option<u64> {
        self.records.iter().map(|r| r.time).min()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn load() -> Self {
        match storage::load_json::<Self>(Self::STORAGE_KEY) {
            Some(ranking) => {
                log::info!("Loaded {} personal records", ranking.records.len());
                ranking
            }
            None => Self::new(),
        }
    }

    pub fn save(&self) {
        if storage::save_json(Self::STORAGE_KEY, self) {
            log::info!("Personal ranking saved ({} records)", self.records.len());
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
        storage::remove(Self::STORAGE_KEY);
        log::info!("Personal ranking cleared");
    }
}

/// Current time as ISO-8601
#[cfg(target_arch = "wasm32")]
pub fn now_iso() -> String {
    String::from(js_sys::Date::new_0().to_iso_string())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_iso() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("@{}", secs)
}

/// Format seconds as zero-padded `HH:MM:SS`
pub fn format_time(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

// === Leaderboard contract ===

/// `POST /ranking` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub user_id: String,
    pub time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl SubmitRequest {
    pub fn from_record(user_id: &str, nickname: Option<&str>, record: &PersonalRecord) -> Self {
        Self {
            user_id: user_id.to_string(),
            time: record.time,
            nickname: nickname.map(str::to_string),
            comment: (!record.comment.is_empty()).then(|| record.comment.clone()),
        }
    }

    /// JSON body for the POST
    pub fn to_json(&self) -> Result<String, RankingError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Envelope of every leaderboard response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn is_ok(&self) -> bool {
        self.code == 200
    }
}

/// `POST /ranking` result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
    pub rank: u32,
    pub record_id: String,
}

/// One row of `GET /ranking`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub record_id: String,
    pub user_id: String,
    pub nickname: String,
    pub time: f64,
    #[serde(default)]
    pub comment: String,
    pub timestamp: u64,
}

/// `GET /ranking` page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardPage {
    pub page: u32,
    pub page_size: u32,
    pub total: u32,
    pub total_pages: u32,
    pub records: Vec<LeaderboardEntry>,
}

/// Query string for `GET /ranking`; `limit` is clamped to the server's 1..=100
pub fn leaderboard_query(limit: u32, offset: u32) -> String {
    format!("limit={}&offset={}", limit.clamp(1, 100), offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Persona, Sinner};

    fn record(time: u64) -> PersonalRecord {
        PersonalRecord {
            time,
            comment: String::new(),
            timestamp: "2026-01-01T00:00:00.000Z".into(),
            sinner: None,
            persona: None,
        }
    }

    fn selection() -> SelectionState {
        let mut state = SelectionState::new();
        state.set_sinner(Sinner {
            id: 1,
            name: "Yi Sang".into(),
            avatar: Some("yi-sang.webp".into()),
            personas: Vec::new(),
        });
        state.set_persona(Persona {
            name: "LCB Sinner Yi Sang".into(),
            avatar: None,
        });
        state
    }

    #[test]
    fn test_add_record_keeps_fastest_first() {
        let mut ranking = PersonalRanking::new();
        assert_eq!(ranking.add_record(record(300)).unwrap(), 1);
        assert_eq!(ranking.add_record(record(120)).unwrap(), 1);
        assert_eq!(ranking.add_record(record(200)).unwrap(), 2);
        assert_eq!(ranking.add_record(record(300)).unwrap(), 4);

        let times: Vec<_> = ranking.sorted().iter().map(|r| r.time).collect();
        assert_eq!(times, [120, 200, 300, 300]);
        assert_eq!(ranking.best_time(), Some(120));
    }

    #[test]
    fn test_record_from_selection() {
        let rec = PersonalRecord::from_selection(95, "  clean run ", &selection(), "t".into()).unwrap();
        assert_eq!(rec.comment, "clean run");
        assert_eq!(rec.sinner.as_ref().map(|s| s.name.as_str()), Some("Yi Sang"));
        assert_eq!(rec.sinner.unwrap().avatar.as_deref(), Some("yi-sang.webp"));
        assert_eq!(rec.persona.map(|p| p.name), Some("LCB Sinner Yi Sang".to_string()));
    }

    #[test]
    fn test_zero_time_rejected() {
        assert!(matches!(
            PersonalRecord::from_selection(0, "", &selection(), "t".into()),
            Err(RankingError::ZeroTime)
        ));
        let mut ranking = PersonalRanking::new();
        assert!(matches!(ranking.add_record(record(0)), Err(RankingError::ZeroTime)));
        assert!(ranking.is_empty());
    }

    #[test]
    fn test_storage_format_is_plain_array() {
        let mut ranking = PersonalRanking::new();
        ranking.add_record(record(60)).unwrap();
        let json = serde_json::to_string(&ranking).unwrap();
        assert!(json.starts_with('['));

        let legacy = r#"[{"time": 42, "timestamp": "x", "sinner": {"name": "Faust"}, "persona": null}]"#;
        let restored: PersonalRanking = serde_json::from_str(legacy).unwrap();
        assert_eq!(restored.records[0].time, 42);
        assert_eq!(restored.records[0].comment, "");
    }

    #[test]
    fn test_submit_request_omits_empty_fields() {
        let json = SubmitRequest::from_record("u1", None, &record(10)).to_json().unwrap();
        assert_eq!(json, r#"{"userId":"u1","time":10}"#);

        let mut rec = record(10);
        rec.comment = "gg".into();
        let json = SubmitRequest::from_record("u1", Some("Dante"), &rec).to_json().unwrap();
        assert_eq!(json, r#"{"userId":"u1","time":10,"nickname":"Dante","comment":"gg"}"#);
    }

    #[test]
    fn test_leaderboard_page_parses() {
        let json = r#"{
            "code": 200,
            "message": "ok",
            "data": {
                "page": 1, "pageSize": 10, "total": 1, "totalPages": 1,
                "records": [{
                    "rank": 1, "recordId": "record_1", "userId": "u", "nickname": "n",
                    "time": 61.5, "comment": "", "timestamp": 1700000000000
                }]
            }
        }"#;
        let resp: ApiResponse<LeaderboardPage> = serde_json::from_str(json).unwrap();
        assert!(resp.is_ok());
        assert_eq!(resp.data.unwrap().records[0].record_id, "record_1");

        let err: ApiResponse<SubmitResult> =
            serde_json::from_str(r#"{"code": 400, "message": "bad"}"#).unwrap();
        assert!(!err.is_ok());
        assert!(err.data.is_none());
    }

    #[test]
    fn test_format_time_and_query() {
        assert_eq!(format_time(0), "00:00:00");
        assert_eq!(format_time(65), "00:01:05");
        assert_eq!(format_time(3725), "01:02:05");
        assert_eq!(format_time(360_000), "100:00:00");
        assert_eq!(leaderboard_query(500, 20), "limit=100&offset=20");
    }
}
