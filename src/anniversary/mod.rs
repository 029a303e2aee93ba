mod entry;
pub mod store;

pub use entry::{AnniversaryForm, BirthEntry, EntryError, TargetEntry};
pub use store::{AnniversaryPersister, AnniversaryStore};

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnniversaryId(String);

impl AnniversaryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AnniversaryId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for AnniversaryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for AnniversaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Pending,
    Fired,
}

/// Persisted as a flat record with an ISO-8601 `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anniversary {
    pub id: AnniversaryId,
    pub name: String,
    #[serde(rename = "date")]
    pub target: DateTime<Utc>,
    #[serde(default)]
    pub alarm_enabled: bool,
    #[serde(default)]
    pub alarm_triggered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_sound_id: Option<String>,
}

impl Anniversary {
    pub fn alarm_state(&self) -> AlarmState {
        if self.alarm_triggered {
            AlarmState::Fired
        } else {
            AlarmState::Pending
        }
    }
}

/// The user-editable fields of an [`Anniversary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnniversaryDraft {
    pub name: String,
    pub target: DateTime<Utc>,
    pub alarm_enabled: bool,
    pub alarm_sound_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn serializes_as_flat_camel_case_record() {
        let anniversary = Anniversary {
            id: AnniversaryId::from("a-1"),
            name: "Graduation".to_owned(),
            target: Utc.with_ymd_and_hms(2030, 6, 1, 9, 30, 0).unwrap(),
            alarm_enabled: true,
            alarm_triggered: false,
            alarm_sound_id: Some("chime".to_owned()),
        };

        let json = serde_json::to_value(&anniversary).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": "a-1",
                "name": "Graduation",
                "date": "2030-06-01T09:30:00Z",
                "alarmEnabled": true,
                "alarmTriggered": false,
                "alarmSoundId": "chime",
            })
        );
    }

    #[test]
    fn optional_alarm_fields_default_when_missing() {
        let json = r#"[{"id":"x","name":"Trip","date":"2031-01-02T03:04:05.000Z"}]"#;

        let parsed: Vec<Anniversary> = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.len(), 1);
        assert!(!parsed[0].alarm_enabled);
        assert_eq!(parsed[0].alarm_state(), AlarmState::Pending);
        assert_eq!(parsed[0].alarm_sound_id, None);
        assert_eq!(parsed[0].target, Utc.with_ymd_and_hms(2031, 1, 2, 3, 4, 5).unwrap());
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(AnniversaryId::generate(), AnniversaryId::generate());
    }
}
