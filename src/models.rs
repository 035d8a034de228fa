use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    Project,
    Meeting,
    Learning,
    Presentation,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    InProgress,
    Completed,
}

impl Status {
    /// Next status in the `completed -> pending -> in-progress -> completed` cycle.
    pub fn cycled(self) -> Self {
        match self {
            Status::Completed => Status::Pending,
            Status::Pending => Status::InProgress,
            Status::InProgress => Status::Completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in-progress",
            Status::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: i64,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: LogType,
    pub priority: Priority,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub activity: String,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

/// Raw add-log form. Every field is optional so a missing one is a silent
/// rejection rather than a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLog {
    pub date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub kind: Option<LogType>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub project: Option<String>,
    pub activity: Option<String>,
    pub duration: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditLog {
    pub status: Status,
    pub priority: Priority,
    pub duration: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub total_time: f64,
    #[serde(default)]
    pub running_timer_elapsed: f64,
    #[serde(default)]
    pub target_time: Option<f64>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub last_milestone: u8,
    // Older blobs predate the field; they load with the epoch.
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudyData {
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub study_time: f64,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_study_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubject {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub target_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest<T> {
    #[serde(default)]
    pub ids: Vec<T>,
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTimerRequest {
    pub subject: usize,
    pub minutes: f64,
}

#[derive(Debug, Deserialize)]
pub struct FaqRequest {
    pub question: String,
}

/// Result of a mutating call, mirroring the transient notification the page
/// shows after it.
#[derive(Debug, Serialize, Deserialize)]
pub struct Notice {
    pub changed: bool,
    pub message: String,
}

impl Notice {
    pub fn changed(message: impl Into<String>) -> Self {
        Self {
            changed: true,
            message: message.into(),
        }
    }

    pub fn unchanged(message: impl Into<String>) -> Self {
        Self {
            changed: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddLogResponse {
    pub added: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<LogEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FaqAnswer {
    pub question: String,
    pub answer: String,
    pub matched: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_cycle_returns_after_three_steps() {
        for start in [Status::Pending, Status::InProgress, Status::Completed] {
            let mut status = start;
            for _ in 0..9 {
                status = status.cycled();
            }
            assert_eq!(status, start);
            assert_ne!(start.cycled(), start);
        }
    }

    #[test]
    fn log_entry_uses_browser_field_names() {
        let json = r#"{
            "id": 1700000000000,
            "date": "2026-01-05",
            "type": "meeting",
            "priority": "high",
            "status": "in-progress",
            "project": "",
            "activity": "Standup",
            "duration": 0.5,
            "notes": "",
            "timestamp": "2026-01-05T08:00:00Z"
        }"#;
        let entry: LogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind, LogType::Meeting);
        assert_eq!(entry.status, Status::InProgress);
        assert!(entry.last_modified.is_none());

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "meeting");
        assert_eq!(value["status"], "in-progress");
    }

    #[test]
    fn study_data_tolerates_missing_fields() {
        let data: StudyData = serde_json::from_str(r#"{"subjects": []}"#).unwrap();
        assert_eq!(data.streak, 0);
        assert!(data.goals.is_empty());
    }

    #[test]
    fn subject_without_timestamp_loads() {
        let json = r#"{"subjects": [{"name": "Chemistry", "totalTime": 40}], "studyTime": 120, "streak": 4}"#;
        let data: StudyData = serde_json::from_str(json).unwrap();
        assert_eq!(data.subjects[0].name, "Chemistry");
        assert_eq!(data.subjects[0].timestamp, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(data.streak, 4);
    }

    #[test]
    fn enum_tags_match_wire_names() {
        for status in [Status::Pending, Status::InProgress, Status::Completed] {
            assert_eq!(serde_json::to_value(status).unwrap(), status.as_str());
        }
        for priority in [Priority::High, Priority::Medium, Priority::Low] {
            assert_eq!(serde_json::to_value(priority).unwrap(), priority.as_str());
        }
    }
}
