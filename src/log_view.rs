use crate::models::{LogEntry, LogType, Priority, Status};
use crate::stats::LogStats;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use std::str::FromStr;

/// Filter tabs of the log list. `High` selects by priority while the other
/// tags select by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFilter {
    #[default]
    All,
    Pending,
    InProgress,
    Completed,
    High,
}

impl LogFilter {
    pub fn matches(self, entry: &LogEntry) -> bool {
        match self {
            LogFilter::All => true,
            LogFilter::Pending => entry.status == Status::Pending,
            LogFilter::InProgress => entry.status == Status::InProgress,
            LogFilter::Completed => entry.status == Status::Completed,
            LogFilter::High => entry.priority == Priority::High,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogFilter::All => "all",
            LogFilter::Pending => "pending",
            LogFilter::InProgress => "in-progress",
            LogFilter::Completed => "completed",
            LogFilter::High => "high",
        }
    }
}

impl FromStr for LogFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(LogFilter::All),
            "pending" => Ok(LogFilter::Pending),
            "in-progress" => Ok(LogFilter::InProgress),
            "completed" => Ok(LogFilter::Completed),
            "high" => Ok(LogFilter::High),
            other => Err(format!("unknown filter '{other}'")),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogCard {
    pub id: i64,
    pub date: NaiveDate,
    pub date_label: String,
    pub type_label: &'static str,
    pub type_icon: &'static str,
    pub priority: Priority,
    pub priority_label: &'static str,
    pub priority_icon: &'static str,
    pub status: Status,
    pub status_label: &'static str,
    pub status_icon: &'static str,
    pub project: Option<String>,
    pub activity: String,
    pub duration: f64,
    pub notes: Option<String>,
    pub added_label: String,
    pub modified_label: Option<String>,
    pub completed: bool,
}

impl LogCard {
    pub fn from_entry(entry: &LogEntry) -> Self {
        Self {
            id: entry.id,
            date: entry.date,
            date_label: entry.date.format("%a, %-d %b %Y").to_string(),
            type_label: type_label(entry.kind),
            type_icon: type_icon(entry.kind),
            priority: entry.priority,
            priority_label: priority_label(entry.priority),
            priority_icon: priority_icon(entry.priority),
            status: entry.status,
            status_label: status_label(entry.status),
            status_icon: status_icon(entry.status),
            project: entry.project.clone(),
            activity: entry.activity.clone(),
            duration: entry.duration,
            notes: entry.notes.clone(),
            added_label: timestamp_label(entry.timestamp),
            modified_label: entry.last_modified.map(timestamp_label),
            completed: entry.status == Status::Completed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LogListView {
    pub filter: &'static str,
    pub cards: Vec<LogCard>,
    pub stats: LogStats,
}

/// Cards for the entries passing `filter`, in repository order.
pub fn render_cards<'a>(
    entries: impl IntoIterator<Item = &'a LogEntry>,
    filter: LogFilter,
) -> Vec<LogCard> {
    entries
        .into_iter()
        .filter(|entry| filter.matches(entry))
        .map(LogCard::from_entry)
        .collect()
}

pub fn type_label(kind: LogType) -> &'static str {
    match kind {
        LogType::Project => "Project",
        LogType::Meeting => "Meeting",
        LogType::Learning => "Learning",
        LogType::Presentation => "Presentation",
        LogType::Other => "Other",
    }
}

pub fn type_icon(kind: LogType) -> &'static str {
    match kind {
        LogType::Project => "🚀",
        LogType::Meeting => "👥",
        LogType::Learning => "📚",
        LogType::Presentation => "📽️",
        LogType::Other => "📋",
    }
}

pub fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "High",
        Priority::Medium => "Medium",
        Priority::Low => "Low",
    }
}

pub fn priority_icon(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "🔥",
        Priority::Medium => "⚡",
        Priority::Low => "🌱",
    }
}

pub fn status_label(status: Status) -> &'static str {
    match status {
        Status::Pending => "Not started",
        Status::InProgress => "In progress",
        Status::Completed => "Completed",
    }
}

pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Pending => "⏳",
        Status::InProgress => "🔄",
        Status::Completed => "✅",
    }
}

fn timestamp_label(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format("%-d %b %H:%M")
        .to_string()
}
