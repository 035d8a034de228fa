use crate::models::{EditLog, LogEntry, LogType, NewLog, Status};
use chrono::{DateTime, NaiveDate, Utc};

/// Activity log entries, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogBook {
    entries: Vec<LogEntry>,
}

impl LogBook {
    pub fn new(entries: Vec<LogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&LogEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Prepends a new entry. Incomplete input or a non-positive duration is
    /// ignored and yields `None`.
    pub fn add(&mut self, form: NewLog, now: DateTime<Utc>) -> Option<&LogEntry> {
        let activity = non_blank(form.activity)?;
        let duration = form.duration.filter(|d| d.is_finite() && *d > 0.0)?;
        let (Some(date), Some(kind), Some(priority), Some(status)) =
            (form.date, form.kind, form.priority, form.status)
        else {
            return None;
        };

        let project = if kind == LogType::Project {
            non_blank(form.project)
        } else {
            None
        };

        let entry = LogEntry {
            id: self.next_id(now),
            date,
            kind,
            priority,
            status,
            project,
            activity,
            duration,
            notes: non_blank(form.notes),
            timestamp: now,
            last_modified: None,
        };
        self.entries.insert(0, entry);
        self.entries.first()
    }

    pub fn toggle_status(&mut self, id: i64) -> Option<Status> {
        let entry = self.get_mut(id)?;
        entry.status = entry.status.cycled();
        Some(entry.status)
    }

    pub fn edit(&mut self, id: i64, form: EditLog, now: DateTime<Utc>) -> Option<&LogEntry> {
        let entry = self.get_mut(id)?;
        entry.status = form.status;
        entry.priority = form.priority;
        entry.duration = form.duration;
        entry.notes = non_blank(form.notes);
        entry.last_modified = Some(now);
        Some(&*entry)
    }

    pub fn delete(&mut self, id: i64) -> usize {
        self.bulk_delete(&[id])
    }

    pub fn bulk_delete(&mut self, ids: &[i64]) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| !ids.contains(&entry.id));
        before - self.entries.len()
    }

    pub fn bulk_mark_complete(&mut self, ids: &[i64]) -> usize {
        let mut marked = 0;
        for entry in self.entries.iter_mut().filter(|entry| ids.contains(&entry.id)) {
            entry.status = Status::Completed;
            marked += 1;
        }
        marked
    }

    /// Case-insensitive substring match over activity, project and notes.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a LogEntry> + 'a {
        let needle = query.to_lowercase();
        self.entries.iter().filter(move |entry| {
            contains(&entry.activity, &needle)
                || entry.project.as_deref().is_some_and(|p| contains(p, &needle))
                || entry.notes.as_deref().is_some_and(|n| contains(n, &needle))
        })
    }

    pub fn in_date_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Iterator<Item = &LogEntry> + '_ {
        self.entries
            .iter()
            .filter(move |entry| entry.date >= from && entry.date <= to)
    }

    fn get_mut(&mut self, id: i64) -> Option<&mut LogEntry> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    // Millisecond creation time, bumped past the current maximum on collision.
    fn next_id(&self, now: DateTime<Utc>) -> i64 {
        let candidate = now.timestamp_millis();
        match self.entries.iter().map(|entry| entry.id).max() {
            Some(max) if max >= candidate => max + 1,
            _ => candidate,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
