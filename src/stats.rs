use crate::models::{LogEntry, StudyData, Status};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    pub total_logs: usize,
    pub total_hours: f64,
    pub completed_tasks: usize,
    pub this_week_hours: f64,
    pub progress_percent: u32,
}

pub fn build_log_stats_at(today: NaiveDate, entries: &[LogEntry]) -> LogStats {
    let total_logs = entries.len();
    let total_hours = entries.iter().map(|entry| entry.duration).sum();
    let completed_tasks = entries
        .iter()
        .filter(|entry| entry.status == Status::Completed)
        .count();

    let start = week_start(today);
    let this_week_hours = entries
        .iter()
        .filter(|entry| entry.date >= start)
        .map(|entry| entry.duration)
        .sum();

    let progress_percent = if total_logs == 0 {
        0
    } else {
        (100.0 * completed_tasks as f64 / total_logs as f64).round() as u32
    };

    LogStats {
        total_logs,
        total_hours,
        completed_tasks,
        this_week_hours,
        progress_percent,
    }
}

/// Sunday that opens the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectBreakdown {
    pub name: String,
    pub progress: u8,
    pub minutes: f64,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyAnalytics {
    pub total_study_minutes: f64,
    pub subject_count: usize,
    pub completed_subjects: usize,
    pub average_progress: u8,
    pub streak: u32,
    pub goals_completed: usize,
    pub goals_total: usize,
    pub subjects: Vec<SubjectBreakdown>,
}

pub fn build_study_analytics(data: &StudyData) -> StudyAnalytics {
    let subject_count = data.subjects.len();
    let completed_subjects = data.subjects.iter().filter(|s| s.completed).count();
    let average_progress = if subject_count == 0 {
        0
    } else {
        let sum: u32 = data.subjects.iter().map(|s| u32::from(s.progress)).sum();
        (sum as f64 / subject_count as f64).round() as u8
    };

    StudyAnalytics {
        total_study_minutes: data.study_time,
        subject_count,
        completed_subjects,
        average_progress,
        streak: data.streak,
        goals_completed: data.goals.iter().filter(|g| g.completed).count(),
        goals_total: data.goals.len(),
        subjects: data
            .subjects
            .iter()
            .map(|s| SubjectBreakdown {
                name: s.name.clone(),
                progress: s.progress,
                minutes: s.total_time + s.running_timer_elapsed,
                completed: s.completed,
            })
            .collect(),
    }
}
