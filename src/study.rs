//! Per-user study planner: subjects, goals, streak and the one active timer.

use crate::milestone::{self, DEFAULT_TARGET_MINUTES};
use crate::models::{Goal, NewSubject, StudyData, Subject};
use crate::timer::{CountdownTimer, TimerError, TimerState, TimerTick};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum StudyError {
    MissingName,
    DuplicateSubject(String),
    InvalidTarget,
    NothingSelected,
    UnknownSubject(usize),
    UnknownGoal(usize),
    EmptyGoal,
    Timer(TimerError),
}

impl fmt::Display for StudyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudyError::MissingName => write!(f, "Subject name is required"),
            StudyError::DuplicateSubject(name) => write!(f, "Subject '{name}' already exists"),
            StudyError::InvalidTarget => write!(f, "Target time must be a positive number of minutes"),
            StudyError::NothingSelected => write!(f, "Select at least one subject"),
            StudyError::UnknownSubject(index) => write!(f, "No subject at position {index}"),
            StudyError::UnknownGoal(index) => write!(f, "No goal at position {index}"),
            StudyError::EmptyGoal => write!(f, "Goal text is required"),
            StudyError::Timer(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for StudyError {}

impl From<TimerError> for StudyError {
    fn from(err: TimerError) -> Self {
        StudyError::Timer(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StudyEvent {
    Tick(TimerTick),
    MilestoneReached { subject: usize, milestone: u8 },
    SubjectCompleted { subject: usize },
    /// The countdown ran out on its own.
    TimerCompleted { subject: Option<usize>, minutes: f64 },
    /// The countdown was cut short and its minutes were kept.
    SessionCommitted { subject: Option<usize>, minutes: f64 },
}

impl StudyEvent {
    /// Events that change persisted data.
    pub fn needs_save(&self) -> bool {
        !matches!(self, StudyEvent::Tick(_))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    pub state: TimerState,
    pub subject: Option<String>,
    #[serde(flatten)]
    pub tick: TimerTick,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyView<'a> {
    pub user: &'a str,
    pub subjects: &'a [Subject],
    pub study_time: f64,
    pub streak: u32,
    pub goals: &'a [Goal],
    pub active: Option<usize>,
    pub timer: TimerView,
}

#[derive(Debug, Clone)]
pub struct StudySession {
    user: String,
    data: StudyData,
    active: Option<usize>,
    timer: CountdownTimer,
}

impl StudySession {
    pub fn new(user: impl Into<String>, data: StudyData) -> Self {
        Self {
            user: user.into(),
            data,
            active: None,
            timer: CountdownTimer::new(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn data(&self) -> &StudyData {
        &self.data
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn timer_state(&self) -> TimerState {
        self.timer.state()
    }

    pub fn timer_view(&self, now: DateTime<Utc>) -> TimerView {
        TimerView {
            state: self.timer.state(),
            subject: self
                .active
                .and_then(|index| self.data.subjects.get(index))
                .map(|subject| subject.name.clone()),
            tick: self.timer.snapshot(now),
        }
    }

    pub fn view(&self, now: DateTime<Utc>) -> StudyView<'_> {
        StudyView {
            user: &self.user,
            subjects: &self.data.subjects,
            study_time: self.data.study_time,
            streak: self.data.streak,
            goals: &self.data.goals,
            active: self.active,
            timer: self.timer_view(now),
        }
    }

    pub fn add_subject(&mut self, form: NewSubject, now: DateTime<Utc>) -> Result<&Subject, StudyError> {
        let name = form.name.trim().to_string();
        if name.is_empty() {
            return Err(StudyError::MissingName);
        }
        let lowered = name.to_lowercase();
        if self.data.subjects.iter().any(|s| s.name.to_lowercase() == lowered) {
            return Err(StudyError::DuplicateSubject(name));
        }
        let target = form.target_time.unwrap_or(DEFAULT_TARGET_MINUTES);
        if !target.is_finite() || target <= 0.0 {
            return Err(StudyError::InvalidTarget);
        }

        self.data.subjects.push(Subject {
            name,
            description: form.description.trim().to_string(),
            difficulty: form.difficulty,
            progress: 0,
            total_time: 0.0,
            running_timer_elapsed: 0.0,
            target_time: Some(target),
            completed: false,
            last_milestone: 0,
            timestamp: now,
        });
        let added = self.data.subjects.len() - 1;
        Ok(&self.data.subjects[added])
    }

    /// Zeroes time, progress and milestones of the selected subjects.
    pub fn reset_subjects(&mut self, indices: &[usize]) -> Result<usize, StudyError> {
        self.check_selection(indices)?;
        if self.active.is_some_and(|active| indices.contains(&active)) {
            self.timer.reset();
            self.active = None;
        }
        for index in unique(indices) {
            milestone::clear(&mut self.data.subjects[index]);
        }
        Ok(unique(indices).len())
    }

    pub fn delete_subjects(&mut self, indices: &[usize]) -> Result<usize, StudyError> {
        self.check_selection(indices)?;
        let doomed = unique(indices);

        self.active = match self.active {
            Some(active) if doomed.contains(&active) => {
                self.timer.reset();
                None
            }
            Some(active) => Some(active - doomed.iter().filter(|i| **i < active).count()),
            None => None,
        };

        // Highest first so earlier indices stay valid.
        for index in doomed.iter().rev() {
            self.data.subjects.remove(*index);
        }
        Ok(doomed.len())
    }

    pub fn add_goal(&mut self, text: &str) -> Result<(), StudyError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StudyError::EmptyGoal);
        }
        self.data.goals.push(Goal {
            text: text.to_string(),
            completed: false,
        });
        Ok(())
    }

    pub fn toggle_goal(&mut self, index: usize) -> Result<bool, StudyError> {
        let goal = self
            .data
            .goals
            .get_mut(index)
            .ok_or(StudyError::UnknownGoal(index))?;
        goal.completed = !goal.completed;
        Ok(goal.completed)
    }

    /// Binds `subject` to a fresh countdown of `minutes`.
    pub fn start_timer(&mut self, subject: usize, minutes: f64, now: DateTime<Utc>) -> Result<(), StudyError> {
        if subject >= self.data.subjects.len() {
            return Err(StudyError::UnknownSubject(subject));
        }
        if self.timer.state() == TimerState::Completed {
            self.timer.reset();
        }
        self.timer.start(minutes, now)?;
        self.active = Some(subject);
        info!(user = %self.user, subject = %self.data.subjects[subject].name, minutes, "timer started");
        Ok(())
    }

    /// Stops the countdown and keeps the minutes studied so far.
    pub fn stop_timer(&mut self, now: DateTime<Utc>) -> Result<Vec<StudyEvent>, StudyError> {
        let mut events = self.advance(now);
        if self.timer.is_running() {
            self.timer.stop()?;
            if let Some(minutes) = self.commit_active(local_day(now)) {
                events.push(StudyEvent::SessionCommitted {
                    subject: self.active,
                    minutes,
                });
            }
        }
        Ok(events)
    }

    /// Resets the countdown. An active subject loses any progress beyond the
    /// milestone band it is in.
    pub fn reset_timer(&mut self) {
        self.timer.reset();
        if let Some(subject) = self.active_subject_mut() {
            milestone::snap_to_milestone(subject);
            info!(subject = %subject.name, progress = subject.progress, "subject snapped to milestone");
        }
        self.active = None;
    }

    /// Re-evaluates the timer against the wall clock and reconciles the
    /// active subject.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Vec<StudyEvent> {
        let Some(event) = self.timer.evaluate(now) else {
            return Vec::new();
        };
        let mut events = vec![StudyEvent::Tick(event.tick)];
        let mut force_stop = false;

        if let Some(index) = self.active {
            if let Some(subject) = self.data.subjects.get_mut(index) {
                let result = milestone::reconcile(subject, event.tick.elapsed_minutes());
                if let Some(milestone) = result.crossed {
                    debug!(subject = %subject.name, milestone, "milestone reached");
                    events.push(StudyEvent::MilestoneReached {
                        subject: index,
                        milestone,
                    });
                }
                if result.completed && !event.completed {
                    force_stop = true;
                }
                if result.completed && result.crossed == Some(100) {
                    events.push(StudyEvent::SubjectCompleted { subject: index });
                }
            }
        }

        if event.completed || force_stop {
            if force_stop {
                // Timer still has time left but the subject hit its target.
                self.timer.reset();
            }
            let today = local_day(now);
            let minutes = match self.commit_active(today) {
                Some(minutes) => minutes,
                None => {
                    let minutes = event.tick.elapsed_minutes();
                    self.record_study(minutes, today);
                    minutes
                }
            };
            let subject = self.active;
            events.push(if force_stop {
                StudyEvent::SessionCommitted { subject, minutes }
            } else {
                StudyEvent::TimerCompleted { subject, minutes }
            });
        }
        events
    }

    fn commit_active(&mut self, today: NaiveDate) -> Option<f64> {
        let subject = self.active_subject_mut()?;
        let minutes = milestone::commit(subject);
        self.record_study(minutes, today);
        Some(minutes)
    }

    fn record_study(&mut self, minutes: f64, today: NaiveDate) {
        if minutes <= 0.0 {
            return;
        }
        self.data.study_time += minutes;
        self.data.streak = match self.data.last_study_date {
            Some(last) if last == today => self.data.streak.max(1),
            Some(last) if last.succ_opt() == Some(today) => self.data.streak + 1,
            _ => 1,
        };
        self.data.last_study_date = Some(today);
    }

    fn active_subject_mut(&mut self) -> Option<&mut Subject> {
        self.active.and_then(|index| self.data.subjects.get_mut(index))
    }

    fn check_selection(&self, indices: &[usize]) -> Result<(), StudyError> {
        if indices.is_empty() {
            return Err(StudyError::NothingSelected);
        }
        match indices.iter().find(|i| **i >= self.data.subjects.len()) {
            Some(missing) => Err(StudyError::UnknownSubject(*missing)),
            None => Ok(()),
        }
    }
}

fn local_day(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&Local).date_naive()
}

fn unique(indices: &[usize]) -> Vec<usize> {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}
