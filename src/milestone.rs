//! Subject progress derived from studied minutes, with a floor at the last
//! milestone crossed.

use crate::models::Subject;

pub const MILESTONES: [u8; 4] = [25, 50, 75, 100];
pub const DEFAULT_TARGET_MINUTES: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub progress: u8,
    pub crossed: Option<u8>,
    pub completed: bool,
}

pub fn effective_target(subject: &Subject) -> f64 {
    match subject.target_time {
        Some(target) if target.is_finite() && target > 0.0 => target,
        _ => DEFAULT_TARGET_MINUTES,
    }
}

pub fn raw_progress(subject: &Subject) -> u8 {
    let total = subject.total_time + subject.running_timer_elapsed;
    let raw = (100.0 * total / effective_target(subject)).floor();
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, 100.0) as u8
}

/// Folds the in-flight timer minutes into the subject's cached progress.
///
/// At most one milestone is crossed per call: the scan stops at the first
/// threshold above `last_milestone`, so a jump from 0 to 80 records 25 now
/// and the rest on later calls. Displayed progress is unaffected because of
/// the floor.
pub fn reconcile(subject: &mut Subject, running_elapsed_minutes: f64) -> Reconciliation {
    subject.running_timer_elapsed = running_elapsed_minutes.max(0.0);

    let mut progress = raw_progress(subject);
    let mut crossed = None;
    for milestone in MILESTONES {
        if milestone <= progress && milestone > subject.last_milestone {
            subject.last_milestone = milestone;
            crossed = Some(milestone);
            break;
        }
    }

    progress = progress.max(subject.last_milestone);
    subject.progress = progress;
    subject.completed = progress == 100;

    Reconciliation {
        progress,
        crossed,
        completed: subject.completed,
    }
}

/// Moves in-flight minutes into committed time. Returns the minutes moved.
pub fn commit(subject: &mut Subject) -> f64 {
    let minutes = subject.running_timer_elapsed;
    subject.total_time += minutes;
    subject.running_timer_elapsed = 0.0;
    minutes
}

/// Highest milestone at or below `progress`, 0 when none.
pub fn band(progress: u8) -> u8 {
    MILESTONES
        .iter()
        .rev()
        .copied()
        .find(|milestone| *milestone <= progress)
        .unwrap_or(0)
}

/// Drops partial progress beyond the milestone band the subject is in.
pub fn snap_to_milestone(subject: &mut Subject) {
    let current = raw_progress(subject).max(subject.last_milestone);
    let band = band(current);
    if band == 0 {
        clear(subject);
        return;
    }

    subject.total_time = effective_target(subject) * f64::from(band) / 100.0;
    subject.running_timer_elapsed = 0.0;
    subject.last_milestone = band;
    subject.progress = band;
    subject.completed = band == 100;
}

pub fn clear(subject: &mut Subject) {
    subject.total_time = 0.0;
    subject.running_timer_elapsed = 0.0;
    subject.progress = 0;
    subject.last_milestone = 0;
    subject.completed = false;
}
