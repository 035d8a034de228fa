use crate::cues::{Chime, Cue};
use crate::state::AppState;
use crate::study::StudyEvent;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error};

/// Background loop: fast display ticks, a slower heartbeat that forces a
/// resync after the host was suspended, and the periodic autosave.
pub fn spawn(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = interval(state.config.tick_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut heartbeat = interval(state.config.heartbeat_interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut autosave = interval(state.config.autosave_interval);
        autosave.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    advance(&state).await;
                }
                _ = heartbeat.tick() => {
                    debug!("heartbeat resync");
                    advance(&state).await;
                }
                _ = autosave.tick() => {
                    save(&state).await;
                }
            }
        }
    })
}

/// Recomputes the countdown from the wall clock and plays any cues it
/// produced once the lock is released.
pub async fn advance(state: &AppState) -> Vec<StudyEvent> {
    let now = state.clock.now();
    let events = state.desk.lock().await.tick(now).await;
    play_cues(state.chime.as_ref(), &events);
    events
}

async fn save(state: &AppState) {
    let mut desk = state.desk.lock().await;
    if let Err(err) = desk.save_study().await {
        error!("autosave failed: {err}");
    }
}

pub fn play_cues(chime: &dyn Chime, events: &[StudyEvent]) {
    for event in events {
        match event {
            StudyEvent::TimerCompleted { .. } => chime.play(Cue::TimerFinished),
            StudyEvent::SubjectCompleted { .. } => chime.play(Cue::SubjectMastered),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::OfflineAdvisor;
    use crate::clock::ManualClock;
    use crate::config::AppConfig;
    use crate::models::NewSubject;
    use crate::storage::LocalStore;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Cue>>);

    impl Chime for Recorder {
        fn play(&self, cue: Cue) {
            self.0.lock().unwrap().push(cue);
        }
    }

    #[test]
    fn cues_follow_completion_events() {
        let recorder = Recorder::default();
        play_cues(
            &recorder,
            &[
                StudyEvent::MilestoneReached { subject: 0, milestone: 100 },
                StudyEvent::SubjectCompleted { subject: 0 },
                StudyEvent::SessionCommitted { subject: Some(0), minutes: 1.0 },
                StudyEvent::TimerCompleted { subject: Some(0), minutes: 5.0 },
            ],
        );
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![Cue::SubjectMastered, Cue::TimerFinished]
        );
    }

    #[tokio::test]
    async fn advance_follows_the_injected_clock() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let recorder = Arc::new(Recorder::default());
        let state = AppState::new(
            AppConfig::with_data_path(path.clone()),
            LocalStore::open(&path).await,
            clock.clone(),
            Arc::new(OfflineAdvisor),
            recorder.clone(),
        );

        {
            let mut desk = state.desk.lock().await;
            desk.login("ana").await.unwrap();
            desk.mutate_study(|session| {
                let subject = NewSubject {
                    name: "Math".to_string(),
                    description: String::new(),
                    difficulty: Default::default(),
                    target_time: Some(60.0),
                };
                session.add_subject(subject, start)?;
                session.start_timer(0, 5.0, start)
            })
            .await
            .unwrap();
        }

        clock.advance(Duration::minutes(2));
        advance(&state).await;
        assert!(recorder.0.lock().unwrap().is_empty());

        clock.advance(Duration::minutes(4));
        let events = advance(&state).await;
        assert!(events.contains(&StudyEvent::TimerCompleted { subject: Some(0), minutes: 5.0 }));
        assert_eq!(*recorder.0.lock().unwrap(), vec![Cue::TimerFinished]);

        let desk = state.desk.lock().await;
        assert_eq!(desk.session().unwrap().data().subjects[0].total_time, 5.0);
    }
}
