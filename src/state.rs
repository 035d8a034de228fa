use crate::advisor::Advisor;
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::cues::Chime;
use crate::errors::AppError;
use crate::logs::LogBook;
use crate::models::{LogEntry, StudyData};
use crate::storage::{LOGS_KEY, LocalStore, USER_KEY, study_key};
use crate::study::{StudyError, StudyEvent, StudySession};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Everything mutable, behind one lock. Each mutation is saved before the
/// lock is released, and rolled back if the save fails.
#[derive(Debug)]
pub struct Desk {
    pub store: LocalStore,
    pub logs: LogBook,
    pub study: Option<StudySession>,
}

impl Desk {
    pub fn load(mut store: LocalStore) -> Self {
        let logs = LogBook::new(store.load_json_or_default::<Vec<LogEntry>>(LOGS_KEY));
        let study = store.get_item(USER_KEY).map(str::to_string).map(|user| {
            let data = store.load_json_or_default::<StudyData>(&study_key(&user));
            StudySession::new(user, data)
        });
        info!(logs = logs.len(), user = study.as_ref().map(StudySession::user), "desk loaded");

        Self { store, logs, study }
    }

    pub async fn mutate_logs<R>(&mut self, apply: impl FnOnce(&mut LogBook) -> R) -> Result<R, AppError> {
        let before = self.logs.clone();
        let result = apply(&mut self.logs);
        if self.logs != before {
            if let Err(err) = self.store.save_json(LOGS_KEY, &self.logs.entries()).await {
                error!("failed to save logs: {err}");
                self.logs = before;
                return Err(err);
            }
        }
        Ok(result)
    }

    pub fn session(&self) -> Result<&StudySession, AppError> {
        self.study
            .as_ref()
            .ok_or_else(|| AppError::bad_request("Log in to use the study planner"))
    }

    pub async fn mutate_study<R>(
        &mut self,
        apply: impl FnOnce(&mut StudySession) -> Result<R, StudyError>,
    ) -> Result<R, AppError> {
        let Some(session) = self.study.as_mut() else {
            return Err(AppError::bad_request("Log in to use the study planner"));
        };
        let before = session.clone();
        let result = match apply(session) {
            Ok(result) => result,
            Err(err) => {
                *session = before;
                return Err(err.into());
            }
        };
        if let Err(err) = self.save_study().await {
            error!("failed to save study data: {err}");
            self.study = Some(before);
            return Err(err);
        }
        Ok(result)
    }

    pub async fn save_study(&mut self) -> Result<(), AppError> {
        let Some(session) = self.study.as_ref() else {
            return Ok(());
        };
        let key = study_key(session.user());
        self.store.save_json(&key, session.data()).await
    }

    pub async fn login(&mut self, name: &str) -> Result<&StudySession, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::bad_request("Name is required"));
        }
        if self.study.is_some() {
            self.save_study().await?;
        }
        self.store.set_item(USER_KEY, name.to_string()).await?;

        let data = self.store.load_json_or_default::<StudyData>(&study_key(name));
        let session = self.study.insert(StudySession::new(name, data));
        info!(user = name, "logged in");
        Ok(&*session)
    }

    pub async fn logout(&mut self) -> Result<(), AppError> {
        self.save_study().await?;
        self.store.remove_item(USER_KEY).await?;
        self.study = None;
        Ok(())
    }

    /// Advances the timer. Ticks that change data are saved right away; a
    /// failed save is logged and left for the autosave to retry.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Vec<StudyEvent> {
        let Some(session) = self.study.as_mut() else {
            return Vec::new();
        };
        let events = session.advance(now);
        if events.iter().any(StudyEvent::needs_save) {
            if let Err(err) = self.save_study().await {
                error!("failed to save study progress: {err}");
            }
        }
        events
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub desk: Arc<Mutex<Desk>>,
    pub clock: Arc<dyn Clock>,
    pub advisor: Arc<dyn Advisor>,
    pub chime: Arc<dyn Chime>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: LocalStore,
        clock: Arc<dyn Clock>,
        advisor: Arc<dyn Advisor>,
        chime: Arc<dyn Chime>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            desk: Arc::new(Mutex::new(Desk::load(store))),
            clock,
            advisor,
            chime,
        }
    }
}
