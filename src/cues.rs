use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    TimerFinished,
    SubjectMastered,
}

/// Fire-and-forget audio notification.
pub trait Chime: Send + Sync + 'static {
    fn play(&self, cue: Cue);
}

/// Headless chime: records the cue in the log.
pub struct LogChime;

impl Chime for LogChime {
    fn play(&self, cue: Cue) {
        info!(?cue, "chime");
    }
}
