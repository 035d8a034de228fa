use crate::models::StudyData;
use async_trait::async_trait;
use std::fmt;
use tracing::warn;

pub const FALLBACK_TIPS: &str = "Break long sessions into 25-minute focus blocks with short rests.
Review yesterday's material for ten minutes before starting something new.
Spend extra time on the subject with the lowest progress.
Set one small, concrete goal for every study session.";

const MAX_RECOMMENDATIONS: usize = 3;

#[derive(Debug)]
pub struct AdvisorError(pub String);

impl fmt::Display for AdvisorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "advisor unavailable: {}", self.0)
    }
}

impl std::error::Error for AdvisorError {}

/// Free-text advice generator.
#[async_trait]
pub trait Advisor: Send + Sync + 'static {
    async fn advise(&self, prompt: &str) -> Result<String, AdvisorError>;
}

/// Used when no text generator is configured; every request falls back.
pub struct OfflineAdvisor;

#[async_trait]
impl Advisor for OfflineAdvisor {
    async fn advise(&self, _prompt: &str) -> Result<String, AdvisorError> {
        Err(AdvisorError("no text generator configured".to_string()))
    }
}

pub fn build_prompt(data: &StudyData) -> String {
    let mut prompt = String::from(
        "Give three short study tips, one per line, for a student with these subjects:\n",
    );
    if data.subjects.is_empty() {
        prompt.push_str("- none yet\n");
    }
    for subject in &data.subjects {
        prompt.push_str(&format!(
            "- {} ({:?}, {}% done)\n",
            subject.name, subject.difficulty, subject.progress
        ));
    }
    prompt.push_str(&format!(
        "Total study time: {:.0} minutes. Streak: {} days.",
        data.study_time, data.streak
    ));
    prompt
}

pub async fn recommendations(advisor: &dyn Advisor, data: &StudyData) -> Vec<String> {
    let text = match advisor.advise(&build_prompt(data)).await {
        Ok(text) => text,
        Err(err) => {
            warn!("{err}; using canned tips");
            FALLBACK_TIPS.to_string()
        }
    };
    split_tips(&text)
}

fn split_tips(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim().trim_start_matches(['-', '*']).trim())
        .filter(|line| !line.is_empty())
        .take(MAX_RECOMMENDATIONS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted(&'static str);

    #[async_trait]
    impl Advisor for Scripted {
        async fn advise(&self, prompt: &str) -> Result<String, AdvisorError> {
            assert!(prompt.contains("study tips"));
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn failure_uses_first_three_canned_tips() {
        let tips = recommendations(&OfflineAdvisor, &StudyData::default()).await;
        assert_eq!(tips.len(), 3);
        assert_eq!(tips[0], FALLBACK_TIPS.lines().next().unwrap());
    }

    #[tokio::test]
    async fn advice_is_split_and_trimmed() {
        let advisor = Scripted("- Sleep well\n\n* Drink water\nTake notes\nFourth tip\n");
        let tips = recommendations(&advisor, &StudyData::default()).await;
        assert_eq!(tips, vec!["Sleep well", "Drink water", "Take notes"]);
    }

    #[test]
    fn prompt_lists_subjects() {
        let prompt = build_prompt(&StudyData::default());
        assert!(prompt.contains("none yet"));
    }
}
