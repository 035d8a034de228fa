pub const FALLBACK_ANSWER: &str =
    "Sorry, I only know the questions listed above. Pick one of them!";

pub const FAQ: &[(&str, &str)] = &[
    (
        "How does the Pomodoro timer work?",
        "Pick a subject, choose a duration and press start. The timer counts down from the wall clock, so it stays accurate even when the tab is in the background.",
    ),
    (
        "How is subject progress calculated?",
        "Progress is the time you studied divided by the subject's target time. Once you pass 25%, 50%, 75% or 100% that milestone is kept even if the target changes.",
    ),
    (
        "What happens when I reset the timer?",
        "Resetting drops the time studied since your last milestone. If no milestone was reached yet, the subject starts over from zero.",
    ),
    (
        "How do I keep my streak?",
        "Finish at least one timer session every day. Missing a day starts the streak again from one.",
    ),
    (
        "Where is my data stored?",
        "Everything is saved locally under your user name. Nothing is sent to a server.",
    ),
    (
        "How do I add a new subject?",
        "Open the subjects panel, enter a unique name, a difficulty and a target time in minutes, then save.",
    ),
];

pub fn questions() -> impl Iterator<Item = &'static str> {
    FAQ.iter().map(|(question, _)| *question)
}

/// Exact match ignoring case. No fuzzy matching.
pub fn answer(question: &str) -> Option<&'static str> {
    let wanted = question.to_lowercase();
    FAQ.iter()
        .find(|(candidate, _)| candidate.to_lowercase() == wanted)
        .map(|(_, answer)| *answer)
}
