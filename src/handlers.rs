use crate::advisor::recommendations;
use crate::calendar::{CalendarMonth, month_grid};
use crate::errors::AppError;
use crate::faq;
use crate::log_view::{LogCard, LogFilter, LogListView, render_cards, status_label};
use crate::models::{
    AddLogResponse, EditLog, FaqAnswer, FaqRequest, GoalRequest, LogEntry, LoginRequest, NewLog,
    NewSubject, Notice, SelectionRequest, StartTimerRequest,
};
use crate::state::{AppState, Desk};
use crate::stats::{LogStats, StudyAnalytics, build_log_stats_at, build_study_analytics};
use crate::study::TimerView;
use crate::ticker;
use crate::ui::{render_card_list, render_log_page, render_study_page};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Html,
};
use chrono::Datelike;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    pub filter: Option<String>,
    pub q: Option<String>,
    pub from: Option<chrono::NaiveDate>,
    pub to: Option<chrono::NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let today = state.clock.today();
    let desk = state.desk.lock().await;
    let stats = build_log_stats_at(today, desk.logs.entries());
    let cards = render_cards(desk.logs.entries(), LogFilter::All);
    Html(render_log_page(&cards, &stats))
}

pub async fn study_page(State(state): State<AppState>) -> Html<String> {
    let desk = state.desk.lock().await;
    Html(render_study_page(desk.study.as_ref().map(|s| s.user())))
}

pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> Result<Json<LogListView>, AppError> {
    let today = state.clock.today();
    let desk = state.desk.lock().await;
    let (filter, cards) = select_cards(&desk, &query)?;

    Ok(Json(LogListView {
        filter: filter.as_str(),
        cards,
        stats: build_log_stats_at(today, desk.logs.entries()),
    }))
}

/// Same selection as [`list_logs`], rendered with the page's card markup.
pub async fn log_cards(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> Result<Html<String>, AppError> {
    let desk = state.desk.lock().await;
    let (_, cards) = select_cards(&desk, &query)?;
    Ok(Html(render_card_list(&cards)))
}

fn select_cards(desk: &Desk, query: &LogQuery) -> Result<(LogFilter, Vec<LogCard>), AppError> {
    let filter = match query.filter.as_deref() {
        Some(tag) => tag.parse::<LogFilter>().map_err(AppError::bad_request)?,
        None => LogFilter::All,
    };
    let from = query.from.unwrap_or(chrono::NaiveDate::MIN);
    let to = query.to.unwrap_or(chrono::NaiveDate::MAX);
    let selected: Vec<&LogEntry> = match query.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => desk
            .logs
            .search(q)
            .filter(|entry| entry.date >= from && entry.date <= to)
            .collect(),
        _ => desk.logs.in_date_range(from, to).collect(),
    };
    Ok((filter, render_cards(selected, filter)))
}

pub async fn log_stats(State(state): State<AppState>) -> Json<LogStats> {
    let today = state.clock.today();
    let desk = state.desk.lock().await;
    Json(build_log_stats_at(today, desk.logs.entries()))
}

pub async fn add_log(
    State(state): State<AppState>,
    Json(form): Json<NewLog>,
) -> Result<Json<AddLogResponse>, AppError> {
    let now = state.clock.now();
    let mut desk = state.desk.lock().await;
    let entry = desk.mutate_logs(|logs| logs.add(form, now).cloned()).await?;

    let response = match entry {
        Some(entry) => {
            info!(id = entry.id, "log added");
            AddLogResponse {
                added: true,
                entry: Some(entry),
                message: Some("Activity added!".to_string()),
            }
        }
        None => AddLogResponse {
            added: false,
            entry: None,
            message: None,
        },
    };
    Ok(Json(response))
}

pub async fn toggle_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Notice>, AppError> {
    let mut desk = state.desk.lock().await;
    let status = desk.mutate_logs(|logs| logs.toggle_status(id)).await?;
    Ok(Json(match status {
        Some(status) => Notice::changed(format!("Status changed to {}!", status_label(status))),
        None => Notice::unchanged(format!("No activity with id {id}")),
    }))
}

pub async fn edit_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<EditLog>,
) -> Result<Json<Notice>, AppError> {
    if !form.duration.is_finite() || form.duration <= 0.0 {
        return Err(AppError::bad_request("duration must be greater than zero"));
    }
    let now = state.clock.now();
    let mut desk = state.desk.lock().await;
    let edited = desk.mutate_logs(|logs| logs.edit(id, form, now).is_some()).await?;
    Ok(Json(if edited {
        Notice::changed("Activity updated!")
    } else {
        Notice::unchanged(format!("No activity with id {id}"))
    }))
}

pub async fn delete_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<Json<Notice>, AppError> {
    if !confirm.confirmed {
        return Ok(Json(Notice::unchanged("Delete this activity?")));
    }
    let mut desk = state.desk.lock().await;
    let removed = desk.mutate_logs(|logs| logs.delete(id)).await?;
    Ok(Json(if removed > 0 {
        Notice::changed("Activity deleted!")
    } else {
        Notice::unchanged(format!("No activity with id {id}"))
    }))
}

pub async fn bulk_delete_logs(
    State(state): State<AppState>,
    Json(selection): Json<SelectionRequest<i64>>,
) -> Result<Json<Notice>, AppError> {
    if selection.ids.is_empty() {
        return Err(AppError::bad_request("Select at least one activity to delete"));
    }
    if !selection.confirmed {
        return Ok(Json(Notice::unchanged(format!(
            "Delete {} selected activities? This cannot be undone.",
            selection.ids.len()
        ))));
    }
    let mut desk = state.desk.lock().await;
    let removed = desk.mutate_logs(|logs| logs.bulk_delete(&selection.ids)).await?;
    info!(removed, "bulk delete");
    Ok(Json(Notice::changed(format!("{removed} activities deleted."))))
}

pub async fn bulk_complete_logs(
    State(state): State<AppState>,
    Json(selection): Json<SelectionRequest<i64>>,
) -> Result<Json<Notice>, AppError> {
    if selection.ids.is_empty() {
        return Err(AppError::bad_request("Select at least one activity to mark complete"));
    }
    let mut desk = state.desk.lock().await;
    let marked = desk.mutate_logs(|logs| logs.bulk_mark_complete(&selection.ids)).await?;
    Ok(Json(Notice::changed(format!("{marked} activities marked complete!"))))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let now = state.clock.now();
    let mut desk = state.desk.lock().await;
    let session = desk.login(&payload.name).await?;
    Ok(Json(serde_json::to_value(session.view(now))?))
}

pub async fn logout(State(state): State<AppState>) -> Result<Json<Notice>, AppError> {
    let mut desk = state.desk.lock().await;
    desk.logout().await?;
    Ok(Json(Notice::changed("Logged out")))
}

pub async fn get_study(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    ticker::advance(&state).await;
    let now = state.clock.now();
    let desk = state.desk.lock().await;
    Ok(Json(serde_json::to_value(desk.session()?.view(now))?))
}

pub async fn add_subject(
    State(state): State<AppState>,
    Json(form): Json<NewSubject>,
) -> Result<Json<Notice>, AppError> {
    let now = state.clock.now();
    let mut desk = state.desk.lock().await;
    let name = desk
        .mutate_study(|session| session.add_subject(form, now).map(|s| s.name.clone()))
        .await?;
    Ok(Json(Notice::changed(format!("Subject '{name}' added!"))))
}

pub async fn reset_subjects(
    State(state): State<AppState>,
    Json(selection): Json<SelectionRequest<usize>>,
) -> Result<Json<Notice>, AppError> {
    if selection.ids.is_empty() {
        return Err(AppError::bad_request("Select at least one subject"));
    }
    if !selection.confirmed {
        return Ok(Json(Notice::unchanged(format!(
            "Reset progress of {} selected subjects?",
            selection.ids.len()
        ))));
    }
    let mut desk = state.desk.lock().await;
    let count = desk.mutate_study(|session| session.reset_subjects(&selection.ids)).await?;
    Ok(Json(Notice::changed(format!("{count} subjects reset."))))
}

pub async fn delete_subjects(
    State(state): State<AppState>,
    Json(selection): Json<SelectionRequest<usize>>,
) -> Result<Json<Notice>, AppError> {
    if selection.ids.is_empty() {
        return Err(AppError::bad_request("Select at least one subject"));
    }
    if !selection.confirmed {
        return Ok(Json(Notice::unchanged(format!(
            "Delete {} selected subjects?",
            selection.ids.len()
        ))));
    }
    let mut desk = state.desk.lock().await;
    let count = desk.mutate_study(|session| session.delete_subjects(&selection.ids)).await?;
    Ok(Json(Notice::changed(format!("{count} subjects deleted."))))
}

pub async fn add_goal(
    State(state): State<AppState>,
    Json(payload): Json<GoalRequest>,
) -> Result<Json<Notice>, AppError> {
    let mut desk = state.desk.lock().await;
    desk.mutate_study(|session| session.add_goal(&payload.text)).await?;
    Ok(Json(Notice::changed("Goal added!")))
}

pub async fn toggle_goal(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<Notice>, AppError> {
    let mut desk = state.desk.lock().await;
    let done = desk.mutate_study(|session| session.toggle_goal(index)).await?;
    Ok(Json(Notice::changed(if done { "Goal completed!" } else { "Goal reopened" })))
}

pub async fn get_timer(State(state): State<AppState>) -> Result<Json<TimerView>, AppError> {
    ticker::advance(&state).await;
    timer_view(&state).await
}

/// Visibility/focus regained: recompute from the wall clock.
pub async fn sync_timer(State(state): State<AppState>) -> Result<Json<TimerView>, AppError> {
    ticker::advance(&state).await;
    timer_view(&state).await
}

pub async fn start_timer(
    State(state): State<AppState>,
    Json(payload): Json<StartTimerRequest>,
) -> Result<Json<TimerView>, AppError> {
    let now = state.clock.now();
    {
        let mut desk = state.desk.lock().await;
        desk.mutate_study(|session| session.start_timer(payload.subject, payload.minutes, now))
            .await?;
    }
    timer_view(&state).await
}

pub async fn stop_timer(State(state): State<AppState>) -> Result<Json<TimerView>, AppError> {
    let now = state.clock.now();
    let events = {
        let mut desk = state.desk.lock().await;
        desk.mutate_study(|session| session.stop_timer(now)).await?
    };
    ticker::play_cues(state.chime.as_ref(), &events);
    timer_view(&state).await
}

pub async fn reset_timer(State(state): State<AppState>) -> Result<Json<TimerView>, AppError> {
    {
        let mut desk = state.desk.lock().await;
        desk.mutate_study(|session| {
            session.reset_timer();
            Ok(())
        })
        .await?;
    }
    timer_view(&state).await
}

async fn timer_view(state: &AppState) -> Result<Json<TimerView>, AppError> {
    let now = state.clock.now();
    let desk = state.desk.lock().await;
    Ok(Json(desk.session()?.timer_view(now)))
}

pub async fn calendar(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<CalendarMonth>, AppError> {
    let today = state.clock.today();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());
    let grid = month_grid(year, month, today, &mut rand::thread_rng())
        .ok_or_else(|| AppError::bad_request(format!("invalid month {year}-{month}")))?;
    Ok(Json(grid))
}

pub async fn analytics(State(state): State<AppState>) -> Result<Json<StudyAnalytics>, AppError> {
    let desk = state.desk.lock().await;
    Ok(Json(build_study_analytics(desk.session()?.data())))
}

pub async fn faq_questions() -> Json<Vec<&'static str>> {
    Json(faq::questions().collect())
}

pub async fn faq_ask(Json(payload): Json<FaqRequest>) -> Json<FaqAnswer> {
    let answer = faq::answer(&payload.question);
    Json(FaqAnswer {
        matched: answer.is_some(),
        answer: answer.unwrap_or(faq::FALLBACK_ANSWER).to_string(),
        question: payload.question,
    })
}

pub async fn get_recommendations(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    let data = {
        let desk = state.desk.lock().await;
        desk.session()?.data().clone()
    };
    Ok(Json(recommendations(state.advisor.as_ref(), &data).await))
}
