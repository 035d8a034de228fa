use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/study", get(handlers::study_page))
        .route("/api/logs", get(handlers::list_logs).post(handlers::add_log))
        .route("/api/logs/cards", get(handlers::log_cards))
        .route("/api/logs/stats", get(handlers::log_stats))
        .route("/api/logs/bulk-delete", post(handlers::bulk_delete_logs))
        .route("/api/logs/bulk-complete", post(handlers::bulk_complete_logs))
        .route("/api/logs/:id", put(handlers::edit_log).delete(handlers::delete_log))
        .route("/api/logs/:id/toggle", post(handlers::toggle_log))
        .route("/api/study", get(handlers::get_study))
        .route("/api/study/login", post(handlers::login))
        .route("/api/study/logout", post(handlers::logout))
        .route("/api/study/subjects", post(handlers::add_subject))
        .route("/api/study/subjects/reset", post(handlers::reset_subjects))
        .route("/api/study/subjects/delete", post(handlers::delete_subjects))
        .route("/api/study/goals", post(handlers::add_goal))
        .route("/api/study/goals/:index/toggle", post(handlers::toggle_goal))
        .route("/api/timer", get(handlers::get_timer))
        .route("/api/timer/start", post(handlers::start_timer))
        .route("/api/timer/stop", post(handlers::stop_timer))
        .route("/api/timer/reset", post(handlers::reset_timer))
        .route("/api/timer/sync", post(handlers::sync_timer))
        .route("/api/calendar", get(handlers::calendar))
        .route("/api/analytics", get(handlers::analytics))
        .route("/api/faq", get(handlers::faq_questions))
        .route("/api/faq/ask", post(handlers::faq_ask))
        .route("/api/recommendations", get(handlers::get_recommendations))
        .with_state(state)
}
