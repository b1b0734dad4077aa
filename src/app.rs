use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/healthz", get(handlers::healthz))
        .route("/sign-in", post(handlers::sign_in_form))
        .route("/sign-out", post(handlers::sign_out_form))
        .route("/mood/select", post(handlers::select_form))
        .route("/mood/confirm", post(handlers::confirm_form))
        .route("/therapists/:id/book", post(handlers::book_form))
        .route("/therapists/:id/message", post(handlers::message_form))
        .route(
            "/api/session",
            post(handlers::create_session).delete(handlers::delete_session),
        )
        .route("/api/tracker", get(handlers::get_tracker))
        .route("/api/mood/select", post(handlers::select_mood))
        .route("/api/mood/confirm", post(handlers::confirm_mood))
        .route("/api/history", get(handlers::get_history))
        .route("/api/analytics", get(handlers::get_analytics))
        .route("/api/quote", get(handlers::get_quote))
        .route("/api/therapists", get(handlers::list_therapists))
        .route("/api/therapists/:id/book", post(handlers::book_therapist))
        .route("/api/therapists/:id/message", post(handlers::message_therapist))
        .route("/api/notifications", get(handlers::drain_notifications))
        .with_state(state)
}
