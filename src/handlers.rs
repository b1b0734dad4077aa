use crate::analytics::{bucket_week_at, compute_distribution, compute_insights, generate_illustrative_weekly_sample};
use crate::auth::{Credentials, SESSION_COOKIE, Session, SignInMode};
use crate::errors::AppError;
use crate::models::{
    AnalyticsResponse, EntryView, Mood, MoodHistory, MoodRecord, QuoteQuery, QuoteResponse, SelectRequest,
    TrackerResponse, UserId,
};
use crate::notify::{Notification, Notifier};
use crate::quotes::select_random_quote;
use crate::state::AppState;
use crate::therapists::{self, ContactKind, Therapist};
use crate::ui::{render_sign_in, render_tracker, TrackerView};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::debug;

/// Entries listed under "Recent Entries".
const RECENT_LIMIT: usize = 5;
/// Shown for the latest mood before anything has been logged.
const NO_MOOD_EMOJI: &str = "💭";

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub error: Option<String>,
}

pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<IndexQuery>,
) -> Html<String> {
    let Some(user) = state.auth.current_user(&headers).await else {
        let error = query.error.as_deref().map(sign_in_error_message);
        return Html(render_sign_in(state.auth.sign_in_url(), error));
    };

    let today = today();
    let session = state.tracker(&user).await;
    let capture = session.state();
    let history = session.history().clone();
    let can_confirm = session.can_confirm(state.duplicate_policy, today);
    drop(session);

    let mut rng = rand::thread_rng();
    let quote = capture
        .mood()
        .map(|mood| (mood, select_random_quote(mood, &mut rng)));
    let analytics = build_analytics(&history, today, &mut rng);
    let notifications = state.notifications.drain(&user);

    Html(render_tracker(&TrackerView {
        user: &user,
        capture,
        can_confirm,
        history: &history,
        analytics: &analytics,
        quote,
        therapists: &therapists::DIRECTORY,
        notifications: &notifications,
    }))
}

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn sign_in_form(State(state): State<AppState>, Form(credentials): Form<Credentials>) -> Response {
    if let Some(url) = state.auth.sign_in_url() {
        return Redirect::to(url).into_response();
    }
    match start_session(&state, &credentials).await {
        Ok(session) => ([(header::SET_COOKIE, session.cookie())], Redirect::to("/")).into_response(),
        Err(AppError::Validation(_)) => Redirect::to("/?error=missing_fields").into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn sign_out_form(State(state): State<AppState>, headers: HeaderMap) -> Response {
    end_session(&state, &headers).await;
    ([(header::SET_COOKIE, expired_cookie())], Redirect::to("/")).into_response()
}

pub async fn select_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(payload): Form<SelectRequest>,
) -> Result<Redirect, AppError> {
    let user = require_user(&state, &headers).await?;
    if let Err(err) = apply_select(&state, &user, &payload.mood).await {
        notify_validation(&state, &user, &err);
    }
    Ok(Redirect::to("/"))
}

pub async fn confirm_form(State(state): State<AppState>, headers: HeaderMap) -> Result<Redirect, AppError> {
    let user = require_user(&state, &headers).await?;
    if let Err(err) = apply_confirm(&state, &user).await {
        notify_validation(&state, &user, &err);
    }
    Ok(Redirect::to("/"))
}

pub async fn book_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u32>,
) -> Result<Redirect, AppError> {
    let user = require_user(&state, &headers).await?;
    contact_therapist(&state, &user, id, ContactKind::Consultation)?;
    Ok(Redirect::to("/#therapists"))
}

pub async fn message_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u32>,
) -> Result<Redirect, AppError> {
    let user = require_user(&state, &headers).await?;
    contact_therapist(&state, &user, id, ContactKind::Message)?;
    Ok(Redirect::to("/#therapists"))
}

pub async fn create_session(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Response, AppError> {
    let session = start_session(&state, &credentials).await?;
    let cookie = session.cookie();
    Ok(([(header::SET_COOKIE, cookie)], Json(session)).into_response())
}

pub async fn delete_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    end_session(&state, &headers).await;
    ([(header::SET_COOKIE, expired_cookie())], Json(serde_json::json!({ "signed_out": true }))).into_response()
}

pub async fn get_tracker(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TrackerResponse>, AppError> {
    let user = require_user(&state, &headers).await?;
    let session = state.tracker(&user).await;
    let history = session.history();
    let capture = session.state();

    Ok(Json(TrackerResponse {
        state: capture.name(),
        selected: capture.mood(),
        can_confirm: session.can_confirm(state.duplicate_policy, today()),
        latest_emoji: history.latest().map_or(NO_MOOD_EMOJI, |record| record.mood.emoji()),
        total_entries: history.len(),
        recent: history.recent(RECENT_LIMIT).iter().map(EntryView::from).collect(),
        user_id: user,
    }))
}

pub async fn select_mood(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SelectRequest>,
) -> Result<Json<TrackerResponse>, AppError> {
    let user = require_user(&state, &headers).await?;
    apply_select(&state, &user, &payload.mood).await?;
    get_tracker(State(state), headers).await
}

pub async fn confirm_mood(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<EntryView>, AppError> {
    let user = require_user(&state, &headers).await?;
    let record = apply_confirm(&state, &user).await?;
    Ok(Json(EntryView::from(&record)))
}

pub async fn get_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<EntryView>>, AppError> {
    let user = require_user(&state, &headers).await?;
    let session = state.tracker(&user).await;
    Ok(Json(session.history().records().iter().map(EntryView::from).collect()))
}

pub async fn get_analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let user = require_user(&state, &headers).await?;
    let history = state.tracker(&user).await.history().clone();
    Ok(Json(build_analytics(&history, today(), &mut rand::thread_rng())))
}

pub async fn get_quote(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<QuoteResponse>, AppError> {
    let user = require_user(&state, &headers).await?;
    let mood = match query.mood.as_deref() {
        Some(value) => value.parse::<Mood>()?,
        None => {
            let session = state.tracker(&user).await;
            session
                .state()
                .mood()
                .or_else(|| session.history().latest().map(|record| record.mood))
                .ok_or_else(|| AppError::validation("mood is required"))?
        }
    };

    Ok(Json(QuoteResponse {
        mood,
        quote: select_random_quote(mood, &mut rand::thread_rng()),
    }))
}

pub async fn list_therapists() -> Json<&'static [Therapist]> {
    Json(&therapists::DIRECTORY)
}

pub async fn book_therapist(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u32>,
) -> Result<Json<Notification>, AppError> {
    let user = require_user(&state, &headers).await?;
    Ok(Json(contact_therapist(&state, &user, id, ContactKind::Consultation)?))
}

pub async fn message_therapist(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u32>,
) -> Result<Json<Notification>, AppError> {
    let user = require_user(&state, &headers).await?;
    Ok(Json(contact_therapist(&state, &user, id, ContactKind::Message)?))
}

pub async fn drain_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Notification>>, AppError> {
    let user = require_user(&state, &headers).await?;
    Ok(Json(state.notifications.drain(&user)))
}

async fn require_user(state: &AppState, headers: &HeaderMap) -> Result<UserId, AppError> {
    state.auth.current_user(headers).await.ok_or(AppError::Unauthorized)
}

async fn start_session(state: &AppState, credentials: &Credentials) -> Result<Session, AppError> {
    let session = state.auth.sign_in(credentials).await?;
    // Signing in starts a fresh tracker, which reads history from the store again.
    state.end_session(&session.user_id).await;
    let title = match credentials.mode {
        SignInMode::Login => "Welcome back! 🌟",
        SignInMode::Signup => "Welcome! 🌟",
    };
    state.notifications.notify(
        &session.user_id,
        Notification::info(title, "You're now ready to start tracking your wellness journey."),
    );
    Ok(session)
}

async fn end_session(state: &AppState, headers: &HeaderMap) {
    if let Some(user) = state.auth.current_user(headers).await {
        state.end_session(&user).await;
        state.notifications.drain(&user);
    }
    state.auth.sign_out(headers).await;
}

async fn apply_select(state: &AppState, user: &UserId, raw: &str) -> Result<(), AppError> {
    let mood = raw.parse::<Mood>()?;
    state.tracker(user).await.select(mood)?;
    debug!(%user, %mood, "mood selected");
    Ok(())
}

async fn apply_confirm(state: &AppState, user: &UserId) -> Result<MoodRecord, AppError> {
    let mut session = state.tracker(user).await;
    session
        .confirm(
            user,
            state.store.as_ref(),
            state.notifications.as_ref(),
            state.duplicate_policy,
            Utc::now(),
        )
        .await
}

fn contact_therapist(state: &AppState, user: &UserId, id: u32, kind: ContactKind) -> Result<Notification, AppError> {
    let notification = therapists::contact(id, kind)?;
    state.notifications.notify(user, notification.clone());
    Ok(notification)
}

/// Persistence failures are already reported by the capture flow.
fn notify_validation(state: &AppState, user: &UserId, err: &AppError) {
    if let AppError::Validation(message) = err {
        state
            .notifications
            .notify(user, Notification::destructive("Please check your input", message.clone()));
    }
}

fn build_analytics<R: rand::Rng>(history: &MoodHistory, today: NaiveDate, rng: &mut R) -> AnalyticsResponse {
    AnalyticsResponse {
        distribution: compute_distribution(history),
        weekly_sample: generate_illustrative_weekly_sample(history, rng),
        current_week: bucket_week_at(today, history),
        insights: compute_insights(history, today),
    }
}

fn sign_in_error_message(code: &str) -> &'static str {
    match code {
        "missing_fields" => "Please fill in all fields. Email and password are required.",
        _ => "Sign-in failed. Please try again.",
    }
}

fn expired_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0")
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
