// crates/bridge-stub/src/routes.rs
// ============================================================================
// Module: Bridge Stub Routes
// Description: HTTP handlers for the stubbed Bridge REST API.
// Purpose: Decode requests, enforce access rules, and delegate to the store.
// Dependencies: axum, bridge-core, serde_json, time
// ============================================================================

//! ## Overview
//! Handlers are thin: decode the body, resolve the caller from the
//! `Bridge-Session` header, check role and consent, then make one call into
//! [`Store`] under the state lock. The lock is released before the response
//! is built and is never held across an await.
//!
//! Access failures map to 401 (no session), 403 (missing role) and 412 (no
//! consent).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::USER_AGENT;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use bridge_core::ActivityUpdate;
use bridge_core::ClientInfo;
use bridge_core::ConsentSignature;
use bridge_core::Email;
use bridge_core::EmailVerification;
use bridge_core::Guid;
use bridge_core::Message;
use bridge_core::ResourceList;
use bridge_core::Role;
use bridge_core::SESSION_HEADER;
use bridge_core::SchedulePlan;
use bridge_core::ScheduleWindow;
use bridge_core::SignIn;
use bridge_core::SignUp;
use bridge_core::Study;
use bridge_core::StudyId;
use bridge_core::Survey;
use bridge_core::SurveyAnswer;
use bridge_core::SurveyResponse;
use serde::Serialize;
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use time::UtcOffset;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use crate::error::StubError;
use crate::store::Caller;
use crate::store::Store;

// ============================================================================
// SECTION: State
// ============================================================================

/// Shared handler state.
#[derive(Debug, Clone)]
pub(crate) struct StubState {
    store: Arc<Mutex<Store>>,
}

impl StubState {
    pub(crate) const fn new(store: Arc<Mutex<Store>>) -> Self {
        Self {
            store,
        }
    }

    /// Runs `action` with exclusive access to the store.
    fn with_store<R>(
        &self,
        action: impl FnOnce(&mut Store) -> Result<R, StubError>,
    ) -> Result<R, StubError> {
        let mut guard = self
            .store
            .lock()
            .map_err(|_| StubError::Internal("stub state lock poisoned".to_string()))?;
        action(&mut guard)
    }
}

type Reply = Result<Response, StubError>;

/// Builds the stub's router.
pub(crate) fn router(state: StubState) -> Router {
    Router::new()
        .route("/v3/auth/signUp", post(sign_up))
        .route("/v3/auth/signIn", post(sign_in))
        .route("/v3/auth/signOut", post(sign_out))
        .route("/v3/auth/resendEmailVerification", post(resend_email_verification))
        .route("/v3/auth/requestResetPassword", post(request_reset_password))
        .route("/v3/auth/verifyEmail", post(verify_email))
        .route("/v3/studies", post(create_study))
        .route("/v3/studies/{id}", get(get_study).delete(delete_study))
        .route("/v3/users", post(create_user))
        .route("/v3/users/{id}", axum::routing::delete(delete_user))
        .route("/v3/consents/signature", post(create_consent_signature))
        .route("/v3/scheduleplans", get(list_plans).post(create_plan))
        .route("/v3/scheduleplans/{guid}", get(get_plan).post(update_plan).delete(delete_plan))
        .route("/v3/schedules", get(get_schedules))
        .route("/v3/activities", get(get_activities).post(update_activities))
        .route("/v3/surveys", post(create_survey))
        .route(
            "/v3/surveys/{guid}/revisions/{created_on}",
            get(get_survey).delete(delete_survey),
        )
        .route("/v3/surveys/{guid}/revisions/{created_on}/publish", post(publish_survey))
        .route("/v3/surveyresponses", post(create_survey_response))
        .route(
            "/v3/surveyresponses/{identifier}",
            get(get_survey_response).post(add_answers_to_response),
        )
        .with_state(state)
}

// ============================================================================
// SECTION: Authentication
// ============================================================================

async fn sign_up(State(state): State<StubState>, bytes: Bytes) -> Reply {
    let sign_up: SignUp = decode(&bytes)?;
    state.with_store(|store| store.sign_up(&sign_up, OffsetDateTime::now_utc()))?;
    Ok(created(&Message::new("Signed up.")))
}

async fn sign_in(State(state): State<StubState>, headers: HeaderMap, bytes: Bytes) -> Reply {
    let sign_in: SignIn = decode(&bytes)?;
    let client_info = client_info(&headers);
    let session = state.with_store(|store| store.sign_in(&sign_in, client_info))?;
    Ok(ok(&session))
}

async fn sign_out(State(state): State<StubState>, headers: HeaderMap) -> Reply {
    state.with_store(|store| {
        store.sign_out(session_token(&headers));
        Ok(())
    })?;
    Ok(ok(&Message::new("Signed out.")))
}

async fn resend_email_verification(State(state): State<StubState>, bytes: Bytes) -> Reply {
    let email: Email = decode(&bytes)?;
    let pending =
        state.with_store(|store| Ok(store.pending_verification(&email.study, &email.email)))?;
    if pending.is_some() {
        tracing::debug!(study = %email.study, "verification email resent");
    }
    Ok(accepted(
        "If registered with the study, we'll email you instructions on how to verify your account.",
    ))
}

async fn request_reset_password(State(state): State<StubState>, bytes: Bytes) -> Reply {
    let email: Email = decode(&bytes)?;
    state.with_store(|store| store.study(&email.study).map(|_| ()))?;
    Ok(accepted(
        "If registered with the study, we'll email you instructions on how to change your password.",
    ))
}

async fn verify_email(State(state): State<StubState>, bytes: Bytes) -> Reply {
    let verification: EmailVerification = decode(&bytes)?;
    state.with_store(|store| store.verify_email(&verification))?;
    Ok(ok(&Message::new("Email address verified.")))
}

// ============================================================================
// SECTION: Administration
// ============================================================================

async fn create_study(State(state): State<StubState>, headers: HeaderMap, bytes: Bytes) -> Reply {
    let study: Study = decode(&bytes)?;
    let holder = state.with_store(|store| {
        authorize(store, &headers, Role::Admin)?;
        store.create_study(&study)
    })?;
    Ok(created(&holder))
}

async fn get_study(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let study = state.with_store(|store| {
        authorize(store, &headers, Role::Admin)?;
        store.study(&StudyId::new(id)).cloned()
    })?;
    Ok(ok(&study))
}

async fn delete_study(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    state.with_store(|store| {
        authorize(store, &headers, Role::Admin)?;
        store.delete_study(&StudyId::new(id))
    })?;
    Ok(ok(&Message::new("Study deleted.")))
}

async fn create_user(State(state): State<StubState>, headers: HeaderMap, bytes: Bytes) -> Reply {
    let sign_up: SignUp = decode(&bytes)?;
    let holder = state.with_store(|store| {
        authorize(store, &headers, Role::Admin)?;
        store.create_user(&sign_up, OffsetDateTime::now_utc())
    })?;
    Ok(created(&holder))
}

async fn delete_user(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    state.with_store(|store| {
        authorize(store, &headers, Role::Admin)?;
        store.delete_user(&id)
    })?;
    Ok(ok(&Message::new("User deleted.")))
}

// ============================================================================
// SECTION: Consent
// ============================================================================

async fn create_consent_signature(
    State(state): State<StubState>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Reply {
    let signature: ConsentSignature = decode(&bytes)?;
    let session = state.with_store(|store| {
        let caller = store.caller(session_token(&headers))?;
        store.consent(&caller, &signature)
    })?;
    Ok(created(&session))
}

// ============================================================================
// SECTION: Schedule Plans
// ============================================================================

async fn list_plans(State(state): State<StubState>, headers: HeaderMap) -> Reply {
    let plans = state.with_store(|store| {
        let caller = authorize(store, &headers, Role::Developer)?;
        Ok(store.plans(caller.study()))
    })?;
    Ok(ok(&ResourceList::new(plans)))
}

async fn create_plan(State(state): State<StubState>, headers: HeaderMap, bytes: Bytes) -> Reply {
    let plan: SchedulePlan = decode(&bytes)?;
    let holder = state.with_store(|store| {
        let caller = authorize(store, &headers, Role::Developer)?;
        store.create_plan(caller.study(), plan, OffsetDateTime::now_utc())
    })?;
    Ok(created(&holder))
}

async fn get_plan(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(guid): Path<String>,
) -> Reply {
    let plan = state.with_store(|store| {
        let caller = authorize(store, &headers, Role::Developer)?;
        store.plan(caller.study(), &Guid::new(guid)).cloned()
    })?;
    Ok(ok(&plan))
}

async fn update_plan(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(guid): Path<String>,
    bytes: Bytes,
) -> Reply {
    let plan: SchedulePlan = decode(&bytes)?;
    let holder = state.with_store(|store| {
        let caller = authorize(store, &headers, Role::Developer)?;
        store.update_plan(caller.study(), &Guid::new(guid), plan, OffsetDateTime::now_utc())
    })?;
    Ok(ok(&holder))
}

async fn delete_plan(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(guid): Path<String>,
) -> Reply {
    state.with_store(|store| {
        let caller = authorize(store, &headers, Role::Developer)?;
        store.delete_plan(caller.study(), &Guid::new(guid))
    })?;
    Ok(ok(&Message::new("Schedule plan deleted.")))
}

// ============================================================================
// SECTION: Participant Schedules
// ============================================================================

async fn get_schedules(State(state): State<StubState>, headers: HeaderMap) -> Reply {
    let schedules = state.with_store(|store| {
        let caller = consented(store, &headers)?;
        Ok(store.schedules_for(&caller))
    })?;
    Ok(ok(&ResourceList::new(schedules)))
}

async fn get_activities(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(params): Query<BTreeMap<String, String>>,
) -> Reply {
    let offset = params.get("offset").map_or(Ok(UtcOffset::UTC), |raw| parse_offset(raw))?;
    let days_ahead = params
        .get("daysAhead")
        .ok_or_else(|| StubError::BadRequest("daysAhead is required".to_string()))
        .and_then(|raw| parse_count("daysAhead", raw))?;
    let minimum = params
        .get("minimumPerSchedule")
        .map_or(Ok(0), |raw| parse_count("minimumPerSchedule", raw))?;
    let activities = state.with_store(|store| {
        let caller = consented(store, &headers)?;
        let window = ScheduleWindow::new(
            caller.account.created_on,
            OffsetDateTime::now_utc(),
            offset,
            days_ahead,
            minimum,
        )
        .map_err(|errors| StubError::BadRequest(errors.messages.join("; ")))?;
        Ok(store.scheduled_activities(&caller, &window))
    })?;
    Ok(ok(&ResourceList::new(activities)))
}

async fn update_activities(
    State(state): State<StubState>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Reply {
    let updates: Vec<ActivityUpdate> = decode(&bytes)?;
    state.with_store(|store| {
        let caller = consented(store, &headers)?;
        store.update_activities(&caller, &updates)
    })?;
    Ok(ok(&Message::new("Activities updated.")))
}

// ============================================================================
// SECTION: Surveys
// ============================================================================

async fn create_survey(State(state): State<StubState>, headers: HeaderMap, bytes: Bytes) -> Reply {
    let survey: Survey = decode(&bytes)?;
    let holder = state.with_store(|store| {
        let caller = authorize(store, &headers, Role::Developer)?;
        store.create_survey(caller.study(), survey, OffsetDateTime::now_utc())
    })?;
    Ok(created(&holder))
}

async fn get_survey(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path((guid, created_on)): Path<(String, String)>,
) -> Reply {
    let created_on = parse_created_on(&created_on)?;
    let survey = state.with_store(|store| {
        let caller = store.caller(session_token(&headers))?;
        store.survey(caller.study(), &Guid::new(guid), created_on).cloned()
    })?;
    Ok(ok(&survey))
}

async fn publish_survey(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path((guid, created_on)): Path<(String, String)>,
) -> Reply {
    let created_on = parse_created_on(&created_on)?;
    let holder = state.with_store(|store| {
        let caller = authorize(store, &headers, Role::Developer)?;
        store.publish_survey(caller.study(), &Guid::new(guid), created_on)
    })?;
    Ok(ok(&holder))
}

async fn delete_survey(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path((guid, created_on)): Path<(String, String)>,
) -> Reply {
    let created_on = parse_created_on(&created_on)?;
    state.with_store(|store| {
        let caller = authorize(store, &headers, Role::Admin)?;
        store.delete_survey(caller.study(), &Guid::new(guid), created_on)
    })?;
    Ok(ok(&Message::new("Survey deleted.")))
}

// ============================================================================
// SECTION: Survey Responses
// ============================================================================

async fn create_survey_response(
    State(state): State<StubState>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Reply {
    let response: SurveyResponse = decode(&bytes)?;
    let holder = state.with_store(|store| {
        let caller = consented(store, &headers)?;
        store.create_response(&caller, response, OffsetDateTime::now_utc())
    })?;
    Ok(created(&holder))
}

async fn get_survey_response(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(identifier): Path<String>,
) -> Reply {
    let response = state.with_store(|store| {
        let caller = consented(store, &headers)?;
        store.response(&caller, &identifier).cloned()
    })?;
    Ok(ok(&response))
}

async fn add_answers_to_response(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(identifier): Path<String>,
    bytes: Bytes,
) -> Reply {
    let answers: Vec<SurveyAnswer> = decode(&bytes)?;
    let holder = state.with_store(|store| {
        let caller = consented(store, &headers)?;
        store.add_answers(&caller, &identifier, answers, OffsetDateTime::now_utc())
    })?;
    Ok(ok(&holder))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers.get(SESSION_HEADER).and_then(|value| value.to_str().ok())
}

fn client_info(headers: &HeaderMap) -> ClientInfo {
    headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(ClientInfo::from_user_agent)
        .unwrap_or_default()
}

/// Resolves the caller and requires `role`.
fn authorize(store: &Store, headers: &HeaderMap, role: Role) -> Result<Caller, StubError> {
    let caller = store.caller(session_token(headers))?;
    caller.require_role(role)?;
    Ok(caller)
}

/// Resolves the caller and requires consent.
fn consented(store: &Store, headers: &HeaderMap) -> Result<Caller, StubError> {
    let caller = store.caller(session_token(headers))?;
    caller.require_consent()?;
    Ok(caller)
}

fn decode<T: DeserializeOwned>(bytes: &Bytes) -> Result<T, StubError> {
    serde_json::from_slice(bytes)
        .map_err(|err| StubError::BadRequest(format!("invalid request body: {err}")))
}

fn parse_offset(raw: &str) -> Result<UtcOffset, StubError> {
    if raw == "Z" {
        return Ok(UtcOffset::UTC);
    }
    UtcOffset::parse(raw, format_description!("[offset_hour sign:mandatory]:[offset_minute]"))
        .map_err(|_| StubError::BadRequest(format!("{raw} is not a valid UTC offset")))
}

fn parse_count(name: &str, raw: &str) -> Result<u32, StubError> {
    raw.trim()
        .parse()
        .map_err(|_| StubError::BadRequest(format!("{name} must be a non-negative integer")))
}

fn parse_created_on(raw: &str) -> Result<OffsetDateTime, StubError> {
    OffsetDateTime::parse(raw, &Rfc3339)
        .map_err(|_| StubError::BadRequest(format!("{raw} is not a valid createdOn timestamp")))
}

fn ok<T: Serialize>(value: &T) -> Response {
    Json(value).into_response()
}

fn created<T: Serialize>(value: &T) -> Response {
    (StatusCode::CREATED, Json(value)).into_response()
}

fn accepted(message: &str) -> Response {
    (StatusCode::ACCEPTED, Json(Message::new(message))).into_response()
}
