//! Handlers for the `/communications` resource.
//!
//! Direct communications go to an explicit recipient list. Broadcasts fan out
//! to every active user inside a geographic subtree, which is narrowed to the
//! sender's own scope for non-admin callers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use pstats_core::communication::{
    normalize_recipients, validate_body, validate_priority, BOX_INBOX, BOX_SENT, KIND_BROADCAST,
    KIND_DIRECT, PRIORITY_NORMAL,
};
use pstats_core::error::CoreError;
use pstats_core::pagination;
use pstats_core::scope::{enforce_geo_filter, GeoFilter};
use pstats_core::types::DbId;
use pstats_core::validation::search_pattern;
use pstats_db::models::communication::{
    BroadcastCommunication, Communication, CommunicationDetail, CommunicationListItem,
    CommunicationListParams, CreateCommunication, CreateMessage, MailboxQuery, Message,
    NewCommunication,
};
use pstats_db::repositories::CommunicationRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAuth, RequireScope};
use crate::query::PaginationParams;
use crate::response::{paginated, success, ApiJson, Page};
use crate::scope::ensure_filter_in_scope;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Communication", id })
}

/// Response body for `POST /communications/broadcast`.
#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    #[serde(flatten)]
    pub communication: Communication,
    pub recipient_count: u64,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread_count: i64,
}

/// Validate subject, body and priority shared by both kinds of communication.
fn prepare(
    user: &AuthUser,
    kind: &'static str,
    subject: &str,
    body: &str,
    priority: Option<&str>,
) -> Result<NewCommunication, CoreError> {
    if subject.trim().is_empty() {
        return Err(CoreError::Validation("Subject cannot be empty".into()));
    }
    validate_body(body).map_err(CoreError::Validation)?;
    let priority = priority.map(str::trim).unwrap_or(PRIORITY_NORMAL);
    validate_priority(priority).map_err(CoreError::Validation)?;

    Ok(NewCommunication {
        subject: subject.to_string(),
        body: body.to_string(),
        sender_id: user.user_id,
        kind,
        priority: priority.to_string(),
    })
}

/// Load a communication the caller may read. Admins see every active one.
async fn find_visible(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Communication> {
    let found = if user.is_admin() {
        CommunicationRepo::find_by_id(&state.pool, id).await?
    } else {
        CommunicationRepo::find_for_participant(&state.pool, id, user.user_id).await?
    };
    found.ok_or_else(|| not_found(id))
}

/// GET /api/communications
///
/// `?box=inbox` (default) lists what the caller received, `?box=sent` what
/// they sent. `unread_only` applies to the inbox.
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<CommunicationListParams>,
) -> AppResult<ApiJson<Page<CommunicationListItem>>> {
    let search = search_pattern(params.search.as_deref()).map_err(CoreError::Validation)?;
    let (limit, offset) = pagination::page(params.limit, params.offset);
    let query = MailboxQuery {
        user_id: user.user_id,
        search,
        unread_only: params.unread_only.unwrap_or(false),
        limit,
        offset,
    };

    let (items, total) = match params.mailbox.as_deref().unwrap_or(BOX_INBOX) {
        BOX_INBOX => (
            CommunicationRepo::list_inbox(&state.pool, &query).await?,
            CommunicationRepo::count_inbox(&state.pool, &query).await?,
        ),
        BOX_SENT => (
            CommunicationRepo::list_sent(&state.pool, &query).await?,
            CommunicationRepo::count_sent(&state.pool, &query).await?,
        ),
        other => {
            return Err(CoreError::Validation(format!(
                "Invalid box '{other}'. Must be one of: {BOX_INBOX}, {BOX_SENT}"
            ))
            .into());
        }
    };

    Ok(paginated(
        "Communications retrieved successfully",
        items,
        total,
        limit,
        offset,
    ))
}

/// POST /api/communications
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateCommunication>,
) -> AppResult<(StatusCode, ApiJson<CommunicationDetail>)> {
    let new = prepare(
        &user,
        KIND_DIRECT,
        &input.subject,
        &input.body,
        input.priority.as_deref(),
    )?;
    let recipients =
        normalize_recipients(user.user_id, &input.recipient_ids).map_err(CoreError::Validation)?;

    let active = CommunicationRepo::count_active_users(&state.pool, &recipients).await?;
    if active != recipients.len() as i64 {
        return Err(CoreError::Validation(
            "One or more recipients do not exist or are inactive".into(),
        )
        .into());
    }

    let communication =
        CommunicationRepo::create_with_recipients(&state.pool, &new, &recipients).await?;
    let recipients = CommunicationRepo::list_recipients(&state.pool, communication.id).await?;
    tracing::info!(
        user_id = user.user_id,
        communication_id = communication.id,
        recipients = recipients.len(),
        "Communication sent"
    );
    Ok((
        StatusCode::CREATED,
        success(
            "Communication sent successfully",
            CommunicationDetail {
                communication,
                recipients,
            },
        ),
    ))
}

/// POST /api/communications/broadcast
///
/// A non-admin sender needs a geographic scope and can only target their
/// own subtree.
pub async fn broadcast(
    RequireScope { user, scope }: RequireScope,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<BroadcastCommunication>,
) -> AppResult<(StatusCode, ApiJson<BroadcastResponse>)> {

    let requested = GeoFilter {
        state_id: input.state_id,
        district_id: input.district_id,
        range_id: input.range_id,
        battalion_id: input.battalion_id,
    };
    let target = enforce_geo_filter(requested, &scope)?;
    ensure_filter_in_scope(&state, &target, &scope).await?;
    let new = prepare(
        &user,
        KIND_BROADCAST,
        &input.subject,
        &input.body,
        input.priority.as_deref(),
    )?;

    let (communication, recipient_count) =
        CommunicationRepo::broadcast(&state.pool, &new, &target).await?;
    tracing::info!(
        user_id = user.user_id,
        communication_id = communication.id,
        recipient_count,
        "Broadcast sent"
    );
    Ok((
        StatusCode::CREATED,
        success(
            "Broadcast sent successfully",
            BroadcastResponse {
                communication,
                recipient_count,
            },
        ),
    ))
}

/// GET /api/communications/unread-count
pub async fn unread_count(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<ApiJson<UnreadCount>> {
    let unread_count = CommunicationRepo::unread_count(&state.pool, user.user_id).await?;
    Ok(success(
        "Unread count retrieved successfully",
        UnreadCount { unread_count },
    ))
}

/// GET /api/communications/{id}
pub async fn get_by_id(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<CommunicationDetail>> {
    let communication = find_visible(&state, &user, id).await?;
    let recipients = CommunicationRepo::list_recipients(&state.pool, id).await?;
    Ok(success(
        "Communication retrieved successfully",
        CommunicationDetail {
            communication,
            recipients,
        },
    ))
}

/// POST /api/communications/{id}/messages
///
/// Only the sender and the recipients may reply.
pub async fn add_message(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<CreateMessage>,
) -> AppResult<(StatusCode, ApiJson<Message>)> {
    validate_body(&input.body).map_err(CoreError::Validation)?;
    CommunicationRepo::find_for_participant(&state.pool, id, user.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let message = CommunicationRepo::add_message(&state.pool, id, user.user_id, &input.body).await?;
    tracing::info!(
        user_id = user.user_id,
        communication_id = id,
        message_id = message.id,
        "Reply added"
    );
    Ok((StatusCode::CREATED, success("Message added successfully", message)))
}

/// GET /api/communications/{id}/messages
pub async fn list_messages(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
) -> AppResult<ApiJson<Page<Message>>> {
    find_visible(&state, &user, id).await?;
    let (limit, offset) = params.page();
    let items = CommunicationRepo::list_messages(&state.pool, id, limit, offset).await?;
    let total = CommunicationRepo::count_messages(&state.pool, id).await?;
    Ok(paginated(
        "Messages retrieved successfully",
        items,
        total,
        limit,
        offset,
    ))
}

/// PUT /api/communications/{id}/read
pub async fn mark_read(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<()>> {
    CommunicationRepo::find_for_participant(&state.pool, id, user.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if !CommunicationRepo::mark_read(&state.pool, id, user.user_id).await? {
        return Err(CoreError::Validation(
            "Only recipients can mark a communication as read".into(),
        )
        .into());
    }
    Ok(success("Communication marked as read", ()))
}

/// DELETE /api/communications/{id}
///
/// The sender or an admin hides the thread for everyone.
pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiJson<()>> {
    let communication = find_visible(&state, &user, id).await?;
    if communication.sender_id != user.user_id && !user.is_admin() {
        return Err(CoreError::Forbidden(
            "Only the sender or an admin can delete a communication".into(),
        )
        .into());
    }
    if !CommunicationRepo::deactivate(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = user.user_id, communication_id = id, "Communication deleted");
    Ok(success("Communication deleted successfully", ()))
}
