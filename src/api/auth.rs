use actix_web::{web, HttpResponse};

use crate::api::SuccessResponse;
use crate::services::auth_service::{self, AuthRequest, AuthResponse};
use crate::services::CurrentUser;
use crate::state::AppState;
use crate::utils::AppError;

/// POST /api/v1/auth - Sign in with one or more provider identities
///
/// Every token is verified with its provider; the identities are then
/// linked to one local user and a session cookie is set.
#[utoipa::path(
    post,
    path = "/api/v1/auth",
    tag = "Auth",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Signed in (session cookie set), or an error payload", body = AuthResponse)
    )
)]
pub async fn auth(
    state: web::Data<AppState>,
    request: web::Json<AuthRequest>,
) -> Result<HttpResponse, AppError> {
    let count = request.accounts.as_ref().map_or(0, Vec::len);
    log::info!("🔐 POST /auth - {} account(s)", count);

    let user = auth_service::authenticate(state.store.as_ref(), &state.providers, &request)
        .await
        .map_err(|e| {
            log::warn!("⚠️ Sign-in rejected: {}", e);
            e
        })?;

    let token = state.sessions.start(state.store.as_ref(), &user.user_id).await?;

    log::info!("✅ Signed in: {}", user.user_id);

    Ok(HttpResponse::Ok()
        .cookie(state.sessions.cookie(token))
        .json(AuthResponse {
            success: true,
            user_id: user.user_id,
        }))
}

/// POST /api/v1/logout - End the current session
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Session ended and cookie cleared", body = SuccessResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn logout(
    state: web::Data<AppState>,
    user: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    log::info!("👋 POST /logout - {}", user.user_id);

    state.sessions.end(state.store.as_ref(), &user.session_id).await?;

    Ok(HttpResponse::Ok()
        .cookie(state.sessions.removal_cookie())
        .json(SuccessResponse::ok()))
}
