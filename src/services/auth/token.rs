use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireJWT;
use crate::models::auth::{RefreshTokenResponse, SessionInfoResponse, effective_branch_id};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{storage_error_response, unauthorized};
use crate::utils::jwt::JwtUtils;

use super::AuthService;

fn expired_session() -> HttpResponse {
    HttpResponse::Unauthorized()
        .cookie(JwtUtils::create_empty_refresh_token_cookie())
        .json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Login expired or invalid, please login again",
        ))
}

/// 用 refresh cookie 换取新的会话令牌，角色以数据库为准；仅 super_admin 保留令牌中的分校
pub async fn handle_refresh_token(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let config = service.get_config();

    let Some(refresh_token) = JwtUtils::extract_refresh_token_from_cookie(request) else {
        return Ok(unauthorized());
    };

    let claims = match JwtUtils::verify_refresh_token(&refresh_token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::info!("Refresh token rejected: {}", e);
            return Ok(expired_session());
        }
    };

    let Some(user_id) = claims.user_id() else {
        return Ok(expired_session());
    };

    let user = match service.get_storage(request).get_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(expired_session()),
        Err(e) => return Ok(storage_error_response("Token refresh failed", e)),
    };

    let branch_id = effective_branch_id(&user, claims.branch_id);
    match JwtUtils::generate_access_token(user.id, user.role, branch_id) {
        Ok(access_token) => Ok(HttpResponse::Ok()
            .cookie(JwtUtils::create_session_cookie(&access_token))
            .json(ApiResponse::success(
                RefreshTokenResponse {
                    access_token,
                    expires_in: config.jwt.access_token_expiry * 60,
                },
                "Token refreshed successfully",
            ))),
        Err(e) => {
            tracing::error!("Failed to generate JWT token: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Unable to generate token",
                )),
            )
        }
    }
}

pub async fn handle_me(request: &HttpRequest) -> ActixResult<HttpResponse> {
    match RequireJWT::extract_session(request) {
        Some(session) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SessionInfoResponse {
                user: session.user,
                branch_id: session.branch_id,
            },
            "Session retrieved successfully",
        ))),
        None => Ok(unauthorized()),
    }
}
