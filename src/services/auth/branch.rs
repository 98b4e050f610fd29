use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::{UpdateBranchRequest, UpdateBranchResponse},
    users::entities::UserRole,
};
use crate::services::{bad_request, forbidden, not_found, storage_error_response, unauthorized};
use crate::utils::jwt::JwtUtils;

use super::AuthService;

/// 切换会话分校：只重新签发令牌，不修改数据库
pub async fn handle_update_branch(
    service: &AuthService,
    update_request: UpdateBranchRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(session) = RequireJWT::extract_session(request) else {
        return Ok(unauthorized());
    };

    if session.role() != UserRole::SuperAdmin {
        return Ok(forbidden(
            ErrorCode::Forbidden,
            "Only super_admin can switch branches",
        ));
    }

    let Some(branch_id) = update_request.branch_id.filter(|id| *id > 0) else {
        return Ok(bad_request(
            ErrorCode::BadRequest,
            "branch_id must be a positive integer",
        ));
    };

    match service.get_storage(request).get_branch_by_id(branch_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(not_found(
                ErrorCode::BranchNotFound,
                format!("Branch {branch_id} not found"),
            ));
        }
        Err(e) => return Ok(storage_error_response("Failed to load branch", e)),
    }

    match JwtUtils::generate_token_pair(session.id(), session.role(), Some(branch_id)) {
        Ok(pair) => {
            tracing::info!("User {} switched to branch {}", session.id(), branch_id);
            Ok(HttpResponse::Ok()
                .cookie(JwtUtils::create_session_cookie(&pair.access_token))
                .cookie(JwtUtils::create_refresh_token_cookie(&pair.refresh_token))
                .json(ApiResponse::success(
                    UpdateBranchResponse {
                        branch_id,
                        access_token: pair.access_token,
                    },
                    "Branch updated",
                )))
        }
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
