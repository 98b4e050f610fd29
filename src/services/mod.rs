pub mod admin;
pub mod auth;
pub mod branches;
pub mod portal;
pub mod super_admin;
pub mod teacher;

pub use admin::AdminService;
pub use auth::AuthService;
pub use branches::BranchService;
pub use portal::PortalService;
pub use super_admin::SuperAdminService;
pub use teacher::TeacherService;

use actix_web::{HttpRequest, HttpResponse};
use tracing::error;

use crate::errors::PortalError;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};

// 存储错误转换为响应：唯一约束冲突 409，其余 500（细节只写日志）
pub(crate) fn storage_error_response(context: &str, e: PortalError) -> HttpResponse {
    if e.is_unique_violation() {
        return HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::Conflict,
            format!("{context}: resource already exists"),
        ));
    }
    error!("{}: {}", context, e);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        context,
    ))
}

pub(crate) fn bad_request(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn not_found(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn forbidden(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::Unauthorized,
        "Unauthorized access, please login",
    ))
}

/// 当前会话的分校，缺失时返回 400
pub(crate) fn session_branch(request: &HttpRequest) -> Result<i64, HttpResponse> {
    RequireJWT::extract_branch_id(request).ok_or_else(|| {
        bad_request(
            ErrorCode::BranchRequired,
            "No branch selected for the current session",
        )
    })
}

/// 账号变更后清除认证缓存
pub(crate) async fn invalidate_cached_user(request: &HttpRequest, user_id: i64) {
    if let Some(cache) =
        request.app_data::<actix_web::web::Data<std::sync::Arc<dyn crate::cache::ObjectCache>>>()
    {
        crate::cache::invalidate_user(cache.get_ref().as_ref(), user_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_internal_error_hides_storage_detail() {
        let resp = storage_error_response(
            "Failed to save grade",
            PortalError::database_operation("FOREIGN KEY constraint failed"),
        );
        assert_eq!(resp.status(), actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Failed to save grade");
        assert_eq!(json["code"], 9000);
    }
}
