use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiResponse, ErrorCode,
    auth::{LoginRequest, LoginResponse},
    users::entities::UserRole,
};
use crate::services::{bad_request, storage_error_response};
use crate::utils::jwt::JwtUtils;
use crate::utils::password::verify_password;

use super::AuthService;

fn invalid_credentials() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::AuthFailed,
        "Email or password is incorrect",
    ))
}

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let email = login_request
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());
    let password = login_request.password.filter(|p| !p.is_empty());
    let (Some(email), Some(password)) = (email, password) else {
        return Ok(bad_request(
            ErrorCode::BadRequest,
            "Email and password are required",
        ));
    };

    let storage = service.get_storage(request);
    let config = service.get_config();

    // 1. 根据邮箱获取用户
    let user = match storage.get_user_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(invalid_credentials()),
        Err(e) => return Ok(storage_error_response("Login failed", e)),
    };

    // 2. 验证密码
    if !verify_password(&password, &user.password_hash) {
        return Ok(invalid_credentials());
    }

    // 3. 会话分校：超级管理员从默认分校开始，其他角色使用所属分校
    let branch_id = match user.role {
        UserRole::SuperAdmin => Some(config.portal.super_admin_default_branch),
        UserRole::Admin | UserRole::Teacher => user.branch_id,
    };

    // 4. 生成令牌对
    match JwtUtils::generate_token_pair(user.id, user.role, branch_id) {
        Ok(token_pair) => {
            tracing::info!("User {} logged in successfully", user.email);

            let session_cookie = JwtUtils::create_session_cookie(&token_pair.access_token);
            let refresh_cookie = JwtUtils::create_refresh_token_cookie(&token_pair.refresh_token);

            let response = LoginResponse {
                access_token: token_pair.access_token,
                expires_in: config.jwt.access_token_expiry * 60, // 转换为秒
                user,
                branch_id,
            };

            Ok(HttpResponse::Ok()
                .cookie(session_cookie)
                .cookie(refresh_cookie)
                .json(ApiResponse::success(response, "Login successful")))
        }
        Err(e) => {
            tracing::error!("Failed to generate JWT token: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Login failed, unable to generate token",
                )),
            )
        }
    }
}
