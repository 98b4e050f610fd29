use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::auth::{LoginRequest, UpdateBranchRequest};
use crate::services::AuthService;

// 懒加载的全局 AuthService 实例
static AUTH_SERVICE: Lazy<AuthService> = Lazy::new(AuthService::new_lazy);

pub async fn login(
    req: HttpRequest,
    login_data: web::Json<LoginRequest>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.login(login_data.into_inner(), &req).await
}

pub async fn refresh_token(request: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.refresh_token(&request).await
}

pub async fn logout() -> ActixResult<HttpResponse> {
    AUTH_SERVICE.logout().await
}

pub async fn me(request: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.me(&request).await
}

pub async fn update_branch(
    req: HttpRequest,
    body: web::Json<UpdateBranchRequest>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.update_branch(body.into_inner(), &req).await
}

// 配置路由
pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh_token))
            .route("/logout", web::post().to(logout))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireJWT)
                    .route("/me", web::get().to(me))
                    .route("/update-branch", web::post().to(update_branch)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::test_support::{TEST_PASSWORD, TestContext};
    use crate::utils::jwt::{JwtUtils, REFRESH_COOKIE, SESSION_COOKIE};
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn test_login_refresh_and_me() {
        let ctx = TestContext::new().await;
        let branch = ctx.branch("North").await;
        let teacher = ctx
            .user("teacher@school.test", UserRole::Teacher, Some(branch))
            .await;

        let app =
            test::init_service(ctx.app_data(App::new()).configure(configure_auth_routes)).await;

        // 缺少密码
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "teacher@school.test"}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );

        // 密码错误
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "teacher@school.test", "password": "wrong"}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "teacher@school.test", "password": TEST_PASSWORD}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let refresh_cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == REFRESH_COOKIE)
            .expect("refresh cookie")
            .into_owned();
        assert!(
            resp.response()
                .cookies()
                .any(|c| c.name() == SESSION_COOKIE)
        );
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["branch_id"], branch);
        assert_eq!(body["data"]["user"]["id"], teacher.id);
        let access = body["data"]["access_token"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", format!("Bearer {access}")))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["branch_id"], branch);

        let req = test::TestRequest::post()
            .uri("/api/auth/refresh")
            .cookie(refresh_cookie)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let refreshed = body["data"]["access_token"].as_str().unwrap();
        let claims = JwtUtils::verify_access_token(refreshed).unwrap();
        assert_eq!(claims.branch_id, Some(branch));
        assert_eq!(claims.user_id(), Some(teacher.id));
    }

    #[actix_web::test]
    async fn test_update_branch() {
        let ctx = TestContext::new().await;
        let first = ctx.branch("First").await;
        let second = ctx.branch("Second").await;
        let boss = ctx.user("boss@school.test", UserRole::SuperAdmin, None).await;
        let admin = ctx
            .user("admin@school.test", UserRole::Admin, Some(first))
            .await;

        let app =
            test::init_service(ctx.app_data(App::new()).configure(configure_auth_routes)).await;

        let switch = |token: String, body: Value| {
            test::TestRequest::post()
                .uri("/api/auth/update-branch")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(body)
                .to_request()
        };

        let req = switch(ctx.token(&admin, Some(first)), json!({"branch_id": second}));
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN
        );

        let req = switch(ctx.token(&boss, Some(first)), json!({"branch_id": 9999}));
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );

        let req = switch(ctx.token(&boss, Some(first)), json!({}));
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );

        let req = switch(ctx.token(&boss, Some(first)), json!({"branch_id": second}));
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(
            resp.response()
                .cookies()
                .any(|c| c.name() == SESSION_COOKIE)
        );
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["branch_id"], second);
        let token = body["data"]["access_token"].as_str().unwrap();
        let claims = JwtUtils::verify_access_token(token).unwrap();
        assert_eq!(claims.branch_id, Some(second));
        assert_eq!(claims.user_role(), Some(UserRole::SuperAdmin));
    }

    #[actix_web::test]
    async fn test_logout_clears_cookies() {
        let ctx = TestContext::new().await;
        let app =
            test::init_service(ctx.app_data(App::new()).configure(configure_auth_routes)).await;

        let req = test::TestRequest::post().uri("/api/auth/logout").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cleared: Vec<_> = resp
            .response()
            .cookies()
            .filter(|c| c.value().is_empty())
            .map(|c| c.name().to_string())
            .collect();
        assert!(cleared.contains(&SESSION_COOKIE.to_string()));
        assert!(cleared.contains(&REFRESH_COOKIE.to_string()));
    }

    #[actix_web::test]
    async fn test_refresh_uses_account_branch_after_demotion() {
        let ctx = TestContext::new().await;
        let north = ctx.branch("North").await;
        let south = ctx.branch("South").await;
        let user = ctx
            .user("former.boss@school.test", UserRole::SuperAdmin, Some(north))
            .await;
        let refresh = JwtUtils::generate_refresh_token(user.id, user.role, Some(south)).unwrap();

        let app =
            test::init_service(ctx.app_data(App::new()).configure(configure_auth_routes)).await;

        let call_refresh = || {
            test::TestRequest::post()
                .uri("/api/auth/refresh")
                .cookie(JwtUtils::create_refresh_token_cookie(&refresh))
                .to_request()
        };

        let body: Value = test::call_and_read_body_json(&app, call_refresh()).await;
        let claims =
            JwtUtils::verify_access_token(body["data"]["access_token"].as_str().unwrap()).unwrap();
        assert_eq!(claims.branch_id, Some(south));

        ctx.storage
            .update_user(
                user.id,
                crate::models::users::requests::UpdateUser {
                    password_hash: None,
                    role: Some(UserRole::Admin),
                    branch_id: None,
                },
            )
            .await
            .unwrap();

        let body: Value = test::call_and_read_body_json(&app, call_refresh()).await;
        let claims =
            JwtUtils::verify_access_token(body["data"]["access_token"].as_str().unwrap()).unwrap();
        assert_eq!(claims.branch_id, Some(north));
        assert_eq!(claims.user_role(), Some(UserRole::Admin));
    }
}
