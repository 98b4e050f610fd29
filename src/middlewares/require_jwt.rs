/*!
 * 会话认证中间件
 *
 * 校验会话令牌并将解析出的 `SessionUser` 放入请求扩展，供后续中间件和处理程序使用。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::{web, App};
 * use crate::middlewares::RequireJWT;
 *
 * App::new().service(
 *     web::scope("/api/teacher")
 *         .wrap(RequireJWT)
 *         .route("/courses", web::get().to(list_courses)),
 * );
 *
 * async fn list_courses(req: HttpRequest) -> HttpResponse {
 *     let user_id = RequireJWT::extract_user_id(&req);
 *     let branch_id = RequireJWT::extract_branch_id(&req);
 *     // ...
 * }
 * ```
 *
 * ## 认证流程
 *
 * 1. 令牌取自 `Authorization: Bearer <token>`，其次是 `session_token` cookie
 * 2. 校验签名、过期时间和令牌类型（access）
 * 3. 按用户 ID 从缓存或存储加载用户，角色以数据库为准
 * 4. super_admin 的分校取自令牌中的 `branch_id`，其他角色取账号所属分校
 * 5. 任一步失败返回 401
 */

use crate::cache::{ObjectCache, get_json, insert_json, user_cache_key};
use crate::config::AppConfig;
use crate::models::ErrorCode;
use crate::models::auth::SessionUser;
use crate::models::users::entities::{User, UserRole};
use crate::storage::Storage;
use crate::utils::jwt::{Claims, JwtUtils};
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireJWT;

// 从缓存或存储加载用户
async fn load_user(req: &ServiceRequest, user_id: i64) -> Result<User, String> {
    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|c| c.get_ref().clone());

    let key = user_cache_key(user_id);
    if let Some(cache) = &cache
        && let Some(user) = get_json::<User>(cache.as_ref(), &key).await
    {
        return Ok(user);
    }

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .ok_or_else(|| "Storage not configured".to_string())?
        .get_ref()
        .clone();

    let user = storage
        .get_user_by_id(user_id)
        .await
        .map_err(|e| {
            info!("Failed to load user {}: {}", user_id, e);
            "Failed to retrieve user from storage".to_string()
        })?
        .ok_or_else(|| "User not found".to_string())?;

    if let Some(cache) = &cache {
        insert_json(
            cache.as_ref(),
            key,
            &user,
            AppConfig::get().cache.default_ttl,
        )
        .await;
    }

    Ok(user)
}

// 提取并验证会话令牌
async fn authenticate(req: &ServiceRequest) -> Result<(SessionUser, Claims), String> {
    let token = JwtUtils::extract_session_token(req.request())
        .ok_or_else(|| "Missing session token".to_string())?;

    let claims = JwtUtils::verify_access_token(&token).map_err(|err| {
        info!("Session token validation failed: {}", err);
        "Invalid session token".to_string()
    })?;

    let user_id = claims
        .user_id()
        .ok_or_else(|| "Invalid user ID in token".to_string())?;

    let user = load_user(req, user_id).await?;

    Ok((SessionUser::resolve(user, claims.branch_id), claims))
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match authenticate(&req).await {
                Ok((session, claims)) => {
                    debug!(
                        "Session authenticated: user={}, branch={:?}",
                        session.id(),
                        session.branch_id
                    );
                    req.extensions_mut().insert(session);
                    req.extensions_mut().insert(claims);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!("Authentication failed for request to {}: {}", req.path(), err);
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            &format!("Unauthorized: {err}"),
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

// 辅助函数：从请求扩展中提取会话信息
impl RequireJWT {
    pub fn extract_session(req: &HttpRequest) -> Option<SessionUser> {
        req.extensions().get::<SessionUser>().cloned()
    }

    pub fn extract_user_id(req: &HttpRequest) -> Option<i64> {
        req.extensions().get::<SessionUser>().map(|s| s.id())
    }

    pub fn extract_user_role(req: &HttpRequest) -> Option<UserRole> {
        req.extensions().get::<SessionUser>().map(|s| s.role())
    }

    /// 会话分校
    pub fn extract_branch_id(req: &HttpRequest) -> Option<i64> {
        req.extensions()
            .get::<SessionUser>()
            .and_then(|s| s.branch_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestContext;
    use actix_web::{App, HttpResponse, cookie::Cookie, test};

    async fn whoami(req: HttpRequest) -> HttpResponse {
        let session = RequireJWT::extract_session(&req).unwrap();
        HttpResponse::Ok().json(serde_json::json!({
            "id": session.id(),
            "role": session.role(),
            "branch_id": session.branch_id,
        }))
    }

    #[actix_web::test]
    async fn test_bearer_and_cookie_tokens() {
        let ctx = TestContext::new().await;
        let branch = ctx.branch("Central").await;
        let teacher = ctx.user("t@school.test", UserRole::Teacher, Some(branch)).await;
        let token = ctx.token(&teacher, Some(branch));

        let app = test::init_service(
            ctx.app_data(App::new())
                .service(web::scope("/api").wrap(RequireJWT).route("/me", web::get().to(whoami))),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["id"], teacher.id);
        assert_eq!(body["role"], "teacher");
        assert_eq!(body["branch_id"], branch);

        let req = test::TestRequest::get()
            .uri("/api/me")
            .cookie(Cookie::new("session_token", token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_missing_invalid_or_deleted_user_is_401() {
        let ctx = TestContext::new().await;
        let teacher = ctx.user("t@school.test", UserRole::Teacher, None).await;
        let token = ctx.token(&teacher, None);

        let app = test::init_service(
            ctx.app_data(App::new())
                .service(web::scope("/api").wrap(RequireJWT).route("/me", web::get().to(whoami))),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/me").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );

        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );

        ctx.storage.delete_user(teacher.id).await.unwrap();
        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
