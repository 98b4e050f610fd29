/*!
 * 门户页面路由守卫
 *
 * 按路径前缀决定允许的角色集合，仅依据会话令牌中的角色声明：
 *
 * | 前缀 | strict | inclusive |
 * |---|---|---|
 * | `/teacher` | teacher | teacher, admin, super_admin |
 * | `/admin` | admin, super_admin | admin, super_admin |
 * | `/super_admin` | super_admin | super_admin |
 *
 * 无有效会话时 303 跳转 `/login`，角色不符时 303 跳转 `/unauthorized`。
 * 不匹配任何前缀的路径直接放行。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::LOCATION,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::debug;

use crate::config::{AppConfig, TeacherRoutePolicy};
use crate::models::users::entities::UserRole;
use crate::utils::jwt::JwtUtils;

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

const TEACHER_ONLY: &[UserRole] = &[UserRole::Teacher];
const ALL_ROLES: &[UserRole] = &[UserRole::Teacher, UserRole::Admin, UserRole::SuperAdmin];
const ADMIN_ROLES: &[UserRole] = &[UserRole::Admin, UserRole::SuperAdmin];
const SUPER_ADMIN_ONLY: &[UserRole] = &[UserRole::SuperAdmin];

// 前缀按路径段匹配：`/teacher` 与 `/teacher/...` 命中，`/teachers` 不命中
fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// 路径所需的角色集合，`None` 表示该路径不受守卫
pub fn required_roles(path: &str, policy: TeacherRoutePolicy) -> Option<&'static [UserRole]> {
    if matches_prefix(path, "/teacher") {
        Some(match policy {
            TeacherRoutePolicy::Strict => TEACHER_ONLY,
            TeacherRoutePolicy::Inclusive => ALL_ROLES,
        })
    } else if matches_prefix(path, "/admin") {
        Some(ADMIN_ROLES)
    } else if matches_prefix(path, "/super_admin") {
        Some(SUPER_ADMIN_ONLY)
    } else {
        None
    }
}

#[derive(Clone)]
pub struct RoleGate {
    policy: TeacherRoutePolicy,
}

impl RoleGate {
    pub fn new(policy: TeacherRoutePolicy) -> Self {
        Self { policy }
    }

    pub fn from_config() -> Self {
        Self::new(AppConfig::get().portal.teacher_route_policy)
    }
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location))
        .finish()
}

impl<S, B> Transform<S, ServiceRequest> for RoleGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RoleGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RoleGateMiddleware {
            service: Rc::new(service),
            policy: self.policy,
        }))
    }
}

pub struct RoleGateMiddleware<S> {
    service: Rc<S>,
    policy: TeacherRoutePolicy,
}

impl<S, B> Service<ServiceRequest> for RoleGateMiddleware<S>
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
        let policy = self.policy;

        Box::pin(async move {
            let Some(allowed) = required_roles(req.path(), policy) else {
                return Ok(srv.call(req).await?.map_into_left_body());
            };

            let claims = JwtUtils::extract_session_token(req.request())
                .and_then(|token| JwtUtils::verify_access_token(&token).ok());

            let Some(claims) = claims else {
                debug!("No valid session for {}, redirecting to login", req.path());
                return Ok(req.into_response(redirect(LOGIN_PATH).map_into_right_body()));
            };

            match claims.user_role() {
                Some(role) if allowed.contains(&role) => {
                    req.extensions_mut().insert(claims);
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                role => {
                    debug!(
                        "Role {:?} not allowed on {}, redirecting to {}",
                        role,
                        req.path(),
                        UNAUTHORIZED_PATH
                    );
                    Ok(req.into_response(redirect(UNAUTHORIZED_PATH).map_into_right_body()))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test as atest, web};

    #[test]
    fn test_required_roles_table() {
        use TeacherRoutePolicy::*;
        let cases: &[(&str, TeacherRoutePolicy, Option<&[UserRole]>)] = &[
            ("/teacher", Strict, Some(TEACHER_ONLY)),
            ("/teacher/courses/3", Strict, Some(TEACHER_ONLY)),
            ("/teacher", Inclusive, Some(ALL_ROLES)),
            ("/teachers", Strict, None),
            ("/admin", Strict, Some(ADMIN_ROLES)),
            ("/admin/classes", Inclusive, Some(ADMIN_ROLES)),
            ("/administrator", Strict, None),
            ("/super_admin", Strict, Some(SUPER_ADMIN_ONLY)),
            ("/super_admin/branches", Inclusive, Some(SUPER_ADMIN_ONLY)),
            ("/login", Strict, None),
            ("/api/teacher/grades", Strict, None),
            ("/", Strict, None),
        ];
        for (path, policy, expected) in cases {
            assert_eq!(required_roles(path, *policy), *expected, "{path} {policy:?}");
        }
    }

    async fn call(
        policy: TeacherRoutePolicy,
        path: &str,
        role: Option<UserRole>,
    ) -> (StatusCode, Option<String>) {
        let app = atest::init_service(
            App::new()
                .wrap(RoleGate::new(policy))
                .default_service(web::to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let mut req = atest::TestRequest::get().uri(path);
        if let Some(role) = role {
            let token = JwtUtils::generate_access_token(1, role, Some(1)).unwrap();
            req = req.insert_header(("Authorization", format!("Bearer {token}")));
        }
        let resp = atest::call_service(&app, req.to_request()).await;
        let location = resp
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        (resp.status(), location)
    }

    #[actix_web::test]
    async fn test_redirects() {
        use TeacherRoutePolicy::*;

        assert_eq!(
            call(Strict, "/teacher", None).await,
            (StatusCode::SEE_OTHER, Some(LOGIN_PATH.to_string()))
        );
        assert_eq!(
            call(Strict, "/teacher", Some(UserRole::Admin)).await,
            (StatusCode::SEE_OTHER, Some(UNAUTHORIZED_PATH.to_string()))
        );
        assert_eq!(
            call(Inclusive, "/teacher/x", Some(UserRole::Admin)).await,
            (StatusCode::OK, None)
        );
        assert_eq!(
            call(Strict, "/admin", Some(UserRole::SuperAdmin)).await,
            (StatusCode::OK, None)
        );
        assert_eq!(
            call(Strict, "/super_admin", Some(UserRole::Admin)).await,
            (StatusCode::SEE_OTHER, Some(UNAUTHORIZED_PATH.to_string()))
        );
        assert_eq!(
            call(Strict, "/teachers", None).await,
            (StatusCode::OK, None)
        );
    }
}
