use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::services::PortalService;

// 懒加载的全局 PortalService 实例
static PORTAL_SERVICE: Lazy<PortalService> = Lazy::new(PortalService::new_lazy);

pub async fn teacher_dashboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    PORTAL_SERVICE.dashboard("teacher", &req).await
}

pub async fn admin_dashboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    PORTAL_SERVICE.dashboard("admin", &req).await
}

pub async fn super_admin_dashboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    PORTAL_SERVICE.dashboard("super_admin", &req).await
}

pub async fn login_page() -> ActixResult<HttpResponse> {
    PORTAL_SERVICE.login_page().await
}

pub async fn unauthorized_page() -> ActixResult<HttpResponse> {
    PORTAL_SERVICE.unauthorized_page().await
}

pub async fn health(req: HttpRequest) -> ActixResult<HttpResponse> {
    PORTAL_SERVICE.health(&req).await
}

// 配置路由；页面守卫由应用级 RoleGate 负责
pub fn configure_portal_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::get().to(login_page))
        .route("/unauthorized", web::get().to(unauthorized_page))
        .route("/health", web::get().to(health))
        .route("/teacher", web::get().to(teacher_dashboard))
        .route("/teacher/{tail:.*}", web::get().to(teacher_dashboard))
        .route("/admin", web::get().to(admin_dashboard))
        .route("/admin/{tail:.*}", web::get().to(admin_dashboard))
        .route("/super_admin", web::get().to(super_admin_dashboard))
        .route("/super_admin/{tail:.*}", web::get().to(super_admin_dashboard));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TeacherRoutePolicy;
    use crate::middlewares::RoleGate;
    use crate::models::{AppStartTime, users::entities::UserRole};
    use crate::utils::jwt::{JwtUtils, SESSION_COOKIE};
    use actix_web::{App, cookie::Cookie, http::StatusCode, http::header::LOCATION, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_pages_behind_role_gate() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppStartTime {
                    start_datetime: chrono::Utc::now(),
                }))
                .wrap(RoleGate::new(TeacherRoutePolicy::Strict))
                .configure(configure_portal_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/admin/classes").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(LOCATION).unwrap(), "/login");

        let token = JwtUtils::generate_access_token(7, UserRole::Admin, Some(3)).unwrap();
        let req = test::TestRequest::get()
            .uri("/admin/classes")
            .cookie(Cookie::new(SESSION_COOKIE, token.clone()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["portal"], "admin");
        assert_eq!(body["data"]["path"], "/admin/classes");
        assert_eq!(body["data"]["user_id"], 7);
        assert_eq!(body["data"]["branch_id"], 3);

        let req = test::TestRequest::get()
            .uri("/teacher")
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(LOCATION).unwrap(), "/unauthorized");

        for uri in ["/login", "/health"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["status"], "ok");
    }
}
