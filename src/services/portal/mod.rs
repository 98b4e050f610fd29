//! 门户页面：RoleGate 放行后返回简要面板，以及公开的登录、无权限和健康页面

use actix_web::{HttpMessage, HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::models::{
    ApiResponse, AppStartTime, ErrorCode,
    portal::entities::{DashboardResponse, ServiceHealth},
};
use crate::services::unauthorized;
use crate::utils::jwt::Claims;

pub struct PortalService;

impl PortalService {
    pub fn new_lazy() -> Self {
        Self
    }

    /// `portal` 为门户名（teacher / admin / super_admin）
    pub async fn dashboard(&self, portal: &str, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let claims = request.extensions().get::<Claims>().cloned();
        let Some(claims) = claims else {
            return Ok(unauthorized());
        };
        let (Some(user_id), Some(role)) = (claims.user_id(), claims.user_role()) else {
            return Ok(unauthorized());
        };

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            DashboardResponse {
                portal: portal.to_string(),
                path: request.path().to_string(),
                user_id,
                role,
                branch_id: claims.branch_id,
            },
            "Dashboard loaded",
        )))
    }

    pub async fn login_page(&self) -> ActixResult<HttpResponse> {
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Please log in via POST /api/auth/login",
        )))
    }

    pub async fn unauthorized_page(&self) -> ActixResult<HttpResponse> {
        Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "You are not allowed to access this portal",
        )))
    }

    pub async fn health(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let uptime_seconds = request
            .app_data::<web::Data<AppStartTime>>()
            .map(|start| (chrono::Utc::now() - start.start_datetime).num_seconds())
            .unwrap_or_default();

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            ServiceHealth {
                status: "ok".to_string(),
                uptime_seconds,
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            "Service is running",
        )))
    }
}
