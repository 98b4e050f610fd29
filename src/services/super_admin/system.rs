use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::warn;

use super::SuperAdminService;
use crate::models::{ApiResponse, ErrorCode, portal::entities::DatabaseHealth};
use crate::services::storage_error_response;

pub async fn get_statistics(
    service: &SuperAdminService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    match service.get_storage(request).get_user_statistics().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            stats,
            "Statistics retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response("Failed to retrieve statistics", e)),
    }
}

/// 数据库连通性检查，失败时返回 503
pub async fn database_health(
    service: &SuperAdminService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    match service.get_storage(request).ping().await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            DatabaseHealth {
                status: "ok".to_string(),
                connected: true,
                timestamp: chrono::Utc::now(),
            },
            "Database is reachable",
        ))),
        Err(e) => {
            warn!("Database ping failed: {}", e);
            Ok(HttpResponse::ServiceUnavailable().json(ApiResponse::error(
                ErrorCode::InternalServerError,
                DatabaseHealth {
                    status: "error".to_string(),
                    connected: false,
                    timestamp: chrono::Utc::now(),
                },
                "Database is unreachable",
            )))
        }
    }
}
