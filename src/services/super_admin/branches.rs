use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SuperAdminService;
use crate::models::{ApiResponse, ErrorCode, branches::requests::CreateBranchRequest};
use crate::services::{bad_request, storage_error_response};
use crate::utils::validate::validate_name;

pub async fn list_branches(
    service: &SuperAdminService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    match service.get_storage(request).list_branches().await {
        Ok(branches) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            branches,
            "Branches retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response("Failed to retrieve branches", e)),
    }
}

pub async fn create_branch(
    service: &SuperAdminService,
    branch: CreateBranchRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_name(&branch.name) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    match service.get_storage(request).create_branch(branch).await {
        Ok(created) => Ok(HttpResponse::Created().json(ApiResponse::success(
            created,
            "Branch created successfully",
        ))),
        Err(e) => Ok(storage_error_response("Failed to create branch", e)),
    }
}
