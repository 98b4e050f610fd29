use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AdminService;
use crate::models::{
    ApiResponse, ErrorCode,
    academic_sessions::{entities::AcademicSession, requests::CreateAcademicSessionRequest},
};
use crate::services::{bad_request, not_found, session_branch, storage_error_response};
use crate::storage::Storage;
use crate::utils::validate::{validate_date_range, validate_name};

// 会话分校内的学年，否则 404
pub(super) async fn load_branch_session(
    storage: &dyn Storage,
    branch_id: i64,
    session_id: i64,
) -> Result<AcademicSession, HttpResponse> {
    match storage.get_academic_session_by_id(session_id).await {
        Ok(Some(session)) if session.branch_id == branch_id => Ok(session),
        Ok(_) => Err(not_found(
            ErrorCode::AcademicSessionNotFound,
            "Academic session not found",
        )),
        Err(e) => Err(storage_error_response(
            "Failed to retrieve academic session",
            e,
        )),
    }
}

pub async fn list_sessions(
    service: &AdminService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    match service
        .get_storage(request)
        .list_academic_sessions(branch_id)
        .await
    {
        Ok(sessions) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            sessions,
            "Academic sessions retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(
            "Failed to retrieve academic sessions",
            e,
        )),
    }
}

pub async fn create_session(
    service: &AdminService,
    session: CreateAcademicSessionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) = validate_name(&session.name) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    if let Err(msg) =
        validate_date_range(session.start_date.as_deref(), session.end_date.as_deref())
    {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    match service
        .get_storage(request)
        .create_academic_session(branch_id, session)
        .await
    {
        Ok(created) => Ok(HttpResponse::Created().json(ApiResponse::success(
            created,
            "Academic session created successfully",
        ))),
        Err(e) => Ok(storage_error_response(
            "Failed to create academic session",
            e,
        )),
    }
}
