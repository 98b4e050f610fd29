use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AdminService, classes::load_branch_class};
use crate::models::{
    ApiResponse, ErrorCode,
    students::{
        requests::{ClassStudentsRequest, CreateStudentRequest, StudentListParams, StudentListQuery},
        responses::EnrollmentResult,
    },
};
use crate::services::{bad_request, not_found, session_branch, storage_error_response};
use crate::storage::Storage;
use crate::utils::validate::{validate_iso_date, validate_name};

pub async fn list_students(
    service: &AdminService,
    query: StudentListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    let (page, size) = query.pagination.normalized();
    let list_query = StudentListQuery {
        page: Some(page as i64),
        size: Some(size as i64),
        search: query.search,
    };

    match service
        .get_storage(request)
        .list_students_with_pagination(branch_id, list_query)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Students retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response("Failed to retrieve students", e)),
    }
}

pub async fn create_student(
    service: &AdminService,
    student: CreateStudentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) = validate_name(&student.name) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    if let Some(dob) = &student.dob
        && let Err(msg) = validate_iso_date(dob)
    {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    match service
        .get_storage(request)
        .create_student(branch_id, student)
        .await
    {
        Ok(created) => Ok(HttpResponse::Created().json(ApiResponse::success(
            created,
            "Student created successfully",
        ))),
        Err(e) => Ok(storage_error_response("Failed to create student", e)),
    }
}

// 校验班级与学生均属于会话分校，返回去重后的学生 ID
async fn check_class_students(
    storage: &dyn Storage,
    branch_id: i64,
    body: &ClassStudentsRequest,
) -> Result<Vec<i64>, HttpResponse> {
    let mut ids = body.student_ids.clone();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Err(bad_request(
            ErrorCode::BadRequest,
            "student_ids must not be empty",
        ));
    }

    load_branch_class(storage, branch_id, body.class_id).await?;

    match storage.get_students_by_ids(branch_id, &ids).await {
        Ok(found) if found.len() == ids.len() => Ok(ids),
        Ok(_) => Err(not_found(
            ErrorCode::StudentNotFound,
            "One or more students not found",
        )),
        Err(e) => Err(storage_error_response("Failed to retrieve students", e)),
    }
}

pub async fn enroll_students(
    service: &AdminService,
    body: ClassStudentsRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let ids = match check_class_students(storage.as_ref(), branch_id, &body).await {
        Ok(ids) => ids,
        Err(resp) => return Ok(resp),
    };

    match storage.enroll_students(body.class_id, &ids).await {
        Ok(affected) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            EnrollmentResult {
                class_id: body.class_id,
                affected: affected as i64,
            },
            "Students enrolled successfully",
        ))),
        Err(e) => Ok(storage_error_response("Failed to enroll students", e)),
    }
}

/// 升班：原有在读记录置为 inactive，目标班级记录置为 active
pub async fn promote_students(
    service: &AdminService,
    body: ClassStudentsRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let ids = match check_class_students(storage.as_ref(), branch_id, &body).await {
        Ok(ids) => ids,
        Err(resp) => return Ok(resp),
    };

    match storage.promote_students(body.class_id, &ids).await {
        Ok(affected) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            EnrollmentResult {
                class_id: body.class_id,
                affected: affected as i64,
            },
            "Students promoted successfully",
        ))),
        Err(e) => Ok(storage_error_response("Failed to promote students", e)),
    }
}
