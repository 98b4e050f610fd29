use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AdminService, sessions::load_branch_session, teachers::load_branch_teacher};
use crate::models::{
    ApiResponse, ErrorCode,
    classes::{
        entities::Class,
        requests::{AssignClassTeacherRequest, ClassListParams, CreateClassRequest},
    },
};
use crate::services::{bad_request, not_found, session_branch, storage_error_response};
use crate::storage::Storage;
use crate::utils::validate::validate_name;

// 会话分校内的班级，否则 404
pub(super) async fn load_branch_class(
    storage: &dyn Storage,
    branch_id: i64,
    class_id: i64,
) -> Result<Class, HttpResponse> {
    match storage.get_class_by_id(class_id).await {
        Ok(Some(class)) if class.branch_id == branch_id => Ok(class),
        Ok(_) => Err(not_found(ErrorCode::ClassNotFound, "Class not found")),
        Err(e) => Err(storage_error_response("Failed to retrieve class", e)),
    }
}

pub async fn list_classes(
    service: &AdminService,
    query: ClassListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    match service
        .get_storage(request)
        .list_classes(branch_id, query.session_id)
        .await
    {
        Ok(classes) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            classes,
            "Classes retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response("Failed to retrieve classes", e)),
    }
}

pub async fn create_class(
    service: &AdminService,
    class: CreateClassRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) = validate_name(&class.name) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    let storage = service.get_storage(request);
    if let Err(resp) = load_branch_session(storage.as_ref(), branch_id, class.session_id).await {
        return Ok(resp);
    }
    if let Some(teacher_id) = class.class_teacher_id
        && let Err(resp) = load_branch_teacher(storage.as_ref(), branch_id, teacher_id).await
    {
        return Ok(resp);
    }

    match storage.create_class(branch_id, class).await {
        Ok(created) => Ok(HttpResponse::Created().json(ApiResponse::success(
            created,
            "Class created successfully",
        ))),
        Err(e) => Ok(storage_error_response("Failed to create class", e)),
    }
}

/// 设置或取消班主任
pub async fn assign_class_teacher(
    service: &AdminService,
    class_id: i64,
    body: AssignClassTeacherRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = load_branch_class(storage.as_ref(), branch_id, class_id).await {
        return Ok(resp);
    }
    if let Some(teacher_id) = body.teacher_id
        && let Err(resp) = load_branch_teacher(storage.as_ref(), branch_id, teacher_id).await
    {
        return Ok(resp);
    }

    match storage.set_class_teacher(class_id, body.teacher_id).await {
        Ok(Some(class)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            class,
            "Class teacher updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::ClassNotFound, "Class not found")),
        Err(e) => Ok(storage_error_response("Failed to update class teacher", e)),
    }
}

pub async fn delete_class(
    service: &AdminService,
    class_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = load_branch_class(storage.as_ref(), branch_id, class_id).await {
        return Ok(resp);
    }

    match storage.delete_class(class_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Class deleted successfully",
        ))),
        Ok(false) => Ok(not_found(ErrorCode::ClassNotFound, "Class not found")),
        Err(e) => Ok(storage_error_response("Failed to delete class", e)),
    }
}

pub async fn list_class_students(
    service: &AdminService,
    class_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = load_branch_class(storage.as_ref(), branch_id, class_id).await {
        return Ok(resp);
    }

    match storage.list_class_students(class_id).await {
        Ok(students) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            students,
            "Class students retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response("Failed to retrieve class students", e)),
    }
}

pub async fn list_class_exams(
    service: &AdminService,
    class_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = load_branch_class(storage.as_ref(), branch_id, class_id).await {
        return Ok(resp);
    }

    match storage.list_class_exams(class_id).await {
        Ok(exams) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            exams,
            "Class exams retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response("Failed to retrieve class exams", e)),
    }
}
