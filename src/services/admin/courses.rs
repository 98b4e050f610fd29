use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{
    AdminService, classes::load_branch_class, sessions::load_branch_session,
    teachers::load_branch_teacher,
};
use crate::models::{
    ApiResponse, ErrorCode,
    courses::requests::{AssignCourseRequest, CreateCourseRequest},
};
use crate::services::{bad_request, not_found, session_branch, storage_error_response};
use crate::utils::validate::validate_name;

pub async fn list_courses(
    service: &AdminService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    match service.get_storage(request).list_courses(branch_id).await {
        Ok(courses) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            courses,
            "Courses retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response("Failed to retrieve courses", e)),
    }
}

pub async fn create_course(
    service: &AdminService,
    course: CreateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) = validate_name(&course.name) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    let storage = service.get_storage(request);
    if let Err(resp) = load_branch_session(storage.as_ref(), branch_id, course.session_id).await {
        return Ok(resp);
    }

    match storage.create_course(branch_id, course).await {
        Ok(created) => Ok(HttpResponse::Created().json(ApiResponse::success(
            created,
            "Course created successfully",
        ))),
        Err(e) => Ok(storage_error_response("Failed to create course", e)),
    }
}

async fn course_in_branch(
    service: &AdminService,
    request: &HttpRequest,
    branch_id: i64,
    course_id: i64,
) -> Result<(), HttpResponse> {
    match service.get_storage(request).get_course_by_id(course_id).await {
        Ok(Some(course)) if course.branch_id == branch_id => Ok(()),
        Ok(_) => Err(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Err(storage_error_response("Failed to retrieve course", e)),
    }
}

pub async fn delete_course(
    service: &AdminService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    if let Err(resp) = course_in_branch(service, request, branch_id, course_id).await {
        return Ok(resp);
    }

    match service.get_storage(request).delete_course(course_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Course deleted successfully",
        ))),
        Ok(false) => Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Ok(storage_error_response("Failed to delete course", e)),
    }
}

/// 将课程分配给若干 (班级, 教师)，重复分配不报错
pub async fn assign_course(
    service: &AdminService,
    course_id: i64,
    body: AssignCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    if body.assignments.is_empty() {
        return Ok(bad_request(
            ErrorCode::BadRequest,
            "assignments must not be empty",
        ));
    }

    if let Err(resp) = course_in_branch(service, request, branch_id, course_id).await {
        return Ok(resp);
    }

    let storage = service.get_storage(request);
    for assignment in &body.assignments {
        if let Err(resp) = load_branch_class(storage.as_ref(), branch_id, assignment.class_id).await
        {
            return Ok(resp);
        }
        if let Err(resp) =
            load_branch_teacher(storage.as_ref(), branch_id, assignment.teacher_id).await
        {
            return Ok(resp);
        }
    }

    match storage.assign_course(course_id, &body.assignments).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            body.assignments,
            "Course assigned successfully",
        ))),
        Err(e) => Ok(storage_error_response("Failed to assign course", e)),
    }
}
