use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::TeacherService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, courses::responses::GradebookResponse};
use crate::services::{forbidden, not_found, storage_error_response, unauthorized};

pub async fn list_courses(
    service: &TeacherService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(teacher_id) = RequireJWT::extract_user_id(request) else {
        return Ok(unauthorized());
    };

    match service
        .get_storage(request)
        .list_teacher_courses(teacher_id)
        .await
    {
        Ok(courses) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            courses,
            "Courses retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response("Failed to retrieve courses", e)),
    }
}

pub async fn get_course(
    service: &TeacherService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(teacher_id) = RequireJWT::extract_user_id(request) else {
        return Ok(unauthorized());
    };

    match service
        .get_storage(request)
        .get_teacher_course(teacher_id, course_id)
        .await
    {
        Ok(Some(course)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            course,
            "Course retrieved successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Ok(storage_error_response("Failed to retrieve course", e)),
    }
}

/// 成绩册：仅限被分配该课程的教师
pub async fn get_gradebook(
    service: &TeacherService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(teacher_id) = RequireJWT::extract_user_id(request) else {
        return Ok(unauthorized());
    };
    let storage = service.get_storage(request);

    let course = match storage.get_teacher_course(teacher_id, course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => {
            return Ok(forbidden(
                ErrorCode::CoursePermissionDenied,
                "You are not assigned to this course",
            ));
        }
        Err(e) => return Ok(storage_error_response("Failed to retrieve course", e)),
    };

    let students = match storage.list_course_students(course_id).await {
        Ok(students) => students,
        Err(e) => return Ok(storage_error_response("Failed to retrieve students", e)),
    };

    let exams = match storage.list_exams_by_course(course_id).await {
        Ok(exams) => exams,
        Err(e) => return Ok(storage_error_response("Failed to retrieve exams", e)),
    };

    let exam_ids: Vec<i64> = exams.iter().map(|e| e.id).collect();
    let grades = match storage.list_grades_by_exams(&exam_ids).await {
        Ok(grades) => grades,
        Err(e) => return Ok(storage_error_response("Failed to retrieve grades", e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        GradebookResponse {
            course,
            students,
            exams,
            grades,
        },
        "Gradebook retrieved successfully",
    )))
}
