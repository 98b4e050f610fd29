use std::collections::HashSet;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::TeacherService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    attendance::requests::{AttendanceQuery, RecordAttendanceRequest},
    students::entities::EnrollmentStatus,
};
use crate::services::{bad_request, forbidden, storage_error_response, unauthorized};
use crate::utils::validate::validate_iso_date;

// 班主任或任教该班课程的教师，否则 403
async fn ensure_class_access(
    service: &TeacherService,
    class_id: i64,
    request: &HttpRequest,
) -> Result<i64, HttpResponse> {
    let Some(teacher_id) = RequireJWT::extract_user_id(request) else {
        return Err(unauthorized());
    };

    match service
        .get_storage(request)
        .teacher_can_access_class(teacher_id, class_id)
        .await
    {
        Ok(true) => Ok(teacher_id),
        Ok(false) => Err(forbidden(
            ErrorCode::ClassPermissionDenied,
            "You do not teach this class",
        )),
        Err(e) => Err(storage_error_response("Failed to check class access", e)),
    }
}

/// 按日点名；学生必须是本班在读学生
pub async fn record_attendance(
    service: &TeacherService,
    class_id: i64,
    attendance: RecordAttendanceRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = attendance.validate() {
        return Ok(bad_request(ErrorCode::AttendanceInvalid, msg));
    }

    let teacher_id = match ensure_class_access(service, class_id, request).await {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let active: HashSet<i64> = match storage.list_class_students(class_id).await {
        Ok(roster) => roster
            .into_iter()
            .filter(|c| c.status == EnrollmentStatus::Active)
            .map(|c| c.student.id)
            .collect(),
        Err(e) => return Ok(storage_error_response("Failed to retrieve students", e)),
    };

    if let Some(entry) = attendance
        .records
        .iter()
        .find(|e| !active.contains(&e.student_id))
    {
        return Ok(bad_request(
            ErrorCode::AttendanceInvalid,
            format!("Student {} is not enrolled in this class", entry.student_id),
        ));
    }

    match storage
        .record_attendance(class_id, teacher_id, &attendance.date, &attendance.records)
        .await
    {
        Ok(records) => {
            tracing::info!(
                "Attendance for class {} on {} recorded by teacher {} ({} students)",
                class_id,
                attendance.date,
                teacher_id,
                records.len()
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(records, "Attendance saved")))
        }
        Err(e) => Ok(storage_error_response("Failed to save attendance", e)),
    }
}

pub async fn list_attendance(
    service: &TeacherService,
    class_id: i64,
    query: AttendanceQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Some(date) = &query.date
        && let Err(msg) = validate_iso_date(date)
    {
        return Ok(bad_request(ErrorCode::AttendanceInvalid, msg));
    }

    if let Err(resp) = ensure_class_access(service, class_id, request).await {
        return Ok(resp);
    }

    match service
        .get_storage(request)
        .list_class_attendance(class_id, query.date.as_deref())
        .await
    {
        Ok(records) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            records,
            "Attendance retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response("Failed to retrieve attendance", e)),
    }
}
