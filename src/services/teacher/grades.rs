use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::TeacherService;
use crate::models::{
    ApiResponse, ErrorCode,
    grades::requests::{BatchUpsertGradesRequest, UpsertGradeRequest},
};
use crate::services::{bad_request, storage_error_response};

/// 插入或更新 (exam, student) 的成绩，后写者覆盖
pub async fn upsert_grade(
    service: &TeacherService,
    grade: UpsertGradeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let upsert = match grade.validate() {
        Ok(upsert) => upsert,
        Err(msg) => return Ok(bad_request(ErrorCode::GradeInvalid, msg)),
    };

    match service.get_storage(request).upsert_grade(upsert).await {
        Ok(grade) => Ok(HttpResponse::Ok().json(ApiResponse::success(grade, "Grade saved"))),
        Err(e) => Ok(storage_error_response("Failed to save grade", e)),
    }
}

/// 批量录入：先全部校验，再单事务写入
pub async fn upsert_grades(
    service: &TeacherService,
    batch: BatchUpsertGradesRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let upserts = match batch.validate() {
        Ok(upserts) => upserts,
        Err(msg) => return Ok(bad_request(ErrorCode::GradeInvalid, msg)),
    };

    match service.get_storage(request).upsert_grades(&upserts).await {
        Ok(grades) => Ok(HttpResponse::Ok().json(ApiResponse::success(grades, "Grades saved"))),
        Err(e) => Ok(storage_error_response("Failed to save grades", e)),
    }
}
