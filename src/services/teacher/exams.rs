use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::TeacherService;
use crate::models::{ApiResponse, ErrorCode, exams::requests::CreateExamRequest};
use crate::services::{bad_request, storage_error_response};

/// 创建考试；课程或学年不存在时由外键约束报错（500）
pub async fn create_exam(
    service: &TeacherService,
    exam: CreateExamRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let new_exam = match exam.validate() {
        Ok(exam) => exam,
        Err(msg) => return Ok(bad_request(ErrorCode::ExamInvalid, msg)),
    };

    match service.get_storage(request).create_exam(new_exam).await {
        Ok(exam) => {
            tracing::info!("Exam {} created for course {}", exam.id, exam.course_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(exam, "Exam created")))
        }
        Err(e) => Ok(storage_error_response("Failed to create exam", e)),
    }
}
