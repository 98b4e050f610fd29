use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AdminService;
use crate::models::{
    ApiResponse, ErrorCode,
    reports::{
        entities::{ReportResponse, StudentReport},
        requests::GenerateReportRequest,
    },
};
use crate::services::{bad_request, not_found, session_branch, storage_error_response};

fn dedup_ids(ids: &[i64]) -> Vec<i64> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// 按学生汇总所选考试的成绩
pub async fn generate_report(
    service: &AdminService,
    body: GenerateReportRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    let student_ids = dedup_ids(&body.student_ids);
    let exam_ids = dedup_ids(&body.exam_ids);
    if student_ids.is_empty() || exam_ids.is_empty() {
        return Ok(bad_request(
            ErrorCode::BadRequest,
            "student_ids and exam_ids must not be empty",
        ));
    }

    let storage = service.get_storage(request);

    let students = match storage.get_students_by_ids(branch_id, &student_ids).await {
        Ok(students) if students.len() == student_ids.len() => students,
        Ok(_) => {
            return Ok(not_found(
                ErrorCode::StudentNotFound,
                "One or more students not found",
            ));
        }
        Err(e) => return Ok(storage_error_response("Failed to retrieve students", e)),
    };

    let exams = match storage.get_exams_by_ids(branch_id, &exam_ids).await {
        Ok(exams) if exams.len() == exam_ids.len() => exams,
        Ok(_) => {
            return Ok(not_found(
                ErrorCode::ExamNotFound,
                "One or more exams not found",
            ));
        }
        Err(e) => return Ok(storage_error_response("Failed to retrieve exams", e)),
    };

    let grades = match storage
        .list_grades_for_students(&student_ids, &exam_ids)
        .await
    {
        Ok(grades) => grades,
        Err(e) => return Ok(storage_error_response("Failed to retrieve grades", e)),
    };

    let items = students
        .into_iter()
        .map(|student| StudentReport::build(student, &exams, &grades))
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ReportResponse { items },
        "Report generated successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_ids() {
        assert_eq!(dedup_ids(&[3, 1, 3, 2, 1]), vec![1, 2, 3]);
        assert!(dedup_ids(&[]).is_empty());
    }
}
