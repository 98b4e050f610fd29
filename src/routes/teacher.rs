use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::attendance::requests::{AttendanceQuery, RecordAttendanceRequest};
use crate::models::exams::requests::CreateExamRequest;
use crate::models::grades::requests::{BatchUpsertGradesRequest, UpsertGradeRequest};
use crate::models::users::entities::UserRole;
use crate::services::TeacherService;
use crate::utils::{SafeClassId, SafeCourseId};

// 懒加载的全局 TeacherService 实例
static TEACHER_SERVICE: Lazy<TeacherService> = Lazy::new(TeacherService::new_lazy);

pub async fn list_courses(req: HttpRequest) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.list_courses(&req).await
}

pub async fn get_course(req: HttpRequest, course_id: SafeCourseId) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.get_course(course_id.0, &req).await
}

pub async fn get_gradebook(
    req: HttpRequest,
    course_id: SafeCourseId,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.get_gradebook(course_id.0, &req).await
}

pub async fn create_exam(
    req: HttpRequest,
    exam: web::Json<CreateExamRequest>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.create_exam(exam.into_inner(), &req).await
}

pub async fn upsert_grade(
    req: HttpRequest,
    grade: web::Json<UpsertGradeRequest>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.upsert_grade(grade.into_inner(), &req).await
}

pub async fn upsert_grades(
    req: HttpRequest,
    batch: web::Json<BatchUpsertGradesRequest>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.upsert_grades(batch.into_inner(), &req).await
}

pub async fn record_attendance(
    req: HttpRequest,
    class_id: SafeClassId,
    body: web::Json<RecordAttendanceRequest>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE
        .record_attendance(class_id.0, body.into_inner(), &req)
        .await
}

pub async fn list_attendance(
    req: HttpRequest,
    class_id: SafeClassId,
    query: web::Query<AttendanceQuery>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE
        .list_attendance(class_id.0, query.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_teacher_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/teacher")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new(&UserRole::Teacher))
                    .route("/courses", web::get().to(list_courses))
                    .route("/courses/{course_id}", web::get().to(get_course))
                    .route(
                        "/courses/{course_id}/gradebook",
                        web::get().to(get_gradebook),
                    )
                    .route("/exams", web::post().to(create_exam))
                    .route("/grades", web::post().to(upsert_grade))
                    .route("/grades/batch", web::post().to(upsert_grades))
                    .route(
                        "/classes/{class_id}/attendance",
                        web::post().to(record_attendance),
                    )
                    .route(
                        "/classes/{class_id}/attendance",
                        web::get().to(list_attendance),
                    ),
            ),
    );
}
