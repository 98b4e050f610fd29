use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::{
    academic_sessions::requests::CreateAcademicSessionRequest,
    classes::requests::{AssignClassTeacherRequest, ClassListParams, CreateClassRequest},
    courses::requests::{AssignCourseRequest, CreateCourseRequest},
    reports::requests::GenerateReportRequest,
    students::requests::{ClassStudentsRequest, CreateStudentRequest, StudentListParams},
    users::{
        entities::UserRole,
        requests::{ChangePasswordRequest, CreateTeacherRequest, UserListParams},
    },
};
use crate::services::AdminService;
use crate::utils::{SafeClassId, SafeCourseId, SafeTeacherId};

// 懒加载的全局 AdminService 实例
static ADMIN_SERVICE: Lazy<AdminService> = Lazy::new(AdminService::new_lazy);

// 教师
pub async fn list_teachers(
    req: HttpRequest,
    query: web::Query<UserListParams>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.list_teachers(query.into_inner(), &req).await
}

pub async fn create_teacher(
    req: HttpRequest,
    body: web::Json<CreateTeacherRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.create_teacher(body.into_inner(), &req).await
}

pub async fn delete_teacher(
    req: HttpRequest,
    teacher_id: SafeTeacherId,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.delete_teacher(teacher_id.0, &req).await
}

pub async fn change_teacher_password(
    req: HttpRequest,
    teacher_id: SafeTeacherId,
    body: web::Json<ChangePasswordRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .change_teacher_password(teacher_id.0, body.into_inner(), &req)
        .await
}

// 学年
pub async fn list_sessions(req: HttpRequest) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.list_sessions(&req).await
}

pub async fn create_session(
    req: HttpRequest,
    body: web::Json<CreateAcademicSessionRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.create_session(body.into_inner(), &req).await
}

// 班级
pub async fn list_classes(
    req: HttpRequest,
    query: web::Query<ClassListParams>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.list_classes(query.into_inner(), &req).await
}

pub async fn create_class(
    req: HttpRequest,
    body: web::Json<CreateClassRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.create_class(body.into_inner(), &req).await
}

pub async fn assign_class_teacher(
    req: HttpRequest,
    class_id: SafeClassId,
    body: web::Json<AssignClassTeacherRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .assign_class_teacher(class_id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_class(req: HttpRequest, class_id: SafeClassId) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.delete_class(class_id.0, &req).await
}

pub async fn list_class_students(
    req: HttpRequest,
    class_id: SafeClassId,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.list_class_students(class_id.0, &req).await
}

pub async fn list_class_exams(
    req: HttpRequest,
    class_id: SafeClassId,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.list_class_exams(class_id.0, &req).await
}

// 学生
pub async fn list_students(
    req: HttpRequest,
    query: web::Query<StudentListParams>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.list_students(query.into_inner(), &req).await
}

pub async fn create_student(
    req: HttpRequest,
    body: web::Json<CreateStudentRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.create_student(body.into_inner(), &req).await
}

pub async fn enroll_students(
    req: HttpRequest,
    body: web::Json<ClassStudentsRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.enroll_students(body.into_inner(), &req).await
}

pub async fn promote_students(
    req: HttpRequest,
    body: web::Json<ClassStudentsRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.promote_students(body.into_inner(), &req).await
}

// 课程
pub async fn list_courses(req: HttpRequest) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.list_courses(&req).await
}

pub async fn create_course(
    req: HttpRequest,
    body: web::Json<CreateCourseRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.create_course(body.into_inner(), &req).await
}

pub async fn delete_course(req: HttpRequest, course_id: SafeCourseId) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.delete_course(course_id.0, &req).await
}

pub async fn assign_course(
    req: HttpRequest,
    course_id: SafeCourseId,
    body: web::Json<AssignCourseRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .assign_course(course_id.0, body.into_inner(), &req)
        .await
}

// 报告
pub async fn generate_report(
    req: HttpRequest,
    body: web::Json<GenerateReportRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.generate_report(body.into_inner(), &req).await
}

// 配置路由
pub fn configure_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/admin")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("/teachers", web::get().to(list_teachers))
                    .route("/teachers", web::post().to(create_teacher))
                    .route("/teachers/{teacher_id}", web::delete().to(delete_teacher))
                    .route(
                        "/teachers/{teacher_id}/password",
                        web::put().to(change_teacher_password),
                    )
                    .route("/sessions", web::get().to(list_sessions))
                    .route("/sessions", web::post().to(create_session))
                    .route("/classes", web::get().to(list_classes))
                    .route("/classes", web::post().to(create_class))
                    .route("/classes/{class_id}", web::delete().to(delete_class))
                    .route(
                        "/classes/{class_id}/teacher",
                        web::put().to(assign_class_teacher),
                    )
                    .route(
                        "/classes/{class_id}/students",
                        web::get().to(list_class_students),
                    )
                    .route("/classes/{class_id}/exams", web::get().to(list_class_exams))
                    .route("/students", web::get().to(list_students))
                    .route("/students", web::post().to(create_student))
                    .route("/students/enroll", web::post().to(enroll_students))
                    .route("/students/promote", web::post().to(promote_students))
                    .route("/courses", web::get().to(list_courses))
                    .route("/courses", web::post().to(create_course))
                    .route("/courses/{course_id}", web::delete().to(delete_course))
                    .route("/courses/{course_id}/assign", web::post().to(assign_course))
                    .route("/reports", web::post().to(generate_report)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestContext;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    fn with_token(req: test::TestRequest, token: &str) -> test::TestRequest {
        req.insert_header(("Authorization", format!("Bearer {token}")))
    }

    #[actix_web::test]
    async fn test_admin_workflow() {
        let ctx = TestContext::new().await;
        let branch = ctx.branch("Central").await;
        let admin = ctx
            .user("admin@school.test", UserRole::Admin, Some(branch))
            .await;
        let token = ctx.token(&admin, Some(branch));

        let app =
            test::init_service(ctx.app_data(App::new()).configure(configure_admin_routes)).await;

        // 学年
        let req = with_token(test::TestRequest::post().uri("/api/admin/sessions"), &token)
            .set_json(json!({"name": "2025-2026", "start_date": "2025-04-01", "end_date": "2026-03-31"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let session_id = body["data"]["id"].as_i64().unwrap();

        // 教师
        let req = with_token(test::TestRequest::post().uri("/api/admin/teachers"), &token)
            .set_json(json!({"email": "new.teacher@school.test", "password": "Str0ng!Pass", "first_name": "Ravi"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let teacher_id = body["data"]["id"].as_i64().unwrap();
        assert_eq!(body["data"]["role"], "teacher");
        assert_eq!(body["data"]["branch_id"], branch);

        let req = with_token(test::TestRequest::post().uri("/api/admin/teachers"), &token)
            .set_json(json!({"email": "new.teacher@school.test", "password": "Str0ng!Pass"}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CONFLICT
        );

        // 班级与课程
        let req = with_token(test::TestRequest::post().uri("/api/admin/classes"), &token)
            .set_json(json!({"name": "5A", "session_id": session_id, "class_teacher_id": teacher_id}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let class_id = body["data"]["id"].as_i64().unwrap();
        assert_eq!(body["data"]["class_teacher_id"], teacher_id);

        let req = with_token(test::TestRequest::post().uri("/api/admin/courses"), &token)
            .set_json(json!({"name": "Science", "session_id": session_id}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let course_id = body["data"]["id"].as_i64().unwrap();

        for _ in 0..2 {
            let req = with_token(
                test::TestRequest::post().uri(&format!("/api/admin/courses/{course_id}/assign")),
                &token,
            )
            .set_json(json!({"assignments": [{"class_id": class_id, "teacher_id": teacher_id}]}))
            .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }

        // 学生报名
        let req = with_token(test::TestRequest::post().uri("/api/admin/students"), &token)
            .set_json(json!({"name": "Meera", "dob": "2014-06-01"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let student_id = body["data"]["id"].as_i64().unwrap();

        let req = with_token(test::TestRequest::post().uri("/api/admin/students/enroll"), &token)
            .set_json(json!({"class_id": class_id, "student_ids": [student_id, student_id]}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["class_id"], class_id);

        let req = with_token(
            test::TestRequest::get().uri(&format!("/api/admin/classes/{class_id}/students")),
            &token,
        )
        .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let req = with_token(test::TestRequest::get().uri("/api/admin/students?page=1&size=5"), &token)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["pagination"]["total"], 1);

        let req = with_token(test::TestRequest::get().uri("/api/admin/teachers"), &token)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["pagination"]["total"], 1);
    }

    #[actix_web::test]
    async fn test_branch_scoping() {
        let ctx = TestContext::new().await;
        let north = ctx.branch("North").await;
        let south = ctx.branch("South").await;
        let admin = ctx
            .user("admin@school.test", UserRole::Admin, Some(north))
            .await;
        let south_teacher = ctx
            .user("south@school.test", UserRole::Teacher, Some(south))
            .await;
        let teacher = ctx
            .user("teacher@school.test", UserRole::Teacher, Some(north))
            .await;

        let app =
            test::init_service(ctx.app_data(App::new()).configure(configure_admin_routes)).await;

        // 会话没有分校
        let unassigned = ctx
            .user("unassigned@school.test", UserRole::Admin, None)
            .await;
        let req = with_token(
            test::TestRequest::get().uri("/api/admin/classes"),
            &ctx.token(&unassigned, Some(north)),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 3002);

        let token = ctx.token(&admin, Some(north));

        let req = with_token(
            test::TestRequest::delete().uri(&format!("/api/admin/teachers/{}", south_teacher.id)),
            &token,
        )
        .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );

        let req = with_token(
            test::TestRequest::put().uri(&format!("/api/admin/teachers/{}/password", teacher.id)),
            &token,
        )
        .set_json(json!({"new_password": "An0ther!Pass"}))
        .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = with_token(
            test::TestRequest::delete().uri(&format!("/api/admin/teachers/{}", teacher.id)),
            &token,
        )
        .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        // 教师不能访问管理接口
        let req = with_token(
            test::TestRequest::get().uri("/api/admin/classes"),
            &ctx.token(&south_teacher, Some(south)),
        )
        .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN
        );
    }

    #[actix_web::test]
    async fn test_report() {
        let ctx = TestContext::new().await;
        let branch = ctx.branch("Central").await;
        let session_id = ctx.session(branch, "2025").await;
        let admin = ctx
            .user("admin@school.test", UserRole::Admin, Some(branch))
            .await;
        let token = ctx.token(&admin, Some(branch));

        let course = ctx
            .storage
            .create_course(
                branch,
                CreateCourseRequest {
                    name: "English".to_string(),
                    session_id,
                },
            )
            .await
            .unwrap();
        let student = ctx
            .storage
            .create_student(
                branch,
                CreateStudentRequest {
                    name: "Kiran".to_string(),
                    dob: None,
                    gender: None,
                },
            )
            .await
            .unwrap();
        let mut exam_ids = Vec::new();
        for (name, max) in [("Unit 1", 50), ("Unit 2", 50)] {
            let exam = ctx
                .storage
                .create_exam(crate::models::exams::requests::NewExam {
                    course_id: course.id,
                    session_id,
                    name: name.to_string(),
                    max_marks: max,
                    exam_date: None,
                })
                .await
                .unwrap();
            exam_ids.push(exam.id);
        }
        ctx.storage
            .upsert_grade(crate::models::grades::requests::GradeUpsert {
                exam_id: exam_ids[0],
                student_id: student.id,
                marks_obtained: 40,
            })
            .await
            .unwrap();

        let app =
            test::init_service(ctx.app_data(App::new()).configure(configure_admin_routes)).await;

        let req = with_token(test::TestRequest::post().uri("/api/admin/reports"), &token)
            .set_json(json!({"student_ids": [student.id], "exam_ids": exam_ids}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        let report = &body["data"]["items"][0];
        assert_eq!(report["total_obtained"], 40);
        assert_eq!(report["total_max"], 100);
        assert_eq!(report["percentage"], 40.0);
        assert!(report["rows"][1]["marks_obtained"].is_null());

        let req = with_token(test::TestRequest::post().uri("/api/admin/reports"), &token)
            .set_json(json!({"student_ids": [student.id, 9999], "exam_ids": exam_ids}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[actix_web::test]
    async fn test_demoted_super_admin_stays_in_own_branch() {
        let ctx = TestContext::new().await;
        let north = ctx.branch("North").await;
        let south = ctx.branch("South").await;
        let user = ctx
            .user("former.boss@school.test", UserRole::SuperAdmin, Some(north))
            .await;
        // 切换分校后签发的令牌
        let token = ctx.token(&user, Some(south));

        ctx.storage
            .update_user(
                user.id,
                crate::models::users::requests::UpdateUser {
                    password_hash: None,
                    role: Some(UserRole::Admin),
                    branch_id: None,
                },
            )
            .await
            .unwrap();

        let app =
            test::init_service(ctx.app_data(App::new()).configure(configure_admin_routes)).await;

        let req = with_token(test::TestRequest::post().uri("/api/admin/students"), &token)
            .set_json(json!({"name": "Kiran"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["branch_id"], north);
    }
}
