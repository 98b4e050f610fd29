pub mod classes;
pub mod courses;
pub mod reports;
pub mod sessions;
pub mod students;
pub mod teachers;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    academic_sessions::requests::CreateAcademicSessionRequest,
    classes::requests::{AssignClassTeacherRequest, ClassListParams, CreateClassRequest},
    courses::requests::{AssignCourseRequest, CreateCourseRequest},
    reports::requests::GenerateReportRequest,
    students::requests::{ClassStudentsRequest, CreateStudentRequest, StudentListParams},
    users::requests::{ChangePasswordRequest, CreateTeacherRequest, UserListParams},
};
use crate::storage::Storage;

/// 分校管理员门户，所有操作限定在会话分校内
pub struct AdminService {
    storage: Option<Arc<dyn Storage>>,
}

impl AdminService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 教师
    pub async fn list_teachers(
        &self,
        query: UserListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        teachers::list_teachers(self, query, request).await
    }

    pub async fn create_teacher(
        &self,
        teacher: CreateTeacherRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        teachers::create_teacher(self, teacher, request).await
    }

    pub async fn delete_teacher(
        &self,
        teacher_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        teachers::delete_teacher(self, teacher_id, request).await
    }

    pub async fn change_teacher_password(
        &self,
        teacher_id: i64,
        body: ChangePasswordRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        teachers::change_password(self, teacher_id, body, request).await
    }

    // 学年
    pub async fn list_sessions(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        sessions::list_sessions(self, request).await
    }

    pub async fn create_session(
        &self,
        session: CreateAcademicSessionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        sessions::create_session(self, session, request).await
    }

    // 班级
    pub async fn list_classes(
        &self,
        query: ClassListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        classes::list_classes(self, query, request).await
    }

    pub async fn create_class(
        &self,
        class: CreateClassRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        classes::create_class(self, class, request).await
    }

    pub async fn assign_class_teacher(
        &self,
        class_id: i64,
        body: AssignClassTeacherRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        classes::assign_class_teacher(self, class_id, body, request).await
    }

    pub async fn delete_class(
        &self,
        class_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        classes::delete_class(self, class_id, request).await
    }

    pub async fn list_class_students(
        &self,
        class_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        classes::list_class_students(self, class_id, request).await
    }

    pub async fn list_class_exams(
        &self,
        class_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        classes::list_class_exams(self, class_id, request).await
    }

    // 学生
    pub async fn list_students(
        &self,
        query: StudentListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        students::list_students(self, query, request).await
    }

    pub async fn create_student(
        &self,
        student: CreateStudentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        students::create_student(self, student, request).await
    }

    pub async fn enroll_students(
        &self,
        body: ClassStudentsRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        students::enroll_students(self, body, request).await
    }

    pub async fn promote_students(
        &self,
        body: ClassStudentsRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        students::promote_students(self, body, request).await
    }

    // 课程
    pub async fn list_courses(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        courses::list_courses(self, request).await
    }

    pub async fn create_course(
        &self,
        course: CreateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        courses::create_course(self, course, request).await
    }

    pub async fn delete_course(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        courses::delete_course(self, course_id, request).await
    }

    pub async fn assign_course(
        &self,
        course_id: i64,
        body: AssignCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        courses::assign_course(self, course_id, body, request).await
    }

    // 成绩报告
    pub async fn generate_report(
        &self,
        body: GenerateReportRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        reports::generate_report(self, body, request).await
    }
}
