pub mod attendance;
pub mod courses;
pub mod exams;
pub mod grades;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::attendance::requests::{AttendanceQuery, RecordAttendanceRequest};
use crate::models::exams::requests::CreateExamRequest;
use crate::models::grades::requests::{BatchUpsertGradesRequest, UpsertGradeRequest};
use crate::storage::Storage;

/// 教师门户：课程、成绩册、考试、成绩录入与考勤
pub struct TeacherService {
    storage: Option<Arc<dyn Storage>>,
}

impl TeacherService {
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

    // 我的课程
    pub async fn list_courses(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        courses::list_courses(self, request).await
    }

    // 课程详情
    pub async fn get_course(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        courses::get_course(self, course_id, request).await
    }

    // 成绩册
    pub async fn get_gradebook(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        courses::get_gradebook(self, course_id, request).await
    }

    // 创建考试
    pub async fn create_exam(
        &self,
        exam: CreateExamRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        exams::create_exam(self, exam, request).await
    }

    // 录入成绩
    pub async fn upsert_grade(
        &self,
        grade: UpsertGradeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grades::upsert_grade(self, grade, request).await
    }

    // 批量录入成绩
    pub async fn upsert_grades(
        &self,
        batch: BatchUpsertGradesRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grades::upsert_grades(self, batch, request).await
    }

    // 点名
    pub async fn record_attendance(
        &self,
        class_id: i64,
        attendance: RecordAttendanceRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        attendance::record_attendance(self, class_id, attendance, request).await
    }

    // 班级考勤记录
    pub async fn list_attendance(
        &self,
        class_id: i64,
        query: AttendanceQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        attendance::list_attendance(self, class_id, query, request).await
    }
}
