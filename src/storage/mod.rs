use std::sync::Arc;

use crate::models::{
    academic_sessions::{entities::AcademicSession, requests::CreateAcademicSessionRequest},
    attendance::{entities::AttendanceRecord, requests::AttendanceEntry},
    branches::{entities::Branch, requests::CreateBranchRequest},
    classes::{entities::Class, requests::CreateClassRequest},
    courses::{
        entities::{Course, TeacherCourse},
        requests::{CourseAssignment, CreateCourseRequest},
    },
    exams::{entities::Exam, requests::NewExam},
    grades::{entities::Grade, requests::GradeUpsert},
    students::{
        entities::{ClassStudent, Student},
        requests::{CreateStudentRequest, StudentListQuery},
        responses::StudentListResponse,
    },
    users::{
        entities::User,
        requests::{NewUser, UpdateUser, UserListQuery},
        responses::{UserListResponse, UserStatistics},
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（密码已哈希）
    async fn create_user(&self, user: NewUser) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 更新用户信息
    async fn update_user(&self, id: i64, update: UpdateUser) -> Result<Option<User>>;
    // 删除用户
    async fn delete_user(&self, id: i64) -> Result<bool>;
    // 批量删除用户，返回删除行数
    async fn delete_users(&self, ids: &[i64]) -> Result<u64>;
    // 用户总数
    async fn count_users(&self) -> Result<u64>;
    // 按角色统计
    async fn get_user_statistics(&self) -> Result<UserStatistics>;

    /// 分校管理方法
    // 列出分校（按名称排序）
    async fn list_branches(&self) -> Result<Vec<Branch>>;
    async fn get_branch_by_id(&self, id: i64) -> Result<Option<Branch>>;
    async fn create_branch(&self, branch: CreateBranchRequest) -> Result<Branch>;

    /// 学年管理方法
    async fn list_academic_sessions(&self, branch_id: i64) -> Result<Vec<AcademicSession>>;
    async fn get_academic_session_by_id(&self, id: i64) -> Result<Option<AcademicSession>>;
    async fn create_academic_session(
        &self,
        branch_id: i64,
        session: CreateAcademicSessionRequest,
    ) -> Result<AcademicSession>;

    /// 班级管理方法
    async fn list_classes(&self, branch_id: i64, session_id: Option<i64>) -> Result<Vec<Class>>;
    async fn get_class_by_id(&self, id: i64) -> Result<Option<Class>>;
    async fn create_class(&self, branch_id: i64, class: CreateClassRequest) -> Result<Class>;
    // 设置班主任（None 表示取消）
    async fn set_class_teacher(
        &self,
        class_id: i64,
        teacher_id: Option<i64>,
    ) -> Result<Option<Class>>;
    async fn delete_class(&self, id: i64) -> Result<bool>;
    // 班级学生（含在读状态）
    async fn list_class_students(&self, class_id: i64) -> Result<Vec<ClassStudent>>;
    // 班级考试（该班级所分配课程的考试）
    async fn list_class_exams(&self, class_id: i64) -> Result<Vec<Exam>>;

    /// 学生管理方法
    async fn list_students_with_pagination(
        &self,
        branch_id: i64,
        query: StudentListQuery,
    ) -> Result<StudentListResponse>;
    // 按 ID 获取本分校学生
    async fn get_students_by_ids(&self, branch_id: i64, ids: &[i64]) -> Result<Vec<Student>>;
    async fn create_student(&self, branch_id: i64, student: CreateStudentRequest)
    -> Result<Student>;
    // 报名，返回影响的学生数
    async fn enroll_students(&self, class_id: i64, student_ids: &[i64]) -> Result<u64>;
    // 升班：原在读记录置为 inactive，目标班级置为 active（单事务）
    async fn promote_students(&self, class_id: i64, student_ids: &[i64]) -> Result<u64>;

    /// 课程管理方法
    async fn list_courses(&self, branch_id: i64) -> Result<Vec<Course>>;
    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>>;
    async fn create_course(&self, branch_id: i64, course: CreateCourseRequest) -> Result<Course>;
    async fn delete_course(&self, id: i64) -> Result<bool>;
    // 分配课程（幂等）
    async fn assign_course(&self, course_id: i64, assignments: &[CourseAssignment]) -> Result<()>;
    // 教师被分配的课程
    async fn list_teacher_courses(&self, teacher_id: i64) -> Result<Vec<TeacherCourse>>;
    async fn get_teacher_course(
        &self,
        teacher_id: i64,
        course_id: i64,
    ) -> Result<Option<TeacherCourse>>;
    // 选修该课程的在读学生
    async fn list_course_students(&self, course_id: i64) -> Result<Vec<Student>>;

    /// 考试管理方法
    async fn create_exam(&self, exam: NewExam) -> Result<Exam>;
    async fn list_exams_by_course(&self, course_id: i64) -> Result<Vec<Exam>>;
    // 按 ID 获取本分校课程下的考试
    async fn get_exams_by_ids(&self, branch_id: i64, ids: &[i64]) -> Result<Vec<Exam>>;

    /// 成绩管理方法
    // 插入或更新 (exam_id, student_id) 唯一成绩
    async fn upsert_grade(&self, grade: GradeUpsert) -> Result<Grade>;
    // 批量 upsert（单事务，按顺序）
    async fn upsert_grades(&self, grades: &[GradeUpsert]) -> Result<Vec<Grade>>;
    async fn list_grades_by_exams(&self, exam_ids: &[i64]) -> Result<Vec<Grade>>;
    async fn list_grades_for_students(
        &self,
        student_ids: &[i64],
        exam_ids: &[i64],
    ) -> Result<Vec<Grade>>;

    /// 考勤管理方法
    // 班主任或任教该班课程的教师
    async fn teacher_can_access_class(&self, teacher_id: i64, class_id: i64) -> Result<bool>;
    // 按日点名，同一 (student_id, class_id, date) 覆盖写入
    async fn record_attendance(
        &self,
        class_id: i64,
        teacher_id: i64,
        date: &str,
        entries: &[AttendanceEntry],
    ) -> Result<Vec<AttendanceRecord>>;
    async fn list_class_attendance(
        &self,
        class_id: i64,
        date: Option<&str>,
    ) -> Result<Vec<AttendanceRecord>>;

    /// 健康检查
    async fn ping(&self) -> Result<()>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
