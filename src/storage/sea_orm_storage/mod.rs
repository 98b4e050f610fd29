//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod academic_sessions;
mod attendance;
mod branches;
mod classes;
mod courses;
mod exams;
mod grades;
mod students;
mod users;

use crate::config::AppConfig;
use crate::errors::{PortalError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        let storage = Self::from_connection(db).await?;
        info!("SeaORM 存储初始化完成，数据库: {}", db_url);
        Ok(storage)
    }

    /// 基于已有连接创建存储并运行迁移
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| PortalError::database_operation(format!("数据库迁移失败: {e}")))?;
        Ok(Self { db })
    }

    /// 内存 SQLite（单连接，测试用）
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(opt)
            .await
            .map_err(|e| PortalError::database_connection(format!("无法连接到数据库: {e}")))?;
        Self::from_connection(db).await
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| PortalError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| PortalError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| PortalError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(PortalError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: NewUser) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUser) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn delete_users(&self, ids: &[i64]) -> Result<u64> {
        self.delete_users_impl(ids).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn get_user_statistics(&self) -> Result<UserStatistics> {
        self.get_user_statistics_impl().await
    }

    // 分校模块
    async fn list_branches(&self) -> Result<Vec<Branch>> {
        self.list_branches_impl().await
    }

    async fn get_branch_by_id(&self, id: i64) -> Result<Option<Branch>> {
        self.get_branch_by_id_impl(id).await
    }

    async fn create_branch(&self, branch: CreateBranchRequest) -> Result<Branch> {
        self.create_branch_impl(branch).await
    }

    // 学年模块
    async fn list_academic_sessions(&self, branch_id: i64) -> Result<Vec<AcademicSession>> {
        self.list_academic_sessions_impl(branch_id).await
    }

    async fn get_academic_session_by_id(&self, id: i64) -> Result<Option<AcademicSession>> {
        self.get_academic_session_by_id_impl(id).await
    }

    async fn create_academic_session(
        &self,
        branch_id: i64,
        session: CreateAcademicSessionRequest,
    ) -> Result<AcademicSession> {
        self.create_academic_session_impl(branch_id, session).await
    }

    // 班级模块
    async fn list_classes(&self, branch_id: i64, session_id: Option<i64>) -> Result<Vec<Class>> {
        self.list_classes_impl(branch_id, session_id).await
    }

    async fn get_class_by_id(&self, id: i64) -> Result<Option<Class>> {
        self.get_class_by_id_impl(id).await
    }

    async fn create_class(&self, branch_id: i64, class: CreateClassRequest) -> Result<Class> {
        self.create_class_impl(branch_id, class).await
    }

    async fn set_class_teacher(
        &self,
        class_id: i64,
        teacher_id: Option<i64>,
    ) -> Result<Option<Class>> {
        self.set_class_teacher_impl(class_id, teacher_id).await
    }

    async fn delete_class(&self, id: i64) -> Result<bool> {
        self.delete_class_impl(id).await
    }

    async fn list_class_students(&self, class_id: i64) -> Result<Vec<ClassStudent>> {
        self.list_class_students_impl(class_id).await
    }

    async fn list_class_exams(&self, class_id: i64) -> Result<Vec<Exam>> {
        self.list_class_exams_impl(class_id).await
    }

    // 学生模块
    async fn list_students_with_pagination(
        &self,
        branch_id: i64,
        query: StudentListQuery,
    ) -> Result<StudentListResponse> {
        self.list_students_with_pagination_impl(branch_id, query)
            .await
    }

    async fn get_students_by_ids(&self, branch_id: i64, ids: &[i64]) -> Result<Vec<Student>> {
        self.get_students_by_ids_impl(branch_id, ids).await
    }

    async fn create_student(
        &self,
        branch_id: i64,
        student: CreateStudentRequest,
    ) -> Result<Student> {
        self.create_student_impl(branch_id, student).await
    }

    async fn enroll_students(&self, class_id: i64, student_ids: &[i64]) -> Result<u64> {
        self.enroll_students_impl(class_id, student_ids).await
    }

    async fn promote_students(&self, class_id: i64, student_ids: &[i64]) -> Result<u64> {
        self.promote_students_impl(class_id, student_ids).await
    }

    // 课程模块
    async fn list_courses(&self, branch_id: i64) -> Result<Vec<Course>> {
        self.list_courses_impl(branch_id).await
    }

    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn create_course(&self, branch_id: i64, course: CreateCourseRequest) -> Result<Course> {
        self.create_course_impl(branch_id, course).await
    }

    async fn delete_course(&self, id: i64) -> Result<bool> {
        self.delete_course_impl(id).await
    }

    async fn assign_course(&self, course_id: i64, assignments: &[CourseAssignment]) -> Result<()> {
        self.assign_course_impl(course_id, assignments).await
    }

    async fn list_teacher_courses(&self, teacher_id: i64) -> Result<Vec<TeacherCourse>> {
        self.list_teacher_courses_impl(teacher_id).await
    }

    async fn get_teacher_course(
        &self,
        teacher_id: i64,
        course_id: i64,
    ) -> Result<Option<TeacherCourse>> {
        self.get_teacher_course_impl(teacher_id, course_id).await
    }

    async fn list_course_students(&self, course_id: i64) -> Result<Vec<Student>> {
        self.list_course_students_impl(course_id).await
    }

    // 考试模块
    async fn create_exam(&self, exam: NewExam) -> Result<Exam> {
        self.create_exam_impl(exam).await
    }

    async fn list_exams_by_course(&self, course_id: i64) -> Result<Vec<Exam>> {
        self.list_exams_by_course_impl(course_id).await
    }

    async fn get_exams_by_ids(&self, branch_id: i64, ids: &[i64]) -> Result<Vec<Exam>> {
        self.get_exams_by_ids_impl(branch_id, ids).await
    }

    // 成绩模块
    async fn upsert_grade(&self, grade: GradeUpsert) -> Result<Grade> {
        self.upsert_grade_impl(grade).await
    }

    async fn upsert_grades(&self, grades: &[GradeUpsert]) -> Result<Vec<Grade>> {
        self.upsert_grades_impl(grades).await
    }

    async fn list_grades_by_exams(&self, exam_ids: &[i64]) -> Result<Vec<Grade>> {
        self.list_grades_by_exams_impl(exam_ids).await
    }

    async fn list_grades_for_students(
        &self,
        student_ids: &[i64],
        exam_ids: &[i64],
    ) -> Result<Vec<Grade>> {
        self.list_grades_for_students_impl(student_ids, exam_ids)
            .await
    }

    // 考勤模块
    async fn teacher_can_access_class(&self, teacher_id: i64, class_id: i64) -> Result<bool> {
        self.teacher_can_access_class_impl(teacher_id, class_id)
            .await
    }

    async fn record_attendance(
        &self,
        class_id: i64,
        teacher_id: i64,
        date: &str,
        entries: &[AttendanceEntry],
    ) -> Result<Vec<AttendanceRecord>> {
        self.record_attendance_impl(class_id, teacher_id, date, entries)
            .await
    }

    async fn list_class_attendance(
        &self,
        class_id: i64,
        date: Option<&str>,
    ) -> Result<Vec<AttendanceRecord>> {
        self.list_class_attendance_impl(class_id, date).await
    }

    async fn ping(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| PortalError::database_connection(format!("数据库不可用: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("school_portal.db").unwrap(),
            "sqlite://school_portal.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@localhost/db").unwrap(),
            "postgres://u:p@localhost/db"
        );
        assert!(SeaOrmStorage::build_database_url("ftp://nope").is_err());
    }

    #[actix_web::test]
    async fn test_in_memory_ping() {
        let storage = SeaOrmStorage::in_memory().await.unwrap();
        assert!(storage.ping().await.is_ok());
        assert_eq!(storage.count_users().await.unwrap(), 0);
    }
}
