pub mod academic_sessions;
pub mod attendance;
pub mod auth;
pub mod branches;
pub mod classes;
pub mod common;
pub mod courses;
pub mod exams;
pub mod grades;
pub mod portal;
pub mod reports;
pub mod students;
pub mod users;

pub use common::{ApiResponse, PaginationInfo, PaginationQuery};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 响应信封中的粗粒度错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用 1xxx
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    AuthFailed = 1010,

    // 用户 2xxx
    UserNotFound = 2001,
    UserEmailInvalid = 2002,
    UserPasswordInvalid = 2003,
    UserEmailAlreadyExists = 2004,
    UserNameInvalid = 2005,
    CanNotDeleteCurrentUser = 2006,

    // 分校与学年 3xxx
    BranchNotFound = 3001,
    BranchRequired = 3002,
    AcademicSessionNotFound = 3101,

    // 班级、学生、课程 4xxx
    ClassNotFound = 4001,
    ClassPermissionDenied = 4002,
    StudentNotFound = 4101,
    CourseNotFound = 4201,
    CoursePermissionDenied = 4202,

    // 考试与成绩 5xxx
    ExamNotFound = 5001,
    ExamInvalid = 5002,
    GradeInvalid = 5101,
    AttendanceInvalid = 5201,

    InternalServerError = 9000,
}
