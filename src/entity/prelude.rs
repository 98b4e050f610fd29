//! 预导入模块，方便使用

pub use super::academic_sessions::{
    ActiveModel as AcademicSessionActiveModel, Entity as AcademicSessions,
    Model as AcademicSessionModel,
};
pub use super::attendance_records::{
    ActiveModel as AttendanceRecordActiveModel, Entity as AttendanceRecords,
    Model as AttendanceRecordModel,
};
pub use super::branches::{
    ActiveModel as BranchActiveModel, Entity as Branches, Model as BranchModel,
};
pub use super::class_courses::{
    ActiveModel as ClassCourseActiveModel, Entity as ClassCourses, Model as ClassCourseModel,
};
pub use super::classes::{ActiveModel as ClassActiveModel, Entity as Classes, Model as ClassModel};
pub use super::courses::{
    ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel,
};
pub use super::exams::{ActiveModel as ExamActiveModel, Entity as Exams, Model as ExamModel};
pub use super::grades::{ActiveModel as GradeActiveModel, Entity as Grades, Model as GradeModel};
pub use super::student_classes::{
    ActiveModel as StudentClassActiveModel, Entity as StudentClasses, Model as StudentClassModel,
};
pub use super::students::{
    ActiveModel as StudentActiveModel, Entity as Students, Model as StudentModel,
};
pub use super::teacher_courses::{
    ActiveModel as TeacherCourseActiveModel, Entity as TeacherCourses,
    Model as TeacherCourseModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
