use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::numeric::deserialize_optional_i64;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct CreateClassRequest {
    pub name: String,
    pub session_id: i64,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub class_teacher_id: Option<i64>,
}

// 设置或取消班主任（null 表示取消）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct AssignClassTeacherRequest {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub teacher_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassListParams {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub session_id: Option<i64>,
}
