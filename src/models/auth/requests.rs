use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::numeric::deserialize_optional_i64;

// 登录请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

// 切换分校请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct UpdateBranchRequest {
    #[serde(default, alias = "branchId", deserialize_with = "deserialize_optional_i64")]
    pub branch_id: Option<i64>,
}
