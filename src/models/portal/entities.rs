use serde::Serialize;
use ts_rs::TS;

use crate::models::users::entities::UserRole;

// 门户页面返回的简要面板
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/portal.ts")]
pub struct DashboardResponse {
    pub portal: String,
    pub path: String,
    pub user_id: i64,
    pub role: UserRole,
    pub branch_id: Option<i64>,
}

// 数据库健康检查
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/portal.ts")]
pub struct DatabaseHealth {
    pub status: String,
    pub connected: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

// 服务存活信息
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/portal.ts")]
pub struct ServiceHealth {
    pub status: String,
    pub uptime_seconds: i64,
    pub version: String,
}
