use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/academic_session.ts")]
pub struct CreateAcademicSessionRequest {
    pub name: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}
