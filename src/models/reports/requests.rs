use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct GenerateReportRequest {
    pub student_ids: Vec<i64>,
    pub exam_ids: Vec<i64>,
}
