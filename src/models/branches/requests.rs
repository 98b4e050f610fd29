use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/branch.ts")]
pub struct CreateBranchRequest {
    pub name: String,
    pub address: Option<String>,
}
