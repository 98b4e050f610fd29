pub mod entities;
pub mod requests;
pub mod responses;

pub use entities::{SessionUser, effective_branch_id};
pub use requests::{LoginRequest, UpdateBranchRequest};
pub use responses::{LoginResponse, RefreshTokenResponse, SessionInfoResponse, UpdateBranchResponse};
