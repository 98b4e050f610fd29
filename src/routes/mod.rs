pub mod admin;

pub mod auth;

pub mod branches;

pub mod portal;

pub mod super_admin;

pub mod teacher;

pub use admin::configure_admin_routes;
pub use auth::configure_auth_routes;
pub use branches::configure_branch_routes;
pub use portal::configure_portal_routes;
pub use super_admin::configure_super_admin_routes;
pub use teacher::configure_teacher_routes;
