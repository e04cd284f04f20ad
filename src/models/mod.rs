pub mod check_result;
pub mod monitor;
pub mod user;

pub use check_result::CheckResult;
pub use monitor::{DueMonitor, Monitor, MonitorStatus};
pub use user::User;
