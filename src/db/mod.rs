pub mod check_repository;
pub mod monitor_repository;
pub mod user_repository;

pub use check_repository::CheckRepository;
pub use monitor_repository::MonitorRepository;
pub use user_repository::UserRepository;
