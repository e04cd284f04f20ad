pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
