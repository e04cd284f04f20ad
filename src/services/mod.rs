pub mod mailer;
pub mod probe;
pub mod scheduler;
pub mod transition;
