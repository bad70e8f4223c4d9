pub mod mail;
pub mod rate_limiter;
pub mod submission_service;
pub mod validation;
