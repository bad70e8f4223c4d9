pub mod rate_limit_sweep;

pub use rate_limit_sweep::RateLimitSweepWorker;
