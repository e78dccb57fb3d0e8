pub mod contact;
pub mod csrf;
pub mod email;
pub mod rate_limit;
