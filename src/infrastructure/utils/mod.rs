pub mod client_id;
pub mod sanitize;
