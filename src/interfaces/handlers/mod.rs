pub mod contact;
pub mod csrf;
pub mod home;
pub mod system;
