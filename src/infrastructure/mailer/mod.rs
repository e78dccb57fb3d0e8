pub mod provider;
pub mod resend;
pub mod ses;
pub mod sigv4;
pub mod templates;
