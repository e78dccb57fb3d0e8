use actix_web::web;

use crate::handlers::{contact, csrf};

/// Both contact resources accept every method so the handler can answer
/// non-POST requests with its own 405 body.
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/sendEmail")
            .route(web::route().to(contact::send_email))
    )
    .service(
        web::resource("/sendEmailAWS")
            .route(web::route().to(contact::send_email_aws))
    )
    .service(
        web::resource("/csrf-token")
            .route(web::get().to(csrf::issue_token))
    );
}
