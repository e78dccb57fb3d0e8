use crate::{
    entities::{contact::ContactSubmission, email::RenderedEmail},
    utils::sanitize::sanitize_html,
};

use super::provider::EmailBackend;

/// Renders the notification sent to the site owner. Every submitted field
/// is escaped in the HTML view; the text view carries the raw values.
pub fn render_contact_email(
    submission: &ContactSubmission,
    site_name: &str,
    backend: EmailBackend,
) -> RenderedEmail {
    RenderedEmail {
        subject: backend.subject_line(&submission.name),
        html: render_html(submission, site_name),
        text: render_text(submission, site_name),
        reply_to: submission.email.clone(),
    }
}

fn render_html(submission: &ContactSubmission, site_name: &str) -> String {
    let name = sanitize_html(&submission.name);
    let email = sanitize_html(&submission.email);
    let message = sanitize_html(&submission.message).replace('\n', "<br>");
    let site = sanitize_html(site_name);

    let phone = if submission.phone.is_empty() {
        String::new()
    } else {
        format!(
            "<p><strong>Phone:</strong> {}</p>",
            sanitize_html(&submission.phone)
        )
    };

    format!(
        r##"<html>
  <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <h2 style="color: #007acc;">New Contact Form Submission</h2>
    <div style="background: #f5f5f5; padding: 20px; border-radius: 5px;">
      <p><strong>Name:</strong> {name}</p>
      <p><strong>Email:</strong> {email}</p>
      {phone}
      <p><strong>Message:</strong></p>
      <div style="background: white; padding: 15px; border-left: 4px solid #007acc; margin-top: 10px;">
        {message}
      </div>
    </div>
    <p style="color: #666; font-size: 12px; margin-top: 20px;">
      This email was sent from the contact form on {site}
    </p>
    <hr style="border: none; border-top: 1px solid #ddd; margin: 20px 0;">
    <p style="color: #666; font-size: 12px;">
      Reply directly to this email to respond to {email}
    </p>
  </body>
</html>
"##
    )
}

fn render_text(submission: &ContactSubmission, site_name: &str) -> String {
    let phone = if submission.phone.is_empty() {
        String::new()
    } else {
        format!("Phone: {}\n", submission.phone)
    };

    format!(
        "New Contact Form Submission\n\nName: {}\nEmail: {}\n{}Message:\n{}\n\n---\nSent from {}",
        submission.name, submission.email, phone, submission.message, site_name
    )
}
