//! SMTP adapter for reminder delivery.

mod smtp_mailer;

pub use smtp_mailer::{SmtpConfig, SmtpMailer};
