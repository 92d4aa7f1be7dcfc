//! Notifiche via mail dopo la creazione di un'auto

use std::fmt;
use tracing::{debug, info, instrument};

/// Mail da inviare; mittente e destinatario li conosce il `MailSender`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub subject: String,
    pub body: String,
}

impl Mail {
    /// Notifica per una nuova auto
    pub fn new_auto(id: i32, modell: Option<&str>) -> Self {
        Self {
            subject: format!("Neues Auto {}", id),
            body: format!(
                "Das Auto mit dem Modell <strong>{}</strong> ist angelegt",
                modell.unwrap_or("N/A")
            ),
        }
    }
}

#[derive(Debug)]
pub struct MailError(pub String);

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mail not sent: {}", self.0)
    }
}

impl std::error::Error for MailError {}

/// Canale di invio delle notifiche, condiviso tramite `AppState`
pub trait MailSender: Send + Sync {
    fn send(&self, mail: &Mail) -> Result<(), MailError>;
}

/// Scrive la mail nel log strutturato
#[derive(Debug, Clone)]
pub struct LogMailer {
    enabled: bool,
    from: String,
    to: String,
}

impl LogMailer {
    pub fn new(enabled: bool, from: String, to: String) -> Self {
        Self { enabled, from, to }
    }
}

impl Default for LogMailer {
    fn default() -> Self {
        Self::new(
            true,
            "auto-server@acme.com".to_string(),
            "admin@acme.com".to_string(),
        )
    }
}

impl MailSender for LogMailer {
    #[instrument(skip(self, mail), fields(subject = %mail.subject))]
    fn send(&self, mail: &Mail) -> Result<(), MailError> {
        if !self.enabled {
            debug!("Mail disabled, notification dropped");
            return Ok(());
        }
        info!(from = %self.from, to = %self.to, body = %mail.body, "Mail sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_auto_mail() {
        let mail = Mail::new_auto(42, Some("Alpha"));
        assert_eq!(mail.subject, "Neues Auto 42");
        assert!(mail.body.contains("<strong>Alpha</strong>"));

        let mail = Mail::new_auto(43, None);
        assert!(mail.body.contains("N/A"));
    }

    #[test]
    fn test_log_mailer_never_fails() {
        let mail = Mail::new_auto(1, Some("Alpha"));
        assert!(LogMailer::default().send(&mail).is_ok());
        let disabled = LogMailer::new(false, "a@b.c".to_string(), "d@e.f".to_string());
        assert!(disabled.send(&mail).is_ok());
    }

    #[test]
    fn test_mail_error_display() {
        assert_eq!(MailError("timeout".to_string()).to_string(), "mail not sent: timeout");
    }
}
