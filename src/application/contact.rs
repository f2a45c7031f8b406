//! The portfolio contact form. Submissions are acknowledged and logged;
//! nothing is stored or forwarded.

use serde::Deserialize;
use thiserror::Error;

pub const CONTACT_THANKS: &str = "Thank you for your message! I will get back to you soon.";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContactError {
    #[error("Please tell me your name.")]
    MissingName,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Please write a message.")]
    MissingMessage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn validate(self) -> Result<ContactMessage, ContactError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ContactError::MissingName);
        }
        let email = self.email.trim();
        if !plausible_email(email) {
            return Err(ContactError::InvalidEmail);
        }
        let message = self.message.trim();
        if message.is_empty() {
            return Err(ContactError::MissingMessage);
        }

        Ok(ContactMessage {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        })
    }
}

fn plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
