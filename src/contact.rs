use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

const MAILTO_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Field {
    #[default]
    Name,
    Email,
    Message,
}

impl Field {
    pub fn title(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Message => "Message",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Field::Name => Field::Email,
            Field::Email => Field::Message,
            Field::Message => Field::Name,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Field::Name => Field::Message,
            Field::Email => Field::Name,
            Field::Message => Field::Email,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("please enter your name")]
    MissingName,
    #[error("please enter a valid email address")]
    InvalidEmail,
    #[error("please write a message")]
    MissingMessage,
    #[error("no recipient address configured")]
    NoRecipient,
}

#[derive(Default, Debug, Clone)]
pub struct ContactForm {
    pub active: Field,
    name: String,
    email: String,
    message: String,
    status: Option<String>,
}

impl ContactForm {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Message => &self.message,
        }
    }

    fn active_value_mut(&mut self) -> &mut String {
        match self.active {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Message => &mut self.message,
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status<S: Into<String>>(&mut self, message: S) {
        self.status = Some(message.into());
    }

    pub fn next(&mut self) {
        self.active = self.active.next();
    }

    pub fn previous(&mut self) {
        self.active = self.active.previous();
    }

    pub fn insert_char(&mut self, ch: char) {
        self.status = None;
        self.active_value_mut().push(ch);
    }

    pub fn backspace(&mut self) {
        self.status = None;
        self.active_value_mut().pop();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::MissingName);
        }
        if !is_valid_email(self.email.trim()) {
            return Err(FormError::InvalidEmail);
        }
        if self.message.trim().is_empty() {
            return Err(FormError::MissingMessage);
        }
        Ok(())
    }

    pub fn mailto_url(&self, recipient: Option<&str>) -> Result<String, FormError> {
        self.validate()?;
        let recipient = recipient
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(FormError::NoRecipient)?;
        let subject = format!("Portfolio contact from {}", self.name.trim());
        let body = format!(
            "{}\n\n{} <{}>",
            self.message.trim(),
            self.name.trim(),
            self.email.trim()
        );
        Ok(format!(
            "mailto:{}?subject={}&body={}",
            recipient,
            utf8_percent_encode(&subject, MAILTO_ENCODE),
            utf8_percent_encode(&body, MAILTO_ENCODE)
        ))
    }
}

fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ContactForm {
        let mut form = ContactForm::default();
        for ch in "Ada".chars() {
            form.insert_char(ch);
        }
        form.next();
        for ch in "ada@example.org".chars() {
            form.insert_char(ch);
        }
        form.next();
        for ch in "Hi there & hello".chars() {
            form.insert_char(ch);
        }
        form
    }

    #[test]
    fn focus_cycles_both_ways() {
        let mut form = ContactForm::default();
        assert_eq!(form.active, Field::Name);
        form.previous();
        assert_eq!(form.active, Field::Message);
        form.next();
        assert_eq!(form.active, Field::Name);
    }

    #[test]
    fn validation_order() {
        let mut form = ContactForm::default();
        assert_eq!(form.validate(), Err(FormError::MissingName));
        form.insert_char('A');
        assert_eq!(form.validate(), Err(FormError::InvalidEmail));
        assert!(filled().validate().is_ok());
    }

    #[test]
    fn email_rules() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@.co"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email("a@b@c.de"));
    }

    #[test]
    fn mailto_is_percent_encoded() {
        let url = filled().mailto_url(Some("me@example.dev")).unwrap();
        assert!(url.starts_with("mailto:me@example.dev?subject=Portfolio%20contact%20from%20Ada&body="));
        assert!(url.contains("Hi%20there%20%26%20hello%0A%0AAda%20%3Cada%40example.org%3E"));
    }

    #[test]
    fn mailto_needs_recipient() {
        assert_eq!(filled().mailto_url(None), Err(FormError::NoRecipient));
        assert_eq!(filled().mailto_url(Some("  ")), Err(FormError::NoRecipient));
    }
}
