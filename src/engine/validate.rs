//! Per-record validation before classification

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::models::Contact;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("display name is empty")]
    MissingDisplayName,

    #[error("invalid email address '{0}'")]
    InvalidEmail(String),
}

/// A record that failed validation, with its 1-based position in the batch
#[derive(Debug, Clone)]
pub struct InvalidRecord {
    pub index: usize,
    pub contact: Contact,
    pub issues: Vec<ValidationIssue>,
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("email pattern compiles")
    })
}

/// Basic `local@domain.tld` shape check
pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email.trim())
}

/// Check a record that already had its display name synthesized
pub fn validate(contact: &Contact) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if contact
        .display_name
        .as_deref()
        .map_or(true, |s| s.trim().is_empty())
    {
        issues.push(ValidationIssue::MissingDisplayName);
    }

    for email in &contact.email_addresses {
        if !is_valid_email(&email.address) {
            issues.push(ValidationIssue::InvalidEmail(email.address.clone()));
        }
    }

    issues
}

/// Synthesize display names, then split a parsed batch into valid records
/// and reported invalid ones. Nothing is dropped silently.
pub fn split_valid(records: Vec<Contact>) -> (Vec<(usize, Contact)>, Vec<InvalidRecord>) {
    let mut valid = Vec::new();
    let mut invalid = Vec::new();

    for (idx, mut contact) in records.into_iter().enumerate() {
        contact.compute_display_name();
        let issues = validate(&contact);
        if issues.is_empty() {
            valid.push((idx + 1, contact));
        } else {
            invalid.push(InvalidRecord {
                index: idx + 1,
                contact,
                issues,
            });
        }
    }

    (valid, invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("test@example.com"));
        assert!(is_valid_email("user.name@domain.co.uk"));
        assert!(is_valid_email(" padded@example.com "));
        assert!(!is_valid_email("invalid"));
        assert!(!is_valid_email("@domain.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@domain"));
        assert!(!is_valid_email("a b@domain.com"));
        assert!(!is_valid_email("a@@domain.com"));
    }

    #[test]
    fn missing_name_is_reported() {
        let mut contact = Contact::new();
        contact.add_email("x@example.com");
        assert_eq!(validate(&contact), vec![ValidationIssue::MissingDisplayName]);
    }

    #[test]
    fn every_bad_email_is_reported() {
        let mut contact = Contact::new();
        contact.display_name = Some("X".into());
        contact.add_email("good@example.com");
        contact.add_email("bad");
        contact.add_email("worse@");
        assert_eq!(validate(&contact).len(), 2);
    }

    #[test]
    fn split_synthesizes_names_and_keeps_positions() {
        let mut named = Contact::new();
        named.given_name = Some("Ada".into());
        named.surname = Some("Lovelace".into());

        let nameless = Contact::new();

        let mut bad_email = Contact::new();
        bad_email.display_name = Some("Bad".into());
        bad_email.add_email("nope");

        let (valid, invalid) = split_valid(vec![named, nameless, bad_email]);
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].0, 1);
        assert_eq!(valid[0].1.display_name.as_deref(), Some("Ada Lovelace"));

        let positions: Vec<usize> = invalid.iter().map(|r| r.index).collect();
        assert_eq!(positions, vec![2, 3]);
    }
}
