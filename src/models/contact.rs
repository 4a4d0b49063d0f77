use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{AddressKind, EmailAddress, PhysicalAddress};

/// Folder a record was read from. Set on records loaded from the store and
/// kept in backups so a restore can put them back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFolder {
    pub name: String,
    /// `None` for the store's unnamed default folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Canonical contact record shared by parsers, the store and the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub given_name: Option<String>,
    pub surname: Option<String>,
    pub middle_name: Option<String>,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
    #[serde(default)]
    pub business_phones: Vec<String>,
    #[serde(default)]
    pub home_phones: Vec<String>,
    pub mobile_phone: Option<String>,
    pub business_address: Option<PhysicalAddress>,
    pub home_address: Option<PhysicalAddress>,
    pub personal_notes: Option<String>,
    pub birthday: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_folder: Option<SourceFolder>,
}

impl Contact {
    pub fn new() -> Self {
        Self::default()
    }

    /// First email address, if any
    pub fn primary_email(&self) -> Option<&str> {
        self.email_addresses
            .first()
            .map(|e| e.address.as_str())
            .filter(|a| !a.trim().is_empty())
    }

    pub fn add_email(&mut self, address: impl Into<String>) {
        let address = address.into();
        let address = address.trim();
        if !address.is_empty() {
            self.email_addresses.push(EmailAddress::new(address));
        }
    }

    /// Fill a blank display name from Given, Middle and Surname.
    /// Leaves it empty when all three are blank.
    pub fn compute_display_name(&mut self) {
        if self.display_name.as_deref().map_or(false, |s| !s.trim().is_empty()) {
            return;
        }

        let parts: Vec<&str> = [
            self.given_name.as_deref(),
            self.middle_name.as_deref(),
            self.surname.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

        self.display_name = if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        };
    }

    /// Short label for reports: display name, else primary email, else "(unnamed)"
    pub fn label(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|s| !s.trim().is_empty()) {
            return name.to_string();
        }
        self.primary_email()
            .map(str::to_string)
            .unwrap_or_else(|| "(unnamed)".to_string())
    }

    pub fn address_mut(&mut self, kind: AddressKind) -> &mut Option<PhysicalAddress> {
        match kind {
            AddressKind::Home => &mut self.home_address,
            AddressKind::Business => &mut self.business_address,
        }
    }

    pub fn source_folder_name(&self) -> Option<&str> {
        self.source_folder.as_ref().map(|f| f.name.as_str())
    }

    /// Copy with store-assigned metadata removed, as sent to create calls
    pub fn without_metadata(&self) -> Self {
        let mut copy = self.clone();
        copy.id = None;
        copy.source_folder = None;
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_joins_name_parts() {
        let mut contact = Contact::new();
        contact.given_name = Some("Ada".into());
        contact.middle_name = Some("  ".into());
        contact.surname = Some("Lovelace".into());
        contact.compute_display_name();
        assert_eq!(contact.display_name.as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn display_name_keeps_existing_value() {
        let mut contact = Contact::new();
        contact.display_name = Some("The Countess".into());
        contact.given_name = Some("Ada".into());
        contact.compute_display_name();
        assert_eq!(contact.display_name.as_deref(), Some("The Countess"));
    }

    #[test]
    fn display_name_stays_empty_without_names() {
        let mut contact = Contact::new();
        contact.display_name = Some(" ".into());
        contact.compute_display_name();
        assert!(contact.display_name.is_none());
    }

    #[test]
    fn primary_email_is_first_entry() {
        let mut contact = Contact::new();
        contact.add_email("first@example.com");
        contact.add_email("second@example.com");
        contact.add_email("   ");
        assert_eq!(contact.email_addresses.len(), 2);
        assert_eq!(contact.primary_email(), Some("first@example.com"));
    }

    #[test]
    fn label_falls_back_to_email() {
        let mut contact = Contact::new();
        assert_eq!(contact.label(), "(unnamed)");
        contact.add_email("x@example.com");
        assert_eq!(contact.label(), "x@example.com");
        contact.display_name = Some("X".into());
        assert_eq!(contact.label(), "X");
    }

    #[test]
    fn deserializes_with_missing_lists() {
        let contact: Contact =
            serde_json::from_str(r#"{"displayName":"A","givenName":"A"}"#).unwrap();
        assert!(contact.email_addresses.is_empty());
        assert!(contact.business_phones.is_empty());
        assert!(contact.source_folder.is_none());
    }
}
