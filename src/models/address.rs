use serde::{Deserialize, Serialize};

/// Which of a contact's two address slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Home,
    Business,
}

/// Postal address attached to a contact. Every part is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl PhysicalAddress {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no part carries a non-blank value
    pub fn is_empty(&self) -> bool {
        [
            &self.street,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .all(|part| part.as_deref().map_or(true, |s| s.trim().is_empty()))
    }

    /// Single-line rendering used in prompts and reports
    pub fn one_line(&self) -> String {
        let parts: Vec<&str> = [
            self.street.as_deref(),
            self.city.as_deref(),
            self.state.as_deref(),
            self.postal_code.as_deref(),
            self.country.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect();
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_parts_count_as_empty() {
        let mut address = PhysicalAddress::new();
        assert!(address.is_empty());

        address.city = Some("   ".into());
        assert!(address.is_empty());

        address.city = Some("Seattle".into());
        assert!(!address.is_empty());
    }

    #[test]
    fn one_line_skips_missing_parts() {
        let address = PhysicalAddress {
            street: Some("1 Main St".into()),
            city: Some("Seattle".into()),
            state: None,
            postal_code: Some("98101".into()),
            country: None,
        };
        assert_eq!(address.one_line(), "1 Main St, Seattle, 98101");
    }
}
