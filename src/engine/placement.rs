//! Company-name based folder placement

use serde::{Deserialize, Serialize};

use crate::models::Contact;

/// One company → folder mapping entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRule {
    pub company: String,
    pub folder: String,
}

impl FolderRule {
    pub fn new(company: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            folder: folder.into(),
        }
    }
}

/// Ordered company → folder table plus the fallback folder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderRules {
    pub rules: Vec<FolderRule>,
    pub default_folder: String,
}

impl FolderRules {
    pub fn new(rules: Vec<FolderRule>, default_folder: impl Into<String>) -> Self {
        Self {
            rules,
            default_folder: default_folder.into(),
        }
    }

    /// Resolve the destination folder name for a contact.
    ///
    /// Order: exact case-sensitive company match, then the first rule where
    /// either name contains the other (case-insensitive), then the default.
    pub fn place(&self, contact: &Contact) -> String {
        let company = match contact.company_name.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => return self.default_folder.clone(),
        };

        if let Some(rule) = self.rules.iter().find(|r| r.company.trim() == company) {
            return rule.folder.clone();
        }

        let company_lower = company.to_lowercase();
        self.rules
            .iter()
            .filter(|r| !r.company.trim().is_empty())
            .find(|r| {
                let key = r.company.trim().to_lowercase();
                company_lower.contains(&key) || key.contains(&company_lower)
            })
            .map(|r| r.folder.clone())
            .unwrap_or_else(|| self.default_folder.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(company: Option<&str>) -> Contact {
        let mut c = Contact::new();
        c.company_name = company.map(str::to_string);
        c
    }

    fn rules() -> FolderRules {
        FolderRules::new(
            vec![FolderRule::new("Acme", "X"), FolderRule::new("Acme Corp", "Y")],
            "General",
        )
    }

    #[test]
    fn exact_match_beats_substring() {
        assert_eq!(rules().place(&at(Some("Acme Corp"))), "Y");
    }

    #[test]
    fn substring_takes_first_rule_in_order() {
        assert_eq!(rules().place(&at(Some("Acme Corporation"))), "X");
        assert_eq!(rules().place(&at(Some("acme corp"))), "X");
    }

    #[test]
    fn rule_key_containing_company_matches() {
        let rules = FolderRules::new(vec![FolderRule::new("Globex Industries", "G")], "General");
        assert_eq!(rules.place(&at(Some("globex"))), "G");
    }

    #[test]
    fn exact_match_is_case_sensitive() {
        let rules = FolderRules::new(
            vec![FolderRule::new("beta", "lower"), FolderRule::new("Beta", "upper")],
            "General",
        );
        assert_eq!(rules.place(&at(Some("Beta"))), "upper");
    }

    #[test]
    fn blank_or_unmatched_company_uses_default() {
        assert_eq!(rules().place(&at(None)), "General");
        assert_eq!(rules().place(&at(Some("   "))), "General");
        assert_eq!(rules().place(&at(Some("Initech"))), "General");
    }

    #[test]
    fn empty_rule_keys_never_match() {
        let rules = FolderRules::new(vec![FolderRule::new("", "Nowhere")], "General");
        assert_eq!(rules.place(&at(Some("Initech"))), "General");
    }

    #[test]
    fn padded_rule_key_still_matches_exactly() {
        let rules = FolderRules::new(
            vec![FolderRule::new("Acme", "X"), FolderRule::new(" Acme Corp ", "Y")],
            "General",
        );
        assert_eq!(rules.place(&at(Some("Acme Corp"))), "Y");
        assert_eq!(rules.place(&at(Some("  Acme Corp"))), "Y");
    }
}
