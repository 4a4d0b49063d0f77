//! Duplicate classification by identity key

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::identity::{group_by_identity_key, identity_key};
use crate::models::Contact;

/// Result of splitting an incoming batch against existing records.
///
/// `T` is the incoming record type; anything that borrows as a `Contact`
/// works, so callers can carry batch positions alongside each record.
#[derive(Debug, Clone)]
pub struct Classification<T = Contact> {
    pub unique_contacts: Vec<T>,
    pub duplicate_contacts: Vec<T>,
    /// Every existing record matched by at least one duplicate, across all
    /// folders. A key's matches are listed once even when several incoming
    /// records share it.
    pub matching_existing_contacts: Vec<Contact>,
    pub duplicate_count: usize,
}

impl<T> Default for Classification<T> {
    fn default() -> Self {
        Self {
            unique_contacts: Vec::new(),
            duplicate_contacts: Vec::new(),
            matching_existing_contacts: Vec::new(),
            duplicate_count: 0,
        }
    }
}

/// Existing and incoming records sharing one identity key
#[derive(Debug, Clone)]
pub struct DuplicateGroup<T = Contact> {
    pub key: String,
    pub existing: Vec<Contact>,
    pub incoming: Vec<T>,
}

impl<T> DuplicateGroup<T> {
    /// The record updates are applied to when the group is merged or replaced
    pub fn target(&self) -> Option<&Contact> {
        self.existing.first()
    }
}

/// Partition `candidates` into unique and duplicate sets.
///
/// A candidate is a duplicate when its identity key matches at least one
/// existing record. Candidates without an email are always unique.
pub fn classify<T: Borrow<Contact>>(existing: &[Contact], candidates: Vec<T>) -> Classification<T> {
    let by_key = group_by_identity_key(existing);
    let mut result = Classification::default();
    let mut reported: HashSet<String> = HashSet::new();

    for candidate in candidates {
        let key = identity_key(candidate.borrow());
        let matches = key.and_then(|key| by_key.get(&key).map(|m| (key, m)));

        match matches {
            Some((key, matches)) => {
                if reported.insert(key) {
                    result
                        .matching_existing_contacts
                        .extend(matches.iter().map(|c| (*c).clone()));
                }
                result.duplicate_contacts.push(candidate);
            }
            None => result.unique_contacts.push(candidate),
        }
    }

    result.duplicate_count = result.duplicate_contacts.len();
    debug!(
        unique = result.unique_contacts.len(),
        duplicates = result.duplicate_count,
        matched_existing = result.matching_existing_contacts.len(),
        "classified batch"
    );
    result
}

impl<T: Borrow<Contact> + Clone> Classification<T> {
    pub fn total(&self) -> usize {
        self.unique_contacts.len() + self.duplicate_contacts.len()
    }

    /// Bucket duplicates with their existing matches by identity key, in the
    /// order each key first appears in the incoming batch. Only keys with
    /// records on both sides form a group.
    pub fn duplicate_groups(&self) -> Vec<DuplicateGroup<T>> {
        let existing = group_by_identity_key(&self.matching_existing_contacts);

        let mut order: Vec<String> = Vec::new();
        let mut incoming: HashMap<String, Vec<T>> = HashMap::new();
        for record in &self.duplicate_contacts {
            if let Some(key) = identity_key(record.borrow()) {
                if !incoming.contains_key(&key) {
                    order.push(key.clone());
                }
                incoming.entry(key).or_default().push(record.clone());
            }
        }

        order
            .into_iter()
            .filter_map(|key| {
                let existing = existing.get(&key)?;
                let incoming = incoming.remove(&key)?;
                Some(DuplicateGroup {
                    existing: existing.iter().map(|c| (*c).clone()).collect(),
                    incoming,
                    key,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceFolder;

    fn contact(name: &str, email: Option<&str>) -> Contact {
        let mut c = Contact::new();
        c.display_name = Some(name.to_string());
        if let Some(email) = email {
            c.add_email(email);
        }
        c
    }

    fn in_folder(mut c: Contact, folder: &str) -> Contact {
        c.source_folder = Some(SourceFolder {
            name: folder.to_string(),
            id: Some(format!("{}-id", folder)),
        });
        c
    }

    #[test]
    fn counts_always_add_up() {
        let existing = vec![contact("E", Some("e@x.com"))];
        let batch = vec![
            contact("A", Some("a@x.com")),
            contact("E2", Some("e@x.com")),
            contact("N", None),
            contact("E3", Some("E@X.COM")),
        ];
        let result = classify(&existing, batch);
        assert_eq!(result.unique_contacts.len() + result.duplicate_contacts.len(), 4);
        assert_eq!(result.total(), 4);
        assert_eq!(result.duplicate_count, 2);
    }

    #[test]
    fn contacts_without_email_are_unique() {
        let existing = vec![contact("Same Name", None)];
        let result = classify(&existing, vec![contact("Same Name", None)]);
        assert_eq!(result.unique_contacts.len(), 1);
        assert_eq!(result.duplicate_count, 0);
    }

    #[test]
    fn matching_ignores_case() {
        let existing = vec![contact("E", Some("A@B.com"))];
        let result = classify(&existing, vec![contact("I", Some("a@b.com"))]);
        assert_eq!(result.duplicate_count, 1);
    }

    #[test]
    fn no_fuzzy_matching_on_aliases() {
        let existing = vec![contact("E", Some("john.doe@x.com"))];
        let result = classify(&existing, vec![contact("E", Some("johndoe@x.com"))]);
        assert_eq!(result.duplicate_count, 0);
    }

    #[test]
    fn one_match_in_vendors_folder() {
        let existing = vec![
            in_folder(contact("Vendor Bob", Some("bob@vendor.com")), "Vendors"),
            in_folder(contact("Client Sue", Some("sue@client.com")), "Clients"),
        ];
        let batch = vec![
            contact("New 1", Some("new1@x.com")),
            contact("Bob", Some("bob@vendor.com")),
            contact("New 2", Some("new2@x.com")),
        ];

        let result = classify(&existing, batch);
        assert_eq!(result.unique_contacts.len(), 2);
        assert_eq!(result.duplicate_count, 1);
        assert_eq!(result.matching_existing_contacts.len(), 1);
        assert_eq!(
            result.matching_existing_contacts[0].source_folder_name(),
            Some("Vendors")
        );
    }

    #[test]
    fn surfaces_every_cross_folder_match() {
        let existing = vec![
            in_folder(contact("Bob A", Some("bob@x.com")), "Vendors"),
            in_folder(contact("Bob B", Some("bob@x.com")), "Clients"),
        ];
        let batch = vec![contact("Bob", Some("bob@x.com")), contact("Bobby", Some("BOB@x.com"))];

        let result = classify(&existing, batch);
        assert_eq!(result.duplicate_count, 2);
        assert_eq!(result.matching_existing_contacts.len(), 2);

        let groups = result.duplicate_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].existing.len(), 2);
        assert_eq!(groups[0].incoming.len(), 2);
        assert_eq!(groups[0].target().unwrap().display_name.as_deref(), Some("Bob A"));
    }

    #[test]
    fn groups_follow_incoming_order() {
        let existing = vec![contact("A", Some("a@x.com")), contact("B", Some("b@x.com"))];
        let batch = vec![contact("B2", Some("b@x.com")), contact("A2", Some("a@x.com"))];

        let keys: Vec<String> = classify(&existing, batch)
            .duplicate_groups()
            .into_iter()
            .map(|g| g.key)
            .collect();
        assert_eq!(keys, vec!["b@x.com", "a@x.com"]);
    }
}
