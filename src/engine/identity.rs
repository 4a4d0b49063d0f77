//! Identity keys and grouping by key

use std::collections::HashMap;

use crate::models::Contact;

/// Lowercased, trimmed primary email. Contacts without an email have no key
/// and never match anything.
pub fn identity_key(contact: &Contact) -> Option<String> {
    contact
        .email_addresses
        .first()
        .map(|e| e.normalized())
        .filter(|key| !key.is_empty())
}

/// Bucket records by identity key, preserving input order inside each bucket.
/// Records without a key are left out.
pub fn group_by_identity_key<'a, I>(records: I) -> HashMap<String, Vec<&'a Contact>>
where
    I: IntoIterator<Item = &'a Contact>,
{
    let mut groups: HashMap<String, Vec<&Contact>> = HashMap::new();
    for record in records {
        if let Some(key) = identity_key(record) {
            groups.entry(key).or_default().push(record);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_email(email: &str) -> Contact {
        let mut c = Contact::new();
        c.add_email(email);
        c
    }

    #[test]
    fn key_is_lowercased_and_trimmed() {
        let mut c = Contact::new();
        c.email_addresses.push(" A@B.com ".into());
        assert_eq!(identity_key(&c).as_deref(), Some("a@b.com"));
    }

    #[test]
    fn no_email_means_no_key() {
        assert!(identity_key(&Contact::new()).is_none());
    }

    #[test]
    fn only_first_email_counts() {
        let mut c = with_email("first@x.com");
        c.add_email("second@x.com");
        assert_eq!(identity_key(&c).as_deref(), Some("first@x.com"));
    }

    #[test]
    fn groups_collect_every_record_per_key() {
        let records = vec![
            with_email("a@b.com"),
            with_email("A@B.com"),
            with_email("c@d.com"),
            Contact::new(),
        ];
        let groups = group_by_identity_key(&records);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["a@b.com"].len(), 2);
        assert_eq!(groups["c@d.com"].len(), 1);
    }
}
