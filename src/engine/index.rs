//! Cross-folder index of existing contacts
//!
//! Drains every folder of the destination store (the unnamed default folder
//! first, then each named folder) and tags each record with where it came
//! from. A folder that fails to enumerate is logged and contributes nothing;
//! the rest of the build carries on.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::identity::{group_by_identity_key, identity_key};
use crate::error::{Error, Result};
use crate::models::{Contact, Folder, SourceFolder, DEFAULT_FOLDER_NAME};
use crate::store::ContactStore;

/// Records read from one folder. `id` is `None` for the default folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderCount {
    pub id: Option<String>,
    pub name: String,
    pub count: usize,
    pub failed: bool,
}

/// Snapshot of existing contacts, built once per batch.
#[derive(Debug, Default, Clone)]
pub struct ContactIndex {
    /// Every existing contact, tagged with its source folder
    pub contacts: Vec<Contact>,
    /// Records read per folder, in enumeration order
    pub folder_counts: Vec<FolderCount>,
    /// Folders whose enumeration failed and were left out
    pub failed_folders: Vec<String>,
}

impl ContactIndex {
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Records read from the first folder with this name
    pub fn count_in(&self, name: &str) -> Option<usize> {
        self.folder_counts
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.count)
    }

    /// Existing records grouped by identity key
    pub fn by_key(&self) -> HashMap<String, Vec<&Contact>> {
        group_by_identity_key(&self.contacts)
    }

    /// Every existing record sharing the given contact's identity key
    pub fn matches_for(&self, contact: &Contact) -> Vec<&Contact> {
        match identity_key(contact) {
            Some(key) => self
                .contacts
                .iter()
                .filter(|c| identity_key(c).as_deref() == Some(key.as_str()))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Identity keys that already map to more than one existing record,
    /// sorted by key. Nothing is modified.
    pub fn existing_duplicates(&self) -> Vec<(String, Vec<&Contact>)> {
        let mut groups: Vec<(String, Vec<&Contact>)> = self
            .by_key()
            .into_iter()
            .filter(|(_, records)| records.len() > 1)
            .collect();
        groups.sort_by(|a, b| a.0.cmp(&b.0));
        groups
    }
}

/// Build the index across the default folder and every named folder.
///
/// Only a failure to list the folders themselves is returned as an error.
pub fn build_index(store: &dyn ContactStore) -> Result<ContactIndex> {
    let folders = store
        .list_folders()
        .map_err(|e| Error::FolderListing(e.to_string()))?;

    let mut index = ContactIndex::default();
    collect_folder(store, None, &mut index);
    for folder in &folders {
        collect_folder(store, Some(folder), &mut index);
    }

    info!(
        contacts = index.contacts.len(),
        folders = folders.len() + 1,
        failed = index.failed_folders.len(),
        "built cross-folder index"
    );
    for folder in &index.folder_counts {
        debug!(folder = %folder.name, count = folder.count, "folder indexed");
    }

    Ok(index)
}

/// Build an index over a single folder (`None` is the default folder).
pub fn build_folder_index(store: &dyn ContactStore, folder: Option<&Folder>) -> ContactIndex {
    let mut index = ContactIndex::default();
    collect_folder(store, folder, &mut index);
    index
}

fn collect_folder(store: &dyn ContactStore, folder: Option<&Folder>, index: &mut ContactIndex) {
    let name = folder
        .map(|f| f.display_name.clone())
        .unwrap_or_else(|| DEFAULT_FOLDER_NAME.to_string());
    let folder_id = folder.map(|f| f.id.as_str());

    match drain_folder(store, folder_id) {
        Ok(records) => {
            index.folder_counts.push(FolderCount {
                id: folder_id.map(str::to_string),
                name: name.clone(),
                count: records.len(),
                failed: false,
            });
            index.contacts.extend(records.into_iter().map(|mut c| {
                c.source_folder = Some(SourceFolder {
                    name: name.clone(),
                    id: folder_id.map(str::to_string),
                });
                c
            }));
        }
        Err(e) => {
            warn!(folder = %name, error = %e, "folder enumeration failed, skipping");
            index.folder_counts.push(FolderCount {
                id: folder_id.map(str::to_string),
                name: name.clone(),
                count: 0,
                failed: true,
            });
            index.failed_folders.push(name);
        }
    }
}

/// Follow continuation tokens until the store reports the last page
fn drain_folder(store: &dyn ContactStore, folder_id: Option<&str>) -> Result<Vec<Contact>> {
    let mut records = Vec::new();
    let mut token: Option<String> = None;

    loop {
        let page = store.list_contacts(folder_id, token.as_deref())?;
        records.extend(page.contacts);

        match page.next_page_token {
            Some(next) if token.as_deref() == Some(next.as_str()) => {
                return Err(Error::store(
                    "list_contacts",
                    format!("page token '{}' repeated", next),
                ));
            }
            Some(next) => token = Some(next),
            None => return Ok(records),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::ContactPage;

    fn contact(name: &str, email: &str) -> Contact {
        let mut c = Contact::new();
        c.display_name = Some(name.to_string());
        c.add_email(email);
        c
    }

    /// Store whose listing fails for one named folder
    struct BrokenFolderStore {
        inner: Database,
        broken_id: String,
    }

    impl ContactStore for BrokenFolderStore {
        fn list_folders(&self) -> Result<Vec<Folder>> {
            self.inner.list_folders()
        }

        fn list_contacts(&self, folder_id: Option<&str>, token: Option<&str>) -> Result<ContactPage> {
            if folder_id == Some(self.broken_id.as_str()) {
                return Err(Error::store("list_contacts", "boom"));
            }
            self.inner.list_contacts(folder_id, token)
        }

        fn create_contact(&self, folder_id: Option<&str>, c: &Contact) -> Result<Contact> {
            self.inner.create_contact(folder_id, c)
        }

        fn update_contact(&self, id: &str, c: &Contact) -> Result<Contact> {
            self.inner.update_contact(id, c)
        }

        fn find_folder(&self, name: &str) -> Result<Option<Folder>> {
            self.inner.find_folder(name)
        }

        fn create_folder(&self, name: &str) -> Result<Folder> {
            self.inner.create_folder(name)
        }
    }

    /// In-memory remote store with fixed folders; one folder can be made
    /// to hand back the same continuation token forever
    struct RemoteStore {
        folders: Vec<Folder>,
        looping_id: Option<String>,
    }

    impl ContactStore for RemoteStore {
        fn list_folders(&self) -> Result<Vec<Folder>> {
            Ok(self.folders.clone())
        }

        fn list_contacts(&self, folder_id: Option<&str>, _token: Option<&str>) -> Result<ContactPage> {
            let id = folder_id.unwrap_or("default");
            let next_page_token = if folder_id.is_some() && folder_id == self.looping_id.as_deref() {
                Some("page-2".to_string())
            } else {
                None
            };
            Ok(ContactPage {
                contacts: vec![contact(id, &format!("{}@x.com", id))],
                next_page_token,
            })
        }

        fn create_contact(&self, _folder_id: Option<&str>, c: &Contact) -> Result<Contact> {
            Ok(c.clone())
        }

        fn update_contact(&self, _id: &str, c: &Contact) -> Result<Contact> {
            Ok(c.clone())
        }

        fn find_folder(&self, name: &str) -> Result<Option<Folder>> {
            Ok(self.folders.iter().find(|f| f.display_name == name).cloned())
        }

        fn create_folder(&self, name: &str) -> Result<Folder> {
            Err(Error::store("create_folder", format!("read-only store: {}", name)))
        }
    }

    fn remote_folder(id: &str, name: &str) -> Folder {
        Folder {
            id: id.to_string(),
            display_name: name.to_string(),
            total_items: 1,
        }
    }

    #[test]
    fn indexes_default_and_named_folders() {
        let db = Database::open_memory().unwrap().with_page_size(2);
        let vendors = db.insert_folder("Vendors").unwrap();
        db.create_contact(None, &contact("A", "a@x.com")).unwrap();
        for i in 0..3 {
            db.create_contact(Some(&vendors.id), &contact(&format!("V{}", i), &format!("v{}@x.com", i)))
                .unwrap();
        }

        let index = build_index(&db).unwrap();
        assert_eq!(index.len(), 4);
        assert_eq!(index.count_in(DEFAULT_FOLDER_NAME), Some(1));
        assert_eq!(index.count_in("Vendors"), Some(3));
        assert!(index.failed_folders.is_empty());

        let vendor = index
            .contacts
            .iter()
            .find(|c| c.display_name.as_deref() == Some("V2"))
            .unwrap();
        let source = vendor.source_folder.as_ref().unwrap();
        assert_eq!(source.name, "Vendors");
        assert_eq!(source.id.as_deref(), Some(vendors.id.as_str()));

        let default = index
            .contacts
            .iter()
            .find(|c| c.display_name.as_deref() == Some("A"))
            .unwrap();
        assert!(default.source_folder.as_ref().unwrap().id.is_none());
    }

    #[test]
    fn failing_folder_is_isolated() {
        let db = Database::open_memory().unwrap();
        let broken = db.insert_folder("Broken").unwrap();
        let ok = db.insert_folder("Clients").unwrap();
        db.create_contact(Some(&broken.id), &contact("B", "b@x.com")).unwrap();
        db.create_contact(Some(&ok.id), &contact("C", "c@x.com")).unwrap();

        let store = BrokenFolderStore {
            inner: db,
            broken_id: broken.id.clone(),
        };
        let index = build_index(&store).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.failed_folders, vec!["Broken".to_string()]);
        assert_eq!(index.count_in("Broken"), Some(0));
        assert_eq!(index.count_in("Clients"), Some(1));
    }

    #[test]
    fn single_folder_index_ignores_others() {
        let db = Database::open_memory().unwrap();
        let vendors = db.insert_folder("Vendors").unwrap();
        db.create_contact(None, &contact("A", "a@x.com")).unwrap();
        db.create_contact(Some(&vendors.id), &contact("V", "v@x.com")).unwrap();

        let index = build_folder_index(&db, Some(&vendors));
        assert_eq!(index.len(), 1);
        assert_eq!(index.contacts[0].source_folder_name(), Some("Vendors"));
    }

    #[test]
    fn reports_pre_existing_cross_folder_duplicates() {
        let db = Database::open_memory().unwrap();
        let vendors = db.insert_folder("Vendors").unwrap();
        db.create_contact(None, &contact("A", "dup@x.com")).unwrap();
        db.create_contact(Some(&vendors.id), &contact("A2", "DUP@x.com")).unwrap();
        db.create_contact(None, &contact("B", "b@x.com")).unwrap();

        let index = build_index(&db).unwrap();
        let dupes = index.existing_duplicates();
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes[0].0, "dup@x.com");
        assert_eq!(dupes[0].1.len(), 2);

        let lookup = contact("Lookup", "Dup@X.com");
        assert_eq!(index.matches_for(&lookup).len(), 2);
    }

    #[test]
    fn folders_sharing_a_name_are_counted_separately() {
        let store = RemoteStore {
            folders: vec![
                remote_folder("f1", "Team"),
                remote_folder("f2", "Team"),
                remote_folder("f3", DEFAULT_FOLDER_NAME),
            ],
            looping_id: None,
        };

        let index = build_index(&store).unwrap();
        assert_eq!(index.len(), 4);
        assert_eq!(index.folder_counts.len(), 4);
        let ids: Vec<Option<&str>> = index.folder_counts.iter().map(|f| f.id.as_deref()).collect();
        assert_eq!(ids, vec![None, Some("f1"), Some("f2"), Some("f3")]);
        assert!(index.folder_counts.iter().all(|f| f.count == 1 && !f.failed));
    }

    #[test]
    fn repeated_page_token_fails_only_that_folder() {
        let store = RemoteStore {
            folders: vec![remote_folder("f1", "Loop"), remote_folder("f2", "Fine")],
            looping_id: Some("f1".into()),
        };

        let index = build_index(&store).unwrap();
        assert_eq!(index.failed_folders, vec!["Loop".to_string()]);
        assert_eq!(index.count_in("Loop"), Some(0));
        assert_eq!(index.count_in("Fine"), Some(1));
        assert!(index.folder_counts.iter().any(|f| f.name == "Loop" && f.failed));
        // default folder plus Fine
        assert_eq!(index.len(), 2);
    }
}
