//! Destination address-book interface
//!
//! Defines what the merge engine needs from the store that holds existing
//! contacts. `Database` is the local SQLite implementation.

use crate::error::Result;
use crate::models::{Contact, ContactPage, Folder};

/// Trait for address books that hold contacts split across folders.
///
/// A `folder_id` of `None` always means the unnamed default folder.
pub trait ContactStore {
    /// List the named folders. The default folder is implicit and not included.
    fn list_folders(&self) -> Result<Vec<Folder>>;

    /// Fetch one page of a folder's contacts.
    ///
    /// Pass the previous page's `next_page_token` to continue; `None` starts
    /// from the beginning.
    fn list_contacts(&self, folder_id: Option<&str>, page_token: Option<&str>)
        -> Result<ContactPage>;

    /// Persist a new contact and return it with its assigned `id`
    fn create_contact(&self, folder_id: Option<&str>, contact: &Contact) -> Result<Contact>;

    /// Overwrite an existing contact's fields
    fn update_contact(&self, id: &str, contact: &Contact) -> Result<Contact>;

    /// Look up a named folder (exact, case-insensitive)
    fn find_folder(&self, name: &str) -> Result<Option<Folder>>;

    fn create_folder(&self, name: &str) -> Result<Folder>;

    /// Look up a named folder, creating it when missing
    fn ensure_folder(&self, name: &str) -> Result<Folder> {
        match self.find_folder(name)? {
            Some(folder) => Ok(folder),
            None => self.create_folder(name),
        }
    }
}
