use serde::{Deserialize, Serialize};

use super::Contact;

/// Display name used for the store's unnamed default folder
pub const DEFAULT_FOLDER_NAME: &str = "Contacts";

/// A named contact folder in the destination store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub display_name: String,
    pub total_items: u32,
}

/// One page of a folder listing. `next_page_token` is `None` on the last page.
#[derive(Debug, Clone, Default)]
pub struct ContactPage {
    pub contacts: Vec<Contact>,
    pub next_page_token: Option<String>,
}

/// True when a folder name refers to the unnamed default folder
pub fn is_default_folder_name(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name.eq_ignore_ascii_case(DEFAULT_FOLDER_NAME)
}
