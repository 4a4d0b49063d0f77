mod address;
mod contact;
mod email;
mod folder;

pub use address::{AddressKind, PhysicalAddress};
pub use contact::{Contact, SourceFolder};
pub use email::EmailAddress;
pub use folder::{is_default_folder_name, ContactPage, Folder, DEFAULT_FOLDER_NAME};
