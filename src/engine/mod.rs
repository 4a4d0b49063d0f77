//! Duplicate detection, merge and placement engine
//!
//! Everything here works on `Contact` values and talks to the outside world
//! only through `ContactStore` and `Prompter`.

pub mod classify;
pub mod identity;
pub mod index;
pub mod merge;
pub mod orchestrator;
pub mod placement;
pub mod prompt;
pub mod resolve;
pub mod validate;

pub use classify::{classify, Classification, DuplicateGroup};
pub use identity::{group_by_identity_key, identity_key};
pub use index::{build_folder_index, build_index, ContactIndex, FolderCount};
pub use merge::{FieldChoice, FieldMerge, FieldPrompt, MergeField, Resolution};
pub use orchestrator::{ImportOptions, ImportReport, Importer, RecordError, RecordErrorKind};
pub use placement::{FolderRule, FolderRules};
pub use prompt::{GroupAction, GroupPrompt, Prompter, ScriptedAnswer, ScriptedPrompter};
pub use resolve::{resolve_group, run_field_merge, MergeStrategy, Outcome};
pub use validate::{is_valid_email, split_valid, validate, InvalidRecord, ValidationIssue};
