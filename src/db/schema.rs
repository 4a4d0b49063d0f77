pub const SCHEMA_VERSION: i32 = 1;

pub const SCHEMA_V1: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL
);

-- Named folders. The default folder is implicit (folder_id IS NULL).
CREATE TABLE IF NOT EXISTS folders (
    id TEXT PRIMARY KEY,
    display_name TEXT NOT NULL UNIQUE COLLATE NOCASE,
    created_at TEXT NOT NULL
);

-- Contact records are stored whole as JSON; primary_email is denormalized
-- for lookups and always lowercased.
CREATE TABLE IF NOT EXISTS contacts (
    id TEXT PRIMARY KEY,
    folder_id TEXT,
    display_name TEXT,
    primary_email TEXT,
    data TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (folder_id) REFERENCES folders(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_contacts_folder ON contacts(folder_id);
CREATE INDEX IF NOT EXISTS idx_contacts_primary_email ON contacts(primary_email);
"#;
