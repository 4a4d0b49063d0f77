use chrono::Utc;
use rusqlite::Row;
use uuid::Uuid;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{is_default_folder_name, Folder};

impl Database {
    // ==================== FOLDER CREATE ====================

    pub fn insert_folder(&self, name: &str) -> Result<Folder> {
        let name = name.trim();
        if is_default_folder_name(name) {
            return Err(Error::store(
                "create_folder",
                format!("'{}' is reserved for the default folder", name),
            ));
        }

        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO folders (id, display_name, created_at) VALUES (?, ?, ?)",
            rusqlite::params![id, name, Utc::now().to_rfc3339()],
        )?;

        Ok(Folder {
            id,
            display_name: name.to_string(),
            total_items: 0,
        })
    }

    // ==================== FOLDER READ ====================

    pub fn get_folder_by_name(&self, name: &str) -> Result<Option<Folder>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT f.id, f.display_name, COUNT(c.id)
               FROM folders f
               LEFT JOIN contacts c ON c.folder_id = f.id
               WHERE f.display_name = ? COLLATE NOCASE
               GROUP BY f.id"#,
        )?;

        let result = stmt.query_row([name.trim()], Self::row_to_folder);

        match result {
            Ok(folder) => Ok(Some(folder)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_folders(&self) -> Result<Vec<Folder>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT f.id, f.display_name, COUNT(c.id)
               FROM folders f
               LEFT JOIN contacts c ON c.folder_id = f.id
               GROUP BY f.id
               ORDER BY f.display_name ASC"#,
        )?;

        let folders = stmt
            .query_map([], Self::row_to_folder)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(folders)
    }

    fn row_to_folder(row: &Row) -> rusqlite::Result<Folder> {
        Ok(Folder {
            id: row.get(0)?,
            display_name: row.get(1)?,
            total_items: row.get(2)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_find_folder() {
        let db = Database::open_memory().unwrap();
        let created = db.insert_folder("Vendors").unwrap();

        let found = db.get_folder_by_name("vendors").unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.display_name, "Vendors");
        assert_eq!(found.total_items, 0);

        assert!(db.get_folder_by_name("Clients").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_folder_name_rejected() {
        let db = Database::open_memory().unwrap();
        db.insert_folder("Vendors").unwrap();
        assert!(db.insert_folder("VENDORS").is_err());
    }

    #[test]
    fn test_default_folder_name_reserved() {
        let db = Database::open_memory().unwrap();
        assert!(db.insert_folder("Contacts").is_err());
        assert!(db.insert_folder("  ").is_err());
    }

    #[test]
    fn test_get_folders_sorted() {
        let db = Database::open_memory().unwrap();
        db.insert_folder("Vendors").unwrap();
        db.insert_folder("Clients").unwrap();

        let names: Vec<String> = db
            .get_folders()
            .unwrap()
            .into_iter()
            .map(|f| f.display_name)
            .collect();
        assert_eq!(names, vec!["Clients", "Vendors"]);
    }
}
