use chrono::Utc;
use rusqlite::{params, Row};
use uuid::Uuid;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{Contact, ContactPage, Folder};
use crate::store::ContactStore;

impl Database {
    // ==================== CONTACT CREATE ====================

    pub fn insert_contact(&self, folder_id: Option<&str>, contact: &Contact) -> Result<Contact> {
        let mut stored = contact.without_metadata();
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            r#"INSERT INTO contacts (
                id, folder_id, display_name, primary_email, data, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                id,
                folder_id,
                stored.display_name,
                stored.primary_email().map(|e| e.trim().to_lowercase()),
                serde_json::to_string(&stored)?,
                now,
                now,
            ],
        )?;

        stored.id = Some(id);
        Ok(stored)
    }

    // ==================== CONTACT READ ====================

    pub fn get_contact_by_id(&self, id: &str) -> Result<Option<Contact>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, data FROM contacts WHERE id = ?")?;

        let result = stmt.query_row([id], Self::row_to_contact);

        match result {
            Ok(contact) => Ok(Some(contact)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All contacts whose primary email matches, across every folder
    pub fn find_contacts_by_email(&self, email: &str) -> Result<Vec<Contact>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, data FROM contacts WHERE primary_email = ? ORDER BY rowid ASC",
        )?;

        let contacts = stmt
            .query_map([email.trim().to_lowercase()], Self::row_to_contact)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(contacts)
    }

    pub fn count_contacts(&self, folder_id: Option<&str>) -> Result<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM contacts WHERE folder_id IS ?",
            [folder_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn list_contacts_page(
        &self,
        folder_id: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Contact>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, data FROM contacts WHERE folder_id IS ? ORDER BY rowid ASC LIMIT ? OFFSET ?",
        )?;

        let contacts = stmt
            .query_map(params![folder_id, limit, offset], Self::row_to_contact)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(contacts)
    }

    // ==================== CONTACT UPDATE ====================

    pub fn replace_contact(&self, id: &str, contact: &Contact) -> Result<Contact> {
        let mut stored = contact.without_metadata();

        let rows = self.conn.execute(
            r#"UPDATE contacts
               SET display_name = ?, primary_email = ?, data = ?, updated_at = ?
               WHERE id = ?"#,
            params![
                stored.display_name,
                stored.primary_email().map(|e| e.trim().to_lowercase()),
                serde_json::to_string(&stored)?,
                Utc::now().to_rfc3339(),
                id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::store("update_contact", format!("no contact with id {}", id)));
        }

        stored.id = Some(id.to_string());
        Ok(stored)
    }

    fn row_to_contact(row: &Row) -> rusqlite::Result<Contact> {
        let id: String = row.get(0)?;
        let data: String = row.get(1)?;
        let mut contact: Contact = serde_json::from_str(&data).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?;
        contact.id = Some(id);
        Ok(contact)
    }
}

impl ContactStore for Database {
    fn list_folders(&self) -> Result<Vec<Folder>> {
        self.get_folders()
    }

    fn list_contacts(
        &self,
        folder_id: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<ContactPage> {
        let offset = match page_token {
            Some(token) => token.parse::<u32>().map_err(|_| {
                Error::store("list_contacts", format!("invalid page token '{}'", token))
            })?,
            None => 0,
        };

        let contacts = self.list_contacts_page(folder_id, self.page_size, offset)?;
        let next_page_token = if contacts.len() as u32 == self.page_size {
            Some((offset + self.page_size).to_string())
        } else {
            None
        };

        Ok(ContactPage {
            contacts,
            next_page_token,
        })
    }

    fn create_contact(&self, folder_id: Option<&str>, contact: &Contact) -> Result<Contact> {
        self.insert_contact(folder_id, contact)
    }

    fn update_contact(&self, id: &str, contact: &Contact) -> Result<Contact> {
        self.replace_contact(id, contact)
    }

    fn find_folder(&self, name: &str) -> Result<Option<Folder>> {
        self.get_folder_by_name(name)
    }

    fn create_folder(&self, name: &str) -> Result<Folder> {
        self.insert_folder(name)
    }
}
