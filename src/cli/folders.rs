use anyhow::Result;
use crossterm::style::Stylize;

use crate::db::Database;
use crate::engine::index::{build_index, ContactIndex};

/// Execute the folders command.
pub fn run_folders(db: &Database) -> Result<()> {
    let index = build_index(db)?;
    for line in folder_lines(&index) {
        println!("{}", line);
    }
    Ok(())
}

/// Execute the duplicates command. Read only.
pub fn run_duplicates(db: &Database) -> Result<()> {
    let index = build_index(db)?;
    let groups = index.existing_duplicates();

    if groups.is_empty() {
        println!("No duplicates.");
        return Ok(());
    }

    for (key, records) in &groups {
        println!("{}", key.as_str().bold());
        for record in records {
            println!(
                "  {}  [{}]",
                record.label(),
                record.source_folder_name().unwrap_or("?")
            );
        }
    }
    println!("\n{} shared email addresses", groups.len());
    Ok(())
}

fn folder_lines(index: &ContactIndex) -> Vec<String> {
    index
        .folder_counts
        .iter()
        .map(|folder| {
            if folder.failed {
                format!("{:>6}  {} (unreadable)", "-", folder.name)
            } else {
                format!("{:>6}  {}", folder.count, folder.name)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Contact;
    use crate::store::ContactStore;

    #[test]
    fn test_folder_lines() {
        let db = Database::open_memory().unwrap();
        let vendors = db.insert_folder("Vendors").unwrap();
        let mut c = Contact::new();
        c.display_name = Some("Ann".into());
        db.create_contact(Some(vendors.id.as_str()), &c).unwrap();

        let index = build_index(&db).unwrap();
        let lines = folder_lines(&index);
        assert_eq!(lines, vec!["     0  Contacts", "     1  Vendors"]);
    }
}
