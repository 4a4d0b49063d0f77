//! CSV address-book exports (Outlook and Google style headers)

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use ::csv::{ReaderBuilder, StringRecord, Trim};
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{Contact, PhysicalAddress};

/// Canonical field a CSV column feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvField {
    DisplayName,
    GivenName,
    MiddleName,
    Surname,
    Company,
    JobTitle,
    Department,
    Email,
    BusinessPhone,
    HomePhone,
    MobilePhone,
    BusinessStreet,
    BusinessCity,
    BusinessState,
    BusinessPostalCode,
    BusinessCountry,
    HomeStreet,
    HomeCity,
    HomeState,
    HomePostalCode,
    HomeCountry,
    Notes,
    Birthday,
}

impl CsvField {
    /// Canonical names accepted in `csv_columns` overrides
    pub fn parse(s: &str) -> Option<Self> {
        let field = match s.trim().to_lowercase().as_str() {
            "display_name" => Self::DisplayName,
            "given_name" | "first_name" => Self::GivenName,
            "middle_name" => Self::MiddleName,
            "surname" | "last_name" => Self::Surname,
            "company" | "company_name" => Self::Company,
            "job_title" => Self::JobTitle,
            "department" => Self::Department,
            "email" => Self::Email,
            "business_phone" => Self::BusinessPhone,
            "home_phone" => Self::HomePhone,
            "mobile_phone" => Self::MobilePhone,
            "business_street" => Self::BusinessStreet,
            "business_city" => Self::BusinessCity,
            "business_state" => Self::BusinessState,
            "business_postal_code" => Self::BusinessPostalCode,
            "business_country" => Self::BusinessCountry,
            "home_street" => Self::HomeStreet,
            "home_city" => Self::HomeCity,
            "home_state" => Self::HomeState,
            "home_postal_code" => Self::HomePostalCode,
            "home_country" => Self::HomeCountry,
            "notes" | "personal_notes" => Self::Notes,
            "birthday" => Self::Birthday,
            _ => return None,
        };
        Some(field)
    }

    /// Built-in header table. Headers are compared lowercased.
    fn from_header(header: &str) -> Option<Self> {
        if let Some(field) = Self::parse(header) {
            return Some(field);
        }

        let field = match header {
            "name" | "display name" | "full name" => Self::DisplayName,
            "first name" | "given name" => Self::GivenName,
            "middle name" | "additional name" => Self::MiddleName,
            "last name" | "family name" => Self::Surname,
            "company" | "organization" | "organization 1 - name" => Self::Company,
            "job title" | "organization 1 - title" => Self::JobTitle,
            "department" | "organization 1 - department" => Self::Department,
            "e-mail address" | "e-mail 2 address" | "e-mail 3 address" | "email address"
            | "e-mail 1 - value" | "e-mail 2 - value" | "e-mail 3 - value" => Self::Email,
            "business phone" | "business phone 2" | "company main phone" | "work phone"
            | "phone 1 - value" => Self::BusinessPhone,
            "home phone" | "home phone 2" | "phone 2 - value" => Self::HomePhone,
            "mobile phone" | "cell phone" | "mobile" => Self::MobilePhone,
            "business street" | "work street" => Self::BusinessStreet,
            "business city" | "work city" => Self::BusinessCity,
            "business state" | "work state" => Self::BusinessState,
            "business postal code" | "work postal code" | "business zip" => Self::BusinessPostalCode,
            "business country/region" | "business country" | "work country" => Self::BusinessCountry,
            "home street" => Self::HomeStreet,
            "home city" => Self::HomeCity,
            "home state" => Self::HomeState,
            "home postal code" | "home zip" => Self::HomePostalCode,
            "home country/region" | "home country" => Self::HomeCountry,
            "notes" => Self::Notes,
            "birthday" => Self::Birthday,
            _ => return None,
        };
        Some(field)
    }
}

/// Parse a CSV file with a header row.
///
/// `columns` maps extra header names to canonical field names and wins
/// over the built-in table.
pub fn parse_csv(path: &Path, columns: &HashMap<String, String>) -> Result<Vec<Contact>> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    parse_csv_reader(file, columns)
}

pub fn parse_csv_reader<R: Read>(reader: R, columns: &HashMap<String, String>) -> Result<Vec<Contact>> {
    let overrides = column_overrides(columns)?;

    let mut csv_reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(Error::UnsupportedFormat("CSV file has no header row".into()));
    }

    let mapping: Vec<Option<CsvField>> = headers
        .iter()
        .map(|h| {
            let key = h.trim().to_lowercase();
            overrides.get(&key).copied().or_else(|| CsvField::from_header(&key))
        })
        .collect();

    let ignored: Vec<&str> = headers
        .iter()
        .zip(&mapping)
        .filter(|(_, f)| f.is_none())
        .map(|(h, _)| h)
        .collect();
    if !ignored.is_empty() {
        debug!(columns = ?ignored, "ignoring unmapped CSV columns");
    }

    let mut contacts = Vec::new();
    for (idx, record) in csv_reader.records().enumerate() {
        let record = record?;
        contacts.push(row_to_contact(&record, &mapping, idx + 2));
    }
    Ok(contacts)
}

fn column_overrides(columns: &HashMap<String, String>) -> Result<HashMap<String, CsvField>> {
    columns
        .iter()
        .map(|(header, field)| {
            let parsed = CsvField::parse(field).ok_or_else(|| {
                Error::Config(format!("csv_columns: unknown field '{}' for column '{}'", field, header))
            })?;
            Ok((header.trim().to_lowercase(), parsed))
        })
        .collect()
}

fn row_to_contact(record: &StringRecord, mapping: &[Option<CsvField>], line: usize) -> Contact {
    let mut contact = Contact::new();
    let mut business = PhysicalAddress::default();
    let mut home = PhysicalAddress::default();

    for (value, field) in record.iter().zip(mapping) {
        let Some(field) = field else { continue };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match field {
            CsvField::DisplayName => set_once(&mut contact.display_name, value),
            CsvField::GivenName => set_once(&mut contact.given_name, value),
            CsvField::MiddleName => set_once(&mut contact.middle_name, value),
            CsvField::Surname => set_once(&mut contact.surname, value),
            CsvField::Company => set_once(&mut contact.company_name, value),
            CsvField::JobTitle => set_once(&mut contact.job_title, value),
            CsvField::Department => set_once(&mut contact.department, value),
            // Google packs several values into one cell
            CsvField::Email => {
                for address in value.split(":::") {
                    contact.add_email(address);
                }
            }
            CsvField::BusinessPhone => push_phones(&mut contact.business_phones, value),
            CsvField::HomePhone => push_phones(&mut contact.home_phones, value),
            CsvField::MobilePhone => set_once(&mut contact.mobile_phone, value),
            CsvField::BusinessStreet => set_once(&mut business.street, value),
            CsvField::BusinessCity => set_once(&mut business.city, value),
            CsvField::BusinessState => set_once(&mut business.state, value),
            CsvField::BusinessPostalCode => set_once(&mut business.postal_code, value),
            CsvField::BusinessCountry => set_once(&mut business.country, value),
            CsvField::HomeStreet => set_once(&mut home.street, value),
            CsvField::HomeCity => set_once(&mut home.city, value),
            CsvField::HomeState => set_once(&mut home.state, value),
            CsvField::HomePostalCode => set_once(&mut home.postal_code, value),
            CsvField::HomeCountry => set_once(&mut home.country, value),
            CsvField::Notes => set_once(&mut contact.personal_notes, value),
            CsvField::Birthday => match parse_birthday(value) {
                Some(date) => contact.birthday = Some(date),
                None => warn!(line, value, "ignoring unreadable birthday"),
            },
        }
    }

    if !business.is_empty() {
        contact.business_address = Some(business);
    }
    if !home.is_empty() {
        contact.home_address = Some(home);
    }
    contact
}

fn set_once(slot: &mut Option<String>, value: &str) {
    if slot.is_none() {
        *slot = Some(value.to_string());
    }
}

fn push_phones(phones: &mut Vec<String>, value: &str) {
    for phone in value.split(":::").map(str::trim).filter(|p| !p.is_empty()) {
        if !phones.iter().any(|p| p == phone) {
            phones.push(phone.to_string());
        }
    }
}

/// Outlook writes `0/0/00` for "no birthday"
fn parse_birthday(value: &str) -> Option<NaiveDate> {
    ["%Y-%m-%d", "%m/%d/%Y", "%Y%m%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}
