//! vCard 2.1 / 3.0 / 4.0 reader
//!
//! Covers the properties that have a home in `Contact`; everything else is
//! skipped. Grouped names (`item1.EMAIL`) are treated as ungrouped. 2.1
//! quoted-printable values are decoded as UTF-8, soft line breaks included.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{AddressKind, Contact, PhysicalAddress};

/// One unfolded content line
#[derive(Debug)]
struct Property {
    name: String,
    types: Vec<String>,
    value: String,
}

impl Property {
    fn has_type(&self, t: &str) -> bool {
        self.types.iter().any(|x| x == t)
    }
}

pub fn parse_vcard(path: &Path) -> Result<Vec<Contact>> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    parse_vcard_str(&text)
}

pub fn parse_vcard_str(text: &str) -> Result<Vec<Contact>> {
    let mut contacts = Vec::new();
    let mut current: Option<(usize, Contact)> = None;

    for (line_no, line) in unfold(text) {
        if line.trim().is_empty() {
            continue;
        }
        let prop = parse_property(&line, line_no)?;

        match prop.name.as_str() {
            "BEGIN" if prop.value.eq_ignore_ascii_case("VCARD") => {
                if current.is_some() {
                    return Err(vcard_error(line_no, "BEGIN:VCARD inside another card"));
                }
                current = Some((line_no, Contact::new()));
            }
            "END" if prop.value.eq_ignore_ascii_case("VCARD") => match current.take() {
                Some((_, contact)) => contacts.push(contact),
                None => return Err(vcard_error(line_no, "END:VCARD without BEGIN:VCARD")),
            },
            _ => match current.as_mut() {
                Some((_, contact)) => apply(contact, &prop, line_no),
                None => return Err(vcard_error(line_no, "property outside BEGIN:VCARD")),
            },
        }
    }

    if let Some((start, _)) = current {
        return Err(vcard_error(start, "card is missing END:VCARD"));
    }
    Ok(contacts)
}

fn vcard_error(line: usize, message: &str) -> Error {
    Error::VCard {
        line,
        message: message.to_string(),
    }
}

/// Join folded lines and quoted-printable soft breaks. Returns each logical
/// line with the 1-based number of the physical line it started on.
fn unfold(text: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        if let Some((_, last)) = lines.last_mut() {
            if last.ends_with('=') && is_quoted_printable(last) {
                last.pop();
                last.push_str(raw);
                continue;
            }
            if raw.starts_with(' ') || raw.starts_with('\t') {
                last.push_str(&raw[1..]);
                continue;
            }
        }
        lines.push((idx + 1, raw.to_string()));
    }
    lines
}

fn is_quoted_printable(line: &str) -> bool {
    line.split_once(':')
        .map_or(false, |(head, _)| head.to_uppercase().contains("QUOTED-PRINTABLE"))
}

/// `=XX` escapes to bytes; anything malformed is kept as written
fn decode_quoted_printable(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'=' {
            let hex = value.get(i + 1..i + 3).and_then(|h| u8::from_str_radix(h, 16).ok());
            if let Some(byte) = hex {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn parse_property(line: &str, line_no: usize) -> Result<Property> {
    let mut in_quotes = false;
    let colon = line.char_indices().find_map(|(i, c)| match c {
        '"' => {
            in_quotes = !in_quotes;
            None
        }
        ':' if !in_quotes => Some(i),
        _ => None,
    });
    let Some(colon) = colon else {
        return Err(vcard_error(line_no, &format!("expected NAME:value, got '{}'", line)));
    };

    let (head, value) = (&line[..colon], &line[colon + 1..]);
    let mut parts = head.split(';');
    let name = parts.next().unwrap_or_default();
    let name = name.rsplit('.').next().unwrap_or(name).trim().to_uppercase();

    let mut types = Vec::new();
    let mut quoted_printable = false;
    for param in parts {
        match param.split_once('=') {
            Some((key, val)) if key.trim().eq_ignore_ascii_case("ENCODING") => {
                quoted_printable = val.trim().eq_ignore_ascii_case("QUOTED-PRINTABLE");
            }
            Some((key, val)) if key.trim().eq_ignore_ascii_case("TYPE") => {
                types.extend(
                    val.trim_matches('"')
                        .split(',')
                        .map(|t| t.trim().to_uppercase()),
                );
            }
            Some(_) => {}
            None if param.trim().eq_ignore_ascii_case("QUOTED-PRINTABLE") => quoted_printable = true,
            // 2.1 bare parameters: TEL;WORK;VOICE:...
            None => types.push(param.trim().to_uppercase()),
        }
    }

    let value = if quoted_printable {
        decode_quoted_printable(value)
    } else {
        value.to_string()
    };
    Ok(Property { name, types, value })
}

/// Split a value on unescaped `sep` and unescape each component
fn components(value: &str, sep: Option<char>) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n' | 'N') => current.push('\n'),
                Some(other) => current.push(other),
                None => {}
            },
            c if Some(c) == sep => out.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    out.push(current);
    out.into_iter().map(|s| s.trim().to_string()).collect()
}

fn text(value: &str) -> Option<String> {
    components(value, None)
        .into_iter()
        .next()
        .filter(|s| !s.is_empty())
}

fn nth(parts: &[String], i: usize) -> Option<String> {
    parts.get(i).filter(|s| !s.is_empty()).cloned()
}

fn apply(contact: &mut Contact, prop: &Property, line_no: usize) {
    match prop.name.as_str() {
        "FN" => contact.display_name = text(&prop.value),
        "N" => {
            let parts = components(&prop.value, Some(';'));
            contact.surname = nth(&parts, 0);
            contact.given_name = nth(&parts, 1);
            contact.middle_name = nth(&parts, 2);
        }
        "ORG" => {
            let parts = components(&prop.value, Some(';'));
            contact.company_name = nth(&parts, 0);
            contact.department = nth(&parts, 1);
        }
        "TITLE" => contact.job_title = text(&prop.value),
        "EMAIL" => {
            if let Some(address) = text(&prop.value) {
                contact.add_email(address);
            }
        }
        "TEL" => {
            let Some(number) = text(&prop.value) else { return };
            let number = number.trim_start_matches("tel:").to_string();
            if prop.has_type("FAX") {
                debug!(line = line_no, "skipping fax number");
            } else if prop.has_type("CELL") && contact.mobile_phone.is_none() {
                contact.mobile_phone = Some(number);
            } else if prop.has_type("HOME") {
                contact.home_phones.push(number);
            } else {
                contact.business_phones.push(number);
            }
        }
        "ADR" => {
            let parts = components(&prop.value, Some(';'));
            // pobox;extended;street;city;region;postal code;country
            let address = PhysicalAddress {
                street: nth(&parts, 2),
                city: nth(&parts, 3),
                state: nth(&parts, 4),
                postal_code: nth(&parts, 5),
                country: nth(&parts, 6),
            };
            if address.is_empty() {
                return;
            }
            let kind = if prop.has_type("HOME") {
                AddressKind::Home
            } else {
                AddressKind::Business
            };
            contact.address_mut(kind).get_or_insert(address);
        }
        "NOTE" => {
            if let Some(note) = text(&prop.value) {
                contact.personal_notes = Some(match contact.personal_notes.take() {
                    Some(existing) => format!("{}; {}", existing, note),
                    None => note,
                });
            }
        }
        "BDAY" => match parse_bday(&prop.value) {
            Some(date) => contact.birthday = Some(date),
            None => warn!(line = line_no, value = %prop.value, "ignoring unreadable BDAY"),
        },
        _ => {}
    }
}

fn parse_bday(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value.get(..8).unwrap_or(value), "%Y%m%d"))
        .ok()
}
