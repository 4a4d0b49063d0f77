use crate::models::Contact;

/// Print a contact with clean formatting (only non-empty fields)
pub fn print_contact(contact: &Contact) {
    for line in contact_lines(contact) {
        println!("{}", line);
    }
}

/// Lines shown for a contact: the name, then indented details
pub fn contact_lines(contact: &Contact) -> Vec<String> {
    let mut lines = vec![contact.label()];

    // Organization
    let org = [contact.company_name.as_deref(), contact.department.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    match (contact.job_title.as_deref().filter(|t| !t.trim().is_empty()), org.is_empty()) {
        (Some(title), false) => lines.push(format!("  {} at {}", title, org)),
        (Some(title), true) => lines.push(format!("  {}", title)),
        (None, false) => lines.push(format!("  {}", org)),
        (None, true) => {}
    }

    for email in &contact.email_addresses {
        lines.push(format!("  {}", email.address));
    }

    for phone in &contact.business_phones {
        lines.push(format!("  {} (work)", phone));
    }
    if let Some(mobile) = contact.mobile_phone.as_deref().filter(|m| !m.trim().is_empty()) {
        lines.push(format!("  {} (mobile)", mobile));
    }
    for phone in &contact.home_phones {
        lines.push(format!("  {} (home)", phone));
    }

    for addr in [&contact.business_address, &contact.home_address].into_iter().flatten() {
        if !addr.is_empty() {
            lines.push(format!("  {}", addr.one_line()));
        }
    }

    if let Some(birthday) = contact.birthday {
        lines.push(format!("  born {}", birthday.format("%Y-%m-%d")));
    }

    // Notes (truncated)
    if let Some(notes) = contact.personal_notes.as_deref().filter(|n| !n.is_empty()) {
        lines.push(format!("  {}", super::ui::truncate(notes, 60)));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PhysicalAddress;

    #[test]
    fn test_only_filled_fields_are_listed() {
        let mut c = Contact::new();
        c.display_name = Some("Ada".into());
        c.job_title = Some("Countess".into());
        c.company_name = Some("Engines".into());
        c.add_email("ada@x.com");
        c.mobile_phone = Some("555-0099".into());

        let lines = contact_lines(&c);
        assert_eq!(
            lines,
            vec![
                "Ada".to_string(),
                "  Countess at Engines".to_string(),
                "  ada@x.com".to_string(),
                "  555-0099 (mobile)".to_string(),
            ]
        );
    }

    #[test]
    fn test_address_on_one_line() {
        let mut c = Contact::new();
        c.display_name = Some("Bob".into());
        c.home_address = Some(PhysicalAddress {
            city: Some("Portland".into()),
            state: Some("OR".into()),
            ..PhysicalAddress::default()
        });

        let lines = contact_lines(&c);
        assert_eq!(lines[1], "  Portland, OR");
    }
}
