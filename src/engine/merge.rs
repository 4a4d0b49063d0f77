//! Field-level merge of a duplicate pair
//!
//! `FieldMerge` walks the mergeable fields in a fixed order. Fields that
//! already agree are kept without asking; every other field yields a
//! `Prompt` and waits for an `Answer`. Once all fields are settled the
//! merged copy is offered for a final yes/no. The existing record is never
//! modified; the result is a new value carrying the existing record's id.

use std::fmt;

use thiserror::Error;

use crate::models::Contact;

/// Fields the interactive merge walks through, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeField {
    DisplayName,
    CompanyName,
    JobTitle,
    Department,
    BusinessPhones,
    MobilePhone,
    HomePhones,
    PersonalNotes,
}

impl MergeField {
    pub const ALL: [MergeField; 8] = [
        Self::DisplayName,
        Self::CompanyName,
        Self::JobTitle,
        Self::Department,
        Self::BusinessPhones,
        Self::MobilePhone,
        Self::HomePhones,
        Self::PersonalNotes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::DisplayName => "display name",
            Self::CompanyName => "company",
            Self::JobTitle => "job title",
            Self::Department => "department",
            Self::BusinessPhones => "business phones",
            Self::MobilePhone => "mobile phone",
            Self::HomePhones => "home phones",
            Self::PersonalNotes => "notes",
        }
    }

    /// Whether both sides can be kept together
    pub fn is_combinable(self) -> bool {
        matches!(
            self,
            Self::BusinessPhones | Self::HomePhones | Self::PersonalNotes
        )
    }

    fn is_list(self) -> bool {
        matches!(self, Self::BusinessPhones | Self::HomePhones)
    }

    pub fn get(self, contact: &Contact) -> FieldValue {
        match self {
            Self::DisplayName => FieldValue::text(&contact.display_name),
            Self::CompanyName => FieldValue::text(&contact.company_name),
            Self::JobTitle => FieldValue::text(&contact.job_title),
            Self::Department => FieldValue::text(&contact.department),
            Self::BusinessPhones => FieldValue::list(&contact.business_phones),
            Self::MobilePhone => FieldValue::text(&contact.mobile_phone),
            Self::HomePhones => FieldValue::list(&contact.home_phones),
            Self::PersonalNotes => FieldValue::text(&contact.personal_notes),
        }
    }

    pub fn set(self, contact: &mut Contact, value: FieldValue) {
        match self {
            Self::DisplayName => contact.display_name = value.into_option(),
            Self::CompanyName => contact.company_name = value.into_option(),
            Self::JobTitle => contact.job_title = value.into_option(),
            Self::Department => contact.department = value.into_option(),
            Self::BusinessPhones => contact.business_phones = value.into_list(),
            Self::MobilePhone => contact.mobile_phone = value.into_option(),
            Self::HomePhones => contact.home_phones = value.into_list(),
            Self::PersonalNotes => contact.personal_notes = value.into_option(),
        }
    }

    fn empty_value(self) -> FieldValue {
        if self.is_list() {
            FieldValue::List(Vec::new())
        } else {
            FieldValue::Text(String::new())
        }
    }
}

impl fmt::Display for MergeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A field's value, normalized for comparison (trimmed, blanks removed)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    fn text(value: &Option<String>) -> Self {
        Self::Text(value.as_deref().unwrap_or("").trim().to_string())
    }

    fn list(values: &[String]) -> Self {
        Self::List(
            values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    fn into_option(self) -> Option<String> {
        let text = match self {
            Self::Text(s) => s,
            Self::List(items) => items.join("; "),
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn into_list(self) -> Vec<String> {
        match self {
            Self::Text(s) if s.is_empty() => Vec::new(),
            Self::Text(s) => vec![s],
            Self::List(items) => items,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(empty)");
        }
        match self {
            Self::Text(s) => f.write_str(s),
            Self::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

/// Resolution for one differing field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldChoice {
    KeepExisting,
    UseNew,
    /// Clear the field on the merged record
    Clear,
    /// Union for phone lists, "a; b" for notes
    Combine,
}

impl FieldChoice {
    pub fn label(self) -> &'static str {
        match self {
            Self::KeepExisting => "keep existing",
            Self::UseNew => "use new",
            Self::Clear => "skip field (clear)",
            Self::Combine => "combine both",
        }
    }
}

impl fmt::Display for FieldChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A differing field waiting for a decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPrompt {
    pub field: MergeField,
    pub existing: FieldValue,
    pub incoming: FieldValue,
    pub choices: Vec<FieldChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Field(FieldPrompt),
    /// Final yes/no on the fully merged record
    Confirm { merged: Contact },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Field(FieldChoice),
    Confirm(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Declined at confirmation; the existing record stays as it was
    Skipped,
    /// Merged copy tagged with the existing record's id
    Merged(Contact),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Prompt(Prompt),
    Done(Resolution),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("merge is not waiting for an answer")]
    NotWaiting,

    #[error("answer does not fit the pending prompt")]
    UnexpectedAnswer,

    #[error("'{choice}' is not offered for {field}")]
    ChoiceNotOffered {
        field: MergeField,
        choice: FieldChoice,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ready,
    AwaitingField(MergeField),
    AwaitingConfirm,
    Finished,
}

/// Interactive merge session for one (existing, incoming) pair
#[derive(Debug, Clone)]
pub struct FieldMerge {
    existing: Contact,
    incoming: Contact,
    merged: Contact,
    next_field: usize,
    differing: usize,
    prompts: usize,
    state: State,
}

impl FieldMerge {
    pub fn new(existing: &Contact, incoming: &Contact) -> Self {
        Self {
            existing: existing.clone(),
            incoming: incoming.clone(),
            merged: existing.clone(),
            next_field: 0,
            differing: 0,
            prompts: 0,
            state: State::Ready,
        }
    }

    /// Run until the first prompt, or to completion when nothing differs
    pub fn start(&mut self) -> Step {
        if self.state != State::Ready {
            return self.current();
        }
        self.advance()
    }

    /// Feed the answer to the pending prompt and run to the next one
    pub fn resume(&mut self, answer: Answer) -> Result<Step, MergeError> {
        match (self.state, answer) {
            (State::AwaitingField(field), Answer::Field(choice)) => {
                self.apply(field, choice)?;
                Ok(self.advance())
            }
            (State::AwaitingConfirm, Answer::Confirm(accepted)) => {
                self.state = State::Finished;
                if accepted {
                    Ok(Step::Done(Resolution::Merged(self.merged.clone())))
                } else {
                    Ok(Step::Done(Resolution::Skipped))
                }
            }
            (State::Ready, _) | (State::Finished, _) => Err(MergeError::NotWaiting),
            _ => Err(MergeError::UnexpectedAnswer),
        }
    }

    /// Prompts handed out so far, including the final confirmation
    pub fn prompts_issued(&self) -> usize {
        self.prompts
    }

    /// The merged copy as it stands
    pub fn merged(&self) -> &Contact {
        &self.merged
    }

    fn current(&self) -> Step {
        match self.state {
            State::AwaitingField(field) => Step::Prompt(Prompt::Field(self.field_prompt(field))),
            State::AwaitingConfirm => Step::Prompt(Prompt::Confirm {
                merged: self.merged.clone(),
            }),
            _ => Step::Done(Resolution::Merged(self.merged.clone())),
        }
    }

    fn advance(&mut self) -> Step {
        while let Some(&field) = MergeField::ALL.get(self.next_field) {
            self.next_field += 1;
            if field.get(&self.existing) == field.get(&self.incoming) {
                continue;
            }
            self.differing += 1;
            self.prompts += 1;
            self.state = State::AwaitingField(field);
            return Step::Prompt(Prompt::Field(self.field_prompt(field)));
        }

        if self.differing == 0 {
            self.state = State::Finished;
            return Step::Done(Resolution::Merged(self.merged.clone()));
        }

        self.prompts += 1;
        self.state = State::AwaitingConfirm;
        Step::Prompt(Prompt::Confirm {
            merged: self.merged.clone(),
        })
    }

    fn field_prompt(&self, field: MergeField) -> FieldPrompt {
        let existing = field.get(&self.existing);
        let incoming = field.get(&self.incoming);
        FieldPrompt {
            field,
            choices: choices_for(field, &existing, &incoming),
            existing,
            incoming,
        }
    }

    fn apply(&mut self, field: MergeField, choice: FieldChoice) -> Result<(), MergeError> {
        let existing = field.get(&self.existing);
        let incoming = field.get(&self.incoming);
        if !choices_for(field, &existing, &incoming).contains(&choice) {
            return Err(MergeError::ChoiceNotOffered { field, choice });
        }

        match choice {
            FieldChoice::KeepExisting => {}
            FieldChoice::UseNew => field.set(&mut self.merged, incoming),
            FieldChoice::Clear => field.set(&mut self.merged, field.empty_value()),
            FieldChoice::Combine => field.set(&mut self.merged, combine(&existing, &incoming)),
        }
        Ok(())
    }
}

fn choices_for(field: MergeField, existing: &FieldValue, incoming: &FieldValue) -> Vec<FieldChoice> {
    let mut choices = vec![
        FieldChoice::KeepExisting,
        FieldChoice::UseNew,
        FieldChoice::Clear,
    ];
    if field.is_combinable() && !existing.is_empty() && !incoming.is_empty() {
        choices.push(FieldChoice::Combine);
    }
    choices
}

fn combine(existing: &FieldValue, incoming: &FieldValue) -> FieldValue {
    match (existing, incoming) {
        (FieldValue::List(a), FieldValue::List(b)) => FieldValue::List(combine_lists(a, b)),
        (FieldValue::Text(a), FieldValue::Text(b)) => FieldValue::Text(combine_notes(a, b)),
        (a, b) => FieldValue::List(combine_lists(&a.clone().into_list(), &b.clone().into_list())),
    }
}

/// Union of two lists, existing order first, duplicates dropped
pub fn combine_lists(existing: &[String], incoming: &[String]) -> Vec<String> {
    let mut combined: Vec<String> = Vec::with_capacity(existing.len() + incoming.len());
    for item in existing.iter().chain(incoming) {
        let item = item.trim();
        if !item.is_empty() && !combined.iter().any(|c| c == item) {
            combined.push(item.to_string());
        }
    }
    combined
}

/// Notes are concatenated with "; "
pub fn combine_notes(existing: &str, incoming: &str) -> String {
    match (existing.trim(), incoming.trim()) {
        ("", b) => b.to_string(),
        (a, "") => a.to_string(),
        (a, b) => format!("{}; {}", a, b),
    }
}

/// Non-interactive merge: start from the existing record and fill only the
/// fields it leaves empty from the incoming one. Populated fields are never
/// overwritten.
pub fn auto_merge(existing: &Contact, incoming: &Contact) -> Contact {
    let mut merged = existing.clone();

    fill_text(&mut merged.display_name, &incoming.display_name);
    fill_text(&mut merged.given_name, &incoming.given_name);
    fill_text(&mut merged.surname, &incoming.surname);
    fill_text(&mut merged.middle_name, &incoming.middle_name);
    fill_text(&mut merged.company_name, &incoming.company_name);
    fill_text(&mut merged.job_title, &incoming.job_title);
    fill_text(&mut merged.department, &incoming.department);
    fill_text(&mut merged.mobile_phone, &incoming.mobile_phone);
    fill_text(&mut merged.personal_notes, &incoming.personal_notes);

    fill_list(&mut merged.business_phones, &incoming.business_phones);
    fill_list(&mut merged.home_phones, &incoming.home_phones);
    if merged.email_addresses.is_empty() {
        merged.email_addresses = incoming.email_addresses.clone();
    }

    if merged.business_address.as_ref().map_or(true, |a| a.is_empty()) {
        if let Some(address) = incoming.business_address.as_ref().filter(|a| !a.is_empty()) {
            merged.business_address = Some(address.clone());
        }
    }
    if merged.home_address.as_ref().map_or(true, |a| a.is_empty()) {
        if let Some(address) = incoming.home_address.as_ref().filter(|a| !a.is_empty()) {
            merged.home_address = Some(address.clone());
        }
    }
    if merged.birthday.is_none() {
        merged.birthday = incoming.birthday;
    }

    merged
}

/// Incoming content in full, keeping the existing record's id and folder
pub fn replace_with(existing: &Contact, incoming: &Contact) -> Contact {
    let mut replaced = incoming.clone();
    replaced.id = existing.id.clone();
    replaced.source_folder = existing.source_folder.clone();
    replaced
}

fn fill_text(target: &mut Option<String>, source: &Option<String>) {
    let target_empty = target.as_deref().map_or(true, |s| s.trim().is_empty());
    if target_empty {
        if let Some(value) = source.as_deref().filter(|s| !s.trim().is_empty()) {
            *target = Some(value.to_string());
        }
    }
}

fn fill_list(target: &mut Vec<String>, source: &[String]) {
    if target.iter().all(|s| s.trim().is_empty()) && source.iter().any(|s| !s.trim().is_empty()) {
        *target = source.to_vec();
    }
}
