//! Strategy selection for duplicate groups
//!
//! Turns a duplicate group into one `Outcome` per incoming record. Updates
//! always target the first existing record of the group; any further
//! existing matches are reported but left untouched.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::classify::DuplicateGroup;
use super::merge::{auto_merge, replace_with, Answer, FieldMerge, Prompt, Resolution, Step};
use super::prompt::{GroupAction, GroupPrompt, Prompter};
use crate::error::{Error, Result};
use crate::models::Contact;

/// Run-wide handling of duplicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Leave existing records alone and drop the incoming duplicate
    #[default]
    Skip,
    /// Incoming records replace their existing matches without comparison
    Overwrite,
    /// Fill gaps automatically, or walk the fields when interactive
    Merge,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Overwrite => "overwrite",
            Self::Merge => "merge",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Some(Self::Skip),
            "overwrite" | "replace" => Some(Self::Overwrite),
            "merge" => Some(Self::Merge),
            _ => None,
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with one incoming duplicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Discard the incoming record
    Skip,
    /// Nothing would change on the existing record
    Unchanged,
    /// Create the incoming record as a new contact
    Create(Contact),
    /// Update the existing record with this content
    Update { id: String, contact: Contact },
}

/// Resolve every incoming record of a group.
///
/// Several incoming records with the same key are applied one after the
/// other, each against the result of the previous one. `prompter` is only
/// consulted when `interactive` is set and must then be present.
pub fn resolve_group<T: Borrow<Contact>>(
    group: &DuplicateGroup<T>,
    strategy: MergeStrategy,
    interactive: bool,
    mut prompter: Option<&mut (dyn Prompter + '_)>,
) -> Result<Vec<Outcome>> {
    let target = group
        .target()
        .ok_or_else(|| Error::store("merge", format!("no existing record for {}", group.key)))?;
    let target_id = target
        .id
        .clone()
        .ok_or_else(|| Error::store("merge", format!("existing record for {} has no id", group.key)))?;

    let mut current = target.clone();
    let mut outcomes = Vec::with_capacity(group.incoming.len());

    for incoming in &group.incoming {
        let incoming = incoming.borrow();
        let outcome = if interactive {
            let prompter = prompter
                .as_deref_mut()
                .ok_or_else(|| Error::Prompt("interactive merge needs a prompter".into()))?;
            resolve_interactive(group, &current, incoming, prompter)?
        } else {
            resolve_automatic(strategy, &current, incoming)
        };

        let outcome = match outcome {
            PairOutcome::Skip => Outcome::Skip,
            PairOutcome::Separate => Outcome::Create(incoming.without_metadata()),
            PairOutcome::Write(contact) if same_content(&contact, &current) => Outcome::Unchanged,
            PairOutcome::Write(contact) | PairOutcome::Replace(contact) => {
                current = contact.clone();
                Outcome::Update {
                    id: target_id.clone(),
                    contact,
                }
            }
        };

        debug!(key = %group.key, outcome = ?outcome_name(&outcome), "resolved duplicate");
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

enum PairOutcome {
    Skip,
    Separate,
    /// Merged content, written only when it differs from the current record
    Write(Contact),
    /// Replacement content, always written
    Replace(Contact),
}

fn resolve_automatic(strategy: MergeStrategy, current: &Contact, incoming: &Contact) -> PairOutcome {
    match strategy {
        MergeStrategy::Skip => PairOutcome::Skip,
        MergeStrategy::Overwrite => PairOutcome::Replace(replace_with(current, incoming)),
        MergeStrategy::Merge => PairOutcome::Write(auto_merge(current, incoming)),
    }
}

fn resolve_interactive<T>(
    group: &DuplicateGroup<T>,
    current: &Contact,
    incoming: &Contact,
    prompter: &mut dyn Prompter,
) -> Result<PairOutcome> {
    let view = GroupPrompt {
        key: &group.key,
        existing: &group.existing,
        incoming,
    };

    match prompter.choose_action(&view)? {
        GroupAction::Skip => Ok(PairOutcome::Skip),
        GroupAction::ImportSeparately => Ok(PairOutcome::Separate),
        GroupAction::Replace => {
            let replaced = replace_with(current, incoming);
            let question = format!("Replace {} with the incoming record?", current.label());
            if prompter.confirm(&question, &replaced)? {
                Ok(PairOutcome::Replace(replaced))
            } else {
                Ok(PairOutcome::Skip)
            }
        }
        GroupAction::Merge => match run_field_merge(current, incoming, prompter)? {
            Resolution::Skipped => Ok(PairOutcome::Skip),
            Resolution::Merged(merged) => Ok(PairOutcome::Write(merged)),
        },
    }
}

/// Drive a `FieldMerge` session to completion with the given prompter
pub fn run_field_merge(
    existing: &Contact,
    incoming: &Contact,
    prompter: &mut dyn Prompter,
) -> Result<Resolution> {
    let mut session = FieldMerge::new(existing, incoming);
    let mut step = session.start();

    loop {
        step = match step {
            Step::Done(resolution) => return Ok(resolution),
            Step::Prompt(Prompt::Field(prompt)) => {
                let choice = prompter.choose_field(&prompt)?;
                session.resume(Answer::Field(choice))?
            }
            Step::Prompt(Prompt::Confirm { merged }) => {
                let accepted = prompter.confirm("Save merged contact?", &merged)?;
                session.resume(Answer::Confirm(accepted))?
            }
        };
    }
}

fn same_content(a: &Contact, b: &Contact) -> bool {
    a.without_metadata() == b.without_metadata()
}

fn outcome_name(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Skip => "skip",
        Outcome::Unchanged => "unchanged",
        Outcome::Create(_) => "create",
        Outcome::Update { .. } => "update",
    }
}
