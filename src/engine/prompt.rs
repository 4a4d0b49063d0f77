//! Interactive prompt sink
//!
//! The merge engine never talks to a terminal directly. Everything it needs
//! to ask goes through `Prompter`; the CLI implements it with inquire and
//! tests use `ScriptedPrompter`.

use std::collections::VecDeque;
use std::fmt;

use crate::error::{Error, Result};
use crate::models::Contact;

use super::merge::{FieldChoice, FieldPrompt};

/// Per-group decision offered in interactive mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupAction {
    Skip,
    /// Create the incoming record as a new contact anyway
    ImportSeparately,
    /// Walk the fields and build a merged record
    Merge,
    /// Overwrite the existing record with the incoming one, after confirmation
    Replace,
}

impl GroupAction {
    pub const ALL: [GroupAction; 4] = [
        Self::Skip,
        Self::ImportSeparately,
        Self::Merge,
        Self::Replace,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::ImportSeparately => "import as separate contact",
            Self::Merge => "merge fields",
            Self::Replace => "replace existing",
        }
    }
}

impl fmt::Display for GroupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the user sees when asked about one incoming duplicate
#[derive(Debug, Clone, Copy)]
pub struct GroupPrompt<'a> {
    pub key: &'a str,
    /// Every existing record with this key; the first one receives updates
    pub existing: &'a [Contact],
    pub incoming: &'a Contact,
}

/// Line-at-a-time request/response channel used by interactive merges
pub trait Prompter {
    fn choose_action(&mut self, group: &GroupPrompt<'_>) -> Result<GroupAction>;

    fn choose_field(&mut self, prompt: &FieldPrompt) -> Result<FieldChoice>;

    /// Yes/no question with the record the answer applies to
    fn confirm(&mut self, question: &str, preview: &Contact) -> Result<bool>;
}

/// One queued answer for `ScriptedPrompter`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedAnswer {
    Action(GroupAction),
    Field(FieldChoice),
    Confirm(bool),
}

/// Prompter that replays a fixed list of answers and counts what was asked
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<ScriptedAnswer>,
    asked: usize,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = ScriptedAnswer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: 0,
        }
    }

    /// Number of prompts received
    pub fn asked(&self) -> usize {
        self.asked
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, expected: &str) -> Result<ScriptedAnswer> {
        self.asked += 1;
        self.answers
            .pop_front()
            .ok_or_else(|| Error::Prompt(format!("no scripted answer left for {}", expected)))
    }
}

impl Prompter for ScriptedPrompter {
    fn choose_action(&mut self, _group: &GroupPrompt<'_>) -> Result<GroupAction> {
        match self.next("group action")? {
            ScriptedAnswer::Action(action) => Ok(action),
            other => Err(Error::Prompt(format!("expected a group action, got {:?}", other))),
        }
    }

    fn choose_field(&mut self, prompt: &FieldPrompt) -> Result<FieldChoice> {
        match self.next(prompt.field.label())? {
            ScriptedAnswer::Field(choice) => Ok(choice),
            other => Err(Error::Prompt(format!("expected a field choice, got {:?}", other))),
        }
    }

    fn confirm(&mut self, _question: &str, _preview: &Contact) -> Result<bool> {
        match self.next("confirmation")? {
            ScriptedAnswer::Confirm(yes) => Ok(yes),
            other => Err(Error::Prompt(format!("expected a confirmation, got {:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_answers_in_order() {
        let mut prompter = ScriptedPrompter::new([
            ScriptedAnswer::Action(GroupAction::Merge),
            ScriptedAnswer::Confirm(false),
        ]);
        let contact = Contact::new();
        let group = GroupPrompt {
            key: "a@b.com",
            existing: std::slice::from_ref(&contact),
            incoming: &contact,
        };

        assert_eq!(prompter.choose_action(&group).unwrap(), GroupAction::Merge);
        assert!(!prompter.confirm("ok?", &contact).unwrap());
        assert_eq!(prompter.asked(), 2);
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn exhausted_script_is_an_error() {
        let mut prompter = ScriptedPrompter::default();
        assert!(matches!(
            prompter.confirm("ok?", &Contact::new()),
            Err(Error::Prompt(_))
        ));
    }

    #[test]
    fn mismatched_answer_kind_is_an_error() {
        let mut prompter = ScriptedPrompter::new([ScriptedAnswer::Confirm(true)]);
        let contact = Contact::new();
        let group = GroupPrompt {
            key: "k",
            existing: &[],
            incoming: &contact,
        };
        assert!(prompter.choose_action(&group).is_err());
    }
}
