//! Shared UI primitives for contactmerge
//!
//! Design principles:
//! - Minimal: Show only what's needed
//! - Clean: No decorative borders or lines
//! - Consistent: Same patterns everywhere
//!
//! Conventions:
//! - Prompts: lowercase with colon and space: `action: `
//! - Feedback: single word when possible: `Skipped.`

use crossterm::style::Stylize;
use inquire::{ui::RenderConfig, Confirm, InquireError, Select};

use crate::engine::merge::{FieldChoice, FieldPrompt};
use crate::engine::prompt::{GroupAction, GroupPrompt, Prompter};
use crate::error::{Error, Result};
use crate::models::Contact;

use super::display::print_contact;

// ============================================================================
// Layout Primitives
// ============================================================================

/// Get terminal dimensions (width, height).
/// Falls back to 80x24 for pipes/non-TTY.
pub fn term_size() -> (usize, usize) {
    crossterm::terminal::size()
        .map(|(w, h)| (w as usize, h as usize))
        .unwrap_or((80, 24))
}

/// Number of visible lines for select lists
pub fn visible_lines() -> usize {
    let (_, height) = term_size();
    height.saturating_sub(4).max(5)
}

/// Truncate a string to max_chars, adding an ellipsis if needed.
/// Result is at most max_chars characters.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars - 1).collect();
    format!("{}…", kept.trim_end())
}

/// Get a minimal render config for inquire prompts
pub fn minimal_render_config() -> RenderConfig<'static> {
    RenderConfig::default_colored()
        .with_prompt_prefix(inquire::ui::Styled::new(""))
        .with_answered_prompt_prefix(inquire::ui::Styled::new(""))
}

// ============================================================================
// Message Functions
// ============================================================================

/// Print a warning message to stderr
#[inline]
pub fn warning(msg: &str) {
    eprintln!("{} {}", "Warning:".yellow(), msg);
}

// ============================================================================
// Interactive Merge Prompts
// ============================================================================

/// `Prompter` backed by inquire.
///
/// Esc answers conservatively: skip the group, keep the existing field,
/// decline the confirmation. Ctrl-C aborts the run.
#[derive(Debug, Default)]
pub struct InquirePrompter;

impl InquirePrompter {
    pub fn new() -> Self {
        Self
    }
}

fn skippable<T>(result: std::result::Result<T, InquireError>, on_escape: T) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(InquireError::OperationCanceled) => Ok(on_escape),
        Err(e) => Err(Error::Prompt(e.to_string())),
    }
}

impl Prompter for InquirePrompter {
    fn choose_action(&mut self, group: &GroupPrompt<'_>) -> Result<GroupAction> {
        println!();
        println!("{} {}", "duplicate:".bold(), group.key);
        for existing in group.existing {
            let folder = existing.source_folder_name().unwrap_or("?");
            println!("  existing  {}  [{}]", existing.label(), folder.dim());
        }
        println!("  incoming  {}", group.incoming.label());
        if group.existing.len() > 1 {
            println!("  {}", "updates apply to the first existing record".dim());
        }

        let result = Select::new("action:", GroupAction::ALL.to_vec())
            .with_render_config(minimal_render_config())
            .with_page_size(visible_lines())
            .with_vim_mode(true)
            .prompt();
        skippable(result, GroupAction::Skip)
    }

    fn choose_field(&mut self, prompt: &FieldPrompt) -> Result<FieldChoice> {
        let width = term_size().0.saturating_sub(14).max(20);
        println!();
        println!("{}", prompt.field.label().bold());
        println!("  existing  {}", truncate(&prompt.existing.to_string(), width));
        println!("  incoming  {}", truncate(&prompt.incoming.to_string(), width));

        let result = Select::new("keep:", prompt.choices.clone())
            .with_render_config(minimal_render_config())
            .with_vim_mode(true)
            .prompt();
        skippable(result, FieldChoice::KeepExisting)
    }

    fn confirm(&mut self, question: &str, preview: &Contact) -> Result<bool> {
        println!();
        print_contact(preview);
        println!();

        let result = Confirm::new(question)
            .with_render_config(minimal_render_config())
            .with_default(false)
            .prompt();
        skippable(result, false)
    }
}
