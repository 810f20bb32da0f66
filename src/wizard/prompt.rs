//! Prompt rendering for wizard steps.

use std::fmt::Write;

use super::definition::{Field, FieldKind};
use super::progress::WizardProgress;

impl WizardProgress {
    /// Prompt for the very first step, including the wizard title and the
    /// total field count. Empty when the wizard has no remaining field.
    pub fn intro_prompt(&self) -> String {
        let Some(field) = self.current_field() else {
            return String::new();
        };

        let mut out = String::new();
        let total = self.steps();
        let _ = writeln!(out, "Starting \"{}\".", self.title);
        let _ = writeln!(out, "{} {} in total.", total, pluralize_questions(total));
        out.push('\n');
        out.push_str(&field_prompt(field, self.index, total));
        out
    }

    /// Prompt for the current step without the intro header.
    pub fn next_prompt(&self) -> String {
        match self.current_field() {
            Some(field) => field_prompt(field, self.index, self.steps()),
            None => String::new(),
        }
    }

    /// Re-prompt for the current step, prefixed by a validation complaint.
    /// Used when a required field was answered with an empty message.
    pub fn reminder_prompt(&self) -> String {
        let Some(field) = self.current_field() else {
            return "This field is required.".to_string();
        };
        format!(
            "The field \"{}\" is required.\n\n{}",
            field.label,
            field_prompt(field, self.index, self.steps())
        )
    }
}

/// Render one field as a user-facing prompt: step header, label, required
/// marker, file-upload instructions, placeholder hint.
fn field_prompt(field: &Field, index: usize, total: usize) -> String {
    let mut out = String::new();
    let _ = write!(out, "Step {}/{}.\n\n{}", index + 1, total, field.label);
    if field.required {
        out.push_str(" [required]");
    }
    if field.kind == FieldKind::File {
        out.push_str("\n\nSend the file (or several files) in your next message.");
    }
    if let Some(hint) = &field.placeholder {
        let _ = write!(out, "\nHint: {hint}");
    }
    out
}

fn pluralize_questions(n: usize) -> &'static str {
    if n == 1 {
        "question"
    } else {
        "questions"
    }
}
