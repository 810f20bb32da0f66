//! Registration wizards, one per role.

use crate::backend::Role;
use crate::wizard::{Field, WizardDefinition};

/// Wizard collecting the profile data the backend needs to register a
/// user under the given role.
pub fn registration_definition(role: Role) -> WizardDefinition {
    match role {
        Role::Student => WizardDefinition::new(
            "Student registration",
            vec![
                Field::text("full_name", "Your full name"),
                Field::text("university", "Your university")
                    .with_placeholder("official name, no abbreviations"),
                Field::text("faculty", "Your faculty"),
                Field::text("group", "Your group number"),
                Field::file("student_card", "Attach a photo of your student card"),
            ],
        ),
        Role::Teacher => WizardDefinition::new(
            "Staff registration",
            vec![
                Field::text("full_name", "Your full name"),
                Field::text("university", "Your university")
                    .with_placeholder("official name, no abbreviations"),
                Field::text("faculty", "Your faculty"),
                Field::text("department", "Your department"),
                Field::text("staff_number", "Your staff number"),
            ],
        ),
    }
}
