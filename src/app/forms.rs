//! Catalog of application forms, one wizard definition per document kind.

use crate::backend::Role;
use crate::wizard::{Field, WizardDefinition};

struct CatalogEntry {
    kind: &'static str,
    role: Role,
    definition: WizardDefinition,
}

/// All document kinds users can apply for, with the wizard that collects
/// the data each one needs. Built once at startup; lookups borrow from it.
pub struct FormCatalog {
    entries: Vec<CatalogEntry>,
}

impl FormCatalog {
    pub fn new() -> Self {
        let entries = vec![
            // No extra data needed: the wizard completes immediately and
            // the request is submitted from the user's profile alone.
            CatalogEntry {
                kind: "study_certificate",
                role: Role::Student,
                definition: WizardDefinition::new("Certificate of enrollment", vec![]),
            },
            CatalogEntry {
                kind: "academic_leave",
                role: Role::Student,
                definition: WizardDefinition::new(
                    "Academic leave",
                    vec![
                        Field::file(
                            "supporting_files",
                            "Attach documents supporting the leave request",
                        ),
                        Field::text("reason", "Describe the reason for the leave")
                            .with_placeholder("e.g. extended medical treatment"),
                    ],
                ),
            },
            CatalogEntry {
                kind: "study_transfer",
                role: Role::Student,
                definition: WizardDefinition::new(
                    "Transfer to another program",
                    vec![
                        Field::file("gradebook_copy", "Upload a copy of your grade book"),
                        Field::text(
                            "target_program",
                            "Name the faculty and program you want to transfer to",
                        )
                        .with_placeholder("e.g. CS faculty, Applied Informatics"),
                    ],
                ),
            },
            CatalogEntry {
                kind: "work_certificate",
                role: Role::Teacher,
                definition: WizardDefinition::new("Certificate of employment", vec![]),
            },
        ];
        Self { entries }
    }

    /// Definition for a document kind, if the role may apply for it.
    pub fn definition(&self, role: Role, kind: &str) -> Option<&WizardDefinition> {
        self.entries
            .iter()
            .find(|e| e.role == role && e.kind == kind)
            .map(|e| &e.definition)
    }

    /// Document kinds available to a role, as `(kind, title)` pairs in
    /// catalog order.
    pub fn kinds(&self, role: Role) -> Vec<(&'static str, &str)> {
        self.entries
            .iter()
            .filter(|e| e.role == role)
            .map(|e| (e.kind, e.definition.title.as_str()))
            .collect()
    }
}

impl Default for FormCatalog {
    fn default() -> Self {
        Self::new()
    }
}
