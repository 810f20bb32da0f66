//! Generic multi-step wizard engine.
//!
//! A wizard walks a user through an ordered list of fields across multiple
//! messages. The definition (title + fields) is immutable; the progress
//! record (current index + collected values) round-trips through the
//! session payload as opaque JSON bytes, so the dispatcher never learns
//! the shape of any particular wizard's data.

mod definition;
mod progress;
mod prompt;

pub use definition::{Field, FieldKind, WizardDefinition};
pub use progress::{WizardError, WizardProgress};
