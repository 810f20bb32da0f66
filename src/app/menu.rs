//! Inline menus.
//!
//! Every button carries a `namespace:value` payload; the callback router
//! in [`super::handlers`] dispatches on the namespace.

use crate::backend::Role;
use crate::outbound::{Keyboard, KeyboardButton};

use super::forms::FormCatalog;

/// Top-level menu shown after `/start` and after registration.
pub fn main_menu(role: Role) -> Keyboard {
    let mut keyboard = Keyboard::new()
        .row(vec![KeyboardButton::new(
            "Applications",
            "menu:applications",
        )])
        .row(vec![KeyboardButton::new("Schedule", "menu:schedule")]);

    // Staff have no personal bills to pay.
    if role == Role::Student {
        keyboard = keyboard.row(vec![KeyboardButton::new("Payments", "menu:payments")]);
    }
    keyboard
}

/// Role choice offered to unregistered users.
pub fn registration_menu() -> Keyboard {
    Keyboard::new().row(vec![
        KeyboardButton::new("I am a student", "register:student").positive(),
        KeyboardButton::new("I work here", "register:teacher"),
    ])
}

/// One button per document kind available to the role.
pub fn applications_menu(catalog: &FormCatalog, role: Role) -> Keyboard {
    let mut keyboard = Keyboard::new();
    for (kind, title) in catalog.kinds(role) {
        keyboard = keyboard.row(vec![KeyboardButton::new(title, format!("form:{kind}"))]);
    }
    keyboard
}

pub fn schedule_menu() -> Keyboard {
    Keyboard::new().row(vec![
        KeyboardButton::new("Today", "schedule:today"),
        KeyboardButton::new("This week", "schedule:week"),
    ])
}

/// Delivery choice attached to the document-ready notice.
pub fn ready_document_menu() -> Keyboard {
    Keyboard::new().row(vec![
        KeyboardButton::new("Pick it up at the office", "ready:pickup").positive(),
        KeyboardButton::new("Send it to my email", "ready:email"),
    ])
}

pub fn payments_menu() -> Keyboard {
    Keyboard::new().row(vec![
        KeyboardButton::new("Dormitory", "pay:dorm"),
        KeyboardButton::new("Tuition", "pay:tuition"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_menu_hides_payments_from_staff() {
        let student = main_menu(Role::Student);
        assert!(student
            .rows
            .iter()
            .flatten()
            .any(|b| b.payload == "menu:payments"));

        let staff = main_menu(Role::Teacher);
        assert!(!staff
            .rows
            .iter()
            .flatten()
            .any(|b| b.payload == "menu:payments"));
    }

    #[test]
    fn test_applications_menu_lists_role_kinds() {
        let catalog = FormCatalog::new();
        let keyboard = applications_menu(&catalog, Role::Student);
        let payloads: Vec<_> = keyboard
            .rows
            .iter()
            .flatten()
            .map(|b| b.payload.as_str())
            .collect();
        assert!(payloads.contains(&"form:study_certificate"));
        assert!(!payloads.contains(&"form:work_certificate"));
    }

    #[test]
    fn test_ready_document_menu_payloads() {
        let payloads: Vec<_> = ready_document_menu()
            .rows
            .iter()
            .flatten()
            .map(|b| b.payload.clone())
            .collect();
        assert_eq!(payloads, vec!["ready:pickup", "ready:email"]);
    }

    #[test]
    fn test_registration_menu_payloads() {
        let payloads: Vec<_> = registration_menu()
            .rows
            .iter()
            .flatten()
            .map(|b| b.payload.clone())
            .collect();
        assert_eq!(payloads, vec!["register:student", "register:teacher"]);
    }
}
