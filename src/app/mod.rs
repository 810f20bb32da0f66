//! The concrete bot: menus, application forms, registration flows, the
//! default handler set, and outbound notifications.
//!
//! Everything here is built on the generic core (dispatch, sessions,
//! wizards); nothing in the core knows these flows exist.

mod forms;
mod handlers;
mod menu;
mod notifier;
mod registration;
mod schedule;

pub use forms::FormCatalog;
pub use handlers::{
    register_default_handlers, Services, STEP_FORM, STEP_READY_EMAIL, STEP_REGISTRATION,
};
pub use menu::{
    applications_menu, main_menu, payments_menu, ready_document_menu, registration_menu,
    schedule_menu,
};
pub use notifier::Notifier;
pub use registration::registration_definition;
pub use schedule::ScheduleService;
