//! Default handler set.
//!
//! Wires the menus, registration flows, and application forms onto a
//! [`RegistryBuilder`]. The dispatcher stays generic; every bit of campus
//! behavior lives here.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::warn;

use crate::backend::{
    BackendError, RegistrationRequest, Repository, Role, SubmittedForm,
};
use crate::dispatch::{CallbackContext, MessageContext, RegistryBuilder, StartedContext};
use crate::error::{HandlerError, HandlerResult};
use crate::outbound::{CallbackAnswer, OutboundMessage};
use crate::session::SessionState;
use crate::wizard::{FieldKind, WizardProgress};

use super::forms::FormCatalog;
use super::menu;
use super::registration::registration_definition;
use super::schedule::ScheduleService;

/// Session step owned by the registration flow.
pub const STEP_REGISTRATION: &str = "registration";
/// Session step owned by the application form flow.
pub const STEP_FORM: &str = "form";
/// Session step collecting an email for ready-document delivery.
pub const STEP_READY_EMAIL: &str = "ready_email";

const HELP_TEXT: &str = "Available commands:\n\
    /start - open the main menu\n\
    /help - show this message\n\
    /register - create your profile\n\
    /cancel - abort the current dialog";

const READY_PICKUP_TEXT: &str =
    "Great! Your document is waiting for you at the student office.";
const READY_EMAIL_PROMPT: &str =
    "Sure! Send me the email address the document should go to.";
const READY_EMAIL_INVALID: &str =
    "That doesn't look like a valid email address. Example: jane.doe@university.edu";
const READY_EMAIL_SENT: &str = "Done! The document has been sent to your email.";

/// Shared services the default handlers close over.
#[derive(Clone)]
pub struct Services {
    pub repo: Repository,
    pub catalog: Arc<FormCatalog>,
    pub schedule: Arc<ScheduleService>,
}

impl Services {
    pub fn new(repo: Repository) -> Self {
        let schedule = Arc::new(ScheduleService::new(repo.schedule.clone()));
        Self {
            repo,
            catalog: Arc::new(FormCatalog::new()),
            schedule,
        }
    }
}

/// Register the full default handler set.
pub fn register_default_handlers(builder: RegistryBuilder, services: Services) -> RegistryBuilder {
    let svc = services.clone();
    let builder = builder.started_handler(move |ctx| {
        let svc = svc.clone();
        async move { on_started(ctx, svc).await }
    });

    let svc = services.clone();
    let builder = builder.command("start", "open the main menu", move |ctx| {
        let svc = svc.clone();
        async move { on_start(ctx, svc).await }
    });

    let builder = builder.command("help", "show the command list", |ctx| async move {
        ctx.reply_text(HELP_TEXT).await
    });

    let svc = services.clone();
    let builder = builder.command("register", "create your profile", move |ctx| {
        let svc = svc.clone();
        async move { on_register_command(ctx, svc).await }
    });

    let builder = builder.command("cancel", "abort the current dialog", |ctx| async move {
        // With an active session this never runs: the step handler owns
        // the message and does its own cancel.
        ctx.reply_text("Nothing to cancel.").await
    });

    let svc = services.clone();
    let builder = builder.callback_handler(move |ctx| {
        let svc = svc.clone();
        async move { on_callback(ctx, svc).await }
    });

    let svc = services.clone();
    let builder = builder.session_handler(STEP_REGISTRATION, move |ctx, state| {
        let svc = svc.clone();
        async move { on_registration_message(ctx, state, svc).await }
    });

    let svc = services.clone();
    let builder = builder.session_handler(STEP_FORM, move |ctx, state| {
        let svc = svc.clone();
        async move { on_form_message(ctx, state, svc).await }
    });

    let builder = builder.session_handler(STEP_READY_EMAIL, |ctx, _state| async move {
        on_ready_email_message(ctx).await
    });

    builder.message_handler(|ctx| async move {
        ctx.reply_text("I didn't understand that. Send /help for the command list.")
            .await
    })
}

async fn on_started(ctx: StartedContext, svc: Services) -> HandlerResult {
    let name = ctx.event.user_name.trim();
    let greeting = if name.is_empty() {
        "Hello! I'm the campus assistant.".to_string()
    } else {
        format!("Hello, {name}! I'm the campus assistant.")
    };

    match svc.repo.applications.resolve_role(ctx.user_id()).await {
        Ok(role) => {
            ctx.send(
                OutboundMessage::text(format!("{greeting} What can I do for you?"))
                    .to_user(ctx.user_id())
                    .with_keyboard(menu::main_menu(role)),
            )
            .await
        }
        Err(BackendError::UserNotFound) => {
            ctx.send(
                OutboundMessage::text(format!(
                    "{greeting} Let's get you registered first. Who are you?"
                ))
                .to_user(ctx.user_id())
                .with_keyboard(menu::registration_menu()),
            )
            .await
        }
        Err(err) => Err(err.into()),
    }
}

async fn on_start(ctx: MessageContext, svc: Services) -> HandlerResult {
    match svc.repo.applications.resolve_role(ctx.user_id()).await {
        Ok(role) => {
            ctx.send(
                OutboundMessage::text("What can I do for you?")
                    .to_user(ctx.user_id())
                    .with_keyboard(menu::main_menu(role)),
            )
            .await
        }
        Err(BackendError::UserNotFound) => send_registration_invite(&ctx).await,
        Err(err) => Err(err.into()),
    }
}

async fn on_register_command(ctx: MessageContext, svc: Services) -> HandlerResult {
    match svc.repo.applications.resolve_role(ctx.user_id()).await {
        Ok(_) => ctx.reply_text("You are already registered.").await,
        Err(BackendError::UserNotFound) => send_registration_invite(&ctx).await,
        Err(err) => Err(err.into()),
    }
}

async fn send_registration_invite(ctx: &MessageContext) -> HandlerResult {
    ctx.send(
        OutboundMessage::text("You are not registered yet. Who are you?")
            .to_user(ctx.user_id())
            .with_keyboard(menu::registration_menu()),
    )
    .await
}

async fn on_callback(ctx: CallbackContext, svc: Services) -> HandlerResult {
    let payload = ctx.event.payload.clone();
    let (namespace, value) = payload.split_once(':').unwrap_or((payload.as_str(), ""));

    match (namespace, value) {
        ("register", role) => start_registration(&ctx, role).await,
        ("menu", "applications") => {
            let Some(role) = require_role(&ctx, &svc).await? else {
                return Ok(());
            };
            ctx.answer(CallbackAnswer::none()).await?;
            ctx.send(
                OutboundMessage::text("Which document do you need?")
                    .to_user(ctx.user_id())
                    .with_keyboard(menu::applications_menu(&svc.catalog, role)),
            )
            .await
        }
        ("menu", "schedule") => {
            ctx.answer(CallbackAnswer::none()).await?;
            ctx.send(
                OutboundMessage::text("Which period?")
                    .to_user(ctx.user_id())
                    .with_keyboard(menu::schedule_menu()),
            )
            .await
        }
        ("menu", "payments") => {
            let Some(_role) = require_role(&ctx, &svc).await? else {
                return Ok(());
            };
            let status = svc.repo.payments.status(ctx.user_id()).await?;
            ctx.answer(CallbackAnswer::none()).await?;
            if status.all_paid() {
                return ctx.reply_text("You have no outstanding bills.").await;
            }
            let mut lines = vec!["Outstanding bills:".to_string()];
            if status.need_dorm {
                lines.push("- dormitory".to_string());
            }
            if status.need_tuition {
                lines.push("- tuition".to_string());
            }
            ctx.send(
                OutboundMessage::text(lines.join("\n"))
                    .to_user(ctx.user_id())
                    .with_keyboard(menu::payments_menu()),
            )
            .await
        }
        ("schedule", period @ ("today" | "week")) => {
            let text = if period == "today" {
                svc.schedule.today(ctx.user_id()).await?
            } else {
                svc.schedule.week(ctx.user_id()).await?
            };
            ctx.answer(CallbackAnswer::none()).await?;
            ctx.reply_text(text).await
        }
        ("pay", kind @ ("dorm" | "tuition")) => {
            let kind = if kind == "dorm" {
                crate::backend::PaymentKind::Dorm
            } else {
                crate::backend::PaymentKind::Tuition
            };
            let link = svc.repo.payments.link(ctx.user_id(), kind).await?;
            ctx.answer(CallbackAnswer::none()).await?;
            ctx.reply_text(format!("Pay here: {link}")).await
        }
        ("form", kind) => start_form(&ctx, &svc, kind).await,
        ("ready", "pickup") => {
            ctx.answer(CallbackAnswer::none()).await?;
            ctx.reply_text(READY_PICKUP_TEXT).await
        }
        ("ready", "email") => {
            ctx.set_session(SessionState::at_step(STEP_READY_EMAIL))?;
            ctx.answer(CallbackAnswer::none()).await?;
            ctx.reply_text(READY_EMAIL_PROMPT).await
        }
        _ => {
            warn!(payload = %payload, "unknown callback payload");
            ctx.answer(CallbackAnswer::none()).await
        }
    }
}

/// Resolve the caller's role, steering unregistered users into the
/// registration flow. `None` means the callback is fully handled already.
async fn require_role(
    ctx: &CallbackContext,
    svc: &Services,
) -> Result<Option<Role>, HandlerError> {
    match svc.repo.applications.resolve_role(ctx.user_id()).await {
        Ok(role) => Ok(Some(role)),
        Err(BackendError::UserNotFound) => {
            ctx.answer(CallbackAnswer::none()).await?;
            ctx.send(
                OutboundMessage::text("You are not registered yet. Who are you?")
                    .to_user(ctx.user_id())
                    .with_keyboard(menu::registration_menu()),
            )
            .await?;
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

async fn start_registration(ctx: &CallbackContext, role: &str) -> HandlerResult {
    let role = match role {
        "student" => Role::Student,
        "teacher" => Role::Teacher,
        _ => {
            warn!(role = %role, "unknown registration role");
            return ctx.answer(CallbackAnswer::none()).await;
        }
    };

    let progress = WizardProgress::start(role.as_str(), &registration_definition(role));
    let payload = progress
        .encode()
        .map_err(|e| HandlerError::Other(e.to_string()))?;
    ctx.set_session(SessionState::at_step(STEP_REGISTRATION).with_payload(payload))?;

    ctx.answer(CallbackAnswer::none()).await?;
    ctx.reply_text(progress.intro_prompt()).await
}

async fn start_form(ctx: &CallbackContext, svc: &Services, kind: &str) -> HandlerResult {
    let Some(role) = require_role(ctx, svc).await? else {
        return Ok(());
    };

    let Some(definition) = svc.catalog.definition(role, kind) else {
        return ctx
            .answer(CallbackAnswer::notify("This document is not available."))
            .await;
    };

    let progress = WizardProgress::start(kind, definition);
    if progress.is_completed() {
        // Nothing to collect: submit straight from the profile.
        svc.repo
            .applications
            .submit(
                ctx.user_id(),
                SubmittedForm {
                    kind: kind.to_string(),
                    role,
                    values: progress.values,
                },
            )
            .await?;
        ctx.answer(CallbackAnswer::none()).await?;
        return ctx
            .reply_text("Your request has been submitted. You will be notified when the document is ready.")
            .await;
    }

    let payload = progress
        .encode()
        .map_err(|e| HandlerError::Other(e.to_string()))?;
    ctx.set_session(SessionState::at_step(STEP_FORM).with_payload(payload))?;

    ctx.answer(CallbackAnswer::none()).await?;
    ctx.reply_text(progress.intro_prompt()).await
}

/// What to do with the message currently answering a wizard step.
enum StepOutcome {
    Remind,
    Record(String),
}

fn classify_answer(progress: &WizardProgress, ctx: &MessageContext) -> Option<StepOutcome> {
    let field = progress.current_field()?;
    match field.kind {
        FieldKind::File => {
            if ctx.event.attachments.is_empty() {
                if field.required {
                    Some(StepOutcome::Remind)
                } else {
                    Some(StepOutcome::Record(String::new()))
                }
            } else {
                let serialized =
                    serde_json::to_string(&ctx.event.attachments).unwrap_or_else(|_| "[]".into());
                Some(StepOutcome::Record(serialized))
            }
        }
        FieldKind::Text => {
            let text = ctx.event.text();
            if text.is_empty() && field.required {
                Some(StepOutcome::Remind)
            } else {
                Some(StepOutcome::Record(text.to_string()))
            }
        }
    }
}

/// Restore wizard progress from the session, resetting the dialog when
/// the payload turns out to be unusable.
async fn restore_progress(
    ctx: &MessageContext,
    state: &SessionState,
) -> Result<Option<WizardProgress>, HandlerError> {
    match WizardProgress::decode(&state.payload) {
        Ok(progress) => Ok(Some(progress)),
        Err(err) => {
            ctx.clear_session()?;
            ctx.reply_text(
                "Something went wrong with the current dialog. Please start it again with /start.",
            )
            .await?;
            warn!(error = %err, user_id = ctx.user_id(), "dropped unusable wizard session");
            Ok(None)
        }
    }
}

async fn cancelled_by_user(ctx: &MessageContext) -> Result<bool, HandlerError> {
    if ctx.event.command().as_deref() == Some("cancel") {
        ctx.clear_session()?;
        ctx.reply_text("Cancelled.").await?;
        return Ok(true);
    }
    Ok(false)
}

async fn on_registration_message(
    ctx: MessageContext,
    state: SessionState,
    svc: Services,
) -> HandlerResult {
    if cancelled_by_user(&ctx).await? {
        return Ok(());
    }
    let Some(mut progress) = restore_progress(&ctx, &state).await? else {
        return Ok(());
    };

    match classify_answer(&progress, &ctx) {
        Some(StepOutcome::Remind) => return ctx.reply_text(progress.reminder_prompt()).await,
        Some(StepOutcome::Record(value)) => progress.record_answer(value),
        None => {}
    }

    if !progress.is_completed() {
        let payload = progress
            .encode()
            .map_err(|e| HandlerError::Other(e.to_string()))?;
        ctx.set_session(SessionState::at_step(STEP_REGISTRATION).with_payload(payload))?;
        return ctx.reply_text(progress.next_prompt()).await;
    }

    let result = svc
        .repo
        .identity
        .register(RegistrationRequest {
            user_id: ctx.user_id(),
            role: progress.tag.clone(),
            values: progress.values.clone(),
        })
        .await;

    match result {
        Ok(outcome) => {
            ctx.clear_session()?;
            let role = match progress.tag.as_str() {
                "teacher" => Role::Teacher,
                _ => Role::Student,
            };
            let mut text = "You're all set! What can I do for you?".to_string();
            if !outcome.message.is_empty() {
                text = format!("{}\n\n{text}", outcome.message);
            }
            ctx.send(
                OutboundMessage::text(text)
                    .to_user(ctx.user_id())
                    .with_keyboard(menu::main_menu(role)),
            )
            .await
        }
        Err(err) => {
            // Session stays so the user can resend the last answer later.
            ctx.reply_text("Registration didn't go through. Please try again in a moment.")
                .await?;
            Err(err.into())
        }
    }
}

async fn on_form_message(ctx: MessageContext, state: SessionState, svc: Services) -> HandlerResult {
    if cancelled_by_user(&ctx).await? {
        return Ok(());
    }
    let Some(mut progress) = restore_progress(&ctx, &state).await? else {
        return Ok(());
    };

    match classify_answer(&progress, &ctx) {
        Some(StepOutcome::Remind) => return ctx.reply_text(progress.reminder_prompt()).await,
        Some(StepOutcome::Record(value)) => progress.record_answer(value),
        None => {}
    }

    if !progress.is_completed() {
        let payload = progress
            .encode()
            .map_err(|e| HandlerError::Other(e.to_string()))?;
        ctx.set_session(SessionState::at_step(STEP_FORM).with_payload(payload))?;
        return ctx.reply_text(progress.next_prompt()).await;
    }

    let role = svc.repo.applications.resolve_role(ctx.user_id()).await?;
    let result = svc
        .repo
        .applications
        .submit(
            ctx.user_id(),
            SubmittedForm {
                kind: progress.tag.clone(),
                role,
                values: progress.values.clone(),
            },
        )
        .await;

    match result {
        Ok(()) => {
            ctx.clear_session()?;
            ctx.reply_text(
                "Your request has been submitted. You will be notified when the document is ready.",
            )
            .await
        }
        Err(err) => {
            ctx.reply_text("Couldn't submit the request. Please try again in a moment.")
                .await?;
            Err(err.into())
        }
    }
}

async fn on_ready_email_message(ctx: MessageContext) -> HandlerResult {
    if cancelled_by_user(&ctx).await? {
        return Ok(());
    }

    let email = ctx.event.text();
    if email.is_empty() {
        return ctx.reply_text(READY_EMAIL_PROMPT).await;
    }
    if !is_valid_email(email) {
        return ctx.reply_text(READY_EMAIL_INVALID).await;
    }

    ctx.clear_session()?;
    ctx.reply_text(READY_EMAIL_SENT).await
}

fn is_valid_email(value: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
                .expect("email pattern compiles")
        })
        .is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::dispatch::HandlerRegistry;

    fn services() -> (Services, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let repo = Repository {
            applications: backend.clone(),
            payments: backend.clone(),
            schedule: backend.clone(),
            identity: backend.clone(),
        };
        (Services::new(repo), backend)
    }

    #[test]
    fn test_default_set_registers_expected_commands() {
        let (svc, _) = services();
        let registry =
            register_default_handlers(HandlerRegistry::builder(), svc).build();

        let names: Vec<_> = registry.commands().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["start", "help", "register", "cancel"]);
    }

    #[test]
    fn test_default_set_owns_wizard_steps() {
        let (svc, _) = services();
        let registry =
            register_default_handlers(HandlerRegistry::builder(), svc).build();

        assert!(registry.session_handler(STEP_REGISTRATION).is_some());
        assert!(registry.session_handler(STEP_FORM).is_some());
        assert!(registry.session_handler(STEP_READY_EMAIL).is_some());
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("jane.doe@university.edu"));
        assert!(is_valid_email("j_d+tag@sub.domain.org"));

        assert!(!is_valid_email("jane.doe"));
        assert!(!is_valid_email("@university.edu"));
        assert!(!is_valid_email("jane@university"));
        assert!(!is_valid_email("jane doe@university.edu"));
    }

    #[test]
    fn test_classify_requires_attachment_for_file_field() {
        let definition = registration_definition(Role::Student);
        let mut progress = WizardProgress::start("student", &definition);
        for _ in 0..4 {
            progress.record_answer("answer");
        }
        // Now at the student_card file field
        let ctx_event = crate::event::MessageEvent {
            user_id: 7,
            text: "here you go".into(),
            ..Default::default()
        };
        let ctx = MessageContext::new(
            ctx_event,
            Arc::new(crate::session::SessionStore::new()),
            Arc::new(NullSender),
        );
        assert!(matches!(
            classify_answer(&progress, &ctx),
            Some(StepOutcome::Remind)
        ));
    }

    struct NullSender;

    #[async_trait::async_trait]
    impl crate::outbound::MessageSender for NullSender {
        async fn send(
            &self,
            _message: OutboundMessage,
        ) -> Result<crate::outbound::DeliveryId, crate::outbound::SendError> {
            Ok(String::new())
        }

        async fn answer_callback(
            &self,
            _callback_id: &str,
            _answer: CallbackAnswer,
        ) -> Result<(), crate::outbound::SendError> {
            Ok(())
        }
    }
}
