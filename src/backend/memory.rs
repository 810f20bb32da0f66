//! In-memory backend used when no real backend is configured.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{
    Applications, BackendError, Identity, PaymentKind, PaymentStatus, Payments, RegistrationRequest,
    RegistrationResult, Role, Schedule, ScheduleLesson, SubmittedForm,
};
use crate::session::UserId;

/// One backend implementing every collaborator trait against in-process
/// maps. Users become known through [`Identity::register`]; everything
/// else answers with canned data.
pub struct MemoryBackend {
    roles: RwLock<HashMap<UserId, Role>>,
    forms: RwLock<HashMap<UserId, Vec<SubmittedForm>>>,
    payments: RwLock<HashMap<UserId, PaymentStatus>>,
    lessons: RwLock<HashMap<UserId, Vec<ScheduleLesson>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            roles: RwLock::new(HashMap::new()),
            forms: RwLock::new(HashMap::new()),
            payments: RwLock::new(HashMap::new()),
            lessons: RwLock::new(HashMap::new()),
        }
    }

    /// Pre-register a user, bypassing the registration flow. Test helper.
    pub fn add_user(&self, user_id: UserId, role: Role) {
        if let Ok(mut roles) = self.roles.write() {
            roles.insert(user_id, role);
        }
    }

    /// Set the outstanding bills for a user.
    pub fn set_payment_status(&self, user_id: UserId, status: PaymentStatus) {
        if let Ok(mut payments) = self.payments.write() {
            payments.insert(user_id, status);
        }
    }

    /// Replace the stored timetable for a user.
    pub fn set_lessons(&self, user_id: UserId, lessons: Vec<ScheduleLesson>) {
        if let Ok(mut stored) = self.lessons.write() {
            stored.insert(user_id, lessons);
        }
    }

    /// Forms submitted by a user, in submission order.
    pub fn submitted_forms(&self, user_id: UserId) -> Vec<SubmittedForm> {
        self.forms
            .read()
            .ok()
            .and_then(|forms| forms.get(&user_id).cloned())
            .unwrap_or_default()
    }

    fn known(&self, user_id: UserId) -> Result<Role, BackendError> {
        self.roles
            .read()
            .map_err(|_| BackendError::Unavailable("role store poisoned".into()))?
            .get(&user_id)
            .copied()
            .ok_or(BackendError::UserNotFound)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Applications for MemoryBackend {
    async fn resolve_role(&self, user_id: UserId) -> Result<Role, BackendError> {
        self.known(user_id)
    }

    async fn submit(&self, user_id: UserId, form: SubmittedForm) -> Result<(), BackendError> {
        self.known(user_id)?;
        self.forms
            .write()
            .map_err(|_| BackendError::Unavailable("form store poisoned".into()))?
            .entry(user_id)
            .or_default()
            .push(form);
        Ok(())
    }
}

#[async_trait]
impl Payments for MemoryBackend {
    async fn status(&self, user_id: UserId) -> Result<PaymentStatus, BackendError> {
        self.known(user_id)?;
        Ok(self
            .payments
            .read()
            .map_err(|_| BackendError::Unavailable("payment store poisoned".into()))?
            .get(&user_id)
            .copied()
            .unwrap_or_default())
    }

    async fn link(&self, user_id: UserId, kind: PaymentKind) -> Result<String, BackendError> {
        self.known(user_id)?;
        let slug = match kind {
            PaymentKind::Dorm => "dorm",
            PaymentKind::Tuition => "tuition",
        };
        Ok(format!("https://pay.example/{slug}/{user_id}"))
    }
}

#[async_trait]
impl Schedule for MemoryBackend {
    async fn list(
        &self,
        user_id: UserId,
        _week_start: Option<NaiveDate>,
    ) -> Result<Vec<ScheduleLesson>, BackendError> {
        self.known(user_id)?;
        Ok(self
            .lessons
            .read()
            .map_err(|_| BackendError::Unavailable("lesson store poisoned".into()))?
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl Identity for MemoryBackend {
    async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<RegistrationResult, BackendError> {
        let role = match request.role.as_str() {
            "student" => Role::Student,
            _ => Role::Teacher,
        };
        self.roles
            .write()
            .map_err(|_| BackendError::Unavailable("role store poisoned".into()))?
            .insert(request.user_id, role);
        Ok(RegistrationResult::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_user_not_found() {
        let backend = MemoryBackend::new();
        assert!(matches!(
            backend.resolve_role(1).await,
            Err(BackendError::UserNotFound)
        ));
        assert!(matches!(
            backend.status(1).await,
            Err(BackendError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_register_then_resolve() {
        let backend = MemoryBackend::new();
        backend
            .register(RegistrationRequest {
                user_id: 7,
                role: "student".into(),
                values: HashMap::new(),
            })
            .await
            .unwrap();

        assert_eq!(backend.resolve_role(7).await.unwrap(), Role::Student);
    }

    #[tokio::test]
    async fn test_submit_records_form() {
        let backend = MemoryBackend::new();
        backend.add_user(7, Role::Student);

        let form = SubmittedForm {
            kind: "study_certificate".into(),
            role: Role::Student,
            values: HashMap::new(),
        };
        backend.submit(7, form.clone()).await.unwrap();
        assert_eq!(backend.submitted_forms(7), vec![form]);
    }

    #[tokio::test]
    async fn test_lessons_round_trip() {
        let backend = MemoryBackend::new();
        backend.add_user(7, Role::Student);

        assert!(backend.list(7, None).await.unwrap().is_empty());
        assert!(matches!(
            backend.list(8, None).await,
            Err(BackendError::UserNotFound)
        ));

        backend.set_lessons(
            7,
            vec![ScheduleLesson {
                subject: "Algebra".into(),
                weekday: "monday".into(),
                pair_no: 1,
                ..Default::default()
            }],
        );
        let lessons = backend.list(7, None).await.unwrap();
        assert_eq!(lessons.len(), 1);
        assert_eq!(lessons[0].subject, "Algebra");
    }

    #[tokio::test]
    async fn test_payment_link() {
        let backend = MemoryBackend::new();
        backend.add_user(7, Role::Student);

        let link = backend.link(7, PaymentKind::Tuition).await.unwrap();
        assert!(link.contains("tuition"));
        assert!(link.contains('7'));
    }
}
