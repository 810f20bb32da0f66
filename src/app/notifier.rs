//! Push notifications initiated by the backend rather than by the user.

use std::sync::Arc;

use tracing::{info, warn};

use crate::backend::{PaymentKind, Payments};
use crate::error::HandlerError;
use crate::outbound::{DeliveryId, MessageSender, OutboundMessage};
use crate::session::UserId;

use super::menu;

/// Sends backend-initiated messages to users: document-ready notices,
/// payment reminders, and free-form announcements.
pub struct Notifier {
    sender: Arc<dyn MessageSender>,
    payments: Arc<dyn Payments>,
}

impl Notifier {
    pub fn new(sender: Arc<dyn MessageSender>, payments: Arc<dyn Payments>) -> Self {
        Self { sender, payments }
    }

    /// Deliver a free-form text to one user.
    pub async fn notify_user(
        &self,
        user_id: UserId,
        text: impl Into<String>,
    ) -> Result<DeliveryId, HandlerError> {
        let id = self
            .sender
            .send(OutboundMessage::text(text).to_user(user_id))
            .await?;
        info!(user_id, "notification delivered");
        Ok(id)
    }

    /// Deliver the same text to many users. Failures are logged per user;
    /// the count of successful deliveries is returned.
    pub async fn notify_bulk(&self, user_ids: &[UserId], text: &str) -> usize {
        let mut delivered = 0;
        for &user_id in user_ids {
            match self.notify_user(user_id, text).await {
                Ok(_) => delivered += 1,
                Err(err) => warn!(user_id, error = %err, "bulk notification failed"),
            }
        }
        delivered
    }

    /// Tell a user their requested document is ready and ask how they want
    /// it delivered. The buttons feed the `ready:` callback handlers.
    pub async fn notify_document_ready(&self, user_id: UserId) -> Result<DeliveryId, HandlerError> {
        let id = self
            .sender
            .send(
                OutboundMessage::text(
                    "Your document is ready! How would you like to receive it?",
                )
                .to_user(user_id)
                .with_keyboard(menu::ready_document_menu()),
            )
            .await?;
        info!(user_id, "document-ready notice delivered");
        Ok(id)
    }

    /// Remind a user about an unpaid tuition bill, attaching a payment link.
    pub async fn notify_tuition_reminder(
        &self,
        user_id: UserId,
    ) -> Result<DeliveryId, HandlerError> {
        let link = self.payments.link(user_id, PaymentKind::Tuition).await?;
        self.notify_user(
            user_id,
            format!("Friendly reminder: your tuition bill is still unpaid.\nPay here: {link}"),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, Role};
    use crate::outbound::{CallbackAnswer, SendError};
    use std::sync::Mutex;

    struct RecordingSender {
        sent: Mutex<Vec<OutboundMessage>>,
        fail_for: Option<UserId>,
    }

    impl RecordingSender {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_for: None,
            }
        }
    }

    #[async_trait::async_trait]
    impl MessageSender for RecordingSender {
        async fn send(&self, message: OutboundMessage) -> Result<DeliveryId, SendError> {
            if self.fail_for.is_some() && message.user_id == self.fail_for {
                return Err(SendError::Transport("down".into()));
            }
            self.sent.lock().unwrap().push(message);
            Ok("mid".into())
        }

        async fn answer_callback(
            &self,
            _callback_id: &str,
            _answer: CallbackAnswer,
        ) -> Result<(), SendError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_bulk_counts_only_successes() {
        let sender = Arc::new(RecordingSender {
            fail_for: Some(2),
            ..RecordingSender::new()
        });
        let backend = Arc::new(MemoryBackend::new());
        let notifier = Notifier::new(sender.clone(), backend);

        let delivered = notifier.notify_bulk(&[1, 2, 3], "campus closed tomorrow").await;
        assert_eq!(delivered, 2);
        assert_eq!(sender.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_document_ready_offers_delivery_choice() {
        let sender = Arc::new(RecordingSender::new());
        let backend = Arc::new(MemoryBackend::new());
        let notifier = Notifier::new(sender.clone(), backend);

        notifier.notify_document_ready(7).await.unwrap();

        let sent = sender.sent.lock().unwrap();
        assert!(sent[0].text.contains("ready"));
        let payloads: Vec<_> = sent[0]
            .keyboard
            .as_ref()
            .unwrap()
            .rows
            .iter()
            .flatten()
            .map(|b| b.payload.as_str())
            .collect();
        assert_eq!(payloads, vec!["ready:pickup", "ready:email"]);
    }

    #[tokio::test]
    async fn test_tuition_reminder_includes_link() {
        let sender = Arc::new(RecordingSender::new());
        let backend = Arc::new(MemoryBackend::new());
        backend.add_user(7, Role::Student);
        let notifier = Notifier::new(sender.clone(), backend);

        notifier.notify_tuition_reminder(7).await.unwrap();

        let sent = sender.sent.lock().unwrap();
        assert!(sent[0].text.contains("https://pay.example/tuition/7"));
    }

    #[tokio::test]
    async fn test_tuition_reminder_unknown_user() {
        let sender = Arc::new(RecordingSender::new());
        let backend = Arc::new(MemoryBackend::new());
        let notifier = Notifier::new(sender, backend);

        assert!(notifier.notify_tuition_reminder(404).await.is_err());
    }
}
