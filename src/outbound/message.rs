//! Outbound message shapes.

use serde::Serialize;

/// Visual intent of an inline keyboard button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonIntent {
    #[default]
    Default,
    Positive,
    Negative,
}

/// One inline keyboard button. Pressing it produces a callback event
/// carrying `payload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyboardButton {
    pub text: String,
    pub payload: String,
    #[serde(default)]
    pub intent: ButtonIntent,
}

impl KeyboardButton {
    pub fn new(text: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            payload: payload.into(),
            intent: ButtonIntent::Default,
        }
    }

    pub fn positive(mut self) -> Self {
        self.intent = ButtonIntent::Positive;
        self
    }

    pub fn negative(mut self) -> Self {
        self.intent = ButtonIntent::Negative;
        self
    }
}

/// Inline keyboard: rows of buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<KeyboardButton>>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row of buttons. Empty rows are dropped.
    pub fn row(mut self, buttons: Vec<KeyboardButton>) -> Self {
        if !buttons.is_empty() {
            self.rows.push(buttons);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A message the bot wants delivered.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutboundMessage {
    /// Direct recipient, when addressing a user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    /// Target dialog, when addressing a chat.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<i64>,
    /// Message text.
    pub text: String,
    /// Optional inline keyboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Keyboard>,
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn to_user(mut self, user_id: i64) -> Self {
        if user_id != 0 {
            self.user_id = Some(user_id);
        }
        self
    }

    pub fn to_chat(mut self, chat_id: i64) -> Self {
        if chat_id != 0 {
            self.chat_id = Some(chat_id);
        }
        self
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        if !keyboard.is_empty() {
            self.keyboard = Some(keyboard);
        }
        self
    }
}

/// Answer to a callback event.
///
/// `notification` shows a toast; `message` replaces or follows the message
/// the button was attached to. Both empty still closes the client's
/// waiting state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallbackAnswer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<OutboundMessage>,
}

impl CallbackAnswer {
    /// An answer that only releases the waiting state.
    pub fn none() -> Self {
        Self::default()
    }

    /// An answer showing a short toast notification.
    pub fn notify(text: impl Into<String>) -> Self {
        Self {
            notification: Some(text.into()),
            message: None,
        }
    }

    /// An answer replacing the message the button belongs to.
    pub fn with_message(message: OutboundMessage) -> Self {
        Self {
            notification: None,
            message: Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_builder() {
        let msg = OutboundMessage::text("hi")
            .to_user(42)
            .to_chat(7)
            .with_keyboard(Keyboard::new().row(vec![KeyboardButton::new("Go", "action:go")]));

        assert_eq!(msg.user_id, Some(42));
        assert_eq!(msg.chat_id, Some(7));
        assert!(msg.keyboard.is_some());
    }

    #[test]
    fn test_zero_ids_are_omitted() {
        let msg = OutboundMessage::text("hi").to_user(0).to_chat(0);
        assert_eq!(msg.user_id, None);
        assert_eq!(msg.chat_id, None);
    }

    #[test]
    fn test_empty_keyboard_is_omitted() {
        let msg = OutboundMessage::text("hi").with_keyboard(Keyboard::new());
        assert!(msg.keyboard.is_none());

        let kb = Keyboard::new().row(vec![]);
        assert!(kb.is_empty());
    }

    #[test]
    fn test_callback_answer_shapes() {
        assert_eq!(CallbackAnswer::none(), CallbackAnswer::default());
        let toast = CallbackAnswer::notify("done");
        assert_eq!(toast.notification.as_deref(), Some("done"));
        assert!(toast.message.is_none());
    }
}
