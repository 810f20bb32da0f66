//! In-process update source backed by an mpsc channel.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::UpdateSource;
use crate::error::BotError;
use crate::event::Event;
use crate::Result;

/// Update source fed by another task, typically the webhook endpoint of
/// the auxiliary HTTP listener. Also the natural source for tests.
///
/// The receiver half can be claimed exactly once; the dispatcher is the
/// single consumer.
pub struct ChannelUpdateSource {
    receiver: Mutex<Option<mpsc::Receiver<Event>>>,
}

impl ChannelUpdateSource {
    /// Create a source with the given channel capacity. Returns the source
    /// and the sender half used to feed events into it.
    pub fn new(capacity: usize) -> (Self, mpsc::Sender<Event>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                receiver: Mutex::new(Some(rx)),
            },
            tx,
        )
    }
}

#[async_trait]
impl UpdateSource for ChannelUpdateSource {
    async fn get_updates(&self, _shutdown: CancellationToken) -> Result<mpsc::Receiver<Event>> {
        self.receiver
            .lock()
            .map_err(|_| BotError::LockPoisoned)?
            .take()
            .ok_or_else(|| BotError::UpdateSource("update stream already claimed".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stream_claimed_once() {
        let (source, tx) = ChannelUpdateSource::new(4);
        let token = CancellationToken::new();

        let mut rx = source.get_updates(token.clone()).await.unwrap();
        assert!(source.get_updates(token).await.is_err());

        tx.send(Event::Unrecognized { kind: "x".into() }).await.unwrap();
        assert!(rx.recv().await.is_some());

        drop(tx);
        assert!(rx.recv().await.is_none());
    }
}
