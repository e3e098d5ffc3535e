use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::warn;

/// Bounded broadcast-to-one event channel
///
/// Publishing never blocks the workflow: if nobody drains the receiver and
/// the buffer fills up, new events are dropped with a warning.
pub struct EventChannel<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> EventChannel<T> {
    pub fn new(buffer_size: usize) -> Self {
        let (tx, rx) = bounded(buffer_size);
        Self { tx, rx }
    }

    /// Returns false if the event was dropped
    pub fn publish(&self, event: T) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    pub fn receiver(&self) -> Receiver<T> {
        self.rx.clone()
    }

    /// Drain everything currently buffered
    pub fn drain(&self) -> Vec<T> {
        self.rx.try_iter().collect()
    }
}

impl<T> Default for EventChannel<T> {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain() {
        let channel = EventChannel::new(4);
        assert!(channel.publish(1));
        assert!(channel.publish(2));
        assert_eq!(channel.drain(), vec![1, 2]);
        assert!(channel.drain().is_empty());
    }

    #[test]
    fn test_full_channel_drops() {
        let channel = EventChannel::new(1);
        assert!(channel.publish("first"));
        assert!(!channel.publish("second"));
        assert_eq!(channel.receiver().try_recv().unwrap(), "first");
    }
}
