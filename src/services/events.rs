use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::models::FileRecord;

/// A change to the stored file set. Serializes to the observer wire frame
/// `{"event": "...", "data": ...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum FileEvent {
    #[serde(rename = "add file")]
    Added(FileRecord),
    #[serde(rename = "delete file")]
    Deleted(String),
}

impl FileEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            FileEvent::Added(_) => "add file",
            FileEvent::Deleted(_) => "delete file",
        }
    }

    /// Identifier the event is about.
    pub fn file_id(&self) -> &str {
        match self {
            FileEvent::Added(record) => &record.id,
            FileEvent::Deleted(id) => id,
        }
    }
}

/// Fan-out hub for file-set changes. Observers subscribe for their own
/// receiver; publishing never blocks on slow or absent observers. Send
/// order is preserved per receiver, so add-then-delete for one id can not
/// arrive reversed.
pub struct EventHub {
    sender: broadcast::Sender<FileEvent>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        // broadcast::channel panics outside 1..=usize::MAX / 2.
        let (sender, _) = broadcast::channel(capacity.clamp(1, usize::MAX / 2));
        Self { sender }
    }

    /// Deliver to every connected observer, best-effort. The send error
    /// only means nobody is listening right now.
    pub fn publish(&self, event: FileEvent) {
        debug!("event '{}' for {}", event.kind(), event.file_id());
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FileEvent> {
        self.sender.subscribe()
    }

    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;
    use tokio::time::timeout;

    fn record(id: &str) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            filename: "a.txt".to_string(),
            content_type: "text/plain".to_string(),
            length: 5,
            upload_date: Utc::now(),
            checksum: "00".to_string(),
        }
    }

    #[test]
    fn test_publish_without_observers_does_not_fail() {
        let hub = EventHub::new(16);
        assert_eq!(hub.observer_count(), 0);
        hub.publish(FileEvent::Deleted("orphan".to_string()));
    }

    #[tokio::test]
    async fn test_observer_receives_events_in_emission_order() {
        let hub = EventHub::new(16);
        let mut rx = hub.subscribe();

        hub.publish(FileEvent::Added(record("f1")));
        hub.publish(FileEvent::Deleted("f1".to_string()));

        let first = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
        let second = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();

        assert!(matches!(first, FileEvent::Added(ref r) if r.id == "f1"));
        assert!(matches!(second, FileEvent::Deleted(ref id) if id == "f1"));
    }

    #[tokio::test]
    async fn test_every_observer_gets_each_event() {
        let hub = EventHub::new(16);
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();
        assert_eq!(hub.observer_count(), 2);

        hub.publish(FileEvent::Deleted("f2".to_string()));

        for rx in [&mut a, &mut b] {
            let event = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
            assert_eq!(event.file_id(), "f2");
        }
    }

    #[tokio::test]
    async fn test_lagged_observer_skips_ahead() {
        let hub = EventHub::new(2);
        let mut rx = hub.subscribe();

        for id in ["f0", "f1", "f2", "f3", "f4"] {
            hub.publish(FileEvent::Deleted(id.to_string()));
        }

        // Three events fell out of the buffer. The receiver learns how many
        // it missed once, then resumes with the oldest retained event.
        let lagged = timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert!(matches!(
            lagged,
            Err(broadcast::error::RecvError::Lagged(3))
        ));

        let next = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
        assert_eq!(next.file_id(), "f3");
        let last = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
        assert_eq!(last.file_id(), "f4");
    }

    #[tokio::test]
    async fn test_zero_capacity_hub_still_delivers() {
        let hub = EventHub::new(0);
        let mut rx = hub.subscribe();

        hub.publish(FileEvent::Deleted("f0".to_string()));

        let event = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
        assert_eq!(event.file_id(), "f0");
    }

    #[tokio::test]
    async fn test_new_observer_sees_no_history() {
        let hub = EventHub::new(16);
        hub.publish(FileEvent::Added(record("old")));

        let mut rx = hub.subscribe();
        hub.publish(FileEvent::Added(record("new")));

        let event = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
        assert_eq!(event.file_id(), "new");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_wire_frames() {
        let added = serde_json::to_value(FileEvent::Added(record("f3"))).unwrap();
        assert_eq!(added["event"], "add file");
        assert_eq!(added["data"]["filename"], "a.txt");

        let deleted = serde_json::to_value(FileEvent::Deleted("f3".to_string())).unwrap();
        assert_eq!(deleted["event"], "delete file");
        assert_eq!(deleted["data"], "f3");
    }
}
