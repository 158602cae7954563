// Ordered fan-out of scan progress lines to live stream subscribers

use tokio::sync::broadcast;

/// Publishes timestamped scan progress lines to any number of subscribers.
/// Delivery is best-effort: a subscriber that falls more than the channel
/// capacity behind loses its oldest lines, and having no subscribers at all
/// is not an error. Every line is also logged locally, so the scan narrative
/// survives even with nobody streaming.
#[derive(Clone)]
pub struct LogBroadcaster {
    tx: broadcast::Sender<String>,
}

impl LogBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Timestamp and publish one progress line. Subscribers attached later
    /// never see it.
    pub fn emit(&self, message: &str) {
        tracing::info!("{}", message);
        let line = format!("[{}] {}", chrono::Local::now().format("%H:%M:%S"), message);
        let _ = self.tx.send(line);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}
