//! Transient user-facing notifications.
//!
//! Background work (remote mirroring, directory refreshes) never returns
//! errors to the caller that triggered it. Instead it posts a [`Notice`] on
//! an unbounded channel that the shell drains between turns.

use tokio::sync::mpsc;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn prefix(&self) -> &'static str {
        match self.kind {
            NoticeKind::Success => "✅",
            NoticeKind::Error => "❌",
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.prefix(), self.title, self.description)
    }
}

pub type NoticeReceiver = mpsc::UnboundedReceiver<Notice>;

/// Cheap, cloneable handle for posting notices.
///
/// A notifier whose receiver has been dropped silently discards notices;
/// every notice is mirrored to the tracing log either way.
#[derive(Clone, Debug)]
pub struct Notifier {
    tx: Option<mpsc::UnboundedSender<Notice>>,
}

impl Notifier {
    pub fn channel() -> (Self, NoticeReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A notifier that only logs.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn success(&self, title: &str, description: impl Into<String>) {
        self.post(NoticeKind::Success, title, description.into());
    }

    pub fn error(&self, title: &str, description: impl Into<String>) {
        self.post(NoticeKind::Error, title, description.into());
    }

    fn post(&self, kind: NoticeKind, title: &str, description: String) {
        debug!(?kind, title, %description, "notice");
        if let Some(tx) = &self.tx {
            let _ = tx.send(Notice {
                kind,
                title: title.to_string(),
                description,
            });
        }
    }
}

/// Collect every notice currently queued without waiting.
pub fn drain_notices(rx: &mut NoticeReceiver) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_arrive_in_order() {
        let (notifier, mut rx) = Notifier::channel();
        notifier.error("Error", "Failed to save conversation");
        notifier.success("Character created", "Nova has been created successfully");

        let notices = drain_notices(&mut rx);
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].kind, NoticeKind::Error);
        assert_eq!(notices[0].description, "Failed to save conversation");
        assert_eq!(notices[1].title, "Character created");
        assert!(drain_notices(&mut rx).is_empty());
    }

    #[test]
    fn disabled_notifier_discards() {
        let notifier = Notifier::disabled();
        notifier.success("Heads up", "nothing listens");
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn error_notices_stay_out_of_the_default_log() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let (notifier, mut rx) = Notifier::channel();
            notifier.error("Error", "Failed to save conversation");
            assert_eq!(drain_notices(&mut rx).len(), 1);
        });

        assert!(captured.0.lock().unwrap().is_empty());
    }

    #[test]
    fn display_includes_title_and_description() {
        let notice = Notice {
            kind: NoticeKind::Error,
            title: "Error".into(),
            description: "Failed to load your characters".into(),
        };
        assert_eq!(notice.to_string(), "❌ Error: Failed to load your characters");
    }
}
