//! Side-effect ports injected into the feed controller.
//!
//! Toasts and clipboard writes are capabilities handed to the service
//! rather than ambient calls, so the controller runs headless.

use std::sync::Mutex;

use serde::Serialize;
use utoipa::ToSchema;

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Operation completed.
    Success,
    /// Operation failed.
    Error,
}

/// A user-facing notification (toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Short headline.
    pub title: String,
    /// Optional detail line.
    pub description: Option<String>,
}

impl Notice {
    /// A success notice without a description.
    #[must_use]
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            description: None,
        }
    }

    /// An error notice carrying the failure text.
    #[must_use]
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            description: Some(description.into()),
        }
    }
}

/// Receives user-facing notices.
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Delivers one notice. Must not block.
    fn notify(&self, notice: Notice);
}

/// Error raised when the clipboard rejects a write.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

/// Text sink for "copy to clipboard".
///
/// The HTTP server never writes to a clipboard; embedding front ends pass
/// their own to [`crate::service::FeedService::copy_failure_payload`].
pub trait Clipboard: Send + Sync + std::fmt::Debug {
    /// Replaces the clipboard contents with `text`.
    ///
    /// # Errors
    ///
    /// Returns [`ClipboardError`] if the write is refused.
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Notifier that forwards notices to `tracing`.
///
/// Used by the HTTP service, where there is no toast surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => {
                tracing::info!(title = %notice.title, description = ?notice.description, "notice");
            }
            NoticeLevel::Error => {
                tracing::warn!(title = %notice.title, description = ?notice.description, "notice");
            }
        }
    }
}

/// Clipboard holding the last written text in memory, for headless
/// embedders.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    /// Creates an empty clipboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last written text, if any.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut guard = self
            .contents
            .lock()
            .map_err(|_| ClipboardError("clipboard lock poisoned".to_string()))?;
        *guard = Some(text.to_string());
        Ok(())
    }
}

/// Notifier that records every notice; handy for headless callers.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All notices received so far, oldest first.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
