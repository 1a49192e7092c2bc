//! Clipboard boundary.
//!
//! Copy operations produce a string and hand it to a [`Clipboard`]
//! implementation; a failed OS write surfaces as
//! [`GridError::Clipboard`](crate::error::GridError::Clipboard), never a
//! panic. Tests use [`MemoryClipboard`].

use parking_lot::Mutex;

use crate::error::{GridError, Result};

/// Writes text to a clipboard.
pub trait Clipboard: Send + Sync {
    fn set_text(&self, text: &str) -> Result<()>;
}

/// The OS clipboard, via `arboard`.
///
/// A fresh handle is opened per write; some platforms invalidate long-lived
/// clipboard handles across focus changes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| GridError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| GridError::Clipboard(e.to_string()))
    }
}

/// In-memory clipboard double.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    content: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last written text, if any.
    pub fn text(&self) -> Option<String> {
        self.content.lock().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        *self.content.lock() = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard_round_trip() {
        let clipboard = MemoryClipboard::new();
        assert!(clipboard.text().is_none());
        clipboard.set_text("a\tb").unwrap();
        assert_eq!(clipboard.text().as_deref(), Some("a\tb"));
    }
}
