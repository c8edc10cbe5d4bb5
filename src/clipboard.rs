//! System clipboard access for the share action.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    /// No clipboard provider is reachable (e.g. no display server).
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("failed to set clipboard text: {0}")]
    Write(String),
}

/// Destination for shared article text.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The OS clipboard, opened on first use.
///
/// The handle is kept for the life of the app: on X11 and Wayland the
/// copied text is served by the process that owns it.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.inner.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            self.inner = Some(clipboard);
        }
        let Some(clipboard) = self.inner.as_mut() else {
            return Err(ClipboardError::Unavailable("not initialized".to_string()));
        };
        clipboard
            .set_text(text.to_owned())
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }
}

/// Text placed on the clipboard when sharing an article.
pub fn share_text(title: &str, url: &str) -> String {
    format!("{title}\n{url}")
}
