use crate::error::PeerError;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::warn;

type ErrorHook = Arc<dyn Fn(PeerError) + Send + Sync>;

/// Thin proxy for the connection's single data channel. Owns no remote
/// resource itself — it is a view onto commands routed through the same
/// engine link.
///
/// Besides its own command failures, the proxy receives every request
/// failure of the owning peer connection through [`on_error`](Self::on_error)
/// as a best-effort secondary notification path.
pub struct DataChannel {
    label: String,
    error_hook: Mutex<Option<ErrorHook>>,
}

impl DataChannel {
    pub(crate) fn new(label: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            label: label.into(),
            error_hook: Mutex::new(None),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn on_error(&self, hook: impl Fn(PeerError) + Send + Sync + 'static) {
        *self.error_hook.lock() = Some(Arc::new(hook));
    }

    pub(crate) fn notify_error(&self, error: &PeerError) {
        let hook = self.error_hook.lock().clone();
        match hook {
            Some(hook) => hook(error.clone()),
            None => warn!(
                channel = %self.label,
                "data channel error with no handler: {error}"
            ),
        }
    }
}
