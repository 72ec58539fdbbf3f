//! Hand-off of the anchor offset from the formatter to the launcher

/// Carries the pending "move up" count for the panic currently being reported.
///
/// The formatter publishes, the launcher consumes. A launcher that finds
/// nothing published refuses to start rather than guessing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pending_up: Option<usize>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the number of frames between the anchor and the innermost frame
    pub fn publish(&mut self, frames_below_anchor: usize) {
        if let Some(stale) = self.pending_up {
            tracing::debug!("replacing unconsumed frame offset {}", stale);
        }
        self.pending_up = Some(frames_below_anchor);
    }

    pub fn pending(&self) -> Option<usize> {
        self.pending_up
    }

    pub fn is_published(&self) -> bool {
        self.pending_up.is_some()
    }

    /// Forget the published count; it only applies to one panic
    pub fn clear(&mut self) {
        self.pending_up = None;
    }
}
