use std::fmt;

use crate::ValueKind;

/// Pseudo-value that runs a native cleanup callback when its scope ends.
///
/// Sentinels are registered with [`Environment::defer`](crate::Environment::defer)
/// and live only in the owning scope's finalizer list; they are never bound
/// to a name or passed around as a [`Value`](crate::Value).
pub struct DestructSentinel {
    callback: Option<Box<dyn FnOnce()>>,
}

impl DestructSentinel {
    pub fn new(callback: impl FnOnce() + 'static) -> Self {
        DestructSentinel {
            callback: Some(Box::new(callback)),
        }
    }

    pub const fn kind(&self) -> ValueKind {
        ValueKind::Destruct
    }
}

impl Drop for DestructSentinel {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback();
        }
    }
}

impl fmt::Debug for DestructSentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestructSentinel")
            .field("armed", &self.callback.is_some())
            .finish()
    }
}
