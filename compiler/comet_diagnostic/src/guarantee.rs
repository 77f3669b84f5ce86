use std::fmt;

/// Proof that at least one error diagnostic was emitted.
///
/// The constructor is crate-private: only [`DiagnosticQueue`](crate::DiagnosticQueue)
/// hands these out, so holding one means the user has been told.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) const fn new() -> Self {
        ErrorGuaranteed(())
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("error(s) emitted")
    }
}
