/// Classification of an error for the provider retry loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Another attempt against the same provider may succeed.
    Transient,
    /// Further attempts cannot change the outcome for this call.
    Terminal,
}

impl RetryClass {
    /// Whether the retry loop should attempt the operation again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RetryClass::Transient)
    }
}
