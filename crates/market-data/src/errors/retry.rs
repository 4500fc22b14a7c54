/// Classification for retry policy.
///
/// Used by callers of the gateway to decide what to do with a failed
/// request without matching on every error variant.
///
/// # Behavior Summary
///
/// | Class | Fix the input? | Wait and retry? |
/// |-------|----------------|-----------------|
/// | `Never` | Yes | No |
/// | `AfterWait` | No | Yes, after `retry_after` |
/// | `CallerDecides` | No | Caller's policy |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - the request or the configuration is fundamentally
    /// invalid and resubmitting the same input won't help.
    Never,

    /// Retry after waiting.
    ///
    /// Used when the sliding window rejected the request. The error
    /// carries an estimated `retry_after` duration; retrying before it
    /// elapses will just be rejected again.
    AfterWait,

    /// The upstream collaborator failed.
    ///
    /// The gateway does not retry upstream failures internally and does
    /// not cache them. Whether the failure is transient (network blip)
    /// or terminal (symbol delisted upstream) is only known to the caller.
    CallerDecides,
}
