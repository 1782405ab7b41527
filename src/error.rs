use alloc::string::String;

/// Errors produced by the fallible helper APIs (selector and option parsing, tree mutation).
///
/// The reveal path itself (`init_reveal`, `reveal_elements`, ...) never returns an error: it
/// degrades instead.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RevealError {
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector {
        selector: String,
        reason: &'static str,
    },

    #[error("invalid root margin `{margin}`: {reason}")]
    InvalidRootMargin {
        margin: String,
        reason: &'static str,
    },

    #[error("threshold must be a number in [0, 1], got {0}")]
    InvalidThreshold(f64),

    /// The requested tree mutation would produce an invalid tree (cycle, text parent, ...).
    #[error("hierarchy request rejected: {0}")]
    HierarchyRequest(&'static str),
}
