//! The error taxonomy shared by all parts of the protocol core.

use thiserror::Error;

use crate::runtime::PtoState;

/// Errors raised by share operations, the protocol runtime and the gate protocols.
///
/// Every gate operation is atomic: it either completes with a valid
/// [`ShareVector`](crate::share::ShareVector) or fails with one of these errors
/// without producing a partial share.
#[derive(Debug, Error)]
pub enum Error {
    /// An operation was invoked before `init()` or after `destroy()`.
    #[error("`{op}` invoked in state {state:?}")]
    State {
        /// The operation that was attempted.
        op: &'static str,
        /// The lifecycle state the runtime was in.
        state: PtoState,
    },
    /// The two operands do not have the same number of bits.
    #[error("bit lengths do not match: {0} vs {1}")]
    LengthMismatch(usize, usize),
    /// A bit-vector of zero bits was requested.
    #[error("bit vectors must contain at least one bit")]
    EmptyVector,
    /// The cumulative triple demand exceeds the capacity declared at `init()`.
    #[error("triple capacity exceeded: {requested} requested, {remaining} remaining")]
    TripleCapacityExceeded {
        /// The number of triples requested by the current call.
        requested: u64,
        /// The number of triples still available.
        remaining: u64,
    },
    /// A single gate call is wider than the update capacity declared at `init()`.
    #[error("gate width {num} exceeds the declared update capacity {max}")]
    WidthExceeded {
        /// The requested gate width in bits.
        num: usize,
        /// The per-call ceiling recorded at `init()`.
        max: u64,
    },
    /// More wire-consuming rounds were attempted than declared at `init()`.
    #[error("round limit reached: {0} rounds declared at init")]
    RoundLimitReached(u64),
    /// The peer sent a payload that is malformed for the current protocol step.
    ///
    /// Fatal for the whole protocol run; never retried at this layer.
    #[error("malformed peer message during {phase}: {reason}")]
    ProtocolAbort {
        /// The protocol step during which the malformed message arrived.
        phase: &'static str,
        /// What was wrong with the message.
        reason: String,
    },
    /// An error surfaced from the transport collaborator, unmodified.
    #[error("transport error during {phase}: {reason}")]
    Transport {
        /// The protocol step during which the transport failed.
        phase: &'static str,
        /// The transport's own error, formatted.
        reason: String,
    },
    /// Any other input that fails validation before I/O is attempted.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
