//! Wire-message framing for a multiplexed two-party transport.
//!
//! Every message is fully qualified by `(task_id, pto_id, step_id, sequence,
//! sender, receiver)`, so concurrent protocol instances can share one transport
//! and out-of-order delivery can still be paired correctly.

use serde::{Deserialize, Serialize};

/// A party identity, stable for one session; only used to tag messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// The numeric party id, used in packet headers.
    pub id: u32,
    /// A human-readable name, for logs only.
    pub name: String,
}

/// A compile-time constant identifying a protocol type.
///
/// `pto_id` namespaces message routing. No two distinct protocols may share a
/// `pto_id` within one process; a collision is a configuration bug, not a
/// runtime error, so it is not checked here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolDescriptor {
    /// The globally unique protocol id.
    pub pto_id: i32,
    /// The protocol name, for logs only.
    pub pto_name: &'static str,
}

/// The descriptor of the secret-shared Boolean circuit protocol.
pub const BOOLEAN_CIRCUIT: ProtocolDescriptor = ProtocolDescriptor {
    pto_id: 0x0201,
    pto_name: "boolean_circuit",
};

/// Step ids of the Boolean circuit protocol, namespaced under [`BOOLEAN_CIRCUIT`].
pub mod step {
    /// The single round trip of the Beaver AND gate, carrying `[e, f]`.
    pub const AND_EXCHANGE: i32 = 0;
    /// An empty barrier packet.
    pub const SYNCHRONIZE: i32 = 1;
}

/// The header that fully qualifies a message on a multiplexed transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PacketHeader {
    /// Distinguishes concurrently-running instances sharing one transport.
    pub task_id: i64,
    /// The protocol id, see [`ProtocolDescriptor`].
    pub pto_id: i32,
    /// The protocol step this message belongs to.
    pub step_id: i32,
    /// Disambiguates repeated executions of the same step within a task.
    ///
    /// The AND gate uses the accumulated gate count as the sequence, so every
    /// round trip of a task carries a distinct value.
    pub sequence: i64,
    /// The id of the sending party.
    pub sender: u32,
    /// The id of the receiving party.
    pub receiver: u32,
}

impl PacketHeader {
    /// The header the peer's answer to this message will carry: same
    /// qualification, sender and receiver swapped.
    pub fn mirrored(&self) -> PacketHeader {
        PacketHeader {
            sender: self.receiver,
            receiver: self.sender,
            ..*self
        }
    }
}

/// One wire message: a header plus an ordered list of packed-bit byte arrays.
///
/// Immutable once sent; purely a wire artifact, not retained after delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePacket {
    /// The routing header.
    pub header: PacketHeader,
    /// The payload byte arrays; their count and lengths are step-specific.
    pub payload: Vec<Vec<u8>>,
}
