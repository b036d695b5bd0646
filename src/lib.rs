//! Two-party secret-shared Boolean circuit evaluation using Beaver triples.
//!
//! This crate is the foundational primitive that higher-level secure two-party
//! protocols (private equality tests, private set intersection, aggregation)
//! reduce to: AND/XOR/NOT gates over XOR-shared bit-vectors, executed over a
//! generic request/response protocol runtime in the semi-honest model.
//!
//! ## Main components
//!
//! * [`share::ShareVector`]: a bit-packed vector that is either one party's
//!   share of a secret or a public plaintext both parties hold.
//! * [`triple`]: Beaver triples and the [`triple::TripleSource`] collaborator
//!   that deals them, including a deterministic [`triple::TrustedDealer`].
//! * [`packet`] / [`transport`]: wire-message framing fully qualified by
//!   `(task_id, pto_id, step_id, sequence, sender, receiver)` and the
//!   [`transport::Transport`] collaborator that delivers it.
//! * [`runtime::ProtocolRuntime`]: the per-party lifecycle state machine with
//!   capacity ceilings and gate-cost accounting.
//! * [`circuit::BooleanCircuitParty`]: the gate protocols themselves.
//!
//! ## Basic usage
//!
//! Each of the two parties constructs a [`circuit::BooleanCircuitParty`] over
//! its end of a transport and its half of a triple source, calls `init`, and
//! then drives the same sequence of gate calls:
//!
//! ```ignore
//! use z2pc::{circuit::{BooleanCircuitParty, Role}, share::ShareVector};
//!
//! # async fn example() -> Result<(), z2pc::error::Error> {
//! let mut party = BooleanCircuitParty::new(Role::Sender, 1, transport, triples);
//! party.init(1024, 4096)?;
//!
//! let x = ShareVector::new(my_x_share, 128, false)?;
//! let y = ShareVector::new(my_y_share, 128, false)?;
//! let z = party.and(&x, &y).await?; // one triple, one round trip
//! party.destroy();
//! # Ok(())
//! # }
//! ```
//!
//! An AND of two private `n`-bit vectors is one wire exchange carrying all `n`
//! logical gates packed together; XOR and NOT never touch the network.
//!
//! ## Security model
//!
//! Semi-honest only: peer messages are checked for well-formedness, not for
//! adversarial cheating. Shares and triples are ephemeral, in-memory values.
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod circuit;
pub mod error;
pub mod packet;
pub mod runtime;
pub mod share;
pub mod transport;
pub mod triple;

pub use circuit::{BooleanCircuitParty, Role};
pub use error::Error;
pub use share::ShareVector;
