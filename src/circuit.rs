//! Two-party secret-shared Boolean circuit evaluation.
//!
//! Both parties run the same code over symmetric [`BooleanCircuitParty`]
//! objects; the [`Role`] only fixes which side carries the Beaver correction
//! term and which side applies public plaintexts in a mixed XOR. XOR and NOT
//! are local; only an AND of two private vectors consumes a Beaver triple and
//! one request/response round trip. Batching many logical gates into one wide
//! vector is the scalability lever, not pipelining.

use tracing::{Level, instrument};

use crate::{
    error::Error,
    packet::{BOOLEAN_CIRCUIT, MessagePacket, Party, step},
    runtime::ProtocolRuntime,
    share::ShareVector,
    transport::Transport,
    triple::TripleSource,
};

/// The role of a party in the two-party protocol.
///
/// The two roles are logically peers; the names only disambiguate the ends of
/// the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Party 0. Carries the `e AND f` correction term of the Beaver AND gate
    /// and applies public plaintexts in mixed XOR gates.
    Sender,
    /// Party 1.
    Receiver,
}

impl Role {
    fn party(self) -> Party {
        match self {
            Role::Sender => Party {
                id: 0,
                name: "sender".into(),
            },
            Role::Receiver => Party {
                id: 1,
                name: "receiver".into(),
            },
        }
    }

    fn peer(self) -> Party {
        match self {
            Role::Sender => Role::Receiver.party(),
            Role::Receiver => Role::Sender.party(),
        }
    }
}

/// One party of the secret-shared Boolean circuit protocol.
///
/// Drive it with `init()`, then any number of `and()` / `xor()` / `not()`
/// calls, then `destroy()`. Every gate call is atomic: it either returns a
/// valid [`ShareVector`] or fails without producing a partial share.
#[derive(Debug)]
pub struct BooleanCircuitParty<T: Transport, S: TripleSource> {
    runtime: ProtocolRuntime,
    transport: T,
    source: S,
    role: Role,
}

impl<T: Transport, S: TripleSource> BooleanCircuitParty<T, S> {
    /// Creates an uninitialized party for one end of the transport.
    ///
    /// `task_id` distinguishes concurrently-running protocol instances sharing
    /// one transport.
    pub fn new(role: Role, task_id: i64, transport: T, source: S) -> Self {
        let runtime = ProtocolRuntime::new(BOOLEAN_CIRCUIT, role.party(), role.peer(), task_id);
        BooleanCircuitParty {
            runtime,
            transport,
            source,
            role,
        }
    }

    /// Records capacity ceilings and initializes the triple source with a
    /// capacity of `max_round_num * update_num` triples.
    pub fn init(&mut self, max_round_num: u64, update_num: u64) -> Result<(), Error> {
        self.runtime.init(max_round_num, update_num)?;
        self.source
            .init(max_round_num.saturating_mul(update_num))?;
        Ok(())
    }

    /// Releases the runtime; all subsequent operations fail with
    /// [`Error::State`]. Shares already returned stay valid, they are ordinary
    /// owned values.
    pub fn destroy(&mut self) {
        self.runtime.destroy();
    }

    /// Computes a sharing of `x AND y`.
    ///
    /// If both operands are public the result is public and computed locally;
    /// if exactly one is public the plaintext is ANDed against the private
    /// share locally. Only two private operands run the Beaver protocol: one
    /// triple of `x.bit_len()` bits and one round trip.
    #[instrument(level = Level::DEBUG, skip_all, err)]
    pub async fn and(&mut self, x: &ShareVector, y: &ShareVector) -> Result<ShareVector, Error> {
        self.runtime.ensure_ready("and")?;
        if x.bit_len() != y.bit_len() {
            return Err(Error::LengthMismatch(x.bit_len(), y.bit_len()));
        }
        if x.is_public() || y.is_public() {
            // Public AND distributes over XOR shares, so both the public-public
            // and the mixed case are free local ops.
            return x.and(y);
        }
        self.beaver_and(x, y).await
    }

    /// Computes a sharing of `x XOR y`. Always local, never touches the
    /// network; only the private-private case is counted.
    pub fn xor(&mut self, x: &ShareVector, y: &ShareVector) -> Result<ShareVector, Error> {
        self.runtime.ensure_ready("xor")?;
        if x.bit_len() != y.bit_len() {
            return Err(Error::LengthMismatch(x.bit_len(), y.bit_len()));
        }
        match (x.is_public(), y.is_public()) {
            (true, true) => x.xor(y),
            (false, false) => {
                self.runtime.count_xor(x.bit_len());
                x.xor(y)
            }
            _ => {
                // XOR-ing a plaintext into a shared secret must flip exactly
                // one party's share.
                let (public, private) = if x.is_public() { (x, y) } else { (y, x) };
                match self.role {
                    Role::Sender => public.xor(private),
                    Role::Receiver => Ok(private.clone()),
                }
            }
        }
    }

    /// Computes a sharing of `NOT x` as `x XOR 1…1`, a public-operand XOR:
    /// local, uncounted, no network.
    pub fn not(&mut self, x: &ShareVector) -> Result<ShareVector, Error> {
        let ones = ShareVector::ones(x.bit_len())?;
        self.xor(x, &ones)
    }

    /// Barrier with the peer: one empty packet each way.
    pub async fn synchronize(&mut self) -> Result<(), Error> {
        self.runtime.ensure_ready("synchronize")?;
        let seq = self.runtime.next_sync_seq();
        let packet = MessagePacket {
            header: self.runtime.stamp(step::SYNCHRONIZE, seq),
            payload: vec![],
        };
        self.transport
            .send(packet)
            .await
            .map_err(|e| transport_err("synchronize", e))?;
        let template = self.runtime.expect(step::SYNCHRONIZE, seq);
        self.transport
            .receive(&template)
            .await
            .map_err(|e| transport_err("synchronize", e))?;
        Ok(())
    }

    /// Returns the accumulated AND gate count, zeroing it if `reset` is set.
    /// Advisory only; resetting never affects the task id.
    pub fn and_gate_num(&mut self, reset: bool) -> u64 {
        self.runtime.and_gate_num(reset)
    }

    /// Returns the accumulated XOR gate count, zeroing it if `reset` is set.
    pub fn xor_gate_num(&mut self, reset: bool) -> u64 {
        self.runtime.xor_gate_num(reset)
    }

    /// The underlying transport, for its byte-accounting accessors.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The Beaver AND protocol for two private operands.
    ///
    /// All validation and the triple draw happen before the round is entered,
    /// so every pre-I/O failure leaves the runtime `Ready`.
    async fn beaver_and(&mut self, x: &ShareVector, y: &ShareVector) -> Result<ShareVector, Error> {
        let num = x.bit_len();
        self.runtime.check_width(num)?;
        self.runtime.check_round()?;
        let triple = self.source.generate(num)?;
        let a = ShareVector::new(triple.a, num, false)?;
        let b = ShareVector::new(triple.b, num, false)?;
        let c = ShareVector::new(triple.c, num, false)?;

        self.runtime.begin("and")?;
        let seq = self.runtime.count_and(num);
        let e_own = x.xor(&a)?;
        let f_own = y.xor(&b)?;
        let packet = MessagePacket {
            header: self.runtime.stamp(step::AND_EXCHANGE, seq),
            payload: vec![e_own.bytes().to_vec(), f_own.bytes().to_vec()],
        };
        self.transport
            .send(packet)
            .await
            .map_err(|e| transport_err("and", e))?;
        self.runtime.step("and")?;

        let template = self.runtime.expect(step::AND_EXCHANGE, seq);
        let reply = self
            .transport
            .receive(&template)
            .await
            .map_err(|e| transport_err("and", e))?;
        let (e_peer, f_peer) = parse_and_payload(reply, num)?;

        // Open e = x ^ a and f = y ^ b; they leak nothing since a and b are
        // uniformly random and consumed only once.
        let e = e_own.xor(&e_peer)?;
        let f = f_own.xor(&f_peer)?;

        // z_i = (e AND b_i) ^ (f AND a_i) ^ c_i, plus e AND f on exactly one
        // side so that z_0 ^ z_1 = x AND y.
        let mut z = e.and(&b)?;
        z.xori(&f.and(&a)?)?;
        z.xori(&c)?;
        if self.role == Role::Sender {
            z.xori(&e.and(&f)?)?;
        }
        self.runtime.end("and")?;
        Ok(z)
    }
}

fn transport_err(phase: &'static str, e: impl std::fmt::Debug) -> Error {
    Error::Transport {
        phase,
        reason: format!("{e:?}"),
    }
}

/// Validates and unpacks the peer's `[e, f]` payload for a `num`-bit AND.
fn parse_and_payload(
    reply: MessagePacket,
    num: usize,
) -> Result<(ShareVector, ShareVector), Error> {
    let element_count = reply.payload.len();
    let mut payload = reply.payload.into_iter();
    let (Some(e), Some(f), None) = (payload.next(), payload.next(), payload.next()) else {
        return Err(Error::ProtocolAbort {
            phase: "and",
            reason: format!("expected 2 payload arrays, got {element_count}"),
        });
    };
    let bytes = num.div_ceil(8);
    for array in [&e, &f] {
        if array.len() != bytes {
            return Err(Error::ProtocolAbort {
                phase: "and",
                reason: format!("expected {bytes}-byte arrays, got {}", array.len()),
            });
        }
    }
    Ok((
        ShareVector::new(e, num, false)?,
        ShareVector::new(f, num, false)?,
    ))
}
