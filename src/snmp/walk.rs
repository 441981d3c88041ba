//! Subtree walking: GetNext-driven under v1, GetBulk-driven with adaptive
//! repetition sizing under v2c, terminating on exhaustion of the subtree
//! or an explicit `endOfMibView`.

use std::collections::VecDeque;
use std::time::Duration;

use crate::config::ClientOptions;
use crate::error::{Result, SnmpError};
use crate::snmp::engine::Engine;
use crate::snmp::message::{Message, SnmpVersion};
use crate::snmp::oid::Oid;
use crate::snmp::pdu::{ErrorStatus, Pdu, Varbind};
use crate::snmp::value::Value;

use super::client::Target;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Walking,
    Done,
}

/// A lazily-pulled stream over one subtree walk. Exposes a plain async
/// `next()` rather than implementing `futures::Stream`, so the crate does
/// not need to depend on `futures`/`async-stream` for this alone.
pub struct WalkStream<'a> {
    engine: &'a Engine,
    target: &'a Target,
    opts: &'a ClientOptions,
    root: Oid,
    strict_typing: bool,
    cursor: Oid,
    state: State,
    bulk_size: u32,
    consecutive_successes: u32,
    expected_type: Option<crate::snmp::value::ValueType>,
    buffered: VecDeque<Varbind>,
}

impl<'a> WalkStream<'a> {
    pub fn new(engine: &'a Engine, target: &'a Target, root: Oid, opts: &'a ClientOptions) -> WalkStream<'a> {
        WalkStream {
            engine,
            target,
            opts,
            cursor: root.clone(),
            root,
            strict_typing: false,
            state: State::Walking,
            bulk_size: opts.max_repetitions.clamp(opts.bulk_floor, opts.bulk_ceiling),
            consecutive_successes: 0,
            expected_type: None,
            buffered: VecDeque::new(),
        }
    }

    /// When set, a value whose wire type is inconsistent with the rest of
    /// the table column being walked aborts the walk with
    /// [`SnmpError::TypeInformationLost`] instead of silently returning it.
    pub fn with_strict_typing(mut self, strict: bool) -> Self {
        self.strict_typing = strict;
        self
    }

    /// Pull the next in-subtree varbind, or `Ok(None)` once the walk has
    /// exhausted the subtree. A transport-level error (timeout, socket
    /// error) ends the walk immediately with that error -- it is not
    /// retried internally beyond the per-request retry budget in `opts`.
    pub async fn next(&mut self) -> Option<Result<Varbind>> {
        loop {
            if let Some(vb) = self.buffered.pop_front() {
                match self.accept_candidate(vb) {
                    StepOutcome::Item(vb) => return Some(Ok(vb)),
                    StepOutcome::Empty => continue,
                    StepOutcome::Finished => {
                        self.buffered.clear();
                        self.state = State::Done;
                        return None;
                    }
                    StepOutcome::Error(e) => {
                        self.buffered.clear();
                        self.state = State::Done;
                        return Some(Err(e));
                    }
                }
            }
            if self.state == State::Done {
                return None;
            }
            let outcome = match self.target.version {
                SnmpVersion::V1 => self.step_get_next().await,
                SnmpVersion::V2c => self.step_get_bulk().await,
            };
            match outcome {
                StepOutcome::Item(vb) => return Some(Ok(vb)),
                StepOutcome::Empty => continue,
                StepOutcome::Finished => {
                    self.state = State::Done;
                    return None;
                }
                StepOutcome::Error(e) => {
                    self.state = State::Done;
                    return Some(Err(e));
                }
            }
        }
    }

    async fn step_get_next(&mut self) -> StepOutcome {
        let request_id = self.engine.next_request_id();
        let pdu = match Pdu::get_next(request_id, std::slice::from_ref(&self.cursor)) {
            Ok(p) => p,
            Err(e) => return StepOutcome::Error(e),
        };
        let message = match Message::new(SnmpVersion::V1, self.target.community.clone(), pdu) {
            Ok(m) => m,
            Err(e) => return StepOutcome::Error(e),
        };
        let addr = match self.resolve_addr().await {
            Ok(a) => a,
            Err(e) => return StepOutcome::Error(e),
        };
        let response = match self
            .engine
            .send_with_retries(&message, addr, Duration::from_millis(self.opts.timeout_ms), self.opts.retries)
            .await
        {
            Ok(r) => r,
            Err(e) => return StepOutcome::Error(e),
        };
        if response.pdu.error_status == ErrorStatus::NoSuchName {
            return StepOutcome::Finished;
        }
        if !response.pdu.error_status.is_no_error() {
            return StepOutcome::Error(SnmpError::Protocol {
                status: response.pdu.error_status,
                index: response.pdu.error_index,
            });
        }
        let Some(vb) = response.pdu.varbinds.into_iter().next() else {
            return StepOutcome::Finished;
        };
        self.accept_candidate(vb)
    }

    async fn step_get_bulk(&mut self) -> StepOutcome {
        let request_id = self.engine.next_request_id();
        let pdu = match Pdu::get_bulk(request_id, 0, self.bulk_size, std::slice::from_ref(&self.cursor)) {
            Ok(p) => p,
            Err(e) => return StepOutcome::Error(e),
        };
        let message = match Message::new(SnmpVersion::V2c, self.target.community.clone(), pdu) {
            Ok(m) => m,
            Err(e) => return StepOutcome::Error(e),
        };
        let addr = match self.resolve_addr().await {
            Ok(a) => a,
            Err(e) => return StepOutcome::Error(e),
        };
        let response = match self
            .engine
            .send_with_retries(&message, addr, Duration::from_millis(self.opts.timeout_ms), self.opts.retries)
            .await
        {
            Ok(r) => r,
            Err(e) => return StepOutcome::Error(e),
        };
        if response.pdu.error_status == ErrorStatus::TooBig {
            if self.bulk_size <= self.opts.bulk_floor {
                return StepOutcome::Error(SnmpError::Protocol {
                    status: ErrorStatus::TooBig,
                    index: response.pdu.error_index,
                });
            }
            self.bulk_size = (self.bulk_size / 2).max(self.opts.bulk_floor);
            self.consecutive_successes = 0;
            return StepOutcome::Empty;
        }
        if !response.pdu.error_status.is_no_error() {
            return StepOutcome::Error(SnmpError::Protocol {
                status: response.pdu.error_status,
                index: response.pdu.error_index,
            });
        }
        self.consecutive_successes += 1;
        if self.consecutive_successes >= 3 && self.bulk_size < self.opts.bulk_ceiling {
            self.bulk_size = (self.bulk_size * 2).min(self.opts.bulk_ceiling);
            self.consecutive_successes = 0;
        }

        if response.pdu.varbinds.is_empty() {
            return StepOutcome::Finished;
        }
        // Advance the cursor to the last varbind's OID up front so the next
        // GetBulk (if this batch turns out to be entirely out-of-subtree)
        // still makes forward progress; accept_candidate() will move it
        // further as the buffer is drained.
        if let Some(last) = response.pdu.varbinds.last() {
            self.cursor = last.oid.clone();
        }
        self.buffered = response.pdu.varbinds.into_iter().collect();
        StepOutcome::Empty
    }

    fn accept_candidate(&mut self, vb: Varbind) -> StepOutcome {
        if matches!(vb.value, Value::EndOfMibView) {
            return StepOutcome::Finished;
        }
        if !vb.oid.is_child_of(&self.root) {
            return StepOutcome::Finished;
        }
        if matches!(vb.value, Value::NoSuchObject | Value::NoSuchInstance) {
            return StepOutcome::Finished;
        }
        if self.strict_typing {
            if let Some(expected) = self.expected_type {
                if vb.value_type() != expected {
                    return StepOutcome::Error(SnmpError::TypeInformationLost(vb.oid.to_dotted_string()));
                }
            } else {
                self.expected_type = Some(vb.value_type());
            }
        }
        self.cursor = vb.oid.clone();
        StepOutcome::Item(vb)
    }

    async fn resolve_addr(&self) -> Result<std::net::SocketAddr> {
        self.target.socket_addr().await
    }
}

enum StepOutcome {
    Item(Varbind),
    Empty,
    Finished,
    Error(crate::error::SnmpError),
}

/// Drain an entire subtree into a `Vec<Varbind>`. Per the "error alone"
/// failure semantics, any error pulled from the underlying stream aborts
/// the walk immediately and is returned as-is, discarding whatever had
/// already been collected -- there is no partial-result return.
pub async fn walk(engine: &Engine, target: &Target, root: Oid, opts: &ClientOptions) -> Result<Vec<Varbind>> {
    let mut stream = WalkStream::new(engine, target, root, opts);
    let mut collected = Vec::new();
    while let Some(item) = stream.next().await {
        collected.push(item?);
    }
    Ok(collected)
}
