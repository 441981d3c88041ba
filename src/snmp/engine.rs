//! Request/response correlation over one shared UDP socket: a monotonic
//! request-id counter, a correlation table keyed on that id, one spawned
//! receiver-loop task per engine, and per-request timeout/retry handling.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::error::{Result, SnmpError};
use crate::snmp::message::Message;
use crate::snmp::transport::Transport;

type WaiterTable = Arc<Mutex<HashMap<i32, oneshot::Sender<Message>>>>;

/// Owns the shared socket and the request-id/correlation bookkeeping.
/// Cheap to clone (everything behind `Arc`); the receiver loop keeps the
/// transport alive for as long as any clone exists.
#[derive(Clone)]
pub struct Engine {
    transport: Arc<Transport>,
    next_id: Arc<AtomicI32>,
    waiters: WaiterTable,
}

impl Engine {
    pub async fn new() -> Result<Engine> {
        let transport = Arc::new(Transport::bind_v4().await?);
        let waiters: WaiterTable = Arc::new(Mutex::new(HashMap::new()));
        let engine = Engine {
            transport,
            next_id: Arc::new(AtomicI32::new(1)),
            waiters,
        };
        engine.spawn_receiver_loop();
        Ok(engine)
    }

    fn spawn_receiver_loop(&self) {
        let transport = Arc::clone(&self.transport);
        let waiters = Arc::clone(&self.waiters);
        tokio::spawn(async move {
            loop {
                let (bytes, from) = match transport.recv_from(Duration::from_secs(3600)).await {
                    Ok(v) => v,
                    Err(SnmpError::Timeout(_)) => continue,
                    Err(e) => {
                        warn!(error = %e, "receiver loop socket error, stopping");
                        return;
                    }
                };
                let message = match Message::decode(&bytes) {
                    Ok(m) => m,
                    Err(e) => {
                        debug!(error = %e, from = %from, "dropping undecodable datagram");
                        continue;
                    }
                };
                let request_id = message.pdu.request_id;
                let sender = waiters.lock().expect("correlation table poisoned").remove(&request_id);
                match sender {
                    Some(tx) => {
                        let _ = tx.send(message);
                    }
                    None => trace!(request_id, from = %from, "no waiter for response, dropping"),
                }
            }
        });
    }

    /// Allocate the next request-id, skipping zero and any id currently
    /// awaiting a response.
    fn allocate_request_id(&self) -> i32 {
        loop {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            if id == 0 {
                continue;
            }
            if !self.waiters.lock().expect("correlation table poisoned").contains_key(&id) {
                return id;
            }
        }
    }

    pub fn next_request_id(&self) -> i32 {
        self.allocate_request_id()
    }

    /// Send `message` (whose `pdu.request_id` has already been set via
    /// [`Engine::next_request_id`]) to `target` and wait up to
    /// `request_timeout` for a correlated response.
    pub async fn send_request(
        &self,
        message: &Message,
        target: SocketAddr,
        request_timeout: Duration,
    ) -> Result<Message> {
        let request_id = message.pdu.request_id;
        let (tx, rx) = oneshot::channel();
        self.waiters
            .lock()
            .expect("correlation table poisoned")
            .insert(request_id, tx);

        let bytes = match message.encode() {
            Ok(b) => b,
            Err(e) => {
                self.waiters.lock().expect("correlation table poisoned").remove(&request_id);
                return Err(e);
            }
        };
        if let Err(e) = self.transport.send_to(&bytes, target).await {
            self.waiters.lock().expect("correlation table poisoned").remove(&request_id);
            return Err(e);
        }

        match timeout(request_timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(SnmpError::SocketError("correlation channel closed".into())),
            Err(_) => {
                self.waiters.lock().expect("correlation table poisoned").remove(&request_id);
                Err(SnmpError::Timeout(request_timeout))
            }
        }
    }

    /// Retry `send_request` up to `retries` additional times (so
    /// `retries + 1` attempts total) on timeout; any other error is
    /// returned immediately without retrying. Each retry reissues with a
    /// freshly allocated request-id rather than reusing the one already
    /// spent on the timed-out attempt, so a late reply to attempt N can
    /// never be mistaken for the response to attempt N+1.
    pub async fn send_with_retries(
        &self,
        message: &Message,
        target: SocketAddr,
        request_timeout: Duration,
        retries: u32,
    ) -> Result<Message> {
        let mut message = message.clone();
        let mut attempt = 0;
        loop {
            match self.send_request(&message, target, request_timeout).await {
                Ok(response) => return Ok(response),
                Err(SnmpError::Timeout(d)) => {
                    if attempt >= retries {
                        return Err(SnmpError::Timeout(d));
                    }
                    attempt += 1;
                    message.pdu.request_id = self.next_request_id();
                    debug!(attempt, target = %target, "retrying after timeout with a fresh request-id");
                }
                Err(other) => return Err(other),
            }
        }
    }

    pub fn outstanding_count(&self) -> usize {
        self.waiters.lock().expect("correlation table poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snmp::message::SnmpVersion;
    use crate::snmp::oid::Oid;
    use crate::snmp::pdu::Pdu;

    #[tokio::test]
    async fn retries_reissue_with_a_fresh_request_id() {
        let socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        tokio::spawn(async move {
            let mut buf = vec![0u8; 65_507];
            loop {
                let Ok((len, _from)) = socket.recv_from(&mut buf).await else { return };
                let Ok(msg) = Message::decode(&buf[..len]) else { continue };
                seen_clone.lock().expect("seen mutex poisoned").push(msg.pdu.request_id);
                // deliberately never reply, forcing every attempt to time out.
            }
        });

        let engine = Engine::new().await.unwrap();
        let pdu = Pdu::get(engine.next_request_id(), &[Oid::from_str("1.3.6.1.2.1.1.1.0").unwrap()]).unwrap();
        let message = Message::new(SnmpVersion::V2c, b"public".to_vec(), pdu).unwrap();
        let err = engine
            .send_with_retries(&message, addr, Duration::from_millis(50), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, SnmpError::Timeout(_)));

        tokio::time::sleep(Duration::from_millis(50)).await;
        let ids = seen.lock().expect("seen mutex poisoned").clone();
        assert_eq!(ids.len(), 3, "one initial attempt plus two retries");
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 3, "each retry must use a distinct request-id");
    }
}
