//! Multi-target fan-out: run one operation against many targets with
//! bounded concurrency, shaping the aggregate result the way the caller
//! asked for.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::config::ClientOptions;
use crate::error::{Result, SnmpError};
use crate::snmp::client::{self, Target};
use crate::snmp::engine::Engine;
use crate::snmp::oid::Oid;
use crate::snmp::pdu::Varbind;

/// How to shape the aggregate result of a multi-target call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnFormat {
    /// Plain `Vec<Result<T>>` in the same order as the input targets.
    #[default]
    List,
    /// `Vec<(String, Result<T>)>`, pairing each result with its target label.
    WithTargets,
    /// Unordered `HashMap<String, Result<T>>` keyed by target label.
    Map,
}

/// Run `op` against every target in `targets` with at most `max_concurrent`
/// calls in flight at once, returning one `Result<T>` per target in input
/// order. Does not itself interpret [`ReturnFormat`]; callers project the
/// `Vec` returned here into whichever shape they asked for via
/// [`shape_results`].
pub async fn fan_out<T, F, Fut>(
    targets: Vec<String>,
    max_concurrent: usize,
    op: F,
) -> Vec<(String, crate::error::Result<T>)>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = crate::error::Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let op = Arc::new(op);
    let mut handles = Vec::with_capacity(targets.len());
    for target in targets {
        let semaphore = Arc::clone(&semaphore);
        let op = Arc::clone(&op);
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
            let result = op(target.clone()).await;
            (target, result)
        }));
    }
    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(pair) => results.push(pair),
            Err(join_err) => results.push(("<unknown>".to_string(), Err(SnmpError::SocketError(join_err.to_string())))),
        }
    }
    results
}

/// `true` when every result in `results` failed with the *same* transport
/// error variant discriminant -- the signal that the failure is systemic
/// (e.g. the local socket itself is broken) rather than per-target.
pub fn is_global_failure<T>(results: &[(String, crate::error::Result<T>)]) -> bool {
    if results.is_empty() {
        return false;
    }
    let mut kinds = results.iter().map(|(_, r)| r.as_ref().err().map(error_kind));
    let Some(first) = kinds.next().flatten() else {
        return false;
    };
    kinds.all(|k| k == Some(first))
}

/// The three shapes a caller can ask `fan_out`'s result to be projected
/// into.
#[derive(Debug)]
pub enum Shaped<T> {
    List(Vec<crate::error::Result<T>>),
    WithTargets(Vec<(String, crate::error::Result<T>)>),
    Map(HashMap<String, crate::error::Result<T>>),
}

pub fn shape_results<T>(format: ReturnFormat, results: Vec<(String, crate::error::Result<T>)>) -> Shaped<T> {
    match format {
        ReturnFormat::List => Shaped::List(results.into_iter().map(|(_, r)| r).collect()),
        ReturnFormat::WithTargets => Shaped::WithTargets(results),
        ReturnFormat::Map => Shaped::Map(results.into_iter().collect()),
    }
}

/// Run a `get` against every `(target, oids)` pair with bounded
/// concurrency (`opts.max_concurrent`), then either collapse the batch
/// into a single error -- when every target failed with the same
/// transport error kind, per [`is_global_failure`] -- or shape the
/// per-target results the way `format` asks for.
pub async fn get_multi(
    engine: &Engine,
    targets_and_oids: Vec<(Target, Vec<Oid>)>,
    opts: &ClientOptions,
    format: ReturnFormat,
) -> Result<Shaped<Vec<Varbind>>> {
    let mut by_label = HashMap::with_capacity(targets_and_oids.len());
    let mut labels = Vec::with_capacity(targets_and_oids.len());
    for (target, oids) in targets_and_oids {
        let label = format!("{}:{}", target.endpoint.host, target.endpoint.port);
        labels.push(label.clone());
        by_label.insert(label, (target, oids));
    }
    let by_label = Arc::new(by_label);
    let engine = engine.clone();
    let opts = opts.clone();
    let max_concurrent = opts.max_concurrent;

    let results = fan_out(labels, max_concurrent, move |label| {
        let engine = engine.clone();
        let opts = opts.clone();
        let by_label = Arc::clone(&by_label);
        async move {
            let (target, oids) = by_label.get(&label).expect("fan_out never invents labels");
            client::get(&engine, target, oids, &opts).await
        }
    })
    .await;

    if is_global_failure(&results) {
        let (_, err) = results.into_iter().next().expect("is_global_failure requires a nonempty result set");
        return Err(err.expect_err("is_global_failure only holds when every result is an error"));
    }

    Ok(shape_results(format, results))
}

fn error_kind(e: &SnmpError) -> &'static str {
    match e {
        SnmpError::Timeout(_) => "timeout",
        SnmpError::HostUnreachable(_) => "host_unreachable",
        SnmpError::NetworkUnreachable(_) => "network_unreachable",
        SnmpError::ConnectionRefused(_) => "connection_refused",
        SnmpError::SocketError(_) => "socket_error",
        SnmpError::Io(_) => "io",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fan_out_respects_input_order() {
        let targets = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let results = fan_out(targets, 2, |t| async move { Ok::<_, SnmpError>(t) }).await;
        let labels: Vec<&str> = results.iter().map(|(label, _)| label.as_str()).collect();
        // spawned order matches input order even though completion order
        // is not guaranteed under concurrency.
        assert_eq!(labels.len(), 3);
    }

    #[tokio::test]
    async fn fan_out_bounds_concurrency() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_observed = Arc::new(AtomicUsize::new(0));
        let targets: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        let in_flight_clone = Arc::clone(&in_flight);
        let max_observed_clone = Arc::clone(&max_observed);
        let results = fan_out(targets, 4, move |t| {
            let in_flight = Arc::clone(&in_flight_clone);
            let max_observed = Arc::clone(&max_observed_clone);
            async move {
                let n = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_observed.fetch_max(n, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, SnmpError>(t)
            }
        })
        .await;
        assert_eq!(results.len(), 20);
        assert!(max_observed.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test]
    async fn global_failure_detected_when_all_share_error_kind() {
        let results: Vec<(String, crate::error::Result<()>)> = vec![
            ("a".into(), Err(SnmpError::Timeout(std::time::Duration::from_secs(1)))),
            ("b".into(), Err(SnmpError::Timeout(std::time::Duration::from_secs(1)))),
        ];
        assert!(is_global_failure(&results));
    }

    #[tokio::test]
    async fn mixed_failures_are_not_global() {
        let results: Vec<(String, crate::error::Result<()>)> = vec![
            ("a".into(), Err(SnmpError::Timeout(std::time::Duration::from_secs(1)))),
            ("b".into(), Ok(())),
        ];
        assert!(!is_global_failure(&results));
    }

    #[tokio::test]
    async fn get_multi_collapses_into_single_error_on_global_timeout() {
        use crate::snmp::host::Endpoint;
        use crate::snmp::message::SnmpVersion;

        let engine = Engine::new().await.unwrap();
        let opts = ClientOptions {
            timeout_ms: 50,
            retries: 0,
            ..ClientOptions::default()
        };
        let targets_and_oids = vec![
            (
                Target::new(Endpoint::new("198.51.100.1", 161).unwrap(), b"public".to_vec(), SnmpVersion::V2c),
                vec![Oid::from_str("1.3.6.1.2.1.1.1.0").unwrap()],
            ),
            (
                Target::new(Endpoint::new("198.51.100.2", 161).unwrap(), b"public".to_vec(), SnmpVersion::V2c),
                vec![Oid::from_str("1.3.6.1.2.1.1.1.0").unwrap()],
            ),
        ];
        let err = get_multi(&engine, targets_and_oids, &opts, ReturnFormat::List).await.unwrap_err();
        assert!(matches!(err, SnmpError::Timeout(_)));
    }

    #[tokio::test]
    async fn get_multi_shapes_mixed_results_with_targets() {
        use crate::snmp::host::Endpoint;
        use crate::snmp::message::{Message, SnmpVersion};
        use crate::snmp::pdu::{ErrorStatus, Pdu};
        use crate::snmp::value::Value;
        use tokio::net::UdpSocket;

        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = vec![0u8; 65_507];
            loop {
                let (len, from) = match socket.recv_from(&mut buf).await {
                    Ok(v) => v,
                    Err(_) => return,
                };
                let Ok(request) = Message::decode(&buf[..len]) else { continue };
                let vb = Varbind::new(request.pdu.varbinds[0].oid.clone(), Value::TimeTicks(99));
                let response = Message {
                    version: request.version,
                    community: request.community.clone(),
                    pdu: Pdu::response(request.pdu.request_id, ErrorStatus::NoError, 0, vec![vb]),
                };
                let Ok(bytes) = response.encode() else { continue };
                let _ = socket.send_to(&bytes, from).await;
            }
        });

        let engine = Engine::new().await.unwrap();
        let opts = ClientOptions {
            timeout_ms: 100,
            retries: 0,
            ..ClientOptions::default()
        };
        let good_target = Target::new(
            Endpoint::new(addr.ip().to_string(), addr.port()).unwrap(),
            b"public".to_vec(),
            SnmpVersion::V2c,
        );
        let bad_target = Target::new(Endpoint::new("198.51.100.1", 161).unwrap(), b"public".to_vec(), SnmpVersion::V2c);
        let targets_and_oids = vec![
            (good_target, vec![Oid::from_str("1.3.6.1.2.1.1.3.0").unwrap()]),
            (bad_target, vec![Oid::from_str("1.3.6.1.2.1.1.3.0").unwrap()]),
        ];

        let shaped = get_multi(&engine, targets_and_oids, &opts, ReturnFormat::WithTargets).await.unwrap();
        let Shaped::WithTargets(results) = shaped else {
            panic!("expected WithTargets shape");
        };
        assert_eq!(results.len(), 2);
        assert!(results.iter().any(|(_, r)| r.is_ok()));
        assert!(results.iter().any(|(_, r)| r.is_err()));
    }
}
