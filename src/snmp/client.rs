//! Single-target request/response operations: get, get-next, set, and
//! get-bulk, each composing `snmp::engine` with exception surfacing and
//! the genErr-normalization rule from RFC 1905 §4.2.1.

use std::net::SocketAddr;
use std::time::Duration;

use crate::config::ClientOptions;
use crate::error::{Result, SnmpError};
use crate::snmp::engine::Engine;
use crate::snmp::host::Endpoint;
use crate::snmp::message::{Message, SnmpVersion};
use crate::snmp::oid::Oid;
use crate::snmp::pdu::{ErrorStatus, Pdu, Varbind};
use crate::snmp::value::Value;

/// A single target's connection parameters: where to send, which
/// community/version to frame with, and the per-call timing budget.
#[derive(Debug, Clone)]
pub struct Target {
    pub endpoint: Endpoint,
    pub community: Vec<u8>,
    pub version: SnmpVersion,
}

impl Target {
    pub fn new(endpoint: Endpoint, community: impl Into<Vec<u8>>, version: SnmpVersion) -> Target {
        Target {
            endpoint,
            community: community.into(),
            version,
        }
    }

    pub fn from_options(address: &str, opts: &ClientOptions) -> Result<Target> {
        let endpoint = Endpoint::parse(address)?;
        Ok(Target::new(endpoint, opts.community.as_bytes(), opts.version))
    }

    pub(crate) async fn socket_addr(&self) -> Result<SocketAddr> {
        if let Some(addr) = self.endpoint.socket_addr_if_numeric() {
            return Ok(addr);
        }
        let host_port = format!("{}:{}", self.endpoint.host, self.endpoint.port);
        let mut addrs = tokio::net::lookup_host(&host_port)
            .await
            .map_err(SnmpError::Io)?;
        addrs
            .next()
            .ok_or_else(|| SnmpError::UnsupportedFormat(format!("no address found for {host_port}")))
    }
}

/// Issue a single GetRequest for `oids`, returning one varbind per OID in
/// the order requested.
pub async fn get(engine: &Engine, target: &Target, oids: &[Oid], opts: &ClientOptions) -> Result<Vec<Varbind>> {
    let addr = target.socket_addr().await?;
    let request_id = engine.next_request_id();
    let pdu = Pdu::get(request_id, oids)?;
    let message = Message::new(target.version, target.community.clone(), pdu)?;
    let response = engine
        .send_with_retries(&message, addr, Duration::from_millis(opts.timeout_ms), opts.retries)
        .await?;
    normalize_get_response(response)
}

/// Issue a single GetNextRequest for `oids`.
pub async fn get_next(engine: &Engine, target: &Target, oids: &[Oid], opts: &ClientOptions) -> Result<Vec<Varbind>> {
    let addr = target.socket_addr().await?;
    let request_id = engine.next_request_id();
    let pdu = Pdu::get_next(request_id, oids)?;
    let message = Message::new(target.version, target.community.clone(), pdu)?;
    let response = engine
        .send_with_retries(&message, addr, Duration::from_millis(opts.timeout_ms), opts.retries)
        .await?;
    normalize_get_response(response)
}

/// Issue a single SetRequest. Unlike get/get-next, a nonzero error-status
/// here is never normalized away -- it is always returned as
/// [`SnmpError::Protocol`], since genErr on a Set carries real meaning
/// (the agent rejected the write).
pub async fn set(engine: &Engine, target: &Target, varbinds: Vec<Varbind>, opts: &ClientOptions) -> Result<Vec<Varbind>> {
    let addr = target.socket_addr().await?;
    let request_id = engine.next_request_id();
    let pdu = Pdu::set(request_id, varbinds)?;
    let message = Message::new(target.version, target.community.clone(), pdu)?;
    let response = engine
        .send_with_retries(&message, addr, Duration::from_millis(opts.timeout_ms), opts.retries)
        .await?;
    reject_error_status(&response.pdu)?;
    Ok(response.pdu.varbinds)
}

/// Issue a single GetBulkRequest. Rejected outright under SNMPv1 without
/// sending any bytes, per [`crate::error::SnmpError::GetBulkRequiresV2c`].
pub async fn get_bulk(
    engine: &Engine,
    target: &Target,
    non_repeaters: u32,
    max_repetitions: u32,
    oids: &[Oid],
    opts: &ClientOptions,
) -> Result<Vec<Varbind>> {
    if target.version != SnmpVersion::V2c {
        return Err(SnmpError::GetBulkRequiresV2c);
    }
    let addr = target.socket_addr().await?;
    let request_id = engine.next_request_id();
    let pdu = Pdu::get_bulk(request_id, non_repeaters, max_repetitions, oids)?;
    let message = Message::new(target.version, target.community.clone(), pdu)?;
    let response = engine
        .send_with_retries(&message, addr, Duration::from_millis(opts.timeout_ms), opts.retries)
        .await?;
    reject_error_status(&response.pdu)?;
    Ok(response.pdu.varbinds)
}

/// Get/GetNext-only normalization: a bare `genErr` with no more specific
/// per-varbind exception is folded into a version-appropriate "not found"
/// error, since in practice agents use genErr as a catch-all. On SNMPv1
/// that's `noSuchName`, matching how v1 itself reports an absent object;
/// on SNMPv2c it's `noSuchObject`, matching how most v2c agents actually
/// report the same condition. Any other nonzero error-status is surfaced
/// as-is. v2c per-varbind exception values are then promoted to errors
/// since a single-target call has nowhere else to put them.
fn normalize_get_response(response: Message) -> Result<Vec<Varbind>> {
    let version = response.version;
    let pdu = response.pdu;
    if pdu.error_status == ErrorStatus::GenErr {
        return Err(match version {
            SnmpVersion::V1 => SnmpError::Protocol {
                status: ErrorStatus::NoSuchName,
                index: pdu.error_index,
            },
            SnmpVersion::V2c => {
                let oid = pdu.varbinds.first().map(|vb| vb.oid.to_dotted_string()).unwrap_or_default();
                SnmpError::NoSuchObject(oid)
            }
        });
    }
    reject_error_status(&pdu)?;
    for vb in &pdu.varbinds {
        match &vb.value {
            Value::NoSuchObject => return Err(SnmpError::NoSuchObject(vb.oid.to_dotted_string())),
            Value::NoSuchInstance => return Err(SnmpError::NoSuchInstance(vb.oid.to_dotted_string())),
            Value::EndOfMibView => return Err(SnmpError::EndOfMibView(vb.oid.to_dotted_string())),
            _ => {}
        }
    }
    Ok(pdu.varbinds)
}

fn reject_error_status(pdu: &Pdu) -> Result<()> {
    if !pdu.error_status.is_no_error() {
        return Err(SnmpError::Protocol {
            status: pdu.error_status,
            index: pdu.error_index,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genuine_no_such_name_passes_through_normalization() {
        let pdu = Pdu::response(1, ErrorStatus::NoSuchName, 1, vec![]);
        let msg = Message {
            version: SnmpVersion::V1,
            community: b"public".to_vec(),
            pdu,
        };
        let err = normalize_get_response(msg).unwrap_err();
        assert!(matches!(
            err,
            SnmpError::Protocol {
                status: ErrorStatus::NoSuchName,
                ..
            }
        ));
    }

    #[test]
    fn gen_err_is_normalized_to_no_such_name_on_v1() {
        let pdu = Pdu::response(1, ErrorStatus::GenErr, 1, vec![]);
        let msg = Message {
            version: SnmpVersion::V1,
            community: b"public".to_vec(),
            pdu,
        };
        let err = normalize_get_response(msg).unwrap_err();
        assert!(matches!(
            err,
            SnmpError::Protocol {
                status: ErrorStatus::NoSuchName,
                ..
            }
        ));
    }

    #[test]
    fn gen_err_is_normalized_to_no_such_object_on_v2c() {
        let pdu = Pdu::response(1, ErrorStatus::GenErr, 1, vec![]);
        let msg = Message {
            version: SnmpVersion::V2c,
            community: b"public".to_vec(),
            pdu,
        };
        let err = normalize_get_response(msg).unwrap_err();
        assert!(matches!(err, SnmpError::NoSuchObject(_)));
    }

    #[test]
    fn v2c_exception_value_surfaces_as_error() {
        let varbinds = vec![Varbind::new(Oid::from_str("1.3.6.1.2.1.1.99.0").unwrap(), Value::NoSuchObject)];
        let pdu = Pdu::response(1, ErrorStatus::NoError, 0, varbinds);
        let msg = Message {
            version: SnmpVersion::V2c,
            community: b"public".to_vec(),
            pdu,
        };
        let err = normalize_get_response(msg).unwrap_err();
        assert!(matches!(err, SnmpError::NoSuchObject(_)));
    }

    #[test]
    fn clean_response_returns_varbinds() {
        let varbinds = vec![Varbind::new(
            Oid::from_str("1.3.6.1.2.1.1.1.0").unwrap(),
            Value::OctetString(b"widget".to_vec()),
        )];
        let pdu = Pdu::response(1, ErrorStatus::NoError, 0, varbinds.clone());
        let msg = Message {
            version: SnmpVersion::V1,
            community: b"public".to_vec(),
            pdu,
        };
        let result = normalize_get_response(msg).unwrap();
        assert_eq!(result, varbinds);
    }
}
