//! The single discriminated error type returned by every fallible operation
//! in the crate. Modeled on `nd_core::snmp::SnmpError` from the sibling
//! SNMP client: one flat enum via `thiserror`, no `anyhow::Error` across
//! the public API.

use crate::snmp::pdu::ErrorStatus;

/// All failure modes surfaced by the SNMP toolkit.
#[derive(Debug, thiserror::Error)]
pub enum SnmpError {
    // ---- codec errors (never retried) ----
    #[error("invalid BER tag: expected {expected:#04x}, got {got:#04x}")]
    InvalidTag { expected: u8, got: u8 },

    #[error("invalid BER length encoding")]
    InvalidLength,

    #[error("BER length {0} exceeds the supported maximum")]
    LengthTooLarge(usize),

    #[error("insufficient content: need {needed} bytes, have {available}")]
    InsufficientContent { needed: usize, available: usize },

    #[error("indefinite-length BER encoding is not supported")]
    IndefiniteLengthUnsupported,

    #[error("invalid object identifier: {0}")]
    InvalidOid(String),

    #[error("truncated OID subidentifier")]
    TruncatedSubidentifier,

    #[error("INTEGER content is empty")]
    EmptyInteger,

    // ---- protocol errors (error-status on a response PDU) ----
    #[error("agent returned error-status {status:?} at varbind index {index}")]
    Protocol { status: ErrorStatus, index: u32 },

    // ---- v2c exception values surfaced as errors on single-target calls ----
    #[error("noSuchObject for {0}")]
    NoSuchObject(String),

    #[error("noSuchInstance for {0}")]
    NoSuchInstance(String),

    #[error("endOfMibView for {0}")]
    EndOfMibView(String),

    // ---- transport errors ----
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("host unreachable: {0}")]
    HostUnreachable(String),

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("socket error: {0}")]
    SocketError(String),

    // ---- validation errors ----
    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("invalid IPv4 tuple: {0:?}")]
    InvalidIpv4Tuple(Vec<u16>),

    #[error("invalid IPv6 tuple: {0:?}")]
    InvalidIpv6Tuple(Vec<u16>),

    #[error("unsupported endpoint format: {0}")]
    UnsupportedFormat(String),

    #[error("GetBulk requires SNMPv2c")]
    GetBulkRequiresV2c,

    #[error("at least one OID is required")]
    EmptyOids,

    #[error("name not found in MIB registry: {0}")]
    NotFound(String),

    // ---- type-preservation invariant ----
    #[error("type information lost for varbind: {0}")]
    TypeInformationLost(String),

    // ---- everything else: io, resolver, etc ----
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SnmpError>;
