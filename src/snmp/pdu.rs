//! PDU layer: request-id/error-status/error-index scalars, varbind lists,
//! and the seven PDU kinds framed under their context-specific tags.
//!
//! GetBulk reuses the error-status and error-index slots as non-repeaters
//! and max-repetitions respectively (RFC 1905 §4.2.3); that reuse is
//! modeled here as distinct `Pdu` constructors rather than a single struct
//! with ambiguous field names.

use crate::error::{Result, SnmpError};
use crate::snmp::ber::{self, *};
use crate::snmp::oid::Oid;
use crate::snmp::value::{Value, ValueType};

/// The standard v1/v2c error-status taxonomy (RFC 1157 §4.1.1, extended by
/// RFC 1905 §4.2.1 for v2c-only values 6..18).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStatus {
    NoError,
    TooBig,
    NoSuchName,
    BadValue,
    ReadOnly,
    GenErr,
    NoAccess,
    WrongType,
    WrongLength,
    WrongEncoding,
    WrongValue,
    NoCreation,
    InconsistentValue,
    ResourceUnavailable,
    CommitFailed,
    UndoFailed,
    AuthorizationError,
    NotWritable,
    InconsistentName,
    /// Any value this codec does not recognize; preserved verbatim so a
    /// caller can still see what the agent actually sent.
    Other(i32),
}

impl ErrorStatus {
    fn to_i32(self) -> i32 {
        match self {
            ErrorStatus::NoError => 0,
            ErrorStatus::TooBig => 1,
            ErrorStatus::NoSuchName => 2,
            ErrorStatus::BadValue => 3,
            ErrorStatus::ReadOnly => 4,
            ErrorStatus::GenErr => 5,
            ErrorStatus::NoAccess => 6,
            ErrorStatus::WrongType => 7,
            ErrorStatus::WrongLength => 8,
            ErrorStatus::WrongEncoding => 9,
            ErrorStatus::WrongValue => 10,
            ErrorStatus::NoCreation => 11,
            ErrorStatus::InconsistentValue => 12,
            ErrorStatus::ResourceUnavailable => 13,
            ErrorStatus::CommitFailed => 14,
            ErrorStatus::UndoFailed => 15,
            ErrorStatus::AuthorizationError => 16,
            ErrorStatus::NotWritable => 17,
            ErrorStatus::InconsistentName => 18,
            ErrorStatus::Other(n) => n,
        }
    }

    fn from_i32(n: i32) -> ErrorStatus {
        match n {
            0 => ErrorStatus::NoError,
            1 => ErrorStatus::TooBig,
            2 => ErrorStatus::NoSuchName,
            3 => ErrorStatus::BadValue,
            4 => ErrorStatus::ReadOnly,
            5 => ErrorStatus::GenErr,
            6 => ErrorStatus::NoAccess,
            7 => ErrorStatus::WrongType,
            8 => ErrorStatus::WrongLength,
            9 => ErrorStatus::WrongEncoding,
            10 => ErrorStatus::WrongValue,
            11 => ErrorStatus::NoCreation,
            12 => ErrorStatus::InconsistentValue,
            13 => ErrorStatus::ResourceUnavailable,
            14 => ErrorStatus::CommitFailed,
            15 => ErrorStatus::UndoFailed,
            16 => ErrorStatus::AuthorizationError,
            17 => ErrorStatus::NotWritable,
            18 => ErrorStatus::InconsistentName,
            other => ErrorStatus::Other(other),
        }
    }

    pub fn is_no_error(self) -> bool {
        matches!(self, ErrorStatus::NoError)
    }
}

/// Which PDU this is, mapped 1:1 to a context-specific application tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PduKind {
    GetRequest,
    GetNextRequest,
    GetBulkRequest,
    SetRequest,
    Response,
    InformRequest,
    TrapV2,
}

impl PduKind {
    fn tag(self) -> u8 {
        match self {
            PduKind::GetRequest => TAG_GET_REQUEST,
            PduKind::GetNextRequest => TAG_GET_NEXT_REQUEST,
            PduKind::GetBulkRequest => TAG_GET_BULK_REQUEST,
            PduKind::SetRequest => TAG_SET_REQUEST,
            PduKind::Response => TAG_GET_RESPONSE,
            PduKind::InformRequest => TAG_INFORM_REQUEST,
            PduKind::TrapV2 => TAG_TRAP_V2,
        }
    }

    fn from_tag(tag: u8) -> Result<PduKind> {
        Ok(match tag {
            TAG_GET_REQUEST => PduKind::GetRequest,
            TAG_GET_NEXT_REQUEST => PduKind::GetNextRequest,
            TAG_GET_BULK_REQUEST => PduKind::GetBulkRequest,
            TAG_SET_REQUEST => PduKind::SetRequest,
            TAG_GET_RESPONSE => PduKind::Response,
            TAG_INFORM_REQUEST => PduKind::InformRequest,
            TAG_TRAP_V2 => PduKind::TrapV2,
            other => {
                return Err(SnmpError::InvalidTag {
                    expected: TAG_GET_RESPONSE,
                    got: other,
                })
            }
        })
    }

    /// GetBulk is the only PDU kind that does not exist in SNMPv1.
    pub fn requires_v2c(self) -> bool {
        matches!(self, PduKind::GetBulkRequest | PduKind::InformRequest | PduKind::TrapV2)
    }
}

/// One `(oid, value)` pair. `value_type()` and `as_triple()` expose the
/// type discriminant alongside the pair without introducing a redundant
/// stored field — the type is always the value's own tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Varbind {
    pub oid: Oid,
    pub value: Value,
}

impl Varbind {
    pub fn new(oid: Oid, value: Value) -> Self {
        Varbind { oid, value }
    }

    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }

    pub fn as_triple(&self) -> (&Oid, ValueType, &Value) {
        (&self.oid, self.value_type(), &self.value)
    }

    fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        let mut content = Vec::new();
        ber::encode_oid(&mut content, self.oid.as_slice())?;
        self.value.encode(&mut content)?;
        ber::encode_sequence(out, &content)
    }

    fn decode(input: &[u8]) -> Result<(Varbind, &[u8])> {
        let (content, rest) = ber::expect_tag(input, TAG_SEQUENCE)?;
        let (components, after_oid) = ber::decode_oid(content)?;
        let (value, after_value) = Value::decode(after_oid)?;
        if !after_value.is_empty() {
            return Err(SnmpError::InvalidLength);
        }
        Ok((Varbind::new(Oid::from_decoded(components), value), rest))
    }
}

fn encode_varbind_list(out: &mut Vec<u8>, varbinds: &[Varbind]) -> Result<()> {
    let mut content = Vec::new();
    for vb in varbinds {
        vb.encode(&mut content)?;
    }
    ber::encode_sequence(out, &content)
}

fn decode_varbind_list(input: &[u8]) -> Result<Vec<Varbind>> {
    let (mut content, rest) = ber::expect_tag(input, TAG_SEQUENCE)?;
    if !rest.is_empty() {
        return Err(SnmpError::InvalidLength);
    }
    let mut varbinds = Vec::new();
    while !content.is_empty() {
        let (vb, remaining) = Varbind::decode(content)?;
        varbinds.push(vb);
        content = remaining;
    }
    Ok(varbinds)
}

/// A full PDU: request-id, the error-status/error-index pair (repurposed
/// as non-repeaters/max-repetitions for GetBulk), and its varbind list.
#[derive(Debug, Clone, PartialEq)]
pub struct Pdu {
    pub kind: PduKind,
    pub request_id: i32,
    pub error_status: ErrorStatus,
    pub error_index: u32,
    pub varbinds: Vec<Varbind>,
}

impl Pdu {
    pub fn get(request_id: i32, oids: &[Oid]) -> Result<Pdu> {
        Self::request_with_null_values(PduKind::GetRequest, request_id, oids)
    }

    pub fn get_next(request_id: i32, oids: &[Oid]) -> Result<Pdu> {
        Self::request_with_null_values(PduKind::GetNextRequest, request_id, oids)
    }

    pub fn set(request_id: i32, varbinds: Vec<Varbind>) -> Result<Pdu> {
        if varbinds.is_empty() {
            return Err(SnmpError::EmptyOids);
        }
        Ok(Pdu {
            kind: PduKind::SetRequest,
            request_id,
            error_status: ErrorStatus::NoError,
            error_index: 0,
            varbinds,
        })
    }

    /// `non_repeaters` and `max_repetitions` occupy the error-status and
    /// error-index wire slots respectively; only valid under SNMPv2c,
    /// enforced by the caller (`snmp::message`) before this is ever sent.
    pub fn get_bulk(
        request_id: i32,
        non_repeaters: u32,
        max_repetitions: u32,
        oids: &[Oid],
    ) -> Result<Pdu> {
        if oids.is_empty() {
            return Err(SnmpError::EmptyOids);
        }
        Ok(Pdu {
            kind: PduKind::GetBulkRequest,
            request_id,
            error_status: ErrorStatus::from_i32(non_repeaters as i32),
            error_index: max_repetitions,
            varbinds: oids.iter().cloned().map(|oid| Varbind::new(oid, Value::Null)).collect(),
        })
    }

    pub fn non_repeaters(&self) -> u32 {
        self.error_status.to_i32().max(0) as u32
    }

    pub fn max_repetitions(&self) -> u32 {
        self.error_index
    }

    pub fn response(
        request_id: i32,
        error_status: ErrorStatus,
        error_index: u32,
        varbinds: Vec<Varbind>,
    ) -> Pdu {
        Pdu {
            kind: PduKind::Response,
            request_id,
            error_status,
            error_index,
            varbinds,
        }
    }

    fn request_with_null_values(kind: PduKind, request_id: i32, oids: &[Oid]) -> Result<Pdu> {
        if oids.is_empty() {
            return Err(SnmpError::EmptyOids);
        }
        Ok(Pdu {
            kind,
            request_id,
            error_status: ErrorStatus::NoError,
            error_index: 0,
            varbinds: oids.iter().cloned().map(|oid| Varbind::new(oid, Value::Null)).collect(),
        })
    }

    /// Structural invariants from RFC 1157 §4.1 / RFC 1905 §4.2.1: the
    /// error-index is zero exactly when there is no error, and — for
    /// non-GetBulk PDUs — a nonzero error-index must address an existing
    /// varbind.
    pub fn validate(&self) -> Result<()> {
        if self.kind == PduKind::GetBulkRequest {
            return Ok(());
        }
        let no_error = self.error_status.is_no_error();
        if no_error != (self.error_index == 0) {
            return Err(SnmpError::InvalidLength);
        }
        if self.error_index as usize > self.varbinds.len() {
            return Err(SnmpError::InvalidLength);
        }
        Ok(())
    }

    pub fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        let mut content = Vec::new();
        ber::encode_integer(&mut content, self.request_id as i64);
        ber::encode_integer(&mut content, self.error_status.to_i32() as i64);
        ber::encode_integer(&mut content, self.error_index as i64);
        encode_varbind_list(&mut content, &self.varbinds)?;
        ber::encode_tlv(out, self.kind.tag(), &content)
    }

    pub fn decode(input: &[u8]) -> Result<(Pdu, &[u8])> {
        let (tag, content, rest) = ber::decode_tlv(input)?;
        let kind = PduKind::from_tag(tag)?;
        let (request_id, after_id) = ber::decode_integer(content)?;
        let (error_status, after_status) = ber::decode_integer(after_id)?;
        let (error_index, after_index) = ber::decode_integer(after_status)?;
        if error_index < 0 {
            return Err(SnmpError::InvalidLength);
        }
        let varbinds = decode_varbind_list(after_index)?;
        let pdu = Pdu {
            kind,
            request_id: request_id as i32,
            error_status: ErrorStatus::from_i32(error_status as i32),
            error_index: error_index as u32,
            varbinds,
        };
        Ok((pdu, rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(s: &str) -> Oid {
        Oid::from_str(s).unwrap()
    }

    #[test]
    fn get_request_round_trip() {
        let pdu = Pdu::get(7, &[oid("1.3.6.1.2.1.1.1.0")]).unwrap();
        let mut buf = Vec::new();
        pdu.encode(&mut buf).unwrap();
        assert_eq!(buf[0], TAG_GET_REQUEST);
        let (decoded, rest) = Pdu::decode(&buf).unwrap();
        assert_eq!(decoded, pdu);
        assert!(rest.is_empty());
    }

    #[test]
    fn get_bulk_reuses_error_fields_as_bulk_params() {
        let pdu = Pdu::get_bulk(1, 0, 25, &[oid("1.3.6.1.2.1.2.2.1.2")]).unwrap();
        assert_eq!(pdu.non_repeaters(), 0);
        assert_eq!(pdu.max_repetitions(), 25);
        let mut buf = Vec::new();
        pdu.encode(&mut buf).unwrap();
        let (decoded, _) = Pdu::decode(&buf).unwrap();
        assert_eq!(decoded.non_repeaters(), 0);
        assert_eq!(decoded.max_repetitions(), 25);
    }

    #[test]
    fn response_varbind_list_round_trip() {
        let varbinds = vec![
            Varbind::new(oid("1.3.6.1.2.1.1.1.0"), Value::OctetString(b"widget".to_vec())),
            Varbind::new(oid("1.3.6.1.2.1.1.3.0"), Value::TimeTicks(12345)),
        ];
        let pdu = Pdu::response(7, ErrorStatus::NoError, 0, varbinds.clone());
        let mut buf = Vec::new();
        pdu.encode(&mut buf).unwrap();
        let (decoded, _) = Pdu::decode(&buf).unwrap();
        assert_eq!(decoded.varbinds, varbinds);
    }

    #[test]
    fn empty_oids_rejected_before_encoding() {
        assert!(matches!(Pdu::get(1, &[]), Err(SnmpError::EmptyOids)));
    }

    #[test]
    fn validate_rejects_inconsistent_error_index() {
        let pdu = Pdu::response(1, ErrorStatus::NoError, 1, vec![]);
        assert!(pdu.validate().is_err());
        let pdu = Pdu::response(1, ErrorStatus::GenErr, 0, vec![]);
        assert!(pdu.validate().is_err());
    }

    #[test]
    fn validate_rejects_error_index_past_varbind_list() {
        let varbinds = vec![Varbind::new(oid("1.3.6.1.2.1.1.1.0"), Value::Null)];
        let pdu = Pdu::response(1, ErrorStatus::GenErr, 5, varbinds);
        assert!(pdu.validate().is_err());
    }

    #[test]
    fn validate_accepts_well_formed_error_response() {
        let varbinds = vec![Varbind::new(oid("1.3.6.1.2.1.1.1.0"), Value::Null)];
        let pdu = Pdu::response(1, ErrorStatus::NoSuchName, 1, varbinds);
        assert!(pdu.validate().is_ok());
    }

    #[test]
    fn set_requires_at_least_one_varbind() {
        assert!(matches!(Pdu::set(1, vec![]), Err(SnmpError::EmptyOids)));
    }

    #[test]
    fn get_bulk_requires_v2c_flag_on_kind() {
        assert!(PduKind::GetBulkRequest.requires_v2c());
        assert!(!PduKind::GetRequest.requires_v2c());
    }

    #[test]
    fn unknown_error_status_round_trips_as_other() {
        let pdu = Pdu::response(1, ErrorStatus::Other(99), 0, vec![]);
        let mut buf = Vec::new();
        pdu.encode(&mut buf).unwrap();
        let (decoded, _) = Pdu::decode(&buf).unwrap();
        assert_eq!(decoded.error_status, ErrorStatus::Other(99));
    }
}
