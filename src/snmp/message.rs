//! The outer SNMP message: version, community string, and PDU, framed in
//! a single top-level SEQUENCE (RFC 1157 §4, RFC 1905 §4).

use crate::error::{Result, SnmpError};
use crate::snmp::ber::{self, TAG_OCTET_STRING, TAG_SEQUENCE};
use crate::snmp::pdu::Pdu;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnmpVersion {
    V1,
    V2c,
}

impl SnmpVersion {
    fn to_i64(self) -> i64 {
        match self {
            SnmpVersion::V1 => 0,
            SnmpVersion::V2c => 1,
        }
    }

    fn from_i64(n: i64) -> Result<SnmpVersion> {
        match n {
            0 => Ok(SnmpVersion::V1),
            1 => Ok(SnmpVersion::V2c),
            _ => Err(SnmpError::UnsupportedFormat(format!(
                "unsupported SNMP version tag {n} (only v1/v2c are implemented)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub version: SnmpVersion,
    pub community: Vec<u8>,
    pub pdu: Pdu,
}

impl Message {
    pub fn new(version: SnmpVersion, community: impl Into<Vec<u8>>, pdu: Pdu) -> Result<Message> {
        if pdu.kind.requires_v2c() && version != SnmpVersion::V2c {
            return Err(SnmpError::GetBulkRequiresV2c);
        }
        pdu.validate()?;
        Ok(Message {
            version,
            community: community.into(),
            pdu,
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        ber::encode_integer(&mut content, self.version.to_i64());
        ber::encode_octet_string(&mut content, &self.community)?;
        self.pdu.encode(&mut content)?;
        let mut out = Vec::new();
        ber::encode_sequence(&mut out, &content)?;
        if out.len() > ber::MAX_MESSAGE_SIZE {
            return Err(SnmpError::LengthTooLarge(out.len()));
        }
        Ok(out)
    }

    pub fn decode(input: &[u8]) -> Result<Message> {
        let (content, rest) = ber::expect_tag(input, TAG_SEQUENCE)?;
        if !rest.is_empty() {
            return Err(SnmpError::InvalidLength);
        }
        let (version_raw, after_version) = ber::decode_integer(content)?;
        let version = SnmpVersion::from_i64(version_raw)?;
        let (community, after_community) = ber::expect_tag(after_version, TAG_OCTET_STRING)?;
        let (pdu, after_pdu) = Pdu::decode(after_community)?;
        if !after_pdu.is_empty() {
            return Err(SnmpError::InvalidLength);
        }
        pdu.validate()?;
        Ok(Message {
            version,
            community: community.to_vec(),
            pdu,
        })
    }
}
