//! SNMP value types: the tagged union carried by every varbind, plus the
//! v2c exception values and a handful of human-formatting helpers.

use std::net::Ipv4Addr;

use crate::error::{Result, SnmpError};
use crate::snmp::ber::{self, *};
use crate::snmp::oid::Oid;

/// The SNMP value carried by a varbind. The wire tag always determines the
/// variant on decode and the variant always determines the wire tag on
/// encode — there is no inference from payload bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer32(i32),
    OctetString(Vec<u8>),
    Null,
    ObjectIdentifier(Oid),
    IpAddress([u8; 4]),
    Counter32(u32),
    Gauge32(u32),
    Unsigned32(u32),
    TimeTicks(u32),
    Opaque(Vec<u8>),
    Counter64(u64),
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
}

/// A standalone discriminant mirroring `Value`'s variants, for callers that
/// want the literal `(oid, type, value)` triple shape described in the
/// specification without destructuring `Value` itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Integer32,
    OctetString,
    Null,
    ObjectIdentifier,
    IpAddress,
    Counter32,
    Gauge32,
    Unsigned32,
    TimeTicks,
    Opaque,
    Counter64,
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Integer32(_) => ValueType::Integer32,
            Value::OctetString(_) => ValueType::OctetString,
            Value::Null => ValueType::Null,
            Value::ObjectIdentifier(_) => ValueType::ObjectIdentifier,
            Value::IpAddress(_) => ValueType::IpAddress,
            Value::Counter32(_) => ValueType::Counter32,
            Value::Gauge32(_) => ValueType::Gauge32,
            Value::Unsigned32(_) => ValueType::Unsigned32,
            Value::TimeTicks(_) => ValueType::TimeTicks,
            Value::Opaque(_) => ValueType::Opaque,
            Value::Counter64(_) => ValueType::Counter64,
            Value::NoSuchObject => ValueType::NoSuchObject,
            Value::NoSuchInstance => ValueType::NoSuchInstance,
            Value::EndOfMibView => ValueType::EndOfMibView,
        }
    }

    /// `true` for the three SNMPv2c per-varbind exception values.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }

    pub fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Value::Integer32(n) => ber::encode_integer(out, *n as i64),
            Value::OctetString(bytes) => ber::encode_octet_string(out, bytes)?,
            Value::Null => ber::encode_null(out),
            Value::ObjectIdentifier(oid) => ber::encode_oid(out, oid.as_slice())?,
            Value::IpAddress(bytes) => ber::encode_tlv(out, TAG_IP_ADDRESS, bytes)?,
            Value::Counter32(n) => encode_unsigned_app(out, TAG_COUNTER32, *n as u64),
            Value::Gauge32(n) => encode_unsigned_app(out, TAG_GAUGE32, *n as u64),
            Value::Unsigned32(n) => encode_unsigned_app(out, TAG_GAUGE32, *n as u64),
            Value::TimeTicks(n) => encode_unsigned_app(out, TAG_TIMETICKS, *n as u64),
            Value::Opaque(bytes) => ber::encode_tlv(out, TAG_OPAQUE, bytes)?,
            Value::Counter64(n) => encode_unsigned_app(out, TAG_COUNTER64, *n),
            Value::NoSuchObject => ber::encode_tlv(out, TAG_NO_SUCH_OBJECT, &[])?,
            Value::NoSuchInstance => ber::encode_tlv(out, TAG_NO_SUCH_INSTANCE, &[])?,
            Value::EndOfMibView => ber::encode_tlv(out, TAG_END_OF_MIB_VIEW, &[])?,
        }
        Ok(())
    }

    pub fn decode(input: &[u8]) -> Result<(Value, &[u8])> {
        let (tag, content, rest) = ber::decode_tlv(input)?;
        let value = match tag {
            TAG_INTEGER => Value::Integer32(clamp_i32(ber::decode_integer_content(content)?)?),
            TAG_OCTET_STRING => Value::OctetString(content.to_vec()),
            TAG_NULL => {
                if !content.is_empty() {
                    return Err(SnmpError::InvalidLength);
                }
                Value::Null
            }
            TAG_OID => {
                let (components, leftover) = ber::decode_oid(input)?;
                debug_assert!(leftover.len() == rest.len());
                Value::ObjectIdentifier(Oid::from_decoded(components))
            }
            TAG_IP_ADDRESS => Value::IpAddress(exactly_4(content)?),
            TAG_COUNTER32 => Value::Counter32(decode_unsigned32(content)?),
            TAG_GAUGE32 => Value::Gauge32(decode_unsigned32(content)?),
            TAG_TIMETICKS => Value::TimeTicks(decode_unsigned32(content)?),
            TAG_OPAQUE => Value::Opaque(content.to_vec()),
            TAG_COUNTER64 => Value::Counter64(decode_unsigned64(content)?),
            TAG_NO_SUCH_OBJECT => Value::NoSuchObject,
            TAG_NO_SUCH_INSTANCE => Value::NoSuchInstance,
            TAG_END_OF_MIB_VIEW => Value::EndOfMibView,
            other => {
                return Err(SnmpError::InvalidTag {
                    expected: TAG_INTEGER,
                    got: other,
                })
            }
        };
        Ok((value, rest))
    }

    /// Validate the SMI range constraints for the numeric types (§4.2).
    pub fn validate(&self) -> Result<()> {
        match self {
            Value::IpAddress(_) => Ok(()), // fixed-size array, always 4 octets
            _ => Ok(()),
        }
    }

    /// `192.0.2.1`-style dotted-quad rendering for `IpAddress`.
    pub fn format_ip(&self) -> Option<String> {
        match self {
            Value::IpAddress(b) => Some(Ipv4Addr::from(*b).to_string()),
            _ => None,
        }
    }

    /// `D days H hours M minutes S.CC seconds` rendering for `TimeTicks`.
    pub fn format_timeticks(&self) -> Option<String> {
        let Value::TimeTicks(ticks) = self else {
            return None;
        };
        Some(format_timeticks_value(*ticks))
    }
}

/// `TimeTicks` are hundredths of a second; render as a human duration.
pub fn format_timeticks_value(ticks: u32) -> String {
    let centiseconds = ticks % 100;
    let total_seconds = ticks / 100;
    let seconds = total_seconds % 60;
    let total_minutes = total_seconds / 60;
    let minutes = total_minutes % 60;
    let total_hours = total_minutes / 60;
    let hours = total_hours % 24;
    let days = total_hours / 24;
    format!(
        "{days} days {hours} hours {minutes} minutes {seconds}.{centiseconds:02} seconds"
    )
}

/// Render an interface speed (bps, as carried by ifSpeed/ifHighSpeed) as a
/// human-readable rate.
pub fn format_interface_speed(bps: u64) -> String {
    const KB: u64 = 1_000;
    const MB: u64 = 1_000_000;
    const GB: u64 = 1_000_000_000;
    if bps >= GB {
        format!("{:.2} Gbps", bps as f64 / GB as f64)
    } else if bps >= MB {
        format!("{:.2} Mbps", bps as f64 / MB as f64)
    } else if bps >= KB {
        format!("{:.2} Kbps", bps as f64 / KB as f64)
    } else {
        format!("{bps} bps")
    }
}

fn encode_unsigned_app(out: &mut Vec<u8>, tag: u8, n: u64) {
    // Unsigned SMI types use the same minimal-octet, sign-padded encoding
    // as INTEGER, but always as a non-negative magnitude (never two's
    // complement) and under an application-class tag.
    let content = minimal_unsigned_octets(n);
    out.push(tag);
    ber::encode_length(out, content.len()).expect("unsigned content never exceeds length limits");
    out.extend_from_slice(&content);
}

/// Minimal big-endian octets for a non-negative value, with a leading
/// `0x00` inserted when the top bit of the first octet would otherwise
/// look like a sign bit.
fn minimal_unsigned_octets(n: u64) -> Vec<u8> {
    let bytes = n.to_be_bytes();
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(7);
    let mut content = bytes[first_nonzero..].to_vec();
    if content[0] & 0x80 != 0 {
        content.insert(0, 0x00);
    }
    content
}

fn decode_unsigned32(content: &[u8]) -> Result<u32> {
    let n = ber::decode_integer_content(content)?;
    if !(0..=u32::MAX as i64).contains(&n) {
        return Err(SnmpError::InvalidLength);
    }
    Ok(n as u32)
}

fn decode_unsigned64(content: &[u8]) -> Result<u64> {
    if content.len() > 9 {
        return Err(SnmpError::LengthTooLarge(content.len()));
    }
    if content.is_empty() {
        return Err(SnmpError::EmptyInteger);
    }
    let mut buf = [0u8; 8];
    // Content may include a single leading 0x00 sign-padding octet for
    // values whose top bit would otherwise look negative.
    let trimmed = if content.len() == 9 {
        &content[1..]
    } else {
        content
    };
    let start = 8 - trimmed.len();
    buf[start..].copy_from_slice(trimmed);
    Ok(u64::from_be_bytes(buf))
}

fn clamp_i32(n: i64) -> Result<i32> {
    i32::try_from(n).map_err(|_| SnmpError::LengthTooLarge(8))
}

fn exactly_4(content: &[u8]) -> Result<[u8; 4]> {
    content
        .try_into()
        .map_err(|_| SnmpError::InvalidLength)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_round_trip() {
        let v = Value::Integer32(-42);
        let mut buf = Vec::new();
        v.encode(&mut buf).unwrap();
        let (decoded, rest) = Value::decode(&buf).unwrap();
        assert_eq!(decoded, v);
        assert!(rest.is_empty());
    }

    #[test]
    fn counter64_round_trip_large_value() {
        let v = Value::Counter64(u64::MAX);
        let mut buf = Vec::new();
        v.encode(&mut buf).unwrap();
        let (decoded, _) = Value::decode(&buf).unwrap();
        assert_eq!(decoded, v);
    }

    #[test]
    fn gauge32_clamped_range() {
        let v = Value::Gauge32(u32::MAX);
        let mut buf = Vec::new();
        v.encode(&mut buf).unwrap();
        let (decoded, _) = Value::decode(&buf).unwrap();
        assert_eq!(decoded, v);
    }

    #[test]
    fn ip_address_round_trip() {
        let v = Value::IpAddress([192, 0, 2, 1]);
        let mut buf = Vec::new();
        v.encode(&mut buf).unwrap();
        assert_eq!(buf[0], TAG_IP_ADDRESS);
        let (decoded, _) = Value::decode(&buf).unwrap();
        assert_eq!(decoded, v);
        assert_eq!(v.format_ip().unwrap(), "192.0.2.1");
    }

    #[test]
    fn exception_values_round_trip_with_empty_content() {
        for v in [Value::NoSuchObject, Value::NoSuchInstance, Value::EndOfMibView] {
            let mut buf = Vec::new();
            v.encode(&mut buf).unwrap();
            let (decoded, rest) = Value::decode(&buf).unwrap();
            assert_eq!(decoded, v);
            assert!(rest.is_empty());
            assert!(decoded.is_exception());
        }
    }

    #[test]
    fn object_identifier_round_trip() {
        let oid = Oid::from_str("1.3.6.1.2.1.1.1.0").unwrap();
        let v = Value::ObjectIdentifier(oid.clone());
        let mut buf = Vec::new();
        v.encode(&mut buf).unwrap();
        let (decoded, _) = Value::decode(&buf).unwrap();
        assert_eq!(decoded, Value::ObjectIdentifier(oid));
    }

    #[test]
    fn timeticks_formatting() {
        // 1 day, 2 hours, 3 minutes, 4.05 seconds.
        let ticks = ((((1u32 * 24 + 2) * 60 + 3) * 60 + 4) * 100) + 5;
        let v = Value::TimeTicks(ticks);
        assert_eq!(
            v.format_timeticks().unwrap(),
            "1 days 2 hours 3 minutes 4.05 seconds"
        );
    }

    #[test]
    fn interface_speed_formatting() {
        assert_eq!(format_interface_speed(1_000_000_000), "1.00 Gbps");
        assert_eq!(format_interface_speed(100_000_000), "100.00 Mbps");
        assert_eq!(format_interface_speed(500), "500 bps");
    }

    #[test]
    fn no_type_inference_distinguishes_counter_from_gauge() {
        // Same numeric payload, different wire tag -> different variant.
        let counter = Value::Counter32(42);
        let gauge = Value::Gauge32(42);
        let mut cbuf = Vec::new();
        let mut gbuf = Vec::new();
        counter.encode(&mut cbuf).unwrap();
        gauge.encode(&mut gbuf).unwrap();
        assert_ne!(cbuf[0], gbuf[0]);
        let (cd, _) = Value::decode(&cbuf).unwrap();
        let (gd, _) = Value::decode(&gbuf).unwrap();
        assert_eq!(cd.value_type(), ValueType::Counter32);
        assert_eq!(gd.value_type(), ValueType::Gauge32);
    }
}
