//! Target endpoint parsing: every shape a caller might hand in for "where
//! to send this" gets normalized to a `(host-string, port)` pair before
//! it ever reaches `snmp::transport`.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use crate::error::{Result, SnmpError};

pub const DEFAULT_PORT: u16 = 161;

/// A resolved send target: a bare hostname/IP literal plus the UDP port
/// to send to. Hostname resolution (DNS) happens later, in
/// `snmp::transport`, not here -- this module only disambiguates syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Result<Endpoint> {
        if port == 0 {
            return Err(SnmpError::InvalidPort("port must be in 1..=65535".into()));
        }
        Ok(Endpoint { host: host.into(), port })
    }

    /// Accepts: `"192.0.2.1"`, `"192.0.2.1:162"`, `"::1"`, `"[::1]:162"`,
    /// a bare hostname, or `"hostname:162"`. IPv6 literals without a port
    /// must NOT be wrapped in brackets; with a port they MUST be.
    pub fn parse(s: &str) -> Result<Endpoint> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SnmpError::UnsupportedFormat("empty endpoint string".into()));
        }

        if let Some(rest) = s.strip_prefix('[') {
            let (addr_part, after) = rest
                .split_once(']')
                .ok_or_else(|| SnmpError::UnsupportedFormat(format!("unterminated IPv6 literal: {s:?}")))?;
            let addr: Ipv6Addr = addr_part
                .parse()
                .map_err(|_| SnmpError::UnsupportedFormat(format!("invalid IPv6 literal: {addr_part:?}")))?;
            let port = match after.strip_prefix(':') {
                Some(p) => parse_port(p)?,
                None if after.is_empty() => DEFAULT_PORT,
                None => return Err(SnmpError::UnsupportedFormat(format!("trailing garbage after bracketed host: {s:?}"))),
            };
            return Endpoint::new(addr.to_string(), port);
        }

        // A bare IPv6 literal (multiple colons, no brackets) has no port.
        if s.matches(':').count() >= 2 {
            let addr: Ipv6Addr = s
                .parse()
                .map_err(|_| SnmpError::UnsupportedFormat(format!("invalid IPv6 literal: {s:?}")))?;
            return Endpoint::new(addr.to_string(), DEFAULT_PORT);
        }

        if let Some((host, port_str)) = s.rsplit_once(':') {
            let port = parse_port(port_str)?;
            return Endpoint::new(host.to_string(), port);
        }

        Endpoint::new(s.to_string(), DEFAULT_PORT)
    }

    /// Build from a `(host, port)` pair of an explicit struct-style caller
    /// (the `{host, port}` form in the specification).
    pub fn from_parts(host: impl Into<String>, port: Option<u16>) -> Result<Endpoint> {
        Endpoint::new(host, port.unwrap_or(DEFAULT_PORT))
    }

    /// Build from a raw octet tuple (IPv4 4-tuple or IPv6 16-tuple),
    /// optionally with a trailing port.
    pub fn from_tuple(tuple: &[u16], port: Option<u16>) -> Result<Endpoint> {
        match tuple.len() {
            4 => {
                if tuple.iter().any(|&n| n > 255) {
                    return Err(SnmpError::InvalidIpv4Tuple(tuple.to_vec()));
                }
                let octets: Vec<u8> = tuple.iter().map(|&n| n as u8).collect();
                let addr = Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]);
                Endpoint::new(addr.to_string(), port.unwrap_or(DEFAULT_PORT))
            }
            16 => {
                let segments: [u16; 8] = (0..8)
                    .map(|i| (tuple[i * 2] << 8) | tuple[i * 2 + 1])
                    .collect::<Vec<_>>()
                    .try_into()
                    .map_err(|_| SnmpError::InvalidIpv6Tuple(tuple.to_vec()))?;
                let addr = Ipv6Addr::from(segments);
                Endpoint::new(addr.to_string(), port.unwrap_or(DEFAULT_PORT))
            }
            8 => {
                // 8-element tuple means pre-grouped u16 segments, not raw octets.
                let segments: [u16; 8] = tuple
                    .try_into()
                    .map_err(|_| SnmpError::InvalidIpv6Tuple(tuple.to_vec()))?;
                let addr = Ipv6Addr::from(segments);
                Endpoint::new(addr.to_string(), port.unwrap_or(DEFAULT_PORT))
            }
            _ => Err(SnmpError::InvalidIpv4Tuple(tuple.to_vec())),
        }
    }

    /// `true` when `host` is already a numeric IP literal (no DNS lookup
    /// required).
    pub fn is_numeric(&self) -> bool {
        self.host.parse::<IpAddr>().is_ok()
    }

    pub fn socket_addr_if_numeric(&self) -> Option<SocketAddr> {
        self.host.parse::<IpAddr>().ok().map(|ip| SocketAddr::new(ip, self.port))
    }
}

fn parse_port(s: &str) -> Result<u16> {
    s.parse::<u16>()
        .ok()
        .filter(|&p| p != 0)
        .ok_or_else(|| SnmpError::InvalidPort(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_quad_default_port() {
        let e = Endpoint::parse("192.0.2.1").unwrap();
        assert_eq!(e.host, "192.0.2.1");
        assert_eq!(e.port, DEFAULT_PORT);
    }

    #[test]
    fn dotted_quad_with_port() {
        let e = Endpoint::parse("192.0.2.1:9161").unwrap();
        assert_eq!(e.port, 9161);
    }

    #[test]
    fn bare_ipv6_literal_default_port() {
        let e = Endpoint::parse("::1").unwrap();
        assert_eq!(e.port, DEFAULT_PORT);
    }

    #[test]
    fn bracketed_ipv6_with_port() {
        let e = Endpoint::parse("[::1]:9161").unwrap();
        assert_eq!(e.port, 9161);
        assert_eq!(e.host, "::1");
    }

    #[test]
    fn hostname_with_port() {
        let e = Endpoint::parse("switch1.example.com:162").unwrap();
        assert_eq!(e.host, "switch1.example.com");
        assert_eq!(e.port, 162);
    }

    #[test]
    fn bare_hostname_default_port() {
        let e = Endpoint::parse("switch1.example.com").unwrap();
        assert_eq!(e.port, DEFAULT_PORT);
    }

    #[test]
    fn ipv4_tuple() {
        let e = Endpoint::from_tuple(&[192, 0, 2, 1], Some(162)).unwrap();
        assert_eq!(e.host, "192.0.2.1");
        assert_eq!(e.port, 162);
    }

    #[test]
    fn port_zero_rejected() {
        assert!(Endpoint::parse("192.0.2.1:0").is_err());
    }

    #[test]
    fn empty_string_rejected() {
        assert!(Endpoint::parse("").is_err());
    }

    #[test]
    fn unterminated_bracket_rejected() {
        assert!(Endpoint::parse("[::1:9161").is_err());
    }
}
