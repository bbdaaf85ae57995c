//! Router API address parsing and validation.
//!
//! Accepted forms:
//! - `ip:port`, with IPv6 hosts in brackets (`[::1]:50051`)
//! - `dns://host:port` or `dns://authority/host:port`
//!
//! The port must be written in canonical decimal and fall in `1024..=65535`.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use thiserror::Error;

const MIN_PORT: u64 = 1024;
const MAX_PORT: u64 = 65535;

/// Address validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("empty address")]
    Empty,
    #[error("missing port in {0}")]
    MissingPort(String),
    #[error("invalid IP address in {0}")]
    InvalidIp(String),
    #[error("invalid hostname in {0}")]
    InvalidHostname(String),
    #[error("invalid port in {0}")]
    InvalidPort(String),
    #[error("invalid port in {0}, expected range 1024-65535")]
    PortOutOfRange(String),
}

/// The host part of a router address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Host {
    Ip(IpAddr),
    Dns(String),
}

/// A validated GoBGP API address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterAddress {
    raw: String,
    host: Host,
    port: u16,
}

impl RouterAddress {
    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The address as it was configured.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// URI understood by the gRPC transport.
    pub fn endpoint_uri(&self, tls: bool) -> String {
        let scheme = if tls { "https" } else { "http" };
        match &self.host {
            Host::Ip(IpAddr::V6(ip)) => format!("{}://[{}]:{}", scheme, ip, self.port),
            Host::Ip(IpAddr::V4(ip)) => format!("{}://{}:{}", scheme, ip, self.port),
            Host::Dns(name) => format!("{}://{}:{}", scheme, name, self.port),
        }
    }
}

impl FromStr for RouterAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(AddressError::Empty);
        }

        if let Some(rest) = s.strip_prefix("dns://") {
            // Optional resolver authority before the last '/'
            let target = rest.rsplit_once('/').map_or(rest, |(_, target)| target);
            let (host, port) = target
                .rsplit_once(':')
                .ok_or_else(|| AddressError::MissingPort(s.to_string()))?;
            if !is_valid_hostname(host) {
                return Err(AddressError::InvalidHostname(s.to_string()));
            }
            return Ok(Self {
                raw: s.to_string(),
                host: Host::Dns(host.to_string()),
                port: parse_port(port, s)?,
            });
        }

        let (host, port) = split_host_port(s)?;
        let ip: IpAddr = host
            .parse()
            .map_err(|_| AddressError::InvalidIp(s.to_string()))?;

        Ok(Self {
            raw: s.to_string(),
            host: Host::Ip(ip),
            port: parse_port(port, s)?,
        })
    }
}

impl fmt::Display for RouterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn split_host_port(s: &str) -> Result<(&str, &str), AddressError> {
    if let Some(rest) = s.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| AddressError::InvalidIp(s.to_string()))?;
        let port = tail
            .strip_prefix(':')
            .ok_or_else(|| AddressError::MissingPort(s.to_string()))?;
        return Ok((host, port));
    }

    let (host, port) = s
        .rsplit_once(':')
        .ok_or_else(|| AddressError::MissingPort(s.to_string()))?;

    // Unbracketed IPv6 or a URL scheme
    if host.contains(':') {
        return Err(AddressError::InvalidIp(s.to_string()));
    }

    Ok((host, port))
}

fn parse_port(port: &str, addr: &str) -> Result<u16, AddressError> {
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AddressError::InvalidPort(addr.to_string()));
    }

    let value: u64 = port
        .parse()
        .map_err(|_| AddressError::PortOutOfRange(addr.to_string()))?;
    if value.to_string() != port {
        return Err(AddressError::InvalidPort(addr.to_string()));
    }
    if !(MIN_PORT..=MAX_PORT).contains(&value) {
        return Err(AddressError::PortOutOfRange(addr.to_string()));
    }

    u16::try_from(value).map_err(|_| AddressError::PortOutOfRange(addr.to_string()))
}

fn is_valid_hostname(host: &str) -> bool {
    if host.is_empty() || host.len() > 253 {
        return false;
    }

    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
    })
}
