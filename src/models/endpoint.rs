//! Candidate relay endpoint model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// A validated `(IP, port, tags)` candidate network target
///
/// Built by [`crate::validator::validate`] from one input line and never
/// mutated afterwards. The trimmed input line is the endpoint's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Input line with surrounding whitespace removed, used verbatim as key
    pub raw_line: String,
    /// Address text exactly as written in the input
    pub ip: String,
    /// Parsed form of `ip`
    pub address: Ipv4Addr,
    /// Port in 1..=65535
    pub port: u16,
    /// Trailing fields (region, provider, ...), each trimmed
    pub tags: Vec<String>,
}

impl Endpoint {
    /// Identity key used by the measurement history
    pub fn id(&self) -> &str {
        &self.raw_line
    }

    /// Socket address to dial
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.address, self.port))
    }

    /// `<ip>:<port>#<tags>` prefix used by the result file
    pub fn display_prefix(&self) -> String {
        format!("{}:{}#{}", self.ip, self.port, self.tags.join(" "))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_line)
    }
}
