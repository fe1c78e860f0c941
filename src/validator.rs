//! Address validation for candidate endpoint lines
//!
//! Input lines look like `<ipv4>,<port>[,<tag>]*`. Each line either becomes an
//! [`Endpoint`] or is rejected with a [`ValidationError`]; rejected lines never
//! abort a run, they are collected in a [`ValidationReport`] so the caller can
//! log and count them.

use crate::{
    error::{AppError, ErrorContext, Result, ValidationError},
    models::Endpoint,
};
use serde::Serialize;
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::path::Path;

/// Validate one raw input line
pub fn validate(line: &str) -> std::result::Result<Endpoint, ValidationError> {
    let raw_line = line.trim();
    let fields: Vec<&str> = raw_line.split(',').collect();

    if fields.len() < 2 {
        return Err(ValidationError::MalformedLine {
            line: raw_line.to_string(),
        });
    }

    let ip = fields[0].trim();
    let address = parse_ipv4(ip).ok_or_else(|| ValidationError::InvalidAddress {
        address: ip.to_string(),
    })?;

    let port_text = fields[1].trim();
    let port = parse_port(port_text).ok_or_else(|| ValidationError::InvalidPort {
        port: port_text.to_string(),
    })?;

    let tags = fields[2..].iter().map(|tag| tag.trim().to_string()).collect();

    Ok(Endpoint {
        raw_line: raw_line.to_string(),
        ip: ip.to_string(),
        address,
        port,
        tags,
    })
}

/// Parse a dotted-quad IPv4 address: exactly four decimal octets in 0..=255
pub fn parse_ipv4(text: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut count = 0;

    for part in text.split('.') {
        if count == 4 {
            return None;
        }
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u16 = part.parse().ok()?;
        octets[count] = u8::try_from(value).ok()?;
        count += 1;
    }

    if count == 4 {
        Some(Ipv4Addr::from(octets))
    } else {
        None
    }
}

/// Parse a TCP port: an integer in 1..=65535
pub fn parse_port(text: &str) -> Option<u16> {
    let value: i64 = text.parse().ok()?;
    if (1..=65535).contains(&value) {
        u16::try_from(value).ok()
    } else {
        None
    }
}

/// Outcome of validating a whole input document
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Accepted endpoints, in input order
    pub endpoints: Vec<Endpoint>,
    /// Rejected lines with their 1-based line number
    pub rejected: Vec<(usize, ValidationError)>,
    /// Lines repeating an already accepted endpoint
    pub duplicates: Vec<usize>,
    /// Blank lines ignored
    pub blank_lines: usize,
}

impl ValidationReport {
    /// Number of non-blank lines that did not produce an endpoint
    pub fn skipped(&self) -> usize {
        self.rejected.len() + self.duplicates.len()
    }

    /// Check if no endpoint survived validation
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// Validate every line of an input document
pub fn parse_endpoints(text: &str) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen = HashSet::new();

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;

        if line.trim().is_empty() {
            report.blank_lines += 1;
            continue;
        }

        match validate(line) {
            Ok(endpoint) => {
                if seen.insert(endpoint.raw_line.clone()) {
                    report.endpoints.push(endpoint);
                } else {
                    report.duplicates.push(line_no);
                }
            }
            Err(error) => report.rejected.push((line_no, error)),
        }
    }

    report
}

/// Read and validate an input file
pub async fn load_endpoints(path: &Path) -> Result<ValidationReport> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read input file '{}'", path.display()))?;

    Ok(parse_endpoints(&text))
}

/// Fail when nothing survived validation
pub fn require_endpoints(report: &ValidationReport, path: &Path) -> Result<()> {
    if report.is_empty() {
        let reason = if report.rejected.is_empty() && report.duplicates.is_empty() {
            "is empty"
        } else {
            "contains no valid endpoints"
        };
        return Err(AppError::validation(format!(
            "Input file '{}' {}",
            path.display(),
            reason
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_validate_ip() {
        // Valid IPs
        assert!(parse_ipv4("192.168.1.1").is_some());
        assert!(parse_ipv4("1.1.1.1").is_some());
        assert!(parse_ipv4("0.0.0.0").is_some());
        assert!(parse_ipv4("255.255.255.255").is_some());

        // Invalid IPs
        assert!(parse_ipv4("256.0.0.0").is_none());
        assert!(parse_ipv4("-1.0.0.0").is_none());
        assert!(parse_ipv4("1.1.1").is_none());
        assert!(parse_ipv4("1.1.1.1.1").is_none());
        assert!(parse_ipv4("abc.def.ghi.jkl").is_none());
        assert!(parse_ipv4("192.168.1.a").is_none());
        assert!(parse_ipv4("1..1.1").is_none());
        assert!(parse_ipv4("").is_none());
        assert!(parse_ipv4("+1.1.1.1").is_none());
    }

    #[test]
    fn test_validate_port() {
        assert_eq!(parse_port("80"), Some(80));
        assert_eq!(parse_port("443"), Some(443));
        assert_eq!(parse_port("65535"), Some(65535));
        assert_eq!(parse_port("1"), Some(1));

        assert_eq!(parse_port("0"), None);
        assert_eq!(parse_port("65536"), None);
        assert_eq!(parse_port("-1"), None);
        assert_eq!(parse_port("abc"), None);
        assert_eq!(parse_port("99999999999999999999999"), None);
    }

    #[test]
    fn test_parse_address_with_tags() {
        let endpoint = validate("1.1.1.1, 443, US, Cloudflare").unwrap();
        assert_eq!(endpoint.ip, "1.1.1.1");
        assert_eq!(endpoint.port, 443);
        assert_eq!(endpoint.tags, vec!["US", "Cloudflare"]);
        assert_eq!(endpoint.raw_line, "1.1.1.1, 443, US, Cloudflare");
    }

    #[test]
    fn test_parse_address_minimal() {
        let endpoint = validate("8.8.8.8, 53").unwrap();
        assert_eq!(endpoint.ip, "8.8.8.8");
        assert_eq!(endpoint.port, 53);
        assert!(endpoint.tags.is_empty());
    }

    #[test]
    fn test_parse_address_rejections() {
        assert!(matches!(validate("invalid"), Err(ValidationError::MalformedLine { .. })));
        assert!(matches!(
            validate("999.999.999.999, 80"),
            Err(ValidationError::InvalidAddress { address }) if address == "999.999.999.999"
        ));
        assert!(matches!(validate("1.1.1.1, abc"), Err(ValidationError::InvalidPort { .. })));
        assert!(matches!(validate("1.1.1.1, 70000"), Err(ValidationError::InvalidPort { .. })));
    }

    #[test]
    fn test_raw_line_is_trimmed() {
        let endpoint = validate("  9.9.9.9,999,Quad9  \r").unwrap();
        assert_eq!(endpoint.raw_line, "9.9.9.9,999,Quad9");
        assert_eq!(endpoint.tags, vec!["Quad9"]);
    }

    #[test]
    fn test_parse_endpoints_report() {
        let text = "1.1.1.1,443,US,CF\n\n   \nbogus\n8.8.8.8,0\n1.1.1.1,443,US,CF\n9.9.9.9,999,Quad9\n";
        let report = parse_endpoints(text);

        assert_eq!(report.endpoints.len(), 2);
        assert_eq!(report.endpoints[0].ip, "1.1.1.1");
        assert_eq!(report.endpoints[1].ip, "9.9.9.9");
        assert_eq!(report.blank_lines, 2);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[0].0, 4);
        assert_eq!(report.rejected[1].0, 5);
        assert_eq!(report.duplicates, vec![6]);
        assert_eq!(report.skipped(), 3);
    }

    #[test]
    fn test_require_endpoints() {
        let path = Path::new("proxy.txt");

        let empty = parse_endpoints("\n\n");
        let err = require_endpoints(&empty, path).unwrap_err();
        assert!(err.to_string().contains("is empty"));

        let invalid = parse_endpoints("nope\n300.1.1.1,80\n");
        let err = require_endpoints(&invalid, path).unwrap_err();
        assert!(err.to_string().contains("no valid endpoints"));
        assert_eq!(err.exit_code(), 1);

        let valid = parse_endpoints("1.1.1.1,443\n");
        assert!(require_endpoints(&valid, path).is_ok());
    }

    #[tokio::test]
    async fn test_load_endpoints_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_endpoints(&dir.path().join("missing.txt")).await.unwrap_err();
        assert_eq!(err.category(), "IO");
        assert!(err.to_string().contains("missing.txt"));
    }

    #[tokio::test]
    async fn test_load_endpoints_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxy.txt");
        std::fs::write(&path, "1.1.1.1, 443, US, Cloudflare\n8.8.8.8,53,US,Google\n").unwrap();

        let report = load_endpoints(&path).await.unwrap();
        assert_eq!(report.endpoints.len(), 2);
        assert_eq!(report.skipped(), 0);
    }

    proptest! {
        #[test]
        fn prop_fewer_than_two_fields_is_malformed(line in "[^,]*") {
            prop_assert!(
                matches!(validate(&line), Err(ValidationError::MalformedLine { .. })),
                "expected MalformedLine for {:?}", line
            );
        }

        #[test]
        fn prop_four_octets_in_range_accepted(a in 0u16..=255, b in 0u16..=255, c in 0u16..=255, d in 0u16..=255) {
            let text = format!("{}.{}.{}.{}", a, b, c, d);
            let parsed = parse_ipv4(&text);
            prop_assert_eq!(parsed, Some(Ipv4Addr::new(a as u8, b as u8, c as u8, d as u8)));
        }

        #[test]
        fn prop_out_of_range_octet_rejected(pos in 0usize..4, bad in 256u32..1000) {
            let mut parts = vec!["10".to_string(); 4];
            parts[pos] = bad.to_string();
            let text = parts.join(".");
            prop_assert!(parse_ipv4(&text).is_none());
            prop_assert!(
                matches!(
                    validate(&format!("{},80", text)),
                    Err(ValidationError::InvalidAddress { .. })
                ),
                "expected InvalidAddress for {}", text
            );
        }

        #[test]
        fn prop_wrong_octet_count_rejected(octets in proptest::collection::vec(0u8..=255, 0..8)) {
            prop_assume!(octets.len() != 4);
            let text = octets.iter().map(|o| o.to_string()).collect::<Vec<_>>().join(".");
            prop_assert!(parse_ipv4(&text).is_none());
        }

        #[test]
        fn prop_port_accepted_iff_in_range(port in -100_000i64..200_000) {
            let result = validate(&format!("1.1.1.1,{}", port));
            if (1..=65535).contains(&port) {
                prop_assert_eq!(result.map(|e| e.port as i64), Ok(port));
            } else {
                prop_assert!(
                    matches!(result, Err(ValidationError::InvalidPort { .. })),
                    "expected InvalidPort for {}", port
                );
            }
        }
    }
}
