//! VLESS link codec
//!
//! Parses and generates links of the form
//!
//! ```text
//! vless://<identifier>@<host>:<port>[?reality=1&pbk=<key>&sni=<name>&sid=<shortid>&fp=<fingerprint>][#<remark>]
//! ```
//!
//! Parsing is strict because links come from untrusted pasted text.
//! Generation only formats what the caller already validated.

mod batch;
mod generator;
mod parser;

pub use batch::{
    BatchParseResult, SkippedLink, parse_batch, parse_batch_report, parse_batch_valid, split_links,
};
pub use generator::{generate, generate_for_profile};
pub use parser::{ParsedUri, parse};

/// Link scheme, without the `://` separator
pub const SCHEME: &str = "vless";

/// Query key whose presence enables Reality
pub const REALITY_KEY: &str = "reality";
/// Query key for the Reality public key
pub const PUBLIC_KEY_KEY: &str = "pbk";
/// Query key for the Reality server name
pub const SERVER_NAME_KEY: &str = "sni";
/// Query key for the Reality short ID
pub const SHORT_ID_KEY: &str = "sid";
/// Query key for the TLS fingerprint
pub const FINGERPRINT_KEY: &str = "fp";

/// Formats a host for the authority part of a link
///
/// IPv6 literals are wrapped in brackets; everything else is returned as is.
#[must_use]
pub fn format_host(address: &str) -> String {
    if address.contains(':') && !address.starts_with('[') {
        format!("[{address}]")
    } else {
        address.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_host() {
        assert_eq!(format_host("example.com"), "example.com");
        assert_eq!(format_host("192.0.2.1"), "192.0.2.1");
        assert_eq!(format_host("::1"), "[::1]");
        assert_eq!(format_host("[::1]"), "[::1]");
    }
}
