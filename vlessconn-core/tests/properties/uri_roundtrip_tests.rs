//! Property tests for the VLESS link codec

use proptest::prelude::*;
use vlessconn_core::RealityParams;
use vlessconn_core::UriError;
use vlessconn_core::uri::{generate, parse, parse_batch_valid};

const NO_PARAMS: &[(&str, &str)] = &[];

/// Identifiers that need no percent-encoding
fn identifier_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9][a-zA-Z0-9._~-]{0,40}",
        "[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}",
    ]
}

/// Lower-case DNS names and IPv4 literals
fn host_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9-]{0,15}(\\.[a-z][a-z0-9-]{0,15}){0,3}",
        (1u8..=254, 0u8..=255, 0u8..=255, 1u8..=254)
            .prop_map(|(a, b, c, d)| format!("{a}.{b}.{c}.{d}")),
    ]
}

fn optional_value() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[A-Za-z0-9_-]{1,24}")
}

proptest! {
    /// Property: generate then parse recovers identifier, host and port
    #[test]
    fn generate_parse_round_trip(
        identifier in identifier_strategy(),
        host in host_strategy(),
        port in 1u16..=65535,
    ) {
        let link = generate(&identifier, &host, port, NO_PARAMS);
        let parsed = parse(&link).unwrap();
        prop_assert_eq!(&parsed.identifier, &identifier);
        prop_assert_eq!(&parsed.address, &host);
        prop_assert_eq!(parsed.port, port);
        prop_assert!(!parsed.is_reality_enabled());
    }

    /// Property: any identifier survives a round trip thanks to encoding
    #[test]
    fn arbitrary_identifier_round_trip(identifier in "\\PC{1,30}") {
        let link = generate(&identifier, "example.com", 443, NO_PARAMS);
        prop_assert_eq!(parse(&link).unwrap().identifier, identifier);
    }

    /// Property: Reality parameters survive a round trip
    #[test]
    fn reality_round_trip(
        public_key in optional_value(),
        server_name in optional_value(),
        short_id in optional_value(),
        fingerprint in optional_value(),
    ) {
        let params = RealityParams { public_key, server_name, short_id, fingerprint };
        let link = generate("user", "example.com", 443, &params.to_query_pairs());
        prop_assert_eq!(parse(&link).unwrap().reality, Some(params));
    }

    /// Property: numeric ports above 65535 are out of range
    #[test]
    fn ports_above_range_rejected(port in 65_536u64..10_000_000) {
        let result = parse(&format!("vless://u@h:{port}"));
        prop_assert_eq!(result, Err(UriError::OutOfRange(port.to_string())));
    }

    /// Property: other schemes are rejected as invalid format
    #[test]
    fn other_schemes_rejected(scheme in "(http|https|vmess|trojan|ss)") {
        let result = parse(&format!("{scheme}://u@h:443"));
        prop_assert!(matches!(result, Err(UriError::InvalidFormat(_))));
    }

    /// Property: parsing is deterministic and never panics
    #[test]
    fn parse_is_deterministic(text in "\\PC{0,80}") {
        prop_assert_eq!(parse(&text), parse(&text));
    }

    /// Property: batch parsing keeps the valid links in input order
    #[test]
    fn batch_keeps_valid_in_order(
        entries in proptest::collection::vec(
            prop_oneof![
                (identifier_strategy(), 1u16..=65535)
                    .prop_map(|(id, port)| (generate(&id, "example.com", port, NO_PARAMS), true)),
                Just(("not a uri".to_string(), false)),
                Just(("vless://u@h:0".to_string(), false)),
            ],
            0..12,
        )
    ) {
        let links: Vec<&str> = entries.iter().map(|(l, _)| l.as_str()).collect();
        let expected: Vec<&str> = entries
            .iter()
            .filter(|(_, valid)| *valid)
            .map(|(l, _)| l.as_str())
            .collect();

        let parsed = parse_batch_valid(links);
        let got: Vec<&str> = parsed.iter().map(|(l, _)| l.as_str()).collect();
        prop_assert_eq!(got, expected);
    }
}
