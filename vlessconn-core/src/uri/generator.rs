//! Link generation.

use url::form_urlencoded;

use crate::models::{Profile, RealityParams};

use super::{SCHEME, format_host};

/// Builds a VLESS link from its parts
///
/// Query parameters are serialized in the order given. The identifier is
/// percent-encoded so that the link always parses back to the same value.
/// Nothing is range-checked: callers pass already validated input.
///
/// # Examples
///
/// ```
/// use vlessconn_core::uri::generate;
///
/// let link = generate("user", "example.com", 443, &[("reality", "1"), ("sni", "example.com")]);
/// assert_eq!(link, "vless://user@example.com:443?reality=1&sni=example.com");
/// ```
#[must_use]
pub fn generate<K, V>(identifier: &str, address: &str, port: u16, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut link = format!(
        "{SCHEME}://{}@{}:{port}",
        urlencoding::encode(identifier),
        format_host(address)
    );

    if !params.is_empty() {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))
            .finish();
        link.push('?');
        link.push_str(&query);
    }

    link
}

/// Regenerates the link for a profile from its fields
#[must_use]
pub fn generate_for_profile(profile: &Profile) -> String {
    let params = profile
        .reality
        .as_ref()
        .map(RealityParams::to_query_pairs)
        .unwrap_or_default();
    generate(&profile.identifier, &profile.address, profile.port, &params)
}
