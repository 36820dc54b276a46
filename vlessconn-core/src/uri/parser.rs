//! Link parsing.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{UriError, UriResult};
use crate::models::RealityParams;

use super::{
    FINGERPRINT_KEY, PUBLIC_KEY_KEY, REALITY_KEY, SCHEME, SERVER_NAME_KEY, SHORT_ID_KEY,
};

/// Fields extracted from a VLESS link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedUri {
    /// Client credential from the user-info, percent-decoded
    pub identifier: String,
    /// Host, without IPv6 brackets
    pub address: String,
    /// Port, always within 1-65535
    pub port: u16,
    /// Reality parameters, present iff the `reality` flag was set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reality: Option<RealityParams>,
    /// Decoded fragment, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl ParsedUri {
    /// Returns true if the link carried the Reality flag
    #[must_use]
    pub const fn is_reality_enabled(&self) -> bool {
        self.reality.is_some()
    }
}

/// Parses a VLESS link
///
/// Unrecognized query keys are ignored. An empty identifier is accepted
/// here; profile construction rejects it.
///
/// # Errors
///
/// Returns `InvalidFormat` if the text is not a link, uses another scheme,
/// or lacks a host or numeric port, and `OutOfRange` if the port is numeric
/// but outside 1-65535.
pub fn parse(text: &str) -> UriResult<ParsedUri> {
    let _span = crate::trace_operation_debug!(crate::tracing::span_names::URI_PARSE).entered();
    let url = Url::parse(text).map_err(|e| classify_url_error(text, e))?;

    if !url.scheme().eq_ignore_ascii_case(SCHEME) {
        tracing::debug!(scheme = %url.scheme(), "Rejected link with unsupported scheme");
        return Err(UriError::InvalidFormat(format!(
            "expected scheme '{SCHEME}', found '{}'",
            url.scheme()
        )));
    }

    let address = url
        .host_str()
        .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
        .unwrap_or_default();
    if address.is_empty() {
        return Err(UriError::InvalidFormat("missing host".to_string()));
    }

    let port = match url.port() {
        Some(0) => return Err(UriError::OutOfRange("0".to_string())),
        Some(port) => port,
        None => return Err(UriError::InvalidFormat("missing port".to_string())),
    };

    let identifier = urlencoding::decode(url.username())
        .map_err(|e| UriError::InvalidFormat(format!("identifier is not valid UTF-8: {e}")))?
        .into_owned();

    let remark = url
        .fragment()
        .filter(|f| !f.is_empty())
        .map(|f| {
            urlencoding::decode(f)
                .map(std::borrow::Cow::into_owned)
                .unwrap_or_else(|_| f.to_string())
        });

    Ok(ParsedUri {
        identifier,
        address: address.to_string(),
        port,
        reality: reality_params(&url),
        remark,
    })
}

fn reality_params(url: &Url) -> Option<RealityParams> {
    let mut enabled = false;
    let mut params = RealityParams::default();

    for (key, value) in url.query_pairs() {
        let slot = match key.as_ref() {
            REALITY_KEY => {
                enabled = true;
                continue;
            }
            PUBLIC_KEY_KEY => &mut params.public_key,
            SERVER_NAME_KEY => &mut params.server_name,
            SHORT_ID_KEY => &mut params.short_id,
            FINGERPRINT_KEY => &mut params.fingerprint,
            _ => continue,
        };
        // first occurrence wins
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }

    enabled.then_some(params)
}

/// Maps a `url` parse failure onto the codec's error kinds
///
/// The URL parser reports both non-numeric and overflowing ports as
/// `InvalidPort`, so the raw port text decides between the two.
fn classify_url_error(text: &str, err: url::ParseError) -> UriError {
    if err == url::ParseError::InvalidPort
        && let Some(port) = raw_port(text)
        && is_numeric_out_of_range(port)
    {
        return UriError::OutOfRange(port.to_string());
    }
    tracing::debug!(error = %err, "Rejected malformed link");
    UriError::InvalidFormat(err.to_string())
}

fn raw_port(text: &str) -> Option<&str> {
    let (_, rest) = text.trim().split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    let (_, port) = host_port.rsplit_once(':')?;
    Some(port)
}

fn is_numeric_out_of_range(port: &str) -> bool {
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    // digit strings too long for u32 are out of range as well
    port.parse::<u32>()
        .map_or(true, |p| p == 0 || p > u32::from(u16::MAX))
}
