//! Saved connection profile model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ProfileError, ProfileResult, UriError};
use crate::uri::{self, ParsedUri};

/// Wire protocol family of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransportKind {
    /// VLESS over TCP
    #[default]
    #[serde(rename = "VLESS")]
    Vless,
}

impl TransportKind {
    /// Returns the display label of the transport
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vless => "VLESS",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reality transport-security parameters
///
/// Present on a profile only when its link carried the `reality` flag.
/// Individual sub-parameters may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealityParams {
    /// Server public key (`pbk`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    /// Server name indication (`sni`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    /// Short ID (`sid`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_id: Option<String>,
    /// TLS client fingerprint (`fp`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl RealityParams {
    /// Returns true if none of the sub-parameters are set
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.public_key.is_none()
            && self.server_name.is_none()
            && self.short_id.is_none()
            && self.fingerprint.is_none()
    }

    /// Query pairs that re-create these parameters in a link
    ///
    /// Always starts with the `reality` flag, followed by the present
    /// sub-parameters in `pbk`, `sni`, `sid`, `fp` order.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![(uri::REALITY_KEY, "1".to_string())];
        let fields = [
            (uri::PUBLIC_KEY_KEY, &self.public_key),
            (uri::SERVER_NAME_KEY, &self.server_name),
            (uri::SHORT_ID_KEY, &self.short_id),
            (uri::FINGERPRINT_KEY, &self.fingerprint),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                pairs.push((key, value.clone()));
            }
        }
        pairs
    }
}

/// A saved, user-named connection endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique identifier, assigned at creation
    pub id: Uuid,
    /// Display label (not necessarily unique)
    pub name: String,
    /// Hostname or IP address
    pub address: String,
    /// Server port
    pub port: u16,
    /// Client credential carried in the link's user-info
    pub identifier: String,
    /// The link this profile was created from or last generated from
    pub raw_uri: String,
    /// Wire protocol family
    #[serde(default)]
    pub transport: TransportKind,
    /// Reality parameters, if the link enabled Reality
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reality: Option<RealityParams>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Creates a profile from a pasted link
    ///
    /// The link is kept verbatim as `raw_uri`.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` if the name or the link's identifier is empty,
    /// or the parse error if the link is invalid.
    pub fn from_uri(name: impl Into<String>, link: &str) -> ProfileResult<Self> {
        let name = required(name.into(), "name")?;
        let parsed = uri::parse(link)?;
        Self::from_parsed(name, link, parsed)
    }

    /// Creates a profile from an already parsed link
    ///
    /// # Errors
    ///
    /// Returns `MissingField` if the name or the identifier is empty.
    pub fn from_parsed(
        name: impl Into<String>,
        link: impl Into<String>,
        parsed: ParsedUri,
    ) -> ProfileResult<Self> {
        let name = required(name.into(), "name")?;
        if parsed.identifier.trim().is_empty() {
            return Err(ProfileError::MissingField("identifier"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            address: parsed.address,
            port: parsed.port,
            identifier: parsed.identifier,
            raw_uri: link.into(),
            transport: TransportKind::Vless,
            reality: parsed.reality,
            created_at: Utc::now(),
        })
    }

    /// Creates a profile from manually entered fields
    ///
    /// The port is range-checked here as well as by the link parser, so a
    /// bad value never reaches the store. The link is generated without
    /// query parameters.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` for empty text fields,
    /// `Uri(OutOfRange)` for a port outside 1-65535, and `Uri(InvalidFormat)`
    /// for an address the generated link cannot carry (`u@h`, `host/x`).
    /// Brackets around an IPv6 literal are dropped.
    pub fn manual(
        name: impl Into<String>,
        address: impl Into<String>,
        port: u32,
        identifier: impl Into<String>,
    ) -> ProfileResult<Self> {
        let name = required(name.into(), "name")?;
        let address = host_literal(required(address.into(), "address")?);
        let identifier = required(identifier.into(), "identifier")?;
        let port = checked_port(port)?;

        let mut profile = Self {
            id: Uuid::new_v4(),
            name,
            address,
            port,
            identifier,
            raw_uri: String::new(),
            transport: TransportKind::Vless,
            reality: None,
            created_at: Utc::now(),
        };
        profile.regenerate_link()?;
        Ok(profile)
    }

    /// Builds a replacement record for this profile with new field values
    ///
    /// The result keeps this profile's `id`, `created_at` and Reality
    /// parameters, and carries a freshly generated link.
    ///
    /// # Errors
    ///
    /// Same as [`Profile::manual`].
    pub fn with_details(
        &self,
        name: impl Into<String>,
        address: impl Into<String>,
        port: u32,
        identifier: impl Into<String>,
    ) -> ProfileResult<Self> {
        let mut replacement = Self {
            id: self.id,
            name: required(name.into(), "name")?,
            address: host_literal(required(address.into(), "address")?),
            port: checked_port(port)?,
            identifier: required(identifier.into(), "identifier")?,
            raw_uri: String::new(),
            transport: self.transport,
            reality: self.reality.clone(),
            created_at: self.created_at,
        };
        replacement.regenerate_link()?;
        Ok(replacement)
    }

    /// Re-checks the profile invariants, including that `raw_uri` parses to
    /// the stored address, port and identifier
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> ProfileResult<()> {
        if self.name.trim().is_empty() {
            return Err(ProfileError::MissingField("name"));
        }
        if self.address.trim().is_empty() {
            return Err(ProfileError::MissingField("address"));
        }
        if self.identifier.trim().is_empty() {
            return Err(ProfileError::MissingField("identifier"));
        }
        checked_port(u32::from(self.port))?;
        self.check_link()
    }

    /// Generates `raw_uri` from the fields and checks that it parses back
    ///
    /// The address is replaced by the parser's form of it (for example a
    /// lower-cased IPv6 literal), so later checks compare exactly.
    fn regenerate_link(&mut self) -> ProfileResult<()> {
        self.raw_uri = uri::generate_for_profile(self);
        let parsed = uri::parse(&self.raw_uri)?;
        if !parsed.address.eq_ignore_ascii_case(&self.address) {
            return Err(self.link_mismatch());
        }
        self.address = parsed.address;
        self.check_link()
    }

    /// Checks that `raw_uri` parses to this profile's endpoint and identifier
    fn check_link(&self) -> ProfileResult<()> {
        let parsed = uri::parse(&self.raw_uri)?;
        if parsed.address != self.address
            || parsed.port != self.port
            || parsed.identifier != self.identifier
        {
            return Err(self.link_mismatch());
        }
        Ok(())
    }

    fn link_mismatch(&self) -> ProfileError {
        UriError::InvalidFormat(format!(
            "address '{}' does not survive link encoding",
            self.address
        ))
        .into()
    }

    /// Returns true if the profile carries Reality parameters
    #[must_use]
    pub const fn is_reality_enabled(&self) -> bool {
        self.reality.is_some()
    }

    /// Returns `address:port`, bracketing IPv6 literals
    #[must_use]
    pub fn display_endpoint(&self) -> String {
        format!("{}:{}", uri::format_host(&self.address), self.port)
    }
}

fn required(value: String, field: &'static str) -> ProfileResult<String> {
    if value.trim().is_empty() {
        Err(ProfileError::MissingField(field))
    } else {
        Ok(value)
    }
}

/// Strips the brackets a user may type around an IPv6 literal
fn host_literal(address: String) -> String {
    match address
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        Some(inner) => inner.to_string(),
        None => address,
    }
}

fn checked_port(port: u32) -> ProfileResult<u16> {
    match u16::try_from(port) {
        Ok(p) if p != 0 => Ok(p),
        _ => Err(UriError::OutOfRange(port.to_string()).into()),
    }
}
