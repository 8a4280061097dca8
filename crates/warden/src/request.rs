//! Request metadata: the parts of an HTTP request Warden reads.
//!
//! The API layer copies headers and the peer address into a
//! [`RequestMeta`]; Warden never sees the framework's request type.

use std::collections::HashMap;
use std::net::IpAddr;

use unicode_normalization::UnicodeNormalization;
use warden_session::Fingerprint;

use crate::WardenError;

/// Headers (case-insensitive) and peer address of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    headers: HashMap<String, String>,
    peer: Option<IpAddr>,
}

impl RequestMeta {
    /// An empty request: no headers, no peer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header. Names are stored lowercase; a repeated name
    /// replaces the earlier value.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Sets the socket peer address.
    pub fn peer(mut self, addr: IpAddr) -> Self {
        self.peer = Some(addr);
        self
    }

    /// Looks up a header by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The bearer token from `Authorization`, with a leading `Bearer `
    /// removed. A header without the prefix is taken as the token itself.
    /// A blank token counts as no token.
    pub fn bearer_token(&self) -> Option<&str> {
        let value = self.get("authorization")?;
        non_blank(value.strip_prefix("Bearer ").unwrap_or(value))
    }

    /// The `User-Agent` header, NFKD-normalized. Empty when absent.
    pub fn user_agent(&self) -> String {
        self.get("user-agent")
            .map(|ua| ua.nfkd().collect())
            .unwrap_or_default()
    }

    /// Resolves the client address.
    ///
    /// Checked in order:
    /// 1. `ip_header` (set by a trusted proxy)
    /// 2. the first entry of `x-forwarded-for`
    /// 3. `x-real-ip`
    /// 4. the socket peer
    ///
    /// Blank header values are skipped.
    ///
    /// # Errors
    /// [`WardenError::ClientAddressMissing`] when none of them is present.
    pub fn client_address(&self, ip_header: &str) -> Result<String, WardenError> {
        let from_headers = self
            .get(ip_header)
            .and_then(non_blank)
            .or_else(|| {
                self.get("x-forwarded-for")
                    .and_then(|list| list.split(',').next())
                    .and_then(non_blank)
            })
            .or_else(|| self.get("x-real-ip").and_then(non_blank));

        match (from_headers, self.peer) {
            (Some(ip), _) => Ok(ip.to_string()),
            (None, Some(peer)) => Ok(peer.to_string()),
            (None, None) => Err(WardenError::ClientAddressMissing),
        }
    }

    /// The session fingerprint for this request.
    ///
    /// # Errors
    /// [`WardenError::ClientAddressMissing`], see
    /// [`client_address`](Self::client_address).
    pub fn fingerprint(&self, ip_header: &str) -> Result<Fingerprint, WardenError> {
        Ok(Fingerprint::new(
            self.user_agent(),
            self.client_address(ip_header)?,
        ))
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}
