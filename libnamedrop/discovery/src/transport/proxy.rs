use std::env;

use serde::{Deserialize, Serialize};

use super::{OutboundRequest, RawResponse, TransportError};
use crate::settings::SettingsError;

pub const PROXY_CHAIN_ENV: &str = "NAMEDROP_PROXY_CHAIN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyHeader {
    pub name: String,
    pub value: String,
}

/// A forwarding endpoint. The target url is percent-encoded and appended to `prefix`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProxyEndpoint {
    /// Response body is the target's JSON, unchanged.
    Direct {
        prefix: String,
        #[serde(default)]
        headers: Vec<ProxyHeader>,
    },
    /// Response body is `{ "contents": "<target JSON as a string>" }`.
    Enveloped {
        prefix: String,
        #[serde(default)]
        headers: Vec<ProxyHeader>,
    },
}

impl ProxyEndpoint {
    pub fn direct(prefix: impl Into<String>) -> Self {
        Self::Direct {
            prefix: prefix.into(),
            headers: vec![],
        }
    }

    pub fn enveloped(prefix: impl Into<String>) -> Self {
        Self::Enveloped {
            prefix: prefix.into(),
            headers: vec![],
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let header = ProxyHeader {
            name: name.into(),
            value: value.into(),
        };
        match &mut self {
            Self::Direct { headers, .. } | Self::Enveloped { headers, .. } => headers.push(header),
        }
        self
    }

    pub fn prefix(&self) -> &str {
        match self {
            Self::Direct { prefix, .. } | Self::Enveloped { prefix, .. } => prefix,
        }
    }

    fn headers(&self) -> &[ProxyHeader] {
        match self {
            Self::Direct { headers, .. } | Self::Enveloped { headers, .. } => headers,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProxyChain(Vec<ProxyEndpoint>);

impl ProxyChain {
    pub fn new(endpoints: Vec<ProxyEndpoint>) -> Self {
        Self(endpoints)
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(json).map_err(|e| SettingsError::InvalidProxyChain(e.to_string()))
    }

    /// Reads the chain from `NAMEDROP_PROXY_CHAIN`. An unset variable yields an empty chain.
    pub fn from_env() -> Result<Self, SettingsError> {
        match env::var(PROXY_CHAIN_ENV) {
            Ok(json) if !json.trim().is_empty() => Self::from_json(&json),
            _ => Ok(Self::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn route(&self, cursor: usize) -> Route<'_> {
        if self.0.is_empty() {
            Route::Origin
        } else {
            Route::Via(&self.0[cursor % self.0.len()])
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Route<'a> {
    Origin,
    Via(&'a ProxyEndpoint),
}

#[derive(Deserialize)]
struct Envelope {
    contents: Option<String>,
    status: Option<EnvelopeStatus>,
}

#[derive(Deserialize)]
struct EnvelopeStatus {
    http_code: Option<u16>,
}

impl Route<'_> {
    pub(crate) fn label(&self) -> &str {
        match self {
            Route::Origin => "origin",
            Route::Via(endpoint) => endpoint.prefix(),
        }
    }

    pub(crate) fn request(&self, target_url: &str, headers: &[(String, String)]) -> OutboundRequest {
        let mut request = OutboundRequest {
            url: target_url.to_owned(),
            headers: headers.to_vec(),
        };
        if let Route::Via(endpoint) = self {
            request.url = format!("{}{}", endpoint.prefix(), urlencoding::encode(target_url));
            request.headers.extend(
                endpoint
                    .headers()
                    .iter()
                    .map(|h| (h.name.clone(), h.value.clone())),
            );
        }
        request
    }

    /// Strips proxy framing so the caller sees the target's status and body.
    pub(crate) fn unwrap(&self, response: RawResponse) -> Result<RawResponse, TransportError> {
        let Route::Via(ProxyEndpoint::Enveloped { .. }) = self else {
            return Ok(response);
        };
        // the proxy itself failed, nothing to unwrap
        if !(200..300).contains(&response.status) {
            return Ok(response);
        }

        let envelope: Envelope = serde_json::from_str(&response.body)
            .map_err(|e| TransportError::MalformedBody(format!("invalid proxy envelope: {e}")))?;
        Ok(RawResponse {
            status: envelope
                .status
                .and_then(|s| s.http_code)
                .unwrap_or(response.status),
            retry_after: response.retry_after,
            body: envelope.contents.unwrap_or_default(),
        })
    }
}
