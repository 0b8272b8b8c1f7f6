//! Helpers for encoding/decoding persisted session state as an opaque
//! string.
//!
//! Session lifecycle implementations that persist state through a string
//! channel (a cookie value, a cache entry) can use these instead of
//! inventing their own framing.
//!
//! Note: the on-wire format is versioned, but it is still considered an
//! implementation detail and may evolve.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::SessionState;

const VERSION: u8 = 1;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to encode session state: {0}")]
    Encode(String),
    #[error("failed to decode session state: {0}")]
    Decode(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    v: u8,
    state: SessionState,
}

/// Encode a [`SessionState`] into an opaque string value.
pub fn encode_state(state: &SessionState) -> Result<String, Error> {
    let envelope = Envelope {
        v: VERSION,
        state: state.clone(),
    };

    let bytes = serde_json::to_vec(&envelope).map_err(|err| Error::Encode(err.to_string()))?;

    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Decode an opaque string value into a [`SessionState`].
pub fn decode_state(value: &str) -> Result<SessionState, Error> {
    let bytes = URL_SAFE_NO_PAD
        .decode(value.as_bytes())
        .map_err(|err| Error::Decode(err.to_string()))?;

    let envelope: Envelope =
        serde_json::from_slice(&bytes).map_err(|err| Error::Decode(err.to_string()))?;

    if envelope.v != VERSION {
        return Err(Error::Decode(format!(
            "Unsupported session state version: {}",
            envelope.v
        )));
    }

    Ok(envelope.state)
}
