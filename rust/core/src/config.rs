// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoder module location, resolved from host config or environment variables.

use serde::Deserialize;

/// Default directory the decoder's `.wasm` file is served from.
pub const DEFAULT_LOCAL_WASM_PATH: &str = "/wasm/";

/// Default CDN location of the decoder module.
pub const DEFAULT_REMOTE_WASM_URL: &str = "https://unpkg.com/web-ifc@0.0.66/";

/// Where to fetch the foreign decoding engine from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecoderConfig {
    /// Local (same-origin) directory containing the module.
    pub local_wasm_path: String,
    /// Remote (CDN) directory containing the module.
    pub remote_wasm_url: String,
    /// Prefer the remote location.
    pub use_remote: bool,
}

impl DecoderConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            local_wasm_path: std::env::var("IFC_VIEW_WASM_PATH")
                .unwrap_or_else(|_| DEFAULT_LOCAL_WASM_PATH.into()),
            remote_wasm_url: std::env::var("IFC_VIEW_WASM_CDN")
                .unwrap_or_else(|_| DEFAULT_REMOTE_WASM_URL.into()),
            use_remote: std::env::var("IFC_VIEW_USE_CDN")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }

    /// The single location string handed to the decoder binding.
    pub fn resolve_location(&self) -> &str {
        if self.use_remote {
            &self.remote_wasm_url
        } else {
            &self.local_wasm_path
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            local_wasm_path: DEFAULT_LOCAL_WASM_PATH.into(),
            remote_wasm_url: DEFAULT_REMOTE_WASM_URL.into(),
            use_remote: false,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_location() {
        let mut config = DecoderConfig::default();
        assert_eq!(config.resolve_location(), DEFAULT_LOCAL_WASM_PATH);

        config.use_remote = true;
        assert_eq!(config.resolve_location(), DEFAULT_REMOTE_WASM_URL);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" YES "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("nope"));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: DecoderConfig =
            serde_json::from_str(r#"{"useRemote": true, "remoteWasmUrl": "https://cdn.test/"}"#)
                .unwrap();
        assert!(config.use_remote);
        assert_eq!(config.local_wasm_path, DEFAULT_LOCAL_WASM_PATH);
        assert_eq!(config.resolve_location(), "https://cdn.test/");
    }
}
