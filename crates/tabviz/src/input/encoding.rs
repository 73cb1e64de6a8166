//! Text encoding detection by trial decoding.

use encoding_rs::Encoding;
use log::debug;
use serde::{Deserialize, Serialize};

/// Encoding detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// Encoding to use without detection (WHATWG label, e.g. "gbk").
    pub declared: Option<String>,
    /// Encodings tried in order; the first strict decode wins.
    pub candidates: Vec<String>,
    /// Encoding used when every candidate fails.
    pub fallback: Option<String>,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            declared: None,
            candidates: vec!["utf-8".to_string(), "gbk".to_string()],
            fallback: Some("windows-1252".to_string()),
        }
    }
}

/// Successfully decoded text.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub text: String,
    /// Canonical name of the encoding that was used.
    pub encoding: &'static str,
}

/// Resolve a WHATWG encoding label.
fn lookup(label: &str) -> Result<&'static Encoding, String> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| format!("unknown encoding label '{}'", label))
}

/// Decode strictly: `None` if any byte sequence is malformed.
fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}

/// Decode bytes following the configured detection order.
///
/// A byte-order mark takes precedence over everything else. Returns a
/// message describing what was tried when no encoding fits.
pub fn decode(bytes: &[u8], config: &EncodingConfig) -> Result<Decoded, String> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let body = bytes.get(bom_len..).unwrap_or_default();
        return decode_strict(encoding, body)
            .map(|text| Decoded {
                text,
                encoding: encoding.name(),
            })
            .ok_or_else(|| format!("content is not valid {} despite its byte-order mark", encoding.name()));
    }

    if let Some(ref label) = config.declared {
        let encoding = lookup(label)?;
        return decode_strict(encoding, bytes)
            .map(|text| Decoded {
                text,
                encoding: encoding.name(),
            })
            .ok_or_else(|| format!("content is not valid {}", encoding.name()));
    }

    let mut tried = Vec::new();
    for label in &config.candidates {
        let encoding = lookup(label)?;
        if let Some(text) = decode_strict(encoding, bytes) {
            debug!("Decoded input as {}", encoding.name());
            return Ok(Decoded {
                text,
                encoding: encoding.name(),
            });
        }
        tried.push(encoding.name());
    }

    if let Some(ref label) = config.fallback {
        let encoding = lookup(label)?;
        let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
        if !had_errors {
            debug!("Falling back to {}", encoding.name());
            return Ok(Decoded {
                text: text.into_owned(),
                encoding: encoding.name(),
            });
        }
        tried.push(encoding.name());
    }

    Err(format!("could not decode with any of: {}", tried.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        let decoded = decode("name,城市\n".as_bytes(), &EncodingConfig::default()).unwrap();
        assert_eq!(decoded.encoding, "UTF-8");
        assert!(decoded.text.contains("城市"));
    }

    #[test]
    fn test_decode_utf8_bom() {
        let bytes = b"\xEF\xBB\xBFa,b\n";
        let decoded = decode(bytes, &EncodingConfig::default()).unwrap();
        assert_eq!(decoded.text, "a,b\n");
    }

    #[test]
    fn test_decode_gbk() {
        let (bytes, _, _) = encoding_rs::GBK.encode("城市,销量\n北京,10\n");
        let decoded = decode(&bytes, &EncodingConfig::default()).unwrap();
        assert_eq!(decoded.encoding, "GBK");
        assert!(decoded.text.starts_with("城市"));
    }

    #[test]
    fn test_fallback_latin1() {
        // 0xE9 followed by a newline is invalid UTF-8 and invalid GBK.
        let bytes = b"city\nCaf\xE9\n";
        let decoded = decode(bytes, &EncodingConfig::default()).unwrap();
        assert_eq!(decoded.encoding, "windows-1252");
        assert!(decoded.text.contains("Café"));
    }

    #[test]
    fn test_no_fallback_fails() {
        let config = EncodingConfig {
            declared: None,
            candidates: vec!["utf-8".into()],
            fallback: None,
        };
        let err = decode(b"Caf\xE9\n", &config).unwrap_err();
        assert!(err.contains("UTF-8"));
    }

    #[test]
    fn test_declared_encoding_is_strict() {
        let config = EncodingConfig {
            declared: Some("utf-8".into()),
            ..EncodingConfig::default()
        };
        assert!(decode(b"Caf\xE9\n", &config).is_err());
    }
}
