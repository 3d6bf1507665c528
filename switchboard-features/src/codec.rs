//! Compact string codec for persisted feature sets.
//!
//! A feature set is stored as concatenated `(marker)(token)` pairs:
//!
//! | Value            | Encoding        |
//! |------------------|-----------------|
//! | `Boolean(true)`  | `*name`         |
//! | `Boolean(false)` | `!name`         |
//! | `Variant(v)`     | `*v\|name`      |
//!
//! For the `v|name` form the marker is not consulted when decoding.
//!
//! ```
//! use switchboard_features::{codec, FeatureSet, FlagValue};
//!
//! let mut features = FeatureSet::new();
//! features.insert("beta".to_string(), FlagValue::Boolean(true));
//! features.insert("theme".to_string(), FlagValue::variant("dark"));
//!
//! let encoded = codec::encode(Some(&features)).unwrap();
//! assert_eq!(encoded, "*beta*dark|theme");
//! assert_eq!(codec::decode(Some(&encoded)), features);
//! ```

use crate::error::CodecError;
use crate::flag::{FeatureSet, FlagValue};
use tracing::warn;

/// Marker for an active flag (and for variant tokens).
pub const ENABLED_MARKER: char = '*';

/// Marker for an explicitly disabled flag.
pub const DISABLED_MARKER: char = '!';

/// Separates a variant value from its flag name.
pub const VARIANT_SEPARATOR: char = '|';

fn is_marker(c: char) -> bool {
    c == ENABLED_MARKER || c == DISABLED_MARKER
}

fn is_reserved(c: char) -> bool {
    is_marker(c) || c == VARIANT_SEPARATOR
}

/// Check whether a flag name survives an encode/decode round trip.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(is_reserved)
}

/// Check whether a variant value survives an encode/decode round trip.
pub fn is_valid_variant(variant: &str) -> bool {
    !variant.chars().any(is_reserved)
}

/// Encode a feature set. `None` stays `None`.
///
/// Entries the format cannot represent (a reserved character in the name
/// or variant) are skipped with a warning, so one bad entry never
/// corrupts the rest of the persisted set.
pub fn encode(features: Option<&FeatureSet>) -> Option<String> {
    let features = features?;
    let mut out = String::new();

    for (name, value) in features {
        if !is_valid_name(name) {
            warn!("Not persisting flag {:?}: name contains reserved characters", name);
            continue;
        }

        match value {
            FlagValue::Boolean(true) => {
                out.push(ENABLED_MARKER);
            }
            FlagValue::Boolean(false) => {
                out.push(DISABLED_MARKER);
            }
            FlagValue::Variant(variant) => {
                if !is_valid_variant(variant) {
                    warn!(
                        "Not persisting flag {:?}: variant {:?} contains reserved characters",
                        name, variant
                    );
                    continue;
                }
                out.push(ENABLED_MARKER);
                out.push_str(variant);
                out.push(VARIANT_SEPARATOR);
            }
        }
        out.push_str(name);
    }

    Some(out)
}

/// Decode a persisted string, degrading to an empty set on malformed input.
pub fn decode(encoded: Option<&str>) -> FeatureSet {
    let Some(encoded) = encoded else {
        return FeatureSet::new();
    };

    match try_decode(encoded) {
        Ok(features) => features,
        Err(e) => {
            warn!("Discarding malformed feature string {:?}: {}", encoded, e);
            FeatureSet::new()
        }
    }
}

/// Strictly decode a persisted string.
pub fn try_decode(encoded: &str) -> Result<FeatureSet, CodecError> {
    let mut features = FeatureSet::new();
    if encoded.is_empty() {
        return Ok(features);
    }

    let first = encoded.find(is_marker).unwrap_or(encoded.len());
    if first > 0 {
        return Err(CodecError::LeadingText(encoded[..first].to_string()));
    }

    let mut rest = encoded;
    let mut offset = 0;

    while let Some(marker) = rest.chars().next() {
        let body = &rest[marker.len_utf8()..];
        let end = body.find(is_marker).unwrap_or(body.len());
        let token = &body[..end];

        if token.is_empty() {
            return Err(CodecError::EmptyToken(offset));
        }

        match token.split_once(VARIANT_SEPARATOR) {
            Some((_, name)) if name.contains(VARIANT_SEPARATOR) => {
                return Err(CodecError::AmbiguousVariant(token.to_string()));
            }
            Some((_, "")) => {
                return Err(CodecError::MissingName(token.to_string()));
            }
            Some((variant, name)) => {
                features.insert(name.to_string(), FlagValue::Variant(variant.to_string()));
            }
            None => {
                features.insert(
                    token.to_string(),
                    FlagValue::Boolean(marker == ENABLED_MARKER),
                );
            }
        }

        let consumed = marker.len_utf8() + end;
        offset += consumed;
        rest = &rest[consumed..];
    }

    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(entries: &[(&str, FlagValue)]) -> FeatureSet {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_encode_none() {
        assert_eq!(encode(None), None);
    }

    #[test]
    fn test_encode_markers() {
        let features = set(&[
            ("alpha", FlagValue::Boolean(true)),
            ("beta", FlagValue::Boolean(false)),
            ("theme", FlagValue::variant("dark")),
        ]);

        assert_eq!(
            encode(Some(&features)).as_deref(),
            Some("*alpha!beta*dark|theme")
        );
    }

    #[test]
    fn test_decode_empty_inputs() {
        assert!(decode(None).is_empty());
        assert!(decode(Some("")).is_empty());
    }

    #[test]
    fn test_decode_variant_ignores_marker() {
        let features = decode(Some("!dark|theme"));
        assert_eq!(features.get("theme"), Some(&FlagValue::variant("dark")));
    }

    #[test]
    fn test_decode_empty_variant_value() {
        let features = decode(Some("*|theme"));
        assert_eq!(features.get("theme"), Some(&FlagValue::variant("")));
    }

    #[test]
    fn test_decode_later_entry_wins() {
        let features = decode(Some("*beta!beta"));
        assert_eq!(features.get("beta"), Some(&FlagValue::Boolean(false)));
    }

    #[test]
    fn test_decode_unicode_names() {
        let features = decode(Some("*caf\u{e9}!na\u{ef}ve"));
        assert_eq!(features.get("caf\u{e9}"), Some(&FlagValue::Boolean(true)));
        assert_eq!(features.get("na\u{ef}ve"), Some(&FlagValue::Boolean(false)));
    }

    #[test]
    fn test_try_decode_rejects_malformed() {
        assert_eq!(
            try_decode("garbage*beta"),
            Err(CodecError::LeadingText("garbage".to_string()))
        );
        assert_eq!(try_decode("*beta**gamma"), Err(CodecError::EmptyToken(5)));
        assert_eq!(try_decode("*"), Err(CodecError::EmptyToken(0)));
        assert_eq!(
            try_decode("*a|b|c"),
            Err(CodecError::AmbiguousVariant("a|b|c".to_string()))
        );
        assert_eq!(
            try_decode("*dark|"),
            Err(CodecError::MissingName("dark|".to_string()))
        );
    }

    #[test]
    fn test_decode_malformed_is_empty() {
        assert!(decode(Some("not a feature string")).is_empty());
        assert!(decode(Some("*ok*a|b|c")).is_empty());
    }

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("new-ui"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("a*b"));
        assert!(!is_valid_name("a|b"));
        assert!(!is_valid_name("!a"));
    }

    #[test]
    fn test_encode_skips_unrepresentable_entries() {
        let features = set(&[
            ("beta", FlagValue::Boolean(true)),
            ("exp", FlagValue::variant("a|b")),
            ("glob", FlagValue::variant("x*y")),
            ("no*pe", FlagValue::Boolean(false)),
            ("theme", FlagValue::variant("dark")),
        ]);

        let encoded = encode(Some(&features)).unwrap();
        assert_eq!(encoded, "*beta*dark|theme");
        assert_eq!(
            decode(Some(&encoded)),
            set(&[
                ("beta", FlagValue::Boolean(true)),
                ("theme", FlagValue::variant("dark")),
            ])
        );
    }

    #[test]
    fn test_valid_variants() {
        assert!(is_valid_variant("dark"));
        assert!(is_valid_variant(""));
        assert!(!is_valid_variant("a|b"));
        assert!(!is_valid_variant("x*y"));
        assert!(!is_valid_variant("!off"));
    }

    fn flag_value() -> impl Strategy<Value = FlagValue> {
        prop_oneof![
            any::<bool>().prop_map(FlagValue::Boolean),
            "[a-z0-9_.-]{0,8}".prop_map(FlagValue::Variant),
        ]
    }

    proptest! {
        #[test]
        fn test_round_trip(features in prop::collection::btree_map("[a-zA-Z0-9_.-]{1,12}", flag_value(), 0..8)) {
            let encoded = encode(Some(&features));
            prop_assert_eq!(decode(encoded.as_deref()), features);
        }
    }
}
