//! Content hashing and canonical encoding.
//!
//! Two independent implementations given the same interface (or the same
//! ordered interface set, or the same rejection) MUST compute identical
//! identifiers. Everything hashed here goes through one canonical JSON
//! encoding:
//!
//! 1. Serialize the value with serde into a `serde_json::Value`
//! 2. Encode per RFC 8785 (JCS): sorted keys, no whitespace, integer numbers
//! 3. Hash the bytes with SHA-256

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// A content-addressed identity: lowercase hex SHA-256.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Compute a content hash from raw bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{hash:x}"))
    }

    /// Hash the canonical JSON encoding of a serializable value.
    pub fn of_canonical<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::from_bytes(&canonical_json_bytes(value)?))
    }

    /// A builder for incrementally computing content hashes.
    pub fn builder(domain: &str) -> ContentHashBuilder {
        let mut hasher = Sha256::new();
        hasher.update(domain.as_bytes());
        hasher.update(b"\n");
        ContentHashBuilder { hasher }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for logs.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Incremental content hash builder.
///
/// Feeds fields in a caller-defined stable order. The domain label passed
/// to [`ContentHash::builder`] separates hashes of different object kinds.
pub struct ContentHashBuilder {
    hasher: Sha256,
}

impl ContentHashBuilder {
    /// Feed a string field into the hash.
    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.hasher.update(name.as_bytes());
        self.hasher.update(b":");
        self.hasher.update(value.as_bytes());
        self.hasher.update(b"\n");
        self
    }

    /// Feed an integer field into the hash.
    pub fn field_int(self, name: &str, value: i64) -> Self {
        self.field(name, &value.to_string())
    }

    /// Finalize and produce the content hash.
    pub fn finish(self) -> ContentHash {
        let hash = self.hasher.finalize();
        ContentHash(format!("{hash:x}"))
    }
}

/// Canonical JSON bytes of any serializable value.
pub fn canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    let mut buf = Vec::new();
    jcs_write(&value, &mut buf)?;
    Ok(buf)
}

/// RFC 8785 JSON Canonicalization Scheme, restricted to the value shapes
/// the kernel produces (integers, strings, bools, null, arrays, objects).
fn jcs_write(value: &Value, buf: &mut Vec<u8>) -> Result<(), serde_json::Error> {
    match value {
        Value::Null => buf.extend_from_slice(b"null"),
        Value::Bool(true) => buf.extend_from_slice(b"true"),
        Value::Bool(false) => buf.extend_from_slice(b"false"),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                buf.extend_from_slice(i.to_string().as_bytes());
            } else if let Some(u) = n.as_u64() {
                buf.extend_from_slice(u.to_string().as_bytes());
            } else {
                buf.extend_from_slice(n.to_string().as_bytes());
            }
        }
        Value::String(_) => buf.extend_from_slice(&serde_json::to_vec(value)?),
        Value::Array(arr) => {
            buf.push(b'[');
            for (i, v) in arr.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                jcs_write(v, buf)?;
            }
            buf.push(b']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            buf.push(b'{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                buf.extend_from_slice(&serde_json::to_vec(key)?);
                buf.push(b':');
                jcs_write(&map[key], buf)?;
            }
            buf.push(b'}');
        }
    }
    Ok(())
}

/// RFC 4648 base32hex encoding, lowercase, without padding.
pub fn base32hex_lower_no_pad(data: &[u8]) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuv";

    let mut result = String::with_capacity(data.len() * 8 / 5 + 1);
    let mut bits: u64 = 0;
    let mut num_bits: u32 = 0;

    for &byte in data {
        bits = (bits << 8) | u64::from(byte);
        num_bits += 8;

        while num_bits >= 5 {
            num_bits -= 5;
            let idx = ((bits >> num_bits) & 0x1f) as usize;
            result.push(ALPHABET[idx] as char);
        }
    }

    if num_bits > 0 {
        let idx = ((bits << (5 - num_bits)) & 0x1f) as usize;
        result.push(ALPHABET[idx] as char);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_bytes_sort_keys_and_drop_whitespace() {
        let v = json!({"b": 1, "a": {"y": [true, null], "x": "s"}});
        let bytes = canonical_json_bytes(&v).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"a":{"x":"s","y":[true,null]},"b":1}"#
        );
    }

    #[test]
    fn content_hash_is_key_order_independent() {
        let a = json!({"name": "FungibleAsset", "version": 1});
        let b = json!({"version": 1, "name": "FungibleAsset"});
        assert_eq!(
            ContentHash::of_canonical(&a).unwrap(),
            ContentHash::of_canonical(&b).unwrap()
        );
    }

    #[test]
    fn empty_input_hash_is_sha256_of_empty() {
        assert_eq!(
            ContentHash::from_bytes(b"").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn builder_is_domain_separated() {
        let a = ContentHash::builder("a").field("k", "v").finish();
        let b = ContentHash::builder("b").field("k", "v").finish();
        assert_ne!(a, b);
    }

    #[test]
    fn base32hex_known_vectors() {
        // RFC 4648 §10 test vectors (lowercased, unpadded).
        assert_eq!(base32hex_lower_no_pad(b""), "");
        assert_eq!(base32hex_lower_no_pad(b"f"), "co");
        assert_eq!(base32hex_lower_no_pad(b"fo"), "cpng");
        assert_eq!(base32hex_lower_no_pad(b"foo"), "cpnmu");
        assert_eq!(base32hex_lower_no_pad(b"foobar"), "cpnmuoj1e8");
    }
}
