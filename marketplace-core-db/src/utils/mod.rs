use heapless::String as HeaplessString;
use serde::Serialize;
use std::hash::Hasher;
use std::str::FromStr;
use twox_hash::XxHash64;

/// Hashes serializable data into an i64 using CBOR serialization and XxHash64.
///
/// This provides a stable hash across different runs and systems by:
/// - Serializing the data to CBOR format (deterministic binary representation)
/// - Using XxHash64 with a fixed seed (0) for consistent hashing
pub fn hash_as_i64<T: Serialize>(data: &T) -> Result<i64, String> {
    let mut hasher = XxHash64::with_seed(0);
    let mut cbor = Vec::new();
    ciborium::ser::into_writer(data, &mut cbor)
        .map_err(|e| format!("Failed to serialize data for hashing: {e}"))?;
    hasher.write(&cbor);
    Ok(hasher.finish() as i64)
}

/// Converts a `&str` into a bounded `HeaplessString`, erroring when the
/// value exceeds the capacity.
pub fn to_heapless<const N: usize>(value: &str) -> Result<HeaplessString<N>, String> {
    HeaplessString::from_str(value)
        .map_err(|_| format!("Value is too long (max {N} chars): {value:.32}"))
}

/// Same as [`to_heapless`], but maps an empty string to `None`.
pub fn to_optional_heapless<const N: usize>(
    value: &str,
) -> Result<Option<HeaplessString<N>>, String> {
    if value.is_empty() {
        return Ok(None);
    }
    to_heapless(value).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_for_equal_input() {
        let a = hash_as_i64(&("contract", 42u32)).unwrap();
        let b = hash_as_i64(&("contract", 42u32)).unwrap();
        assert_eq!(a, b);
        let c = hash_as_i64(&("contract", 43u32)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn heapless_conversion_enforces_capacity() {
        assert!(to_heapless::<4>("abcd").is_ok());
        assert!(to_heapless::<4>("abcde").is_err());
        assert_eq!(to_optional_heapless::<4>("").unwrap(), None);
    }
}
