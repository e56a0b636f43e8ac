use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `salt` immediately followed by `name`.
///
/// Used for the identicon link on the home page; the same name always maps
/// to the same digest for a given salt.
pub fn name_digest(salt: &str, name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(name.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            name_digest("UNIQUE_SALT", "Alice"),
            "d5783b4ba6dfef114ee726664270429c7d1603f5ea49cff5c58d4d743b1c97c4"
        );
        assert_eq!(
            name_digest("UNIQUE_SALT", "Vadim Cucold"),
            "8d2979a72bf9831067f9e6dff0bbe8763931cb1460ba9487f0535c33d6787855"
        );
    }

    #[test]
    fn test_digest_is_deterministic_and_salted() {
        let first = name_digest("UNIQUE_SALT", "Bob");
        assert_eq!(first, name_digest("UNIQUE_SALT", "Bob"));
        assert_ne!(first, name_digest("UNIQUE_SALT", "Bobby"));
        assert_ne!(first, name_digest("OTHER_SALT", "Bob"));
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_empty_input_hashes_to_sha256_of_empty_string() {
        assert_eq!(
            name_digest("", ""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
