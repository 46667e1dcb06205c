//! Text generation for string leaves.
//!
//! The faker never invents words itself; it asks a [`TextGenerator`] for
//! them. [`FakeText`] is the default, backed by the `fake` crate.

use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::{Sentence, Word};
use fake::faker::name::en::Name;
use rand::{Rng, RngCore};
use uuid::{Builder, Uuid};

/// Source of human-readable text for generated values.
pub trait TextGenerator {
    /// A short token, used for plain strings and additional property keys.
    fn token(&self, rng: &mut dyn RngCore) -> String;

    /// A free-text sentence, used for `text/plain` bodies.
    fn sentence(&self, rng: &mut dyn RngCore) -> String;

    /// A value for a JSON Schema string `format`, or `None` when the format
    /// is not recognised.
    fn formatted(&self, rng: &mut dyn RngCore, format: &str) -> Option<String> {
        let _ = (rng, format);
        None
    }
}

/// Default [`TextGenerator`] producing names, lorem sentences and
/// format-shaped strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeText;

impl TextGenerator for FakeText {
    fn token(&self, rng: &mut dyn RngCore) -> String {
        Name().fake_with_rng(rng)
    }

    fn sentence(&self, rng: &mut dyn RngCore) -> String {
        Sentence(3..10).fake_with_rng(rng)
    }

    fn formatted(&self, rng: &mut dyn RngCore, format: &str) -> Option<String> {
        let value = match format {
            "date-time" => gen_datetime(rng),
            "date" => gen_date(rng),
            "time" => gen_time(rng),
            "email" => SafeEmail().fake_with_rng(rng),
            "uuid" => gen_uuid(rng),
            "uri" | "url" => gen_url(rng),
            "hostname" => gen_hostname(rng),
            "ipv4" => gen_ipv4(rng),
            "ipv6" => gen_ipv6(rng),
            _ => return None,
        };
        Some(value)
    }
}

// =============================================================================
// Format-based Generation
// =============================================================================

fn gen_datetime(rng: &mut dyn RngCore) -> String {
    format!(
        "{}T{}.{:03}Z",
        gen_date(rng),
        gen_time(rng),
        rng.random_range(0..=999),
    )
}

fn gen_date(rng: &mut dyn RngCore) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        rng.random_range(2020..=2026),
        rng.random_range(1..=12),
        rng.random_range(1..=28),
    )
}

fn gen_time(rng: &mut dyn RngCore) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        rng.random_range(0..=23),
        rng.random_range(0..=59),
        rng.random_range(0..=59),
    )
}

fn gen_uuid(rng: &mut dyn RngCore) -> String {
    Builder::from_random_bytes(rng.random()).into_uuid().to_string()
}

fn gen_url(rng: &mut dyn RngCore) -> String {
    format!(
        "https://example.com/{}",
        Word().fake_with_rng::<String, _>(rng)
    )
}

fn gen_hostname(rng: &mut dyn RngCore) -> String {
    format!("{}.example.com", Word().fake_with_rng::<String, _>(rng))
}

fn gen_ipv4(rng: &mut dyn RngCore) -> String {
    format!(
        "{}.{}.{}.{}",
        rng.random_range(1..255),
        rng.random_range(0..255),
        rng.random_range(0..255),
        rng.random_range(1..255),
    )
}

fn gen_ipv6(rng: &mut dyn RngCore) -> String {
    (0..8)
        .map(|_| format!("{:x}", rng.random_range(0..65535u16)))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn token_is_not_empty() {
        assert!(!FakeText.token(&mut rng()).is_empty());
    }

    #[test]
    fn sentence_has_several_words() {
        let sentence = FakeText.sentence(&mut rng());
        assert!(sentence.split_whitespace().count() >= 3);
    }

    #[test]
    fn datetime_shape() {
        let value = FakeText.formatted(&mut rng(), "date-time").unwrap();
        assert!(value.contains('T') && value.ends_with('Z'));
        assert_eq!(value.len(), "2024-01-01T00:00:00.000Z".len());
    }

    #[test]
    fn email_contains_at() {
        let value = FakeText.formatted(&mut rng(), "email").unwrap();
        assert!(value.contains('@'));
    }

    #[test]
    fn uuid_parses() {
        let value = FakeText.formatted(&mut rng(), "uuid").unwrap();
        assert_eq!(Uuid::parse_str(&value).unwrap().get_version_num(), 4);
    }

    #[test]
    fn ipv4_has_four_octets() {
        let value = FakeText.formatted(&mut rng(), "ipv4").unwrap();
        assert_eq!(value.split('.').count(), 4);
        assert!(value.parse::<std::net::Ipv4Addr>().is_ok());
    }

    #[test]
    fn ipv6_parses() {
        let value = FakeText.formatted(&mut rng(), "ipv6").unwrap();
        assert!(value.parse::<std::net::Ipv6Addr>().is_ok());
    }

    #[test]
    fn unknown_format_is_none() {
        assert!(FakeText.formatted(&mut rng(), "binary").is_none());
    }
}
