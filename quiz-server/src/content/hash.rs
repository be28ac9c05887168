//! Content change detection
//!
//! The content hash is a 32-bit signed polynomial rolling hash with base 31
//! over the UTF-8 bytes of the compact JSON serialization of the question
//! list:
//!
//! ```text
//! h = 0
//! for each byte b: h = h * 31 + b    (i32, wrapping on overflow)
//! ```
//!
//! Clients compare the value served at `/hash` against a cached copy, so
//! the arithmetic must stay bit-for-bit stable: two's complement wraparound,
//! never saturation or widening.

use std::io;

use quiz_common::db::Question;
use tracing::warn;

const BASE: i32 = 31;

/// Streaming form of the content hash
///
/// Implements [`io::Write`] so serializers can feed it directly without
/// materializing the serialized document.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentHasher {
    state: i32,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state = self.state.wrapping_mul(BASE).wrapping_add(i32::from(byte));
        }
    }

    pub fn finish(&self) -> i32 {
        self.state
    }
}

impl io::Write for ContentHasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Hash a byte string
pub fn hash_bytes(bytes: &[u8]) -> i32 {
    let mut hasher = ContentHasher::new();
    hasher.update(bytes);
    hasher.finish()
}

/// Hash the canonical serialization of `questions`
pub fn compute_hash(questions: &[Question]) -> i32 {
    let mut hasher = ContentHasher::new();
    // The hasher never fails to accept bytes and Question holds only plain fields
    if let Err(e) = serde_json::to_writer(&mut hasher, questions) {
        warn!("Failed to serialize questions for hashing: {}", e);
    }
    hasher.finish()
}

/// Whether `candidate` must replace the published hash
pub fn has_changed(previous: i32, candidate: i32) -> bool {
    previous != candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: i64, text: &str) -> Question {
        Question {
            id,
            difficulty: 1,
            question: text.to_string(),
            answer1: "Noah".to_string(),
            answer2: "Mose".to_string(),
            answer3: "David".to_string(),
            answer4: "Jona".to_string(),
            solution: 1,
            reference: None,
        }
    }

    #[test]
    fn known_values() {
        assert_eq!(hash_bytes(b""), 0);
        assert_eq!(hash_bytes(b"a"), 97);
        assert_eq!(hash_bytes(b"hello"), 99_162_322);
    }

    #[test]
    fn overflow_wraps_instead_of_saturating() {
        assert_eq!(hash_bytes(b"Hello World"), -862_545_276);
        // Wraps to exactly i32::MIN; saturating arithmetic would stick at a bound earlier
        assert_eq!(hash_bytes(b"polygenelubricants"), i32::MIN);
    }

    #[test]
    fn hashes_utf8_bytes_not_characters() {
        assert_eq!(hash_bytes("Grüß Gott".as_bytes()), -1_439_299_640);
    }

    #[test]
    fn streaming_matches_one_shot() {
        let mut hasher = ContentHasher::new();
        hasher.update(b"Hello ");
        hasher.update(b"World");
        assert_eq!(hasher.finish(), hash_bytes(b"Hello World"));
    }

    #[test]
    fn question_list_hash_is_hash_of_its_json() {
        assert_eq!(compute_hash(&[]), hash_bytes(b"[]"));

        let questions = vec![question(1, "Wer baute die Arche?"), question(2, "Wer teilte das Meer?")];
        let json = serde_json::to_string(&questions).unwrap();
        assert_eq!(compute_hash(&questions), hash_bytes(json.as_bytes()));
    }

    #[test]
    fn equal_content_gives_equal_hash() {
        let a = vec![question(1, "Wer baute die Arche?")];
        let b = vec![question(1, "Wer baute die Arche?")];
        assert_eq!(compute_hash(&a), compute_hash(&b));
        assert!(!has_changed(compute_hash(&a), compute_hash(&b)));
    }

    #[test]
    fn edited_or_reordered_content_changes_hash() {
        let base = vec![question(1, "Wer baute die Arche?"), question(2, "Wer teilte das Meer?")];
        let edited = vec![question(1, "Wer baute die Arche?"), question(2, "Wer teilte den Jordan?")];
        let reordered = vec![base[1].clone(), base[0].clone()];

        assert!(has_changed(compute_hash(&base), compute_hash(&edited)));
        assert!(has_changed(compute_hash(&base), compute_hash(&reordered)));
    }
}
