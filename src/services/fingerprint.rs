//! Cache key fingerprints.
//!
//! A fingerprint is the hex SHA-256 of every resolution input that affects
//! the output: owner, prompt name, category, topic fields and idea content.
//! Each field is length-prefixed and optional parts carry a presence tag, so
//! no two distinct inputs share a byte stream.
//!
//! The template body is not part of the key. A prompt edited after it was
//! cached keeps resolving to the cached text until the cache is cleared.

use sha2::{Digest, Sha256};
use std::fmt;

use crate::models::{IdeaContext, PromptType, TopicContext};

/// Fixed-length cache key for one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the fingerprint of a resolution request.
    ///
    /// # Example
    ///
    /// ```rust
    /// use postforge::models::{PromptType, TopicContext};
    /// use postforge::services::Fingerprint;
    ///
    /// let topic = TopicContext::new("Rust", 3);
    /// let a = Fingerprint::compute("u1", "weekly", PromptType::Ideas, Some(&topic), None);
    /// let b = Fingerprint::compute("u2", "weekly", PromptType::Ideas, Some(&topic), None);
    /// assert_eq!(a.as_str().len(), 64);
    /// assert_ne!(a, b);
    /// ```
    #[must_use]
    pub fn compute(
        user_id: &str,
        prompt_name: &str,
        prompt_type: PromptType,
        topic: Option<&TopicContext>,
        idea: Option<&IdeaContext>,
    ) -> Self {
        let mut hasher = Sha256::new();
        write_field(&mut hasher, user_id.as_bytes());
        write_field(&mut hasher, prompt_name.as_bytes());
        write_field(&mut hasher, prompt_type.as_str().as_bytes());

        match topic {
            Some(topic) => {
                hasher.update([1u8]);
                write_field(&mut hasher, topic.name.as_bytes());
                hasher.update(topic.idea_count.to_le_bytes());
                hasher.update((topic.related_topics.len() as u64).to_le_bytes());
                for related in &topic.related_topics {
                    write_field(&mut hasher, related.as_bytes());
                }
            },
            None => hasher.update([0u8]),
        }

        match idea {
            Some(idea) => {
                hasher.update([1u8]);
                write_field(&mut hasher, idea.content.as_bytes());
            },
            None => hasher.update([0u8]),
        }

        Self(hex::encode(hasher.finalize()))
    }

    /// Returns the lowercase hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn write_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ideas(user: &str, topic: &TopicContext) -> Fingerprint {
        Fingerprint::compute(user, "weekly", PromptType::Ideas, Some(topic), None)
    }

    #[test]
    fn test_deterministic() {
        let topic = TopicContext::new("Rust", 3).with_related_topics(["Cargo"]);
        assert_eq!(ideas("u1", &topic), ideas("u1", &topic));
    }

    #[test]
    fn test_every_topic_field_discriminates() {
        let base = TopicContext::new("Rust", 3).with_related_topics(["Cargo"]);
        let variants = [
            TopicContext::new("Go", 3).with_related_topics(["Cargo"]),
            TopicContext::new("Rust", 4).with_related_topics(["Cargo"]),
            TopicContext::new("Rust", 3).with_related_topics(["Crates"]),
            TopicContext::new("Rust", 3),
        ];

        for variant in &variants {
            assert_ne!(ideas("u1", &base), ideas("u1", variant), "{variant:?}");
        }
    }

    #[test]
    fn test_field_boundaries_do_not_collide() {
        let a = TopicContext::new("Rust", 1).with_related_topics(["a, b"]);
        let b = TopicContext::new("Rust", 1).with_related_topics(["a", "b"]);
        assert_ne!(ideas("u1", &a), ideas("u1", &b));

        let x = Fingerprint::compute("u1", "ab", PromptType::Ideas, None, None);
        let y = Fingerprint::compute("u1a", "b", PromptType::Ideas, None, None);
        assert_ne!(x, y);
    }

    #[test]
    fn test_idea_and_category_discriminate() {
        let one = IdeaContext::new("one");
        let two = IdeaContext::new("two");
        let a = Fingerprint::compute("u1", "post", PromptType::Drafts, None, Some(&one));
        let b = Fingerprint::compute("u1", "post", PromptType::Drafts, None, Some(&two));
        let c = Fingerprint::compute("u1", "post", PromptType::Ideas, None, Some(&one));
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_absent_differs_from_empty() {
        let empty = IdeaContext::new("");
        let a = Fingerprint::compute("u1", "post", PromptType::Drafts, None, None);
        let b = Fingerprint::compute("u1", "post", PromptType::Drafts, None, Some(&empty));
        assert_ne!(a, b);
    }
}
