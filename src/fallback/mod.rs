//! Local fallback responder.
//!
//! Used only when the chat server cannot be reached and the failure policy
//! is `local-fallback`. The message is sorted into a [`Category`] by keyword
//! (first match wins, in declaration order) and a line is picked at random
//! from that category's fixed pool. Category selection is deterministic;
//! the line choice depends only on the supplied RNG.

use rand::Rng;

/// Reply category chosen from the user's message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Down,
    Anxiety,
    Feelings,
    Default,
}

/// Keyword sets in priority order.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Down, &["down", "sad", "depressed"]),
    (Category::Anxiety, &["anxiety", "anxious", "worried"]),
    (Category::Feelings, &["feeling", "feel"]),
];

const DOWN_POOL: &[&str] = &[
    "I hear that you're feeling down, and I want you to know that your feelings are valid. It takes courage to share what you're going through. Can you tell me more about what's contributing to these feelings?",
    "Feeling down can be really overwhelming. You're not alone in this, and reaching out shows incredible strength. What's one small thing that might help you feel a little better right now?",
    "I'm here with you in this difficult moment. Sometimes when we're feeling down, it helps to remember that feelings are temporary, even when they don't feel that way. What's been on your mind lately?",
];

const ANXIETY_POOL: &[&str] = &[
    "Anxiety can feel so overwhelming, and I want you to know that what you're experiencing is real and valid. Let's work through this together. What specific thoughts or situations are making you feel anxious right now?",
    "It sounds like anxiety is really affecting you today. That takes a lot of strength to acknowledge and share. Sometimes it helps to focus on your breathing - can you try taking three slow, deep breaths with me?",
    "Anxiety can make everything feel so much harder. You're doing great by reaching out. What's one thing that usually helps you feel a bit calmer when anxiety strikes?",
];

const FEELINGS_POOL: &[&str] = &[
    "I'm really glad you want to talk about your feelings. That's such an important step in taking care of yourself. What feelings are you experiencing right now?",
    "Sharing your feelings takes courage, and I'm honored that you trust me with them. Can you describe what you're feeling and what might have brought these feelings up?",
    "Your feelings matter, and I'm here to listen without judgment. What's going on inside that you'd like to talk about?",
];

const DEFAULT_POOL: &[&str] = &[
    "Thank you for sharing that with me. I'm here to listen and support you. Can you tell me more about what's on your mind?",
    "I hear you, and I want you to know that your feelings are important. What would be most helpful for you right now?",
    "Thank you for trusting me with your thoughts. I'm here to help you work through whatever you're experiencing. What's been weighing on you lately?",
];

impl Category {
    /// Fixed reply pool for this category. Never empty.
    pub fn pool(self) -> &'static [&'static str] {
        match self {
            Self::Down => DOWN_POOL,
            Self::Anxiety => ANXIETY_POOL,
            Self::Feelings => FEELINGS_POOL,
            Self::Default => DEFAULT_POOL,
        }
    }
}

/// Pick the reply category for a user message.
pub fn classify(message: &str) -> Category {
    let lower = message.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Default)
}

/// Uniformly pick one line from `category`'s pool.
pub fn pick<R: Rng + ?Sized>(category: Category, rng: &mut R) -> &'static str {
    let pool = category.pool();
    pool[rng.gen_range(0..pool.len())]
}

/// Classify `message` and pick a reply.
pub fn respond<R: Rng + ?Sized>(message: &str, rng: &mut R) -> &'static str {
    pick(classify(message), rng)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn classify_follows_priority_order() {
        assert_eq!(classify("I feel so anxious today"), Category::Anxiety);
        assert_eq!(classify("I feel down"), Category::Down);
        assert_eq!(classify("sad and worried"), Category::Down);
        assert_eq!(classify("I'm feeling strange"), Category::Feelings);
        assert_eq!(classify("hello"), Category::Default);
    }

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(classify("WORRIED about work"), Category::Anxiety);
        assert_eq!(classify("Depressed"), Category::Down);
    }

    #[test]
    fn pick_stays_within_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let line = pick(Category::Anxiety, &mut rng);
            assert!(ANXIETY_POOL.contains(&line));
        }
    }

    #[test]
    fn same_seed_same_line() {
        let a = respond("hello", &mut StdRng::seed_from_u64(42));
        let b = respond("hello", &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert!(DEFAULT_POOL.contains(&a));
    }

    #[test]
    fn every_pool_is_non_empty() {
        for category in [
            Category::Down,
            Category::Anxiety,
            Category::Feelings,
            Category::Default,
        ] {
            assert!(!category.pool().is_empty());
        }
    }
}
