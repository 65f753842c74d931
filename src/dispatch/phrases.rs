//! dispatch::phrases
//!
//! Acknowledgment phrases for broadcast commands.
//!
//! When a broadcast command succeeds, the real output goes to the channel
//! and the caller gets a short acknowledgment drawn from a fixed phrase
//! list. Selection is random for variety, behind the [`AckSource`] trait so
//! tests can substitute a deterministic source.

use rand::seq::IndexedRandom;

/// The fixed acknowledgment phrase list. Never empty.
pub const ACK_PHRASES: &[&str] = &[
    "No time for play.",
    "Me not that kind of orc!",
    "Okie dokie.",
    "Work, work.",
    "Why you poking me again?",
    "Froedrick!",
    "I've got no body, nobody's got me. Hachachacha.",
];

/// Source of acknowledgment phrases.
pub trait AckSource: Send + Sync {
    /// Pick a phrase from [`ACK_PHRASES`].
    fn ack(&self) -> &'static str;
}

/// Uniform random selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomAck;

impl AckSource for RandomAck {
    fn ack(&self) -> &'static str {
        let mut rng = rand::rng();
        // The list is a non-empty constant, so choose always succeeds.
        ACK_PHRASES.choose(&mut rng).copied().unwrap_or(ACK_PHRASES[0])
    }
}

/// Fixed selection by index, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedAck(pub usize);

impl AckSource for FixedAck {
    fn ack(&self) -> &'static str {
        ACK_PHRASES[self.0 % ACK_PHRASES.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrase_list_is_non_empty() {
        assert!(!ACK_PHRASES.is_empty());
        assert!(ACK_PHRASES.iter().all(|p| !p.is_empty()));
    }

    #[test]
    fn random_ack_stays_in_the_list() {
        let source = RandomAck;
        for _ in 0..100 {
            assert!(ACK_PHRASES.contains(&source.ack()));
        }
    }

    #[test]
    fn fixed_ack_is_deterministic() {
        assert_eq!(FixedAck(0).ack(), ACK_PHRASES[0]);
        assert_eq!(FixedAck(2).ack(), ACK_PHRASES[2]);
        // Wraps rather than panicking.
        assert_eq!(FixedAck(ACK_PHRASES.len()).ack(), ACK_PHRASES[0]);
    }
}
