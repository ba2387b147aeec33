//! Trigram string similarity.
//!
//! Reproduces the semantics of Postgres `pg_trgm`'s `similarity()`, which
//! the production fuzzy-name rule is calibrated against: the string is
//! lowercased, split on non-alphanumerics, each word padded with two leading
//! and one trailing space, and the similarity is the Jaccard ratio of the
//! two trigram sets.

use std::collections::HashSet;

fn trigrams(s: &str) -> HashSet<[char; 3]> {
    let mut set = HashSet::new();
    for word in s
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let padded: Vec<char> = std::iter::repeat(' ')
            .take(2)
            .chain(word.chars())
            .chain(std::iter::once(' '))
            .collect();
        for w in padded.windows(3) {
            set.insert([w[0], w[1], w[2]]);
        }
    }
    set
}

/// Similarity of two strings in 0.0..=1.0.
pub fn trigram_similarity(a: &str, b: &str) -> f64 {
    let ta = trigrams(a);
    let tb = trigrams(b);
    if ta.is_empty() && tb.is_empty() {
        return 0.0;
    }
    let shared = ta.intersection(&tb).count();
    let union = ta.len() + tb.len() - shared;
    if union == 0 {
        0.0
    } else {
        shared as f64 / union as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_are_1() {
        assert_eq!(trigram_similarity("Maria Lopez", "maria lopez"), 1.0);
    }

    #[test]
    fn disjoint_strings_are_0() {
        assert_eq!(trigram_similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn near_duplicate_clears_production_cutoff() {
        // One trailing character difference must still read as the same person.
        assert!(trigram_similarity("Juan Hernandez", "Juan Hernandes") > 0.7);
    }

    #[test]
    fn unrelated_names_stay_below_cutoff() {
        assert!(trigram_similarity("Juan Hernandez", "Sofia Ramirez") < 0.7);
    }

    #[test]
    fn empty_input_is_0() {
        assert_eq!(trigram_similarity("", "anything"), 0.0);
    }
}
