//! Homophone groups used by the match evaluator.
//!
//! Speech recognizers cannot tell "sight" from "site", so a learner reading
//! either aloud is accepted for the other.

use std::collections::HashMap;

use crate::matching::normalize;

/// Built-in homophone groups for early readers.
pub const BUILTIN_GROUPS: &[&[&str]] = &[
    &["sight", "site", "cite"],
    &["their", "there", "they're"],
    &["to", "too", "two"],
    &["for", "four", "fore"],
    &["one", "won"],
    &["eight", "ate"],
    &["no", "know"],
    &["new", "knew"],
    &["right", "write", "rite"],
    &["see", "sea"],
    &["son", "sun"],
    &["hear", "here"],
    &["where", "wear"],
    &["by", "buy", "bye"],
    &["be", "bee"],
    &["blue", "blew"],
    &["flower", "flour"],
    &["hour", "our"],
    &["its", "it's"],
    &["your", "you're"],
    &["whose", "who's"],
    &["red", "read"],
    &["road", "rode"],
    &["made", "maid"],
    &["meet", "meat"],
    &["night", "knight"],
    &["not", "knot"],
    &["pair", "pear", "pare"],
    &["peace", "piece"],
    &["plain", "plane"],
    &["rain", "reign", "rein"],
    &["sail", "sale"],
    &["tail", "tale"],
    &["weak", "week"],
    &["wait", "weight"],
    &["way", "weigh"],
    &["which", "witch"],
    &["wood", "would"],
    &["hole", "whole"],
    &["mail", "male"],
    &["bear", "bare"],
    &["deer", "dear"],
    &["break", "brake"],
    &["cell", "sell"],
    &["flew", "flu"],
    &["I", "eye"],
    &["in", "inn"],
    &["knows", "nose"],
    &["sew", "so", "sow"],
    &["some", "sum"],
    &["threw", "through"],
    &["toe", "tow"],
    &["wrap", "rap"],
];

/// Immutable lookup of homophone groups.
///
/// Entries are normalized the same way transcripts are, so lookups are
/// insensitive to case and to the stripped punctuation.
#[derive(Debug, Clone, Default)]
pub struct HomophoneTable {
    groups: HashMap<String, Vec<usize>>,
}

impl HomophoneTable {
    /// Table with the built-in groups.
    pub fn builtin() -> Self {
        Self::from_groups(BUILTIN_GROUPS.iter().map(|group| group.iter().copied()))
    }

    /// Build a table from groups of interchangeable words.
    pub fn from_groups<G, W>(groups: G) -> Self
    where
        G: IntoIterator<Item = W>,
        W: IntoIterator,
        W::Item: AsRef<str>,
    {
        let mut table: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, group) in groups.into_iter().enumerate() {
            for word in group {
                let key = normalize(word.as_ref());
                if key.is_empty() {
                    continue;
                }
                let ids = table.entry(key).or_default();
                if !ids.contains(&index) {
                    ids.push(index);
                }
            }
        }
        Self { groups: table }
    }

    /// Whether `a` and `b` sound alike. A word is always its own homophone.
    pub fn are_homophones(&self, a: &str, b: &str) -> bool {
        let a = normalize(a);
        let b = normalize(b);
        self.are_normalized_homophones(&a, &b)
    }

    /// Same as [`are_homophones`](Self::are_homophones) for already normalized input.
    pub(crate) fn are_normalized_homophones(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        match (self.groups.get(a), self.groups.get(b)) {
            (Some(left), Some(right)) => left.iter().any(|id| right.contains(id)),
            _ => false,
        }
    }

    /// Number of distinct words in the table.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
