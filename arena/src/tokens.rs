use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;

/// Maps internal object ids to short random tokens for publishing.
///
/// Tokens are unique within a game and have no relation to the internal ids,
/// so clients can't tell which physical object is which across games.
#[derive(Clone, Debug, Default)]
pub struct ExternalIds {
    tokens: BTreeMap<String, String>,
    issued: BTreeSet<String>,
}

impl ExternalIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets all tokens and issues fresh ones for the given ids.
    pub fn regenerate<'a, R: Rng>(&mut self, ids: impl IntoIterator<Item = &'a str>, rng: &mut R) {
        self.tokens.clear();
        self.issued.clear();
        for id in ids {
            self.assign(id, rng);
        }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.tokens.get(id).map(String::as_str)
    }

    /// Returns the token for `id`, issuing one if it has none yet.
    pub fn assign<R: Rng>(&mut self, id: &str, rng: &mut R) -> &str {
        if !self.tokens.contains_key(id) {
            let token = loop {
                let candidate = format!("{:08x}", rng.gen::<u32>());
                if self.issued.insert(candidate.clone()) {
                    break candidate;
                }
            };
            self.tokens.insert(String::from(id), token);
        }
        &self.tokens[id]
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
