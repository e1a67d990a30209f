use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use super::{DELETE, ENTRY_LABEL, INIT, NEW, PRINT};

pub const LABEL_LEN: usize = 10;

/// Names of the external routines and the entry label; never issued.
pub const RESERVED_LABELS: [&str; 5] = [PRINT, INIT, NEW, DELETE, ENTRY_LABEL];

/// Proposes label candidates. Candidates may repeat; `Labels` filters them.
pub trait LabelSource {
    fn candidate(&mut self) -> String;
}

/// Random lowercase labels of `LABEL_LEN` letters.
pub struct RandomLabels {
    rng: StdRng,
}

impl RandomLabels {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomLabels {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelSource for RandomLabels {
    fn candidate(&mut self) -> String {
        (0..LABEL_LEN)
            .map(|_| self.rng.gen_range(b'a'..=b'z') as char)
            .collect()
    }
}

/// `aaaaaaaaaa`, `aaaaaaaaab`, ... in order.
#[derive(Debug, Default)]
pub struct SequentialLabels {
    next: u64,
}

impl SequentialLabels {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LabelSource for SequentialLabels {
    fn candidate(&mut self) -> String {
        let mut n = self.next;
        self.next += 1;

        let mut letters = [b'a'; LABEL_LEN];
        for letter in letters.iter_mut().rev() {
            *letter = b'a' + (n % 26) as u8;
            n /= 26;
        }
        letters.iter().map(|&b| b as char).collect()
    }
}

/// Issues labels that are unique across the whole run.
pub struct Labels {
    source: Box<dyn LabelSource>,
    used: HashSet<String>,
}

impl Labels {
    pub fn new(source: impl LabelSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            used: RESERVED_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn fresh(&mut self) -> String {
        loop {
            let candidate = self.source.candidate();
            if self.used.insert(candidate.clone()) {
                trace!(label = %candidate, "issued label");
                return candidate;
            }
        }
    }

    /// Marks `name` as taken. Returns false when it already was.
    pub fn claim(&mut self, name: &str) -> bool {
        self.used.insert(name.to_string())
    }
}
