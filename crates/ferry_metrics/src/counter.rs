//! Named event counters

use std::collections::BTreeMap;

/// Event totals keyed by static names such as `"identity.hit"`.
#[derive(Debug, Default)]
pub struct Counter {
    totals: BTreeMap<&'static str, usize>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &'static str, amount: usize) {
        if amount == 0 {
            return;
        }
        *self.totals.entry(name).or_default() += amount;
    }

    pub fn get(&self, name: &str) -> usize {
        self.totals.get(name).copied().unwrap_or_default()
    }

    /// Non-zero totals ordered by name.
    pub fn snapshot(&self) -> Vec<(&'static str, usize)> {
        self.totals.iter().map(|(name, total)| (*name, *total)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_accumulate_per_name() {
        let mut counter = Counter::new();
        counter.add("identity.miss", 1);
        counter.add("identity.miss", 2);
        counter.add("identity.hit", 1);
        counter.add("identity.swept", 0);

        assert_eq!(counter.get("identity.miss"), 3);
        assert_eq!(counter.get("unknown"), 0);
        assert_eq!(
            counter.snapshot(),
            vec![("identity.hit", 1), ("identity.miss", 3)]
        );
    }
}
