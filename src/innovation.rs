//! Run-scoped ledger of structural mutations.
//!
//! Two genomes growing the same edge get the same innovation id only if they also carried the
//! same set of genes when they grew it. The endpoints alone are not enough, since node ids are
//! genome-local and two unrelated `add_node` calls can hand out the same hidden id.

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnovationRecord {
    pub from: usize,
    pub to: usize,
    pub inno: usize,
    /// Sorted innovation ids of the genome that first produced this edge
    pub signature: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct InnovationRegistry {
    head: usize,
    records: Vec<InnovationRecord>,
    index: FxHashMap<(usize, usize), Vec<usize>>,
}

impl InnovationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The innovation id of edge `from -> to` in a genome whose genes carry `signature`.
    /// `signature` need not be sorted or deduplicated.
    pub fn lookup_or_create(&mut self, from: usize, to: usize, signature: &[usize]) -> usize {
        let mut signature = signature.to_vec();
        signature.sort_unstable();
        signature.dedup();

        let seen = self.index.entry((from, to)).or_default();
        if let Some(inno) = seen
            .iter()
            .map(|&idx| &self.records[idx])
            .find(|record| record.signature == signature)
            .map(|record| record.inno)
        {
            return inno;
        }

        let inno = self.head;
        self.head += 1;
        seen.push(self.records.len());
        self.records.push(InnovationRecord {
            from,
            to,
            inno,
            signature,
        });
        inno
    }

    /// The next id this registry would hand out
    #[inline]
    pub fn head(&self) -> usize {
        self.head
    }

    #[inline]
    pub fn records(&self) -> &[InnovationRecord] {
        &self.records
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lookup_stable() {
        let mut registry = InnovationRegistry::new();
        assert_eq!(registry.lookup_or_create(0, 2, &[]), 0);
        assert_eq!(registry.lookup_or_create(1, 2, &[]), 1);
        assert_eq!(registry.lookup_or_create(0, 2, &[]), 0);
        assert_eq!(registry.head(), 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_signature_disambiguates() {
        let mut registry = InnovationRegistry::new();
        let a = registry.lookup_or_create(0, 4, &[0, 1]);
        let b = registry.lookup_or_create(0, 4, &[0, 1, 2]);
        assert_ne!(a, b);
        assert_eq!(registry.lookup_or_create(0, 4, &[1, 0]), a);
        assert_eq!(registry.lookup_or_create(0, 4, &[2, 1, 0, 1]), b);
        assert_ne!(registry.lookup_or_create(4, 0, &[0, 1]), a);
    }

    #[test]
    fn test_records() {
        let mut registry = InnovationRegistry::new();
        registry.lookup_or_create(3, 5, &[7, 2]);
        assert_eq!(
            registry.records(),
            &[InnovationRecord {
                from: 3,
                to: 5,
                inno: 0,
                signature: vec![2, 7],
            }]
        );
    }
}
