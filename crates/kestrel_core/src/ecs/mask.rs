// mask.rs - Per-entity component bitmasks
//
// One bit per `ComponentTypeId`. The first 128 component types fit inline;
// beyond that the mask spills to the heap and keeps growing, so a long
// running process can register any number of types.

use crate::ecs::{ComponentTypeId, EntityId};
use smallvec::SmallVec;
use std::collections::HashMap;

const WORD_BITS: usize = u64::BITS as usize;

/// Growable bitset keyed by `ComponentTypeId`.
#[derive(Debug, Clone, Default)]
pub struct ComponentMask {
    words: SmallVec<[u64; 2]>,
}

impl ComponentMask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mask with exactly the given bits set.
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = ComponentTypeId>,
    {
        let mut mask = Self::new();
        for id in ids {
            mask.insert(id);
        }
        mask
    }

    #[inline]
    pub fn insert(&mut self, id: ComponentTypeId) {
        let (word, bit) = split(id);
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1 << bit;
    }

    #[inline]
    pub fn remove(&mut self, id: ComponentTypeId) {
        let (word, bit) = split(id);
        if let Some(w) = self.words.get_mut(word) {
            *w &= !(1 << bit);
        }
    }

    #[inline]
    pub fn contains(&self, id: ComponentTypeId) -> bool {
        let (word, bit) = split(id);
        self.words.get(word).map_or(false, |w| w & (1 << bit) != 0)
    }

    /// True iff every bit of `other` is also set here.
    pub fn contains_all(&self, other: &ComponentMask) -> bool {
        other.words.iter().enumerate().all(|(i, &theirs)| {
            let ours = self.words.get(i).copied().unwrap_or(0);
            ours & theirs == theirs
        })
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Number of set bits.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Set bits in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            (0..WORD_BITS)
                .filter(move |bit| word & (1 << bit) != 0)
                .map(move |bit| ComponentTypeId::new((i * WORD_BITS + bit) as u32))
        })
    }
}

impl PartialEq for ComponentMask {
    // Trailing zero words don't change which bits are set.
    fn eq(&self, other: &Self) -> bool {
        self.contains_all(other) && other.contains_all(self)
    }
}

impl Eq for ComponentMask {}

#[inline]
fn split(id: ComponentTypeId) -> (usize, usize) {
    (id.index() / WORD_BITS, id.index() % WORD_BITS)
}

/// Masks for every entity that currently holds at least one component.
///
/// Entities whose mask drops to zero are removed from the table, and an
/// entity the table has never seen reads as an empty mask.
#[derive(Debug, Default)]
pub struct MaskTable {
    masks: HashMap<EntityId, ComponentMask>,
}

impl MaskTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bit(&mut self, entity: EntityId, id: ComponentTypeId) {
        self.masks.entry(entity).or_default().insert(id);
    }

    pub fn clear_bit(&mut self, entity: EntityId, id: ComponentTypeId) {
        if let Some(mask) = self.masks.get_mut(&entity) {
            mask.remove(id);
            if mask.is_empty() {
                self.masks.remove(&entity);
            }
        }
    }

    #[inline]
    pub fn has(&self, entity: EntityId, id: ComponentTypeId) -> bool {
        self.masks.get(&entity).map_or(false, |mask| mask.contains(id))
    }

    /// True iff every id in `ids` is set for `entity`. An empty list is
    /// trivially satisfied.
    pub fn has_all(&self, entity: EntityId, ids: &[ComponentTypeId]) -> bool {
        match self.masks.get(&entity) {
            Some(mask) => ids.iter().all(|&id| mask.contains(id)),
            None => ids.is_empty(),
        }
    }

    /// Copy of the mask of `entity`; empty when the entity holds nothing.
    pub fn mask(&self, entity: EntityId) -> ComponentMask {
        self.masks.get(&entity).cloned().unwrap_or_default()
    }

    /// Drop the entry for `entity`, returning its mask.
    pub fn take(&mut self, entity: EntityId) -> ComponentMask {
        self.masks.remove(&entity).unwrap_or_default()
    }

    /// Number of entities with a non-empty mask.
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: u32) -> ComponentTypeId {
        ComponentTypeId::new(i)
    }

    fn e(raw: u64) -> EntityId {
        EntityId::from_raw(raw)
    }

    #[test]
    fn insert_remove_contains() {
        let mut bits = ComponentMask::new();
        assert!(!bits.contains(id(5)));

        bits.insert(id(5));
        bits.insert(id(9));
        assert!(bits.contains(id(5)));
        assert!(bits.contains(id(9)));
        assert!(!bits.contains(id(12)));

        bits.insert(id(5));
        assert_eq!(bits.count(), 2);

        bits.remove(id(5));
        assert!(!bits.contains(id(5)));
        assert!(bits.contains(id(9)));

        bits.remove(id(9));
        assert!(bits.is_empty());
    }

    #[test]
    fn grows_past_inline_words() {
        let mut bits = ComponentMask::new();
        bits.insert(id(3));
        bits.insert(id(300));
        assert!(bits.contains(id(300)));
        assert!(!bits.contains(id(299)));
        assert_eq!(bits.iter().collect::<Vec<_>>(), vec![id(3), id(300)]);

        // Removing a bit far past the stored words is a no-op.
        bits.remove(id(5000));
        assert_eq!(bits.count(), 2);
    }

    #[test]
    fn superset_check() {
        let entity = ComponentMask::from_ids([id(1), id(3), id(70)]);
        assert!(entity.contains_all(&ComponentMask::from_ids([id(1), id(70)])));
        assert!(!entity.contains_all(&ComponentMask::from_ids([id(1), id(2)])));
        assert!(!entity.contains_all(&ComponentMask::from_ids([id(200)])));
        assert!(entity.contains_all(&ComponentMask::new()));
    }

    #[test]
    fn equality_ignores_trailing_words() {
        let mut a = ComponentMask::from_ids([id(1), id(200)]);
        a.remove(id(200));
        assert_eq!(a, ComponentMask::from_ids([id(1)]));
    }

    #[test]
    fn table_tracks_bits_and_cleans_up() {
        let mut table = MaskTable::new();
        table.set_bit(e(1), id(0));
        table.set_bit(e(1), id(2));
        assert!(table.has_all(e(1), &[id(0), id(2)]));
        assert!(!table.has_all(e(1), &[id(0), id(1)]));
        assert_eq!(table.len(), 1);

        table.clear_bit(e(1), id(0));
        assert!(table.has(e(1), id(2)));
        table.clear_bit(e(1), id(2));
        assert!(table.is_empty());
    }

    #[test]
    fn unknown_entity_reads_as_empty() {
        let table = MaskTable::new();
        assert!(table.mask(e(99)).is_empty());
        assert!(!table.has(e(99), id(0)));
        assert!(!table.has_all(e(99), &[id(0)]));
        assert!(table.has_all(e(99), &[]));
    }

    #[test]
    fn clear_on_unknown_entity_is_noop() {
        let mut table = MaskTable::new();
        table.clear_bit(e(4), id(1));
        assert!(table.is_empty());
    }
}
