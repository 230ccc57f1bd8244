use std::fmt;

use thiserror::Error;

use crate::model::{Catalog, CommandRecord, Platform};

pub const MAX_POSITIONS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordRef {
    pub platform: Platform,
    pub position: usize,
}

impl RecordRef {
    pub fn new(platform: Platform, position: usize) -> Self {
        Self { platform, position }
    }

    pub fn resolve(self, catalog: &Catalog) -> Option<&CommandRecord> {
        catalog.get(self.platform, self.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FavoriteKey(pub u32);

impl fmt::Display for FavoriteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("{platform} position {position} does not fit in a favorite key (positions must stay below 1000)")]
    PositionOverflow { platform: Platform, position: usize },
    #[error("favorite key {0} is outside every platform range")]
    OutOfRange(FavoriteKey),
}

fn base(platform: Platform) -> u32 {
    match platform {
        Platform::Linux => 0,
        Platform::Windows => 1000,
        Platform::MacOS => 2000,
    }
}

pub fn encode(reference: RecordRef) -> Result<FavoriteKey, KeyError> {
    if reference.position >= MAX_POSITIONS {
        return Err(KeyError::PositionOverflow {
            platform: reference.platform,
            position: reference.position,
        });
    }
    Ok(FavoriteKey(base(reference.platform) + reference.position as u32))
}

pub fn decode(key: FavoriteKey) -> Result<RecordRef, KeyError> {
    let platform = match key.0 {
        0..=999 => Platform::Linux,
        1000..=1999 => Platform::Windows,
        2000..=2999 => Platform::MacOS,
        _ => return Err(KeyError::OutOfRange(key)),
    };
    Ok(RecordRef::new(platform, (key.0 - base(platform)) as usize))
}

#[derive(Debug, Clone, Default)]
pub struct FavoritesIndex {
    entries: Vec<RecordRef>,
}

impl FavoritesIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, reference: RecordRef) -> bool {
        if self.contains(reference) {
            return false;
        }
        self.entries.push(reference);
        true
    }

    pub fn remove(&mut self, reference: RecordRef) -> bool {
        let Some(index) = self.entries.iter().position(|entry| *entry == reference) else {
            return false;
        };
        self.entries.remove(index);
        true
    }

    /// Adds on absence, removes on presence. Returns whether the reference is a favorite afterwards.
    pub fn toggle(&mut self, reference: RecordRef) -> bool {
        if self.remove(reference) {
            false
        } else {
            self.add(reference)
        }
    }

    pub fn contains(&self, reference: RecordRef) -> bool {
        self.entries.contains(&reference)
    }

    /// Adds a flat key. Keys outside every platform range are rejected; keys past the end
    /// of their table are accepted and later skipped by [`FavoritesIndex::resolved_view`].
    pub fn add_key(&mut self, key: FavoriteKey) -> Result<bool, KeyError> {
        Ok(self.add(decode(key)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = FavoriteKey> + '_ {
        self.entries.iter().filter_map(|entry| encode(*entry).ok())
    }

    /// Favorites resolved against the catalog. Entries whose position is past the end of
    /// their platform table are skipped.
    pub fn resolved_view<'c>(
        &self,
        catalog: &'c Catalog,
    ) -> impl Iterator<Item = (RecordRef, &'c CommandRecord)> {
        self.entries
            .iter()
            .filter_map(move |entry| entry.resolve(catalog).map(|record| (*entry, record)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trips_catalog_positions() {
        let catalog = Catalog::builtin().unwrap();
        for platform in Platform::ALL {
            for position in 0..catalog.records_for(platform).len() {
                let reference = RecordRef::new(platform, position);
                assert_eq!(decode(encode(reference).unwrap()).unwrap(), reference);
            }
        }
    }

    #[test]
    fn encodes_with_platform_offsets() {
        assert_eq!(encode(RecordRef::new(Platform::Linux, 3)), Ok(FavoriteKey(3)));
        assert_eq!(
            encode(RecordRef::new(Platform::Windows, 1)),
            Ok(FavoriteKey(1001))
        );
        assert_eq!(
            encode(RecordRef::new(Platform::MacOS, 0)),
            Ok(FavoriteKey(2000))
        );
    }

    #[test]
    fn macos_keys_decode_to_macos() {
        assert_eq!(
            decode(FavoriteKey(2004)),
            Ok(RecordRef::new(Platform::MacOS, 4))
        );
        assert_eq!(
            decode(FavoriteKey(1999)),
            Ok(RecordRef::new(Platform::Windows, 999))
        );
    }

    #[test]
    fn rejects_positions_that_would_collide() {
        let err = encode(RecordRef::new(Platform::Linux, 1000)).unwrap_err();
        assert!(matches!(
            err,
            KeyError::PositionOverflow {
                platform: Platform::Linux,
                position: 1000
            }
        ));
        assert_eq!(
            decode(FavoriteKey(3000)),
            Err(KeyError::OutOfRange(FavoriteKey(3000)))
        );
    }

    #[test]
    fn add_key_rejects_keys_outside_every_range() {
        let mut index = FavoritesIndex::new();
        assert_eq!(index.add_key(FavoriteKey(2999)), Ok(true));
        assert_eq!(index.add_key(FavoriteKey(2999)), Ok(false));
        assert!(index.add_key(FavoriteKey(4000)).is_err());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn add_is_idempotent_and_remove_of_absent_is_noop() {
        let mut index = FavoritesIndex::new();
        let ssh = RecordRef::new(Platform::Linux, 3);

        assert!(index.add(ssh));
        assert!(!index.add(ssh));
        assert_eq!(index.len(), 1);
        assert!(index.contains(ssh));

        assert!(!index.remove(RecordRef::new(Platform::MacOS, 2)));
        assert_eq!(index.len(), 1);

        assert!(index.remove(ssh));
        assert!(!index.contains(ssh));
        assert!(index.is_empty());
    }

    #[test]
    fn remove_keeps_relative_order() {
        let mut index = FavoritesIndex::new();
        for key in [5, 1001, 2003, 0] {
            index.add_key(FavoriteKey(key)).unwrap();
        }
        index.remove(RecordRef::new(Platform::MacOS, 3));
        let keys: Vec<u32> = index.keys().map(|key| key.0).collect();
        assert_eq!(keys, vec![5, 1001, 0]);
    }

    #[test]
    fn toggle_flips_membership() {
        let mut index = FavoritesIndex::new();
        let brew = RecordRef::new(Platform::MacOS, 1);
        assert!(index.toggle(brew));
        assert_eq!(index.keys().collect::<Vec<_>>(), vec![FavoriteKey(2001)]);
        assert!(!index.toggle(brew));
        assert_eq!(index.keys().count(), 0);
    }

    #[test]
    fn resolved_view_skips_out_of_range_entries() {
        let catalog = Catalog::builtin().unwrap();
        let mut index = FavoritesIndex::new();
        index.add(RecordRef::new(Platform::Windows, 1));
        index.add(RecordRef::new(Platform::Linux, 50));
        index.add(RecordRef::new(Platform::MacOS, 1));

        let names: Vec<&str> = index
            .resolved_view(&catalog)
            .map(|(_, record)| record.name.as_str())
            .collect();
        assert_eq!(names, vec!["ipconfig", "brew"]);
        assert!(names.len() < index.len());
    }

    #[test]
    fn resolved_view_matches_len_when_all_in_range() {
        let catalog = Catalog::builtin().unwrap();
        let mut index = FavoritesIndex::new();
        index.add(RecordRef::new(Platform::Linux, 0));
        index.add(RecordRef::new(Platform::MacOS, 6));
        assert_eq!(index.resolved_view(&catalog).count(), index.len());
    }
}
