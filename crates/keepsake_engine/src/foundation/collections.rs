//! Specialized collection types
//!
//! Every long-lived object in a presentation is addressed through a slot-map
//! key. Keys are lookup-only: once the owning map drops an entry, the key
//! simply resolves to nothing, which is how stale hover/focus references are
//! neutralised after a gallery teardown.

pub use slotmap::{Key, SlotMap, SecondaryMap};

/// Handle-based map using slot map for stable references
pub type HandleMap<K, T> = SlotMap<K, T>;

slotmap::new_key_type! {
    /// Node in a retained scene graph
    pub struct NodeId;

    /// Interactive gallery item
    pub struct ItemKey;

    /// GPU geometry allocation
    pub struct GeometryHandle;

    /// GPU material allocation
    pub struct MaterialHandle;

    /// GPU texture allocation
    pub struct TextureHandle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_key_resolves_to_nothing() {
        let mut map: HandleMap<ItemKey, u32> = HandleMap::with_key();
        let key = map.insert(7);
        assert_eq!(map.get(key), Some(&7));

        map.remove(key);
        assert!(map.get(key).is_none());

        // A reused slot never revives the old key
        let fresh = map.insert(8);
        assert_ne!(fresh, key);
        assert!(map.get(key).is_none());
    }
}
