//! Session-wide record of the images the visitor has looked at

use std::collections::BTreeSet;

/// Unique image identifiers focused at least once
///
/// Only ever grows. It lives outside the gallery bundle, so tearing the
/// gallery down and building it again keeps the visitor's progress.
#[derive(Debug, Clone, Default)]
pub struct ViewedSet {
    images: BTreeSet<String>,
    total: usize,
    revealed: bool,
}

impl ViewedSet {
    /// Empty set out of `total` unique images
    pub fn new(total: usize) -> Self {
        Self {
            images: BTreeSet::new(),
            total,
            revealed: false,
        }
    }

    /// Record an image; true if it was not seen before
    pub fn record(&mut self, image: &str) -> bool {
        if self.images.contains(image) {
            return false;
        }
        self.images.insert(image.to_string())
    }

    /// Whether an image was seen
    pub fn contains(&self, image: &str) -> bool {
        self.images.contains(image)
    }

    /// Number of unique images seen
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether nothing was seen yet
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Number of unique images there are to find
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether every image was found
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.images.len() >= self.total
    }

    /// Claim the one-shot "all found" reveal
    ///
    /// True exactly once, the first time it is called on a complete set.
    pub fn claim_reveal(&mut self) -> bool {
        if self.revealed || !self.is_complete() {
            return false;
        }
        self.revealed = true;
        true
    }

    /// Whether the reveal was claimed
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Give an unfired reveal back, e.g. when its timer was canceled
    pub fn release_reveal(&mut self) {
        self.revealed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_is_unique() {
        let mut viewed = ViewedSet::new(2);
        assert!(viewed.record("img1.jpg"));
        assert!(!viewed.record("img1.jpg"));
        assert_eq!(viewed.len(), 1);
        assert!(!viewed.is_complete());
    }

    #[test]
    fn test_reveal_is_claimed_once() {
        let mut viewed = ViewedSet::new(2);
        viewed.record("a");
        assert!(!viewed.claim_reveal());
        viewed.record("b");
        assert!(viewed.claim_reveal());
        viewed.record("b");
        assert!(!viewed.claim_reveal());
    }

    #[test]
    fn test_empty_total_never_completes() {
        let mut viewed = ViewedSet::new(0);
        assert!(!viewed.claim_reveal());
    }
}
