//! Session cache: every named image alive in the current run.

use std::collections::HashMap;

use crate::canvas::Image;
use crate::log_info;

/// Maps image names to images for the lifetime of one session.
///
/// Entries are never evicted. Writing to an existing name replaces the old
/// image; callers holding the old value keep an independent copy.
#[derive(Debug, Default)]
pub struct SessionCache {
    images: HashMap<String, Image>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Image> {
        self.images.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.images.contains_key(name)
    }

    /// Store `image` under `name`, returning the image it replaced.
    pub fn insert(&mut self, name: impl Into<String>, image: Image) -> Option<Image> {
        let name = name.into();
        let (w, h) = image.dimensions();
        let previous = self.images.insert(name.clone(), image);
        if previous.is_some() {
            log_info!("image '{}' overwritten ({}x{})", name, w, h);
        }
        previous
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Image names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.images.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_returns_previous_image() {
        let mut cache = SessionCache::new();
        assert!(cache.insert("a", Image::new(1, 1)).is_none());
        let old = cache.insert("a", Image::new(2, 2)).unwrap();
        assert_eq!(old.dimensions(), (1, 1));
        assert_eq!(cache.get("a").unwrap().dimensions(), (2, 2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn names_are_sorted() {
        let mut cache = SessionCache::new();
        cache.insert("zeta", Image::new(1, 1));
        cache.insert("alpha", Image::new(1, 1));
        assert_eq!(cache.names(), vec!["alpha", "zeta"]);
    }
}
