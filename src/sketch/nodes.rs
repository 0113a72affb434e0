use ahash::AHashMap;

use super::types::NodeId;

/// Interns opaque node identifiers to dense ids. Entries are never removed.
#[derive(Debug)]
pub struct NodeTable {
    index: AHashMap<String, NodeId>,
    limit: usize,
}

impl Default for NodeTable {
    fn default() -> Self {
        Self {
            index: AHashMap::new(),
            // every id in 0..=NodeId::MAX
            limit: usize::try_from(NodeId::MAX).map_or(usize::MAX, |max| max.saturating_add(1)),
        }
    }
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// `None` once the id space is exhausted.
    pub fn intern(&mut self, name: &str) -> Option<NodeId> {
        if let Some(&id) = self.index.get(name) {
            return Some(id);
        }
        if self.index.len() >= self.limit {
            return None;
        }
        let id = NodeId::try_from(self.index.len()).ok()?;
        self.index.insert(name.to_owned(), id);
        Some(id)
    }

    /// Interns both endpoints, or neither if only one would fit.
    pub fn intern_pair(&mut self, source: &str, dest: &str) -> Option<(NodeId, NodeId)> {
        let fresh = usize::from(!self.index.contains_key(source))
            + usize::from(source != dest && !self.index.contains_key(dest));
        if self.index.len().saturating_add(fresh) > self.limit {
            return None;
        }
        Some((self.intern(source)?, self.intern(dest)?))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
