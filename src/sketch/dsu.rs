//! Exact union-find over interned node ids.
//!
//! Grows on first touch: `find` or `union` on an id past the end creates the
//! missing singletons. Path compression is iterative (walk to the root, then
//! repoint the walked path), so long chains never deepen the call stack.

use super::types::NodeId;

#[derive(Debug, Clone, Default)]
pub struct DisjointSets {
    parent: Vec<NodeId>,
    rank: Vec<u8>,
    components: usize,
}

impl DisjointSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    #[inline]
    pub fn contains(&self, x: NodeId) -> bool {
        (x as usize) < self.parent.len()
    }

    /// Disjoint components among tracked nodes.
    #[inline]
    pub fn component_count(&self) -> usize {
        self.components
    }

    fn ensure(&mut self, x: NodeId) {
        let need = x as usize + 1;
        if need > self.parent.len() {
            let start = self.parent.len() as NodeId;
            self.parent.extend(start..=x);
            self.rank.resize(need, 0);
            self.components += need - start as usize;
        }
    }

    pub fn find(&mut self, x: NodeId) -> NodeId {
        self.ensure(x);
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        let mut cur = x;
        while cur != root {
            let next = self.parent[cur as usize];
            self.parent[cur as usize] = root;
            cur = next;
        }
        root
    }

    /// Returns `true` if two components were merged.
    pub fn union(&mut self, x: NodeId, y: NodeId) -> bool {
        let rx = self.find(x);
        let ry = self.find(y);
        if rx == ry {
            return false;
        }
        let (kx, ky) = (self.rank[rx as usize], self.rank[ry as usize]);
        match kx.cmp(&ky) {
            std::cmp::Ordering::Less => self.parent[rx as usize] = ry,
            std::cmp::Ordering::Greater => self.parent[ry as usize] = rx,
            std::cmp::Ordering::Equal => {
                self.parent[ry as usize] = rx;
                self.rank[rx as usize] = kx.saturating_add(1);
            }
        }
        self.components -= 1;
        true
    }

    pub fn connected(&mut self, x: NodeId, y: NodeId) -> bool {
        self.find(x) == self.find(y)
    }
}
