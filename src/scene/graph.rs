//! Node Graph with Generational Handles
//!
//! Level nodes live in an arena. Each node is addressed by a `NodeHandle`
//! made of a slot index and a generation:
//! - Each slot has a generation counter
//! - When a node is removed, its slot can be reused
//! - The generation increments on reuse, invalidating old handles
//!
//! A handle kept by the selection or a list widget therefore never aliases
//! a node that was created after the original was deleted.
//!
//! Every slot also records the node's parent and its ordered children, so
//! groups own their subtree and removal/duplication are tree operations
//! rather than list surgery. Child order and root order are insertion order,
//! which is the order nodes are written back to disk.

use super::property::EditError;

/// Identifies one node in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    /// Index into the slot array
    index: u32,
    /// Generation counter - increments when the slot is reused
    generation: u32,
}

impl NodeHandle {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Payloads stored in the graph say whether they may own children
pub trait GraphNode {
    fn accepts_children(&self) -> bool;
}

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    entry: Option<Entry<T>>,
}

/// Arena of nodes forming an ordered forest
#[derive(Debug, Clone)]
pub struct SceneGraph<T> {
    slots: Vec<Slot<T>>,
    /// Free slots available for reuse (LIFO)
    free_indices: Vec<u32>,
    /// Top-level nodes in order
    roots: Vec<NodeHandle>,
    /// Number of live nodes
    len: usize,
}

impl<T> Default for SceneGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SceneGraph<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_indices: Vec::new(),
            roots: Vec::new(),
            len: 0,
        }
    }

    fn entry(&self, handle: NodeHandle) -> Option<&Entry<T>> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    fn entry_mut(&mut self, handle: NodeHandle) -> Option<&mut Entry<T>> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    /// Is this handle still pointing at a live node?
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.entry(handle).is_some()
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        self.entry(handle).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut T> {
        self.entry_mut(handle).map(|e| &mut e.value)
    }

    /// Parent group, or `None` for root nodes and stale handles
    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.entry(handle).and_then(|e| e.parent)
    }

    /// Ordered children; empty for leaves and stale handles
    pub fn children(&self, handle: NodeHandle) -> &[NodeHandle] {
        self.entry(handle).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    /// Ordered top-level nodes
    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove every node. Existing handles become stale.
    pub fn clear(&mut self) {
        self.free_indices.clear();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.entry.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free_indices.push(i as u32);
        }
        self.roots.clear();
        self.len = 0;
    }

    /// Store a value without checking the parent
    fn alloc(&mut self, value: T, parent: Option<NodeHandle>) -> NodeHandle {
        let entry = Entry {
            value,
            parent,
            children: Vec::new(),
        };
        let handle = if let Some(index) = self.free_indices.pop() {
            // Generation was already incremented on free
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            NodeHandle {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                entry: Some(entry),
            });
            NodeHandle { index, generation: 0 }
        };
        self.len += 1;
        handle
    }

    /// Append a node to the root list
    pub fn push_root(&mut self, value: T) -> NodeHandle {
        let handle = self.alloc(value, None);
        self.roots.push(handle);
        handle
    }

    /// Handles of `handle` and all its descendants, depth-first pre-order
    pub fn subtree(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        if !self.contains(handle) {
            return out;
        }
        let mut stack = vec![handle];
        while let Some(h) = stack.pop() {
            out.push(h);
            // Push in reverse so the first child is visited first
            stack.extend(self.children(h).iter().rev().copied());
        }
        out
    }

    /// Whether `node` is `root` or one of its descendants
    pub fn is_in_subtree(&self, root: NodeHandle, node: NodeHandle) -> bool {
        let mut current = Some(node);
        while let Some(h) = current {
            if h == root {
                return self.contains(root);
            }
            current = self.parent(h);
        }
        false
    }

    /// Number of ancestors above a node (0 for roots)
    pub fn depth(&self, handle: NodeHandle) -> usize {
        let mut depth = 0;
        let mut current = self.parent(handle);
        while let Some(h) = current {
            depth += 1;
            current = self.parent(h);
        }
        depth
    }

    /// Every node with its depth, depth-first pre-order across all roots
    pub fn depth_first(&self) -> Vec<(NodeHandle, usize)> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<(NodeHandle, usize)> =
            self.roots.iter().rev().map(|&h| (h, 0)).collect();
        while let Some((h, depth)) = stack.pop() {
            out.push((h, depth));
            stack.extend(self.children(h).iter().rev().map(|&c| (c, depth + 1)));
        }
        out
    }

    /// First node (depth-first pre-order) matching the predicate
    pub fn find<F: Fn(&T) -> bool>(&self, predicate: F) -> Option<NodeHandle> {
        self.depth_first()
            .into_iter()
            .map(|(h, _)| h)
            .find(|&h| self.get(h).map(&predicate).unwrap_or(false))
    }

    /// Remove a node and its whole subtree.
    /// Returns the removed values in depth-first pre-order.
    pub fn remove(&mut self, handle: NodeHandle) -> Result<Vec<T>, EditError> {
        if !self.contains(handle) {
            return Err(EditError::StaleHandle);
        }

        // Detach from the owning list
        match self.parent(handle) {
            Some(parent) => {
                if let Some(p) = self.entry_mut(parent) {
                    p.children.retain(|&c| c != handle);
                }
            }
            None => self.roots.retain(|&r| r != handle),
        }

        let doomed = self.subtree(handle);
        let mut removed = Vec::with_capacity(doomed.len());
        for h in doomed {
            let slot = &mut self.slots[h.index as usize];
            if let Some(entry) = slot.entry.take() {
                // Increment generation to invalidate existing handles
                slot.generation = slot.generation.wrapping_add(1);
                self.free_indices.push(h.index);
                self.len -= 1;
                removed.push(entry.value);
            }
        }
        Ok(removed)
    }
}

impl<T: GraphNode> SceneGraph<T> {
    /// Add a node at the end of `parent`'s children (or of the root list)
    pub fn insert(&mut self, value: T, parent: Option<NodeHandle>) -> Result<NodeHandle, EditError> {
        if let Some(p) = parent {
            let owner = self.get(p).ok_or(EditError::StaleHandle)?;
            if !owner.accepts_children() {
                return Err(EditError::NotAGroup);
            }
        }
        let Some(p) = parent else {
            return Ok(self.push_root(value));
        };
        let handle = self.alloc(value, Some(p));
        if let Some(entry) = self.entry_mut(p) {
            entry.children.push(handle);
        }
        Ok(handle)
    }
}

impl<T: GraphNode + Clone> SceneGraph<T> {
    /// Deep-copy a subtree under `parent` (or at root level).
    /// The copy gets fresh handles and keeps the relative structure.
    pub fn clone_subtree(
        &mut self,
        handle: NodeHandle,
        parent: Option<NodeHandle>,
    ) -> Result<NodeHandle, EditError> {
        let value = self.get(handle).cloned().ok_or(EditError::StaleHandle)?;
        let children = self.children(handle).to_vec();
        let copy = self.insert(value, parent)?;
        for child in children {
            self.clone_subtree(child, Some(copy))?;
        }
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: &'static str,
        group: bool,
    }

    impl GraphNode for Item {
        fn accepts_children(&self) -> bool {
            self.group
        }
    }

    fn leaf(name: &'static str) -> Item {
        Item { name, group: false }
    }

    fn group(name: &'static str) -> Item {
        Item { name, group: true }
    }

    fn names(graph: &SceneGraph<Item>) -> Vec<(&'static str, usize)> {
        graph
            .depth_first()
            .into_iter()
            .map(|(h, d)| (graph.get(h).unwrap().name, d))
            .collect()
    }

    #[test]
    fn test_insert_and_order() {
        let mut g = SceneGraph::new();
        let a = g.insert(leaf("a"), None).unwrap();
        let grp = g.insert(group("g"), None).unwrap();
        let b = g.insert(leaf("b"), Some(grp)).unwrap();
        let c = g.insert(leaf("c"), Some(grp)).unwrap();

        assert_eq!(g.len(), 4);
        assert_eq!(g.roots(), &[a, grp]);
        assert_eq!(g.children(grp), &[b, c]);
        assert_eq!(g.parent(c), Some(grp));
        assert_eq!(g.depth(c), 1);
        assert_eq!(names(&g), vec![("a", 0), ("g", 0), ("b", 1), ("c", 1)]);
    }

    #[test]
    fn test_leaf_cannot_own_children() {
        let mut g = SceneGraph::new();
        let a = g.insert(leaf("a"), None).unwrap();
        assert_eq!(g.insert(leaf("b"), Some(a)), Err(EditError::NotAGroup));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_remove_subtree() {
        let mut g = SceneGraph::new();
        let grp = g.insert(group("g"), None).unwrap();
        let b = g.insert(leaf("b"), Some(grp)).unwrap();
        let inner = g.insert(group("inner"), Some(grp)).unwrap();
        g.insert(leaf("d"), Some(inner)).unwrap();
        let e = g.insert(leaf("e"), None).unwrap();

        let removed = g.remove(grp).unwrap();
        let removed: Vec<_> = removed.iter().map(|i| i.name).collect();
        assert_eq!(removed, vec!["g", "b", "inner", "d"]);
        assert_eq!(g.len(), 1);
        assert_eq!(g.roots(), &[e]);
        assert!(!g.contains(b));
    }

    #[test]
    fn test_remove_child_detaches_from_parent() {
        let mut g = SceneGraph::new();
        let grp = g.insert(group("g"), None).unwrap();
        let b = g.insert(leaf("b"), Some(grp)).unwrap();
        let c = g.insert(leaf("c"), Some(grp)).unwrap();
        g.remove(b).unwrap();
        assert_eq!(g.children(grp), &[c]);
    }

    #[test]
    fn test_generation_prevents_reuse_collision() {
        let mut g = SceneGraph::new();
        let a = g.insert(leaf("a"), None).unwrap();
        g.remove(a).unwrap();

        // Same slot, new generation
        let b = g.insert(leaf("b"), None).unwrap();
        assert_eq!(b.index(), a.index());
        assert_ne!(b.generation(), a.generation());

        assert!(g.get(a).is_none());
        assert_eq!(g.remove(a), Err(EditError::StaleHandle));
        assert_eq!(g.get(b).unwrap().name, "b");
    }

    #[test]
    fn test_clone_subtree_gets_fresh_handles() {
        let mut g = SceneGraph::new();
        let grp = g.insert(group("g"), None).unwrap();
        g.insert(leaf("b"), Some(grp)).unwrap();
        g.insert(leaf("c"), Some(grp)).unwrap();

        let copy = g.clone_subtree(grp, None).unwrap();
        assert_ne!(copy, grp);
        assert_eq!(g.len(), 6);
        assert_eq!(g.roots(), &[grp, copy]);
        let copied: Vec<_> = g.children(copy).iter().map(|&h| g.get(h).unwrap().name).collect();
        assert_eq!(copied, vec!["b", "c"]);
        assert!(g.children(copy).iter().all(|c| !g.children(grp).contains(c)));
    }

    #[test]
    fn test_find_is_depth_first() {
        let mut g = SceneGraph::new();
        let grp = g.insert(group("g"), None).unwrap();
        let nested = g.insert(leaf("x"), Some(grp)).unwrap();
        g.insert(leaf("x"), None).unwrap();
        assert_eq!(g.find(|i| i.name == "x"), Some(nested));
        assert_eq!(g.find(|i| i.name == "missing"), None);
    }

    #[test]
    fn test_is_in_subtree() {
        let mut g = SceneGraph::new();
        let grp = g.insert(group("g"), None).unwrap();
        let b = g.insert(leaf("b"), Some(grp)).unwrap();
        let other = g.insert(leaf("o"), None).unwrap();
        assert!(g.is_in_subtree(grp, b));
        assert!(g.is_in_subtree(b, b));
        assert!(!g.is_in_subtree(grp, other));
    }

    #[test]
    fn test_clear_invalidates_handles() {
        let mut g = SceneGraph::new();
        let a = g.insert(leaf("a"), None).unwrap();
        g.clear();
        assert!(g.is_empty());
        assert!(!g.contains(a));
        let b = g.insert(leaf("b"), None).unwrap();
        assert!(g.contains(b));
        assert!(!g.contains(a));
    }
}
