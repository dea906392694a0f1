//! Trait-based API over the link-cut tree tiers.

pub trait DynamicForest: Sized {
    type Key: Copy;

    fn len(&self) -> usize;
    #[inline(always)]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Link `u` and `v` if they are in different components.
    ///
    /// The merged tree keeps the root of `u`'s component. Returns `false` if
    /// the vertices are already connected.
    fn link(&mut self, u: usize, v: usize) -> bool;

    /// Cut edge `(u, v)` if it exists.
    ///
    /// The side keeping the old root keeps it; the far side is rooted at its
    /// detached endpoint. Returns `false` if there is no such edge.
    fn cut(&mut self, u: usize, v: usize) -> bool;

    /// Whether `u` and `v` are in one component. Does not move any root.
    fn connected(&mut self, u: usize, v: usize) -> bool;
}

/// Operations defined relative to each component's current root.
pub trait RootedForest: DynamicForest {
    /// Make `v` the root of its component.
    fn reroot(&mut self, v: usize);

    fn root(&mut self, v: usize) -> usize;

    /// Lowest common ancestor of `u` and `v` under the current root, or
    /// `None` if they are not connected.
    fn lca(&mut self, u: usize, v: usize) -> Option<usize>;

    /// Walk toward the root: `nth_parent(v, 0)` is `v`'s parent,
    /// `nth_parent(v, 1)` its grandparent.
    ///
    /// `None` when `v` has at most `n` proper ancestors.
    fn nth_parent(&mut self, v: usize, n: usize) -> Option<usize>;
}

pub trait VertexOps: DynamicForest {
    type Act: Copy;

    fn vertex_get(&mut self, v: usize) -> Self::Key;
    fn vertex_set(&mut self, v: usize, key: Self::Key);
    fn vertex_apply(&mut self, v: usize, act: Self::Act);
}

/// Path queries and updates between two vertices.
///
/// Every operation restores the root that was current when it was called,
/// even though it reroots internally.
pub trait PathOps: DynamicForest {
    type Agg: Copy;
    type Act: Copy;

    /// Number of vertices on the `u`-`v` path (1 + distance).
    fn path_len(&mut self, u: usize, v: usize) -> Option<usize>;

    /// Fold vertex values along the path, ordered from `u` to `v`.
    fn path_fold(&mut self, u: usize, v: usize) -> Option<Self::Agg>;

    /// Apply an additive action to every vertex on the path.
    fn path_apply(&mut self, u: usize, v: usize, act: Self::Act) -> bool;

    /// Replace the value of every vertex on the path.
    fn path_assign(&mut self, u: usize, v: usize, key: Self::Key) -> bool;
}

/// Subtree queries and updates relative to the current root.
pub trait SubtreeOps: DynamicForest {
    type Agg: Copy;
    type Act: Copy;

    fn subtree_size(&mut self, v: usize) -> usize;
    fn subtree_fold(&mut self, v: usize) -> Self::Agg;

    /// Apply an additive action to every vertex in `v`'s subtree. Preserves
    /// the current root.
    fn subtree_apply(&mut self, v: usize, act: Self::Act);
}
