use crate::policy::{LazyMonoid, SumAdd};
use crate::traits::{DynamicForest, PathOps, RootedForest, VertexOps};
use crate::util::{Id, Update, id};

struct Node<P: LazyMonoid> {
    ch: [Id; 2],
    p: Id,
    sz: u32,

    key: P::Key,
    agg: P::Agg,

    rev: bool,
    upd: Option<Update<P>>,
}

impl<P: LazyMonoid> Node<P> {
    fn new(key: P::Key) -> Self {
        Self {
            ch: [Id::NIL, Id::NIL],
            p: Id::NIL,
            sz: 1,
            key,
            agg: P::agg_from_key(&key),
            rev: false,
            upd: None,
        }
    }
}

/// Splay-based link-cut tree over a fixed arena of vertices.
///
/// Maintains a rooted forest: every component has a current root, `link`
/// merges keeping the first argument's root, and path operations restore
/// whatever root was current when they were called. Path aggregates and the
/// lazy reverse / add / replace updates come from the [`LazyMonoid`] policy.
///
/// Vertex indices outside `0..len()` are a documented precondition, checked
/// only by `debug_assert`. Everything else is checked: operations on missing
/// edges or disconnected vertices return `false` / `None` and leave the
/// forest (including every current root) untouched.
pub struct LinkCutTree<P: LazyMonoid = SumAdd> {
    nodes: Vec<Node<P>>,
    stack: Vec<Id>,
}

impl<P: LazyMonoid> LinkCutTree<P> {
    /// Forest of `n` singleton trees, every vertex holding `P::key_unit()`.
    pub fn new(n: usize) -> Self {
        let mut nodes = Vec::with_capacity(n);
        for _ in 0..n {
            nodes.push(Node::new(P::key_unit()));
        }
        Self {
            nodes,
            stack: Vec::with_capacity(n),
        }
    }

    pub fn with_values(values: &[P::Key]) -> Self {
        let mut nodes = Vec::with_capacity(values.len());
        for &v in values {
            debug_assert!(nodes.len() < u32::MAX as usize);
            nodes.push(Node::new(v));
        }
        Self {
            nodes,
            stack: Vec::with_capacity(values.len()),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline(always)]
    fn node(&self, x: Id) -> &Node<P> {
        debug_assert!(!x.is_nil());
        debug_assert!(x.idx() < self.nodes.len());
        if cfg!(debug_assertions) {
            &self.nodes[x.idx()]
        } else {
            // SAFETY: `Id` values are only created from valid indices and `NIL` is checked.
            unsafe { self.nodes.get_unchecked(x.idx()) }
        }
    }

    #[inline(always)]
    fn node_mut(&mut self, x: Id) -> &mut Node<P> {
        debug_assert!(!x.is_nil());
        debug_assert!(x.idx() < self.nodes.len());
        if cfg!(debug_assertions) {
            &mut self.nodes[x.idx()]
        } else {
            // SAFETY: `Id` values are only created from valid indices and `NIL` is checked.
            unsafe { self.nodes.get_unchecked_mut(x.idx()) }
        }
    }

    #[inline(always)]
    fn sz(&self, x: Id) -> u32 {
        if x.is_nil() { 0 } else { self.node(x).sz }
    }

    #[inline(always)]
    fn agg(&self, x: Id) -> P::Agg {
        if x.is_nil() {
            P::agg_unit()
        } else {
            self.node(x).agg
        }
    }

    /// Top of a preferred path: parent is nil, or a path-parent pointer whose
    /// child slots do not point back (the dual-purpose parent trick).
    fn is_splay_root(&self, x: Id) -> bool {
        let p = self.node(x).p;
        if p.is_nil() {
            return true;
        }
        self.node(p).ch[0] != x && self.node(p).ch[1] != x
    }

    fn apply_rev(&mut self, x: Id) {
        if x.is_nil() {
            return;
        }
        let nx = self.node_mut(x);
        nx.ch.swap(0, 1);
        nx.agg = P::agg_reverse(&nx.agg);
        nx.rev ^= true;
    }

    /// Apply a range update to `x`'s whole splay subtree: eager on `x`
    /// itself, pending for its children.
    fn apply_update(&mut self, x: Id, upd: Update<P>) {
        if x.is_nil() {
            return;
        }
        let sz = self.node(x).sz as usize;
        let nx = self.node_mut(x);
        match upd {
            Update::Add(act) => {
                nx.key = P::act_apply_key(&nx.key, &act);
                nx.agg = P::act_apply_agg(&nx.agg, &act, sz);
            }
            Update::Replace(key) => {
                nx.key = key;
                nx.agg = P::agg_repeat(&key, sz);
            }
        }
        nx.upd = Some(upd.over(nx.upd));
    }

    /// Push pending state one level down. Reverse resolves first: the update
    /// is uniform over the run, so it lands identically on swapped children.
    fn push(&mut self, x: Id) {
        if x.is_nil() {
            return;
        }
        let (rev, upd, l, r) = {
            let nx = self.node(x);
            (nx.rev, nx.upd, nx.ch[0], nx.ch[1])
        };

        if rev {
            self.apply_rev(l);
            self.apply_rev(r);
            self.node_mut(x).rev = false;
        }

        if let Some(upd) = upd {
            self.apply_update(l, upd);
            self.apply_update(r, upd);
            self.node_mut(x).upd = None;
        }
    }

    /// Recompute `x` from already-consistent children. `x` must hold no
    /// pending state of its own.
    fn pull(&mut self, x: Id) {
        if x.is_nil() {
            return;
        }
        debug_assert!(!self.node(x).rev && self.node(x).upd.is_none());
        let (l, r, key) = {
            let nx = self.node(x);
            (nx.ch[0], nx.ch[1], nx.key)
        };
        let sz = 1_u32.wrapping_add(self.sz(l)).wrapping_add(self.sz(r));
        let agg = P::agg_merge(&self.agg(l), &key, &self.agg(r));
        let nx = self.node_mut(x);
        nx.sz = sz;
        nx.agg = agg;
    }

    fn rotate(&mut self, x: Id) {
        let p = self.node(x).p;
        let g = self.node(p).p;
        self.push(p);
        self.push(x);

        let dir = usize::from(self.node(p).ch[1] == x);
        let b = self.node(x).ch[dir ^ 1];

        if !self.is_splay_root(p) {
            if self.node(g).ch[0] == p {
                self.node_mut(g).ch[0] = x;
            } else if self.node(g).ch[1] == p {
                self.node_mut(g).ch[1] = x;
            }
        }
        self.node_mut(x).p = g;

        self.node_mut(x).ch[dir ^ 1] = p;
        self.node_mut(p).p = x;

        self.node_mut(p).ch[dir] = b;
        if !b.is_nil() {
            self.node_mut(b).p = p;
        }

        self.pull(p);
        self.pull(x);
    }

    /// Propagate from the splay root down to `x` before any rotation reads
    /// the path; skipping this corrupts aggregates silently.
    fn push_path(&mut self, x: Id) {
        self.stack.clear();
        let mut y = x;
        self.stack.push(y);
        while !self.is_splay_root(y) {
            y = self.node(y).p;
            self.stack.push(y);
        }
        for i in (0..self.stack.len()).rev() {
            let v = self.stack[i];
            self.push(v);
        }
    }

    fn splay(&mut self, x: Id) {
        self.push_path(x);

        while !self.is_splay_root(x) {
            let p = self.node(x).p;
            let g = self.node(p).p;
            if !self.is_splay_root(p) {
                let zigzig = (self.node(g).ch[0] == p) == (self.node(p).ch[0] == x);
                if zigzig {
                    self.rotate(p);
                } else {
                    self.rotate(x);
                }
            }
            self.rotate(x);
        }
    }

    /// Make the root-to-`x` path the preferred path, with `x` as its splay
    /// root. Returns the last preferred-path top spliced in before reaching
    /// `x`'s tree root, which is the LCA when called right after another
    /// access.
    fn access(&mut self, x: Id) -> Id {
        let mut last = Id::NIL;
        let mut y = x;
        while !y.is_nil() {
            self.splay(y);
            self.node_mut(y).ch[1] = last;
            if !last.is_nil() {
                self.node_mut(last).p = y;
            }
            self.pull(y);
            last = y;
            y = self.node(y).p;
        }
        self.splay(x);
        last
    }

    pub fn reroot(&mut self, v: usize) {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        self.apply_rev(x);
    }

    pub fn root(&mut self, v: usize) -> usize {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        let mut y = x;
        self.push(y);
        while !self.node(y).ch[0].is_nil() {
            y = self.node(y).ch[0];
            self.push(y);
        }
        self.splay(y);
        y.idx()
    }

    pub fn connected(&mut self, u: usize, v: usize) -> bool {
        debug_assert!(u < self.len() && v < self.len());
        if u == v {
            return true;
        }
        self.root(u) == self.root(v)
    }

    /// Attach `v`'s component (rerooted at `v`) below `u`. The merged tree
    /// keeps `u`'s root.
    pub fn link(&mut self, u: usize, v: usize) -> bool {
        debug_assert!(u < self.len() && v < self.len());
        if u == v || self.connected(u, v) {
            return false;
        }
        let a = id(u);
        let b = id(v);
        self.reroot(v);
        self.access(a);
        debug_assert!(self.node(a).ch[1].is_nil());
        self.node_mut(a).ch[1] = b;
        self.node_mut(b).p = a;
        self.pull(a);
        true
    }

    pub fn cut(&mut self, u: usize, v: usize) -> bool {
        debug_assert!(u < self.len() && v < self.len());
        if u == v {
            return false;
        }
        let a = id(u);
        let b = id(v);
        let prev_root = self.root(u);
        self.reroot(u);
        self.access(b);
        // After reroot(u) + access(v), the edge exists iff u is v's direct
        // in-order predecessor.
        let is_edge = self.node(b).ch[0] == a && self.node(a).ch[1].is_nil();
        if is_edge {
            self.node_mut(b).ch[0] = Id::NIL;
            self.node_mut(a).p = Id::NIL;
            self.pull(b);
        }
        self.reroot(prev_root);
        is_edge
    }

    pub fn lca(&mut self, u: usize, v: usize) -> Option<usize> {
        debug_assert!(u < self.len() && v < self.len());
        if u == v {
            return Some(u);
        }
        if self.root(u) != self.root(v) {
            return None;
        }
        self.access(id(u));
        Some(self.access(id(v)).idx())
    }

    /// `nth_parent(v, 0)` is `v`'s parent, `nth_parent(v, 1)` its
    /// grandparent, and so on toward the current root.
    pub fn nth_parent(&mut self, v: usize, n: usize) -> Option<usize> {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        let anc = self.node(x).ch[0];
        if anc.is_nil() || (self.node(anc).sz as usize) <= n {
            return None;
        }
        // Exposed order is root..=v, so the target has exactly n strict
        // ancestors of v behind it; select by right-subtree size.
        let mut n = n;
        let mut y = anc;
        loop {
            self.push(y);
            let r = self.node(y).ch[1];
            let rs = self.sz(r) as usize;
            if n < rs {
                y = r;
            } else if n == rs {
                self.splay(y);
                return Some(y.idx());
            } else {
                n -= rs + 1;
                y = self.node(y).ch[0];
            }
        }
    }

    pub fn vertex_get(&mut self, v: usize) -> P::Key {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        self.node(x).key
    }

    pub fn vertex_set(&mut self, v: usize, key: P::Key) {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        self.push(x);
        self.node_mut(x).key = key;
        self.pull(x);
    }

    pub fn vertex_apply(&mut self, v: usize, act: P::Act) {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        self.push(x);
        let key = self.node(x).key;
        self.node_mut(x).key = P::act_apply_key(&key, &act);
        self.pull(x);
    }

    /// Number of vertices on the `u`-`v` path (1 + distance).
    pub fn path_len(&mut self, u: usize, v: usize) -> Option<usize> {
        debug_assert!(u < self.len() && v < self.len());
        if u == v {
            return Some(1);
        }
        let a = id(u);
        let b = id(v);
        let prev_root = self.root(u);
        self.reroot(u);
        self.access(b);
        let result = if self.node(a).p.is_nil() {
            None
        } else {
            Some(self.node(b).sz as usize)
        };
        self.reroot(prev_root);
        result
    }

    /// Fold vertex values along the path, ordered from `u` to `v`.
    pub fn path_fold(&mut self, u: usize, v: usize) -> Option<P::Agg> {
        debug_assert!(u < self.len() && v < self.len());
        if u == v {
            let key = self.vertex_get(u);
            return Some(P::agg_from_key(&key));
        }
        let a = id(u);
        let b = id(v);
        let prev_root = self.root(u);
        self.reroot(u);
        self.access(b);
        let result = if self.node(a).p.is_nil() {
            None
        } else {
            Some(self.node(b).agg)
        };
        self.reroot(prev_root);
        result
    }

    /// Apply an additive action to every vertex on the `u`-`v` path.
    pub fn path_apply(&mut self, u: usize, v: usize, act: P::Act) -> bool {
        debug_assert!(u < self.len() && v < self.len());
        if u == v {
            self.vertex_apply(u, act);
            return true;
        }
        let a = id(u);
        let b = id(v);
        let prev_root = self.root(u);
        self.reroot(u);
        self.access(b);
        let is_path = !self.node(a).p.is_nil();
        if is_path {
            self.apply_update(b, Update::Add(act));
        }
        self.reroot(prev_root);
        is_path
    }

    /// Replace the value of every vertex on the `u`-`v` path with `key`.
    pub fn path_assign(&mut self, u: usize, v: usize, key: P::Key) -> bool {
        debug_assert!(u < self.len() && v < self.len());
        if u == v {
            self.vertex_set(u, key);
            return true;
        }
        let a = id(u);
        let b = id(v);
        let prev_root = self.root(u);
        self.reroot(u);
        self.access(b);
        let is_path = !self.node(a).p.is_nil();
        if is_path {
            self.apply_update(b, Update::Replace(key));
        }
        self.reroot(prev_root);
        is_path
    }
}

impl LinkCutTree<SumAdd> {
    pub fn path_sum(&mut self, u: usize, v: usize) -> Option<i64> {
        self.path_fold(u, v)
    }

    pub fn vertex_add(&mut self, v: usize, delta: i64) {
        self.vertex_apply(v, delta);
    }
}

impl<P: LazyMonoid> DynamicForest for LinkCutTree<P> {
    type Key = P::Key;

    fn len(&self) -> usize {
        self.len()
    }

    fn link(&mut self, u: usize, v: usize) -> bool {
        self.link(u, v)
    }

    fn cut(&mut self, u: usize, v: usize) -> bool {
        self.cut(u, v)
    }

    fn connected(&mut self, u: usize, v: usize) -> bool {
        self.connected(u, v)
    }
}

impl<P: LazyMonoid> RootedForest for LinkCutTree<P> {
    fn reroot(&mut self, v: usize) {
        self.reroot(v)
    }

    fn root(&mut self, v: usize) -> usize {
        self.root(v)
    }

    fn lca(&mut self, u: usize, v: usize) -> Option<usize> {
        self.lca(u, v)
    }

    fn nth_parent(&mut self, v: usize, n: usize) -> Option<usize> {
        self.nth_parent(v, n)
    }
}

impl<P: LazyMonoid> VertexOps for LinkCutTree<P> {
    type Act = P::Act;

    fn vertex_get(&mut self, v: usize) -> Self::Key {
        self.vertex_get(v)
    }

    fn vertex_set(&mut self, v: usize, key: Self::Key) {
        self.vertex_set(v, key)
    }

    fn vertex_apply(&mut self, v: usize, act: Self::Act) {
        self.vertex_apply(v, act)
    }
}

impl<P: LazyMonoid> PathOps for LinkCutTree<P> {
    type Agg = P::Agg;
    type Act = P::Act;

    fn path_len(&mut self, u: usize, v: usize) -> Option<usize> {
        self.path_len(u, v)
    }

    fn path_fold(&mut self, u: usize, v: usize) -> Option<Self::Agg> {
        self.path_fold(u, v)
    }

    fn path_apply(&mut self, u: usize, v: usize, act: Self::Act) -> bool {
        self.path_apply(u, v, act)
    }

    fn path_assign(&mut self, u: usize, v: usize, key: Self::Key) -> bool {
        self.path_assign(u, v, key)
    }
}
