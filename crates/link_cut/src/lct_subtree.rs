use crate::policy::{InvertibleLazyMonoid, SumAdd};
use crate::traits::{DynamicForest, PathOps, RootedForest, SubtreeOps, VertexOps};
use crate::util::{Id, Update, id};

struct Node<P: InvertibleLazyMonoid> {
    ch: [Id; 2],
    p: Id,
    sz: u32,
    vir_sz: u32,
    sub_sz: u32,

    key: P::Key,
    agg: P::Agg,
    vir_agg: P::Agg,
    sub_agg: P::Agg,

    rev: bool,
    upd: Option<Update<P>>,
    all: Option<P::Act>,

    /// Running composition of every subtree-wide action applied at this node.
    vir_lazy: P::Act,
    /// Value of the parent's `vir_lazy` when this node last became a light
    /// child; the difference is the catch-up owed on promotion.
    vir_seen: P::Act,
}

impl<P: InvertibleLazyMonoid> Node<P> {
    fn new(key: P::Key) -> Self {
        Self {
            ch: [Id::NIL, Id::NIL],
            p: Id::NIL,
            sz: 1,
            vir_sz: 0,
            sub_sz: 1,
            key,
            agg: P::agg_from_key(&key),
            vir_agg: P::agg_unit(),
            sub_agg: P::agg_from_key(&key),
            rev: false,
            upd: None,
            all: None,
            vir_lazy: P::act_unit(),
            vir_seen: P::act_unit(),
        }
    }
}

/// Link-cut tree that additionally aggregates over subtrees.
///
/// Same rooted-forest contract as [`LinkCutTree`](crate::LinkCutTree), plus
/// `subtree_size` / `subtree_fold` / `subtree_apply` relative to each
/// component's current root. Light-child contributions are kept in per-node
/// virtual aggregates, updated incrementally as `access` flips preferred
/// edges; this needs subtraction, hence the [`InvertibleLazyMonoid`] bound.
/// Aggregates without it (min, max) are rejected at compile time.
pub struct SubtreeLinkCutTree<P: InvertibleLazyMonoid = SumAdd> {
    nodes: Vec<Node<P>>,
    stack: Vec<Id>,
}

impl<P: InvertibleLazyMonoid> SubtreeLinkCutTree<P> {
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
    fn sub_sz(&self, x: Id) -> u32 {
        if x.is_nil() { 0 } else { self.node(x).sub_sz }
    }

    #[inline(always)]
    fn agg(&self, x: Id) -> P::Agg {
        if x.is_nil() {
            P::agg_unit()
        } else {
            self.node(x).agg
        }
    }

    #[inline(always)]
    fn sub_agg(&self, x: Id) -> P::Agg {
        if x.is_nil() {
            P::agg_unit()
        } else {
            self.node(x).sub_agg
        }
    }

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

    /// Apply a path-range update to `x`'s splay run: eager on `x`, pending
    /// for its splay children. Light subtrees are untouched, so only the run
    /// slice of `sub_agg` is rewritten.
    fn apply_path_update(&mut self, x: Id, upd: Update<P>) {
        if x.is_nil() {
            return;
        }
        let sz = self.node(x).sz as usize;
        let nx = self.node_mut(x);
        let old_agg = nx.agg;
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
        nx.sub_agg = P::agg_combine(&P::agg_retract(&nx.sub_agg, &old_agg), &nx.agg);
        nx.upd = Some(upd.over(nx.upd));
    }

    /// Apply an action to everything `x` represents: its splay run and every
    /// light subtree hanging off it. Eager on `x`'s own summaries, pending
    /// (via `all`) for splay children; light children catch up on promotion
    /// through the `vir_lazy` / `vir_seen` pair.
    fn apply_all(&mut self, x: Id, act: P::Act) {
        if x.is_nil() {
            return;
        }
        let (sz, vir_sz, sub_sz) = {
            let nx = self.node(x);
            (nx.sz as usize, nx.vir_sz as usize, nx.sub_sz as usize)
        };
        let nx = self.node_mut(x);
        nx.key = P::act_apply_key(&nx.key, &act);
        nx.agg = P::act_apply_agg(&nx.agg, &act, sz);
        nx.vir_agg = P::act_apply_agg(&nx.vir_agg, &act, vir_sz);
        nx.sub_agg = P::act_apply_agg(&nx.sub_agg, &act, sub_sz);
        nx.vir_lazy = P::act_compose(&act, &nx.vir_lazy);
        // A pending replace predates this act; fold the act into the
        // replacement key so children still see replace-then-act.
        if let Some(Update::Replace(k)) = nx.upd {
            nx.upd = Some(Update::Replace(P::act_apply_key(&k, &act)));
        }
        nx.all = Some(match nx.all {
            Some(prev) => P::act_compose(&act, &prev),
            None => act,
        });
    }

    fn push(&mut self, x: Id) {
        if x.is_nil() {
            return;
        }
        let (rev, all, upd, l, r) = {
            let nx = self.node(x);
            (nx.rev, nx.all, nx.upd, nx.ch[0], nx.ch[1])
        };

        if rev {
            self.apply_rev(l);
            self.apply_rev(r);
            self.node_mut(x).rev = false;
        }

        if let Some(act) = all {
            self.apply_all(l, act);
            self.apply_all(r, act);
            self.node_mut(x).all = None;
        }

        if let Some(upd) = upd {
            self.apply_path_update(l, upd);
            self.apply_path_update(r, upd);
            self.node_mut(x).upd = None;
        }
    }

    fn pull(&mut self, x: Id) {
        if x.is_nil() {
            return;
        }
        debug_assert!(
            !self.node(x).rev && self.node(x).upd.is_none() && self.node(x).all.is_none()
        );
        let (l, r, key, vir_sz, vir_agg) = {
            let nx = self.node(x);
            (nx.ch[0], nx.ch[1], nx.key, nx.vir_sz, nx.vir_agg)
        };
        let sz = 1_u32.wrapping_add(self.sz(l)).wrapping_add(self.sz(r));
        let sub_sz = 1_u32
            .wrapping_add(self.sub_sz(l))
            .wrapping_add(self.sub_sz(r))
            .wrapping_add(vir_sz);
        let agg = P::agg_merge(&self.agg(l), &key, &self.agg(r));
        let sub_agg = P::agg_combine(
            &P::agg_combine(
                &P::agg_combine(&P::agg_from_key(&key), &self.sub_agg(l)),
                &self.sub_agg(r),
            ),
            &vir_agg,
        );
        let nx = self.node_mut(x);
        nx.sz = sz;
        nx.sub_sz = sub_sz;
        nx.agg = agg;
        nx.sub_agg = sub_agg;
    }

    fn rotate(&mut self, x: Id) {
        let p = self.node(x).p;
        let g = self.node(p).p;
        let p_was_top = self.is_splay_root(p);
        self.push(p);
        self.push(x);

        let dir = usize::from(self.node(p).ch[1] == x);
        let b = self.node(x).ch[dir ^ 1];

        if !p_was_top {
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

        // The catch-up snapshot travels with the top of the preferred path.
        if p_was_top {
            let snap = self.node(p).vir_seen;
            self.node_mut(x).vir_seen = snap;
        }

        self.pull(p);
        self.pull(x);
    }

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

    /// Demote `c` to a light child of `y` (both already pushed and pulled).
    fn virtual_add(&mut self, y: Id, c: Id) {
        if c.is_nil() {
            return;
        }
        let (c_sub_sz, c_sub_agg) = {
            let nc = self.node(c);
            (nc.sub_sz, nc.sub_agg)
        };
        let snap = self.node(y).vir_lazy;
        let ny = self.node_mut(y);
        ny.vir_sz = ny.vir_sz.wrapping_add(c_sub_sz);
        ny.vir_agg = P::agg_combine(&ny.vir_agg, &c_sub_agg);
        self.node_mut(c).vir_seen = snap;
    }

    /// Promote `c` out of `y`'s light children, first paying out the
    /// subtree-wide actions `c` missed while it was light.
    fn virtual_remove(&mut self, y: Id, c: Id) {
        if c.is_nil() {
            return;
        }
        let diff = {
            let lazy = self.node(y).vir_lazy;
            let seen = self.node(c).vir_seen;
            P::act_retract(&lazy, &seen)
        };
        if diff != P::act_unit() {
            self.apply_all(c, diff);
        }
        let (c_sub_sz, c_sub_agg) = {
            let nc = self.node(c);
            (nc.sub_sz, nc.sub_agg)
        };
        let ny = self.node_mut(y);
        ny.vir_sz = ny.vir_sz.wrapping_sub(c_sub_sz);
        ny.vir_agg = P::agg_retract(&ny.vir_agg, &c_sub_agg);
    }

    fn access(&mut self, x: Id) -> Id {
        let mut last = Id::NIL;
        let mut y = x;
        while !y.is_nil() {
            self.splay(y);
            let old_right = self.node(y).ch[1];
            if old_right != last {
                self.virtual_add(y, old_right);
                self.virtual_remove(y, last);
                self.node_mut(y).ch[1] = last;
                if !last.is_nil() {
                    self.node_mut(last).p = y;
                }
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
            self.apply_path_update(b, Update::Add(act));
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
            self.apply_path_update(b, Update::Replace(key));
        }
        self.reroot(prev_root);
        is_path
    }

    /// Number of vertices in `v`'s subtree under the current root,
    /// including `v`.
    pub fn subtree_size(&mut self, v: usize) -> usize {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        // After access every child of v is light, so the subtree is v plus
        // its virtual total.
        self.node(x).vir_sz as usize + 1
    }

    /// Fold over every vertex in `v`'s subtree under the current root.
    pub fn subtree_fold(&mut self, v: usize) -> P::Agg {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        let nx = self.node(x);
        P::agg_combine(&P::agg_from_key(&nx.key), &nx.vir_agg)
    }

    /// Subtree-wide action on an accessed component root: the splay tree is a
    /// singleton, so the whole subtree is the key plus the virtual total.
    fn apply_exposed_subtree(&mut self, x: Id, act: P::Act) {
        debug_assert!(self.node(x).ch[0].is_nil() && self.node(x).ch[1].is_nil());
        let vir_sz = self.node(x).vir_sz as usize;
        let nx = self.node_mut(x);
        nx.key = P::act_apply_key(&nx.key, &act);
        nx.agg = P::agg_from_key(&nx.key);
        nx.vir_agg = P::act_apply_agg(&nx.vir_agg, &act, vir_sz);
        nx.sub_agg = P::agg_combine(&P::agg_from_key(&nx.key), &nx.vir_agg);
        nx.vir_lazy = P::act_compose(&act, &nx.vir_lazy);
    }

    /// Apply an action to every vertex in `v`'s subtree under the current
    /// root. The current root is preserved.
    ///
    /// `v`'s subtree is detached, updated as a component root (where the
    /// subtree is exactly key + virtual total), and reattached.
    pub fn subtree_apply(&mut self, v: usize, act: P::Act) {
        debug_assert!(v < self.len());
        if self.root(v) == v {
            self.access(id(v));
            self.apply_exposed_subtree(id(v), act);
            return;
        }
        let Some(parent) = self.nth_parent(v, 0) else {
            return;
        };
        let cut_ok = self.cut(parent, v);
        debug_assert!(cut_ok);
        self.access(id(v));
        self.apply_exposed_subtree(id(v), act);
        let link_ok = self.link(parent, v);
        debug_assert!(link_ok);
    }
}

impl SubtreeLinkCutTree<SumAdd> {
    pub fn path_sum(&mut self, u: usize, v: usize) -> Option<i64> {
        self.path_fold(u, v)
    }

    pub fn subtree_sum(&mut self, v: usize) -> i64 {
        self.subtree_fold(v)
    }
}

impl<P: InvertibleLazyMonoid> DynamicForest for SubtreeLinkCutTree<P> {
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

impl<P: InvertibleLazyMonoid> RootedForest for SubtreeLinkCutTree<P> {
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

impl<P: InvertibleLazyMonoid> VertexOps for SubtreeLinkCutTree<P> {
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

impl<P: InvertibleLazyMonoid> PathOps for SubtreeLinkCutTree<P> {
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

impl<P: InvertibleLazyMonoid> SubtreeOps for SubtreeLinkCutTree<P> {
    type Agg = P::Agg;
    type Act = P::Act;

    fn subtree_size(&mut self, v: usize) -> usize {
        self.subtree_size(v)
    }

    fn subtree_fold(&mut self, v: usize) -> Self::Agg {
        self.subtree_fold(v)
    }

    fn subtree_apply(&mut self, v: usize, act: Self::Act) {
        self.subtree_apply(v, act)
    }
}
