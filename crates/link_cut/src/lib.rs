//! Link-cut trees over rooted forests.
//!
//! Two tiers sharing one contract: [`LinkCutTree`] maintains a forest under
//! `link` / `cut` / `reroot` with path queries and lazy path updates for any
//! [`policy::LazyMonoid`]; [`SubtreeLinkCutTree`] additionally answers subtree
//! queries and subtree-wide updates for [`policy::InvertibleLazyMonoid`]
//! policies.
//!
//! Every component has a current root. `link(u, v)` keeps `u`'s root for the
//! merged tree, `cut` roots the far side at its detached endpoint, and path
//! and subtree operations restore whatever root was current when they were
//! called. `lca` and `nth_parent` are answered relative to the current root.
//!
//! All operations are amortized `O(log n)` splay work; subtree maintenance
//! adds `O(1)` per preferred-edge flip.

pub mod policy;
pub mod traits;

mod lct;
mod lct_subtree;
mod util;

pub use lct::LinkCutTree;
pub use lct_subtree::SubtreeLinkCutTree;

#[cfg(test)]
mod tests {
    use super::policy::{
        Affine, AffineComposite, InvertibleLazyMonoid, LazyMonoid, MinAdd, NoAgg, SumAdd,
    };
    use super::traits::RootedForest;
    use super::util::Update;
    use super::{LinkCutTree, SubtreeLinkCutTree};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Brute-force rooted forest: adjacency lists plus one marked root per
    /// component, mirroring the trees' root rules exactly.
    struct RootedOracle {
        adj: Vec<Vec<usize>>,
        is_root: Vec<bool>,
        val: Vec<i64>,
    }

    impl RootedOracle {
        fn new(n: usize) -> Self {
            Self {
                adj: vec![Vec::new(); n],
                is_root: vec![true; n],
                val: vec![0; n],
            }
        }

        fn component(&self, v: usize) -> Vec<usize> {
            let mut seen = vec![false; self.adj.len()];
            let mut queue = vec![v];
            seen[v] = true;
            let mut i = 0;
            while i < queue.len() {
                let x = queue[i];
                i += 1;
                for &y in &self.adj[x] {
                    if !seen[y] {
                        seen[y] = true;
                        queue.push(y);
                    }
                }
            }
            queue
        }

        fn connected(&self, u: usize, v: usize) -> bool {
            self.component(u).contains(&v)
        }

        fn root(&self, v: usize) -> usize {
            for &x in &self.component(v) {
                if self.is_root[x] {
                    return x;
                }
            }
            unreachable!("component without a root");
        }

        fn path(&self, u: usize, v: usize) -> Option<Vec<usize>> {
            if u == v {
                return Some(vec![u]);
            }
            let n = self.adj.len();
            let mut prev = vec![usize::MAX; n];
            prev[u] = u;
            let mut queue = vec![u];
            let mut i = 0;
            while i < queue.len() {
                let x = queue[i];
                i += 1;
                for &y in &self.adj[x] {
                    if prev[y] == usize::MAX {
                        prev[y] = x;
                        queue.push(y);
                    }
                }
            }
            if prev[v] == usize::MAX {
                return None;
            }
            let mut path = vec![v];
            let mut x = v;
            while x != u {
                x = prev[x];
                path.push(x);
            }
            path.reverse();
            Some(path)
        }

        fn reroot(&mut self, v: usize) {
            let r = self.root(v);
            self.is_root[r] = false;
            self.is_root[v] = true;
        }

        fn link(&mut self, u: usize, v: usize) -> bool {
            if u == v || self.connected(u, v) {
                return false;
            }
            let rv = self.root(v);
            self.is_root[rv] = false;
            self.adj[u].push(v);
            self.adj[v].push(u);
            true
        }

        fn cut(&mut self, u: usize, v: usize) -> bool {
            if u == v || !self.adj[u].contains(&v) {
                return false;
            }
            let r0 = self.root(u);
            self.adj[u].retain(|&x| x != v);
            self.adj[v].retain(|&x| x != u);
            // The side holding the old root keeps it; the other side is
            // rooted at its detached endpoint.
            self.is_root[r0] = false;
            if self.component(u).contains(&r0) {
                self.is_root[r0] = true;
                self.is_root[v] = true;
            } else {
                self.is_root[u] = true;
                self.is_root[r0] = true;
            }
            true
        }

        fn lca(&self, u: usize, v: usize) -> Option<usize> {
            if !self.connected(u, v) {
                return None;
            }
            let r = self.root(u);
            let pu = self.path(r, u).unwrap();
            let pv = self.path(r, v).unwrap();
            let mut ans = r;
            for i in 0..pu.len().min(pv.len()) {
                if pu[i] != pv[i] {
                    break;
                }
                ans = pu[i];
            }
            Some(ans)
        }

        fn nth_parent(&self, v: usize, n: usize) -> Option<usize> {
            let r = self.root(v);
            let path = self.path(r, v).unwrap();
            if path.len() < n + 2 {
                None
            } else {
                Some(path[path.len() - 2 - n])
            }
        }

        fn subtree(&self, v: usize) -> Vec<usize> {
            let r = self.root(v);
            self.component(v)
                .into_iter()
                .filter(|&x| self.path(r, x).unwrap().contains(&v))
                .collect()
        }

        fn path_sum(&self, u: usize, v: usize) -> Option<i64> {
            self.path(u, v)
                .map(|p| p.iter().map(|&x| self.val[x]).sum())
        }
    }

    fn check_rooted_contract<F: RootedForest>(f: &mut F) {
        assert!(f.link(0, 1));
        assert!(f.link(1, 2));
        assert!(f.link(1, 3));
        assert!(!f.link(0, 3));
        assert_eq!(f.root(3), 0);
        assert_eq!(f.lca(2, 3), Some(1));
        assert_eq!(f.nth_parent(2, 0), Some(1));
        assert_eq!(f.nth_parent(2, 1), Some(0));
        assert_eq!(f.nth_parent(2, 2), None);
        f.reroot(2);
        assert_eq!(f.root(0), 2);
        assert_eq!(f.nth_parent(0, 0), Some(1));
        assert!(!f.cut(0, 2));
        assert!(f.cut(1, 2));
        assert!(!f.connected(0, 2));
        assert_eq!(f.root(0), 1);
        assert_eq!(f.root(2), 2);
    }

    #[test]
    fn rooted_contract_path_tier() {
        let mut f = LinkCutTree::<SumAdd>::new(4);
        check_rooted_contract(&mut f);
    }

    #[test]
    fn rooted_contract_subtree_tier() {
        let mut f = SubtreeLinkCutTree::<SumAdd>::new(4);
        check_rooted_contract(&mut f);
    }

    #[test]
    fn sum_add_path_stress() {
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);
        const N: usize = 30;
        let mut tree = LinkCutTree::<SumAdd>::new(N);
        let mut oracle = RootedOracle::new(N);

        for _ in 0..20_000 {
            let u = rng.random_range(0..N);
            let v = rng.random_range(0..N);
            match rng.random_range(0..12_u32) {
                0 | 1 => assert_eq!(tree.link(u, v), oracle.link(u, v)),
                2 => assert_eq!(tree.cut(u, v), oracle.cut(u, v)),
                3 => {
                    tree.reroot(v);
                    oracle.reroot(v);
                }
                4 => assert_eq!(tree.root(v), oracle.root(v)),
                5 => assert_eq!(tree.connected(u, v), oracle.connected(u, v)),
                6 => assert_eq!(tree.lca(u, v), oracle.lca(u, v)),
                7 => {
                    let n = rng.random_range(0..5);
                    assert_eq!(tree.nth_parent(v, n), oracle.nth_parent(v, n));
                }
                8 => {
                    assert_eq!(tree.path_len(u, v), oracle.path(u, v).map(|p| p.len()));
                    assert_eq!(tree.path_sum(u, v), oracle.path_sum(u, v));
                }
                9 => {
                    let delta = rng.random_range(-50..50_i64);
                    let applied = tree.path_apply(u, v, delta);
                    match oracle.path(u, v) {
                        Some(p) => {
                            assert!(applied);
                            for x in p {
                                oracle.val[x] += delta;
                            }
                        }
                        None => assert!(!applied),
                    }
                }
                10 => {
                    let key = rng.random_range(-50..50_i64);
                    let assigned = tree.path_assign(u, v, key);
                    match oracle.path(u, v) {
                        Some(p) => {
                            assert!(assigned);
                            for x in p {
                                oracle.val[x] = key;
                            }
                        }
                        None => assert!(!assigned),
                    }
                }
                _ => match rng.random_range(0..3_u32) {
                    0 => assert_eq!(tree.vertex_get(v), oracle.val[v]),
                    1 => {
                        let key = rng.random_range(-50..50_i64);
                        tree.vertex_set(v, key);
                        oracle.val[v] = key;
                    }
                    _ => {
                        let delta = rng.random_range(-50..50_i64);
                        tree.vertex_add(v, delta);
                        oracle.val[v] += delta;
                    }
                },
            }
        }

        for v in 0..N {
            assert_eq!(tree.vertex_get(v), oracle.val[v]);
            assert_eq!(tree.root(v), oracle.root(v));
        }
    }

    #[test]
    fn sum_add_subtree_stress() {
        let mut rng = StdRng::seed_from_u64(0x5EED_2026);
        const N: usize = 24;
        let mut tree = SubtreeLinkCutTree::<SumAdd>::new(N);
        let mut oracle = RootedOracle::new(N);

        for _ in 0..12_000 {
            let u = rng.random_range(0..N);
            let v = rng.random_range(0..N);
            match rng.random_range(0..13_u32) {
                0 | 1 => assert_eq!(tree.link(u, v), oracle.link(u, v)),
                2 => assert_eq!(tree.cut(u, v), oracle.cut(u, v)),
                3 => {
                    tree.reroot(v);
                    oracle.reroot(v);
                }
                4 => assert_eq!(tree.root(v), oracle.root(v)),
                5 => assert_eq!(tree.lca(u, v), oracle.lca(u, v)),
                6 => {
                    let n = rng.random_range(0..5);
                    assert_eq!(tree.nth_parent(v, n), oracle.nth_parent(v, n));
                }
                7 => {
                    assert_eq!(tree.path_len(u, v), oracle.path(u, v).map(|p| p.len()));
                    assert_eq!(tree.path_sum(u, v), oracle.path_sum(u, v));
                }
                8 => {
                    let delta = rng.random_range(-50..50_i64);
                    let applied = tree.path_apply(u, v, delta);
                    match oracle.path(u, v) {
                        Some(p) => {
                            assert!(applied);
                            for x in p {
                                oracle.val[x] += delta;
                            }
                        }
                        None => assert!(!applied),
                    }
                }
                9 => {
                    let key = rng.random_range(-50..50_i64);
                    let assigned = tree.path_assign(u, v, key);
                    match oracle.path(u, v) {
                        Some(p) => {
                            assert!(assigned);
                            for x in p {
                                oracle.val[x] = key;
                            }
                        }
                        None => assert!(!assigned),
                    }
                }
                10 => {
                    let sub = oracle.subtree(v);
                    assert_eq!(tree.subtree_size(v), sub.len());
                    assert_eq!(
                        tree.subtree_sum(v),
                        sub.iter().map(|&x| oracle.val[x]).sum::<i64>()
                    );
                }
                11 => {
                    let delta = rng.random_range(-50..50_i64);
                    tree.subtree_apply(v, delta);
                    for x in oracle.subtree(v) {
                        oracle.val[x] += delta;
                    }
                }
                _ => {
                    let delta = rng.random_range(-50..50_i64);
                    tree.vertex_apply(v, delta);
                    oracle.val[v] += delta;
                }
            }
        }

        for v in 0..N {
            assert_eq!(tree.vertex_get(v), oracle.val[v]);
            assert_eq!(tree.root(v), oracle.root(v));
            let sub = oracle.subtree(v);
            assert_eq!(tree.subtree_size(v), sub.len());
            assert_eq!(
                tree.subtree_sum(v),
                sub.iter().map(|&x| oracle.val[x]).sum::<i64>()
            );
        }
    }

    #[test]
    fn min_add_path_stress() {
        let mut rng = StdRng::seed_from_u64(0xDECADE);
        const N: usize = 20;
        let init: Vec<i64> = (0..N).map(|_| rng.random_range(-100..100)).collect();
        let mut tree = LinkCutTree::<MinAdd>::with_values(&init);
        let mut oracle = RootedOracle::new(N);
        oracle.val = init;

        for _ in 0..8_000 {
            let u = rng.random_range(0..N);
            let v = rng.random_range(0..N);
            match rng.random_range(0..6_u32) {
                0 | 1 => assert_eq!(tree.link(u, v), oracle.link(u, v)),
                2 => assert_eq!(tree.cut(u, v), oracle.cut(u, v)),
                3 => {
                    tree.reroot(v);
                    oracle.reroot(v);
                }
                4 => {
                    let expect = oracle
                        .path(u, v)
                        .map(|p| p.iter().map(|&x| oracle.val[x]).min().unwrap());
                    assert_eq!(tree.path_fold(u, v), expect);
                }
                _ => {
                    let delta = rng.random_range(-30..30_i64);
                    let applied = tree.path_apply(u, v, delta);
                    match oracle.path(u, v) {
                        Some(p) => {
                            assert!(applied);
                            for x in p {
                                oracle.val[x] += delta;
                            }
                        }
                        None => assert!(!applied),
                    }
                }
            }
        }
    }

    #[test]
    fn affine_composite_fold_is_directional() {
        let mut rng = StdRng::seed_from_u64(0xAB1E);
        const N: usize = 16;
        let maps: Vec<Affine> = (0..N)
            .map(|_| Affine {
                a: rng.random_range(-3..4),
                b: rng.random_range(-10..10),
            })
            .collect();
        let mut tree = LinkCutTree::<AffineComposite>::with_values(&maps);
        let mut oracle = RootedOracle::new(N);
        for v in 1..N {
            let u = rng.random_range(0..v);
            assert!(tree.link(u, v));
            assert!(oracle.link(u, v));
        }

        for _ in 0..500 {
            let u = rng.random_range(0..N);
            let v = rng.random_range(0..N);
            if rng.random_range(0..8_u32) == 0 {
                tree.reroot(v);
                oracle.reroot(v);
                continue;
            }
            let path = oracle.path(u, v).unwrap();
            let mut fwd = Affine::IDENTITY;
            for &x in &path {
                fwd = maps[x].compose(fwd);
            }
            let mut bwd = Affine::IDENTITY;
            for &x in path.iter().rev() {
                bwd = maps[x].compose(bwd);
            }
            let got = tree.path_fold(u, v).unwrap();
            assert_eq!(got.fwd, fwd);
            assert_eq!(got.bwd, bwd);
        }
    }

    #[test]
    fn no_agg_tracks_structure_only() {
        let mut tree = SubtreeLinkCutTree::<NoAgg>::new(8);
        for v in 1..8 {
            assert!(tree.link(v - 1, v));
        }
        assert_eq!(tree.path_len(0, 7), Some(8));
        assert_eq!(tree.subtree_size(0), 8);
        assert_eq!(tree.subtree_size(4), 4);
        assert!(tree.cut(3, 4));
        assert_eq!(tree.path_len(0, 7), None);
        assert_eq!(tree.subtree_size(4), 4);
        assert_eq!(tree.root(7), 4);
    }

    #[test]
    fn subtree_ops_follow_current_root() {
        let mut tree = SubtreeLinkCutTree::<SumAdd>::new(10);
        for v in 1..10 {
            assert!(tree.link(v - 1, v));
        }
        assert!(tree.path_assign(0, 9, 1));

        tree.reroot(5);
        assert_eq!(tree.subtree_sum(5), 10);
        assert_eq!(tree.subtree_size(5), 10);

        tree.reroot(1);
        assert_eq!(tree.subtree_sum(5), 5);
        assert_eq!(tree.subtree_size(5), 5);

        assert!(tree.cut(2, 3));
        tree.reroot(5);
        assert_eq!(tree.subtree_sum(5), 7);
        assert_eq!(tree.subtree_size(5), 7);
        assert_eq!(tree.subtree_sum(1), 3);
    }

    #[test]
    fn subtree_apply_preserves_root_and_values() {
        let mut tree = SubtreeLinkCutTree::<SumAdd>::new(7);
        // 0 - 1 - {2, 3}, 3 - {4, 5}, 5 - 6, rooted at 0
        for (u, v) in [(0, 1), (1, 2), (1, 3), (3, 4), (3, 5), (5, 6)] {
            assert!(tree.link(u, v));
        }
        tree.subtree_apply(3, 10);
        assert_eq!(tree.root(6), 0);
        assert_eq!(tree.vertex_get(3), 10);
        assert_eq!(tree.vertex_get(4), 10);
        assert_eq!(tree.vertex_get(6), 10);
        assert_eq!(tree.vertex_get(1), 0);
        assert_eq!(tree.subtree_sum(3), 40);
        assert_eq!(tree.subtree_sum(0), 40);

        // Applying at the root covers everything.
        tree.subtree_apply(0, 1);
        assert_eq!(tree.subtree_sum(0), 47);
        assert_eq!(tree.vertex_get(0), 1);
    }

    #[test]
    fn path_assign_then_apply_layers_correctly() {
        let mut tree = LinkCutTree::<SumAdd>::new(6);
        for v in 1..6 {
            assert!(tree.link(v - 1, v));
        }
        assert!(tree.path_assign(0, 5, 10));
        assert!(tree.path_apply(1, 4, 5));
        let expect = [10, 15, 15, 15, 15, 10];
        for (v, &e) in expect.iter().enumerate() {
            assert_eq!(tree.vertex_get(v), e);
        }
        assert_eq!(tree.path_sum(0, 5), Some(80));
        assert!(tree.path_assign(2, 3, 0));
        assert_eq!(tree.path_sum(0, 5), Some(50));
    }

    #[test]
    fn cut_then_relink_round_trip() {
        let mut tree = LinkCutTree::<SumAdd>::new(9);
        for v in 1..9 {
            assert!(tree.link(v - 1, v));
            tree.vertex_set(v, v as i64);
        }
        assert!(tree.cut(4, 5));
        assert_eq!(tree.path_sum(0, 4), Some(10));
        assert_eq!(tree.path_sum(5, 8), Some(26));
        assert_eq!(tree.path_sum(0, 8), None);
        assert!(tree.link(4, 5));
        assert_eq!(tree.path_sum(0, 8), Some(36));
        assert_eq!(tree.root(8), 0);
    }

    #[test]
    fn reroot_is_idempotent() {
        let mut tree = LinkCutTree::<SumAdd>::new(5);
        for v in 1..5 {
            assert!(tree.link(v - 1, v));
        }
        tree.reroot(3);
        tree.reroot(3);
        assert_eq!(tree.root(0), 3);
        assert_eq!(tree.nth_parent(0, 0), Some(1));
        assert_eq!(tree.nth_parent(4, 0), Some(3));
    }

    #[test]
    fn single_vertex_paths() {
        let mut tree = LinkCutTree::<SumAdd>::new(3);
        assert_eq!(tree.path_len(1, 1), Some(1));
        assert_eq!(tree.path_sum(1, 1), Some(0));
        assert!(tree.path_apply(1, 1, 7));
        assert_eq!(tree.vertex_get(1), 7);
        assert!(tree.path_assign(1, 1, 3));
        assert_eq!(tree.vertex_get(1), 3);
        assert_eq!(tree.lca(1, 1), Some(1));
        assert_eq!(tree.nth_parent(1, 0), None);
        assert!(!tree.link(1, 1));
        assert!(!tree.cut(1, 1));
    }

    #[test]
    fn failed_ops_leave_roots_alone() {
        let mut tree = LinkCutTree::<SumAdd>::new(6);
        assert!(tree.link(0, 1));
        assert!(tree.link(1, 2));
        assert!(tree.link(3, 4));
        tree.reroot(2);
        tree.reroot(4);
        assert!(!tree.cut(0, 5));
        assert!(!tree.cut(0, 2));
        assert!(tree.path_sum(1, 4).is_none());
        assert!(!tree.path_apply(0, 3, 1));
        assert!(!tree.path_assign(2, 4, 1));
        assert_eq!(tree.root(0), 2);
        assert_eq!(tree.root(3), 4);
        assert_eq!(tree.root(5), 5);
    }

    #[test]
    fn update_merge_rules() {
        match Update::<SumAdd>::Add(3).over(Some(Update::Replace(5))) {
            Update::Replace(8) => {}
            _ => panic!("add over replace must fold into the replacement"),
        }
        match Update::<SumAdd>::Replace(5).over(Some(Update::Add(3))) {
            Update::Replace(5) => {}
            _ => panic!("replace must discard the pending add"),
        }
        match Update::<SumAdd>::Add(3).over(Some(Update::Add(4))) {
            Update::Add(7) => {}
            _ => panic!("adds must compose"),
        }
    }

    #[test]
    fn affine_policy_laws() {
        let f = Affine { a: 2, b: 3 };
        let g = Affine { a: 5, b: 1 };
        assert_eq!(f.compose(g), Affine { a: 10, b: 5 });
        assert_eq!(f.compose(g).eval(2), f.eval(g.eval(2)));

        let rep = AffineComposite::agg_repeat(&f, 5);
        let mut acc = Affine::IDENTITY;
        for _ in 0..5 {
            acc = f.compose(acc);
        }
        assert_eq!(rep.fwd, acc);
        assert_eq!(rep.bwd, acc);

        let run = AffineComposite::agg_merge(
            &AffineComposite::agg_from_key(&f),
            &g,
            &AffineComposite::agg_unit(),
        );
        assert_eq!(run.fwd, g.compose(f));
        assert_eq!(run.bwd, f.compose(g));
        let rev = AffineComposite::agg_reverse(&run);
        assert_eq!(rev.fwd, run.bwd);
    }

    #[test]
    fn sum_policy_laws() {
        assert_eq!(SumAdd::agg_repeat(&7, 5), 35);
        assert_eq!(SumAdd::act_apply_agg(&10, &3, 4), 22);
        assert_eq!(SumAdd::agg_retract(&SumAdd::agg_combine(&5, &9), &9), 5);
        assert_eq!(SumAdd::act_retract(&SumAdd::act_compose(&2, &3), &3), 2);
    }
}
