//! Aggregate policies (monoid + lazy action) for the link-cut trees.
//!
//! A policy separates the per-vertex value (`Key`), the combined summary over an
//! ordered run of vertices (`Agg`), and the pending range update (`Act`). `Copy`
//! everywhere keeps node records plain data.

/// A monoid over vertex keys with two lazy range updates: an additive action
/// (`Act`) and a replace-by-key assignment (handled by the trees via
/// [`agg_repeat`](Self::agg_repeat)).
///
/// Required laws (unchecked, the trees trust them):
/// - `agg_merge(agg_unit(), k, agg_unit()) == agg_from_key(k)`
/// - `agg_reverse` distributes over `agg_merge` with the operand order flipped
/// - acts commute with reversal: applying an act to every key of a run and then
///   reversing the run equals reversing first
/// - `act_apply_agg(agg_repeat(k, n), a, n) == agg_repeat(act_apply_key(k, a), n)`
pub trait LazyMonoid {
    type Key: Copy;
    type Agg: Copy;
    type Act: Copy + PartialEq;

    /// Key given to every vertex by the count-only constructor.
    fn key_unit() -> Self::Key;

    fn agg_unit() -> Self::Agg;
    fn agg_from_key(key: &Self::Key) -> Self::Agg;

    /// Aggregate of the run `left + [key] + right`, in path order.
    fn agg_merge(left: &Self::Agg, key: &Self::Key, right: &Self::Agg) -> Self::Agg;

    /// Aggregate of the same run read back-to-front.
    ///
    /// Identity for commutative aggregates; directional aggregates keep both
    /// orientations inside `Agg` and swap them here.
    fn agg_reverse(agg: &Self::Agg) -> Self::Agg;

    /// Aggregate of `len` copies of `key` (replace-assignment over a run).
    fn agg_repeat(key: &Self::Key, len: usize) -> Self::Agg;

    fn act_unit() -> Self::Act;

    /// Compose actions as `new ∘ old` (apply `old` first, then `new`).
    fn act_compose(new: &Self::Act, old: &Self::Act) -> Self::Act;

    fn act_apply_key(key: &Self::Key, act: &Self::Act) -> Self::Key;

    /// Apply `act` to an aggregate covering `len` keys.
    fn act_apply_agg(agg: &Self::Agg, act: &Self::Act, len: usize) -> Self::Agg;
}

/// Policies whose aggregate admits subtraction and whose action forms a group.
///
/// This is the capability gate for subtree aggregation: maintaining virtual
/// (light-child) contributions incrementally requires removing a previously
/// combined child (`agg_retract`) and diffing two action states
/// (`act_retract`). Aggregates like min/max cannot provide it, so the subtree
/// tree simply does not accept them.
///
/// `agg_combine` must be commutative and associative, and must agree with
/// `agg_merge` on ordered runs: subtree folds have no defined vertex order.
/// `act_compose` must be commutative as well; the subtree tree reorders
/// pending actions freely.
pub trait InvertibleLazyMonoid: LazyMonoid {
    /// Combine two set-style aggregates.
    fn agg_combine(a: &Self::Agg, b: &Self::Agg) -> Self::Agg;

    /// Remove a previously combined contribution: `agg_combine(agg_retract(a, b), b) == a`.
    fn agg_retract(agg: &Self::Agg, removed: &Self::Agg) -> Self::Agg;

    /// Difference of two action states: `act_compose(act_retract(outer, inner), inner) == outer`.
    fn act_retract(outer: &Self::Act, inner: &Self::Act) -> Self::Act;
}

/// No aggregate at all: structure and sizes only.
#[derive(Clone, Copy, Debug)]
pub enum NoAgg {}

impl LazyMonoid for NoAgg {
    type Key = ();
    type Agg = ();
    type Act = ();

    #[inline(always)]
    fn key_unit() -> Self::Key {}

    #[inline(always)]
    fn agg_unit() -> Self::Agg {}

    #[inline(always)]
    fn agg_from_key(_key: &Self::Key) -> Self::Agg {}

    #[inline(always)]
    fn agg_merge(_left: &Self::Agg, _key: &Self::Key, _right: &Self::Agg) -> Self::Agg {}

    #[inline(always)]
    fn agg_reverse(_agg: &Self::Agg) -> Self::Agg {}

    #[inline(always)]
    fn agg_repeat(_key: &Self::Key, _len: usize) -> Self::Agg {}

    #[inline(always)]
    fn act_unit() -> Self::Act {}

    #[inline(always)]
    fn act_compose(_new: &Self::Act, _old: &Self::Act) -> Self::Act {}

    #[inline(always)]
    fn act_apply_key(_key: &Self::Key, _act: &Self::Act) -> Self::Key {}

    #[inline(always)]
    fn act_apply_agg(_agg: &Self::Agg, _act: &Self::Act, _len: usize) -> Self::Agg {}
}

impl InvertibleLazyMonoid for NoAgg {
    #[inline(always)]
    fn agg_combine(_a: &Self::Agg, _b: &Self::Agg) -> Self::Agg {}

    #[inline(always)]
    fn agg_retract(_agg: &Self::Agg, _removed: &Self::Agg) -> Self::Agg {}

    #[inline(always)]
    fn act_retract(_outer: &Self::Act, _inner: &Self::Act) -> Self::Act {}
}

/// Vertex sums with range add. Invertible, so usable for subtree queries.
#[derive(Clone, Copy, Debug)]
pub enum SumAdd {}

impl LazyMonoid for SumAdd {
    type Key = i64;
    type Agg = i64;
    type Act = i64;

    #[inline(always)]
    fn key_unit() -> Self::Key {
        0
    }

    #[inline(always)]
    fn agg_unit() -> Self::Agg {
        0
    }

    #[inline(always)]
    fn agg_from_key(key: &Self::Key) -> Self::Agg {
        *key
    }

    #[inline(always)]
    fn agg_merge(left: &Self::Agg, key: &Self::Key, right: &Self::Agg) -> Self::Agg {
        left.wrapping_add(*key).wrapping_add(*right)
    }

    #[inline(always)]
    fn agg_reverse(agg: &Self::Agg) -> Self::Agg {
        *agg
    }

    #[inline(always)]
    fn agg_repeat(key: &Self::Key, len: usize) -> Self::Agg {
        key.wrapping_mul(len as i64)
    }

    #[inline(always)]
    fn act_unit() -> Self::Act {
        0
    }

    #[inline(always)]
    fn act_compose(new: &Self::Act, old: &Self::Act) -> Self::Act {
        new.wrapping_add(*old)
    }

    #[inline(always)]
    fn act_apply_key(key: &Self::Key, act: &Self::Act) -> Self::Key {
        key.wrapping_add(*act)
    }

    #[inline(always)]
    fn act_apply_agg(agg: &Self::Agg, act: &Self::Act, len: usize) -> Self::Agg {
        agg.wrapping_add(act.wrapping_mul(len as i64))
    }
}

impl InvertibleLazyMonoid for SumAdd {
    #[inline(always)]
    fn agg_combine(a: &Self::Agg, b: &Self::Agg) -> Self::Agg {
        a.wrapping_add(*b)
    }

    #[inline(always)]
    fn agg_retract(agg: &Self::Agg, removed: &Self::Agg) -> Self::Agg {
        agg.wrapping_sub(*removed)
    }

    #[inline(always)]
    fn act_retract(outer: &Self::Act, inner: &Self::Act) -> Self::Act {
        outer.wrapping_sub(*inner)
    }
}

/// Path minimum with range add. Not invertible: path tier only.
#[derive(Clone, Copy, Debug)]
pub enum MinAdd {}

impl LazyMonoid for MinAdd {
    type Key = i64;
    type Agg = i64;
    type Act = i64;

    #[inline(always)]
    fn key_unit() -> Self::Key {
        i64::MAX
    }

    #[inline(always)]
    fn agg_unit() -> Self::Agg {
        i64::MAX
    }

    #[inline(always)]
    fn agg_from_key(key: &Self::Key) -> Self::Agg {
        *key
    }

    #[inline(always)]
    fn agg_merge(left: &Self::Agg, key: &Self::Key, right: &Self::Agg) -> Self::Agg {
        (*left).min(*key).min(*right)
    }

    #[inline(always)]
    fn agg_reverse(agg: &Self::Agg) -> Self::Agg {
        *agg
    }

    #[inline(always)]
    fn agg_repeat(key: &Self::Key, _len: usize) -> Self::Agg {
        *key
    }

    #[inline(always)]
    fn act_unit() -> Self::Act {
        0
    }

    #[inline(always)]
    fn act_compose(new: &Self::Act, old: &Self::Act) -> Self::Act {
        new.wrapping_add(*old)
    }

    #[inline(always)]
    fn act_apply_key(key: &Self::Key, act: &Self::Act) -> Self::Key {
        key.saturating_add(*act)
    }

    #[inline(always)]
    fn act_apply_agg(agg: &Self::Agg, act: &Self::Act, _len: usize) -> Self::Agg {
        agg.saturating_add(*act)
    }
}

/// Path maximum with range add. Not invertible: path tier only.
#[derive(Clone, Copy, Debug)]
pub enum MaxAdd {}

impl LazyMonoid for MaxAdd {
    type Key = i64;
    type Agg = i64;
    type Act = i64;

    #[inline(always)]
    fn key_unit() -> Self::Key {
        i64::MIN
    }

    #[inline(always)]
    fn agg_unit() -> Self::Agg {
        i64::MIN
    }

    #[inline(always)]
    fn agg_from_key(key: &Self::Key) -> Self::Agg {
        *key
    }

    #[inline(always)]
    fn agg_merge(left: &Self::Agg, key: &Self::Key, right: &Self::Agg) -> Self::Agg {
        (*left).max(*key).max(*right)
    }

    #[inline(always)]
    fn agg_reverse(agg: &Self::Agg) -> Self::Agg {
        *agg
    }

    #[inline(always)]
    fn agg_repeat(key: &Self::Key, _len: usize) -> Self::Agg {
        *key
    }

    #[inline(always)]
    fn act_unit() -> Self::Act {
        0
    }

    #[inline(always)]
    fn act_compose(new: &Self::Act, old: &Self::Act) -> Self::Act {
        new.wrapping_add(*old)
    }

    #[inline(always)]
    fn act_apply_key(key: &Self::Key, act: &Self::Act) -> Self::Key {
        key.saturating_add(*act)
    }

    #[inline(always)]
    fn act_apply_agg(agg: &Self::Agg, act: &Self::Act, _len: usize) -> Self::Agg {
        agg.saturating_add(*act)
    }
}

/// An affine map `x -> a*x + b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Affine {
    pub a: i64,
    pub b: i64,
}

impl Affine {
    pub const IDENTITY: Self = Self { a: 1, b: 0 };

    /// `self ∘ other` (apply `other` first).
    #[inline(always)]
    pub fn compose(self, other: Self) -> Self {
        Self {
            a: self.a.wrapping_mul(other.a),
            b: self.a.wrapping_mul(other.b).wrapping_add(self.b),
        }
    }

    #[inline(always)]
    pub fn eval(self, x: i64) -> i64 {
        self.a.wrapping_mul(x).wrapping_add(self.b)
    }
}

/// Composition of a run in both orientations, so reversal is a swap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirectedAffine {
    /// First vertex of the run applied first.
    pub fwd: Affine,
    /// Last vertex of the run applied first.
    pub bwd: Affine,
}

/// Non-commutative path aggregate: composition of per-vertex affine maps along
/// the path. No lazy action.
#[derive(Clone, Copy, Debug)]
pub enum AffineComposite {}

impl LazyMonoid for AffineComposite {
    type Key = Affine;
    type Agg = DirectedAffine;
    type Act = ();

    #[inline(always)]
    fn key_unit() -> Self::Key {
        Affine::IDENTITY
    }

    #[inline(always)]
    fn agg_unit() -> Self::Agg {
        DirectedAffine {
            fwd: Affine::IDENTITY,
            bwd: Affine::IDENTITY,
        }
    }

    #[inline(always)]
    fn agg_from_key(key: &Self::Key) -> Self::Agg {
        DirectedAffine {
            fwd: *key,
            bwd: *key,
        }
    }

    #[inline(always)]
    fn agg_merge(left: &Self::Agg, key: &Self::Key, right: &Self::Agg) -> Self::Agg {
        DirectedAffine {
            fwd: right.fwd.compose(key.compose(left.fwd)),
            bwd: left.bwd.compose(key.compose(right.bwd)),
        }
    }

    #[inline(always)]
    fn agg_reverse(agg: &Self::Agg) -> Self::Agg {
        DirectedAffine {
            fwd: agg.bwd,
            bwd: agg.fwd,
        }
    }

    fn agg_repeat(key: &Self::Key, len: usize) -> Self::Agg {
        // A uniform run reads the same from both ends.
        let mut acc = Affine::IDENTITY;
        let mut base = *key;
        let mut n = len;
        while n > 0 {
            if n & 1 == 1 {
                acc = acc.compose(base);
            }
            base = base.compose(base);
            n >>= 1;
        }
        DirectedAffine { fwd: acc, bwd: acc }
    }

    #[inline(always)]
    fn act_unit() -> Self::Act {}

    #[inline(always)]
    fn act_compose(_new: &Self::Act, _old: &Self::Act) -> Self::Act {}

    #[inline(always)]
    fn act_apply_key(key: &Self::Key, _act: &Self::Act) -> Self::Key {
        *key
    }

    #[inline(always)]
    fn act_apply_agg(agg: &Self::Agg, _act: &Self::Act, _len: usize) -> Self::Agg {
        *agg
    }
}
