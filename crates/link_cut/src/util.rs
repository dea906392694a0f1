//! Arena handle and pending-update plumbing shared by both tree tiers.

use crate::policy::LazyMonoid;

/// Arena index with an explicit nil sentinel kept out of the valid range.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Id(u32);

impl Id {
    pub(crate) const NIL: Self = Self(u32::MAX);

    #[inline(always)]
    pub(crate) fn is_nil(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline(always)]
    pub(crate) fn idx(self) -> usize {
        self.0 as usize
    }
}

#[inline(always)]
pub(crate) fn id(v: usize) -> Id {
    debug_assert!(v < u32::MAX as usize);
    Id(v as u32)
}

/// A pending range update over a splay subtree, not yet pushed to children.
///
/// `Replace` and `Add` are mutually exclusive by construction; an `Add` pushed
/// onto a pending `Replace` folds into the replacement key.
pub(crate) enum Update<P: LazyMonoid> {
    Add(P::Act),
    Replace(P::Key),
}

impl<P: LazyMonoid> Clone for Update<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: LazyMonoid> Copy for Update<P> {}

impl<P: LazyMonoid> Update<P> {
    /// Merge `self` (newer) over an optional already-pending update (older).
    #[inline(always)]
    pub(crate) fn over(self, pending: Option<Self>) -> Self {
        match (self, pending) {
            (upd, None) => upd,
            (Update::Replace(key), _) => Update::Replace(key),
            (Update::Add(act), Some(Update::Add(old))) => {
                Update::Add(P::act_compose(&act, &old))
            }
            (Update::Add(act), Some(Update::Replace(key))) => {
                Update::Replace(P::act_apply_key(&key, &act))
            }
        }
    }
}
