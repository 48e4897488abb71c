use super::*;
use crate::primitive_set::PrimitiveSet;

/// Combines every primitive of a [`PrimitiveSet`] into one primitive of the same category.
pub trait PrimitiveWrapper<P: ?Sized>: Send + Sync {
    fn wrap(&self, primitives: PrimitiveSet<P>) -> Result<Box<P>>;
}
