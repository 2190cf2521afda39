//! Empty-set re-check after convergence.
//!
//! Neither ddmin nor the probabilistic algorithm ever asks about the empty
//! set. [`ZeroTestDd`] runs its inner algorithm and then issues exactly one
//! extra test with nothing retained; if the property still holds, every
//! item is reported as deleted.

use tracing::{debug, instrument};

use crate::dd::{DdAlgorithm, DdResult, accepts};
use crate::error::DdError;
use crate::outcome::PropertyTester;

/// Decorator adding the zero test to any [`DdAlgorithm`].
#[derive(Debug, Clone, Default)]
pub struct ZeroTestDd<A> {
    inner: A,
}

impl<A> ZeroTestDd<A> {
    #[must_use]
    pub const fn new(inner: A) -> Self {
        Self { inner }
    }

    #[must_use]
    pub const fn inner(&self) -> &A {
        &self.inner
    }

    #[must_use]
    pub fn into_inner(self) -> A {
        self.inner
    }
}

impl<C, T, A> DdAlgorithm<C, T> for ZeroTestDd<A>
where
    T: Clone,
    A: DdAlgorithm<C, T>,
{
    #[instrument(name = "zero_test", skip_all)]
    fn minimize(
        &mut self,
        ctx: &mut C,
        items: Vec<T>,
        tester: &mut dyn PropertyTester<C, T>,
    ) -> Result<DdResult<T>, DdError> {
        let input = items.clone();
        let result = self.inner.minimize(ctx, items, tester)?;
        if result.retained.is_empty() {
            return Ok(result);
        }

        if accepts(ctx, tester, &input, &[])? {
            debug!(items = input.len(), "property holds without any item");
            return Ok(DdResult {
                retained: Vec::new(),
                deleted: input,
            });
        }
        Ok(result)
    }
}
