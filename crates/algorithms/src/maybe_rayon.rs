//! Rayon or sequential iteration, chosen at compile time.
//!
//! With the `parallel` feature (on by default) this re-exports rayon's
//! prelude, so targets of a step are associated and interpolated across
//! threads. Without it, a sequential stand-in provides the same
//! `into_par_iter()` entry point used by the association engine and
//! `interpolate_step`, and the chain after it runs on a single thread.

#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// Sequential stand-in for `rayon::prelude::IntoParallelIterator`.
    ///
    /// `into_par_iter()` forwards to `into_iter()`, so the following
    /// `.map()` and `.collect()` resolve to the standard `Iterator` methods
    /// and collect into the same `BTreeMap`s as the parallel build.
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
