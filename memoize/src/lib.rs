//! memoize wraps callables of any arity so that each distinct argument tuple runs the body
//! once. The outcome of that run, a returned value or a panic, is recorded and replayed for
//! every later call with equal arguments.
//!
//! Arguments are keyed through their `serde` serialization, so they only need to implement
//! [`Serialize`](serde::Serialize). A trailing [`Variadic`] parameter takes the role of a
//! rest parameter and contributes one key component per element.
//!
//! Closures are wrapped with [`memoize()`] or [`Memoize::memoize_with`], recursive bodies
//! with [`Memoized::recursive`], and free functions in place with the `#[memoize]` attribute.
//!
//! ```
//! use memoize::{memoize, IntoCallable};
//!
//! let add = memoize(|a: i32, b: i32| a + b).into_callable();
//! assert_eq!(add(1, 2), 3);
//! assert_eq!(add(1, 2), 3);
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod logger;
pub mod memoized;
pub mod outcome;
pub mod signature;
mod macro_rules;

pub use cache::{CacheStats, OutcomeCache};
pub use config::{Concurrency, MemoizeOptions};
pub use error::MemoizeError;
pub use key::{ArgumentKey, KeyBuilder, KeyPart, Variadic};
pub use macros::memoize;
pub use memoized::{memoize, IntoCallable, Memoize, Memoized};
pub use once_cell;
pub use outcome::{Outcome, PanicPayload, Replay};
pub use signature::{ArgumentList, Signature};

/// Builds a [`Variadic`] from a list of elements, `variadic![]` being the empty rest.
#[macro_export]
macro_rules! variadic {
    ($($item:expr),* $(,)?) => {
        $crate::Variadic::new(::std::vec![$($item),*])
    };
}
