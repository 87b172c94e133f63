use crate::cache::{CacheStats, OutcomeCache};
use crate::config::{Concurrency, MemoizeOptions};
use crate::key::ArgumentKey;
use crate::outcome::{Outcome, PanicPayload, Replay};
use crate::signature::{ArgumentList, Signature};
use crate::MemoizeError;
use log::{debug, trace, warn};
use std::any::type_name;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

type Body<Args, Out, P> = Box<dyn Fn(&Memoized<Args, Out, P>, Args) -> Out + Send + Sync>;

/// A callable whose outcomes are cached per distinct argument tuple.
///
/// `Args` is the parameter list as a tuple, `Out` the result (a tuple for several results)
/// and `P` the panic payload type that is captured and replayed on failure.
///
/// The body receives the wrapper itself as first argument, so recursive calls made through
/// it are memoized too:
///
/// ```
/// use memoize::Memoized;
///
/// let fib = Memoized::recursive(|fib: &Memoized<(u64,), u64>, (n,): (u64,)| {
///     if n < 2 { n } else { fib.call((n - 1,)) + fib.call((n - 2,)) }
/// });
/// assert_eq!(fib.call((90,)), 2880067194370816120);
/// ```
pub struct Memoized<Args, Out, P = PanicPayload> {
    name: String,
    signature: Signature,
    body: Body<Args, Out, P>,
    cache: OutcomeCache<Out, P>,
}

impl<Args, Out, P> Memoized<Args, Out, P>
where
    Args: ArgumentList,
    Out: Clone,
    P: Replay,
{
    pub fn with_options<F>(options: MemoizeOptions, body: F) -> Self
    where
        F: Fn(&Self, Args) -> Out + Send + Sync + 'static,
    {
        let signature = Signature::of::<Args, Out>();
        let name = options.name.unwrap_or_else(|| type_name::<F>().to_string());
        debug!("memoizing {} as {} with {} concurrency", name, signature, options.concurrency);
        Memoized {
            name,
            signature,
            body: Box::new(body),
            cache: OutcomeCache::new(options.concurrency, options.capacity),
        }
    }

    pub fn recursive<F>(body: F) -> Self
    where
        F: Fn(&Self, Args) -> Out + Send + Sync + 'static,
    {
        Self::with_options(MemoizeOptions::default(), body)
    }

    /// Calls the wrapped body once per distinct `args` and replays the recorded outcome on
    /// every later call, re-raising a captured panic as a panic.
    ///
    /// Arguments that cannot be encoded into a key are passed straight to the body.
    pub fn call(&self, args: Args) -> Out {
        match ArgumentKey::of(&args) {
            Ok(key) => self.dispatch(key, args),
            Err(err) => {
                warn!("{}: calling through uncached, {}", self.name, err);
                (self.body)(self, args)
            }
        }
    }

    /// Like [`call`](Self::call) but reports a key encoding failure instead of calling
    /// through, in which case the body is not run.
    pub fn try_call(&self, args: Args) -> Result<Out, MemoizeError> {
        let key = ArgumentKey::of(&args)?;
        Ok(self.dispatch(key, args))
    }

    pub fn is_cached(&self, args: &Args) -> bool {
        ArgumentKey::of(args).map(|key| self.cache.get(&key).is_some()).unwrap_or(false)
    }

    fn dispatch(&self, key: ArgumentKey, args: Args) -> Out {
        let parts = key.parts();
        let (outcome, hit) = self.cache.resolve(key, || self.invoke(args));
        trace!("{}: {} for {} key parts", self.name, if hit { "hit" } else { "miss" }, parts);
        outcome.replay()
    }

    fn invoke(&self, args: Args) -> Outcome<Out, P> {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.body)(self, args))) {
            Ok(value) => Outcome::Normal(value),
            Err(payload) => match P::capture(payload) {
                Ok(failure) => Outcome::Failed(failure),
                Err(foreign) => {
                    warn!("{}: panic payload is not a {}, propagating without caching", self.name, type_name::<P>());
                    panic::resume_unwind(foreign)
                }
            },
        }
    }
}

impl<Args, Out, P> Memoized<Args, Out, P> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn concurrency(&self) -> Concurrency {
        self.cache.concurrency()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl<Args, Out, P> fmt::Debug for Memoized<Args, Out, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("name", &self.name)
            .field("signature", &self.signature.to_string())
            .field("stats", &self.cache.stats())
            .finish()
    }
}

/// Plain callables of any supported arity that can be wrapped into a [`Memoized`].
pub trait Memoize<Args, Out>: Sized {
    fn memoize_with<P: Replay>(self, options: MemoizeOptions) -> Memoized<Args, Out, P>;

    fn memoize(self) -> Memoized<Args, Out> {
        self.memoize_with::<PanicPayload>(MemoizeOptions::default())
    }
}

/// Wraps a callable with default options.
///
/// Values that are not callables, and callables with parameters that cannot be keyed, are
/// rejected when the wrapper is built:
///
/// ```compile_fail
/// let answer = memoize::memoize(42);
/// ```
///
/// ```compile_fail
/// struct Handle;
/// let open = memoize::memoize(|_: Handle| 1);
/// ```
pub fn memoize<Args, Out, F>(f: F) -> Memoized<Args, Out>
where
    F: Memoize<Args, Out>,
{
    f.memoize()
}

/// Turns a wrapper back into a closure with the parameter list of the wrapped callable.
pub trait IntoCallable {
    type Callable;

    fn into_callable(self) -> Self::Callable;
}
