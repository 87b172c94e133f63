use std::any::{type_name, Any};
use std::fmt;
use std::panic;
use std::sync::Arc;

/// Recorded result of one distinct argument key.
#[derive(Clone, Debug)]
pub enum Outcome<T, P = PanicPayload> {
    Normal(T),
    Failed(P),
}

impl<T: Clone, P: Replay> Outcome<T, P> {
    /// Hands the stored result back to the caller. A `Failed` outcome is raised again as a
    /// panic carrying a fresh copy of the captured payload, so it unwinds through the caller
    /// exactly like the first failure did.
    ///
    /// The panic is raised with `resume_unwind`, which does not invoke the panic hook: a
    /// replayed failure prints no `panicked at` message, even when it ends the thread. The
    /// payload seen by `catch_unwind` or `JoinHandle::join` is the same as on the first call.
    pub fn replay(&self) -> T {
        match self {
            Outcome::Normal(value) => value.clone(),
            Outcome::Failed(payload) => panic::resume_unwind(payload.replay()),
        }
    }
}

impl<T, P> Outcome<T, P> {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn normal(&self) -> Option<&T> {
        match self {
            Outcome::Normal(value) => Some(value),
            Outcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&P> {
        match self {
            Outcome::Normal(_) => None,
            Outcome::Failed(payload) => Some(payload),
        }
    }
}

/// A panic payload that can be captured once and raised any number of times.
///
/// `capture` hands back the original payload untouched when it is not of this type, in
/// which case the dispatcher lets the panic continue without recording an outcome.
pub trait Replay: Send + Sync + Sized + 'static {
    fn capture(payload: Box<dyn Any + Send>) -> Result<Self, Box<dyn Any + Send>>;
    fn replay(&self) -> Box<dyn Any + Send>;
}

/// Implements [`Replay`] for `Clone` payload types, raised with `std::panic::panic_any`.
#[macro_export]
macro_rules! impl_replay {
    ($($t:ty),* $(,)?) => {
        $(
            impl $crate::Replay for $t {
                fn capture(
                    payload: ::std::boxed::Box<dyn ::std::any::Any + ::std::marker::Send>,
                ) -> ::std::result::Result<Self, ::std::boxed::Box<dyn ::std::any::Any + ::std::marker::Send>> {
                    payload.downcast::<$t>().map(|value| *value)
                }

                fn replay(&self) -> ::std::boxed::Box<dyn ::std::any::Any + ::std::marker::Send> {
                    ::std::boxed::Box::new(::std::clone::Clone::clone(self))
                }
            }
        )*
    };
}

impl_replay!(
    &'static str, String, bool, char,
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64,
);

trait ReplayValue: Any + Send + Sync {
    fn boxed(&self) -> Box<dyn Any + Send>;
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Clone + Send + Sync> ReplayValue for T {
    fn boxed(&self) -> Box<dyn Any + Send> {
        Box::new(self.clone())
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// Default failure type: captures the payloads produced by `panic!` (`&'static str`,
/// `String`) and by `panic_any` with any primitive scalar.
#[derive(Clone)]
pub struct PanicPayload {
    value: Arc<dyn ReplayValue>,
}

impl PanicPayload {
    pub fn new<T: Any + Clone + Send + Sync>(value: T) -> Self {
        PanicPayload { value: Arc::new(value) }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.value).as_any().downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }

    pub fn message(&self) -> Option<&str> {
        self.downcast_ref::<&'static str>()
            .copied()
            .or_else(|| self.downcast_ref::<String>().map(String::as_str))
    }

    pub fn type_name(&self) -> &'static str {
        (*self.value).type_name()
    }
}

macro_rules! capture_first_of {
    ($payload:ident; $($t:ty),*) => {{
        $(
            let $payload = match $payload.downcast::<$t>() {
                Ok(value) => return Ok(PanicPayload::new(*value)),
                Err(other) => other,
            };
        )*
        Err($payload)
    }};
}

impl Replay for PanicPayload {
    fn capture(payload: Box<dyn Any + Send>) -> Result<Self, Box<dyn Any + Send>> {
        capture_first_of!(payload;
            &'static str, String, bool, char,
            i8, i16, i32, i64, i128, isize,
            u8, u16, u32, u64, u128, usize,
            f32, f64
        )
    }

    fn replay(&self) -> Box<dyn Any + Send> {
        (*self.value).boxed()
    }
}

impl fmt::Debug for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(msg) => write!(f, "PanicPayload({:?})", msg),
            None => write!(f, "PanicPayload(<{}>)", self.type_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Custom(u8);

    #[test]
    fn captures_panic_macro_payloads() {
        let str_payload = PanicPayload::capture(Box::new("boom")).unwrap();
        assert_eq!(str_payload.message(), Some("boom"));
        let string_payload = PanicPayload::capture(Box::new(format!("boom {}", 2))).unwrap();
        assert_eq!(string_payload.message(), Some("boom 2"));
    }

    #[test]
    fn replays_same_type_and_value() {
        let payload = PanicPayload::capture(Box::new(7usize)).unwrap();
        for _ in 0..3 {
            let raised = payload.replay();
            assert_eq!(raised.downcast_ref::<usize>(), Some(&7));
        }
        assert!(payload.is::<usize>());
        assert!(!payload.is::<u32>());
    }

    #[test]
    fn foreign_payload_is_handed_back() {
        let original = PanicPayload::capture(Box::new(Custom(3))).unwrap_err();
        assert_eq!(original.downcast_ref::<Custom>(), Some(&Custom(3)));
    }

    #[test]
    fn scalar_replay_impls() {
        assert_eq!(<i32 as Replay>::capture(Box::new(5i32)).unwrap(), 5);
        assert!(<i32 as Replay>::capture(Box::new(5u8)).is_err());
        let replayed = Replay::replay(&String::from("x"));
        assert_eq!(replayed.downcast_ref::<String>().map(String::as_str), Some("x"));
    }

    #[test]
    fn replay_of_failed_outcome_unwinds() {
        let outcome: Outcome<u8> = Outcome::Failed(PanicPayload::new(42i64));
        let err = panic::catch_unwind(panic::AssertUnwindSafe(|| outcome.replay())).unwrap_err();
        assert_eq!(err.downcast_ref::<i64>(), Some(&42));
        assert!(outcome.is_failed());
        assert!(outcome.normal().is_none());
    }

    #[test]
    fn replayed_failure_ends_thread_with_same_payload() {
        let outcome = Arc::new(Outcome::<u8>::Failed(PanicPayload::new("worker failed")));
        for _ in 0..2 {
            let outcome = Arc::clone(&outcome);
            let err = std::thread::spawn(move || outcome.replay()).join().unwrap_err();
            assert_eq!(err.downcast_ref::<&'static str>(), Some(&"worker failed"));
        }
    }
}
