use crate::config::MemoizeOptions;
use crate::key::{KeyBuilder, KeyPart};
use crate::memoized::{IntoCallable, Memoize, Memoized};
use crate::outcome::Replay;
use crate::signature::ArgumentList;
use crate::MemoizeError;
use std::any::type_name;

macro_rules! impl_arity {
    ($len:expr; $($idx:tt => $A:ident $a:ident),*) => {
        impl<$($A: KeyPart),*> ArgumentList for ($($A,)*) {
            fn param_types() -> Vec<&'static str> {
                vec![$(type_name::<$A>()),*]
            }

            fn is_variadic() -> bool {
                let flags: [bool; $len] = [$(<$A as KeyPart>::VARIADIC),*];
                flags.last().copied().unwrap_or(false)
            }

            #[allow(unused_variables)]
            fn write_key(&self, key: &mut KeyBuilder) -> Result<(), MemoizeError> {
                $( self.$idx.write_part(key, $idx + 1 == $len)?; )*
                Ok(())
            }
        }

        impl<Func, Out, $($A),*> Memoize<($($A,)*), Out> for Func
        where
            Func: Fn($($A),*) -> Out + Send + Sync + 'static,
            ($($A,)*): ArgumentList,
            $($A: 'static,)*
            Out: Clone + 'static,
        {
            fn memoize_with<P: Replay>(self, options: MemoizeOptions) -> Memoized<($($A,)*), Out, P> {
                Memoized::with_options(options, move |_, ($($a,)*)| self($($a),*))
            }
        }

        impl<Out, P, $($A),*> IntoCallable for Memoized<($($A,)*), Out, P>
        where
            ($($A,)*): ArgumentList,
            $($A: 'static,)*
            Out: Clone + 'static,
            P: Replay,
            Self: Send + Sync,
        {
            type Callable = Box<dyn Fn($($A),*) -> Out + Send + Sync>;

            fn into_callable(self) -> Self::Callable {
                Box::new(move |$($a),*| self.call(($($a,)*)))
            }
        }
    };
}

impl_arity!(0;);
impl_arity!(1; 0 => A0 a0);
impl_arity!(2; 0 => A0 a0, 1 => A1 a1);
impl_arity!(3; 0 => A0 a0, 1 => A1 a1, 2 => A2 a2);
impl_arity!(4; 0 => A0 a0, 1 => A1 a1, 2 => A2 a2, 3 => A3 a3);
impl_arity!(5; 0 => A0 a0, 1 => A1 a1, 2 => A2 a2, 3 => A3 a3, 4 => A4 a4);
impl_arity!(6; 0 => A0 a0, 1 => A1 a1, 2 => A2 a2, 3 => A3 a3, 4 => A4 a4, 5 => A5 a5);
impl_arity!(7; 0 => A0 a0, 1 => A1 a1, 2 => A2 a2, 3 => A3 a3, 4 => A4 a4, 5 => A5 a5, 6 => A6 a6);
impl_arity!(8; 0 => A0 a0, 1 => A1 a1, 2 => A2 a2, 3 => A3 a3, 4 => A4 a4, 5 => A5 a5, 6 => A6 a6, 7 => A7 a7);
impl_arity!(9; 0 => A0 a0, 1 => A1 a1, 2 => A2 a2, 3 => A3 a3, 4 => A4 a4, 5 => A5 a5, 6 => A6 a6, 7 => A7 a7, 8 => A8 a8);
impl_arity!(10; 0 => A0 a0, 1 => A1 a1, 2 => A2 a2, 3 => A3 a3, 4 => A4 a4, 5 => A5 a5, 6 => A6 a6, 7 => A7 a7, 8 => A8 a8, 9 => A9 a9);
impl_arity!(11; 0 => A0 a0, 1 => A1 a1, 2 => A2 a2, 3 => A3 a3, 4 => A4 a4, 5 => A5 a5, 6 => A6 a6, 7 => A7 a7, 8 => A8 a8, 9 => A9 a9, 10 => A10 a10);
impl_arity!(12; 0 => A0 a0, 1 => A1 a1, 2 => A2 a2, 3 => A3 a3, 4 => A4 a4, 5 => A5 a5, 6 => A6 a6, 7 => A7 a7, 8 => A8 a8, 9 => A9 a9, 10 => A10 a10, 11 => A11 a11);
