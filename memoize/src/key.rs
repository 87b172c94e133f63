//! Argument keys.
//!
//! A key is the concatenation of one component per argument, where every component is the
//! `bincode` encoding of the argument prefixed by its length as a little-endian `u64`.
//! Argument types therefore only need to implement [`serde::Serialize`]; `Hash` and `Eq`
//! are never required, which lets floats, nested vectors and arbitrary serializable
//! structs take part in memoization.
//!
//! The length prefix makes the encoding injective at component boundaries, so
//! `("ab", "c")` and `("a", "bc")` always produce different keys.

use crate::signature::ArgumentList;
use crate::MemoizeError;
use serde::Serialize;
use std::fmt;
use std::ops::Deref;

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ArgumentKey {
    bytes: Vec<u8>,
    parts: usize,
}

impl ArgumentKey {
    pub fn of<A: ArgumentList>(args: &A) -> Result<Self, MemoizeError> {
        let mut builder = KeyBuilder::new();
        args.write_key(&mut builder)?;
        Ok(builder.finish())
    }

    /// Number of components, i.e. fixed arguments plus expanded trailing variadic elements.
    pub fn parts(&self) -> usize {
        self.parts
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for ArgumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArgumentKey({} parts, {})", self.parts, self)
    }
}

impl fmt::Display for ArgumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.bytes))
    }
}

#[derive(Default)]
pub struct KeyBuilder {
    bytes: Vec<u8>,
    parts: usize,
}

impl KeyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), MemoizeError> {
        let encoded = bincode::serialize(value)?;
        self.bytes.extend_from_slice(&(encoded.len() as u64).to_le_bytes());
        self.bytes.extend_from_slice(&encoded);
        self.parts += 1;
        Ok(())
    }

    pub fn finish(self) -> ArgumentKey {
        ArgumentKey { bytes: self.bytes, parts: self.parts }
    }
}

/// A single argument's contribution to an [`ArgumentKey`].
///
/// `trailing` is true for the last parameter of a signature, which is the only position
/// where a [`Variadic`] expands into one component per element.
pub trait KeyPart {
    const VARIADIC: bool = false;

    fn write_part(&self, key: &mut KeyBuilder, trailing: bool) -> Result<(), MemoizeError>;
}

impl<T: Serialize> KeyPart for T {
    fn write_part(&self, key: &mut KeyBuilder, _trailing: bool) -> Result<(), MemoizeError> {
        key.push(self)
    }
}

/// Trailing "rest" parameter: zero or more elements of the same type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Variadic<T>(pub Vec<T>);

impl<T> Variadic<T> {
    pub fn new(items: Vec<T>) -> Self {
        Variadic(items)
    }

    pub fn empty() -> Self {
        Variadic(Vec::new())
    }

    pub fn into_inner(self) -> Vec<T> {
        self.0
    }

    /// Splits off the first element, returning it together with the remaining elements.
    pub fn split_head(mut self) -> Option<(T, Variadic<T>)> {
        if self.0.is_empty() {
            None
        } else {
            let first = self.0.remove(0);
            Some((first, self))
        }
    }
}

impl<T> KeyPart for Variadic<T>
where
    T: Serialize,
{
    const VARIADIC: bool = true;

    fn write_part(&self, key: &mut KeyBuilder, trailing: bool) -> Result<(), MemoizeError> {
        if !trailing {
            key.push(&(self.0.len() as u64))?;
        }
        for item in &self.0 {
            key.push(item)?;
        }
        Ok(())
    }
}

impl<T> Deref for Variadic<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> From<Vec<T>> for Variadic<T> {
    fn from(items: Vec<T>) -> Self {
        Variadic(items)
    }
}

impl<T: Clone> From<&[T]> for Variadic<T> {
    fn from(items: &[T]) -> Self {
        Variadic(items.to_vec())
    }
}

impl<T> FromIterator<T> for Variadic<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Variadic(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for Variadic<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key<A: ArgumentList>(args: A) -> ArgumentKey {
        ArgumentKey::of(&args).unwrap()
    }

    #[test]
    fn component_boundaries_never_collide() {
        let left = key(("ab".to_string(), "c".to_string()));
        let right = key(("a".to_string(), "bc".to_string()));
        assert_ne!(left, right);
        assert_eq!(left.parts(), 2);
    }

    #[test]
    fn equal_arguments_give_equal_keys() {
        assert_eq!(key((1u32, 2.5f64, vec![1, 2])), key((1u32, 2.5f64, vec![1, 2])));
        assert_ne!(key((1u32, 2.5f64, vec![1, 2])), key((1u32, 2.5f64, vec![1, 3])));
    }

    #[test]
    fn trailing_variadic_expands_into_components() {
        let k = key(("s".to_string(), Variadic::new(vec!["one".to_string(), "two".to_string()])));
        assert_eq!(k.parts(), 3);
        let none = key(("s".to_string(), Variadic::<String>::empty()));
        assert_eq!(none.parts(), 1);
    }

    #[test]
    fn inner_variadic_groups_cannot_trade_elements() {
        let left = key((Variadic::new(vec![1u8]), Variadic::new(vec![2u8, 3])));
        let right = key((Variadic::new(vec![1u8, 2]), Variadic::new(vec![3u8])));
        assert_ne!(left, right);
    }

    #[test]
    fn variadic_split_head() {
        let v = Variadic::new(vec!["a", "b", "c"]);
        let (head, rest) = v.split_head().unwrap();
        assert_eq!(head, "a");
        assert_eq!(&*rest, &["b", "c"]);
        assert!(Variadic::<u8>::empty().split_head().is_none());
    }

    #[test]
    fn display_is_hex_of_encoding() {
        let k = key((1u8,));
        // u64 LE length 1, then the byte itself
        assert_eq!(k.to_string(), "010000000000000001");
    }
}
