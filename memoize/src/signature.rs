use crate::key::KeyBuilder;
use crate::MemoizeError;
use std::any::type_name;
use std::fmt;

/// Argument tuple of a memoized callable.
///
/// Implemented for tuples of up to twelve [`KeyPart`](crate::KeyPart) elements; the unit
/// tuple stands for a callable without parameters.
pub trait ArgumentList: Sized {
    fn param_types() -> Vec<&'static str>;
    fn is_variadic() -> bool;
    fn write_key(&self, key: &mut KeyBuilder) -> Result<(), MemoizeError>;
}

/// Shape of a wrapped callable, recorded once when the wrapper is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<&'static str>,
    pub variadic: bool,
    pub results: Vec<&'static str>,
}

impl Signature {
    pub fn of<Args: ArgumentList, Out>() -> Self {
        Signature {
            params: Args::param_types(),
            variadic: Args::is_variadic(),
            results: split_tuple_type(type_name::<Out>()),
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn(")?;
        let last = self.params.len().saturating_sub(1);
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if self.variadic && i == last {
                write!(f, "...{}", variadic_element(param))?;
            } else {
                write!(f, "{}", param)?;
            }
        }
        write!(f, ")")?;
        match self.results.as_slice() {
            [] => Ok(()),
            [single] => write!(f, " -> {}", single),
            many => write!(f, " -> ({})", many.join(", ")),
        }
    }
}

fn variadic_element(param: &'static str) -> &'static str {
    param
        .find('<')
        .and_then(|open| param.rfind('>').map(|close| &param[open + 1..close]))
        .unwrap_or(param)
}

/// Splits a tuple type name into its top-level element names; `()` has none and any
/// non-tuple type is a single result.
pub(crate) fn split_tuple_type(name: &'static str) -> Vec<&'static str> {
    let trimmed = name.trim();
    if trimmed == "()" {
        return Vec::new();
    }
    let inner = match trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) if is_balanced(inner) => inner,
        _ => return vec![trimmed],
    };
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let tail = inner[start..].trim();
    if !tail.is_empty() {
        parts.push(tail);
    }
    parts
}

fn is_balanced(s: &str) -> bool {
    let mut depth = 0i32;
    for c in s.chars() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return false;
        }
    }
    depth == 0
}
