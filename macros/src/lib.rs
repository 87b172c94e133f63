extern crate proc_macro;
mod attr;
mod expansion;
mod macro_utils;

use crate::attr::MemoizeAttr;
use proc_macro::TokenStream;
use proc_macro_error::{abort, proc_macro_error};
use syn::{parse_macro_input, ItemFn};

/// Memoizes a free function in place.
///
/// The function keeps its signature; its body moves into a nested function and every call,
/// including recursive calls by name from inside the body, goes through one process-wide
/// `memoize::Memoized` wrapper.
///
/// Accepted arguments: `relaxed`, `exclusive`, `name = "..."`, `concurrency = "..."`,
/// `capacity = N`.
#[proc_macro_attribute]
#[proc_macro_error]
pub fn memoize(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr_args = parse_macro_input!(attr as MemoizeAttr);
    let item_fn = parse_macro_input!(item as ItemFn);
    let fn_ident = item_fn.sig.ident.clone();
    let stream = match expansion::expand(attr_args, item_fn) {
        Ok(stream) => stream,
        Err(err) => abort!(err.span(), "{}", err),
    };
    macro_utils::submit_fn_to_stream(stream, "memoize", &fn_ident, ".rs")
}
