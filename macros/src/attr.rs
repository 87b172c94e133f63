use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{Expr, ExprLit, Lit, LitInt, LitStr, Meta};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConcurrencyArg {
    Exclusive,
    Relaxed,
}

impl ConcurrencyArg {
    fn parse_str(lit: &LitStr) -> syn::Result<Self> {
        match lit.value().to_lowercase().as_str() {
            "exclusive" => Ok(ConcurrencyArg::Exclusive),
            "relaxed" => Ok(ConcurrencyArg::Relaxed),
            other => Err(syn::Error::new_spanned(lit, format!("unknown concurrency `{}`, expected `exclusive` or `relaxed`", other))),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoizeAttr {
    pub name: Option<String>,
    pub concurrency: Option<ConcurrencyArg>,
    pub capacity: Option<usize>,
}

impl MemoizeAttr {
    fn set_concurrency(&mut self, value: ConcurrencyArg, meta: &Meta) -> syn::Result<()> {
        if self.concurrency.replace(value).is_some() {
            return Err(syn::Error::new_spanned(meta, "concurrency is given more than once"));
        }
        Ok(())
    }

    /// `memoize::MemoizeOptions` expression for the generated wrapper, named after the
    /// function unless a name was given.
    pub fn options_tokens(&self, default_name: &str) -> TokenStream {
        let name = self.name.clone().unwrap_or_else(|| default_name.to_string());
        let concurrency = match self.concurrency.unwrap_or(ConcurrencyArg::Exclusive) {
            ConcurrencyArg::Exclusive => quote!(::memoize::Concurrency::Exclusive),
            ConcurrencyArg::Relaxed => quote!(::memoize::Concurrency::Relaxed),
        };
        let capacity = self.capacity.unwrap_or(0);
        quote! {
            ::memoize::MemoizeOptions::default()
                .named(#name)
                .concurrency(#concurrency)
                .capacity(#capacity)
        }
    }
}

fn lit_str(expr: &Expr) -> syn::Result<&LitStr> {
    match expr {
        Expr::Lit(ExprLit { lit: Lit::Str(lit), .. }) => Ok(lit),
        _ => Err(syn::Error::new_spanned(expr, "Expected a string literal")),
    }
}

fn lit_int(expr: &Expr) -> syn::Result<&LitInt> {
    match expr {
        Expr::Lit(ExprLit { lit: Lit::Int(lit), .. }) => Ok(lit),
        _ => Err(syn::Error::new_spanned(expr, "Expected an integer literal")),
    }
}

impl Parse for MemoizeAttr {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut attr = MemoizeAttr::default();
        let metas = Punctuated::<Meta, Comma>::parse_terminated(input)?;
        for meta in metas.iter() {
            match meta {
                Meta::Path(path) if path.is_ident("relaxed") => attr.set_concurrency(ConcurrencyArg::Relaxed, meta)?,
                Meta::Path(path) if path.is_ident("exclusive") => attr.set_concurrency(ConcurrencyArg::Exclusive, meta)?,
                Meta::NameValue(nv) if nv.path.is_ident("concurrency") => {
                    let value = ConcurrencyArg::parse_str(lit_str(&nv.value)?)?;
                    attr.set_concurrency(value, meta)?
                }
                Meta::NameValue(nv) if nv.path.is_ident("name") => attr.name = Some(lit_str(&nv.value)?.value()),
                Meta::NameValue(nv) if nv.path.is_ident("capacity") => attr.capacity = Some(lit_int(&nv.value)?.base10_parse()?),
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "unknown #[memoize] argument, expected `relaxed`, `exclusive`, `name`, `concurrency` or `capacity`",
                    ))
                }
            }
        }
        Ok(attr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_attribute() {
        let attr: MemoizeAttr = syn::parse_str("").unwrap();
        assert!(attr.name.is_none());
        assert!(attr.concurrency.is_none());
        assert!(attr.capacity.is_none());
    }

    #[test]
    fn all_arguments() {
        let attr: MemoizeAttr = syn::parse_str(r#"name = "fib", concurrency = "Relaxed", capacity = 128"#).unwrap();
        assert_eq!(attr.name.as_deref(), Some("fib"));
        assert_eq!(attr.concurrency, Some(ConcurrencyArg::Relaxed));
        assert_eq!(attr.capacity, Some(128));
    }

    #[test]
    fn bare_policy_flag() {
        let attr: MemoizeAttr = syn::parse_str("relaxed").unwrap();
        assert_eq!(attr.concurrency, Some(ConcurrencyArg::Relaxed));
    }

    #[test]
    fn rejects_unknown_and_duplicate_arguments() {
        assert!(syn::parse_str::<MemoizeAttr>("ttl = 5").is_err());
        assert!(syn::parse_str::<MemoizeAttr>("relaxed, exclusive").is_err());
        assert!(syn::parse_str::<MemoizeAttr>(r#"concurrency = "sometimes""#).is_err());
        assert!(syn::parse_str::<MemoizeAttr>(r#"capacity = "8""#).is_err());
    }

    #[test]
    fn options_default_to_function_name() {
        let tokens = MemoizeAttr::default().options_tokens("concat").to_string();
        assert!(tokens.contains("\"concat\""));
        assert!(tokens.contains("Exclusive"));
    }
}
