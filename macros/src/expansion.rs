use crate::attr::MemoizeAttr;
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{FnArg, GenericArgument, ItemFn, PathArguments, ReturnType, Signature, Type};

pub fn expand(attr: MemoizeAttr, item: ItemFn) -> syn::Result<TokenStream> {
    validate_signature(&item.sig)?;
    let ItemFn { attrs, vis, sig, block } = item;
    let fn_ident = &sig.ident;

    let mut arg_idents: Vec<Ident> = Vec::new();
    let mut arg_types: Vec<Type> = Vec::new();
    for (i, input) in sig.inputs.iter().enumerate() {
        match input {
            FnArg::Receiver(receiver) => {
                return Err(syn::Error::new_spanned(receiver, "#[memoize] cannot be applied to methods taking `self`"));
            }
            FnArg::Typed(pat_type) => {
                ensure_owned(&pat_type.ty)?;
                arg_idents.push(format_ident!("__memoize_arg{}", i));
                arg_types.push((*pat_type.ty).clone());
            }
        }
    }

    let output: Type = match &sig.output {
        ReturnType::Default => syn::parse_quote!(()),
        ReturnType::Type(_, ty) => {
            ensure_owned(ty)?;
            (**ty).clone()
        }
    };

    let body_ident = format_ident!("__memoized_{}", fn_ident);
    let mut body_sig = sig.clone();
    body_sig.ident = body_ident.clone();

    let mut outer_sig = sig.clone();
    outer_sig.inputs = arg_idents
        .iter()
        .zip(arg_types.iter())
        .map(|(ident, ty)| -> FnArg { syn::parse_quote!(#ident: #ty) })
        .collect::<Punctuated<FnArg, syn::token::Comma>>();

    let options = attr.options_tokens(&fn_ident.to_string());

    Ok(quote! {
        #(#attrs)*
        #vis #outer_sig {
            #body_sig #block

            static MEMOIZED: ::memoize::once_cell::sync::Lazy<::memoize::Memoized<(#(#arg_types,)*), #output>> =
                ::memoize::once_cell::sync::Lazy::new(|| {
                    ::memoize::Memoized::with_options(#options, |_, (#(#arg_idents,)*): (#(#arg_types,)*)| {
                        #body_ident(#(#arg_idents),*)
                    })
                });

            MEMOIZED.call((#(#arg_idents,)*))
        }
    })
}

fn validate_signature(sig: &Signature) -> syn::Result<()> {
    if let Some(token) = &sig.asyncness {
        return Err(syn::Error::new(token.span(), "#[memoize] does not support async functions"));
    }
    if let Some(token) = &sig.constness {
        return Err(syn::Error::new(token.span(), "#[memoize] does not support const functions"));
    }
    if let Some(token) = &sig.unsafety {
        return Err(syn::Error::new(token.span(), "#[memoize] does not support unsafe functions"));
    }
    if let Some(abi) = &sig.abi {
        return Err(syn::Error::new_spanned(abi, "#[memoize] does not support extern functions"));
    }
    if let Some(variadic) = &sig.variadic {
        return Err(syn::Error::new_spanned(variadic, "C variadics cannot be memoized, use a trailing `memoize::Variadic<T>` parameter"));
    }
    if !sig.generics.params.is_empty() || sig.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(&sig.generics, "generic functions cannot be memoized, every instantiation would need its own cache"));
    }
    Ok(())
}

/// Arguments and results live in a `'static` cache, so borrowed or opaque types are rejected.
fn ensure_owned(ty: &Type) -> syn::Result<()> {
    match ty {
        Type::Reference(reference) => {
            let is_static = reference.lifetime.as_ref().is_some_and(|lt| lt.ident == "static");
            if is_static {
                ensure_owned(&reference.elem)
            } else {
                Err(syn::Error::new_spanned(ty, "memoized functions must take and return owned values"))
            }
        }
        Type::ImplTrait(_) => Err(syn::Error::new_spanned(ty, "`impl Trait` cannot be memoized, name the concrete type")),
        Type::Infer(_) => Err(syn::Error::new_spanned(ty, "memoized functions need explicit types")),
        Type::Paren(paren) => ensure_owned(&paren.elem),
        Type::Group(group) => ensure_owned(&group.elem),
        Type::Array(array) => ensure_owned(&array.elem),
        Type::Slice(slice) => ensure_owned(&slice.elem),
        Type::Tuple(tuple) => tuple.elems.iter().try_for_each(ensure_owned),
        Type::Path(path) => path
            .path
            .segments
            .iter()
            .filter_map(|segment| match &segment.arguments {
                PathArguments::AngleBracketed(args) => Some(args),
                _ => None,
            })
            .flat_map(|args| args.args.iter())
            .try_for_each(|arg| match arg {
                GenericArgument::Type(inner) => ensure_owned(inner),
                GenericArgument::Lifetime(lt) if lt.ident != "static" => {
                    Err(syn::Error::new(lt.span(), "memoized functions must take and return owned values"))
                }
                _ => Ok(()),
            }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::{Item, Stmt};

    fn expand_ok(attr: &str, item: ItemFn) -> ItemFn {
        let attr: MemoizeAttr = syn::parse_str(attr).unwrap();
        let tokens = expand(attr, item).unwrap();
        syn::parse2::<ItemFn>(tokens).unwrap()
    }

    fn expand_err(item: ItemFn) -> String {
        expand(MemoizeAttr::default(), item).unwrap_err().to_string()
    }

    #[test]
    fn keeps_outer_signature_shape() {
        let out = expand_ok("", syn::parse_quote! {
            /// docs survive
            pub fn concat(s0: String, rest: memoize::Variadic<String>) -> String {
                s0
            }
        });
        assert_eq!(out.sig.ident, "concat");
        assert_eq!(out.sig.inputs.len(), 2);
        assert!(matches!(out.sig.output, ReturnType::Type(..)));
        assert!(out.attrs.iter().any(|a| a.path().is_ident("doc")));
        assert!(matches!(out.vis, syn::Visibility::Public(_)));
    }

    #[test]
    fn nests_original_body_and_static_cache() {
        let out = expand_ok("relaxed", syn::parse_quote! {
            fn fib((n, _tag): (u64, u8)) -> u64 { n }
        });
        let items: Vec<&Item> = out.block.stmts.iter().filter_map(|stmt| match stmt {
            Stmt::Item(item) => Some(item),
            _ => None,
        }).collect();
        assert!(items.iter().any(|item| matches!(item, Item::Fn(f) if f.sig.ident == "__memoized_fib")));
        assert!(items.iter().any(|item| matches!(item, Item::Static(s) if s.ident == "MEMOIZED")));
        let rendered = quote!(#out).to_string();
        assert!(rendered.contains("Relaxed"));
    }

    #[test]
    fn unit_result_for_missing_return_type() {
        let out = expand_ok("", syn::parse_quote! { fn touch(i: i32) { let _ = i; } });
        let static_ty = out.block.stmts.iter().find_map(|stmt| match stmt {
            Stmt::Item(Item::Static(s)) => Some(s.ty.clone()),
            _ => None,
        }).unwrap();
        let rendered = quote!(#static_ty).to_string().replace(' ', "");
        assert!(rendered.ends_with("Memoized<(i32,),()>>"));
    }

    #[test]
    fn rejects_unsupported_functions() {
        assert!(expand_err(syn::parse_quote! { fn f<T>(t: T) -> u8 { 0 } }).contains("generic"));
        assert!(expand_err(syn::parse_quote! { async fn f(i: u8) -> u8 { i } }).contains("async"));
        assert!(expand_err(syn::parse_quote! { fn f(s: &str) -> usize { s.len() } }).contains("owned"));
        assert!(expand_err(syn::parse_quote! { fn f(v: Vec<&str>) -> usize { v.len() } }).contains("owned"));
        assert!(expand_err(syn::parse_quote! { fn f(i: u8) -> impl Clone { i } }).contains("impl Trait"));
    }

    #[test]
    fn rejects_self_receivers() {
        let item: ItemFn = syn::parse_quote! { fn f(&self, i: u8) -> u8 { i } };
        assert!(expand_err(item).contains("self"));
    }

    #[test]
    fn accepts_static_references() {
        let out = expand_ok("", syn::parse_quote! { fn greet(who: &'static str) -> String { who.to_string() } });
        assert_eq!(out.sig.inputs.len(), 1);
    }
}
