use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, Pat, PatType, ReturnType};

#[derive(Eq, PartialEq)]
enum ProcLogLevel {
    Dbgrm,
    Debug,
}

// #[log(dbgrm)] or #[log(debug)]
//
// #[log(dbgrm)] logs the function arguments and return value at DBGRM level
// #[log(dbgrm)] is only applicable to functions whose parameters and return type implement Debug
//
// #[log(debug)] logs the argument names and types at DEBUG level
//
// Note: unless the running threshold is DBGRM, #[log(dbgrm)] behaves like #[log(debug)]
//
// Records go through ring_logger::log! with the module path as component.

fn typed_args(item: &ItemFn) -> impl Iterator<Item = (&syn::Ident, &PatType)> {
    item.sig.inputs.iter().filter_map(|arg| {
        if let FnArg::Typed(pat_type) = arg {
            if let Pat::Ident(ref pat_ident) = *pat_type.pat {
                return Some((&pat_ident.ident, pat_type));
            }
        }
        None
    })
}

fn mentions_impl(ty: &syn::Type) -> bool {
    fn walk(tokens: TokenStream2) -> bool {
        tokens.into_iter().any(|token| match token {
            proc_macro2::TokenTree::Ident(ident) => ident == "impl",
            proc_macro2::TokenTree::Group(group) => walk(group.stream()),
            _ => false,
        })
    }
    walk(quote! { #ty })
}

fn joined(parts: Vec<TokenStream2>) -> TokenStream2 {
    quote! { <[::std::string::String]>::join(&[#(#parts),*], ", ") }
}

#[proc_macro_attribute]
pub fn log(attr: TokenStream, item: TokenStream) -> TokenStream {
    let log_level = attr.to_string().trim_matches('"').to_lowercase();
    let log_level = match log_level.as_str() {
        "dbgrm" => ProcLogLevel::Dbgrm,
        "debug" => ProcLogLevel::Debug,
        other => {
            let message = format!("invalid log level `{}`, expected `dbgrm` or `debug`", other);
            return syn::Error::new(Span::call_site(), message)
                .to_compile_error()
                .into();
        }
    };

    let input_fn: ItemFn = parse_macro_input!(item as ItemFn);
    let fn_name = &input_fn.sig.ident;
    let is_async = input_fn.sig.asyncness.is_some();
    let fn_block = &input_fn.block;

    // "name: Type" for every named argument
    let log_args_type = joined(
        typed_args(&input_fn)
            .map(|(ident, pat_type)| {
                let ty = &pat_type.ty;
                quote! { format!("{}: {}", stringify!(#ident), stringify!(#ty)) }
            })
            .collect(),
    );
    // "name: value" for every named argument
    let log_args_value = joined(
        typed_args(&input_fn)
            .map(|(ident, _)| quote! { format!("{}: {:?}", stringify!(#ident), #ident) })
            .collect(),
    );

    // `impl Trait` cannot name a local binding, so such results stay inferred.
    let result_binding = match &input_fn.sig.output {
        ReturnType::Default => quote! { result: () },
        ReturnType::Type(_, ty) if mentions_impl(ty) => quote! { result },
        ReturnType::Type(_, ty) => quote! { result: #ty },
    };
    let call_original_fn = if is_async {
        quote! { let result = (async move #fn_block).await; }
    } else {
        quote! { let #result_binding = (move || #fn_block)(); }
    };

    let component = quote! { module_path!() };
    let debug_enter = quote! {
        ::ring_logger::log!(#component, "DEBUG", "Function call %s(%s)", stringify!(#fn_name), #log_args_type);
    };
    let debug_exit = quote! {
        ::ring_logger::log!(#component, "DEBUG", "Function %s returned.", stringify!(#fn_name));
    };

    let (log_enter, log_exit) = match log_level {
        ProcLogLevel::Dbgrm => (
            quote! {
                if ::ring_logger::threshold() == Some(::ring_logger::Level::Dbgrm) {
                    ::ring_logger::log!(#component, "DBGRM", "Function call %s(%s)", stringify!(#fn_name), #log_args_value);
                }
                else {
                    #debug_enter
                }
            },
            quote! {
                if ::ring_logger::threshold() == Some(::ring_logger::Level::Dbgrm) {
                    ::ring_logger::log!(#component, "DBGRM", "Function %s returned: %s", stringify!(#fn_name), format!("{:?}", result));
                }
                else {
                    #debug_exit
                }
            },
        ),
        ProcLogLevel::Debug => (debug_enter, debug_exit),
    };

    let attributes = &input_fn.attrs;
    let visibility = &input_fn.vis;
    let signature = &input_fn.sig;

    let expanded = quote! {
        #(#attributes)* #visibility #signature {
            #log_enter
            #call_original_fn
            #log_exit
            return result;
        }
    };

    TokenStream::from(expanded)
}
