//! Expansion entry point for `#[deferred]`.

use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::{Error, Item, Result};

use crate::config::Config;
use crate::driver;

/// Expand `#[deferred(args)] input`.
///
/// On a transformation error the original item is emitted next to the
/// error, so the failure is reported once instead of cascading into
/// "cannot find function" errors at every call site.
pub fn expand(args: TokenStream, input: TokenStream) -> TokenStream {
    let item: Item = match syn::parse2(input.clone()) {
        Ok(item) => item,
        Err(e) => return e.to_compile_error(),
    };
    match transform(args, item) {
        Ok(tokens) => tokens,
        Err(e) => {
            let error = e.to_compile_error();
            quote! {
                #error
                #input
            }
        }
    }
}

fn transform(args: TokenStream, mut item: Item) -> Result<TokenStream> {
    let config = Config::parse(args)?;
    check_target(&item)?;
    driver::transform_item(&mut item, &config)?;
    Ok(item.into_token_stream())
}

/// Only items with bodies can hold registrations.
fn check_target(item: &Item) -> Result<()> {
    match item {
        Item::Fn(_) | Item::Impl(_) | Item::Trait(_) => Ok(()),
        Item::Mod(module) if module.content.is_some() => Ok(()),
        Item::Mod(module) => Err(Error::new_spanned(
            module,
            "`#[deferred]` on a module requires an inline body: `mod name { ... }`",
        )),
        other => Err(Error::new_spanned(
            other,
            "`#[deferred]` can only be applied to a function, impl block, trait or inline module",
        )),
    }
}
