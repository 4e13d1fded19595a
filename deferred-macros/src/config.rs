//! Attribute arguments.
//!
//! - `#[deferred]` - runtime reachable at `::deferred`
//! - `#[deferred(crate = "path")]` - runtime re-exported or renamed

use proc_macro2::TokenStream;
use syn::parse::Parser;
use syn::{LitStr, Path, Result};

/// Settings for one expansion.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path at which the runtime crate is reachable from the expansion site.
    pub runtime: Path,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runtime: syn::parse_quote!(::deferred),
        }
    }
}

impl Config {
    /// Parse the attribute's argument list.
    pub fn parse(args: TokenStream) -> Result<Self> {
        let mut runtime: Option<Path> = None;
        let parser = syn::meta::parser(|meta| {
            if meta.path.is_ident("crate") {
                if runtime.is_some() {
                    return Err(meta.error("duplicate `crate` argument"));
                }
                let lit: LitStr = meta.value()?.parse()?;
                runtime = Some(lit.parse_with(Path::parse_mod_style)?);
                Ok(())
            } else {
                Err(meta.error("unsupported argument, expected `crate = \"path\"`"))
            }
        });
        parser.parse2(args)?;

        Ok(match runtime {
            Some(runtime) => Self { runtime },
            None => Self::default(),
        })
    }
}
