//! Attribute parsing shared by all dyaml derives.

use syn::{
    Attribute, LitInt, LitStr, Meta, Token, meta::ParseNestedMeta, punctuated::Punctuated,
};

/// Container-level attributes.
///
/// - `#[config(path = "...")]` - document path template
/// - `#[config(inject = "...")]` - document path of a document owned elsewhere
/// - `#[config(namespace = "...")]` - namespace whose base path applies
/// - `#[config(git = "...")]` - git store namespace
/// - `#[config(git_optional)]` - fall back to the plain path without the store
/// - `#[comment("...", ...)]` - header comment lines
#[derive(Debug, Default)]
pub struct ContainerAttrs {
    pub path: Option<String>,
    pub injecting: bool,
    pub namespace: Option<String>,
    pub git: Option<String>,
    pub git_optional: bool,
    pub comment: Vec<String>,
}

impl ContainerAttrs {
    pub fn from_ast(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = ContainerAttrs::default();
        for attr in attrs {
            if attr.path().is_ident("comment") {
                result.comment.extend(parse_comment(attr)?);
            } else if attr.path().is_ident("config") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("path") {
                        result.path = Some(lit_str(&meta)?);
                    } else if meta.path.is_ident("inject") {
                        result.path = Some(lit_str(&meta)?);
                        result.injecting = true;
                    } else if meta.path.is_ident("namespace") {
                        result.namespace = Some(lit_str(&meta)?);
                    } else if meta.path.is_ident("git") {
                        result.git = Some(lit_str(&meta)?);
                    } else if meta.path.is_ident("git_optional") {
                        result.git_optional = true;
                    } else {
                        return Err(meta.error("unsupported config attribute"));
                    }
                    Ok(())
                })?;
            }
        }
        Ok(result)
    }
}

/// Field-level attributes.
///
/// - `#[node]` / `#[node(order = 1, key = "a.b")]` - value member
/// - `#[node(skip)]` - not a member of a composite
/// - `#[comment("...", ...)]` - comment lines; alone, a comment-only member
/// - `#[path_param("name")]` - receives the path parameter `name`
/// - `#[all_contents]` - receives the raw document bytes
#[derive(Debug, Default)]
pub struct FieldAttrs {
    pub node: bool,
    pub skip: bool,
    pub order: i32,
    pub key: Option<String>,
    pub comment: Vec<String>,
    pub path_param: Option<String>,
    pub all_contents: bool,
}

impl FieldAttrs {
    pub fn from_ast(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = FieldAttrs::default();
        for attr in attrs {
            if attr.path().is_ident("comment") {
                result.comment.extend(parse_comment(attr)?);
            } else if attr.path().is_ident("path_param") {
                result.path_param = Some(attr.parse_args::<LitStr>()?.value());
            } else if attr.path().is_ident("all_contents") {
                result.all_contents = true;
            } else if attr.path().is_ident("node") {
                result.node = true;
                if matches!(attr.meta, Meta::Path(_)) {
                    continue;
                }
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("order") {
                        result.order = lit_i32(&meta)?;
                    } else if meta.path.is_ident("key") {
                        result.key = Some(lit_str(&meta)?);
                    } else if meta.path.is_ident("skip") {
                        result.skip = true;
                    } else {
                        return Err(meta.error("unsupported node attribute"));
                    }
                    Ok(())
                })?;
            }
        }
        Ok(result)
    }

    /// Whether a config declares the field as a member at all.
    pub fn is_declared(&self) -> bool {
        self.node || !self.comment.is_empty() || self.path_param.is_some() || self.all_contents
    }
}

fn parse_comment(attr: &Attribute) -> syn::Result<Vec<String>> {
    let lines = attr.parse_args_with(Punctuated::<LitStr, Token![,]>::parse_terminated)?;
    Ok(lines.iter().map(LitStr::value).collect())
}

fn lit_str(meta: &ParseNestedMeta) -> syn::Result<String> {
    Ok(meta.value()?.parse::<LitStr>()?.value())
}

fn lit_i32(meta: &ParseNestedMeta) -> syn::Result<i32> {
    let value = meta.value()?;
    let negative = value.peek(Token![-]);
    if negative {
        value.parse::<Token![-]>()?;
    }
    let n: i32 = value.parse::<LitInt>()?.base10_parse()?;
    Ok(if negative { -n } else { n })
}
