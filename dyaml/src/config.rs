//! Top-level configuration types.

use crate::data::member::Bindable;

/// A type bound to a whole document.
///
/// Usually derived:
///
/// ```rust
/// use dyaml::Config;
///
/// #[derive(Config)]
/// #[config(path = "servers/{id}.yml")]
/// #[comment("Server settings")]
/// struct Server {
///     #[node(order = 0)]
///     port: u16,
///     #[node(order = 1, key = "display.motd")]
///     motd: String,
///     #[path_param("id")]
///     id: String,
/// }
///
/// impl Default for Server {
///     fn default() -> Self {
///         Server {
///             port: 25565,
///             motd: "Welcome".to_string(),
///             id: String::new(),
///         }
///     }
/// }
/// ```
pub trait Config: Bindable + Default {
    /// Where the backing document lives.
    fn location() -> Location;

    /// Comment lines printed at the top of a generated document.
    fn header() -> &'static [&'static str] {
        &[]
    }
}

/// Document location of a [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Path template; `{name}` segments are replaced from the printer.
    pub path: &'static str,
    /// The document is owned by someone else and only receives values.
    pub injecting: bool,
    /// Namespace whose registered base path prefixes `path`.
    pub namespace: Option<&'static str>,
    pub git: Option<GitBinding>,
}

/// Binding of a config to a registered git store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GitBinding {
    pub namespace: &'static str,
    /// Fail the load when the store isn't registered, instead of falling
    /// back to the plain file path.
    pub required: bool,
}
