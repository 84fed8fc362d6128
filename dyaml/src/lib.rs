//! # dyaml
//!
//! Declarative YAML configuration bound to statically declared Rust types.
//!
//! A config type declares its members, their document keys, print order,
//! defaults and comments. dyaml derives the document schema from it,
//! generates the document on first load, fills in values a hand-edited
//! document lacks and converts between document nodes and typed values.
//!
//! ## Features
//!
//! - Keys derived from member names (`nodeOne_nodeTwo` -> `node-one.node-two`)
//!   or given explicitly
//! - Nested composites, fixed-shape records, enumerations, lists, sets and
//!   string-keyed maps
//! - Optional members that fall back to absent instead of failing the load
//! - Deterministic printer whose output parses back into the same shape
//! - Path templates, per-namespace base paths and git-backed stores with
//!   periodic live reload
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dyaml::{Config, Printer};
//!
//! #[derive(Config)]
//! #[config(path = "server.yml")]
//! struct Server {
//!     #[node(order = 0)]
//!     #[comment("The port to listen on")]
//!     port: u16,
//!     #[node(order = 1, key = "display.motd")]
//!     motd: String,
//! }
//!
//! impl Default for Server {
//!     fn default() -> Self {
//!         Server {
//!             port: 25565,
//!             motd: "Welcome".to_string(),
//!         }
//!     }
//! }
//!
//! let server: Server = dyaml::load(&Printer::default()).unwrap();
//! assert_eq!(server.port, 25565);
//! ```
//!
//! ## Modules
//!
//! - [`data`] - type descriptors, member descriptors and schema trees
//! - [`codec`] - conversion between document nodes and typed values
//! - [`printer`] - document printer and load settings
//! - [`reconcile`] - merging schema trees with documents on disk
//! - [`loader`] - load, reload and store
//! - [`store`] - namespace registry and git stores
//! - [`live`] - configs reloaded by their store

#[macro_use]
extern crate log;

extern crate self as dyaml;

pub mod codec;
pub mod config;
pub mod data;
pub mod error;
pub mod key;
pub mod live;
pub mod loader;
pub mod printer;
pub mod reconcile;
pub mod store;

pub use codec::{Document, Yaml};
pub use config::{Config, GitBinding, Location};
pub use data::{
    member::Bindable,
    value::{Field, Value},
};
pub use dyaml_derive::{Composite, Config, Enumeration, Record};
pub use error::{Error, Result};
pub use live::LiveConfig;
pub use loader::{load, reload, store};
pub use printer::Printer;
pub use store::{GitConfig, GitOperator, register_store};
