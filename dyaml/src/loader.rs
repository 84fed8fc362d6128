//! Load, reload and store entry points.
//!
//! A load derives the schema tree from `T::default()`, resolves the
//! document path, generates the document when it doesn't exist yet and then
//! decodes every member from it:
//!
//! ```text
//! generate_targets -> build_tree -> resolve path -> (sync store)
//!     -> read or generate document -> reconcile -> assign members
//! ```
//!
//! Schema and path errors are raised before the file system is touched.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, LazyLock},
    time::SystemTime,
};

use regex::Regex;

use crate::{
    codec::{Document, decode_members},
    config::Config,
    data::{
        member::{Bindable, Binding},
        schema::{SchemaNode, build_tree, generate_targets},
    },
    error::{Error, Result},
    printer::Printer,
    reconcile::{overlay, parse, reconcile},
    store::{self, GitOperator},
};

static PARAMETER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_\-./\\]+)\}").expect("static pattern"));

static VALID_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_\-./\\]+$").expect("static pattern"));

/// Replace every `{name}` in `template` with its replacement.
///
/// ```rust
/// use std::collections::HashMap;
///
/// let replacements = HashMap::from([("id".to_string(), "lobby".to_string())]);
/// let path = dyaml::loader::resolve_template("servers/{id}.yml", &replacements).unwrap();
/// assert_eq!(path, "servers/lobby.yml");
/// ```
pub fn resolve_template(template: &str, replacements: &HashMap<String, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in PARAMETER.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = replacements
            .get(name.as_str())
            .ok_or_else(|| Error::UnresolvedParameter(name.as_str().to_string()))?;
        out.push_str(&template[last..whole.start()]);
        out.push_str(value);
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}

/// Reject paths with characters outside the filename-safe class.
pub fn validate_path(path: &str) -> Result<()> {
    if !VALID_PATH.is_match(path) {
        return Err(Error::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// The file backing `T` under the given printer settings.
pub fn resolve_document_path<T: Config>(printer: &Printer) -> Result<PathBuf> {
    locate::<T>(printer).map(|(path, _)| path)
}

fn locate<T: Config>(printer: &Printer) -> Result<(PathBuf, Option<Arc<GitOperator>>)> {
    let location = T::location();
    let resolved = resolve_template(location.path, printer.path_replacements())?;
    validate_path(&resolved)?;

    let mut path = PathBuf::from(resolved);
    if let Some(base) = location.namespace.and_then(store::base_path) {
        path = base.join(path);
    }

    let store = match location.git {
        Some(binding) => match store::fetch_store(binding.namespace) {
            Some(operator) => {
                path = operator.resolve(&path);
                Some(operator)
            }
            None if binding.required => {
                return Err(Error::UnknownStore(binding.namespace.to_string()));
            }
            None => {
                debug!(
                    "store `{}` isn't registered, using the plain path",
                    binding.namespace
                );
                None
            }
        },
        None => None,
    };

    debug!(
        "{} is backed by {}",
        std::any::type_name::<T>(),
        path.display()
    );
    Ok((path, store))
}

fn is_injecting<T: Config>(printer: &Printer) -> bool {
    T::location().injecting || printer.injecting()
}

fn schema_tree<T: Config>(instance: &T, printer: &Printer) -> Result<SchemaNode> {
    let targets = generate_targets(instance, printer)?;
    let header: Vec<String> = T::header().iter().map(|s| s.to_string()).collect();
    build_tree(&printer.substitute_comments(&header), &targets)
}

/// Load `T` from its document, generating the document from
/// `T::default()` when it doesn't exist.
pub fn load<T: Config>(printer: &Printer) -> Result<T> {
    let mut instance = T::default();
    let tree = schema_tree(&instance, printer)?;
    let (path, store) = locate::<T>(printer)?;

    if let Some(store) = &store {
        store.sync()?;
    }

    if !path.exists() {
        if is_injecting::<T>(printer) {
            return Err(Error::MissingDocument { path });
        }
        let text = printer.render(&tree)?;
        write_document(&path, &text)?;
        info!("generated {}", path.display());
    }

    let contents = read_document(&path)?;
    let document = reconcile(&tree, Some(document_text(&path, &contents)?), printer)?;
    assign(&mut instance, &document, &contents, printer)?;
    Ok(instance)
}

/// Re-read the document into `instance`; never writes.
///
/// Members are decoded into a scratch value first and swapped in only once
/// every one of them succeeded, so a failed reload leaves `instance` as it
/// was.
pub fn reload<T: Config>(instance: &mut T, printer: &Printer) -> Result<()> {
    let mut scratch = T::default();
    let tree = schema_tree(&scratch, printer)?;
    let (path, _) = locate::<T>(printer)?;

    let contents = read_document(&path)?;
    let document = reconcile(&tree, Some(document_text(&path, &contents)?), printer)?;
    assign(&mut scratch, &document, &contents, printer)?;

    for member in T::members() {
        member.swap(instance, &mut scratch);
    }
    debug!("reloaded {}", path.display());
    Ok(())
}

/// Write the current member values of `instance` to its document.
///
/// An injecting config only overlays its values onto the existing document
/// and fails if there is none. The overlaid document is emitted as parsed,
/// so structure the config doesn't declare is kept but comments are not.
pub fn store<T: Config>(instance: &T, printer: &Printer) -> Result<()> {
    let tree = schema_tree(instance, printer)?;
    let (path, _) = locate::<T>(printer)?;

    let text = if is_injecting::<T>(printer) {
        if !path.exists() {
            return Err(Error::MissingDocument { path });
        }
        let contents = read_document(&path)?;
        let mut document = parse(document_text(&path, &contents)?)?;
        overlay(&mut document, &tree)?;
        serde_yaml::to_string(&document)?
    } else {
        printer.render(&tree)?
    };

    if printer.backup() && path.exists() {
        let backup = backup_document(&path)?;
        debug!("backed up {} to {}", path.display(), backup.display());
    }
    write_document(&path, &text)?;
    info!("stored {}", path.display());
    Ok(())
}

fn assign<T: Bindable>(
    instance: &mut T,
    document: &Document,
    contents: &[u8],
    printer: &Printer,
) -> Result<()> {
    decode_members(instance, document)?;
    for member in T::members() {
        match &member.binding {
            Binding::PathParameter { name, assign, .. } => {
                if let Some(value) = printer.path_replacements().get(*name) {
                    assign(instance, value);
                }
            }
            Binding::AllContents { assign, .. } => assign(instance, contents.to_vec()),
            Binding::Value(_) | Binding::Comment => {}
        }
    }
    Ok(())
}

fn read_document(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::io(path, e))
}

fn document_text<'a>(path: &Path, contents: &'a [u8]) -> Result<&'a str> {
    std::str::from_utf8(contents)
        .map_err(|e| Error::io(path, io::Error::new(io::ErrorKind::InvalidData, e)))
}

fn write_document(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(path, text).map_err(|e| Error::io(path, e))
}

/// Copy `path` to `<name>.bk-<unix-secs>.<ext>` next to it.
fn backup_document(path: &Path) -> Result<PathBuf> {
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let bk = match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => format!("bk-{secs}.{ext}"),
        None => format!("bk-{secs}"),
    };
    let backup_path = path.with_extension(bk);
    fs::copy(path, &backup_path).map_err(|e| Error::io(&backup_path, e))?;
    Ok(backup_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replacements(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_template_resolved() {
        let map = replacements(&[("id", "lobby"), ("dir", "servers")]);
        assert_eq!(
            resolve_template("{dir}/{id}.yml", &map).unwrap(),
            "servers/lobby.yml"
        );
        assert_eq!(resolve_template("plain.yml", &map).unwrap(), "plain.yml");
    }

    #[test]
    fn test_template_unresolved() {
        let err = resolve_template("servers/{id}.yml", &HashMap::new()).unwrap_err();
        assert!(matches!(err, Error::UnresolvedParameter(name) if name == "id"));
    }

    #[test]
    fn test_path_validation() {
        assert!(validate_path("configs/server-1_a.yml").is_ok());
        assert!(validate_path("configs\\windows.yml").is_ok());
        assert!(matches!(
            validate_path("servers/lobby one.yml"),
            Err(Error::InvalidPath(_))
        ));
        assert!(validate_path("").is_err());
    }

    #[test]
    fn test_backup_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.yml");
        fs::write(&path, "port: 1\n").unwrap();

        let backup = backup_document(&path).unwrap();
        let name = backup.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("server.bk-"), "{name}");
        assert!(name.ends_with(".yml"), "{name}");
        assert_eq!(fs::read_to_string(backup).unwrap(), "port: 1\n");
    }
}
