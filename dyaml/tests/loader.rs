use std::{fs, path::Path};

use dyaml::{Composite, Config, Error, Printer, loader::resolve_document_path};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn printer_for(dir: &Path) -> Printer {
    Printer::default().with_path_replacement("dir", dir.to_string_lossy())
}

#[derive(Debug, Config)]
#[config(path = "{dir}/server.yml")]
#[comment("Server settings")]
struct Server {
    #[node(order = 0)]
    #[comment("Port to listen on")]
    port: u16,
    #[node(order = 1, key = "display.motd")]
    motd: String,
    #[path_param("dir")]
    dir: String,
    #[all_contents]
    raw: Vec<u8>,
}

impl Default for Server {
    fn default() -> Self {
        Server {
            port: 25565,
            motd: "Welcome".to_string(),
            dir: String::new(),
            raw: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Config)]
#[config(inject = "{dir}/server.properties.yml")]
struct Properties {
    #[node]
    motd: String,
}

#[derive(Debug, Default, Config)]
#[config(path = "{dir}/missing.yml")]
struct NoDefault {
    #[node]
    name: Option<String>,
}

#[derive(Debug, Default, Config)]
#[config(path = "{dir}/grid.yml")]
struct Grid {
    #[node]
    cells: Vec<Vec<String>>,
}

#[derive(Debug, Default, PartialEq, Composite)]
struct Limits {
    players: u32,
    nickname: Option<String>,
}

#[derive(Debug, Config)]
#[config(path = "{dir}/proxy.yml")]
struct Proxy {
    #[comment("Limits apply to every server")]
    limits: (),
    #[node(key = "limits")]
    limit_values: Limits,
    #[node(order = 1)]
    motd: Option<String>,
}

impl Default for Proxy {
    fn default() -> Self {
        Proxy {
            limits: (),
            limit_values: Limits {
                players: 100,
                nickname: None,
            },
            motd: Some("Proxy".to_string()),
        }
    }
}

#[test]
fn test_load_generates_document() -> anyhow::Result<()> {
    init_logger();
    let dir = tempfile::tempdir()?;
    let printer = printer_for(dir.path());

    let server: Server = dyaml::load(&printer)?;
    assert_eq!(server.port, 25565);
    assert_eq!(server.motd, "Welcome");
    assert_eq!(server.dir, dir.path().to_string_lossy());

    let path = dir.path().join("server.yml");
    let text = fs::read_to_string(&path)?;
    assert_eq!(
        text,
        "# Server settings\n# Port to listen on\nport: 25565\n\ndisplay:\n    motd: \"Welcome\"\n\n"
    );
    assert_eq!(server.raw, text.as_bytes());
    assert_eq!(resolve_document_path::<Server>(&printer)?, path);
    Ok(())
}

#[test]
fn test_load_keeps_existing_values() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("server.yml");
    fs::write(&path, "port: 8080\nextra: kept\n")?;

    let server: Server = dyaml::load(&printer_for(dir.path()))?;
    assert_eq!(server.port, 8080);
    assert_eq!(server.motd, "Welcome");
    assert_eq!(fs::read_to_string(&path)?, "port: 8080\nextra: kept\n");
    Ok(())
}

#[test]
fn test_store_then_reload() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let printer = printer_for(dir.path());
    let path = dir.path().join("server.yml");

    let mut server: Server = dyaml::load(&printer)?;
    server.port = 1;
    server.motd = "Stored".to_string();
    dyaml::store(&server, &printer)?;

    let stored: Server = dyaml::load(&printer)?;
    assert_eq!(stored.port, 1);
    assert_eq!(stored.motd, "Stored");

    fs::write(&path, "port: 2\ndisplay:\n  motd: Edited\n")?;
    dyaml::reload(&mut server, &printer)?;
    assert_eq!(server.port, 2);
    assert_eq!(server.motd, "Edited");
    assert_eq!(server.raw, b"port: 2\ndisplay:\n  motd: Edited\n");
    Ok(())
}

#[test]
fn test_failed_reload_keeps_state() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let printer = printer_for(dir.path());

    let mut server: Server = dyaml::load(&printer)?;
    fs::write(dir.path().join("server.yml"), "port: high\ndisplay:\n  motd: Broken\n")?;

    let err = dyaml::reload(&mut server, &printer).unwrap_err();
    assert!(matches!(err, Error::Member { .. }), "{err}");
    assert_eq!(server.port, 25565);
    assert_eq!(server.motd, "Welcome");
    Ok(())
}

#[test]
fn test_store_with_backup() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let printer = printer_for(dir.path()).with_backup(true);

    let server: Server = dyaml::load(&printer)?;
    dyaml::store(&server, &printer)?;

    let backups: Vec<_> = fs::read_dir(dir.path())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with("server.bk-") && name.ends_with(".yml"))
        .collect();
    assert_eq!(backups.len(), 1, "{backups:?}");
    Ok(())
}

#[test]
fn test_injection_never_creates() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let printer = printer_for(dir.path());
    let path = dir.path().join("server.properties.yml");

    let err = dyaml::load::<Properties>(&printer).unwrap_err();
    assert!(matches!(err, Error::MissingDocument { .. }), "{err}");
    assert!(!path.exists());

    let err = dyaml::store(&Properties::default(), &printer).unwrap_err();
    assert!(matches!(err, Error::MissingDocument { .. }), "{err}");
    assert!(!path.exists());
    Ok(())
}

#[test]
fn test_injection_overlays_existing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let printer = printer_for(dir.path());
    let path = dir.path().join("server.properties.yml");
    fs::write(&path, "motd: old\nother:\n  level: 3\n")?;

    let mut properties: Properties = dyaml::load(&printer)?;
    assert_eq!(properties.motd, "old");

    properties.motd = "new".to_string();
    dyaml::store(&properties, &printer)?;

    let document: dyaml::Document = serde_yaml::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(document["motd"].as_str(), Some("new"));
    assert_eq!(document["other"]["level"].as_i64(), Some(3));
    Ok(())
}

#[test]
fn test_schema_errors_before_io() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let printer = printer_for(dir.path());

    let err = dyaml::load::<NoDefault>(&printer).unwrap_err();
    assert!(matches!(err, Error::MissingDefault { ref member } if member == "name"));
    assert!(!dir.path().join("missing.yml").exists());

    let err = dyaml::load::<Grid>(&printer).unwrap_err();
    assert!(matches!(err, Error::Unsupported { .. }), "{err}");
    assert!(err.to_string().contains("List<List<String>>"), "{err}");
    assert!(!dir.path().join("grid.yml").exists());
    Ok(())
}

#[test]
fn test_path_errors() {
    let err = dyaml::load::<Server>(&Printer::default()).unwrap_err();
    assert!(matches!(err, Error::UnresolvedParameter(ref name) if name == "dir"));

    let printer = Printer::default().with_path_replacement("dir", "bad dir");
    let err = dyaml::load::<Server>(&printer).unwrap_err();
    assert!(matches!(err, Error::InvalidPath(_)), "{err}");
    assert!(!Path::new("bad dir").exists());
}

#[test]
fn test_comment_only_and_nested_composite() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let printer = printer_for(dir.path()).with_indent_spaces(2);

    let proxy: Proxy = dyaml::load(&printer)?;
    assert_eq!(proxy.limit_values.players, 100);
    assert_eq!(proxy.motd.as_deref(), Some("Proxy"));

    let text = fs::read_to_string(dir.path().join("proxy.yml"))?;
    assert!(
        text.starts_with("# Limits apply to every server\nlimits:\n  players: 100\n"),
        "{text}"
    );

    fs::write(dir.path().join("proxy.yml"), "limits:\n  players: 5\nmotd: [a]\n")?;
    let proxy: Proxy = dyaml::load(&printer)?;
    assert_eq!(proxy.limit_values.players, 5);
    assert_eq!(proxy.motd, None);
    Ok(())
}

#[derive(Debug, Config)]
#[config(path = "{dir}/grouped.yml")]
struct Grouped {
    #[comment("Display settings")]
    display: (),
    #[node(key = "display.motd")]
    motd: String,
}

impl Default for Grouped {
    fn default() -> Self {
        Grouped {
            display: (),
            motd: "Hi".to_string(),
        }
    }
}

#[test]
fn test_comment_on_group() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let printer = printer_for(dir.path());

    let grouped: Grouped = dyaml::load(&printer)?;
    assert_eq!(grouped.motd, "Hi");
    assert_eq!(
        fs::read_to_string(dir.path().join("grouped.yml"))?,
        "# Display settings\ndisplay:\n    motd: \"Hi\"\n\n"
    );
    Ok(())
}

#[derive(Debug, Default, Config)]
#[config(inject = "{dir}/host.yml")]
struct HostMotd {
    #[node]
    motd: String,
}

#[test]
fn test_injection_keeps_nested_lists() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let printer = printer_for(dir.path());
    let path = dir.path().join("host.yml");
    fs::write(&path, "motd: old\nmatrix: [[1, 2], [3]]\n")?;

    let mut host: HostMotd = dyaml::load(&printer)?;
    host.motd = "new".to_string();
    dyaml::store(&host, &printer)?;

    let document: dyaml::Document = serde_yaml::from_str(&fs::read_to_string(&path)?)?;
    let expected: dyaml::Document = serde_yaml::from_str("motd: new\nmatrix: [[1, 2], [3]]\n")?;
    assert_eq!(document, expected);
    Ok(())
}

#[derive(Debug, Default, Config)]
#[config(path = "strict.yml", git = "loader-unregistered")]
struct StrictStore {
    #[node]
    motd: String,
}

#[derive(Debug, Default, Config)]
#[config(path = "{dir}/optional.yml", git = "loader-optional", git_optional)]
struct OptionalStore {
    #[node]
    motd: String,
}

#[derive(Debug, Default, Config)]
#[config(path = "unreachable.yml", git = "loader-unreachable")]
struct UnreachableStore {
    #[node]
    motd: String,
}

#[test]
fn test_git_binding() -> anyhow::Result<()> {
    init_logger();
    let dir = tempfile::tempdir()?;
    let printer = printer_for(dir.path());

    let err = dyaml::load::<StrictStore>(&printer).unwrap_err();
    assert!(matches!(err, Error::UnknownStore(ref ns) if ns == "loader-unregistered"));

    dyaml::load::<OptionalStore>(&printer)?;
    assert!(dir.path().join("optional.yml").exists());

    let checkout = dir.path().join("checkout");
    dyaml::register_store(
        "loader-unreachable",
        dyaml::GitConfig::new("https://127.0.0.1:9/none.git", &checkout),
    )?;
    assert_eq!(
        resolve_document_path::<UnreachableStore>(&printer)?,
        checkout.join("unreachable.yml")
    );
    let err = dyaml::load::<UnreachableStore>(&printer).unwrap_err();
    assert!(matches!(err, Error::Sync { .. }), "{err}");
    assert!(!checkout.join("unreachable.yml").exists());

    dyaml::store::unregister_store("loader-unreachable");
    Ok(())
}
