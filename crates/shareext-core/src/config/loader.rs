//! App configuration file loading and saving

use crate::error::{Error, Result};
use crate::types::{AppConfig, ModRequest};
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;
use std::fs;
use tracing::debug;

/// Configuration file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["app.json", "app.yaml", "app.yml"];

/// Key wrapping the app section in Expo-style app.json files
const EXPO_KEY: &str = "expo";

/// On-disk format of the app configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    fn from_path(path: &Utf8Path) -> Self {
        match path.extension() {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Loaded app configuration and where it came from
#[derive(Debug, Clone)]
pub struct AppConfigFile {
    /// The parsed app section
    pub config: AppConfig,

    /// Path to the configuration file
    pub config_path: Utf8PathBuf,

    /// Directory containing the configuration file
    pub working_dir: Utf8PathBuf,

    format: ConfigFormat,

    /// Whether the app section sits under a top-level `expo` key
    wrapped: bool,

    /// Original document, used to keep sibling keys when saving
    document: Value,
}

impl AppConfigFile {
    /// Load configuration from the specified path or search for it
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        let (config_path, content) = if let Some(p) = path {
            let content = fs::read_to_string(p).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::config_not_found(p.as_str())
                } else {
                    Error::Io(e)
                }
            })?;
            (p.to_owned(), content)
        } else {
            Self::find_config()?
        };

        Self::parse(&content, config_path)
    }

    /// Parse configuration content as if it were read from `config_path`
    pub fn parse(content: &str, config_path: Utf8PathBuf) -> Result<Self> {
        let format = ConfigFormat::from_path(&config_path);
        let document: Value = match format {
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml_ng::from_str(content)?,
        };

        if !document.is_object() {
            return Err(Error::invalid_config(format!(
                "{} must contain an object at the top level",
                config_path
            )));
        }

        let wrapped = document.get(EXPO_KEY).is_some_and(Value::is_object);
        let section = if wrapped {
            document[EXPO_KEY].clone()
        } else {
            document.clone()
        };

        if section.get("name").and_then(Value::as_str).is_none() {
            return Err(Error::missing_field("name"));
        }
        let config: AppConfig = serde_json::from_value(section)?;

        let working_dir = config_path
            .parent()
            .map(|p| p.to_owned())
            .unwrap_or_else(|| Utf8PathBuf::from("."));

        debug!("Loaded app configuration from {}", config_path);

        Ok(Self {
            config,
            config_path,
            working_dir,
            format,
            wrapped,
            document,
        })
    }

    /// Find configuration file in current directory or parent directories
    fn find_config() -> Result<(Utf8PathBuf, String)> {
        let cwd = std::env::current_dir().map_err(Error::Io)?;
        let cwd = Utf8PathBuf::try_from(cwd)
            .map_err(|_| Error::invalid_config("Current directory path is not valid UTF-8"))?;

        let mut current = cwd.as_path();

        loop {
            for name in CONFIG_FILE_NAMES {
                let path = current.join(name);
                if path.exists() {
                    let content = fs::read_to_string(&path)?;
                    return Ok((path, content));
                }
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Err(Error::config_not_found(
            "app.json (searched current and parent directories)",
        ))
    }

    /// Render the document with the current app section in place
    pub fn render(&self) -> Result<String> {
        let section = serde_json::to_value(&self.config)?;
        let document = if self.wrapped {
            let mut document = self.document.clone();
            document[EXPO_KEY] = section;
            document
        } else {
            section
        };

        Ok(match self.format {
            ConfigFormat::Json => {
                let mut out = serde_json::to_string_pretty(&document)?;
                out.push('\n');
                out
            }
            ConfigFormat::Yaml => serde_yaml_ng::to_string(&document)?,
        })
    }

    /// Write the configuration back to `config_path`
    pub fn save(&self) -> Result<()> {
        fs::write(&self.config_path, self.render()?)?;
        debug!("Saved app configuration to {}", self.config_path);
        Ok(())
    }

    /// Whether the in-memory app section differs from what was loaded
    pub fn is_modified(&self) -> Result<bool> {
        let original = if self.wrapped {
            &self.document[EXPO_KEY]
        } else {
            &self.document
        };
        Ok(&serde_json::to_value(&self.config)? != original)
    }

    /// Default native platform root next to the config file
    pub fn default_platform_root(&self) -> Utf8PathBuf {
        self.working_dir.join("ios")
    }
}

/// Build a generation request, discovering the project name when not given
pub fn resolve_request(platform_root: &Utf8Path, project_name: Option<&str>) -> Result<ModRequest> {
    if let Some(name) = project_name {
        return Ok(ModRequest::new(platform_root, name));
    }

    if !platform_root.is_dir() {
        return Err(Error::project_not_found(platform_root.as_str()));
    }

    let pattern = format!("{}/*.xcodeproj", glob::Pattern::escape(platform_root.as_str()));
    let mut candidates: Vec<String> = glob::glob(&pattern)?
        .filter_map(|entry| entry.ok())
        .filter_map(|path| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_owned)
        })
        .filter(|stem| stem != "Pods")
        .collect();
    candidates.sort();

    match candidates.len() {
        0 => Err(Error::project_not_found(platform_root.as_str())),
        1 => Ok(ModRequest::new(platform_root, candidates.remove(0))),
        _ => Err(Error::ambiguous_project(platform_root.as_str(), &candidates)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_parse_wrapped_json() {
        let json = r#"{"expo":{"name":"MyApp","ios":{"bundleIdentifier":"com.acme.myapp"}},"other":1}"#;
        let file = AppConfigFile::parse(json, "app.json".into()).unwrap();
        assert_eq!(file.config.name, "MyApp");
        assert_eq!(file.config.bundle_identifier(), Some("com.acme.myapp"));
        assert!(!file.is_modified().unwrap());
    }

    #[test]
    fn test_parse_flat_yaml() {
        let yaml = r#"
name: MyApp
version: 3.0.0
ios:
  bundleIdentifier: com.acme.myapp
  buildNumber: "42"
"#;
        let file = AppConfigFile::parse(yaml, "app.yaml".into()).unwrap();
        assert_eq!(file.config.marketing_version(), "3.0.0");
        assert_eq!(file.config.build_number(), "42");
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let err = AppConfigFile::parse(r#"{"expo":{"slug":"x"}}"#, "app.json".into()).unwrap_err();
        assert!(matches!(err, Error::MissingField { ref field } if field == "name"));
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = AppConfigFile::parse("[1, 2]", "app.json".into()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfigFile::load(Some(Utf8Path::new("/nonexistent/app.json"))).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn test_save_keeps_sibling_keys() {
        let dir = TempDir::new().unwrap();
        let path = utf8(&dir).join("app.json");
        fs::write(
            &path,
            r#"{"expo":{"name":"MyApp","icon":"./icon.png"},"plugins":["x"]}"#,
        )
        .unwrap();

        let mut file = AppConfigFile::load(Some(&path)).unwrap();
        file.config
            .extra
            .insert("flag".into(), Value::Bool(true));
        assert!(file.is_modified().unwrap());
        file.save().unwrap();

        let saved: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["plugins"][0], "x");
        assert_eq!(saved["expo"]["icon"], "./icon.png");
        assert_eq!(saved["expo"]["extra"]["flag"], true);
    }

    #[test]
    fn test_resolve_request_discovers_single_project() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        fs::create_dir_all(root.join("MyApp.xcodeproj")).unwrap();
        fs::create_dir_all(root.join("Pods.xcodeproj")).unwrap();

        let request = resolve_request(&root, None).unwrap();
        assert_eq!(request.project_name, "MyApp");
        assert_eq!(request.platform_project_root, root);
    }

    #[test]
    fn test_resolve_request_ambiguous() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        fs::create_dir_all(root.join("A.xcodeproj")).unwrap();
        fs::create_dir_all(root.join("B.xcodeproj")).unwrap();

        let err = resolve_request(&root, None).unwrap_err();
        assert!(err.to_string().contains("A, B"));
    }

    #[test]
    fn test_resolve_request_explicit_name() {
        let request = resolve_request(Utf8Path::new("/nowhere"), Some("Host")).unwrap();
        assert_eq!(request.project_name, "Host");
    }

    #[test]
    fn test_resolve_request_missing_root() {
        let err = resolve_request(Utf8Path::new("/nonexistent/ios"), None).unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound { .. }));
    }
}
