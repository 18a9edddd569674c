use std::path::Path;
use yaml_rust2::{Yaml, YamlEmitter, YamlLoader, yaml::Hash};

use crate::config::ConfigError;

const INCLUDE_DIRECTIVE: &str = "!include";

/// Loads a YAML file, replacing every `!include <path>` line with the
/// contents of the referenced file (relative to the including file).
/// Included documents are merged first, the including file's own keys win.
pub fn load_yaml_with_includes(path: &Path) -> Result<Yaml, ConfigError> {
    let merged = process_includes_recursive(path)?;
    tracing::debug!(path = ?path, "Processed config includes");
    Ok(merged)
}

pub fn yaml_to_string(yaml: &Yaml) -> Result<String, ConfigError> {
    let mut out_str = String::new();
    {
        let mut emitter = YamlEmitter::new(&mut out_str);
        emitter.dump(yaml)?;
    }
    Ok(out_str)
}

fn process_includes_recursive(path: &Path) -> Result<Yaml, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let base_path = path.parent().unwrap_or(Path::new(""));

    let (includes, rest): (Vec<&str>, Vec<&str>) = contents
        .lines()
        .partition(|&line| line.trim().starts_with(INCLUDE_DIRECTIVE));

    let mut merged_includes: Option<Yaml> = None;
    for line in includes {
        let include_path = line.trim().trim_start_matches(INCLUDE_DIRECTIVE).trim();
        let included = process_includes_recursive(&base_path.join(include_path))?;
        merged_includes = Some(match merged_includes {
            Some(acc) => merge_yaml(&acc, &included),
            None => included,
        });
    }

    let rest_yamls =
        YamlLoader::load_from_str(&rest.join("\n")).map_err(|source| ConfigError::Scan {
            path: path.to_path_buf(),
            source,
        })?;

    // A file holding only include lines has no documents of its own.
    let merged_rest = rest_yamls
        .into_iter()
        .reduce(|acc, doc| merge_yaml(&acc, &doc))
        .unwrap_or_else(|| Yaml::Hash(Hash::new()));

    match merged_includes {
        Some(base) => Ok(merge_yaml(&base, &merged_rest)),
        None => Ok(merged_rest),
    }
}

fn merge_yaml(base: &Yaml, override_yaml: &Yaml) -> Yaml {
    match (base, override_yaml) {
        (Yaml::Hash(base_hash), Yaml::Hash(override_hash)) => {
            let mut result = base_hash.clone();
            for (key, value) in override_hash {
                let merged = match base_hash.get(key) {
                    Some(base_value) => merge_yaml(base_value, value),
                    None => value.clone(),
                };
                result.insert(key.clone(), merged);
            }
            Yaml::Hash(result)
        }
        (_, override_value) => override_value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn included_values_are_overridden_by_including_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("base.yaml"),
            "backend:\n  server_address: 0.0.0.0:8080\n  log_level: info\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("dev.yaml"),
            "!include base.yaml\nbackend:\n  log_level: debug\n",
        )
        .unwrap();

        let yaml = load_yaml_with_includes(&dir.path().join("dev.yaml")).unwrap();
        assert_eq!(yaml["backend"]["server_address"].as_str(), Some("0.0.0.0:8080"));
        assert_eq!(yaml["backend"]["log_level"].as_str(), Some("debug"));
    }

    #[test]
    fn file_with_only_includes_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.yaml"), "common:\n  project_name: ordering\n").unwrap();
        fs::write(dir.path().join("b.yaml"), "!include a.yaml\n").unwrap();

        let yaml = load_yaml_with_includes(&dir.path().join("b.yaml")).unwrap();
        assert_eq!(yaml["common"]["project_name"].as_str(), Some("ordering"));
    }

    #[test]
    fn missing_include_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.yaml"), "!include nowhere.yaml\n").unwrap();

        let err = load_yaml_with_includes(&dir.path().join("main.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn merged_yaml_round_trips_through_emitter() {
        let docs = YamlLoader::load_from_str("stock_api:\n  url: http://localhost/stock/\n").unwrap();
        let text = yaml_to_string(&docs[0]).unwrap();
        assert!(text.contains("url: \"http://localhost/stock/\"") || text.contains("url: http://localhost/stock/"));
    }
}
