//! Runtime configuration: where the trip files live and which file backs
//! each city.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{BikeshareError, Result};
use crate::filter::City;

/// Environment variable holding the data directory.
pub const DATA_DIR_VAR: &str = "BIKESHARE_DATA_DIR";
/// Environment variable holding an optional city-sources JSON file.
pub const CITY_SOURCES_VAR: &str = "BIKESHARE_CITY_SOURCES";
pub const DEFAULT_DATA_DIR: &str = "static";

/// Maps each city to the file name of its trip log.
///
/// Overrides are stored as a plain JSON object on disk:
/// ```json
/// {
///   "Chicago": "chicago_2017.csv",
///   "Washington": "dc.csv"
/// }
/// ```
/// Cities left out keep their default file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityCatalog {
    entries: BTreeMap<City, String>,
}

#[derive(Deserialize)]
#[serde(transparent)]
struct CatalogFile(BTreeMap<String, String>);

impl Default for CityCatalog {
    fn default() -> Self {
        let entries = City::ALL
            .into_iter()
            .map(|city| {
                let file = match city {
                    City::Chicago => "chicago.csv",
                    City::NewYorkCity => "new_york_city.csv",
                    City::Washington => "washington.csv",
                };
                (city, file.to_string())
            })
            .collect();
        Self { entries }
    }
}

impl CityCatalog {
    /// Loads overrides from a JSON file at `path` on top of the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|source| BikeshareError::SourceRead {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let CatalogFile(overrides) = serde_json::from_str::<CatalogFile>(content)
            .map_err(|e| BikeshareError::Config(format!("invalid city sources: {e}")))?;

        let mut catalog = Self::default();
        for (name, file) in overrides {
            let city: City = name.parse()?;
            if file.trim().is_empty() {
                return Err(BikeshareError::Config(format!(
                    "empty source file for {city}"
                )));
            }
            catalog.entries.insert(city, file);
        }
        Ok(catalog)
    }

    /// Returns the file name backing `city`.
    pub fn file_for(&self, city: City) -> &str {
        self.entries.get(&city).map(String::as_str).unwrap_or_default()
    }

    /// Iterates over all `(city, file)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (City, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Raw, unvalidated setting values from one layer (command line or
/// environment).
#[derive(Debug, Clone, Default)]
pub struct SettingValues {
    pub data_dir: Option<String>,
    pub city_sources: Option<String>,
}

impl SettingValues {
    /// Reads the values from the environment (after `.env` has been loaded).
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var(DATA_DIR_VAR).ok(),
            city_sources: std::env::var(CITY_SOURCES_VAR).ok(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub catalog: CityCatalog,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::layered(SettingValues::default(), SettingValues::from_env())
    }

    /// Picks each value from `primary`, then `fallback`, then the default.
    /// Only the winning city-sources file is read.
    pub fn layered(primary: SettingValues, fallback: SettingValues) -> Result<Self> {
        let data_dir = primary.data_dir.or(fallback.data_dir);
        let city_sources = primary.city_sources.or(fallback.city_sources);
        Self::resolve(data_dir.as_deref(), city_sources.as_deref())
    }

    /// Builds settings from optional data-dir and city-sources values,
    /// falling back to the defaults.
    pub fn resolve(data_dir: Option<&str>, city_sources: Option<&str>) -> Result<Self> {
        let data_dir = PathBuf::from(data_dir.unwrap_or(DEFAULT_DATA_DIR));
        let catalog = match city_sources {
            Some(path) => CityCatalog::load(Path::new(path))?,
            None => CityCatalog::default(),
        };
        Ok(Self { data_dir, catalog })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_catalog_covers_every_city() {
        let catalog = CityCatalog::default();
        assert_eq!(catalog.iter().count(), 3);
        assert_eq!(catalog.file_for(City::NewYorkCity), "new_york_city.csv");
    }

    #[test]
    fn test_overrides_keep_other_defaults() {
        let catalog = CityCatalog::from_json(r#"{"Washington": "dc.csv"}"#).unwrap();
        assert_eq!(catalog.file_for(City::Washington), "dc.csv");
        assert_eq!(catalog.file_for(City::Chicago), "chicago.csv");
    }

    #[test]
    fn test_override_with_unknown_city() {
        let err = CityCatalog::from_json(r#"{"Boston": "boston.csv"}"#).unwrap_err();
        assert!(matches!(err, BikeshareError::UnknownCity(_)));
    }

    #[test]
    fn test_override_with_invalid_json() {
        let err = CityCatalog::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, BikeshareError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Chicago": "chi.csv"}}"#).unwrap();

        let catalog = CityCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.file_for(City::Chicago), "chi.csv");
    }

    #[test]
    fn test_resolve_defaults() {
        let settings = Settings::resolve(None, None).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(settings.catalog, CityCatalog::default());
    }

    #[test]
    fn test_layered_primary_shadows_broken_fallback() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Washington": "dc.csv"}}"#).unwrap();

        let primary = SettingValues {
            data_dir: None,
            city_sources: Some(file.path().display().to_string()),
        };
        let fallback = SettingValues {
            data_dir: Some("trips".to_string()),
            city_sources: Some("/nonexistent/cities.json".to_string()),
        };

        let settings = Settings::layered(primary, fallback).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("trips"));
        assert_eq!(settings.catalog.file_for(City::Washington), "dc.csv");
    }

    #[test]
    fn test_layered_falls_back_per_field() {
        let primary = SettingValues {
            data_dir: Some("cli".to_string()),
            city_sources: None,
        };
        let fallback = SettingValues {
            data_dir: Some("env".to_string()),
            city_sources: Some("/nonexistent/cities.json".to_string()),
        };

        let err = Settings::layered(primary, fallback).unwrap_err();
        assert!(matches!(err, BikeshareError::SourceRead { .. }));
    }

    #[test]
    fn test_resolve_missing_sources_file() {
        let err = Settings::resolve(Some("data"), Some("/nonexistent/cities.json")).unwrap_err();
        assert!(matches!(err, BikeshareError::SourceRead { .. }));
    }
}
