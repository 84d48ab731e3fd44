//! Loading pipeline: finds data files, deserializes them, and freezes the
//! designs into a [`DesignRegistry`].
//!
//! A data directory holds up to three files, each in any supported format:
//!
//! - `rules` (optional) -- a [`RulesConfig`]; missing sections use defaults.
//! - `designs` (required) -- a list of [`DesignData`].
//! - `species` (required) -- a list of [`SpeciesData`].
//!
//! The format is detected from the extension. Two files with the same base
//! name in different formats are rejected rather than silently preferring one.

use crate::schema::{DesignData, SpeciesData};
use serde::de::DeserializeOwned;
use starlane_core::config::RulesConfig;
use starlane_core::registry::{DesignRegistry, DesignRegistryBuilder, RegistryError};
use starlane_core::state::Species;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: &'static str, dir: PathBuf },

    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// The loaded designs failed registry validation.
    #[error("invalid design in {file}: {source}")]
    Registry {
        file: PathBuf,
        #[source]
        source: RegistryError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    /// Extensions in lookup order.
    pub const EXTENSIONS: [&'static str; 3] = ["ron", "toml", "json"];
}

/// Detect the format of a file from its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Look for `{base_name}.ron`, `.toml`, or `.json` in `dir`.
///
/// Returns `Ok(None)` if none exists and `ConflictingFormats` if more than
/// one does.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;
    for ext in Format::EXTENSIONS {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if !candidate.exists() {
            continue;
        }
        match found {
            Some(existing) => {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            None => found = Some(candidate),
        }
    }
    Ok(found)
}

/// Like [`find_data_file`], but a missing file is an error.
pub fn require_data_file(dir: &Path, base_name: &'static str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name,
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Read a file and deserialize it according to its extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list. TOML has no top-level arrays, so a TOML file holds
/// the list under `toml_key` (`[[designs]]`); RON and JSON hold it directly.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    if detect_format(path)? != Format::Toml {
        return deserialize_file(path);
    }
    let mut table: toml::Table = deserialize_file(path)?;
    let array = table
        .remove(toml_key)
        .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?;
    array
        .try_into()
        .map_err(|e: toml::de::Error| parse_error(path, e))
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up a name, returning `UnresolvedRef` if it is absent.
pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

/// Fail with `DuplicateName` if `name` is already in `map`.
pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        return Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        });
    }
    Ok(())
}

// ===========================================================================
// Game data
// ===========================================================================

/// Everything loaded from a data directory, ready to hand to a
/// [`TurnEngine`](starlane_core::engine::TurnEngine).
#[derive(Debug)]
pub struct GameData {
    pub rules: RulesConfig,
    pub registry: DesignRegistry,
    /// Species in file order.
    pub species: Vec<Species>,
}

impl GameData {
    pub fn species(&self, id: &str) -> Option<&Species> {
        self.species.iter().find(|s| s.id == id)
    }
}

/// Load rules, designs, and species from `dir`.
///
/// Fails if the rules name a default ship design the design file does not
/// define.
pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    log::debug!("loading game data from {}", dir.display());

    let (rules, rules_path) = match find_data_file(dir, "rules")? {
        Some(path) => (deserialize_file::<RulesConfig>(&path)?, Some(path)),
        None => {
            log::debug!("no rules file in {}, using defaults", dir.display());
            (RulesConfig::default(), None)
        }
    };

    let designs_path = require_data_file(dir, "designs")?;
    let designs: Vec<DesignData> = deserialize_list(&designs_path, "designs")?;
    let mut seen: HashMap<String, ()> = HashMap::new();
    let mut builder = DesignRegistryBuilder::new();
    for design in &designs {
        check_duplicate(&seen, &design.name, &designs_path)?;
        seen.insert(design.name.clone(), ());
        builder
            .register(&design.name, design.to_stats())
            .map_err(|source| DataLoadError::Registry {
                file: designs_path.clone(),
                source,
            })?;
    }
    let registry = builder.build().map_err(|source| DataLoadError::Registry {
        file: designs_path.clone(),
        source,
    })?;

    let default_design = rules.build.default_ship_design.as_str();
    resolve_name(
        &seen,
        default_design,
        rules_path.as_deref().unwrap_or(&designs_path),
        "design",
    )?;

    let species_path = require_data_file(dir, "species")?;
    let species_data: Vec<SpeciesData> = deserialize_list(&species_path, "species")?;
    let mut species_ids: HashMap<String, ()> = HashMap::new();
    let mut species = Vec::with_capacity(species_data.len());
    for data in &species_data {
        check_duplicate(&species_ids, &data.id, &species_path)?;
        species_ids.insert(data.id.clone(), ());
        species.push(data.to_species());
    }

    log::info!(
        "loaded {} designs and {} species from {}",
        registry.len(),
        species.len(),
        dir.display()
    );

    Ok(GameData {
        rules,
        registry,
        species,
    })
}

// ===========================================================================
// Tests
// ===========================================================================
