//! Pack registry and descriptor loading. A pack couples the statically
//! linked content of a pack crate (controllers, piece kinds, decorators)
//! with the `pack.yml` descriptor in its directory. Descriptors are read
//! once at startup; a pack directory without one is a fatal error with a
//! message a pack author can act on.

use crate::controller::ControllerSpec;
use crate::decorator::DecoratorBehavior;
use crate::piece::PieceBehavior;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

const REQUIRED_DESCRIPTOR_FIELDS: [&str; 2] = ["name", "description"];

/// The statically linked side of a pack, registered by its crate.
pub struct PackContent {
    pub controllers: Vec<&'static dyn ControllerSpec>,
    pub pieces: Vec<&'static dyn PieceBehavior>,
    pub decorators: Vec<&'static dyn DecoratorBehavior>,
}

/// A fully loaded pack: descriptor metadata plus content.
pub struct Pack {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub author: Option<String>,
    pub source: Option<String>,
    pub depends_on: Vec<String>,
    pub controllers: Vec<&'static dyn ControllerSpec>,
    pub pieces: Vec<&'static dyn PieceBehavior>,
    pub decorators: Vec<&'static dyn DecoratorBehavior>,
}

impl std::fmt::Debug for Pack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pack")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("description", &self.description)
            .field("author", &self.author)
            .field("source", &self.source)
            .field("depends_on", &self.depends_on)
            .field(
                "controllers",
                &self.controllers.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field(
                "pieces",
                &self.pieces.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field(
                "decorators",
                &self.decorators.iter().map(|d| d.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Pack {
    pub fn find_controller(&self, controller_id: &str) -> Option<&'static dyn ControllerSpec> {
        self.controllers
            .iter()
            .copied()
            .find(|spec| spec.name() == controller_id)
    }

    pub fn find_piece(&self, piece_type_id: &str) -> Option<&'static dyn PieceBehavior> {
        self.pieces
            .iter()
            .copied()
            .find(|kind| kind.name() == piece_type_id)
    }
}

#[derive(Debug, Error)]
pub enum PackError {
    #[error(
        "The pack directory {directory} does not contain a pack.yml file.\n\n\
         If you are trying to create a new pack, make sure to include a pack.yml file in the \
         pack's root directory.\nIf you are trying to install a pack, make sure you have placed \
         it directly in the packs directory, and not nested within another directory."
    )]
    MissingDescriptor { directory: String },
    #[error("{path} is missing the {field} field.")]
    MissingField { path: String, field: &'static str },
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: String,
        source: serde_yaml::Error,
    },
}

struct Descriptor {
    name: String,
    description: String,
    author: Option<String>,
    source: Option<String>,
    depends_on: Vec<String>,
}

fn parse_descriptor(path: &Path) -> Result<Descriptor, PackError> {
    let display_path = path.display().to_string();

    let raw = fs::read_to_string(path).map_err(|source| PackError::Io {
        path: display_path.clone(),
        source,
    })?;
    let data: serde_yaml::Value =
        serde_yaml::from_str(&raw).map_err(|source| PackError::Yaml {
            path: display_path.clone(),
            source,
        })?;

    for field in REQUIRED_DESCRIPTOR_FIELDS {
        if data.get(field).and_then(serde_yaml::Value::as_str).is_none() {
            return Err(PackError::MissingField {
                path: display_path,
                field,
            });
        }
    }

    let as_string = |field: &str| {
        data.get(field)
            .and_then(serde_yaml::Value::as_str)
            .map(str::to_string)
    };

    let depends_on = data
        .get("depends_on")
        .and_then(serde_yaml::Value::as_sequence)
        .map(|entries| {
            entries
                .iter()
                .filter_map(serde_yaml::Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(Descriptor {
        name: as_string("name").unwrap_or_default(),
        description: as_string("description").unwrap_or_default(),
        author: as_string("author"),
        source: as_string("source"),
        depends_on,
    })
}

/// Loads every registered pack's descriptor from `packs_dir` and validates
/// that no stray pack directory is missing its descriptor.
pub fn load_packs(
    packs_dir: &Path,
    registered: Vec<(&'static str, PackContent)>,
) -> Result<BTreeMap<String, Pack>, PackError> {
    // Any directory a pack author dropped in must at least carry the
    // descriptor, registered or not.
    if let Ok(entries) = fs::read_dir(packs_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() && !path.join("pack.yml").is_file() {
                return Err(PackError::MissingDescriptor {
                    directory: path.display().to_string(),
                });
            }
        }
    }

    let mut result = BTreeMap::new();
    for (id, content) in registered {
        let directory = packs_dir.join(id);
        let descriptor_path = directory.join("pack.yml");
        if !descriptor_path.is_file() {
            return Err(PackError::MissingDescriptor {
                directory: directory.display().to_string(),
            });
        }

        let descriptor = parse_descriptor(&descriptor_path)?;
        tracing::info!(pack = id, name = descriptor.name.as_str(), "Loaded pack.");

        result.insert(
            id.to_string(),
            Pack {
                id: id.to_string(),
                display_name: descriptor.name,
                description: descriptor.description,
                author: descriptor.author,
                source: descriptor.source,
                depends_on: descriptor.depends_on,
                controllers: content.controllers,
                pieces: content.pieces,
                decorators: content.decorators,
            },
        );
    }

    Ok(result)
}

/// The `update_pack_data` payload: everything a client needs to render any
/// game of any pack.
pub fn pack_data_json(packs: &BTreeMap<String, Pack>) -> Value {
    let map: serde_json::Map<String, Value> = packs
        .iter()
        .map(|(id, pack)| {
            let controllers: serde_json::Map<String, Value> = pack
                .controllers
                .iter()
                .map(|spec| {
                    let options: serde_json::Map<String, Value> = spec
                        .options()
                        .into_iter()
                        .map(|(name, option)| (name.to_string(), json!(option)))
                        .collect();
                    (
                        spec.name().to_string(),
                        json!({
                            "rows": spec.board_size().row,
                            "cols": spec.board_size().col,
                            "colors": spec.colors(),
                            "options": options,
                        }),
                    )
                })
                .collect();

            let pieces: serde_json::Map<String, Value> = pack
                .pieces
                .iter()
                .map(|kind| (kind.name().to_string(), json!({"image": kind.image()})))
                .collect();

            let decorators: serde_json::Map<String, Value> = pack
                .decorators
                .iter()
                .map(|kind| (kind.name().to_string(), json!({"image": kind.image()})))
                .collect();

            (
                id.clone(),
                json!({
                    "display_name": pack.display_name,
                    "description": pack.description,
                    "controllers": controllers,
                    "pieces": pieces,
                    "decorators": decorators,
                }),
            )
        })
        .collect();
    json!(map)
}
