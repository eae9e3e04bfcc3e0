//! Scene description document model.
//!
//! The server treats a description as opaque beyond its structure: a
//! document holds zero-or-one world, and may instead hold a standalone
//! model that the server merges into a synthesized default world. The
//! text format that produces these documents is owned entirely by the
//! loader collaborator (`gantry-scene` ships the stock one).

use std::time::Duration;

use smallvec::SmallVec;

use crate::error::{ErrorList, LoadError, LoadErrorCode};

/// Name given to the synthesized fallback world.
pub const DEFAULT_WORLD_NAME: &str = "default";

// ── ModelDescription ─────────────────────────────────────────────

/// A standalone simulated object definition.
///
/// A model can exist outside a full world document; the server's
/// resolution fallback merges such a model into a default world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelDescription {
    /// Model name, unique within its world.
    pub name: String,
    /// Named parts of the model. Each part becomes one entity,
    /// registered as `"model::part"`.
    pub parts: Vec<String>,
}

impl ModelDescription {
    /// A model with the given name and no parts.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parts: Vec::new(),
        }
    }

    /// Number of entities this model contributes: the model itself
    /// plus one per part.
    pub fn entity_count(&self) -> usize {
        1 + self.parts.len()
    }
}

// ── WorldDescription ─────────────────────────────────────────────

/// The validated description of one independently-steppable world.
///
/// Owned exclusively by the server after resolution. Mutated at most
/// once, when the default-world fallback inserts a standalone model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldDescription {
    /// World name.
    pub name: String,
    /// Models contained in the world. Inline capacity of one: the
    /// merge fallback produces exactly one, and authored worlds are
    /// usually small.
    pub models: SmallVec<[ModelDescription; 1]>,
    /// Fixed update period declared by the description, if any.
    /// The server configuration may override it.
    pub update_period: Option<Duration>,
}

impl WorldDescription {
    /// An empty world with the given name.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            models: SmallVec::new(),
            update_period: None,
        }
    }

    /// The synthesized minimal default world: a single empty container
    /// named [`DEFAULT_WORLD_NAME`] with zero models.
    pub fn default_world() -> Self {
        Self::empty(DEFAULT_WORLD_NAME)
    }

    /// Append a model to the world.
    pub fn add_model(&mut self, model: ModelDescription) {
        self.models.push(model);
    }

    /// Look up a model by name.
    pub fn model(&self, name: &str) -> Option<&ModelDescription> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Total entities the world describes: the world container plus
    /// every model's contribution.
    pub fn entity_count(&self) -> usize {
        1 + self.models.iter().map(ModelDescription::entity_count).sum::<usize>()
    }
}

// ── SceneDocument ────────────────────────────────────────────────

/// A parsed description document: zero-or-one world, or a standalone
/// model awaiting the default-world merge.
///
/// `Clone` is a deep copy; the server uses it to take independent
/// ownership of caller-supplied in-memory descriptions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SceneDocument {
    world: Option<WorldDescription>,
    model: Option<ModelDescription>,
}

impl SceneDocument {
    /// A document holding a full world.
    pub fn from_world(world: WorldDescription) -> Self {
        Self {
            world: Some(world),
            model: None,
        }
    }

    /// A document holding only a standalone model.
    pub fn from_model(model: ModelDescription) -> Self {
        Self {
            world: None,
            model: Some(model),
        }
    }

    /// A document holding the synthesized default world.
    pub fn default_world() -> Self {
        Self::from_world(WorldDescription::default_world())
    }

    /// The document's world, if it has one.
    pub fn world(&self) -> Option<&WorldDescription> {
        self.world.as_ref()
    }

    /// Mutable access to the document's world, for the merge fallback.
    pub fn world_mut(&mut self) -> Option<&mut WorldDescription> {
        self.world.as_mut()
    }

    /// The standalone model, if the document holds one.
    pub fn model(&self) -> Option<&ModelDescription> {
        self.model.as_ref()
    }

    /// Remove and return the standalone model.
    pub fn take_model(&mut self) -> Option<ModelDescription> {
        self.model.take()
    }

    /// Structural re-validation pass, run after the merge fallback
    /// mutates the document.
    ///
    /// Checks that names are non-empty and that model names within the
    /// world are unique. Returns every violation found, in document
    /// order; an empty list means the document is structurally sound.
    pub fn revalidate(&self) -> ErrorList {
        let mut errors = ErrorList::new();
        if let Some(world) = &self.world {
            if world.name.is_empty() {
                errors.push(LoadError::new(
                    LoadErrorCode::DuplicateName,
                    "world has an empty name",
                ));
            }
            for (i, model) in world.models.iter().enumerate() {
                if model.name.is_empty() {
                    errors.push(LoadError::new(
                        LoadErrorCode::DuplicateName,
                        format!("model at index {i} has an empty name"),
                    ));
                    continue;
                }
                let first = world.models.iter().position(|m| m.name == model.name);
                if first != Some(i) {
                    errors.push(LoadError::new(
                        LoadErrorCode::DuplicateName,
                        format!("duplicate model name [{}] in world [{}]", model.name, world.name),
                    ));
                }
            }
        }
        errors
    }
}
