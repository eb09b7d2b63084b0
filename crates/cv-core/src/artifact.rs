use std::path::PathBuf;

use serde::Serialize;

/// Directory (under the output root) holding one file per component.
pub const COMPONENTS_DIR: &str = "components";
/// Directory (under the output root) holding one file per system.
pub const SYSTEMS_DIR: &str = "systems";
/// File name of the root-level entity factory.
pub const FACTORY_FILE: &str = "factory.js";

/// A library-provided class a generated class derives from.
///
/// Inheritance is recorded as data on each artifact; the code generator
/// decides how to express it in the target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseClass {
    /// The runtime's `Component` base.
    Component,
    /// The runtime's generic `System` base (3D variant).
    System,
    /// A system drawn once per frame (2D variant).
    RenderSystem,
    /// A system updated once per tick (2D variant).
    BehaviorSystem,
}

impl BaseClass {
    /// Class name as exported by the runtime module.
    pub fn class_name(self) -> &'static str {
        match self {
            BaseClass::Component => "Component",
            BaseClass::System => "System",
            BaseClass::RenderSystem => "RenderSystem",
            BaseClass::BehaviorSystem => "BehaviorSystem",
        }
    }

    /// Recognize a declared system parent under the 2D variant.
    pub fn parse_system_parent(name: &str) -> Option<Self> {
        match name {
            "RenderSystem" => Some(BaseClass::RenderSystem),
            "BehaviorSystem" => Some(BaseClass::BehaviorSystem),
            _ => None,
        }
    }
}

/// One entity-builder function exported by the factory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryFunction {
    /// Name of the template the function builds.
    pub entity_type: String,
    /// Name of the generated function, e.g. `createGoblin`.
    pub function_name: String,
}

/// What an artifact is, plus the metadata specific to that kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactKind {
    /// A component class.
    Component,
    /// A system class, with the base class it derives from (if any).
    System {
        /// The runtime base class, `None` for a plain 2D system.
        base: Option<BaseClass>,
    },
    /// The entity factory.
    Factory {
        /// Builder functions in template declaration order.
        functions: Vec<FactoryFunction>,
    },
}

/// One generated source file: pure data, never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Declared name (component, system, or `Factory`).
    pub name: String,
    /// File name within its output directory.
    pub filename: String,
    /// Full generated source text.
    pub source: String,
    /// Kind and kind-specific metadata.
    pub kind: ArtifactKind,
}

impl Artifact {
    /// Path relative to the output root where this artifact is stored.
    pub fn relative_path(&self) -> PathBuf {
        match self.kind {
            ArtifactKind::Component => PathBuf::from(COMPONENTS_DIR).join(&self.filename),
            ArtifactKind::System { .. } => PathBuf::from(SYSTEMS_DIR).join(&self.filename),
            ArtifactKind::Factory { .. } => PathBuf::from(&self.filename),
        }
    }

    /// Label used by reporters: `Component`, `Factory`, or the system's base class.
    pub fn type_label(&self) -> &'static str {
        match &self.kind {
            ArtifactKind::Component => "Component",
            ArtifactKind::System { base } => base.map_or("System", BaseClass::class_name),
            ArtifactKind::Factory { .. } => "Factory",
        }
    }

    /// Factory functions, empty for non-factory artifacts.
    pub fn factory_functions(&self) -> &[FactoryFunction] {
        match &self.kind {
            ArtifactKind::Factory { functions } => functions,
            _ => &[],
        }
    }
}
