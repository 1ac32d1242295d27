use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Scene used whenever a caller names an id the catalog does not know.
pub const DEFAULT_SCENE: &str = "reading";

const BUILTIN_SCENES: &str = include_str!("../scenes.json");

/// Rule fragments for one activity context (reading, homework, ...).
/// Immutable once the catalog is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDefinition {
    pub id: String,
    /// Display name, used inside prompts ("专心读书").
    pub name: String,
    pub focused_desc: String,
    pub distracted_desc: String,
    pub examples: SceneExamples,
    /// Present only for scenes where sitting posture matters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posture: Option<PostureCheck>,
    pub encourage_prefix: String,
    pub rest_prefix: String,
}

impl SceneDefinition {
    pub fn posture_check(&self) -> bool {
        self.posture.is_some()
    }
}

/// Example phrasings, in the order they are shown to the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneExamples {
    pub normal: Vec<String>,
    pub distracted: Vec<String>,
    pub away: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureCheck {
    pub examples: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("scene catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read scene catalog '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("scene '{scene}' is missing required field '{field}'")]
    MissingField { scene: String, field: &'static str },
    #[error("scene id '{0}' is defined more than once")]
    DuplicateScene(String),
    #[error("default scene 'reading' is not defined")]
    MissingDefault,
}

#[derive(Deserialize)]
struct CatalogFile {
    scenes: Vec<SceneDefinition>,
}

/// Read-only table of scene definitions, validated when built.
#[derive(Debug, Clone)]
pub struct SceneCatalog {
    scenes: Vec<SceneDefinition>,
    default_index: usize,
}

impl SceneCatalog {
    /// The six scenes shipped with the service.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_SCENES)
    }

    /// Load an operator-supplied catalog file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(text)?;
        Self::from_definitions(file.scenes)
    }

    pub fn from_definitions(scenes: Vec<SceneDefinition>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for scene in &scenes {
            validate_scene(scene)?;
            if !seen.insert(scene.id.as_str()) {
                return Err(CatalogError::DuplicateScene(scene.id.clone()));
            }
        }

        let default_index = scenes
            .iter()
            .position(|scene| scene.id == DEFAULT_SCENE)
            .ok_or(CatalogError::MissingDefault)?;

        Ok(Self {
            scenes,
            default_index,
        })
    }

    /// Resolve a scene id. Unknown ids fall back to the default scene.
    pub fn lookup(&self, scene_id: &str) -> &SceneDefinition {
        self.scenes
            .iter()
            .find(|scene| scene.id == scene_id)
            .unwrap_or(&self.scenes[self.default_index])
    }

    pub fn contains(&self, scene_id: &str) -> bool {
        self.scenes.iter().any(|scene| scene.id == scene_id)
    }

    pub fn default_scene(&self) -> &SceneDefinition {
        &self.scenes[self.default_index]
    }

    /// All scenes in catalog order.
    pub fn scenes(&self) -> &[SceneDefinition] {
        &self.scenes
    }
}

fn validate_scene(scene: &SceneDefinition) -> Result<(), CatalogError> {
    let label = if scene.id.trim().is_empty() {
        "<unnamed>".to_string()
    } else {
        scene.id.clone()
    };
    let missing = |field: &'static str| CatalogError::MissingField {
        scene: label.clone(),
        field,
    };

    let required_text = [
        ("id", &scene.id),
        ("name", &scene.name),
        ("focused_desc", &scene.focused_desc),
        ("distracted_desc", &scene.distracted_desc),
        ("encourage_prefix", &scene.encourage_prefix),
        ("rest_prefix", &scene.rest_prefix),
    ];
    for (field, value) in required_text {
        if value.trim().is_empty() {
            return Err(missing(field));
        }
    }

    let required_lists = [
        ("examples.normal", &scene.examples.normal),
        ("examples.distracted", &scene.examples.distracted),
        ("examples.away", &scene.examples.away),
    ];
    for (field, list) in required_lists {
        if list.iter().all(|example| example.trim().is_empty()) {
            return Err(missing(field));
        }
    }

    if let Some(posture) = &scene.posture {
        if posture.examples.iter().all(|example| example.trim().is_empty()) {
            return Err(missing("posture.examples"));
        }
    }

    Ok(())
}
