//! Scene registry
//!
//! Canonical ordered list of the presentation's scenes and which one is on
//! screen. Only one scene is active at a time; the transition controller is
//! the only writer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a presentation scene, in presentation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneId {
    /// Opening animation
    Intro,
    /// 3D memory gallery
    Memory,
    /// Letter-opening interaction
    Letter,
    /// Candle finale
    Finale,
}

impl SceneId {
    /// Every scene in presentation order
    pub const ALL: [Self; 4] = [Self::Intro, Self::Memory, Self::Letter, Self::Finale];

    /// Position in presentation order
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable lowercase name
    pub fn name(self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::Memory => "memory",
            Self::Letter => "letter",
            Self::Finale => "finale",
        }
    }

    /// Whether entering the scene allocates GPU resources that must be
    /// released when leaving it
    pub fn is_resource_heavy(self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scene name that matches no registered scene
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown scene '{0}'")]
pub struct UnknownScene(pub String);

impl FromStr for SceneId {
    type Err = UnknownScene;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.name() == name)
            .ok_or_else(|| UnknownScene(name.to_string()))
    }
}

/// Presentation state of one scene
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Scene identifier
    pub id: SceneId,
    /// Whether the scene is shown
    pub active: bool,
    /// Layer opacity, animated by cross-fades
    pub opacity: f32,
}

/// Ordered registry of every scene plus the current one
#[derive(Debug, Clone)]
pub struct SceneRegistry {
    scenes: Vec<Scene>,
    current: SceneId,
}

impl SceneRegistry {
    /// All scenes registered, the first one active
    pub fn new() -> Self {
        let scenes = SceneId::ALL
            .into_iter()
            .map(|id| Scene {
                id,
                active: id == SceneId::Intro,
                opacity: 1.0,
            })
            .collect();
        Self {
            scenes,
            current: SceneId::Intro,
        }
    }

    /// Scene currently shown
    pub fn current(&self) -> SceneId {
        self.current
    }

    /// Record the current scene
    pub fn set_current(&mut self, id: SceneId) {
        self.current = id;
    }

    /// Look up a scene
    pub fn scene(&self, id: SceneId) -> &Scene {
        &self.scenes[id.index()]
    }

    /// Look up a scene for modification
    pub fn scene_mut(&mut self, id: SceneId) -> &mut Scene {
        &mut self.scenes[id.index()]
    }

    /// Hide every scene
    pub fn hide_all(&mut self) {
        for scene in &mut self.scenes {
            scene.active = false;
        }
    }

    /// Show a scene at full opacity
    pub fn activate(&mut self, id: SceneId) {
        let scene = self.scene_mut(id);
        scene.active = true;
        scene.opacity = 1.0;
    }

    /// Hide a scene
    pub fn deactivate(&mut self, id: SceneId) {
        self.scene_mut(id).active = false;
    }

    /// Hide everything, then show `id`
    pub fn show_only(&mut self, id: SceneId) {
        self.hide_all();
        self.activate(id);
    }

    /// Scenes currently shown, in presentation order
    pub fn active_scenes(&self) -> Vec<SceneId> {
        self.scenes.iter().filter(|scene| scene.active).map(|scene| scene.id).collect()
    }
}

impl Default for SceneRegistry {
    fn default() -> Self {
        Self::new()
    }
}
