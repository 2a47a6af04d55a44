use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Texture manifest for a scene, mapping body names to image paths.
/// Loaded from a JSON file at runtime; every entry is optional because each
/// load site substitutes a procedural placeholder on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneManifest {
    /// Lowercase body name → image path.
    #[serde(default)]
    pub bodies: HashMap<String, String>,
    /// Shared moon texture path.
    #[serde(default)]
    pub moon: Option<String>,
    /// Saturn ring texture path.
    #[serde(default)]
    pub ring: Option<String>,
    /// Asteroid surface texture path.
    #[serde(default)]
    pub asteroid: Option<String>,
    /// Dust billboard sprite path.
    #[serde(default)]
    pub dust: Option<String>,
    /// Six cubemap face paths: +X −X +Y −Y +Z −Z.
    #[serde(default)]
    pub skybox: Option<[String; 6]>,
}

impl SceneManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Texture path for a body, looked up by lowercased name.
    pub fn body_path(&self, name: &str) -> Option<&str> {
        self.bodies.get(&name.to_lowercase()).map(String::as_str)
    }
}

impl Default for SceneManifest {
    /// The reference asset layout.
    fn default() -> Self {
        let bodies = [
            ("sun", "assets/textures/sun.jpeg"),
            ("mercury", "assets/textures/mercury.jpeg"),
            ("venus", "assets/textures/venus.jpeg"),
            ("earth", "assets/textures/earth.jpeg"),
            ("mars", "assets/textures/mars.jpeg"),
            ("jupiter", "assets/textures/jupiter.jpeg"),
            ("saturn", "assets/textures/saturn.jpeg"),
            ("uranus", "assets/textures/uranus.jpeg"),
            ("neptune", "assets/textures/neptune.jpeg"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            bodies,
            moon: Some("assets/textures/moon.jpeg".into()),
            ring: Some("assets/textures/saturn_ring.png".into()),
            asteroid: Some("assets/textures/asteroid.jpg".into()),
            dust: Some("assets/textures/dust_particle.png".into()),
            skybox: Some([
                "assets/skybox/right.jpg".into(),
                "assets/skybox/left.jpg".into(),
                "assets/skybox/top.jpg".into(),
                "assets/skybox/bottom.jpg".into(),
                "assets/skybox/front.jpg".into(),
                "assets/skybox/back.jpg".into(),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_partial_manifest() {
        let json = r#"{
            "bodies": { "earth": "tex/earth.png" },
            "ring": "tex/ring.png"
        }"#;
        let manifest = SceneManifest::from_json(json).unwrap();
        assert_eq!(manifest.body_path("Earth"), Some("tex/earth.png"));
        assert_eq!(manifest.ring.as_deref(), Some("tex/ring.png"));
        assert!(manifest.moon.is_none());
        assert!(manifest.skybox.is_none());
    }

    #[test]
    fn default_covers_all_reference_bodies() {
        let manifest = SceneManifest::default();
        for name in [
            "Sun", "Mercury", "Venus", "Earth", "Mars",
            "Jupiter", "Saturn", "Uranus", "Neptune",
        ] {
            assert!(manifest.body_path(name).is_some(), "missing {name}");
        }
        assert!(manifest.skybox.is_some());
    }

    #[test]
    fn json_round_trip() {
        let manifest = SceneManifest::default();
        let json = serde_json::to_string(&manifest).unwrap();
        let back = SceneManifest::from_json(&json).unwrap();
        assert_eq!(back.bodies.len(), manifest.bodies.len());
        assert_eq!(back.moon, manifest.moon);
    }
}
