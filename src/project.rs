//! Project folder
//!
//! Schema 1 levels are edited inside a project folder that holds the level
//! files and an `Assets/Textures` directory with the material textures the
//! viewport uses. Several materials share one texture file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use log::{debug, warn};
use thiserror::Error;

use crate::flat::FlatMaterial;

/// Texture directory relative to the project root
pub const TEXTURES_DIR: [&str; 2] = ["Assets", "Textures"];

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project root {0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("could not create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Texture file a material is drawn with
pub fn texture_file(material: FlatMaterial) -> Option<&'static str> {
    let file = match material {
        FlatMaterial::Default | FlatMaterial::Grab | FlatMaterial::Ice | FlatMaterial::Breakable => {
            "default_GRAB.png"
        }
        FlatMaterial::Lava | FlatMaterial::LavaGrapple => "lava_GRAB.jpg",
        FlatMaterial::Wood => "wood_GRAB.png",
        FlatMaterial::Grapple => "grapple_GRAB.jpg",
        FlatMaterial::Colored | FlatMaterial::Bounce | FlatMaterial::Snow => "colored_GRAB.png",
        FlatMaterial::Unknown(_) => return None,
    };
    Some(file)
}

/// A working folder for schema 1 levels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Open a project folder, creating `Assets/Textures` when missing
    pub fn open_or_create(root: impl Into<PathBuf>) -> Result<Self, ProjectError> {
        let root = root.into();
        if root.exists() && !root.is_dir() {
            return Err(ProjectError::NotADirectory(root));
        }
        let project = Self { root };
        let textures = project.textures_dir();
        std::fs::create_dir_all(&textures).map_err(|source| ProjectError::CreateDir {
            path: textures.clone(),
            source,
        })?;
        debug!("project folder ready at {}", project.root.display());
        Ok(project)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn textures_dir(&self) -> PathBuf {
        TEXTURES_DIR.iter().fold(self.root.clone(), |p, part| p.join(part))
    }

    /// Resolve a level path relative to the project root
    pub fn level_path(&self, name: &str) -> PathBuf {
        let path = self.root.join(name);
        if path.extension().is_none() {
            path.with_extension("json")
        } else {
            path
        }
    }

    /// Decode every material texture present in the project
    pub fn load_textures(&self) -> TextureSet {
        TextureSet::load(&self.textures_dir())
    }
}

/// Decoded material textures, keyed by material code
#[derive(Debug, Default)]
pub struct TextureSet {
    images: HashMap<&'static str, RgbaImage>,
    by_material: HashMap<i64, &'static str>,
}

impl TextureSet {
    /// Load each texture file once. Missing or undecodable files are skipped.
    pub fn load(dir: &Path) -> Self {
        let mut set = Self::default();
        for material in FlatMaterial::ALL {
            let Some(file) = texture_file(material) else {
                continue;
            };
            if !set.images.contains_key(file) {
                let path = dir.join(file);
                if !path.exists() {
                    debug!("no texture {} for {}", path.display(), material.name());
                    continue;
                }
                match image::open(&path) {
                    Ok(img) => {
                        set.images.insert(file, img.to_rgba8());
                    }
                    Err(e) => {
                        warn!("failed to load texture {}: {}", path.display(), e);
                        continue;
                    }
                }
            }
            set.by_material.insert(material.code(), file);
        }
        debug!("loaded {} textures from {}", set.images.len(), dir.display());
        set
    }

    pub fn get(&self, material_code: i64) -> Option<&RgbaImage> {
        self.by_material
            .get(&material_code)
            .and_then(|file| self.images.get(file))
    }

    /// Number of distinct image files loaded
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_creates_texture_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let project = Project::open_or_create(tmp.path().join("proj")).unwrap();
        assert!(project.textures_dir().is_dir());
        assert!(project.textures_dir().ends_with("Assets/Textures"));
        // Reopening an existing project is fine
        Project::open_or_create(project.root()).unwrap();
    }

    #[test]
    fn test_file_root_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("level.json");
        std::fs::write(&file, "{}").unwrap();
        assert!(matches!(
            Project::open_or_create(&file),
            Err(ProjectError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_texture_table() {
        assert_eq!(texture_file(FlatMaterial::Ice), Some("default_GRAB.png"));
        assert_eq!(texture_file(FlatMaterial::LavaGrapple), Some("lava_GRAB.jpg"));
        assert_eq!(texture_file(FlatMaterial::Snow), Some("colored_GRAB.png"));
        assert_eq!(texture_file(FlatMaterial::Unknown(40)), None);
    }

    #[test]
    fn test_loads_shared_textures_and_skips_bad_files() {
        let tmp = tempfile::tempdir().unwrap();
        let project = Project::open_or_create(tmp.path()).unwrap();
        let dir = project.textures_dir();

        RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]))
            .save(dir.join("default_GRAB.png"))
            .unwrap();
        std::fs::write(dir.join("wood_GRAB.png"), b"not a png").unwrap();

        let set = project.load_textures();
        assert_eq!(set.len(), 1);
        let grab = set.get(FlatMaterial::Grab.code()).unwrap();
        assert_eq!(grab.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
        assert!(set.get(FlatMaterial::Breakable.code()).is_some());
        assert!(set.get(FlatMaterial::Wood.code()).is_none());
        assert!(set.get(FlatMaterial::Lava.code()).is_none());
    }

    #[test]
    fn test_level_path_adds_extension() {
        let project = Project { root: PathBuf::from("/p") };
        assert_eq!(project.level_path("intro"), PathBuf::from("/p/intro.json"));
        assert_eq!(project.level_path("a.level"), PathBuf::from("/p/a.level"));
    }
}
