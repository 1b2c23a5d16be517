//! Atlas metadata loading and region lookup.
//!
//! The atlas JSON names every source rectangle on the sprite sheet and groups
//! them into animation clips. Everything the game draws is looked up by name
//! here, so re-laying out the sheet only touches the JSON. A copy of the
//! shipped metadata is compiled in and used when the asset cannot be loaded.

use std::collections::{HashMap, HashSet};

use dino_core::animation::Animation;
use dino_core::assets::AssetSource;
use dino_core::Rect;
use glam::Vec2;
use serde::Deserialize;

pub const DEFAULT_ATLAS_JSON: &str = include_str!("../../../assets/atlas/dino_atlas.json");

#[derive(Debug, Deserialize, Clone)]
pub struct AtlasFile {
    pub version: String,
    pub atlas_id: String,
    pub texture: AtlasTexture,
    pub digit_pitch: f32,
    pub regions: Vec<AtlasRegion>,
    #[serde(default)]
    pub animations: Vec<AtlasAnimation>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AtlasTexture {
    pub path: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AtlasRegion {
    pub name: String,
    #[serde(flatten)]
    pub rect: Rect,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AtlasAnimation {
    pub name: String,
    pub frame_step_ms: u32,
    pub frames: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AtlasRegistry {
    pub atlas_id: String,
    pub texture_path: String,
    pub size: Vec2,
    pub digit_pitch: f32,
    regions: HashMap<String, Rect>,
    animations: HashMap<String, Animation>,
}

impl AtlasRegistry {
    pub fn region(&self, name: &str) -> Result<Rect, String> {
        self.regions
            .get(name)
            .copied()
            .ok_or_else(|| format!("Atlas '{}' has no region '{}'", self.atlas_id, name))
    }

    pub fn animation(&self, name: &str) -> Result<&Animation, String> {
        self.animations
            .get(name)
            .ok_or_else(|| format!("Atlas '{}' has no animation '{}'", self.atlas_id, name))
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}

pub fn parse_atlas(raw: &str, origin: &str) -> Result<AtlasRegistry, String> {
    let file: AtlasFile = serde_json::from_str(raw)
        .map_err(|e| format!("Failed to parse atlas metadata {origin}: {e}"))?;
    validate_atlas(&file)?;

    let regions: HashMap<String, Rect> = file
        .regions
        .iter()
        .map(|region| (region.name.clone(), region.rect))
        .collect();

    let mut animations = HashMap::new();
    for anim in &file.animations {
        let frames = anim
            .frames
            .iter()
            .map(|name| regions[name.as_str()])
            .collect();
        animations.insert(
            anim.name.clone(),
            Animation::new(anim.frame_step_ms as f32 / 1000.0, frames),
        );
    }

    Ok(AtlasRegistry {
        atlas_id: file.atlas_id,
        texture_path: file.texture.path,
        size: Vec2::new(file.texture.width as f32, file.texture.height as f32),
        digit_pitch: file.digit_pitch,
        regions,
        animations,
    })
}

pub fn load_atlas(source: &dyn AssetSource, path: &str) -> Result<AtlasRegistry, String> {
    let raw = source.read_text(path)?;
    parse_atlas(&raw, path)
}

/// Load `path`, or fall back to the compiled-in metadata.
pub fn load_atlas_or_default(source: &dyn AssetSource, path: &str) -> AtlasRegistry {
    match load_atlas(source, path) {
        Ok(atlas) => {
            log::info!(
                "Atlas '{}' loaded: {} regions",
                atlas.atlas_id,
                atlas.region_count()
            );
            atlas
        }
        Err(err) => {
            log::warn!("{err}. Using built-in atlas metadata.");
            default_atlas()
        }
    }
}

pub fn default_atlas() -> AtlasRegistry {
    parse_atlas(DEFAULT_ATLAS_JSON, "<built-in>")
        .unwrap_or_else(|err| panic!("Built-in atlas metadata is invalid: {err}"))
}

fn validate_atlas(file: &AtlasFile) -> Result<(), String> {
    if file.version != "0.1" {
        return Err(format!(
            "Atlas validation failed: unsupported version '{}'",
            file.version
        ));
    }
    if file.texture.width == 0 || file.texture.height == 0 {
        return Err("Atlas validation failed: texture width/height must be > 0".to_string());
    }
    if file.digit_pitch <= 0.0 {
        return Err("Atlas validation failed: digit_pitch must be > 0".to_string());
    }

    let tex_w = file.texture.width as f32;
    let tex_h = file.texture.height as f32;
    let mut names = HashSet::new();
    for region in &file.regions {
        if !names.insert(region.name.as_str()) {
            return Err(format!(
                "Atlas validation failed: duplicate region '{}'",
                region.name
            ));
        }
        let r = region.rect;
        if r.width <= 0.0 || r.height <= 0.0 {
            return Err(format!(
                "Atlas validation failed: region '{}' has zero-sized rect",
                region.name
            ));
        }
        if r.x < 0.0 || r.y < 0.0 || r.right() > tex_w || r.bottom() > tex_h {
            return Err(format!(
                "Atlas validation failed: region '{}' exceeds texture bounds {}x{}",
                region.name, file.texture.width, file.texture.height
            ));
        }
    }

    let mut anim_names = HashSet::new();
    for anim in &file.animations {
        if !anim_names.insert(anim.name.as_str()) {
            return Err(format!(
                "Atlas validation failed: duplicate animation '{}'",
                anim.name
            ));
        }
        if anim.frame_step_ms == 0 {
            return Err(format!(
                "Atlas validation failed: animation '{}' has zero frame step",
                anim.name
            ));
        }
        if anim.frames.is_empty() {
            return Err(format!(
                "Atlas validation failed: animation '{}' has no frames",
                anim.name
            ));
        }
        if let Some(missing) = anim.frames.iter().find(|f| !names.contains(f.as_str())) {
            return Err(format!(
                "Atlas validation failed: animation '{}' references missing region '{}'",
                anim.name, missing
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dino_core::assets::MemoryAssetSource;

    const MINIMAL: &str = r#"
    {
      "version": "0.1",
      "atlas_id": "test",
      "texture": { "path": "t.png", "width": 64, "height": 32 },
      "digit_pitch": 4,
      "regions": [
        { "name": "a", "x": 0, "y": 0, "w": 8, "h": 8 },
        { "name": "b", "x": 8, "y": 0, "w": 8, "h": 8 }
      ],
      "animations": [
        { "name": "ab", "frame_step_ms": 250, "frames": ["a", "b"] }
      ]
    }
    "#;

    const SHIPPED_TEXTURE: &[u8] = include_bytes!("../../../assets/textures/dino_atlas.png");

    #[test]
    fn shipped_texture_matches_declared_size() {
        let atlas = default_atlas();
        let image = dino_render::decode_rgba(SHIPPED_TEXTURE).expect("shipped png decodes");
        assert_eq!(
            Vec2::new(image.width as f32, image.height as f32),
            atlas.size
        );
    }

    #[test]
    fn every_shipped_region_has_pixels() {
        let atlas = default_atlas();
        let image = dino_render::decode_rgba(SHIPPED_TEXTURE).expect("shipped png decodes");
        for (name, rect) in &atlas.regions {
            let opaque = (rect.y as u32..rect.bottom() as u32).any(|y| {
                (rect.x as u32..rect.right() as u32).any(|x| {
                    let alpha = ((y * image.width + x) * 4 + 3) as usize;
                    image.pixels[alpha] > 0
                })
            });
            assert!(opaque, "region '{name}' is blank in the shipped texture");
        }
    }

    #[test]
    fn built_in_atlas_is_valid() {
        let atlas = default_atlas();
        assert_eq!(atlas.atlas_id, "dino");
        assert!(atlas.region("digit_0").is_ok());
        assert!(atlas.animation("pterodactyl").is_ok());
    }

    #[test]
    fn parse_resolves_animation_frames() {
        let atlas = parse_atlas(MINIMAL, "test").expect("valid atlas");
        let anim = atlas.animation("ab").expect("clip exists");
        assert_eq!(anim.frame_step, 0.25);
        assert_eq!(anim.frames, vec![Rect::new(0.0, 0.0, 8.0, 8.0), Rect::new(8.0, 0.0, 8.0, 8.0)]);
        assert_eq!(atlas.size, Vec2::new(64.0, 32.0));
    }

    #[test]
    fn unknown_region_is_an_error() {
        let atlas = parse_atlas(MINIMAL, "test").expect("valid atlas");
        let err = atlas.region("zzz").expect_err("missing region");
        assert!(err.contains("no region 'zzz'"));
    }

    #[test]
    fn rejects_region_outside_texture() {
        let raw = MINIMAL.replace(r#""x": 8, "y": 0, "w": 8"#, r#""x": 60, "y": 0, "w": 8"#);
        let err = parse_atlas(&raw, "test").expect_err("out of bounds");
        assert!(err.contains("exceeds texture bounds"));
    }

    #[test]
    fn rejects_animation_with_missing_frame() {
        let raw = MINIMAL.replace(r#"["a", "b"]"#, r#"["a", "c"]"#);
        let err = parse_atlas(&raw, "test").expect_err("missing frame");
        assert!(err.contains("missing region 'c'"));
    }

    #[test]
    fn rejects_duplicate_regions() {
        let raw = MINIMAL.replace(r#""name": "b""#, r#""name": "a""#);
        let err = parse_atlas(&raw, "test").expect_err("duplicate");
        assert!(err.contains("duplicate region"));
    }

    #[test]
    fn missing_asset_falls_back_to_default() {
        let source = MemoryAssetSource::new();
        let atlas = load_atlas_or_default(&source, "atlas/none.json");
        assert_eq!(atlas.atlas_id, "dino");
    }

    #[test]
    fn load_atlas_reads_from_source() {
        let mut source = MemoryAssetSource::new();
        source.insert("atlas/test.json", MINIMAL);
        let atlas = load_atlas(&source, "atlas/test.json").expect("loads");
        assert_eq!(atlas.atlas_id, "test");
        assert_eq!(atlas.digit_pitch, 4.0);
    }
}
