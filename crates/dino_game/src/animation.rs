//! Animation registry for the game's clips.
//!
//! Entities hold an [`AnimationId`] instead of a reference to a clip, and ask
//! the [`AnimationSet`] for the definition each frame. Reloading the atlas only
//! swaps the set; handles stay valid.

use dino_core::animation::Animation;

use crate::atlas::AtlasRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationId {
    DinoIdle,
    DinoRun,
    DinoDuck,
    DinoJump,
    DinoDead,
    Pterodactyl,
}

impl AnimationId {
    pub const ALL: [AnimationId; 6] = [
        AnimationId::DinoIdle,
        AnimationId::DinoRun,
        AnimationId::DinoDuck,
        AnimationId::DinoJump,
        AnimationId::DinoDead,
        AnimationId::Pterodactyl,
    ];

    /// Clip name in the atlas metadata.
    pub fn clip_name(self) -> &'static str {
        match self {
            Self::DinoIdle => "dino_idle",
            Self::DinoRun => "dino_run",
            Self::DinoDuck => "dino_duck",
            Self::DinoJump => "dino_jump",
            Self::DinoDead => "dino_dead",
            Self::Pterodactyl => "pterodactyl",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

pub struct AnimationSet {
    clips: Vec<Animation>,
}

impl AnimationSet {
    /// Resolve every [`AnimationId`] against the atlas. Fails on the first
    /// missing clip.
    pub fn from_atlas(atlas: &AtlasRegistry) -> Result<Self, String> {
        let clips = AnimationId::ALL
            .iter()
            .map(|id| atlas.animation(id.clip_name()).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { clips })
    }

    pub fn get(&self, id: AnimationId) -> &Animation {
        &self.clips[id.slot()]
    }
}
