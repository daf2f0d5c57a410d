//! Animation clips and the per-actor frame cursor
//!
//! The sprite side only needs the current clip name and integer frame; the
//! simulation needs to know when a clip loops and when the integer frame
//! changes, because several rules are keyed on those moments.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::machine::SimContext;

/// Fired once each time a clip wraps around
pub type AnimationHook<A> = fn(&mut A, &mut SimContext<'_>);
/// Fired once each time the integer frame changes
pub type FrameHook<A> = fn(&mut A, &mut SimContext<'_>, u32);

/// A named run of frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub first_frame: u32,
    pub last_frame: u32,
    /// Frames per second
    pub fps: f32,
}

impl Clip {
    pub fn frame_count(&self) -> u32 {
        self.last_frame.saturating_sub(self.first_frame) + 1
    }
}

/// Clip registry for one species (content data)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimationSet {
    clips: HashMap<String, Clip>,
}

impl AnimationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a clip; registering an existing name is a no-op
    pub fn register(&mut self, name: &str, first_frame: u32, last_frame: u32, fps: f32) -> bool {
        if self.clips.contains_key(name) {
            return false;
        }
        self.clips.insert(
            name.to_string(),
            Clip {
                first_frame,
                last_frame,
                fps,
            },
        );
        true
    }

    pub fn with(mut self, name: &str, first_frame: u32, last_frame: u32, fps: f32) -> Self {
        self.register(name, first_frame, last_frame, fps);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Clip> {
        self.clips.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    pub fn player() -> Self {
        Self::new()
            .with("Idle", 0, 0, 0.0)
            .with("Run", 1, 3, 30.0)
            .with("Jump", 4, 4, 0.0)
            .with("Slip", 5, 5, 0.0)
            .with("Hit", 6, 6, 0.0)
            .with("Death", 7, 7, 0.0)
            .with("Flatten", 8, 9, 4.0)
    }

    pub fn turtle() -> Self {
        Self::new()
            .with("Run", 0, 3, 20.0)
            .with("Turn", 4, 5, 4.0)
            .with("OnBack", 6, 7, 1.0)
    }

    pub fn crab() -> Self {
        Self::new()
            .with("Run", 0, 3, 20.0)
            .with("RunAngry", 4, 7, 30.0)
            .with("Turn", 8, 9, 4.0)
            .with("OnBack", 10, 11, 1.0)
    }

    pub fn coin() -> Self {
        Self::new()
            .with("Rotate", 0, 4, 15.0)
            .with("Collect", 5, 9, 10.0)
    }
}

/// Shared clip sets, one per sprite sheet
#[derive(Debug, Clone)]
pub struct ClipLibrary {
    pub player: Arc<AnimationSet>,
    pub turtle: Arc<AnimationSet>,
    pub crab: Arc<AnimationSet>,
    pub coin: Arc<AnimationSet>,
}

impl Default for ClipLibrary {
    fn default() -> Self {
        Self {
            player: Arc::new(AnimationSet::player()),
            turtle: Arc::new(AnimationSet::turtle()),
            crab: Arc::new(AnimationSet::crab()),
            coin: Arc::new(AnimationSet::coin()),
        }
    }
}

/// What happened during one `advance`
pub struct AnimationStep<A> {
    /// The clip wrapped; carries the end hook if one is set
    pub looped: bool,
    pub on_end: Option<AnimationHook<A>>,
    /// New integer frame, if it changed
    pub frame_changed: Option<u32>,
}

/// Frame cursor over a shared clip set
pub struct Animator<A> {
    set: Arc<AnimationSet>,
    current: Option<String>,
    frame: f32,
    frame_count: u32,
    clip_fps: f32,
    speed: f32,
    on_end: Option<AnimationHook<A>>,
}

impl<A> Clone for Animator<A> {
    fn clone(&self) -> Self {
        Self {
            set: Arc::clone(&self.set),
            current: self.current.clone(),
            frame: self.frame,
            frame_count: self.frame_count,
            clip_fps: self.clip_fps,
            speed: self.speed,
            on_end: self.on_end,
        }
    }
}

impl<A> fmt::Debug for Animator<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animator")
            .field("current", &self.current)
            .field("frame", &self.frame)
            .field("speed", &self.speed)
            .field("has_end_hook", &self.on_end.is_some())
            .finish()
    }
}

impl<A> Animator<A> {
    pub fn new(set: Arc<AnimationSet>) -> Self {
        Self {
            set,
            current: None,
            frame: 0.0,
            frame_count: 0,
            clip_fps: 0.0,
            speed: 1.0,
            on_end: None,
        }
    }

    /// Switch clip. Unknown names and the clip already playing are ignored
    /// (the previous clip and end hook stay). Returns whether it switched.
    pub fn play(&mut self, name: Option<&str>, on_end: Option<AnimationHook<A>>) -> bool {
        let Some(name) = name else {
            return false;
        };
        if self.current.as_deref() == Some(name) {
            return false;
        }
        let Some(clip) = self.set.get(name).copied() else {
            log::trace!("animation {name} not registered, keeping {:?}", self.current);
            return false;
        };
        self.current = Some(name.to_string());
        self.frame_count = clip.frame_count();
        self.clip_fps = clip.fps;
        self.frame = 0.0;
        self.on_end = on_end;
        true
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_playing(&self, name: &str) -> bool {
        self.current.as_deref() == Some(name)
    }

    pub fn has_clip(&self, name: &str) -> bool {
        self.set.has(name)
    }

    /// Integer frame within the current clip
    pub fn frame(&self) -> u32 {
        self.frame.floor() as u32
    }

    pub fn set_frame(&mut self, index: u32) {
        if index < self.frame_count {
            self.frame = index as f32;
        }
    }

    /// Playback multiplier on top of the clip's own rate
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Move the cursor. Each wrap and each integer frame change is reported
    /// exactly once, however many ticks the cursor spends inside a frame.
    pub fn advance(&mut self, delta_time: f32) -> AnimationStep<A> {
        let previous = self.frame.floor() as i64;
        self.frame += delta_time * self.clip_fps * self.speed;

        let mut looped = false;
        if self.frame_count > 0 && self.frame >= self.frame_count as f32 {
            self.frame = 0.0;
            looped = true;
        }

        let current = self.frame.floor() as i64;
        AnimationStep {
            looped,
            on_end: if looped { self.on_end } else { None },
            frame_changed: (current != previous).then_some(current as u32),
        }
    }
}
