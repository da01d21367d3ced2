use crate::normalize::normalize;
use crate::parse::load_pose_from_string;
use crate::resolve::RigBinding;
use crate::retarget::apply_frame;
use crate::settings::Settings;
use crate::skeleton::Skeleton;
use crate::types::*;
use log::{info, warn};
use std::path::Path;
use std::time::Duration;

/// Everything the driver loop owns: the loaded frames, where playback is, and the skeleton
/// being posed together with its bindings. Loads replace state wholesale; the last one wins.
#[derive(Debug, Clone)]
pub struct PlaybackState {
    frames: Vec<Frame>,
    frame: Index,
    skeleton: Option<Skeleton>,
    rig: RigBinding,
    playing: bool,
    since_step: Duration,
    settings: Settings,
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState::new(Settings::default())
    }
}

impl PlaybackState {
    pub fn new(settings: Settings) -> Self {
        PlaybackState {
            frames: Vec::new(),
            frame: 0,
            skeleton: None,
            rig: RigBinding::default(),
            playing: true,
            since_step: Duration::ZERO,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame_index(&self) -> Index {
        self.frame
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.frames.get(self.frame)
    }

    pub fn skeleton(&self) -> Option<&Skeleton> {
        self.skeleton.as_ref()
    }

    pub fn rig(&self) -> &RigBinding {
        &self.rig
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
        self.since_step = Duration::ZERO;
    }

    pub fn toggle_playing(&mut self) {
        self.set_playing(!self.playing);
    }

    ////////////////////////////////////////////////////////////////////////////////////////////// loading

    /// Replace the frame sequence. Frames are capped, normalized once and played from the start.
    pub fn load_frames(&mut self, mut frames: Vec<Frame>) {
        if let Some(max) = self.settings.playback.max_frames {
            frames.truncate(max);
        }
        normalize(&mut frames, &self.settings.normalize);
        info!("loaded {} pose frame(s)", frames.len());
        self.frames = frames;
        self.frame = 0;
        self.since_step = Duration::ZERO;
    }

    pub fn load_pose_str(&mut self, text: &str) {
        self.load_frames(load_pose_from_string(text));
    }

    /// Read and load a pose file. On a read failure the current frames stay in place.
    pub fn load_pose_file(&mut self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                self.load_pose_str(&text);
                Ok(())
            }
            Err(err) => {
                warn!("failed to read pose file {path:?}: {err}");
                Err(err)
            }
        }
    }

    /// Replace the skeleton. The rest snapshot is taken here, before any frame touches it.
    pub fn load_skeleton(&mut self, skeleton: Skeleton) {
        self.rig = RigBinding::resolve(&skeleton);
        info!(
            "loaded skeleton with {} bone(s), {} joint(s) bound",
            skeleton.len(),
            self.rig.bound_count()
        );
        self.skeleton = Some(skeleton);
    }

    ////////////////////////////////////////////////////////////////////////////////////////////// stepping

    /// Move to the next frame, wrapping to the first after the last.
    pub fn advance(&mut self) -> Index {
        if !self.frames.is_empty() {
            self.frame = (self.frame + 1) % self.frames.len();
        }
        self.frame
    }

    /// Move to the previous frame, wrapping to the last before the first.
    pub fn step_back(&mut self) -> Index {
        if !self.frames.is_empty() {
            self.frame = (self.frame + self.frames.len() - 1) % self.frames.len();
        }
        self.frame
    }

    /// Pose the skeleton with the current frame. Returns how many bones changed.
    pub fn apply_current(&mut self) -> usize {
        let (Some(skeleton), Some(frame)) = (self.skeleton.as_mut(), self.frames.get(self.frame))
        else {
            return 0;
        };
        apply_frame(frame, skeleton, &self.rig, &self.settings.retarget)
    }

    /// Feed elapsed display time. Once a full playback interval has passed (and playback is on),
    /// the current frame is applied and playback moves on. Returns whether it did.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        if !self.playing || self.frames.is_empty() {
            return false;
        }
        self.since_step += elapsed;
        if self.since_step < self.settings.playback.interval() {
            return false;
        }
        self.since_step = Duration::ZERO;
        self.apply_current();
        self.advance();
        true
    }
}
