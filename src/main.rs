use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use pose_retarget::export::{write_export, DEFAULT_EXPORT_NAMES};
use pose_retarget::parse::load_pose_from_file;
use pose_retarget::playback::PlaybackState;
use pose_retarget::resolve::{Binding, LogicalJoint};
use pose_retarget::retarget::Strategy;
use pose_retarget::settings::Settings;
use pose_retarget::skeleton::Skeleton;

const DEFAULT_POSE: &str = "assets/frame.pose";
const DEFAULT_RIG: &str = "assets/avatar_rig.json";

#[derive(clap::Parser)]
#[command(about = "Play 2D pose keypoint files back on a skeleton")]
struct Opts {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Retarget a pose file onto a rig and print the resulting bone rotations.
    Play {
        /// Pose file in any supported layout.
        #[arg(default_value = DEFAULT_POSE)]
        pose: PathBuf,
        /// Rig description (JSON bone list).
        #[arg(long, default_value = DEFAULT_RIG)]
        rig: PathBuf,
        /// Number of playback steps to run.
        #[arg(long, default_value_t = 1)]
        steps: usize,
        #[arg(long, value_enum)]
        strategy: Option<Strategy>,
        #[arg(long)]
        interval_ms: Option<u64>,
        #[arg(long)]
        max_frames: Option<usize>,
        #[arg(long)]
        motion_gain: Option<f64>,
        /// Store the effective settings as the new defaults.
        #[arg(long)]
        save_settings: bool,
        /// Open the interactive viewer instead of printing (needs the `visualize` feature).
        #[arg(long)]
        view: bool,
    },
    /// Write selected body keypoints of a pose file as JSON.
    Export {
        pose: PathBuf,
        output: PathBuf,
        /// Keypoint names to keep (e.g. nose rightElbow).
        #[arg(long, num_args = 1..)]
        names: Option<Vec<String>>,
    },
    /// List the bones of a rig.
    Bones {
        #[arg(default_value = DEFAULT_RIG)]
        rig: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    match Opts::parse().command {
        Command::Play {
            pose,
            rig,
            steps,
            strategy,
            interval_ms,
            max_frames,
            motion_gain,
            save_settings,
            view,
        } => {
            let mut settings = Settings::load();
            if let Some(strategy) = strategy {
                settings.retarget.strategy = strategy;
            }
            if let Some(interval_ms) = interval_ms {
                settings.playback.interval_ms = interval_ms;
            }
            if max_frames.is_some() {
                settings.playback.max_frames = max_frames;
            }
            if let Some(motion_gain) = motion_gain {
                settings.retarget.motion_gain = motion_gain;
            }
            if save_settings {
                settings.save();
            }

            let mut state = PlaybackState::new(settings);
            let skeleton = Skeleton::from_rig_file(&rig)
                .with_context(|| format!("loading rig {}", rig.display()))?;
            state.load_skeleton(skeleton);
            state
                .load_pose_file(&pose)
                .with_context(|| format!("loading pose {}", pose.display()))?;

            if view {
                view_playback(state);
            } else {
                play_headless(&mut state, steps);
            }
        }
        Command::Export {
            pose,
            output,
            names,
        } => {
            let frames = load_pose_from_file(&pose)
                .with_context(|| format!("loading pose {}", pose.display()))?;
            let names = names.unwrap_or_else(|| {
                DEFAULT_EXPORT_NAMES.iter().map(|n| n.to_string()).collect()
            });
            let export = write_export(&frames, names.as_slice(), &output)?;
            println!(
                "exported {} frame(s), skipped {}",
                export.frames.len(),
                export.skipped
            );
        }
        Command::Bones { rig } => {
            let skeleton = Skeleton::from_rig_file(&rig)
                .with_context(|| format!("loading rig {}", rig.display()))?;
            for name in skeleton.bone_names() {
                println!("{name}");
            }
        }
    }
    Ok(())
}

#[cfg(feature = "visualize")]
fn view_playback(state: PlaybackState) {
    pose_retarget::visualize::visualize_playback(state, 1.0);
}

#[cfg(not(feature = "visualize"))]
fn view_playback(_state: PlaybackState) {
    log::warn!("built without the `visualize` feature, nothing to show");
}

/// Step through playback without a display, one interval per step.
fn play_headless(state: &mut PlaybackState, steps: usize) {
    let interval = state.settings().playback.interval();
    for _ in 0..steps {
        let frame = state.frame_index();
        let present = state.current_frame().map_or(0, |f| f.keypoints().count());
        if !state.tick(interval) {
            println!("nothing to play");
            return;
        }
        println!("=============== frame {frame} ({present} keypoints) ===============");
        let (Some(skeleton), rig) = (state.skeleton(), state.rig()) else {
            continue;
        };
        for joint in LogicalJoint::ALL {
            if let Binding::Bound(index) = rig.binding(joint) {
                let bone = &skeleton.bones()[index];
                println!("{:.<20} {:<24} {:6.3?}", joint.name(), bone.name, bone.local_rotation);
            }
        }
    }
}
