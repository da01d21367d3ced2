//! Export of body keypoints into a compact per-frame JSON document:
//! `[{"keypoints": {"nose": {"x": .., "y": ..}, ..}}, ..]`.

use crate::error::ExportError;
use crate::schema::Part;
use crate::types::*;
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Body keypoint names in export spelling, in body schema order.
pub const EXPORT_BODY_NAMES: [&str; 25] = [
    "nose", "neck", "rightShoulder", "rightElbow", "rightWrist", "leftShoulder", "leftElbow",
    "leftWrist", "midHip", "rightHip", "rightKnee", "rightAnkle", "leftHip", "leftKnee",
    "leftAnkle", "rightEye", "leftEye", "rightEar", "leftEar", "leftBigToe", "leftSmallToe",
    "leftHeel", "rightBigToe", "rightSmallToe", "rightHeel",
];

/// Arms, hips and nose.
pub const DEFAULT_EXPORT_NAMES: [&str; 9] = [
    "nose",
    "leftShoulder",
    "rightShoulder",
    "leftElbow",
    "rightElbow",
    "leftWrist",
    "rightWrist",
    "leftHip",
    "rightHip",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportFrame {
    pub keypoints: BTreeMap<String, Point>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Export {
    pub frames: Vec<ExportFrame>,
    /// Frames that had no body keypoints at all.
    pub skipped: usize,
}

fn __export_index(name: &str) -> Result<Index, ExportError> {
    EXPORT_BODY_NAMES
        .iter()
        .position(|&n| n == name)
        .ok_or_else(|| ExportError::UnknownName(name.to_string()))
}

/// Pick the named body keypoints out of every frame.
pub fn export_frames<S: AsRef<str>>(frames: &[Frame], names: &[S]) -> Result<Export, ExportError> {
    let wanted = names
        .iter()
        .map(|name| Ok((name.as_ref().to_string(), __export_index(name.as_ref())?)))
        .collect::<Result<Vec<_>, ExportError>>()?;

    let mut export = Export::default();
    for frame in frames {
        if frame.body.iter().all(Option::is_none) {
            export.skipped += 1;
            continue;
        }
        let keypoints = wanted
            .iter()
            .filter_map(|(name, index)| {
                frame
                    .get(Part::Body, *index)
                    .map(|p| (name.clone(), Point { x: p.x, y: p.y }))
            })
            .collect();
        export.frames.push(ExportFrame { keypoints });
    }
    Ok(export)
}

/// Export and write the result as pretty JSON.
pub fn write_export<S: AsRef<str>>(
    frames: &[Frame],
    names: &[S],
    output: impl AsRef<Path>,
) -> Result<Export, ExportError> {
    let output = output.as_ref();
    let export = export_frames(frames, names)?;
    let json = serde_json::to_string_pretty(&export.frames)?;
    std::fs::write(output, json).map_err(|source| ExportError::Io {
        path: output.to_path_buf(),
        source,
    })?;
    info!("wrote {} frame(s) to {output:?}", export.frames.len());
    if export.skipped > 0 {
        info!("skipped {} frame(s) without body keypoints", export.skipped);
    }
    Ok(export)
}
