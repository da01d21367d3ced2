use crate::error::ParseError;
use crate::schema::Part;
use crate::types::*;
use log::{debug, warn};
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use std::path::Path;
use std::sync::OnceLock;

///////////////////////////////////////////////////////////////////////////////////////////////////

/// The historical pose file layouts, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `# Frame: N - <Part> keypoints` headers followed by `<Joint>: x y confidence` lines.
    HeaderSectioned,
    /// Records dumped back to back with no separator (`}{`).
    ConcatenatedRecords,
    /// One record per line.
    LineDelimited,
}

fn __header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)#\s*Frame:\s*(\d+)\s*-\s*(body|left hand|right hand|face)\s+keypoints")
            .unwrap()
    })
}

fn __data_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([^:#][^:]*?)\s*:\s*(\S+)\s+(\S+)(?:\s+(\S+))?\s*$").unwrap())
}

fn __numeric_wrapper_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"np\.float\d+\(([^)]+)\)").unwrap())
}

fn __python_literal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(None|True|False)\b").unwrap())
}

///////////////////////////////////////////////////////////////////////////////////////////////////

/// Pick the dialect of a pose file by looking at its content.
pub fn classify(text: &str) -> Dialect {
    if __header_regex().is_match(text) {
        Dialect::HeaderSectioned
    } else if text.contains("}{") {
        Dialect::ConcatenatedRecords
    } else {
        Dialect::LineDelimited
    }
}

/// Replace `np.float64(3.5)` style wrappers with the bare number.
pub fn strip_numeric_wrappers(text: &str) -> Cow<'_, str> {
    __numeric_wrapper_regex().replace_all(text, "$1")
}

/// Turn a Python literal into JSON: single quotes become double quotes, `None` becomes `null`
/// and `True`/`False` become `true`/`false`.
pub fn normalize_quotes(text: &str) -> String {
    let quoted = text.replace('\'', "\"");
    __python_literal_regex()
        .replace_all(&quoted, |captures: &regex::Captures| match &captures[1] {
            "None" => "null",
            "True" => "true",
            _ => "false",
        })
        .into_owned()
}

/// Repair back-to-back records into one JSON array.
pub fn repair_concatenated(text: &str) -> String {
    let stripped = strip_numeric_wrappers(text.trim());
    let joined = stripped.replace("}{", "},{");
    normalize_quotes(&format!("[{joined}]"))
}

/// Parse concatenated records into untyped values, one per record.
pub fn parse_records(text: &str) -> Result<Vec<Value>, ParseError> {
    serde_json::from_str(&repair_concatenated(text))
        .map_err(|source| ParseError::Concatenated { source })
}

///////////////////////////////////////////////////////////////////////////////////////////////////

/// Finite numbers only; `nan` and `inf` are treated as unreadable.
fn __parse_float(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_header_sectioned(text: &str) -> Result<Vec<Frame>, ParseError> {
    let text = strip_numeric_wrappers(text);

    let mut frames: Vec<Frame> = Vec::new();
    let mut open: Option<(String, Frame)> = None;
    let mut part: Option<Part> = None;
    let mut dropped = 0usize;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        //// Section header: a new frame starts only when the index changes
        if let Some(captures) = __header_regex().captures(line) {
            //// compared as digits so indices of any length stay distinct
            let digits = captures[1].trim_start_matches('0');
            part = Part::from_header(&captures[2]);
            match open.as_ref() {
                Some((open_index, _)) if open_index == digits => {}
                _ => {
                    if let Some((_, frame)) = open.take() {
                        frames.push(frame);
                    }
                    open = Some((digits.to_string(), Frame::default()));
                }
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        //// Data line inside a section
        let (Some(part), Some((_, frame))) = (part, open.as_mut()) else {
            continue;
        };
        let Some(captures) = __data_line_regex().captures(line) else {
            continue;
        };
        let (Some(x), Some(y)) = (__parse_float(&captures[2]), __parse_float(&captures[3])) else {
            continue;
        };
        let confidence = captures.get(4).and_then(|c| __parse_float(c.as_str()));
        match part.index_of(&captures[1]) {
            Some(slot) => {
                frame.group_mut(part)[slot] = Some(Keypoint { x, y, confidence });
            }
            None => dropped += 1,
        }
    }

    if let Some((_, frame)) = open {
        frames.push(frame);
    }
    if dropped > 0 {
        debug!("dropped {dropped} keypoint line(s) with unrecognized joint names");
    }
    Ok(frames)
}

fn parse_concatenated(text: &str) -> Result<Vec<Frame>, ParseError> {
    parse_records(text)?
        .into_iter()
        .enumerate()
        .map(|(record, value)| {
            serde_json::from_value::<Frame>(value)
                .map(Frame::padded)
                .map_err(|source| ParseError::Record { record, source })
        })
        .collect()
}

fn parse_line_delimited(text: &str) -> Result<Vec<Frame>, ParseError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            let cleaned = normalize_quotes(&strip_numeric_wrappers(line));
            serde_json::from_str::<Frame>(&cleaned)
                .map(Frame::padded)
                .map_err(|source| ParseError::Line { line: i + 1, source })
        })
        .collect()
}

//////////////////////////////////////////////////////////////// PUBLIC ////////////////////////////////////////////////////////////////

/// Parse pose text of any supported dialect, reporting structured-data failures.
pub fn try_parse(text: &str) -> Result<Vec<Frame>, ParseError> {
    match classify(text) {
        Dialect::HeaderSectioned => parse_header_sectioned(text),
        Dialect::ConcatenatedRecords => parse_concatenated(text),
        Dialect::LineDelimited => parse_line_delimited(text),
    }
}

/// Parse pose text of any supported dialect. Malformed data is logged and yields no frames.
pub fn parse(text: &str) -> Vec<Frame> {
    match try_parse(text) {
        Ok(frames) => frames,
        Err(err) => {
            warn!("failed to parse pose data ({:?}): {err}", classify(text));
            Vec::new()
        }
    }
}

/// load a pose file from a file path
pub fn load_pose_from_file(file_path: impl AsRef<Path>) -> std::io::Result<Vec<Frame>> {
    let contents = std::fs::read_to_string(file_path)?;
    Ok(parse(&contents))
}

/// load a pose file from a string
pub fn load_pose_from_string(pose_string: &str) -> Vec<Frame> {
    parse(pose_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER_SAMPLE: &str = "\
# Frame: 0 - Body keypoints
Nose: 640.0 120.5 0.93
RElbow: 1.2e2 3.4E2 0.5
Tail: 1 2 3
# Frame: 0 - Left hand keypoints
Left Wrist: 300 400 0.8
Left Thumb1: 310 410 0.7
# Frame: 0 - Right hand keypoints
Right Pinky4: 900 450 0.6
# Frame: 1 - Body keypoints
Nose: 650 125 0.9
# Frame: 1 - Face keypoints
Face_69: 700 100 0.4
";

    #[test]
    fn classifies_each_dialect() {
        assert_eq!(classify(HEADER_SAMPLE), Dialect::HeaderSectioned);
        assert_eq!(classify("{'a': 1}{'b': 2}"), Dialect::ConcatenatedRecords);
        assert_eq!(classify("{\"body\": []}\n{\"body\": []}"), Dialect::LineDelimited);
    }

    #[test]
    fn header_requires_keypoints_suffix() {
        assert_eq!(classify("# Frame: 0 - Body\nNose: 1 2 3"), Dialect::LineDelimited);
        assert_eq!(
            classify("# frame: 3 - BODY KEYPOINTS\n"),
            Dialect::HeaderSectioned
        );
    }

    #[test]
    fn headers_with_same_index_share_a_frame() {
        let frames = parse(HEADER_SAMPLE);
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(Frame::has_shape));

        let first = &frames[0];
        assert_eq!(first.get(Part::Body, 0), Some(&Keypoint::with_confidence(640.0, 120.5, 0.93)));
        assert_eq!(first.get(Part::LeftHand, 0).map(|p| p.x), Some(300.0));
        assert_eq!(first.get(Part::LeftHand, 1).map(|p| p.y), Some(410.0));
        assert_eq!(first.get(Part::RightHand, 20).map(|p| p.x), Some(900.0));

        let second = &frames[1];
        assert_eq!(second.get(Part::Body, 0).map(|p| p.x), Some(650.0));
        assert_eq!(second.get(Part::Face, 69).map(|p| p.x), Some(700.0));
        assert!(second.get(Part::LeftHand, 0).is_none());
    }

    #[test]
    fn header_reads_scientific_notation() {
        let frames = parse(HEADER_SAMPLE);
        let elbow = frames[0].get(Part::Body, 3).copied();
        assert_eq!(elbow.map(|p| (p.x, p.y)), Some((120.0, 340.0)));
    }

    #[test]
    fn header_drops_unknown_joints() {
        let frames = parse(HEADER_SAMPLE);
        assert_eq!(frames[0].body.iter().flatten().count(), 2);
    }

    #[test]
    fn header_strips_numeric_wrappers() {
        let text = "# Frame: 7 - Body keypoints\nNeck: np.float64(3.5) np.float32(1e3) 0.9\n";
        let frames = parse(text);
        assert_eq!(frames.len(), 1);
        let neck = frames[0].get(Part::Body, 1).copied();
        assert_eq!(neck.map(|p| (p.x, p.y)), Some((3.5, 1000.0)));
    }

    #[test]
    fn joint_names_may_contain_spaces() {
        let text = "# Frame: 0 - Right hand keypoints\nRight Middle2 : 5 6 1\n";
        let frames = parse(text);
        assert_eq!(frames[0].get(Part::RightHand, 10).map(|p| p.x), Some(5.0));
    }

    #[test]
    fn numeric_wrappers_become_bare_values() {
        assert_eq!(strip_numeric_wrappers("[np.float64(3.5), 2]"), "[3.5, 2]");
        assert_eq!(strip_numeric_wrappers("np.float32(-1.0e-3)"), "-1.0e-3");
    }

    #[test]
    fn concatenated_records_are_split() {
        let records = parse_records("{'a': 1}{'b': 2}").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["a"], 1);
        assert_eq!(records[1]["b"], 2);
    }

    #[test]
    fn concatenated_frames_have_schema_shape() {
        let text = "{'body': [[np.float64(640.0), 360, 0.9], None], 'face': []}\
                    {'body': [], 'left_hand': [[1, 2]]}";
        let frames = parse(text);
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(Frame::has_shape));
        assert_eq!(frames[0].get(Part::Body, 0).map(|p| p.x), Some(640.0));
        assert_eq!(frames[1].get(Part::LeftHand, 0).map(|p| p.y), Some(2.0));
    }

    #[test]
    fn line_delimited_frames_have_schema_shape() {
        let text = "{'body': [[1, 2, 0.5]], 'left_hand': [], 'right_hand': [], 'face': []}\n\n\
                    {'body': [None, [np.float64(3.5), 4]]}\n";
        let frames = parse(text);
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(Frame::has_shape));
        assert_eq!(frames[1].get(Part::Body, 1).map(|p| p.x), Some(3.5));
    }

    #[test]
    fn malformed_structured_text_yields_no_frames() {
        assert!(parse("{'body': [[1, 2]]}{'body': [[").is_empty());
        assert!(parse("not a record").is_empty());
        assert!(matches!(
            try_parse("{'body': []}\nnope"),
            Err(ParseError::Line { line: 2, .. })
        ));
    }

    #[test]
    fn oversized_frame_index_stays_its_own_frame() {
        let text = "# Frame: 99999999999999999999999 - Body keypoints\nNose: 1 2 3\n\
                    # Frame: 0 - Body keypoints\nNose: 4 5 6\n\
                    # Frame: 000 - Face keypoints\nFace_1: 7 8 9\n";
        let frames = parse(text);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].get(Part::Body, 0).map(|p| p.x), Some(1.0));
        assert_eq!(frames[1].get(Part::Body, 0).map(|p| p.x), Some(4.0));
        assert_eq!(frames[1].get(Part::Face, 1).map(|p| p.x), Some(7.0));
    }

    #[test]
    fn non_finite_values_are_not_keypoints() {
        let text = "# Frame: 0 - Body keypoints\nNose: nan inf 1\nNeck: 1 -inf 1\nRElbow: 2 3 NaN\n";
        let frames = parse(text);
        assert!(frames[0].get(Part::Body, 0).is_none());
        assert!(frames[0].get(Part::Body, 1).is_none());
        assert_eq!(frames[0].get(Part::Body, 3), Some(&Keypoint::new(2.0, 3.0)));
    }

    #[test]
    fn python_booleans_become_json() {
        assert_eq!(
            normalize_quotes("{'a': True, 'b': False, 'c': None, 'Trueish': 1}"),
            r#"{"a": true, "b": false, "c": null, "Trueish": 1}"#
        );
        let frames = parse("{'body': [[1, 2, 0.5]], 'visible': True}");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].get(Part::Body, 0).map(|p| p.x), Some(1.0));
    }

    #[test]
    fn empty_text_yields_no_frames() {
        assert!(parse("").is_empty());
        assert!(parse("\n  \n").is_empty());
    }
}
