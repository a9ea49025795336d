// Annotation files: parsers for the three text formats of the layout
//
//   wnids.txt            one class identifier per line
//   words.txt            <wnid>\t<name>[\t...]
//   val_annotations.txt  <file>\t<wnid>[\t<x0>\t<y0>\t<x1>\t<y1>]
//
// Lines are trimmed before splitting. Lines with fewer than the required
// fields are ignored, trailing fields beyond those used are tolerated.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Read a whole text file, reporting absence as [`Error::MissingFile`].
pub fn read_text_file(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(Error::missing(path));
    }
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Parse `wnids.txt`: every non-empty trimmed line is a class identifier.
///
/// Identifiers are returned in file order; sorting is the catalog's job.
pub fn parse_wnids(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `words.txt` into a `wnid -> name` map.
///
/// Only the first two tab-separated fields are used. A later line for the
/// same identifier replaces an earlier one.
pub fn parse_words(text: &str) -> HashMap<String, String> {
    let mut names = HashMap::new();
    for line in text.lines() {
        let mut parts = line.trim().split('\t');
        if let (Some(wnid), Some(name)) = (parts.next(), parts.next()) {
            names.insert(wnid.to_string(), name.to_string());
        }
    }
    names
}

/// A bounding box in pixel coordinates, `(x0, y0)` top-left to `(x1, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

/// One line of `val_annotations.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValAnnotation {
    /// Image file name, relative to `val/images/`.
    pub file_name: String,
    /// Class identifier of the image.
    pub wnid: String,
    /// Bounding box, when all four coordinates are present and numeric.
    pub bbox: Option<BoundingBox>,
}

/// Parse `val_annotations.txt`.
///
/// Requires at least two fields per line; the bounding box is optional
/// and never causes a line to be rejected.
pub fn parse_val_annotations(text: &str) -> Vec<ValAnnotation> {
    let mut out = Vec::new();
    for line in text.lines() {
        let parts: Vec<&str> = line.trim().split('\t').collect();
        if parts.len() < 2 {
            continue;
        }
        out.push(ValAnnotation {
            file_name: parts[0].to_string(),
            wnid: parts[1].to_string(),
            bbox: parse_bbox(&parts[2..]),
        });
    }
    out
}

fn parse_bbox(fields: &[&str]) -> Option<BoundingBox> {
    if fields.len() < 4 {
        return None;
    }
    let mut coords = [0u32; 4];
    for (slot, field) in coords.iter_mut().zip(fields) {
        *slot = field.trim().parse().ok()?;
    }
    let [x0, y0, x1, y1] = coords;
    Some(BoundingBox { x0, y0, x1, y1 })
}

/// Build the `file name -> wnid` lookup used to label validation images.
pub fn val_labels(annotations: &[ValAnnotation]) -> HashMap<&str, &str> {
    annotations
        .iter()
        .map(|a| (a.file_name.as_str(), a.wnid.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wnids_skip_blank_lines_and_trim() {
        let ids = parse_wnids("n02\n\n  n01  \r\nn03\n   \n");
        assert_eq!(ids, vec!["n02", "n01", "n03"]);
    }

    #[test]
    fn words_use_first_two_fields() {
        let names = parse_words("n01\tgoldfish, Carassius auratus\textra\nn02\nn03\tbullfrog\n");
        assert_eq!(names.len(), 2);
        assert_eq!(names["n01"], "goldfish, Carassius auratus");
        assert_eq!(names["n03"], "bullfrog");
        assert!(!names.contains_key("n02"));
    }

    #[test]
    fn words_later_line_wins() {
        let names = parse_words("n01\tfirst\nn01\tsecond\n");
        assert_eq!(names["n01"], "second");
    }

    #[test]
    fn val_annotations_with_bbox() {
        let anns = parse_val_annotations("val_0.JPEG\tn03444034\t0\t32\t44\t62\n");
        assert_eq!(anns.len(), 1);
        assert_eq!(anns[0].file_name, "val_0.JPEG");
        assert_eq!(anns[0].wnid, "n03444034");
        assert_eq!(
            anns[0].bbox,
            Some(BoundingBox {
                x0: 0,
                y0: 32,
                x1: 44,
                y1: 62
            })
        );
    }

    #[test]
    fn val_annotations_tolerate_missing_or_bad_bbox() {
        let anns = parse_val_annotations("a.JPEG\tn01\nb.JPEG\tn02\tx\t1\t2\t3\nbroken\n");
        assert_eq!(anns.len(), 2);
        assert_eq!(anns[0].bbox, None);
        assert_eq!(anns[1].wnid, "n02");
        assert_eq!(anns[1].bbox, None);
    }

    #[test]
    fn val_labels_map_file_to_wnid() {
        let anns = parse_val_annotations("a.JPEG\tn01\nb.JPEG\tn02\n");
        let labels = val_labels(&anns);
        assert_eq!(labels.get("a.JPEG"), Some(&"n01"));
        assert_eq!(labels.get("c.JPEG"), None);
    }

    #[test]
    fn missing_text_file_is_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_text_file(&dir.path().join("wnids.txt")).unwrap_err();
        assert!(err.is_missing_file());
    }
}
