//! Reading-order reconstruction from positioned text runs.
//!
//! PDF text extraction yields runs placed by geometry alone, with no
//! guaranteed order and no word boundaries — runs are emitted per
//! glyph-cluster, not per word. This module imposes order: runs are bucketed
//! into visual lines by baseline proximity, word gaps are re-inserted from
//! horizontal spacing, and paragraph openings are recognised from their
//! indentation.
//!
//! The thresholds here were tuned empirically against real documents and
//! downstream fidelity expectations are pinned to these exact values; do not
//! adjust them without a calibration suite.

use crate::fonts::contains_thai;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Baselines closer than this (PDF user-space units) belong to one visual
/// line; this absorbs sub-pixel baseline jitter.
pub const LINE_TOLERANCE: f32 = 5.0;

/// A horizontal gap wider than this between consecutive runs on one line is
/// a lost word boundary.
pub const WORD_GAP: f32 = 10.0;

/// A line starting further than this from the left margin opens an indented
/// paragraph rather than continuing a wrapped one.
pub const INDENT_THRESHOLD: f32 = 120.0;

/// A fragment of extracted PDF text with an explicit placement.
///
/// Coordinates are PDF user space: origin bottom-left, Y increasing upward.
/// `page_index` strictly follows decode-time page ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedTextRun {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub page_index: usize,
}

/// One inferred visual line: concatenated run texts sharing a baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalLine {
    pub text: String,
    /// First run sat beyond [`INDENT_THRESHOLD`]; render with a leading tab.
    pub indented: bool,
    /// Contains Thai-block characters; render with the Thai face at a
    /// larger point size (glyph sizing is not reliably recoverable from
    /// the source runs).
    pub thai: bool,
}

/// Lines flushed together into one output paragraph. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalParagraph {
    pub lines: Vec<LogicalLine>,
}

/// Reconstruct ordered paragraphs from one page's unordered runs.
///
/// A page with zero runs yields zero paragraphs. Whitespace-only lines are
/// dropped. Overlapping double-strike runs are not deduplicated — stuttered
/// text is a known fidelity limit of geometric reconstruction, not a defect
/// to paper over.
pub fn reconstruct_page(runs: &[PositionedTextRun]) -> Vec<LogicalParagraph> {
    // Descending Y, top of page first. The key is Y alone; mixing X into
    // the comparator for near-equal baselines would make it intransitive
    // on drifting baselines, so left-to-right ordering happens per line
    // below instead.
    let mut by_baseline: Vec<&PositionedTextRun> = runs.iter().collect();
    by_baseline.sort_by(|a, b| b.y.partial_cmp(&a.y).unwrap_or(Ordering::Equal));

    // Cluster into visual lines: a run within LINE_TOLERANCE of the line's
    // most recent baseline continues it.
    let mut lines: Vec<Vec<&PositionedTextRun>> = Vec::new();
    for run in by_baseline {
        match lines.last_mut() {
            Some(line)
                if line
                    .last()
                    .is_some_and(|prev| (prev.y - run.y).abs() <= LINE_TOLERANCE) =>
            {
                line.push(run)
            }
            _ => lines.push(vec![run]),
        }
    }

    let mut paragraphs: Vec<LogicalParagraph> = Vec::new();
    for mut line in lines {
        line.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));

        let mut text = String::new();
        let mut last_right: Option<f32> = None;
        for run in &line {
            // Re-insert the word boundary lost between glyph-cluster runs.
            if last_right.is_some_and(|right| run.x - right > WORD_GAP) {
                text.push(' ');
            }
            text.push_str(&run.text);
            last_right = Some(run.x + run.width);
        }
        flush_line(&mut paragraphs, &text, line.first().map(|r| r.x));
    }

    debug!(
        "Reconstructed {} paragraph(s) from {} run(s)",
        paragraphs.len(),
        runs.len()
    );
    paragraphs
}

/// Close the current line, discarding it when only whitespace remains.
///
/// Each surviving line becomes its own paragraph: the leading-indent flag
/// already encodes paragraph openings, so grouping adds nothing the
/// assemblers could use.
fn flush_line(paragraphs: &mut Vec<LogicalParagraph>, text: &str, first_x: Option<f32>) {
    if text.trim().is_empty() {
        return;
    }
    let line = LogicalLine {
        text: text.to_string(),
        indented: first_x.is_some_and(|x| x > INDENT_THRESHOLD),
        thai: contains_thai(text),
    };
    paragraphs.push(LogicalParagraph { lines: vec![line] });
}
