// Block Segmenter
// Splits raw policy text into ordered evaluation blocks using a
// heading/paragraph heuristic. Semantic understanding is the evaluator's
// job; this pass only needs coherent, independently evaluable units.

use crate::models::Block;
use regex::Regex;
use std::sync::OnceLock;

static TITLE_LINE_RE: OnceLock<Regex> = OnceLock::new();
static NUMBERED_LINE_RE: OnceLock<Regex> = OnceLock::new();

/// True if the trimmed line opens a new block.
///
/// Two shapes count as heading starts:
/// - a title-cased line: letters and spaces only, every word starting with
///   an uppercase letter ("Data Retention Policy");
/// - an enumerated clause marker: leading digits, a period, then a space
///   ("3. We share personal data with...").
pub fn is_heading_start(line: &str) -> bool {
    let title_re = TITLE_LINE_RE.get_or_init(|| {
        Regex::new(r"^[A-Z][A-Za-z]*(?:\s+[A-Z][A-Za-z]*)*$").unwrap()
    });
    let numbered_re = NUMBERED_LINE_RE.get_or_init(|| Regex::new(r"^[0-9]+\.\s").unwrap());

    title_re.is_match(line) || numbered_re.is_match(line)
}

/// Split `text` into ordered blocks.
///
/// Single pass over the lines; blank lines are discarded. `current` is the
/// accumulator state: empty means idle, non-empty means a block is being
/// collected. A heading-start line closes the in-progress block (lines
/// joined with single spaces, trimmed) and opens the next one with itself
/// as the first line. Whatever is still accumulating at end of input is
/// flushed as the last block.
///
/// Deterministic and total: empty or all-blank input yields no blocks; a
/// document with no heading lines yields exactly one.
pub fn break_into_blocks(text: &str) -> Vec<Block> {
    fn push_block(lines: &[&str], blocks: &mut Vec<Block>) {
        let joined = lines.join(" ").trim().to_string();
        if !joined.is_empty() {
            blocks.push(Block {
                index: blocks.len() as i32 + 1,
                text: joined,
            });
        }
    }

    let mut blocks: Vec<Block> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() {
            continue;
        }

        if is_heading_start(stripped) && !current.is_empty() {
            push_block(&current, &mut blocks);
            current.clear();
        }
        current.push(stripped);
    }

    if !current.is_empty() {
        push_block(&current, &mut blocks);
    }

    blocks
}
