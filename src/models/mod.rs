// poliCheck Data Models
// Checklist audit and section audit types shared across services

use serde::{Deserialize, Deserializer, Serialize};

// ============ Static Configuration ============

/// A single statutory requirement statement with a stable id (e.g. "4.1").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
}

/// One DPDPA Chapter II section, identified by its section number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatuteSection {
    pub id: String,
    pub title: String,
}

impl StatuteSection {
    /// Display form used in prompts and reports, e.g. "Section 5 — Notice".
    pub fn heading(&self) -> String {
        format!("Section {} \u{2014} {}", self.id, self.title)
    }
}

// ============ Segmentation ============

/// A contiguous unit of policy text produced by segmentation.
/// `index` is 1-based and matches document order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub index: i32,
    pub text: String,
}

impl Block {
    pub fn block_id(&self) -> String {
        format!("BLOCK{}", self.index)
    }
}

// ============ Checklist Evaluation (LLM wire format) ============

/// Status reported for one checklist item in one block.
/// Wire names match the evaluation reply exactly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MentionStatus {
    #[serde(rename = "Explicitly Mentioned")]
    ExplicitlyMentioned,
    #[serde(rename = "Partially Mentioned")]
    PartiallyMentioned,
    #[serde(rename = "Missing")]
    Missing,
}

impl MentionStatus {
    /// Precedence rank for final-status derivation. Higher wins.
    pub fn rank(&self) -> u8 {
        match self {
            MentionStatus::ExplicitlyMentioned => 2,
            MentionStatus::PartiallyMentioned => 1,
            MentionStatus::Missing => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MentionStatus::ExplicitlyMentioned => "Explicitly Mentioned",
            MentionStatus::PartiallyMentioned => "Partially Mentioned",
            MentionStatus::Missing => "Missing",
        }
    }
}

/// One checklist-item finding inside an evaluation reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemFinding {
    #[serde(rename = "Checklist Item ID")]
    pub item_id: String,
    #[serde(rename = "Status")]
    pub status: MentionStatus,
    #[serde(rename = "Justification", default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
}

/// The parsed body of one evaluation reply. Items with status Missing may be
/// omitted by the evaluator; both conventions are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistEvaluation {
    #[serde(rename = "Checklist Evaluation")]
    pub items: Vec<ItemFinding>,
}

/// Result of evaluating one block against the full checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockEvaluation {
    pub block_id: String,
    pub items: Vec<ItemFinding>,
}

/// A per-block evaluation that failed (call error or unparseable reply).
/// The raw reply is kept for diagnosis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockFailure {
    pub block_id: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

// ============ Checklist Summary ============

/// One non-Missing finding traced back to its source block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedBlock {
    pub block_id: String,
    pub status: MentionStatus,
    pub justification: String,
}

/// Final per-item verdict derived from all block evaluations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistSummary {
    pub item_id: String,
    pub final_status: MentionStatus,
    pub matched_blocks: Vec<MatchedBlock>,
}

/// Terminal artifact of a block/checklist run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistReport {
    pub request_id: String,
    pub generated_at: String,
    pub model: String,
    pub block_count: i32,
    pub evaluated_count: i32,
    pub summaries: Vec<ChecklistSummary>,
    pub block_results: Vec<BlockEvaluation>,
    pub failures: Vec<BlockFailure>,
}

// ============ Section Audit (LLM wire format) ============

/// One section-level analysis row. Wire keys match the analysis reply and
/// double as spreadsheet column headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionAnalysis {
    #[serde(rename = "DPDPA Section", default)]
    pub section: String,
    #[serde(rename = "Matched Policy Snippets", default, deserialize_with = "string_or_list")]
    pub matched_snippets: String,
    #[serde(rename = "Match Level", default)]
    pub match_level: String,
    #[serde(rename = "Severity", default)]
    pub severity: String,
    #[serde(rename = "Compliance Points", default, deserialize_with = "lenient_points")]
    pub compliance_points: f64,
    #[serde(rename = "Justification", default)]
    pub justification: String,
    #[serde(rename = "Suggested Rewrite", default)]
    pub suggested_rewrite: String,
}

/// A per-section analysis that failed; excluded from scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionFailure {
    pub section: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

/// Terminal artifact of a section-wise run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionReport {
    pub request_id: String,
    pub generated_at: String,
    pub model: String,
    pub analyses: Vec<SectionAnalysis>,
    pub failures: Vec<SectionFailure>,
    pub scored_points: f64,
    pub section_count: i32,
    pub compliance_percent: f64,
}

// ============ Lenient Deserializers ============

/// "Compliance Points" arrives as a number or a numeric string depending on
/// the model's mood. Anything else decodes as 0.0.
fn lenient_points<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// "Matched Policy Snippets" arrives as a string or a list of strings.
fn string_or_list<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join("; "),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_rank_order() {
        assert!(MentionStatus::ExplicitlyMentioned.rank() > MentionStatus::PartiallyMentioned.rank());
        assert!(MentionStatus::PartiallyMentioned.rank() > MentionStatus::Missing.rank());
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&MentionStatus::PartiallyMentioned).unwrap();
        assert_eq!(json, "\"Partially Mentioned\"");
        let parsed: MentionStatus = serde_json::from_str("\"Explicitly Mentioned\"").unwrap();
        assert_eq!(parsed, MentionStatus::ExplicitlyMentioned);
    }

    #[test]
    fn test_item_finding_omits_justification() {
        let reply = r#"{"Checklist Item ID": "4.2", "Status": "Missing"}"#;
        let finding: ItemFinding = serde_json::from_str(reply).unwrap();
        assert_eq!(finding.item_id, "4.2");
        assert_eq!(finding.status, MentionStatus::Missing);
        assert!(finding.justification.is_none());
    }

    #[test]
    fn test_section_analysis_lenient_points() {
        let as_number = r#"{"DPDPA Section": "Section 5", "Compliance Points": 0.75}"#;
        let as_string = r#"{"DPDPA Section": "Section 5", "Compliance Points": "0.75"}"#;
        let a: SectionAnalysis = serde_json::from_str(as_number).unwrap();
        let b: SectionAnalysis = serde_json::from_str(as_string).unwrap();
        assert_eq!(a.compliance_points, 0.75);
        assert_eq!(b.compliance_points, 0.75);
    }

    #[test]
    fn test_section_analysis_snippets_list() {
        let reply = r#"{"DPDPA Section": "Section 6", "Matched Policy Snippets": ["We obtain consent.", "You may withdraw consent."]}"#;
        let analysis: SectionAnalysis = serde_json::from_str(reply).unwrap();
        assert_eq!(
            analysis.matched_snippets,
            "We obtain consent.; You may withdraw consent."
        );
    }

    #[test]
    fn test_block_id_format() {
        let block = Block { index: 3, text: "Some text".to_string() };
        assert_eq!(block.block_id(), "BLOCK3");
    }

    #[test]
    fn test_section_heading() {
        let section = StatuteSection {
            id: "5".to_string(),
            title: "Notice".to_string(),
        };
        assert_eq!(section.heading(), "Section 5 \u{2014} Notice");
    }
}
