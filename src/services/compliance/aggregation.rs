// Checklist Summary Compiler
// Merges per-block evaluation results into one summary per checklist item

use crate::models::{BlockEvaluation, ChecklistItem, ChecklistSummary, MatchedBlock, MentionStatus};
use std::collections::HashMap;
use tracing::warn;

/// Compile one summary per checklist item from all block evaluations.
///
/// Summaries are pre-built in checklist order with `finalStatus = Missing`,
/// so every item appears in the output even when no block mentions it. The
/// merge pass records every non-Missing finding against its item in block
/// order; Missing findings are not recorded (Missing is the default). The
/// final status is a strict precedence over the recorded statuses, not a
/// vote: one explicit match anywhere satisfies the item.
pub fn compile_checklist_summary(
    checklist: &[ChecklistItem],
    evaluations: &[BlockEvaluation],
) -> Vec<ChecklistSummary> {
    let mut summaries: Vec<ChecklistSummary> = checklist
        .iter()
        .map(|item| ChecklistSummary {
            item_id: item.id.clone(),
            final_status: MentionStatus::Missing,
            matched_blocks: Vec::new(),
        })
        .collect();

    // Position lookup keyed by item id; output order stays checklist order
    // regardless of the order ids are discovered in replies.
    let slots: HashMap<&str, usize> = checklist
        .iter()
        .enumerate()
        .map(|(pos, item)| (item.id.as_str(), pos))
        .collect();

    for evaluation in evaluations {
        for finding in &evaluation.items {
            if finding.status == MentionStatus::Missing {
                continue;
            }
            let pos = match slots.get(finding.item_id.as_str()) {
                Some(pos) => *pos,
                None => {
                    warn!(
                        "[AGGREGATION] Ignoring unknown checklist item id '{}' reported by {}",
                        finding.item_id, evaluation.block_id
                    );
                    continue;
                }
            };
            summaries[pos].matched_blocks.push(MatchedBlock {
                block_id: evaluation.block_id.clone(),
                status: finding.status,
                justification: finding.justification.clone().unwrap_or_default(),
            });
        }
    }

    for summary in &mut summaries {
        let mut final_status = summary.final_status;
        for matched in &summary.matched_blocks {
            if matched.status.rank() > final_status.rank() {
                final_status = matched.status;
            }
        }
        summary.final_status = final_status;
    }

    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemFinding;

    fn checklist() -> Vec<ChecklistItem> {
        vec![
            ChecklistItem { id: "4.1".to_string(), text: "Processing per the Act.".to_string() },
            ChecklistItem { id: "4.2".to_string(), text: "Lawful purpose only.".to_string() },
        ]
    }

    fn finding(item_id: &str, status: MentionStatus, justification: Option<&str>) -> ItemFinding {
        ItemFinding {
            item_id: item_id.to_string(),
            status,
            justification: justification.map(|s| s.to_string()),
        }
    }

    fn evaluation(block_id: &str, items: Vec<ItemFinding>) -> BlockEvaluation {
        BlockEvaluation { block_id: block_id.to_string(), items }
    }

    #[test]
    fn test_every_item_summarized_with_no_evaluations() {
        let summaries = compile_checklist_summary(&checklist(), &[]);
        assert_eq!(summaries.len(), 2);
        for summary in &summaries {
            assert_eq!(summary.final_status, MentionStatus::Missing);
            assert!(summary.matched_blocks.is_empty());
        }
    }

    #[test]
    fn test_explicit_wins_over_partial_regardless_of_order() {
        let evals = vec![
            evaluation("BLOCK1", vec![finding("4.1", MentionStatus::PartiallyMentioned, Some("some elements"))]),
            evaluation("BLOCK2", vec![finding("4.1", MentionStatus::ExplicitlyMentioned, Some("states it fully"))]),
        ];
        let summaries = compile_checklist_summary(&checklist(), &evals);
        assert_eq!(summaries[0].final_status, MentionStatus::ExplicitlyMentioned);
        assert_eq!(summaries[0].matched_blocks.len(), 2);
        assert_eq!(summaries[0].matched_blocks[0].block_id, "BLOCK1");
        assert_eq!(summaries[0].matched_blocks[1].block_id, "BLOCK2");
    }

    #[test]
    fn test_partial_after_missing_yields_partial() {
        let evals = vec![
            evaluation("BLOCK1", vec![finding("4.2", MentionStatus::Missing, None)]),
            evaluation("BLOCK2", vec![finding("4.2", MentionStatus::PartiallyMentioned, Some("partly covered"))]),
        ];
        let summaries = compile_checklist_summary(&checklist(), &evals);
        assert_eq!(summaries[1].final_status, MentionStatus::PartiallyMentioned);
        assert_eq!(summaries[1].matched_blocks.len(), 1);
    }

    #[test]
    fn test_missing_findings_are_not_recorded() {
        let evals = vec![
            evaluation("BLOCK1", vec![finding("4.1", MentionStatus::Missing, None)]),
        ];
        let summaries = compile_checklist_summary(&checklist(), &evals);
        assert_eq!(summaries[0].final_status, MentionStatus::Missing);
        assert!(summaries[0].matched_blocks.is_empty());
        assert!(summaries
            .iter()
            .flat_map(|s| s.matched_blocks.iter())
            .all(|m| m.status != MentionStatus::Missing));
    }

    #[test]
    fn test_unknown_item_id_ignored() {
        let evals = vec![
            evaluation("BLOCK1", vec![
                finding("9.9", MentionStatus::ExplicitlyMentioned, Some("bogus")),
                finding("4.2", MentionStatus::ExplicitlyMentioned, Some("real")),
            ]),
        ];
        let summaries = compile_checklist_summary(&checklist(), &evals);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].final_status, MentionStatus::Missing);
        assert_eq!(summaries[1].final_status, MentionStatus::ExplicitlyMentioned);
    }

    #[test]
    fn test_output_follows_checklist_order_not_discovery_order() {
        let evals = vec![
            evaluation("BLOCK1", vec![
                finding("4.2", MentionStatus::PartiallyMentioned, Some("later item first")),
                finding("4.1", MentionStatus::ExplicitlyMentioned, Some("earlier item second")),
            ]),
        ];
        let summaries = compile_checklist_summary(&checklist(), &evals);
        assert_eq!(summaries[0].item_id, "4.1");
        assert_eq!(summaries[1].item_id, "4.2");
    }

    #[test]
    fn test_missing_justification_recorded_as_empty() {
        let evals = vec![
            evaluation("BLOCK1", vec![finding("4.1", MentionStatus::PartiallyMentioned, None)]),
        ];
        let summaries = compile_checklist_summary(&checklist(), &evals);
        assert_eq!(summaries[0].matched_blocks[0].justification, "");
    }

    #[test]
    fn test_end_to_end_example() {
        let evals = vec![
            evaluation("BLOCK1", vec![finding("4.1", MentionStatus::ExplicitlyMentioned, Some("states X"))]),
            evaluation("BLOCK2", vec![finding("4.2", MentionStatus::Missing, None)]),
        ];
        let summaries = compile_checklist_summary(&checklist(), &evals);
        assert_eq!(summaries[0].item_id, "4.1");
        assert_eq!(summaries[0].final_status, MentionStatus::ExplicitlyMentioned);
        assert_eq!(summaries[0].matched_blocks.len(), 1);
        assert_eq!(summaries[0].matched_blocks[0].block_id, "BLOCK1");
        assert_eq!(summaries[0].matched_blocks[0].justification, "states X");
        assert_eq!(summaries[1].item_id, "4.2");
        assert_eq!(summaries[1].final_status, MentionStatus::Missing);
        assert!(summaries[1].matched_blocks.is_empty());
    }
}
