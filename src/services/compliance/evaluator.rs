// Block Evaluator
// One completion call per block against the full checklist, replies parsed
// as JSON. A failing block is reported and skipped, never fatal to the run.

use crate::models::{
    Block, BlockEvaluation, BlockFailure, ChecklistEvaluation, ChecklistItem, MentionStatus,
};
use crate::services::providers::CompletionClient;
use std::time::Instant;
use tracing::{info, warn};

use super::AuditConfig;

const EVALUATION_MAX_TOKENS: i32 = 1024;
const EVALUATION_TEMPERATURE: f64 = 0.0;

const EVALUATION_SYSTEM_PROMPT: &str = r#"You are a legal compliance assistant evaluating a privacy policy block against Section 4 of the Digital Personal Data Protection Act (DPDPA), 2023.
You reply with a single valid JSON object and nothing else."#;

/// Build the user prompt for one block. The checklist is rendered as
/// "id. text" lines; the reply schema in the prompt fixes the wire keys the
/// parser expects.
pub fn build_checklist_prompt(block_text: &str, checklist: &[ChecklistItem]) -> String {
    let checklist_text = checklist
        .iter()
        .map(|item| format!("{}. {}", item.id, item.text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Checklist:
{checklist_text}

Policy Block:
"""{block_text}"""

Instructions:
1. For each checklist item, determine whether it is:
   - Explicitly Mentioned (clearly and fully satisfied)
   - Partially Mentioned (some elements are present but not fully)
   - Missing (not mentioned at all)

2. In your JSON response, include:
   - The Checklist Item ID
   - Status: Explicitly Mentioned / Partially Mentioned / Missing
   - If status is Explicitly or Partially Mentioned, include a short Justification (1-2 sentences).
   - Do NOT include justification for Missing items.

3. Format your reply as valid JSON like this:

{{
  "Checklist Evaluation": [
    {{
      "Checklist Item ID": "4.1",
      "Status": "Explicitly Mentioned",
      "Justification": "..."
    }},
    {{
      "Checklist Item ID": "4.2",
      "Status": "Missing"
    }}
  ]
}}"#
    )
}

/// Extract the outermost JSON object from reply content that may carry
/// prose or code fences around it.
pub(crate) fn extract_json(content: &str) -> Result<String, String> {
    if content.starts_with('{') {
        Ok(content.to_string())
    } else if let Some(start) = content.find('{') {
        if let Some(end) = content.rfind('}') {
            Ok(content[start..=end].to_string())
        } else {
            Err("Invalid JSON response".to_string())
        }
    } else {
        Err("No JSON in response".to_string())
    }
}

/// Parse one evaluation reply. Evaluators that omit Missing items and ones
/// that list them are both accepted; a justification attached to a Missing
/// finding is dropped so downstream invariants hold.
pub fn parse_block_evaluation(content: &str) -> Result<ChecklistEvaluation, String> {
    let json_str = extract_json(content.trim())?;
    let mut evaluation: ChecklistEvaluation = serde_json::from_str(&json_str)
        .map_err(|e| format!("JSON parse error: {}", e))?;

    for finding in &mut evaluation.items {
        if finding.status == MentionStatus::Missing {
            finding.justification = None;
        }
    }

    Ok(evaluation)
}

/// Evaluate every block in document order, one completion call each.
///
/// Call errors, timeouts, and unparseable replies are collected as
/// `BlockFailure` (with the raw reply when there is one) and excluded from
/// the successful results; remaining blocks keep processing.
pub async fn evaluate_blocks(
    client: &CompletionClient,
    cfg: &AuditConfig,
    blocks: &[Block],
) -> (Vec<BlockEvaluation>, Vec<BlockFailure>) {
    let started = Instant::now();
    info!("[EVALUATOR] Evaluating {} blocks with model {}", blocks.len(), cfg.model);

    let mut evaluations: Vec<BlockEvaluation> = Vec::new();
    let mut failures: Vec<BlockFailure> = Vec::new();

    for block in blocks {
        let block_id = block.block_id();
        let user_prompt = build_checklist_prompt(&block.text, &cfg.checklist);

        let timeout_duration = std::time::Duration::from_secs(cfg.request_timeout_secs);
        let call = client.call_chat(
            &cfg.model,
            &cfg.api_key,
            EVALUATION_SYSTEM_PROMPT,
            &user_prompt,
            EVALUATION_MAX_TOKENS,
            EVALUATION_TEMPERATURE,
            true,
        );

        match tokio::time::timeout(timeout_duration, call).await {
            Ok(Ok(chat_result)) => match parse_block_evaluation(&chat_result.content) {
                Ok(evaluation) => {
                    info!(
                        "[EVALUATOR] {} ok: {} findings, latency_ms={}",
                        block_id,
                        evaluation.items.len(),
                        chat_result.latency_ms
                    );
                    evaluations.push(BlockEvaluation {
                        block_id,
                        items: evaluation.items,
                    });
                }
                Err(e) => {
                    warn!("[EVALUATOR] {} reply unparseable: {}", block_id, e);
                    failures.push(BlockFailure {
                        block_id,
                        error: e,
                        raw_response: Some(chat_result.content),
                    });
                }
            },
            Ok(Err(e)) => {
                warn!("[EVALUATOR] {} call failed: {}", block_id, e);
                failures.push(BlockFailure {
                    block_id,
                    error: e.to_string(),
                    raw_response: None,
                });
            }
            Err(_) => {
                warn!(
                    "[EVALUATOR] {} timed out after {}s",
                    block_id, cfg.request_timeout_secs
                );
                failures.push(BlockFailure {
                    block_id,
                    error: format!("timeout after {}s", cfg.request_timeout_secs),
                    raw_response: None,
                });
            }
        }
    }

    info!(
        "[EVALUATOR] Done: {} evaluated, {} failed, elapsed_ms={}",
        evaluations.len(),
        failures.len(),
        started.elapsed().as_millis()
    );

    (evaluations, failures)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checklist() -> Vec<ChecklistItem> {
        vec![
            ChecklistItem { id: "4.1".to_string(), text: "Processing per the Act.".to_string() },
            ChecklistItem { id: "4.2".to_string(), text: "Lawful purpose only.".to_string() },
        ]
    }

    #[test]
    fn test_prompt_lists_every_checklist_item() {
        let prompt = build_checklist_prompt("We process data lawfully.", &checklist());
        assert!(prompt.contains("4.1. Processing per the Act."));
        assert!(prompt.contains("4.2. Lawful purpose only."));
        assert!(prompt.contains("We process data lawfully."));
        assert!(prompt.contains("Checklist Evaluation"));
    }

    #[test]
    fn test_parse_reply_with_all_items() {
        let reply = r#"{
          "Checklist Evaluation": [
            {"Checklist Item ID": "4.1", "Status": "Explicitly Mentioned", "Justification": "states it"},
            {"Checklist Item ID": "4.2", "Status": "Missing"}
          ]
        }"#;
        let evaluation = parse_block_evaluation(reply).unwrap();
        assert_eq!(evaluation.items.len(), 2);
        assert_eq!(evaluation.items[0].status, MentionStatus::ExplicitlyMentioned);
        assert_eq!(evaluation.items[1].status, MentionStatus::Missing);
    }

    #[test]
    fn test_parse_reply_omitting_missing_items() {
        let reply = r#"{"Checklist Evaluation": [
            {"Checklist Item ID": "4.4", "Status": "Partially Mentioned", "Justification": "consent implied"}
        ]}"#;
        let evaluation = parse_block_evaluation(reply).unwrap();
        assert_eq!(evaluation.items.len(), 1);
        assert_eq!(evaluation.items[0].item_id, "4.4");
    }

    #[test]
    fn test_parse_reply_wrapped_in_prose() {
        let reply = "Here is the evaluation:\n```json\n{\"Checklist Evaluation\": [{\"Checklist Item ID\": \"4.1\", \"Status\": \"Missing\"}]}\n```";
        let evaluation = parse_block_evaluation(reply).unwrap();
        assert_eq!(evaluation.items.len(), 1);
    }

    #[test]
    fn test_parse_drops_justification_on_missing() {
        let reply = r#"{"Checklist Evaluation": [
            {"Checklist Item ID": "4.2", "Status": "Missing", "Justification": "should not be here"}
        ]}"#;
        let evaluation = parse_block_evaluation(reply).unwrap();
        assert!(evaluation.items[0].justification.is_none());
    }

    #[test]
    fn test_parse_malformed_reply_errors() {
        assert!(parse_block_evaluation("I could not evaluate this block.").is_err());
        assert!(parse_block_evaluation("{\"Checklist Evaluation\": [").is_err());
        assert!(parse_block_evaluation("{\"Checklist Evaluation\": [{\"Checklist Item ID\": \"4.1\", \"Status\": \"Sort Of\"}]}").is_err());
    }

    #[test]
    fn test_extract_json_variants() {
        assert_eq!(extract_json("{\"a\": 1}").unwrap(), "{\"a\": 1}");
        assert_eq!(extract_json("noise {\"a\": 1} trailing").unwrap(), "{\"a\": 1}");
        assert!(extract_json("no braces here").is_err());
        assert!(extract_json("open { but never closed").is_err());
    }
}
