// High-level Audit Operations
// The seam a presentation surface calls: file preprocessing plus the two
// audit runs. Errors cross this layer as plain strings.

use crate::models::{ChecklistReport, SectionReport};
use crate::services::block_segmenter::break_into_blocks;
use crate::services::compliance::{
    analyze_sections, compile_checklist_summary, compliance_percent, evaluate_blocks, AuditConfig,
};
use crate::services::extraction::extract_document_text;
use crate::services::providers::CompletionClient;
use tracing::info;

/// Extract the policy text from an uploaded file (PDF or plain text).
pub fn preprocess_file(file_name: &str, bytes: &[u8]) -> Result<String, String> {
    let text = extract_document_text(file_name, bytes).map_err(|e| e.to_string())?;
    info!(
        "[API] Extracted {} chars from {}",
        text.chars().count(),
        file_name
    );
    Ok(text)
}

/// Missing input is fatal to starting a run; no partial results exist yet.
fn require_policy_text(policy_text: &str) -> Result<(), String> {
    if policy_text.trim().is_empty() {
        return Err("No policy text provided".to_string());
    }
    Ok(())
}

/// Run the block/checklist audit: segment, evaluate every block, aggregate.
/// Per-block failures are carried in the report, not raised.
pub async fn run_checklist_audit(
    cfg: &AuditConfig,
    policy_text: &str,
) -> Result<ChecklistReport, String> {
    require_policy_text(policy_text)?;

    let blocks = break_into_blocks(policy_text);
    info!("[API] Checklist audit over {} blocks", blocks.len());

    let client = CompletionClient::with_base_url(cfg.base_url.clone());
    let (evaluations, failures) = evaluate_blocks(&client, cfg, &blocks).await;
    let summaries = compile_checklist_summary(&cfg.checklist, &evaluations);

    Ok(ChecklistReport {
        request_id: uuid::Uuid::new_v4().to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        model: cfg.model.clone(),
        block_count: blocks.len() as i32,
        evaluated_count: evaluations.len() as i32,
        summaries,
        block_results: evaluations,
        failures,
    })
}

/// Run the section-wise audit: one analysis per statute section, scored
/// over the sections that parsed. Per-section failures are carried in the
/// report, not raised.
pub async fn run_section_audit(
    cfg: &AuditConfig,
    policy_text: &str,
) -> Result<SectionReport, String> {
    require_policy_text(policy_text)?;

    let client = CompletionClient::with_base_url(cfg.base_url.clone());
    let (analyses, failures) = analyze_sections(&client, cfg, policy_text).await;

    let scored_points: f64 = analyses.iter().map(|a| a.compliance_points).sum();
    let percent = compliance_percent(&analyses);
    let section_count = analyses.len() as i32;

    Ok(SectionReport {
        request_id: uuid::Uuid::new_v4().to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        model: cfg.model.clone(),
        analyses,
        failures,
        scored_points,
        section_count,
        compliance_percent: percent,
    })
}
