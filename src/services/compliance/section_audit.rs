// Section Audit
// Full-policy analysis against each DPDPA Chapter II section, with a
// compliance score over the successfully parsed sections

use crate::models::{SectionAnalysis, SectionFailure, StatuteSection};
use crate::services::providers::CompletionClient;
use std::time::Instant;
use tracing::{info, warn};

use super::evaluator::extract_json;
use super::AuditConfig;

const ANALYSIS_MAX_TOKENS: i32 = 1024;
const ANALYSIS_TEMPERATURE: f64 = 0.2;

const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are a DPDPA compliance expert.
You reply with a single valid JSON object and nothing else."#;

/// Build the user prompt for one statute section.
pub fn build_section_prompt(section: &StatuteSection, policy_text: &str) -> String {
    format!(
        r#"Analyze the company's full Privacy Policy text given below:
"""{policy_text}"""

Cross-reference it ONLY against the following DPDPA Section:
"""{heading}"""

Instructions:
- Find all matching sentences/phrases that are contextually aligned with this Section.
- If NO match is found, clearly state "No matching text found."
- If matches are found:
    - Quote ALL matched policy sentences (not just the first one).
- Classify:
    - Match Level: Fully Compliant / Partially Compliant / Non-Compliant
    - If Partially Compliant, classify Severity:
        - Minor = Small, non-critical missing point
        - Medium = Important but fixable gap
        - Major = Critical missing requirement
- Assign Compliance Points:
    - Fully Compliant = 1.0
    - Partially Compliant:
        - Minor = 0.75
        - Medium = 0.5
        - Major = 0.25
    - Non-Compliant = 0.0
- Provide a short Justification and Suggested Rewrite.

Output strictly in JSON format:
{{
  "DPDPA Section": "...",
  "Matched Policy Snippets": "...",
  "Match Level": "...",
  "Severity": "...",
  "Compliance Points": "...",
  "Justification": "...",
  "Suggested Rewrite": "..."
}}"#,
        heading = section.heading(),
    )
}

/// Parse one section analysis reply. Points are clamped to the rubric's
/// 0.0..=1.0 range whatever the model claims.
pub fn parse_section_analysis(content: &str) -> Result<SectionAnalysis, String> {
    let json_str = extract_json(content.trim())?;
    let mut analysis: SectionAnalysis = serde_json::from_str(&json_str)
        .map_err(|e| format!("JSON parse error: {}", e))?;
    analysis.compliance_points = analysis.compliance_points.clamp(0.0, 1.0);
    Ok(analysis)
}

/// Sum of points over section count, as a percentage. Zero sections means
/// zero percent rather than a division error.
pub fn compliance_percent(analyses: &[SectionAnalysis]) -> f64 {
    if analyses.is_empty() {
        return 0.0;
    }
    let scored: f64 = analyses.iter().map(|a| a.compliance_points).sum();
    scored / analyses.len() as f64 * 100.0
}

/// Analyze the policy against every configured section, in order.
/// Per-section call or parse failures are collected and excluded from
/// scoring; the remaining sections keep processing.
pub async fn analyze_sections(
    client: &CompletionClient,
    cfg: &AuditConfig,
    policy_text: &str,
) -> (Vec<SectionAnalysis>, Vec<SectionFailure>) {
    let started = Instant::now();
    info!(
        "[SECTION_AUDIT] Analyzing {} sections with model {}",
        cfg.sections.len(),
        cfg.model
    );

    let mut analyses: Vec<SectionAnalysis> = Vec::new();
    let mut failures: Vec<SectionFailure> = Vec::new();

    for section in &cfg.sections {
        let heading = section.heading();
        let user_prompt = build_section_prompt(section, policy_text);

        let timeout_duration = std::time::Duration::from_secs(cfg.request_timeout_secs);
        let call = client.call_chat(
            &cfg.model,
            &cfg.api_key,
            ANALYSIS_SYSTEM_PROMPT,
            &user_prompt,
            ANALYSIS_MAX_TOKENS,
            ANALYSIS_TEMPERATURE,
            true,
        );

        match tokio::time::timeout(timeout_duration, call).await {
            Ok(Ok(chat_result)) => match parse_section_analysis(&chat_result.content) {
                Ok(mut analysis) => {
                    // Models occasionally echo an abbreviated section name;
                    // pin the configured heading so rows stay identifiable.
                    if analysis.section.trim().is_empty() {
                        analysis.section = heading.clone();
                    }
                    info!(
                        "[SECTION_AUDIT] {} ok: {} points, latency_ms={}",
                        heading, analysis.compliance_points, chat_result.latency_ms
                    );
                    analyses.push(analysis);
                }
                Err(e) => {
                    warn!("[SECTION_AUDIT] {} reply unparseable: {}", heading, e);
                    failures.push(SectionFailure {
                        section: heading,
                        error: e,
                        raw_response: Some(chat_result.content),
                    });
                }
            },
            Ok(Err(e)) => {
                warn!("[SECTION_AUDIT] {} call failed: {}", heading, e);
                failures.push(SectionFailure {
                    section: heading,
                    error: e.to_string(),
                    raw_response: None,
                });
            }
            Err(_) => {
                warn!(
                    "[SECTION_AUDIT] {} timed out after {}s",
                    heading, cfg.request_timeout_secs
                );
                failures.push(SectionFailure {
                    section: heading,
                    error: format!("timeout after {}s", cfg.request_timeout_secs),
                    raw_response: None,
                });
            }
        }
    }

    info!(
        "[SECTION_AUDIT] Done: {} analyzed, {} failed, elapsed_ms={}",
        analyses.len(),
        failures.len(),
        started.elapsed().as_millis()
    );

    (analyses, failures)
}
