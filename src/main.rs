use poli_check_lib::api;
use poli_check_lib::models::{ChecklistReport, SectionReport};
use poli_check_lib::services::AuditConfig;
use std::path::Path;

const USAGE: &str = "Usage:\n  poliCheck blocks (--pdf <path> | --text <path>) [--model <name>] [--checklist <items.json>] [--out <report.json>]\n  poliCheck sections (--pdf <path> | --text <path>) [--model <name>] [--csv <report.csv>] [--out <report.json>]\n\nNotes:\n  - `blocks` evaluates each policy block against the Section 4 checklist.\n  - `sections` analyzes the full policy against every DPDPA Chapter II section and scores it.\n  - The OpenAI API key is read from OPENAI_API_KEY / POLICHECK_OPENAI_API_KEY or the config file.";

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

/// Load the policy text from --pdf (extracted) or --text (read as UTF-8).
fn load_policy_text(args: &[String]) -> Result<String, String> {
    if let Some(path) = parse_arg_value(args, "--pdf") {
        let bytes = std::fs::read(&path).map_err(|e| format!("read file failed: {}", e))?;
        let file_name = Path::new(&path)
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "input.pdf".to_string());
        return api::preprocess_file(&file_name, &bytes);
    }
    if let Some(path) = parse_arg_value(args, "--text") {
        return std::fs::read_to_string(&path).map_err(|e| format!("read file failed: {}", e));
    }
    Err(format!("No input given. Provide --pdf or --text.\n\n{}", USAGE))
}

fn print_checklist_report(report: &ChecklistReport) {
    println!("Model: {}", report.model);
    println!("Blocks: {} ({} evaluated)", report.block_count, report.evaluated_count);
    println!();

    for result in &report.block_results {
        println!("{} result:", result.block_id);
        for finding in &result.items {
            println!("  {} - {}", finding.item_id, finding.status.as_str());
            if let Some(ref justification) = finding.justification {
                println!("      Justification: {}", justification);
            }
        }
    }

    for failure in &report.failures {
        println!("{} error: {}", failure.block_id, failure.error);
        if let Some(ref raw) = failure.raw_response {
            println!("  Raw response: {}", preview(raw, 200));
        }
    }

    println!();
    println!("Final Checklist Summary Across All Blocks");
    println!("-----------------------------------------");
    for summary in &report.summaries {
        println!("{} - {}", summary.item_id, summary.final_status.as_str());
        for matched in &summary.matched_blocks {
            println!("  -> {} - {}", matched.block_id, matched.status.as_str());
            if !matched.justification.is_empty() {
                println!("     Justification: {}", matched.justification);
            }
        }
    }
}

fn print_section_report(report: &SectionReport) {
    println!("Model: {}", report.model);
    println!();

    for analysis in &report.analyses {
        println!("{}", analysis.section);
        println!("  Match Level: {}", analysis.match_level);
        if !analysis.severity.is_empty() {
            println!("  Severity: {}", analysis.severity);
        }
        println!("  Compliance Points: {}", analysis.compliance_points);
        if !analysis.matched_snippets.is_empty() {
            println!("  Matched Snippets: {}", preview(&analysis.matched_snippets, 200));
        }
        if !analysis.justification.is_empty() {
            println!("  Justification: {}", analysis.justification);
        }
        if !analysis.suggested_rewrite.is_empty() {
            println!("  Suggested Rewrite: {}", analysis.suggested_rewrite);
        }
        println!();
    }

    for failure in &report.failures {
        println!("{} error: {}", failure.section, failure.error);
        if let Some(ref raw) = failure.raw_response {
            println!("  Raw response: {}", preview(raw, 200));
        }
    }

    println!(
        "Compliance Score: {:.2}% ({} of {} sections scored)",
        report.compliance_percent, report.section_count,
        report.section_count + report.failures.len() as i32
    );
}

async fn run_blocks(args: &[String]) -> Result<(), String> {
    let policy_text = load_policy_text(args)?;
    let model = parse_arg_value(args, "--model");
    let checklist_path = parse_arg_value(args, "--checklist");
    let cfg = AuditConfig::resolve(model.as_deref(), checklist_path.as_deref().map(Path::new))?;

    let report = api::run_checklist_audit(&cfg, &policy_text).await?;
    print_checklist_report(&report);

    if let Some(out_path) = parse_arg_value(args, "--out") {
        let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        std::fs::write(&out_path, json).map_err(|e| format!("write out failed: {}", e))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}

async fn run_sections(args: &[String]) -> Result<(), String> {
    let policy_text = load_policy_text(args)?;
    let model = parse_arg_value(args, "--model");
    let cfg = AuditConfig::resolve(model.as_deref(), None)?;

    let report = api::run_section_audit(&cfg, &policy_text).await?;
    print_section_report(&report);

    if let Some(csv_path) = parse_arg_value(args, "--csv") {
        poli_check_lib::services::write_section_csv(Path::new(&csv_path), &report.analyses)?;
        println!("Wrote CSV: {}", csv_path);
    }

    if let Some(out_path) = parse_arg_value(args, "--out") {
        let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        std::fs::write(&out_path, json).map_err(|e| format!("write out failed: {}", e))?;
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), String> {
    poli_check_lib::init_logging();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("{}", USAGE);
        return Ok(());
    }

    match args[1].as_str() {
        "blocks" => run_blocks(&args[2..]).await,
        "sections" => run_sections(&args[2..]).await,
        other => Err(format!("Unknown command: {}\n\n{}", other, USAGE)),
    }
}
