use poli_check_lib::api::preprocess_file;
use poli_check_lib::models::Block;
use poli_check_lib::services::block_segmenter::{break_into_blocks, is_heading_start};
use serde::Serialize;

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn main() -> Result<(), String> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage:\n  cargo run --bin segment_policy -- <path.pdf|path.txt> [--blocks <n>] [--headings] [--out <json_path>]\n\nNotes:\n  - Dumps the evaluation blocks the checklist audit would send, without calling any provider.\n  - `--headings` also lists which input lines matched the heading predicate."
        );
        return Ok(());
    }

    let path = args[1].clone();
    let blocks_n: usize = parse_arg_value(&args, "--blocks")
        .and_then(|s| s.parse().ok())
        .unwrap_or(20);
    let show_headings = has_flag(&args, "--headings");
    let out_path = parse_arg_value(&args, "--out");

    let bytes = std::fs::read(&path).map_err(|e| format!("read file failed: {}", e))?;
    let file_name = std::path::Path::new(&path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "input.txt".to_string());

    let text = preprocess_file(&file_name, &bytes)?;
    let blocks = break_into_blocks(&text);

    println!("File: {}", path);
    println!("Extracted: {} chars ({} bytes)", text.chars().count(), text.len());
    println!();

    if show_headings {
        let headings: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && is_heading_start(line))
            .collect();
        println!("Heading lines: {}", headings.len());
        for line in &headings {
            println!("  {}", preview(line, 100));
        }
        println!();
    }

    println!("Blocks: {}", blocks.len());
    for b in blocks.iter().take(blocks_n) {
        let len = b.text.chars().count();
        println!("[{}] chars={}  {}", b.block_id(), len, preview(&b.text, 140));
    }
    if blocks.len() > blocks_n {
        println!("... ({} more blocks)", blocks.len() - blocks_n);
    }

    if let Some(out_path) = out_path {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Output {
            file: String,
            extracted_chars: usize,
            extracted_bytes: usize,
            blocks: Vec<Block>,
        }

        let out = Output {
            file: path.clone(),
            extracted_chars: text.chars().count(),
            extracted_bytes: text.len(),
            blocks,
        };

        let json = serde_json::to_string_pretty(&out).map_err(|e| e.to_string())?;
        std::fs::write(&out_path, json).map_err(|e| format!("write out failed: {}", e))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}
