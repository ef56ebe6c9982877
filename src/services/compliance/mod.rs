// Compliance Module
// DPDPA audit core organized into specialized submodules:
// - catalog: built-in checklist and statute section definitions
// - evaluator: per-block checklist evaluation via the completion provider
// - aggregation: merges block evaluations into per-item summaries
// - section_audit: full-policy analysis per statute section with scoring
// - export: CSV report rendering

pub mod aggregation;
pub mod catalog;
pub mod evaluator;
pub mod export;
pub mod section_audit;

pub use aggregation::compile_checklist_summary;
pub use catalog::{dpdpa_sections, load_checklist_file, section_4_checklist};
pub use evaluator::{build_checklist_prompt, evaluate_blocks, parse_block_evaluation};
pub use export::{section_report_csv, write_section_csv};
pub use section_audit::{
    analyze_sections, build_section_prompt, compliance_percent, parse_section_analysis,
};

use crate::models::{ChecklistItem, StatuteSection};
use crate::services::config_store::{AppConfig, ConfigStore};
use crate::services::providers;
use std::path::Path;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Run configuration resolved once at startup and passed by reference to
/// every collaborator that needs it. No ambient globals.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub api_key: String,
    pub model: String,
    /// Resolved completion endpoint.
    pub base_url: String,
    pub checklist: Vec<ChecklistItem>,
    pub sections: Vec<StatuteSection>,
    pub request_timeout_secs: u64,
}

impl AuditConfig {
    /// Config with built-in checklist and sections and default endpoint.
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: providers::resolve_base_url(None),
            checklist: section_4_checklist(),
            sections: dpdpa_sections(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Resolve the full run configuration from the config store, the
    /// environment, and CLI overrides. A missing API key is fatal here so
    /// no run starts half-configured.
    pub fn resolve(
        model_override: Option<&str>,
        checklist_override: Option<&Path>,
    ) -> Result<Self, String> {
        let stored = match ConfigStore::default_config_dir() {
            Some(dir) => ConfigStore::new(dir).load()?,
            None => AppConfig::default(),
        };

        let api_key = providers::get_api_key().ok_or_else(|| {
            "OpenAI API key not configured (set OPENAI_API_KEY or store one in the config file)"
                .to_string()
        })?;

        let model = model_override
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| stored.model_or_default());

        let checklist = match checklist_override {
            Some(path) => load_checklist_file(path)?,
            None => match stored.checklist_path.as_deref() {
                Some(path) => load_checklist_file(Path::new(path))?,
                None => section_4_checklist(),
            },
        };

        Ok(Self {
            api_key,
            model,
            base_url: providers::resolve_base_url(stored.base_url.as_deref()),
            checklist,
            sections: dpdpa_sections(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config_uses_builtin_catalog() {
        let cfg = AuditConfig::new("sk-test".to_string(), "gpt-3.5-turbo".to_string());
        assert_eq!(cfg.checklist.len(), 4);
        assert_eq!(cfg.sections.len(), 7);
        assert_eq!(cfg.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert!(!cfg.base_url.is_empty());
    }
}
