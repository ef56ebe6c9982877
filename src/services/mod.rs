// poliCheck Core Services

pub mod block_segmenter;
pub mod compliance;
pub mod config_store;
pub mod extraction;
pub mod providers;

pub use block_segmenter::*;
pub use config_store::*;
pub use extraction::*;
pub use providers::*;

// Re-export compliance module functions
pub use compliance::{
    analyze_sections,
    compile_checklist_summary,
    compliance_percent,
    dpdpa_sections,
    evaluate_blocks,
    load_checklist_file,
    section_4_checklist,
    section_report_csv,
    write_section_csv,
    AuditConfig,
};
