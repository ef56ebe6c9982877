// Statute Catalog
// Built-in DPDPA checklist and section definitions, loaded once per run

use crate::models::{ChecklistItem, StatuteSection};
use std::fs;
use std::path::Path;

/// The Section 4 requirement checklist used by the block evaluator.
pub fn section_4_checklist() -> Vec<ChecklistItem> {
    vec![
        ChecklistItem {
            id: "4.1".to_string(),
            text: "The policy must state that personal data is processed only as per the provisions of the Digital Personal Data Protection Act, 2023.".to_string(),
        },
        ChecklistItem {
            id: "4.2".to_string(),
            text: "The policy must confirm that personal data is processed only for a lawful purpose.".to_string(),
        },
        ChecklistItem {
            id: "4.3".to_string(),
            text: "The policy must define lawful purpose as any purpose not expressly forbidden by law.".to_string(),
        },
        ChecklistItem {
            id: "4.4".to_string(),
            text: "The policy must include a statement that personal data is processed only with the consent of the Data Principal.".to_string(),
        },
    ]
}

/// The DPDPA Chapter II sections covered by the section-wise audit.
pub fn dpdpa_sections() -> Vec<StatuteSection> {
    let titles = [
        ("4", "Grounds for Processing Personal Data"),
        ("5", "Notice"),
        ("6", "Consent"),
        ("7", "Certain Legitimate Uses"),
        ("8", "General Obligations of Data Fiduciary"),
        ("9", "Processing of Personal Data of Children"),
        ("10", "Additional Obligations of Significant Data Fiduciaries"),
    ];
    titles
        .iter()
        .map(|(id, title)| StatuteSection {
            id: id.to_string(),
            title: title.to_string(),
        })
        .collect()
}

/// Load a checklist override from a JSON file:
/// `[{"id": "4.1", "text": "..."}, ...]`. Empty files and duplicate ids are
/// rejected so a bad override fails loudly instead of producing a run with
/// silently collapsed summaries.
pub fn load_checklist_file(path: &Path) -> Result<Vec<ChecklistItem>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read checklist file {}: {}", path.display(), e))?;

    let items: Vec<ChecklistItem> = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse checklist file {}: {}", path.display(), e))?;

    if items.is_empty() {
        return Err(format!("Checklist file {} contains no items", path.display()));
    }
    for (pos, item) in items.iter().enumerate() {
        if item.id.trim().is_empty() {
            return Err(format!("Checklist item at position {} has an empty id", pos));
        }
        if items[..pos].iter().any(|prev| prev.id == item.id) {
            return Err(format!("Duplicate checklist item id '{}'", item.id));
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_checklist_ids() {
        let checklist = section_4_checklist();
        assert_eq!(checklist.len(), 4);
        let ids: Vec<&str> = checklist.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["4.1", "4.2", "4.3", "4.4"]);
    }

    #[test]
    fn test_builtin_sections_cover_chapter_two() {
        let sections = dpdpa_sections();
        assert_eq!(sections.len(), 7);
        assert_eq!(sections[0].heading(), "Section 4 \u{2014} Grounds for Processing Personal Data");
        assert_eq!(sections[6].id, "10");
    }

    #[test]
    fn test_checklist_ids_unique() {
        let checklist = section_4_checklist();
        for (pos, item) in checklist.iter().enumerate() {
            assert!(!checklist[..pos].iter().any(|prev| prev.id == item.id));
        }
    }
}
