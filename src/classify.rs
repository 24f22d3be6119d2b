//! Biosourced classification from the categorical text fields

use crate::models::{Column, MaterialRecord};

/// Truncated stem matching "biosourced", "biosourcé" and similar spellings
pub const BIOSOURCED_STEM: &str = "biosour";

const CLASSIFYING_COLUMNS: [Column; 3] = [Column::Subtype, Column::Type, Column::OriginNote];

pub fn is_biosourced(record: &MaterialRecord) -> bool {
    CLASSIFYING_COLUMNS.iter().any(|column| {
        record
            .text(*column)
            .is_some_and(|text| text.to_lowercase().contains(BIOSOURCED_STEM))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accented_subtype_is_biosourced() {
        let record = MaterialRecord {
            subtype: Some("Isolant biosourcé".into()),
            ..MaterialRecord::default()
        };
        assert!(is_biosourced(&record));
    }

    #[test]
    fn concrete_is_not_biosourced() {
        let record = MaterialRecord {
            subtype: Some("Béton".into()),
            ..MaterialRecord::default()
        };
        assert!(!is_biosourced(&record));
    }

    #[test]
    fn match_is_case_insensitive_on_any_field() {
        let by_type = MaterialRecord {
            material_type: Some("BIOSOURCED".into()),
            ..MaterialRecord::default()
        };
        let by_origin = MaterialRecord {
            origin_note: Some("Filière biosourcée locale".into()),
            ..MaterialRecord::default()
        };
        assert!(is_biosourced(&by_type));
        assert!(is_biosourced(&by_origin));
        assert!(!is_biosourced(&MaterialRecord::default()));
    }

    #[test]
    fn description_does_not_classify() {
        let record = MaterialRecord {
            description: Some("biosourced".into()),
            ..MaterialRecord::default()
        };
        assert!(!is_biosourced(&record));
    }
}
