//! Static medicine-precautions reference dataset.
//!
//! This is the bundled dataset behind `GET /api/medicine/precautions` and the
//! `precaution lookup` command: per-medicine safety guidance plus known
//! drug-interaction warnings. Lookup is case-insensitive, matching a name
//! exactly or by substring containment.

use crate::{AlertSeverity, PrecautionKind};
use once_cell::sync::Lazy;
use serde::Serialize;

/// One safety note in the reference dataset
#[derive(Clone, Debug, Serialize)]
pub struct ReferencePrecaution {
    pub kind: PrecautionKind,
    pub description: &'static str,
    pub severity: AlertSeverity,
}

/// A known interaction with another substance
#[derive(Clone, Debug, Serialize)]
pub struct InteractionWarning {
    pub with: &'static str,
    pub warning: &'static str,
}

/// A medicine entry in the bundled dataset
#[derive(Clone, Debug, Serialize)]
pub struct MedicineRecord {
    pub name: &'static str,
    pub generic_name: &'static str,
    pub precautions: Vec<ReferencePrecaution>,
    pub interactions: Vec<InteractionWarning>,
}

/// Cached reference dataset - built once and reused across all lookups
static REFERENCE_DATA: Lazy<Vec<MedicineRecord>> = Lazy::new(build_reference_data);

/// Get a reference to the cached dataset
pub fn reference_data() -> &'static [MedicineRecord] {
    &REFERENCE_DATA
}

/// Case-insensitive lookup: exact name match, or name containment
pub fn lookup_medicine(name: &str) -> Option<&'static MedicineRecord> {
    let needle = name.to_lowercase();
    REFERENCE_DATA.iter().find(|m| {
        let candidate = m.name.to_lowercase();
        candidate == needle || candidate.contains(&needle)
    })
}

/// Known interaction warning between two substances, either direction
pub fn interactions_between(a: &str, b: &str) -> Option<&'static str> {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    REFERENCE_DATA.iter().find_map(|m| {
        let name = m.name.to_lowercase();
        m.interactions.iter().find_map(|i| {
            let with = i.with.to_lowercase();
            if (name == a && with == b) || (name == b && with == a) {
                Some(i.warning)
            } else {
                None
            }
        })
    })
}

fn build_reference_data() -> Vec<MedicineRecord> {
    vec![
        MedicineRecord {
            name: "Aspirin",
            generic_name: "acetylsalicylic acid",
            precautions: vec![
                ReferencePrecaution {
                    kind: PrecautionKind::Food,
                    description: "Take with food to prevent stomach upset",
                    severity: AlertSeverity::Low,
                },
                ReferencePrecaution {
                    kind: PrecautionKind::Other,
                    description: "Watch for unusual bruising or bleeding",
                    severity: AlertSeverity::High,
                },
            ],
            interactions: vec![
                InteractionWarning {
                    with: "Warfarin",
                    warning: "Increased bleeding risk",
                },
                InteractionWarning {
                    with: "Ibuprofen",
                    warning: "Increased GI bleeding risk",
                },
            ],
        },
        MedicineRecord {
            name: "Ibuprofen",
            generic_name: "ibuprofen",
            precautions: vec![
                ReferencePrecaution {
                    kind: PrecautionKind::Food,
                    description: "Take with food or milk",
                    severity: AlertSeverity::Low,
                },
                ReferencePrecaution {
                    kind: PrecautionKind::Other,
                    description: "Avoid long-term use without medical supervision",
                    severity: AlertSeverity::Medium,
                },
            ],
            interactions: vec![InteractionWarning {
                with: "Aspirin",
                warning: "Increased GI bleeding risk",
            }],
        },
        MedicineRecord {
            name: "Acetaminophen",
            generic_name: "paracetamol",
            precautions: vec![
                ReferencePrecaution {
                    kind: PrecautionKind::Food,
                    description: "Avoid alcohol",
                    severity: AlertSeverity::High,
                },
                ReferencePrecaution {
                    kind: PrecautionKind::Other,
                    description: "Do not exceed 4g per day from all sources",
                    severity: AlertSeverity::High,
                },
            ],
            interactions: vec![],
        },
        MedicineRecord {
            name: "Amoxicillin",
            generic_name: "amoxicillin",
            precautions: vec![ReferencePrecaution {
                kind: PrecautionKind::Other,
                description: "Complete the full course even if symptoms improve",
                severity: AlertSeverity::Medium,
            }],
            interactions: vec![],
        },
        MedicineRecord {
            name: "Lisinopril",
            generic_name: "lisinopril",
            precautions: vec![
                ReferencePrecaution {
                    kind: PrecautionKind::Food,
                    description: "Avoid salt substitutes containing potassium",
                    severity: AlertSeverity::Medium,
                },
                ReferencePrecaution {
                    kind: PrecautionKind::Activity,
                    description: "May cause dizziness when standing up quickly",
                    severity: AlertSeverity::Medium,
                },
            ],
            interactions: vec![InteractionWarning {
                with: "Potassium",
                warning: "Hyperkalemia risk",
            }],
        },
        MedicineRecord {
            name: "Metformin",
            generic_name: "metformin",
            precautions: vec![
                ReferencePrecaution {
                    kind: PrecautionKind::Food,
                    description: "Take with meals to reduce stomach upset",
                    severity: AlertSeverity::Low,
                },
                ReferencePrecaution {
                    kind: PrecautionKind::Food,
                    description: "Avoid alcohol",
                    severity: AlertSeverity::High,
                },
            ],
            interactions: vec![InteractionWarning {
                with: "Alcohol",
                warning: "Lactic acidosis risk",
            }],
        },
        MedicineRecord {
            name: "Atorvastatin",
            generic_name: "atorvastatin",
            precautions: vec![ReferencePrecaution {
                kind: PrecautionKind::Food,
                description: "Avoid grapefruit and grapefruit juice",
                severity: AlertSeverity::High,
            }],
            interactions: vec![],
        },
        MedicineRecord {
            name: "Levothyroxine",
            generic_name: "levothyroxine",
            precautions: vec![ReferencePrecaution {
                kind: PrecautionKind::Food,
                description: "Take on an empty stomach, 30-60 minutes before breakfast",
                severity: AlertSeverity::Medium,
            }],
            interactions: vec![InteractionWarning {
                with: "Calcium",
                warning: "Reduced absorption",
            }],
        },
        MedicineRecord {
            name: "Omeprazole",
            generic_name: "omeprazole",
            precautions: vec![ReferencePrecaution {
                kind: PrecautionKind::Food,
                description: "Take before the first meal of the day",
                severity: AlertSeverity::Low,
            }],
            interactions: vec![],
        },
        MedicineRecord {
            name: "Warfarin",
            generic_name: "warfarin",
            precautions: vec![
                ReferencePrecaution {
                    kind: PrecautionKind::Food,
                    description: "Keep vitamin K intake consistent (leafy greens)",
                    severity: AlertSeverity::High,
                },
                ReferencePrecaution {
                    kind: PrecautionKind::Activity,
                    description: "Avoid activities with high injury risk",
                    severity: AlertSeverity::High,
                },
            ],
            interactions: vec![InteractionWarning {
                with: "Aspirin",
                warning: "Increased bleeding risk",
            }],
        },
        MedicineRecord {
            name: "Simvastatin",
            generic_name: "simvastatin",
            precautions: vec![ReferencePrecaution {
                kind: PrecautionKind::Food,
                description: "Avoid grapefruit and grapefruit juice",
                severity: AlertSeverity::High,
            }],
            interactions: vec![InteractionWarning {
                with: "Grapefruit",
                warning: "Increased statin levels",
            }],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_exact_case_insensitive() {
        let record = lookup_medicine("ASPIRIN").unwrap();
        assert_eq!(record.name, "Aspirin");
    }

    #[test]
    fn test_lookup_substring() {
        let record = lookup_medicine("aspir").unwrap();
        assert_eq!(record.name, "Aspirin");
    }

    #[test]
    fn test_lookup_unknown_returns_none() {
        assert!(lookup_medicine("unobtainium").is_none());
    }

    #[test]
    fn test_interactions_are_bidirectional() {
        assert_eq!(
            interactions_between("warfarin", "aspirin"),
            Some("Increased bleeding risk")
        );
        assert_eq!(
            interactions_between("Aspirin", "Warfarin"),
            Some("Increased bleeding risk")
        );
        assert!(interactions_between("aspirin", "omeprazole").is_none());
    }

    #[test]
    fn test_every_record_has_a_precaution() {
        for record in reference_data() {
            assert!(
                !record.precautions.is_empty(),
                "{} has no precautions",
                record.name
            );
        }
    }
}
