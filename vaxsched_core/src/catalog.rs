//! Default catalog of vaccine definitions.
//!
//! This module provides the built-in dose interval table. Labels are in the
//! clinic's locale (Thai).

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds an owned copy of the default catalog
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn definition(kind: VaccineKind, label: &str, offsets: &[u32], labels: &[&str]) -> VaccineDefinition {
    VaccineDefinition {
        kind,
        label: label.into(),
        dose_offsets: offsets.to_vec(),
        dose_labels: labels.iter().map(|l| l.to_string()).collect(),
    }
}

fn build_default_catalog_internal() -> Catalog {
    let definitions = [
        definition(
            VaccineKind::Flu,
            "วัคซีนไข้หวัดใหญ่",
            &[0, 365],
            &["เข็มที่ 1", "ฉีดกระตุ้นปีหน้า"],
        ),
        definition(
            VaccineKind::HepB,
            "วัคซีนไวรัสตับอักเสบบี",
            &[0, 28, 168],
            &["โดส 1", "โดส 2 (1 เดือน)", "โดส 3 (6 เดือน)"],
        ),
        definition(
            VaccineKind::Tetanus,
            "วัคซีนป้องกันบาดทะยัก",
            &[0, 28, 196],
            &["โดส 1", "โดส 2 (1 เดือน)", "โดส 3 (หลังจากโดส 2 อีก 6 เดือน)"],
        ),
        definition(
            VaccineKind::Shingles,
            "วัคซีนงูสวัด",
            &[0, 84],
            &["โดส 1", "โดส 2 (3 เดือน)"],
        ),
        definition(
            VaccineKind::Hpv,
            "วัคซีนป้องกันมะเร็งปากมดลูก",
            &[0, 28, 168],
            &["โดส 1", "โดส 2 (1 เดือน)", "โดส 3 (6 เดือน)"],
        ),
        definition(
            VaccineKind::Pneumonia,
            "วัคซีนปอดอักเสบ",
            &[0, 56],
            &["โดส 1", "โดส 2 (2 เดือน)"],
        ),
        definition(
            VaccineKind::Chickenpox,
            "วัคซีนอีสุกอีใส",
            &[0, 28],
            &["โดส 1", "โดส 2 (1 เดือน)"],
        ),
        // Post-exposure course: days 0, 3, 7, 14, 28
        definition(
            VaccineKind::Rabies,
            "วัคซีนพิษสุนัขบ้า",
            &[0, 3, 7, 14, 28],
            &[
                "เข็มที่ 1 (วันแรก)",
                "เข็มที่ 2 (วันที่ 3)",
                "เข็มที่ 3 (วันที่ 7)",
                "เข็มที่ 4 (วันที่ 14)",
                "เข็มที่ 5 (วันที่ 28)",
            ],
        ),
    ];

    Catalog {
        vaccines: definitions
            .into_iter()
            .map(|def| (def.kind, def))
            .collect::<BTreeMap<_, _>>(),
    }
}

impl Catalog {
    /// Look up the definition for a vaccine kind
    pub fn get(&self, kind: VaccineKind) -> Option<&VaccineDefinition> {
        self.vaccines.get(&kind)
    }

    /// Definitions in display order
    pub fn iter(&self) -> impl Iterator<Item = &VaccineDefinition> {
        self.vaccines.values()
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for kind in VaccineKind::ALL {
            if !self.vaccines.contains_key(&kind) {
                errors.push(format!("Catalog has no definition for '{}'", kind));
            }
        }

        for (kind, def) in &self.vaccines {
            if kind != &def.kind {
                errors.push(format!(
                    "Catalog key '{}' doesn't match definition.kind '{}'",
                    kind, def.kind
                ));
            }
            if def.label.is_empty() {
                errors.push(format!("Vaccine '{}' has empty label", kind));
            }

            match def.dose_offsets.first() {
                None => errors.push(format!("Vaccine '{}' has no doses", kind)),
                Some(&first) if first != 0 => errors.push(format!(
                    "Vaccine '{}': first dose offset is {} days, expected 0",
                    kind, first
                )),
                Some(_) => {}
            }

            if let Some(pair) = def.dose_offsets.windows(2).find(|w| w[1] < w[0]) {
                errors.push(format!(
                    "Vaccine '{}': dose offsets decrease ({} then {})",
                    kind, pair[0], pair[1]
                ));
            }

            if def.dose_labels.len() > def.dose_offsets.len() {
                errors.push(format!(
                    "Vaccine '{}' has {} labels for {} doses",
                    kind,
                    def.dose_labels.len(),
                    def.dose_offsets.len()
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.vaccines.len(), VaccineKind::ALL.len());
    }

    #[test]
    fn test_default_catalog_validates() {
        let errors = get_default_catalog().validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_dose_counts_within_range() {
        for def in get_default_catalog().iter() {
            assert!(
                (2..=5).contains(&def.dose_count()),
                "{} has {} doses",
                def.kind,
                def.dose_count()
            );
        }
        let rabies = get_default_catalog().get(VaccineKind::Rabies).unwrap();
        assert_eq!(rabies.dose_offsets, vec![0, 3, 7, 14, 28]);
    }

    #[test]
    fn test_iter_follows_display_order() {
        let kinds: Vec<_> = get_default_catalog().iter().map(|d| d.kind).collect();
        assert_eq!(kinds, VaccineKind::ALL.to_vec());
    }

    #[test]
    fn test_validate_flags_bad_offsets() {
        let mut catalog = build_default_catalog();
        if let Some(def) = catalog.vaccines.get_mut(&VaccineKind::Flu) {
            def.dose_offsets = vec![7, 3];
        }
        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("expected 0")));
        assert!(errors.iter().any(|e| e.contains("decrease")));
    }

    #[test]
    fn test_validate_flags_missing_kind() {
        let mut catalog = build_default_catalog();
        catalog.vaccines.remove(&VaccineKind::Shingles);
        let errors = catalog.validate();
        assert_eq!(errors, vec!["Catalog has no definition for 'shingles'".to_string()]);
    }
}
