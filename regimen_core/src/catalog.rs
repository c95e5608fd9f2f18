//! Default catalog of treatments.
//!
//! This module provides the built-in treatments the schedule can emit,
//! together with the legend shown alongside calendar views.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Label of the divider that opens Wednesday mornings
pub const WEDNESDAY_DIVIDER_LABEL: &str = "After Gym Session";

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// The complete set of treatments, keyed by identifier
#[derive(Clone, Debug)]
pub struct Catalog {
    pub treatments: HashMap<TreatmentId, TreatmentEntry>,
}

/// Builds the default catalog with the built-in treatments
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference.
pub fn build_default_catalog() -> Catalog {
    let mut treatments = HashMap::new();

    let mut insert = |id: TreatmentId, name: &str, category: Category| {
        treatments.insert(
            id,
            TreatmentEntry {
                id,
                name: name.into(),
                category,
            },
        );
    };

    // Special-event day
    insert(TreatmentId::PrpProcedure, "PRP Treatment", Category::Procedure);
    insert(TreatmentId::Recovery, "Gentle Care & Rest", Category::HairMask);

    // Daily base routine
    insert(TreatmentId::MorningMinoxidil, "Minoxidil", Category::Minoxidil);
    insert(TreatmentId::RedLight, "Red Light Therapy", Category::LightTherapy);
    insert(TreatmentId::EveningMinoxidil, "Minoxidil", Category::Minoxidil);
    insert(TreatmentId::Serum, "Hair Serum", Category::Serum);

    // Weekday additions
    insert(TreatmentId::Ru58841, "RU58841", Category::Topical);
    insert(TreatmentId::GymShampoo, "Carol's Daughter Shampoo", Category::Shampoo);
    insert(TreatmentId::Nizoral, "Nizoral Shampoo", Category::MedicatedShampoo);
    insert(
        TreatmentId::Microneedling,
        "Microneedling (1.25mm)",
        Category::Microneedling,
    );
    insert(TreatmentId::RestDay, "Rest Day (PRP Week)", Category::Procedure);

    // Alternating Saturday hair masks
    insert(TreatmentId::K18, "K18 Treatment", Category::HairMask);
    insert(TreatmentId::DeepConditioning, "Deep Conditioning", Category::HairMask);

    Catalog { treatments }
}

/// Legend entries shown next to calendar views, in display order
pub fn legend() -> Vec<(Category, &'static str)> {
    vec![
        (Category::Minoxidil, "Minoxidil"),
        (Category::Topical, "RU58841"),
        (Category::LightTherapy, "Red Light"),
        (Category::Microneedling, "Microneedling"),
        (Category::MedicatedShampoo, "Nizoral"),
        (Category::Shampoo, "Carol's Daughter"),
        (Category::HairMask, "Hair Mask"),
        (Category::Procedure, "PRP"),
        (Category::Serum, "Hair Serum"),
    ]
}

impl Catalog {
    /// Look up a treatment by identifier
    pub fn get(&self, id: TreatmentId) -> Option<&TreatmentEntry> {
        self.treatments.get(&id)
    }

    /// Build a schedule entry for `id`
    ///
    /// Returns None (and logs) if the catalog lacks the treatment;
    /// `validate()` reports such gaps up front.
    pub fn entry(&self, id: TreatmentId) -> Option<Entry> {
        let entry = self.get(id).cloned().map(Entry::Treatment);
        if entry.is_none() {
            tracing::warn!("Treatment {:?} missing from catalog, skipping", id);
        }
        entry
    }

    /// Check the catalog for structural problems
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, treatment) in &self.treatments {
            if id != &treatment.id {
                errors.push(format!(
                    "Treatment key {:?} doesn't match treatment.id {:?}",
                    id, treatment.id
                ));
            }
            if treatment.name.trim().is_empty() {
                errors.push(format!("Treatment {:?} has empty name", id));
            }
        }

        for id in TreatmentId::ALL {
            if !self.treatments.contains_key(&id) {
                errors.push(format!("Catalog has no entry for {:?}", id));
            }
        }

        errors
    }
}
