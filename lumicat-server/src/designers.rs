//! Designer resolution over the catalog
//!
//! A luminaire belongs to a designer through its `designer_id` when set.
//! Unlinked luminaires fall back to case-insensitive equality of derived
//! keys, so catalogs that were never backfilled still resolve.

use std::collections::HashSet;

use lumicat_common::db::models::{Designer, Luminaire};
use lumicat_common::designer::{derived_key, matches_lookup, same_designer};
use serde::Serialize;
use uuid::Uuid;

/// Whether `lum` is attributed to `designer`
pub fn belongs_to(lum: &Luminaire, designer: &Designer) -> bool {
    match (lum.designer_id, designer.id) {
        (Some(linked), Some(id)) => linked == id,
        // Linked records only count for their explicit designer
        (Some(_), None) => false,
        (None, _) => same_designer(&lum.designer, &designer.name),
    }
}

fn count_for(designer: &Designer, luminaires: &[Luminaire]) -> usize {
    luminaires.iter().filter(|l| belongs_to(l, designer)).count()
}

/// Explicit designers plus derived ones, each with its luminaire count
///
/// A derived entry is produced for every distinct derived key that no
/// explicit designer claims.
pub fn directory(explicit: Vec<Designer>, luminaires: &[Luminaire]) -> Vec<Designer> {
    let mut claimed: HashSet<String> = explicit
        .iter()
        .map(|d| derived_key(&d.name).to_lowercase())
        .collect();

    let mut listing: Vec<Designer> = explicit
        .into_iter()
        .map(|mut d| {
            d.luminaire_count = count_for(&d, luminaires);
            d
        })
        .collect();

    let mut derived: Vec<Designer> = Vec::new();
    for lum in luminaires.iter().filter(|l| l.designer_id.is_none()) {
        let key = derived_key(&lum.designer).to_lowercase();
        if key.is_empty() || !claimed.insert(key) {
            continue;
        }
        let mut d = Designer::derived_from(&lum.designer);
        d.luminaire_count = count_for(&d, luminaires);
        derived.push(d);
    }

    derived.sort_by_key(|d| d.name.to_lowercase());
    listing.extend(derived);
    listing
}

/// A resolved designer page
#[derive(Debug, Clone, Serialize)]
pub struct DesignerProfile {
    pub designer: Designer,
    pub luminaires: Vec<Luminaire>,
}

fn explicit_match<'a>(lookup: &str, explicit: &'a [Designer]) -> Option<&'a Designer> {
    let lower = lookup.trim().to_lowercase();
    explicit
        .iter()
        .find(|d| d.slug == lower)
        .or_else(|| explicit.iter().find(|d| d.name.to_lowercase() == lower))
        .or_else(|| explicit.iter().find(|d| same_designer(&d.name, lookup)))
}

/// Resolve `lookup` (slug, name or derived key) to a designer and its
/// luminaires
///
/// Explicit designers win; otherwise a derived designer is built from the
/// first unlinked luminaire whose designer string matches.
pub fn resolve(lookup: &str, explicit: &[Designer], luminaires: Vec<Luminaire>) -> Option<DesignerProfile> {
    let mut designer = match explicit_match(lookup, explicit) {
        Some(d) => d.clone(),
        None => luminaires
            .iter()
            .filter(|l| l.designer_id.is_none())
            .find(|l| matches_lookup(&l.designer, lookup))
            .map(|l| Designer::derived_from(&l.designer))?,
    };

    let luminaires: Vec<Luminaire> = luminaires
        .into_iter()
        .filter(|l| belongs_to(l, &designer))
        .collect();
    designer.luminaire_count = luminaires.len();

    Some(DesignerProfile {
        designer,
        luminaires,
    })
}

/// Links produced by a backfill pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillPlan {
    /// `(luminaire id, designer id)` pairs to write
    pub links: Vec<(Uuid, Uuid)>,
    /// Unlinked luminaires with a designer string no explicit designer matches
    pub unmatched: usize,
}

/// Plan the explicit links for every unlinked luminaire
///
/// Luminaires without a designer string are neither linked nor counted.
pub fn plan_backfill(explicit: &[Designer], luminaires: &[Luminaire]) -> BackfillPlan {
    let mut plan = BackfillPlan::default();

    for lum in luminaires.iter().filter(|l| l.designer_id.is_none()) {
        if derived_key(&lum.designer).is_empty() {
            continue;
        }
        let target = explicit
            .iter()
            .find(|d| same_designer(&d.name, &lum.designer))
            .and_then(|d| d.id);
        match target {
            Some(designer_id) => plan.links.push((lum.id, designer_id)),
            None => plan.unmatched += 1,
        }
    }

    plan
}
