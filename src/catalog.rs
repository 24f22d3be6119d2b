//! Enriched catalog: derived attributes layered over an immutable store

use std::sync::Arc;

use tracing::debug;

use crate::classify::is_biosourced;
use crate::eco::compute_eco_scores;
use crate::models::{Column, ColumnSet, MaterialRecord, MaterialView};
use crate::store::RecordStore;

/// Which derived metrics enrichment should compute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enrichment {
    pub eco_score: bool,
}

impl Default for Enrichment {
    fn default() -> Self {
        Self { eco_score: true }
    }
}

/// A record store plus per-record derived values, in store order
#[derive(Debug, Clone)]
pub struct Catalog {
    store: RecordStore,
    enrichment: Enrichment,
    eco_scores: Vec<Option<f64>>,
    biosourced: Vec<bool>,
    columns: ColumnSet,
}

impl Catalog {
    pub fn enrich(store: RecordStore, enrichment: Enrichment) -> Self {
        let records = store.records();
        let eco_scores = if enrichment.eco_score {
            compute_eco_scores(records)
        } else {
            vec![None; records.len()]
        };
        let biosourced = records.iter().map(is_biosourced).collect();

        let mut columns = store.columns().clone();
        if enrichment.eco_score {
            columns.insert(Column::EcoScore);
        }

        debug!("Enriched {} records (eco-score: {})", records.len(), enrichment.eco_score);
        Self {
            store,
            enrichment,
            eco_scores,
            biosourced,
            columns,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn enrichment(&self) -> Enrichment {
        self.enrichment
    }

    /// Columns available for filtering, sorting and aggregation
    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(column)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn view(&self, idx: usize) -> Option<MaterialView<'_>> {
        let record: &MaterialRecord = self.store.records().get(idx)?;
        Some(MaterialView {
            record,
            eco_score: self.eco_scores[idx],
            biosourced: self.biosourced[idx],
        })
    }

    pub fn views(&self) -> Vec<MaterialView<'_>> {
        (0..self.len()).filter_map(|i| self.view(i)).collect()
    }

    /// First record carrying exactly this name
    pub fn find(&self, name: &str) -> Option<MaterialView<'_>> {
        self.store
            .records()
            .iter()
            .position(|r| r.name.as_deref() == Some(name))
            .and_then(|idx| self.view(idx))
    }
}

/// Memoised enrichment keyed by the identity of the base record set.
///
/// Filter and sort changes reuse the same enriched catalog; a new snapshot
/// or a different enrichment setting recomputes it.
#[derive(Debug, Default)]
pub struct EnrichmentCache {
    cached: Option<Arc<Catalog>>,
}

impl EnrichmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, store: &RecordStore, enrichment: Enrichment) -> Arc<Catalog> {
        if let Some(catalog) = &self.cached {
            if catalog.store.same_snapshot(store) && catalog.enrichment == enrichment {
                debug!("Reusing enriched catalog");
                return Arc::clone(catalog);
            }
        }
        let catalog = Arc::new(Catalog::enrich(store.clone(), enrichment));
        self.cached = Some(Arc::clone(&catalog));
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RecordStore {
        RecordStore::from_records(vec![
            MaterialRecord {
                cost_eur_m2: Some(10.0),
                subtype: Some("Isolant biosourcé".into()),
                ..MaterialRecord::named("Chanvre")
            },
            MaterialRecord {
                cost_eur_m2: Some(20.0),
                ..MaterialRecord::named("Béton")
            },
        ])
    }

    #[test]
    fn enrichment_layers_derived_values() {
        let catalog = Catalog::enrich(store(), Enrichment::default());
        let views = catalog.views();
        assert_eq!(views[0].eco_score, Some(100.0));
        assert!(views[0].biosourced);
        assert_eq!(views[1].eco_score, Some(0.0));
        assert!(!views[1].biosourced);
        assert!(catalog.has_column(Column::EcoScore));
    }

    #[test]
    fn disabled_eco_score_leaves_column_out() {
        let catalog = Catalog::enrich(store(), Enrichment { eco_score: false });
        assert!(catalog.views().iter().all(|v| v.eco_score.is_none()));
        assert!(!catalog.has_column(Column::EcoScore));
    }

    #[test]
    fn cache_reuses_catalog_for_same_snapshot() {
        let base = store();
        let mut cache = EnrichmentCache::new();
        let first = cache.get(&base, Enrichment::default());
        let second = cache.get(&base.clone(), Enrichment::default());
        assert!(Arc::ptr_eq(&first, &second));

        let other = cache.get(&store(), Enrichment::default());
        assert!(!Arc::ptr_eq(&first, &other));

        let toggled = cache.get(&base, Enrichment { eco_score: false });
        assert!(!Arc::ptr_eq(&first, &toggled));
    }

    #[test]
    fn find_returns_first_match() {
        let catalog = Catalog::enrich(store(), Enrichment::default());
        assert_eq!(catalog.find("Béton").and_then(|v| v.name()), Some("Béton"));
        assert!(catalog.find("Acier").is_none());
    }
}
