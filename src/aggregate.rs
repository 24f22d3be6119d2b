//! Group-by summaries for reporting and charts

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Column, ColumnSet, MaterialView};

pub const BIOSOURCED_GROUP: &str = "biosourced";
pub const OTHER_GROUP: &str = "other";

/// What to group records by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Column(Column),
    /// Two groups, `biosourced` and `other`
    Biosourced,
}

impl GroupBy {
    fn key<'a>(self, view: &MaterialView<'a>) -> Option<&'a str> {
        match self {
            GroupBy::Column(column) => view.text(column),
            GroupBy::Biosourced if view.biosourced => Some(BIOSOURCED_GROUP),
            GroupBy::Biosourced => Some(OTHER_GROUP),
        }
    }

    fn available(self, columns: &ColumnSet) -> bool {
        match self {
            GroupBy::Column(column) => columns.contains(column),
            GroupBy::Biosourced => true,
        }
    }
}

/// Number of records per group; records without a group value are not counted
pub fn group_count(views: &[MaterialView<'_>], columns: &ColumnSet, group: GroupBy) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    if !group.available(columns) {
        return counts;
    }
    for view in views {
        if let Some(key) = group.key(view) {
            *counts.entry(key.to_string()).or_default() += 1;
        }
    }
    counts
}

/// Mean of `value` per group, skipping absent values.
///
/// A group with no values at all is left out of the mapping.
pub fn group_mean(
    views: &[MaterialView<'_>],
    columns: &ColumnSet,
    group: GroupBy,
    value: Column,
) -> BTreeMap<String, f64> {
    if !group.available(columns) || !columns.contains(value) {
        return BTreeMap::new();
    }

    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for view in views {
        if let (Some(key), Some(v)) = (group.key(view), view.number(value)) {
            let entry = sums.entry(key.to_string()).or_default();
            entry.0 += v;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(key, (sum, n))| (key, sum / n as f64))
        .collect()
}

/// Mean of a column over all views; `None` when the column has no values
pub fn mean(views: &[MaterialView<'_>], columns: &ColumnSet, value: Column) -> Option<f64> {
    if !columns.contains(value) {
        return None;
    }
    let values: Vec<f64> = views.iter().filter_map(|v| v.number(value)).collect();
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Number of distinct non-empty values of a text column
pub fn distinct_count(views: &[MaterialView<'_>], columns: &ColumnSet, column: Column) -> Option<usize> {
    columns
        .contains(column)
        .then(|| views.iter().filter_map(|v| v.text(column)).collect::<BTreeSet<_>>().len())
}

/// Headline numbers for the catalog and the current filtered selection
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub total: usize,
    pub filtered: usize,
    pub types: Option<usize>,
    pub countries: Option<usize>,
    pub mean_density: Option<f64>,
    pub mean_conductivity: Option<f64>,
    pub mean_carbon: Option<f64>,
}

pub fn overview(all: &[MaterialView<'_>], filtered: &[MaterialView<'_>], columns: &ColumnSet) -> Overview {
    Overview {
        total: all.len(),
        filtered: filtered.len(),
        types: distinct_count(all, columns, Column::Type),
        countries: distinct_count(all, columns, Column::Country),
        mean_density: mean(filtered, columns, Column::Density),
        mean_conductivity: mean(filtered, columns, Column::Conductivity),
        mean_carbon: mean(filtered, columns, Column::CarbonFootprint),
    }
}

/// Biosourced materials against the rest of the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct BiosourcedStats {
    pub total: usize,
    pub biosourced: usize,
    pub share_pct: f64,
    /// (column, biosourced mean, other mean)
    pub means: Vec<(Column, Option<f64>, Option<f64>)>,
    /// Mean conductivity per type among biosourced materials
    pub conductivity_by_type: BTreeMap<String, f64>,
}

pub fn biosourced_stats(views: &[MaterialView<'_>], columns: &ColumnSet) -> BiosourcedStats {
    let (bio, other): (Vec<MaterialView<'_>>, Vec<MaterialView<'_>>) =
        views.iter().copied().partition(|v| v.biosourced);

    let total = views.len();
    let share_pct = if total > 0 {
        bio.len() as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    let means = [Column::Density, Column::Conductivity, Column::CarbonFootprint]
        .into_iter()
        .map(|c| (c, mean(&bio, columns, c), mean(&other, columns, c)))
        .collect();

    BiosourcedStats {
        total,
        biosourced: bio.len(),
        share_pct,
        means,
        conductivity_by_type: group_mean(&bio, columns, GroupBy::Column(Column::Type), Column::Conductivity),
    }
}
