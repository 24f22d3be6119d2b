//! Filter and sort pipeline over enriched material views
//!
//! Every criterion is optional and the criteria are AND-combined. A criterion
//! naming a column the dataset does not have is skipped rather than failing.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use clap::ValueEnum;

use crate::catalog::Catalog;
use crate::models::{Column, ColumnSet, MaterialView};

/// Display orderings offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    NameAsc,
    DensityAsc,
    DensityDesc,
    ConductivityAsc,
    ConductivityDesc,
    EcoScoreDesc,
}

impl SortOrder {
    pub fn column(self) -> Column {
        match self {
            SortOrder::NameAsc => Column::Name,
            SortOrder::DensityAsc | SortOrder::DensityDesc => Column::Density,
            SortOrder::ConductivityAsc | SortOrder::ConductivityDesc => Column::Conductivity,
            SortOrder::EcoScoreDesc => Column::EcoScore,
        }
    }

    pub fn ascending(self) -> bool {
        matches!(
            self,
            SortOrder::NameAsc | SortOrder::DensityAsc | SortOrder::ConductivityAsc
        )
    }
}

/// Inclusive numeric bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Absent values always pass a range filter
    pub fn admits(&self, value: Option<f64>) -> bool {
        value.is_none_or(|v| v >= self.min && v <= self.max)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub search: String,
    pub types: Vec<String>,
    pub subtypes: Vec<String>,
    pub density: Option<Range>,
    pub conductivity: Option<Range>,
    pub countries: Vec<String>,
    pub manufacturers: Vec<String>,
    pub sort: Option<SortOrder>,
}

/// Filter and sort the whole catalog
pub fn apply<'a>(catalog: &'a Catalog, criteria: &FilterCriteria) -> Vec<MaterialView<'a>> {
    let mut views = filter_views(catalog.views(), catalog.columns(), criteria);
    if let Some(order) = criteria.sort {
        sort_views(&mut views, catalog.columns(), order);
    }
    views
}

/// Keep the views matching every applicable criterion, in input order
pub fn filter_views<'a, I>(views: I, columns: &ColumnSet, criteria: &FilterCriteria) -> Vec<MaterialView<'a>>
where
    I: IntoIterator<Item = MaterialView<'a>>,
{
    views
        .into_iter()
        .filter(|view| matches(view, columns, criteria))
        .collect()
}

fn matches(view: &MaterialView<'_>, columns: &ColumnSet, criteria: &FilterCriteria) -> bool {
    matches_search(view, columns, &criteria.search)
        && member_of(view, columns, Column::Type, &criteria.types)
        && member_of(view, columns, Column::Subtype, &criteria.subtypes)
        && in_range(view, columns, Column::Density, criteria.density)
        && in_range(view, columns, Column::Conductivity, criteria.conductivity)
        && member_of(view, columns, Column::Country, &criteria.countries)
        && member_of(view, columns, Column::Manufacturer, &criteria.manufacturers)
}

fn matches_search(view: &MaterialView<'_>, columns: &ColumnSet, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let searchable: Vec<Column> = [Column::Name, Column::Description]
        .into_iter()
        .filter(|c| columns.contains(*c))
        .collect();
    if searchable.is_empty() {
        return true;
    }

    let needle = search.to_lowercase();
    searchable.into_iter().any(|column| {
        view.text(column)
            .is_some_and(|text| text.to_lowercase().contains(&needle))
    })
}

fn member_of(view: &MaterialView<'_>, columns: &ColumnSet, column: Column, allowed: &[String]) -> bool {
    if allowed.is_empty() || !columns.contains(column) {
        return true;
    }
    view.text(column)
        .is_some_and(|value| allowed.iter().any(|a| a == value))
}

fn in_range(view: &MaterialView<'_>, columns: &ColumnSet, column: Column, range: Option<Range>) -> bool {
    match range {
        Some(range) if columns.contains(column) => range.admits(view.number(column)),
        _ => true,
    }
}

/// Stable sort; absent keys go after every present key
pub fn sort_views(views: &mut [MaterialView<'_>], columns: &ColumnSet, order: SortOrder) {
    let column = order.column();
    if !columns.contains(column) {
        return;
    }

    if column.is_numeric() {
        views.sort_by(|a, b| {
            nulls_last(a.number(column), b.number(column), |x, y| {
                let ord = x.partial_cmp(y).unwrap_or(Ordering::Equal);
                if order.ascending() { ord } else { ord.reverse() }
            })
        });
    } else {
        views.sort_by(|a, b| nulls_last(a.text(column), b.text(column), |x, y| x.cmp(y)));
    }
}

fn nulls_last<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(&x, &y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sorted distinct values of a text column, for multi-select options
pub fn options<'a, I>(views: I, columns: &ColumnSet, column: Column) -> Vec<String>
where
    I: IntoIterator<Item = MaterialView<'a>>,
{
    if !columns.contains(column) {
        return Vec::new();
    }
    views
        .into_iter()
        .filter_map(|v| v.text(column))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Subtypes observed among records of the selected types (all records when none)
pub fn subtype_options(catalog: &Catalog, selected_types: &[String]) -> Vec<String> {
    let narrowed = FilterCriteria {
        types: selected_types.to_vec(),
        ..FilterCriteria::default()
    };
    let views = filter_views(catalog.views(), catalog.columns(), &narrowed);
    options(views, catalog.columns(), Column::Subtype)
}

/// Observed bounds of a numeric column, widened by 10% when degenerate
pub fn value_range(catalog: &Catalog, column: Column, fallback: (f64, f64)) -> Range {
    if !catalog.has_column(column) {
        return Range::new(fallback.0, fallback.1);
    }
    let mut bounds: Option<(f64, f64)> = None;
    for view in catalog.views() {
        if let Some(v) = view.number(column) {
            bounds = Some(match bounds {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            });
        }
    }
    match bounds {
        Some((lo, hi)) if lo == hi => Range::new(lo * 0.9, hi * 1.1),
        Some((lo, hi)) => Range::new(lo, hi),
        None => Range::new(fallback.0, fallback.1),
    }
}
