//! Eco-score: a 0-100 composite normalised across the record population

use crate::models::{Column, MaterialRecord};

/// Which way a criterion improves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Criterion {
    pub column: Column,
    pub direction: Direction,
}

pub const ECO_CRITERIA: [Criterion; 4] = [
    Criterion {
        column: Column::Cost,
        direction: Direction::LowerIsBetter,
    },
    Criterion {
        column: Column::CarbonFootprint,
        direction: Direction::LowerIsBetter,
    },
    Criterion {
        column: Column::Conductivity,
        direction: Direction::LowerIsBetter,
    },
    Criterion {
        column: Column::RecycledContent,
        direction: Direction::HigherIsBetter,
    },
];

/// Observed bounds of one criterion over the whole population
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    min: f64,
    max: f64,
}

impl Bounds {
    fn observe(records: &[MaterialRecord], column: Column) -> Option<Bounds> {
        records
            .iter()
            .filter_map(|r| r.number(column))
            .fold(None, |acc: Option<Bounds>, v| {
                Some(match acc {
                    None => Bounds { min: v, max: v },
                    Some(b) => Bounds {
                        min: b.min.min(v),
                        max: b.max.max(v),
                    },
                })
            })
    }

    fn normalise(&self, value: f64, direction: Direction) -> f64 {
        let span = self.max - self.min;
        match direction {
            Direction::LowerIsBetter => (self.max - value) / span,
            Direction::HigherIsBetter => (value - self.min) / span,
        }
    }
}

/// Compute the eco-score of every record, in input order.
///
/// A criterion takes part only if it has at least one value and its observed
/// min differs from its max. A record's score is the mean of the sub-scores
/// it has, scaled to 0-100 and rounded to one decimal.
pub fn compute_eco_scores(records: &[MaterialRecord]) -> Vec<Option<f64>> {
    compute_scores(records, &ECO_CRITERIA)
}

pub fn compute_scores(records: &[MaterialRecord], criteria: &[Criterion]) -> Vec<Option<f64>> {
    let qualified: Vec<(Criterion, Bounds)> = criteria
        .iter()
        .filter_map(|c| {
            Bounds::observe(records, c.column)
                .filter(|b| b.min != b.max)
                .map(|b| (*c, b))
        })
        .collect();

    if qualified.is_empty() {
        return vec![None; records.len()];
    }

    records
        .iter()
        .map(|record| {
            let mut sum = 0.0;
            let mut count = 0usize;
            for (criterion, bounds) in &qualified {
                if let Some(value) = record.number(criterion.column) {
                    sum += bounds.normalise(value, criterion.direction);
                    count += 1;
                }
            }
            (count > 0).then(|| round1(sum / count as f64 * 100.0))
        })
        .collect()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
