//! Wall assembly calculator: thermal resistance and weighted eco-score

use std::fmt;

use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};

pub const MAX_LAYERS: usize = 6;
pub const MAX_THICKNESS_CM: f64 = 200.0;

/// One layer of a wall, outermost first
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub material: String,
    pub thickness_cm: f64,
}

impl Layer {
    pub fn new(material: &str, thickness_cm: f64) -> Self {
        Self {
            material: material.to_string(),
            thickness_cm,
        }
    }

    /// Parse the `name:thickness` form used on the command line
    pub fn parse(arg: &str) -> Result<Self> {
        let (name, thickness) = arg
            .rsplit_once(':')
            .ok_or_else(|| CatalogError::Assembly(format!("expected NAME:THICKNESS, got '{}'", arg)))?;
        let thickness_cm = thickness
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .map_err(|_| CatalogError::Assembly(format!("invalid thickness '{}'", thickness)))?;
        Ok(Self::new(name.trim(), thickness_cm))
    }
}

/// Why a layer contributes no resistance term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolved {
    UnknownMaterial,
    MissingConductivity,
    NonPositiveConductivity,
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unresolved::UnknownMaterial => write!(f, "unknown material"),
            Unresolved::MissingConductivity => write!(f, "no conductivity"),
            Unresolved::NonPositiveConductivity => write!(f, "conductivity <= 0"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerResult {
    pub material: String,
    pub thickness_cm: f64,
    pub conductivity: Option<f64>,
    pub eco_score: Option<f64>,
    /// m²·K/W, or why it could not be computed
    pub resistance: std::result::Result<f64, Unresolved>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyResult {
    pub layers: Vec<LayerResult>,
    /// Sum of the resolved layer resistances; `None` when no layer resolved
    pub r_total: Option<f64>,
    /// Thickness-weighted mean eco-score over layers that have one
    pub eco_weighted: Option<f64>,
}

impl AssemblyResult {
    pub fn unresolved(&self) -> impl Iterator<Item = &LayerResult> {
        self.layers.iter().filter(|l| l.resistance.is_err())
    }

    /// Thermal transmittance 1/R in W/m²·K
    pub fn u_value(&self) -> Option<f64> {
        self.r_total.filter(|r| *r > 0.0).map(|r| 1.0 / r)
    }
}

fn validate(layers: &[Layer]) -> Result<()> {
    if layers.is_empty() || layers.len() > MAX_LAYERS {
        return Err(CatalogError::Assembly(format!(
            "an assembly needs 1 to {} layers, got {}",
            MAX_LAYERS,
            layers.len()
        )));
    }
    for layer in layers {
        if !layer.thickness_cm.is_finite() || !(0.0..=MAX_THICKNESS_CM).contains(&layer.thickness_cm) {
            return Err(CatalogError::Assembly(format!(
                "thickness of '{}' must be within 0-{} cm, got {}",
                layer.material, MAX_THICKNESS_CM, layer.thickness_cm
            )));
        }
    }
    Ok(())
}

/// Resolve each layer against the catalog and combine the results
pub fn compute_assembly(catalog: &Catalog, layers: &[Layer]) -> Result<AssemblyResult> {
    validate(layers)?;

    let results: Vec<LayerResult> = layers
        .iter()
        .map(|layer| {
            let view = catalog.find(&layer.material);
            let conductivity = view.and_then(|v| v.record.thermal_conductivity_w_mk);
            let eco_score = view.and_then(|v| v.eco_score);
            let resistance = match (view, conductivity) {
                (None, _) => Err(Unresolved::UnknownMaterial),
                (Some(_), None) => Err(Unresolved::MissingConductivity),
                (Some(_), Some(lambda)) if lambda <= 0.0 => Err(Unresolved::NonPositiveConductivity),
                (Some(_), Some(lambda)) => Ok((layer.thickness_cm / 100.0) / lambda),
            };
            LayerResult {
                material: layer.material.clone(),
                thickness_cm: layer.thickness_cm,
                conductivity,
                eco_score,
                resistance,
            }
        })
        .collect();

    let resolved: Vec<f64> = results.iter().filter_map(|l| l.resistance.ok()).collect();
    let r_total = (!resolved.is_empty()).then(|| resolved.iter().sum::<f64>());

    let (weighted, weight) = results
        .iter()
        .filter_map(|l| l.eco_score.map(|e| (e, l.thickness_cm)))
        .fold((0.0, 0.0), |(sum, w), (e, t)| (sum + e * t, w + t));
    let eco_weighted = (weight > 0.0).then(|| weighted / weight);

    Ok(AssemblyResult {
        layers: results,
        r_total,
        eco_weighted,
    })
}

impl fmt::Display for AssemblyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Wall Assembly ===")?;
        for (idx, layer) in self.layers.iter().enumerate() {
            match layer.resistance {
                Ok(r) => writeln!(
                    f,
                    "  {}. {} @ {:.1} cm  R = {:.3} m²·K/W",
                    idx + 1,
                    layer.material,
                    layer.thickness_cm,
                    r
                )?,
                Err(reason) => writeln!(
                    f,
                    "  {}. {} @ {:.1} cm  unresolved ({})",
                    idx + 1,
                    layer.material,
                    layer.thickness_cm,
                    reason
                )?,
            }
        }
        writeln!(f)?;
        match self.r_total {
            Some(r) => writeln!(f, "R total:  {:.3} m²·K/W", r)?,
            None => writeln!(f, "R total:  unavailable")?,
        }
        match self.u_value() {
            Some(u) => writeln!(f, "U value:  {:.3} W/m²·K", u)?,
            None => writeln!(f, "U value:  unavailable")?,
        }
        match self.eco_weighted {
            Some(e) => writeln!(f, "Eco-score (thickness weighted): {:.1}", e)?,
            None => writeln!(f, "Eco-score (thickness weighted): unavailable")?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Enrichment;
    use crate::models::MaterialRecord;
    use crate::store::RecordStore;

    fn catalog() -> Catalog {
        let with_lambda = |name: &str, lambda: Option<f64>, cost: Option<f64>| MaterialRecord {
            thermal_conductivity_w_mk: lambda,
            cost_eur_m2: cost,
            ..MaterialRecord::named(name)
        };
        Catalog::enrich(
            RecordStore::from_records(vec![
                with_lambda("Laine", Some(0.04), Some(10.0)),
                with_lambda("Polyuréthane", Some(0.02), Some(30.0)),
                with_lambda("Enduit", None, None),
                with_lambda("Vide", Some(0.0), None),
            ]),
            Enrichment { eco_score: false },
        )
    }

    #[test]
    fn resistances_sum_over_layers() {
        let result = compute_assembly(
            &catalog(),
            &[Layer::new("Laine", 10.0), Layer::new("Polyuréthane", 5.0)],
        )
        .unwrap();
        let r = result.r_total.unwrap();
        assert!((r - 5.0).abs() < 1e-9);
        assert!((result.u_value().unwrap() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn unresolved_layers_are_reported_not_fatal() {
        let result = compute_assembly(
            &catalog(),
            &[
                Layer::new("Enduit", 2.0),
                Layer::new("Laine", 10.0),
                Layer::new("Vide", 3.0),
                Layer::new("Inconnu", 1.0),
            ],
        )
        .unwrap();
        assert!((result.r_total.unwrap() - 2.5).abs() < 1e-9);
        let reasons: Vec<_> = result.unresolved().map(|l| l.resistance.unwrap_err()).collect();
        assert_eq!(
            reasons,
            vec![
                Unresolved::MissingConductivity,
                Unresolved::NonPositiveConductivity,
                Unresolved::UnknownMaterial
            ]
        );
    }

    #[test]
    fn nothing_resolved_means_unavailable() {
        let result = compute_assembly(&catalog(), &[Layer::new("Enduit", 2.0)]).unwrap();
        assert_eq!(result.r_total, None);
        assert_eq!(result.eco_weighted, None);
    }

    #[test]
    fn eco_score_is_thickness_weighted() {
        let catalog = Catalog::enrich(catalog().store().clone(), Enrichment::default());
        // Laine: cost 1.0, lambda 0.0 -> 50; Polyuréthane: cost 0.0, lambda 0.5 -> 25
        let result = compute_assembly(
            &catalog,
            &[Layer::new("Laine", 15.0), Layer::new("Polyuréthane", 5.0), Layer::new("Enduit", 50.0)],
        )
        .unwrap();
        assert!((result.eco_weighted.unwrap() - 43.75).abs() < 1e-9);
    }

    #[test]
    fn invalid_input_is_rejected() {
        let catalog = catalog();
        assert!(compute_assembly(&catalog, &[]).is_err());
        let seven: Vec<Layer> = (0..7).map(|_| Layer::new("Laine", 1.0)).collect();
        assert!(compute_assembly(&catalog, &seven).is_err());
        assert!(compute_assembly(&catalog, &[Layer::new("Laine", 250.0)]).is_err());
        assert!(compute_assembly(&catalog, &[Layer::new("Laine", -1.0)]).is_err());
        assert!(compute_assembly(&catalog, &[Layer::new("Laine", f64::NAN)]).is_err());
    }

    #[test]
    fn parses_command_line_layers() {
        assert_eq!(Layer::parse("Laine de bois:12,5").unwrap(), Layer::new("Laine de bois", 12.5));
        assert!(Layer::parse("Laine").is_err());
        assert!(Layer::parse("Laine:abc").is_err());
    }
}
