use std::collections::HashSet;

use crate::dto::{Action, ActionKind, Archetype, StrategyTemplate};
use crate::errors::CatalogError;

const TREE_UNIT_COST: f64 = 500.0;
const SOLAR_UNIT_COST: f64 = 25_000.0;
const EV_UNIT_COST: f64 = 200_000.0;
const TRAFFIC_UNIT_COST: f64 = 100.0;
const FACTORY_UNIT_COST: f64 = 10_000_000.0;
const GREEN_COVER_UNIT_COST: f64 = 5_000_000.0;

/// Immutable set of intervention templates. Built once and shared by reference;
/// nothing mutates it at request time.
#[derive(Clone, Debug, PartialEq)]
pub struct StrategyCatalog {
    templates: Vec<StrategyTemplate>,
}

impl Default for StrategyCatalog {
    fn default() -> Self {
        Self {
            templates: builtin_templates(),
        }
    }
}

impl StrategyCatalog {
    pub fn new(templates: Vec<StrategyTemplate>) -> Result<Self, CatalogError> {
        if templates.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for template in &templates {
            if !seen.insert(template.name.as_str()) {
                return Err(CatalogError::DuplicateName(template.name.clone()));
            }
            for action in &template.actions {
                if action.quantity < 0.0 || action.quantity.is_nan() {
                    return Err(CatalogError::NegativeQuantity {
                        strategy: template.name.clone(),
                        kind: action.kind,
                    });
                }
                if action.cost_per_unit < 0.0 || action.cost_per_unit.is_nan() {
                    return Err(CatalogError::NegativeCost {
                        strategy: template.name.clone(),
                        kind: action.kind,
                    });
                }
            }
        }
        if templates.iter().all(|template| template.light) {
            return Err(CatalogError::NoStandardTemplates);
        }
        Ok(Self { templates })
    }

    /// Every template in declaration order, light variants included.
    pub fn all(&self) -> &[StrategyTemplate] {
        &self.templates
    }

    /// Full-scale templates only; used for unconstrained ranking.
    pub fn standard(&self) -> impl Iterator<Item = &StrategyTemplate> {
        self.templates.iter().filter(|template| !template.light)
    }

    pub fn get(&self, name: &str) -> Option<&StrategyTemplate> {
        self.templates.iter().find(|template| template.name == name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn template(
    name: &str,
    description: &str,
    archetype: Archetype,
    light: bool,
    actions: Vec<Action>,
) -> StrategyTemplate {
    StrategyTemplate {
        name: name.into(),
        description: description.into(),
        archetype,
        light,
        actions,
    }
}

fn builtin_templates() -> Vec<StrategyTemplate> {
    use ActionKind::*;

    vec![
        template(
            "Green Revolution",
            "Massive tree planting + green cover expansion",
            Archetype::Afforestation,
            false,
            vec![
                Action::new(TreePlanting, 10_000.0, TREE_UNIT_COST),
                Action::new(GreenCover, 15.0, GREEN_COVER_UNIT_COST),
            ],
        ),
        template(
            "Solar Transition",
            "Large-scale solar panel deployment + EV adoption",
            Archetype::Solar,
            false,
            vec![
                Action::new(SolarPanels, 2_000.0, SOLAR_UNIT_COST),
                Action::new(EvTransition, 5_000.0, EV_UNIT_COST),
            ],
        ),
        template(
            "Traffic & Industry Reform",
            "Traffic optimization + factory emission controls",
            Archetype::TrafficIndustry,
            false,
            vec![
                Action::new(TrafficControl, 15_000.0, TRAFFIC_UNIT_COST),
                Action::new(FactoryRegulation, 10.0, FACTORY_UNIT_COST),
            ],
        ),
        template(
            "Balanced Sustainability",
            "Balanced approach across all sectors",
            Archetype::Balanced,
            false,
            vec![
                Action::new(TreePlanting, 5_000.0, TREE_UNIT_COST),
                Action::new(SolarPanels, 1_000.0, SOLAR_UNIT_COST),
                Action::new(EvTransition, 2_000.0, EV_UNIT_COST),
                Action::new(TrafficControl, 8_000.0, TRAFFIC_UNIT_COST),
                Action::new(GreenCover, 8.0, GREEN_COVER_UNIT_COST),
            ],
        ),
        template(
            "Maximum Impact",
            "Aggressive all-sector transformation for fastest results",
            Archetype::Maximal,
            false,
            vec![
                Action::new(TreePlanting, 15_000.0, TREE_UNIT_COST),
                Action::new(SolarPanels, 3_000.0, SOLAR_UNIT_COST),
                Action::new(EvTransition, 8_000.0, EV_UNIT_COST),
                Action::new(FactoryRegulation, 15.0, FACTORY_UNIT_COST),
                Action::new(GreenCover, 20.0, GREEN_COVER_UNIT_COST),
            ],
        ),
        template(
            "Green Revolution Lite",
            "Targeted tree planting with a small green cover expansion",
            Archetype::Afforestation,
            true,
            vec![
                Action::new(TreePlanting, 2_000.0, TREE_UNIT_COST),
                Action::new(GreenCover, 3.0, GREEN_COVER_UNIT_COST),
            ],
        ),
        template(
            "Solar Transition Lite",
            "Rooftop solar pilot with limited EV adoption",
            Archetype::Solar,
            true,
            vec![
                Action::new(SolarPanels, 400.0, SOLAR_UNIT_COST),
                Action::new(EvTransition, 200.0, EV_UNIT_COST),
            ],
        ),
        template(
            "Traffic & Industry Reform Lite",
            "Signal optimization with emission controls on the worst factories",
            Archetype::TrafficIndustry,
            true,
            vec![
                Action::new(TrafficControl, 3_000.0, TRAFFIC_UNIT_COST),
                Action::new(FactoryRegulation, 2.0, FACTORY_UNIT_COST),
            ],
        ),
        template(
            "Balanced Sustainability Lite",
            "Small balanced package across all sectors",
            Archetype::Balanced,
            true,
            vec![
                Action::new(TreePlanting, 1_000.0, TREE_UNIT_COST),
                Action::new(SolarPanels, 200.0, SOLAR_UNIT_COST),
                Action::new(EvTransition, 100.0, EV_UNIT_COST),
                Action::new(TrafficControl, 2_000.0, TRAFFIC_UNIT_COST),
                Action::new(GreenCover, 2.0, GREEN_COVER_UNIT_COST),
            ],
        ),
        template(
            "Maximum Impact Lite",
            "Scaled-down all-sector transformation",
            Archetype::Maximal,
            true,
            vec![
                Action::new(TreePlanting, 3_000.0, TREE_UNIT_COST),
                Action::new(SolarPanels, 600.0, SOLAR_UNIT_COST),
                Action::new(EvTransition, 1_000.0, EV_UNIT_COST),
                Action::new(FactoryRegulation, 3.0, FACTORY_UNIT_COST),
                Action::new(GreenCover, 4.0, GREEN_COVER_UNIT_COST),
            ],
        ),
    ]
}
