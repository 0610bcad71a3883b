use std::fmt;

use serde::{Deserialize, Serialize};

/// A geographic unit with its latest readings. Supplied by the data-fusion
/// layer and never mutated here.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Zone {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub co2_ppm: f64,
    pub aqi: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl Zone {
    pub fn new(id: impl Into<String>, co2_ppm: f64, aqi: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            co2_ppm,
            aqi,
            lat: None,
            lng: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ZoneContext {
    pub zone_id: String,
    pub industrial_index: f64,
    pub green_cover_index: f64,
    pub traffic_density: f64,
    pub co2_current: f64,
    pub aqi_current: f64,
    pub health_risk_score: f64,
    pub sustainability_score: f64,
    pub budget_remaining: f64,
}

impl ZoneContext {
    pub fn with_budget(&self, budget_remaining: f64) -> Self {
        Self {
            budget_remaining,
            ..self.clone()
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    TreePlanting,
    SolarPanels,
    EvTransition,
    TrafficControl,
    FactoryRegulation,
    GreenCover,
}

impl ActionKind {
    /// Reduction in ppm-equivalent per unit, before contextual multipliers.
    pub fn base_rate(self) -> f64 {
        match self {
            ActionKind::TreePlanting => 0.022,
            ActionKind::SolarPanels => 0.15,
            ActionKind::EvTransition => 0.008,
            ActionKind::TrafficControl => 0.003,
            ActionKind::FactoryRegulation => 1.8,
            ActionKind::GreenCover => 0.5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::TreePlanting => "tree_planting",
            ActionKind::SolarPanels => "solar_panels",
            ActionKind::EvTransition => "ev_transition",
            ActionKind::TrafficControl => "traffic_control",
            ActionKind::FactoryRegulation => "factory_regulation",
            ActionKind::GreenCover => "green_cover",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub quantity: f64,
    pub cost_per_unit: f64,
}

impl Action {
    pub const fn new(kind: ActionKind, quantity: f64, cost_per_unit: f64) -> Self {
        Self {
            kind,
            quantity,
            cost_per_unit,
        }
    }

    pub fn cost(&self) -> f64 {
        self.quantity * self.cost_per_unit
    }
}

/// The zone weakness a template is designed to address; drives policy alignment.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Afforestation,
    Solar,
    TrafficIndustry,
    Balanced,
    Maximal,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StrategyTemplate {
    pub name: String,
    pub description: String,
    pub archetype: Archetype,
    #[serde(default)]
    pub light: bool,
    pub actions: Vec<Action>,
}

impl StrategyTemplate {
    pub fn total_cost(&self) -> f64 {
        self.actions.iter().map(Action::cost).sum()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RewardBreakdown {
    pub norm_co2: f64,
    pub norm_health: f64,
    pub norm_sustainability: f64,
    pub policy_alignment: f64,
    pub norm_cost: f64,
    pub budget_violation: f64,
    pub overspend_penalty: f64,
    pub diversity_penalty: f64,
    pub urgency_multiplier: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StrategyEvaluation {
    pub strategy_name: String,
    pub description: String,
    pub archetype: Archetype,
    pub actions: Vec<Action>,
    pub new_co2_ppm: f64,
    pub reduction_ppm: f64,
    pub reduction_pct: f64,
    pub estimated_cost: f64,
    pub efficiency_score: f64,
    pub reward: f64,
    pub breakdown: RewardBreakdown,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OptimizationResult {
    pub zone_id: String,
    pub zone_name: String,
    pub current_co2_ppm: f64,
    pub current_aqi: f64,
    pub best_strategy: StrategyEvaluation,
    pub all_strategies: Vec<StrategyEvaluation>,
    pub context: ZoneContext,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NeedLevel {
    NotRequired,
    Low,
    Moderate,
    High,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AllocationStatus {
    NotRequired,
    Allocated,
    Insufficient {
        cheapest_strategy: String,
        required: f64,
        cap: f64,
    },
}

impl AllocationStatus {
    pub fn note(&self) -> String {
        match self {
            AllocationStatus::NotRequired => "Not Required: air quality is satisfactory".into(),
            AllocationStatus::Allocated => "Allocated".into(),
            AllocationStatus::Insufficient {
                cheapest_strategy,
                required,
                cap,
            } => format!(
                "Requires {:.0} for {} but only {:.0} is available (shortfall {:.0})",
                required,
                cheapest_strategy,
                cap,
                (required - cap).max(0.0)
            ),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AllocationResult {
    pub zone_id: String,
    pub zone_name: String,
    pub need_score: f64,
    pub need_level: NeedLevel,
    pub nominal_share: f64,
    pub allocated_cap: f64,
    pub spent: f64,
    /// Drop from the current reading to the post-strategy reading; bounded by the floor.
    pub achieved_reduction_ppm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyEvaluation>,
    pub status: AllocationStatus,
    pub note: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AllocationSummary {
    pub budget: f64,
    pub total_spent: f64,
    pub unallocated: f64,
    pub zones_funded: usize,
    pub zones_not_required: usize,
    pub zones_underfunded: usize,
    pub total_reduction_ppm: f64,
    pub per_zone: Vec<AllocationResult>,
}
