use thiserror::Error;

use crate::dto::ActionKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid field: {0}")]
    InvalidField(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("strategy catalog is empty")]
    Empty,
    #[error("strategy catalog has no full-scale templates")]
    NoStandardTemplates,
    #[error("duplicate strategy name: {0}")]
    DuplicateName(String),
    #[error("negative quantity for {kind} in strategy {strategy}")]
    NegativeQuantity { strategy: String, kind: ActionKind },
    #[error("negative unit cost for {kind} in strategy {strategy}")]
    NegativeCost { strategy: String, kind: ActionKind },
}

#[derive(Debug, Error, PartialEq)]
pub enum OptimizerError {
    #[error("zone list is empty")]
    EmptyZones,
    #[error("budget must be a non-negative finite amount, got {0}")]
    NegativeBudget(f64),
    #[error("invalid zone {zone_id}: {reason}")]
    InvalidZone { zone_id: String, reason: String },
    #[error("zone not found: {0}")]
    ZoneNotFound(String),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}
