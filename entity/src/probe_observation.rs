//! One row per device sighting reported in a controller batch. Rows are
//! append-only: written once by ingestion, never updated.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize)]
#[sea_orm(table_name = "probe_observation")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub network_id: String,
    pub node_mac: String,
    pub device_mac: String,
    pub count: i32,
    pub min_signal: i32,
    pub max_signal: i32,
    pub avg_signal: i32,
    pub first_seen: i64,
    pub last_seen: i64,
    pub associated: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
