//! Spot entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "spots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub label: String,

    /// STANDARD, VIP, HANDICAP, EV_CHARGING
    pub class: String,

    /// AVAILABLE, OCCUPIED, RESERVED, MAINTENANCE
    pub status: String,

    /// Optimistic concurrency counter
    pub version: i64,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::parking_session::Entity")]
    ParkingSessions,
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservations,
}

impl Related<super::parking_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ParkingSessions.def()
    }
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
