//! Reservation entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub spot_id: String,
    pub user_id: String,

    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,

    /// PENDING, ACTIVE, COMPLETED, CANCELLED
    pub status: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::spot::Entity",
        from = "Column::SpotId",
        to = "super::spot::Column::Id"
    )]
    Spot,
}

impl Related<super::spot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Spot.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
