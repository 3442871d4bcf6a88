//! Parking session entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parking_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub spot_id: String,
    pub user_id: String,

    #[sea_orm(nullable)]
    pub vehicle_tag: Option<String>,

    #[sea_orm(nullable)]
    pub reservation_id: Option<String>,

    pub check_in_time: DateTimeUtc,

    #[sea_orm(nullable)]
    pub check_out_time: Option<DateTimeUtc>,

    #[sea_orm(nullable)]
    pub duration_minutes: Option<i64>,

    #[sea_orm(nullable)]
    pub amount_due_cents: Option<i64>,

    /// ACTIVE, COMPLETED
    pub status: String,

    /// user_id while ACTIVE, NULL afterwards (unique)
    #[sea_orm(nullable, unique)]
    pub active_user_key: Option<String>,

    /// spot_id while ACTIVE, NULL afterwards (unique)
    #[sea_orm(nullable, unique)]
    pub active_spot_key: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::spot::Entity",
        from = "Column::SpotId",
        to = "super::spot::Column::Id"
    )]
    Spot,
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::spot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Spot.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
