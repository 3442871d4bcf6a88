//! Payment entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub session_id: String,

    /// Minor units (cents)
    pub amount_cents: i64,
    pub currency: String,

    /// CASH, CREDIT_CARD, DEBIT_CARD, UPI
    pub method: String,

    /// PENDING, SUCCESS, FAILED
    pub status: String,

    #[sea_orm(nullable)]
    pub transaction_reference: Option<String>,

    #[sea_orm(nullable)]
    pub failure_reason: Option<String>,

    /// session_id while PENDING or SUCCESS, NULL once FAILED (unique)
    #[sea_orm(nullable, unique)]
    pub settlement_key: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::parking_session::Entity",
        from = "Column::SessionId",
        to = "super::parking_session::Column::Id"
    )]
    ParkingSession,
}

impl Related<super::parking_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ParkingSession.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
