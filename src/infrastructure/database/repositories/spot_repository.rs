//! SeaORM implementation of SpotRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    UpdateResult,
};
use tracing::debug;
use uuid::Uuid;

use super::{corrupt, db_err, is_unique_violation, parse_id};
use crate::domain::spot::{Spot, SpotClass, SpotRepository, SpotStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::spot;

pub struct SeaOrmSpotRepository {
    db: DatabaseConnection,
}

impl SeaOrmSpotRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: spot::Model) -> DomainResult<Spot> {
    Ok(Spot {
        id: parse_id("Spot", &m.id)?,
        status: SpotStatus::from_str(&m.status).ok_or_else(|| corrupt("Spot", "status", &m.status))?,
        class: SpotClass::from_str_lossy(&m.class),
        label: m.label,
        version: m.version,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

#[async_trait]
impl SpotRepository for SeaOrmSpotRepository {
    async fn save(&self, s: Spot) -> DomainResult<()> {
        debug!(spot_id = %s.id, label = s.label.as_str(), "Saving spot");

        let model = spot::ActiveModel {
            id: Set(s.id.to_string()),
            label: Set(s.label),
            class: Set(s.class.as_str().to_string()),
            status: Set(s.status.as_str().to_string()),
            version: Set(s.version),
            created_at: Set(s.created_at),
            updated_at: Set(s.updated_at),
        };
        model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::Conflict(format!("Spot {} already exists", s.id))
            } else {
                db_err(e)
            }
        })?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Spot>> {
        spot::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_all(&self) -> DomainResult<Vec<Spot>> {
        spot::Entity::find()
            .order_by_asc(spot::Column::Label)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected_version: i64,
        expected_status: SpotStatus,
        new_status: SpotStatus,
    ) -> DomainResult<Option<Spot>> {
        let result: UpdateResult = spot::Entity::update_many()
            .col_expr(spot::Column::Status, Expr::value(new_status.as_str()))
            .col_expr(
                spot::Column::Version,
                Expr::col(spot::Column::Version).add(1),
            )
            .col_expr(spot::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(spot::Column::Id.eq(id.to_string()))
            .filter(spot::Column::Status.eq(expected_status.as_str()))
            .filter(spot::Column::Version.eq(expected_version))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            debug!(spot_id = %id, expected_version, "Spot CAS matched no row");
            return Ok(None);
        }
        self.find_by_id(id).await
    }
}
