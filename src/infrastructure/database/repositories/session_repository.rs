//! SeaORM implementation of SessionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    UpdateResult,
};
use tracing::debug;
use uuid::Uuid;

use super::{corrupt, db_err, from_cents, is_unique_violation, parse_id, parse_optional_id, to_cents};
use crate::domain::session::{ParkingSession, SessionRepository, SessionStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::parking_session;

pub struct SeaOrmSessionRepository {
    db: DatabaseConnection,
}

impl SeaOrmSessionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: parking_session::Model) -> DomainResult<ParkingSession> {
    Ok(ParkingSession {
        id: parse_id("ParkingSession", &m.id)?,
        spot_id: parse_id("Spot", &m.spot_id)?,
        user_id: parse_id("User", &m.user_id)?,
        reservation_id: parse_optional_id("Reservation", m.reservation_id.as_deref())?,
        status: SessionStatus::from_str(&m.status)
            .ok_or_else(|| corrupt("ParkingSession", "status", &m.status))?,
        vehicle_tag: m.vehicle_tag,
        check_in_time: m.check_in_time,
        check_out_time: m.check_out_time,
        duration_minutes: m.duration_minutes,
        amount_due: m.amount_due_cents.map(from_cents),
    })
}

#[async_trait]
impl SessionRepository for SeaOrmSessionRepository {
    async fn insert_active(&self, s: ParkingSession) -> DomainResult<()> {
        debug!(session_id = %s.id, spot_id = %s.spot_id, user_id = %s.user_id, "Inserting active session");

        let model = parking_session::ActiveModel {
            id: Set(s.id.to_string()),
            spot_id: Set(s.spot_id.to_string()),
            user_id: Set(s.user_id.to_string()),
            vehicle_tag: Set(s.vehicle_tag),
            reservation_id: Set(s.reservation_id.map(|r| r.to_string())),
            check_in_time: Set(s.check_in_time),
            check_out_time: Set(None),
            duration_minutes: Set(None),
            amount_due_cents: Set(None),
            status: Set(SessionStatus::Active.as_str().to_string()),
            active_user_key: Set(Some(s.user_id.to_string())),
            active_spot_key: Set(Some(s.spot_id.to_string())),
        };
        model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::Conflict(
                    "User or spot already has an active parking session".to_string(),
                )
            } else {
                db_err(e)
            }
        })?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<ParkingSession>> {
        parking_session::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_active_for_user(&self, user_id: Uuid) -> DomainResult<Option<ParkingSession>> {
        parking_session::Entity::find()
            .filter(parking_session::Column::ActiveUserKey.eq(user_id.to_string()))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_active_for_spot(&self, spot_id: Uuid) -> DomainResult<Option<ParkingSession>> {
        parking_session::Entity::find()
            .filter(parking_session::Column::ActiveSpotKey.eq(spot_id.to_string()))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn complete(
        &self,
        id: Uuid,
        check_out_time: DateTime<Utc>,
        amount_due: Decimal,
    ) -> DomainResult<Option<ParkingSession>> {
        let Some(mut session) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        if !session.complete(check_out_time, amount_due) {
            return Ok(None);
        }

        let result: UpdateResult = parking_session::Entity::update_many()
            .col_expr(
                parking_session::Column::Status,
                Expr::value(SessionStatus::Completed.as_str()),
            )
            .col_expr(parking_session::Column::CheckOutTime, Expr::value(check_out_time))
            .col_expr(
                parking_session::Column::DurationMinutes,
                Expr::value(session.duration_minutes),
            )
            .col_expr(
                parking_session::Column::AmountDueCents,
                Expr::value(to_cents(amount_due)?),
            )
            .col_expr(parking_session::Column::ActiveUserKey, Expr::value(Option::<String>::None))
            .col_expr(parking_session::Column::ActiveSpotKey, Expr::value(Option::<String>::None))
            .filter(parking_session::Column::Id.eq(id.to_string()))
            .filter(parking_session::Column::Status.eq(SessionStatus::Active.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            debug!(session_id = %id, "Session already completed by a concurrent check-out");
            return Ok(None);
        }
        Ok(Some(session))
    }

    async fn find_for_user(&self, user_id: Uuid) -> DomainResult<Vec<ParkingSession>> {
        parking_session::Entity::find()
            .filter(parking_session::Column::UserId.eq(user_id.to_string()))
            .order_by_desc(parking_session::Column::CheckInTime)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    async fn find_all(&self) -> DomainResult<Vec<ParkingSession>> {
        parking_session::Entity::find()
            .order_by_asc(parking_session::Column::CheckInTime)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::spot::{Spot, SpotClass, SpotRepository};
    use crate::infrastructure::database::repositories::{test_db, SeaOrmSpotRepository};
    use chrono::Duration;

    async fn setup() -> (SeaOrmSessionRepository, Spot, Spot) {
        let db = test_db::connect().await;
        let spots = SeaOrmSpotRepository::new(db.clone());
        let a = Spot::new("A1", SpotClass::Standard);
        let b = Spot::new("A2", SpotClass::Standard);
        spots.save(a.clone()).await.unwrap();
        spots.save(b.clone()).await.unwrap();
        (SeaOrmSessionRepository::new(db), a, b)
    }

    #[tokio::test]
    async fn unique_keys_enforce_one_active_session() {
        let (repo, a, b) = setup().await;
        let user = Uuid::new_v4();
        let first = ParkingSession::start(a.id, user, Some("XY-1".into()), Utc::now());
        repo.insert_active(first.clone()).await.unwrap();

        // same user, other spot
        let err = repo
            .insert_active(ParkingSession::start(b.id, user, None, Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // other user, same spot
        let err = repo
            .insert_active(ParkingSession::start(a.id, Uuid::new_v4(), None, Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let active = repo.find_active_for_user(user).await.unwrap().unwrap();
        assert_eq!(active.id, first.id);
        assert_eq!(active.vehicle_tag.as_deref(), Some("XY-1"));
        assert_eq!(repo.find_active_for_spot(a.id).await.unwrap().unwrap().id, first.id);
    }

    #[tokio::test]
    async fn complete_clears_keys_and_only_succeeds_once() {
        let (repo, a, _) = setup().await;
        let user = Uuid::new_v4();
        let start = Utc::now();
        let session = ParkingSession::start(a.id, user, None, start);
        repo.insert_active(session.clone()).await.unwrap();

        let done = repo
            .complete(session.id, start + Duration::minutes(90), Decimal::new(1500, 2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(done.status, SessionStatus::Completed);
        assert_eq!(done.duration_minutes, Some(90));

        let stored = repo.find_by_id(session.id).await.unwrap().unwrap();
        assert_eq!(stored.amount_due, Some(Decimal::new(1500, 2)));
        assert!(repo.find_active_for_user(user).await.unwrap().is_none());

        assert!(repo
            .complete(session.id, Utc::now(), Decimal::ONE)
            .await
            .unwrap()
            .is_none());

        // keys released: the same user can park again
        repo.insert_active(ParkingSession::start(a.id, user, None, Utc::now()))
            .await
            .unwrap();
        assert_eq!(repo.find_for_user(user).await.unwrap().len(), 2);
    }
}
