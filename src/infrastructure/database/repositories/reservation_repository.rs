//! SeaORM implementation of ReservationRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use super::{corrupt, db_err, parse_id};
use crate::domain::reservation::{Reservation, ReservationRepository, ReservationStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::reservation;

pub struct SeaOrmReservationRepository {
    db: DatabaseConnection,
}

impl SeaOrmReservationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: reservation::Model) -> DomainResult<Reservation> {
    Ok(Reservation {
        id: parse_id("Reservation", &m.id)?,
        spot_id: parse_id("Spot", &m.spot_id)?,
        user_id: parse_id("User", &m.user_id)?,
        status: ReservationStatus::from_str(&m.status)
            .ok_or_else(|| corrupt("Reservation", "status", &m.status))?,
        start_time: m.start_time,
        end_time: m.end_time,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn domain_to_active(r: &Reservation) -> reservation::ActiveModel {
    reservation::ActiveModel {
        id: Set(r.id.to_string()),
        spot_id: Set(r.spot_id.to_string()),
        user_id: Set(r.user_id.to_string()),
        start_time: Set(r.start_time),
        end_time: Set(r.end_time),
        status: Set(r.status.as_str().to_string()),
        created_at: Set(r.created_at),
        updated_at: Set(r.updated_at),
    }
}

async fn count_overlapping<C: ConnectionTrait>(
    conn: &C,
    spot_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    statuses: &[ReservationStatus],
) -> DomainResult<u64> {
    reservation::Entity::find()
        .filter(reservation::Column::SpotId.eq(spot_id.to_string()))
        .filter(reservation::Column::Status.is_in(statuses.iter().map(|s| s.as_str())))
        .filter(reservation::Column::StartTime.lt(end))
        .filter(reservation::Column::EndTime.gt(start))
        .count(conn)
        .await
        .map_err(db_err)
}

// ── ReservationRepository impl ──────────────────────────────────

#[async_trait]
impl ReservationRepository for SeaOrmReservationRepository {
    async fn insert_exclusive(&self, r: Reservation) -> DomainResult<bool> {
        debug!(reservation_id = %r.id, spot_id = %r.spot_id, "Inserting reservation");

        let txn = self.db.begin().await.map_err(db_err)?;
        let overlapping = count_overlapping(
            &txn,
            r.spot_id,
            r.start_time,
            r.end_time,
            &ReservationStatus::HOLDING,
        )
        .await?;
        if overlapping > 0 {
            txn.rollback().await.map_err(db_err)?;
            return Ok(false);
        }
        domain_to_active(&r).insert(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(true)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Reservation>> {
        reservation::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn update(&self, r: Reservation) -> DomainResult<()> {
        debug!(reservation_id = %r.id, status = %r.status, "Updating reservation");

        let existing = reservation::Entity::find_by_id(r.id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if existing.is_none() {
            return Err(DomainError::not_found("Reservation", r.id));
        }

        domain_to_active(&r).update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn exists_overlapping(
        &self,
        spot_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        statuses: &[ReservationStatus],
    ) -> DomainResult<bool> {
        if statuses.is_empty() {
            return Ok(false);
        }
        Ok(count_overlapping(&self.db, spot_id, start, end, statuses).await? > 0)
    }

    async fn find_in_effect(
        &self,
        spot_id: Uuid,
        at: DateTime<Utc>,
    ) -> DomainResult<Option<Reservation>> {
        reservation::Entity::find()
            .filter(reservation::Column::SpotId.eq(spot_id.to_string()))
            .filter(
                reservation::Column::Status
                    .is_in(ReservationStatus::HOLDING.iter().map(|s| s.as_str())),
            )
            .filter(reservation::Column::StartTime.lte(at))
            .filter(reservation::Column::EndTime.gt(at))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Reservation>> {
        reservation::Entity::find()
            .filter(reservation::Column::UserId.eq(user_id.to_string()))
            .order_by_desc(reservation::Column::StartTime)
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

    async fn setup() -> (SeaOrmReservationRepository, Uuid) {
        let db = test_db::connect().await;
        let spot = Spot::new("B1", SpotClass::Standard);
        SeaOrmSpotRepository::new(db.clone()).save(spot.clone()).await.unwrap();
        (SeaOrmReservationRepository::new(db), spot.id)
    }

    #[tokio::test]
    async fn half_open_overlap() {
        let (repo, spot) = setup().await;
        let t = Utc::now() + Duration::hours(1);
        let user = Uuid::new_v4();

        assert!(repo
            .insert_exclusive(Reservation::new(spot, user, t, 120, Utc::now()).unwrap())
            .await
            .unwrap());
        assert!(!repo
            .insert_exclusive(Reservation::new(spot, user, t + Duration::hours(1), 120, Utc::now()).unwrap())
            .await
            .unwrap());
        assert!(repo
            .insert_exclusive(Reservation::new(spot, user, t + Duration::hours(2), 60, Utc::now()).unwrap())
            .await
            .unwrap());

        assert!(repo
            .exists_overlapping(spot, t - Duration::minutes(30), t + Duration::minutes(1), &ReservationStatus::HOLDING)
            .await
            .unwrap());
        assert!(!repo
            .exists_overlapping(spot, t - Duration::minutes(30), t, &ReservationStatus::HOLDING)
            .await
            .unwrap());

        let mine = repo.find_for_user(user).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine[0].start_time > mine[1].start_time);
    }

    #[tokio::test]
    async fn cancelled_reservations_do_not_hold() {
        let (repo, spot) = setup().await;
        let t = Utc::now() + Duration::hours(1);
        let mut r = Reservation::new(spot, Uuid::new_v4(), t, 60, Utc::now()).unwrap();
        repo.insert_exclusive(r.clone()).await.unwrap();

        r.cancel(Utc::now());
        repo.update(r.clone()).await.unwrap();
        assert_eq!(
            repo.find_by_id(r.id).await.unwrap().unwrap().status,
            ReservationStatus::Cancelled
        );
        assert!(repo
            .insert_exclusive(Reservation::new(spot, Uuid::new_v4(), t, 60, Utc::now()).unwrap())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn find_in_effect_covers_start_but_not_end() {
        let (repo, spot) = setup().await;
        let t = Utc::now() + Duration::hours(1);
        let r = Reservation::new(spot, Uuid::new_v4(), t, 60, Utc::now()).unwrap();
        repo.insert_exclusive(r.clone()).await.unwrap();

        assert!(repo.find_in_effect(spot, t - Duration::seconds(1)).await.unwrap().is_none());
        assert_eq!(repo.find_in_effect(spot, t).await.unwrap().unwrap().id, r.id);
        assert!(repo.find_in_effect(spot, t + Duration::hours(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_of_missing_reservation_is_not_found() {
        let (repo, spot) = setup().await;
        let r = Reservation::new(spot, Uuid::new_v4(), Utc::now(), 60, Utc::now()).unwrap();
        assert!(matches!(
            repo.update(r).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }
}
