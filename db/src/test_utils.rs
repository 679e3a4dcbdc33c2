//! Database fixtures shared by model tests and the API test harness.

use migration::Migrator;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::models::tickets::{self, TicketPriority};
use crate::models::user::{self, UserRole};

/// A fresh in-memory database with the full schema applied.
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    Migrator::up(&db, None).await.expect("schema migrations");
    db
}

/// A requester, an engineer and one unassigned ticket filed by the requester.
pub struct TicketFixture {
    pub requester: user::Model,
    pub engineer: user::Model,
    pub ticket: tickets::Model,
}

pub async fn seed_ticket(db: &DatabaseConnection) -> TicketFixture {
    let requester = user::Model::create(db, "req", "req@example.com", UserRole::User)
        .await
        .expect("requester");
    let engineer = user::Model::create(db, "eng", "eng@example.com", UserRole::Engineer)
        .await
        .expect("engineer");
    let ticket = tickets::Model::create(db, requester.id, "Printer", "It is on fire", TicketPriority::High)
        .await
        .expect("ticket");
    TicketFixture {
        requester,
        engineer,
        ticket,
    }
}
