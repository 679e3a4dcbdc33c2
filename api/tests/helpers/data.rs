use api::auth::generate_jwt;
use db::models::{
    tickets::{self, TicketPriority},
    user::{self, UserRole},
};
use sea_orm_migration::sea_orm::DatabaseConnection;

pub struct TestData {
    pub requester: user::Model,
    pub engineer: user::Model,
    pub outsider: user::Model,
    pub ticket: tickets::Model,
}

impl TestData {
    pub fn token(user: &user::Model) -> String {
        generate_jwt(user.id, user.role).unwrap().0
    }

    pub fn requester_token(&self) -> String {
        Self::token(&self.requester)
    }

    pub fn engineer_token(&self) -> String {
        Self::token(&self.engineer)
    }

    pub fn outsider_token(&self) -> String {
        Self::token(&self.outsider)
    }
}

/// A requester with one ticket, an engineer and a bystander. The ticket is
/// acquired by the engineer when `acquired` is set.
pub async fn setup_test_data(db: &DatabaseConnection, acquired: bool) -> TestData {
    let requester = user::Model::create(db, "ursula", "ursula@test.com", UserRole::User).await.unwrap();
    let engineer = user::Model::create(db, "eddie", "eddie@test.com", UserRole::Engineer).await.unwrap();
    let outsider = user::Model::create(db, "olga", "olga@test.com", UserRole::User).await.unwrap();

    let mut ticket = tickets::Model::create(db, requester.id, "Printer on fire", "Third floor", TicketPriority::High)
        .await
        .unwrap();
    if acquired {
        match tickets::Model::acquire(db, ticket.id, engineer.id).await.unwrap() {
            tickets::Acquire::Acquired(t) => ticket = t,
            other => panic!("unexpected acquire outcome: {other:?}"),
        }
    }

    TestData {
        requester,
        engineer,
        outsider,
        ticket,
    }
}
