use chrono::{DateTime, TimeDelta, Utc};
use sea_orm::{ActiveValue::Set, QueryOrder, TransactionTrait, entity::prelude::*};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One chat row. `id` is assigned on insert and increases with every write.
/// Within a ticket `created_at` strictly increases with `id`, so ordering by
/// `(created_at, id)` and by `id` agree.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "ticket_messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub ticket_id: i64,
    pub sender_id: i64,
    pub sender_role: SenderRole,

    pub body: String,

    pub created_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "sender_role")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SenderRole {
    #[sea_orm(string_value = "requester")]
    Requester,

    #[sea_orm(string_value = "responder")]
    Responder,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tickets::Entity",
        from = "Column::TicketId",
        to = "super::tickets::Column::Id"
    )]
    Ticket,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SenderId",
        to = "super::user::Column::Id"
    )]
    Sender,
}

impl Related<super::tickets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sender.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Timestamp for a new row given the ticket's previous row.
///
/// Clock skew or a burst of writes inside one clock tick must not stamp a
/// newer row earlier than (or equal to) an older one.
fn next_created_at(previous: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match previous {
        Some(prev) if prev >= now => prev + TimeDelta::microseconds(1),
        _ => now,
    }
}

impl Model {
    /// Inserts a row and stamps it after its ticket's latest row.
    ///
    /// The insert takes the write lock first, so the previous row read inside
    /// the same transaction is final and the clock is read after it.
    pub async fn create(
        db: &DbConn,
        ticket_id: i64,
        sender_id: i64,
        sender_role: SenderRole,
        body: &str,
    ) -> Result<Model, DbErr> {
        let txn = db.begin().await?;

        let inserted = ActiveModel {
            ticket_id: Set(ticket_id),
            sender_id: Set(sender_id),
            sender_role: Set(sender_role),
            body: Set(body.to_owned()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let previous = Entity::find()
            .filter(Column::TicketId.eq(ticket_id))
            .filter(Column::Id.lt(inserted.id))
            .order_by_desc(Column::Id)
            .one(&txn)
            .await?;

        let mut active: ActiveModel = inserted.into();
        active.created_at = Set(next_created_at(previous.map(|p| p.created_at), Utc::now()));
        let row = active.update(&txn).await?;

        txn.commit().await?;
        Ok(row)
    }

    /// Full history of a ticket in display order.
    pub async fn find_all_for_ticket(db: &DbConn, ticket_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::TicketId.eq(ticket_id))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }
}
