use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::DeriveActiveEnum;
use sea_orm::QueryFilter;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::ticket_messages::SenderRole;
use super::user::{self, UserRole};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub requester_id: i64,

    pub subject: String,
    pub description: String,

    pub priority: TicketPriority,
    pub status: TicketStatus,

    /// Engineer currently handling the ticket, if it has been acquired.
    pub assignee_id: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ticket_status")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TicketStatus {
    #[sea_orm(string_value = "new")]
    New,

    #[sea_orm(string_value = "open")]
    Open,

    #[sea_orm(string_value = "in_progress")]
    InProgress,

    #[sea_orm(string_value = "hold")]
    Hold,

    #[sea_orm(string_value = "closed")]
    Closed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ticket_priority")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TicketPriority {
    #[sea_orm(string_value = "low")]
    Low,

    #[sea_orm(string_value = "medium")]
    Medium,

    #[sea_orm(string_value = "high")]
    High,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RequesterId",
        to = "super::user::Column::Id"
    )]
    Requester,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requester.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Outcome of an engineer trying to pick up a ticket.
#[derive(Debug, Clone, PartialEq)]
pub enum Acquire {
    Acquired(Model),
    AlreadyAcquired,
    NotFound,
}

impl Model {
    pub async fn create(
        db: &DbConn,
        requester_id: i64,
        subject: &str,
        description: &str,
        priority: TicketPriority,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();

        let active_model = ActiveModel {
            requester_id: Set(requester_id),
            subject: Set(subject.to_owned()),
            description: Set(description.to_owned()),
            priority: Set(priority),
            status: Set(TicketStatus::New),
            assignee_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active_model.insert(db).await
    }

    pub async fn find_by_id(db: &DbConn, ticket_id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(ticket_id).one(db).await
    }

    /// Assigns the ticket to `engineer_id` only if nobody holds it yet.
    ///
    /// The check and the write are one conditional `UPDATE`, so two engineers
    /// racing for the same ticket cannot both win.
    pub async fn acquire(db: &DbConn, ticket_id: i64, engineer_id: i64) -> Result<Acquire, DbErr> {
        let result = Entity::update_many()
            .col_expr(Column::AssigneeId, Expr::value(engineer_id))
            .col_expr(Column::Status, Expr::value(TicketStatus::Open.to_string()))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(ticket_id))
            .filter(Column::AssigneeId.is_null())
            .exec(db)
            .await?;

        match Self::find_by_id(db, ticket_id).await? {
            None => Ok(Acquire::NotFound),
            Some(ticket) if result.rows_affected == 1 => Ok(Acquire::Acquired(ticket)),
            Some(_) => Ok(Acquire::AlreadyAcquired),
        }
    }

    /// Conversation role `user` plays on this ticket, or `None` if they are
    /// not a participant.
    pub fn participant_role(&self, user: &user::Model) -> Option<SenderRole> {
        if user.id == self.requester_id {
            Some(SenderRole::Requester)
        } else if self.assignee_id == Some(user.id) || user.role == UserRole::Admin {
            Some(SenderRole::Responder)
        } else {
            None
        }
    }

    /// The other side of the conversation as seen by `role`.
    pub fn counterpart_of(&self, role: SenderRole) -> Option<i64> {
        match role {
            SenderRole::Requester => self.assignee_id,
            SenderRole::Responder => Some(self.requester_id),
        }
    }
}
