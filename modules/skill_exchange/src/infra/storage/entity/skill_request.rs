use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use uuid::Uuid;

use crate::contract::model::{RequestStatus, SkillRequest, SkillRole};
use crate::domain::request::skill_key;

/// One row per inbox entry. `seq` gives arrival order.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "skill_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub seq: i32,
    #[sea_orm(unique)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub from_id: Uuid,
    pub skill: String,
    /// Lowercased `skill` for duplicate checks.
    pub skill_key: String,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for SkillRequest {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let role = SkillRole::parse(&m.role)
            .ok_or_else(|| anyhow::anyhow!("request {} has unknown role '{}'", m.id, m.role))?;
        let status = RequestStatus::parse(&m.status)
            .ok_or_else(|| anyhow::anyhow!("request {} has unknown status '{}'", m.id, m.status))?;
        Ok(Self {
            id: m.id,
            owner_id: m.owner_id,
            from_id: m.from_id,
            skill: m.skill,
            role,
            status,
            created_at: m.created_at,
            accepted_at: m.accepted_at,
        })
    }
}

/// Insert model; `seq` is assigned by the database.
pub fn new_active_model(r: &SkillRequest) -> ActiveModel {
    ActiveModel {
        seq: Default::default(),
        id: Set(r.id),
        owner_id: Set(r.owner_id),
        from_id: Set(r.from_id),
        skill: Set(r.skill.clone()),
        skill_key: Set(skill_key(&r.skill)),
        role: Set(r.role.as_str().to_owned()),
        status: Set(r.status.as_str().to_owned()),
        created_at: Set(r.created_at),
        accepted_at: Set(r.accepted_at),
    }
}
