use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use super::{required_text, storage, Service};
use crate::contract::model::{
    MyRequests, NewSkillRequest, RequestStatus, RequestView, SkillRequest, SkillRole, UserRef,
};
use crate::domain::error::DomainError;
use crate::domain::events::SkillExchangeEvent;
use crate::domain::repo::{AcceptOutcome, SendOutcome};
use crate::domain::request::new_pending;

impl Service {
    /// Appends a pending request to the recipient's inbox.
    #[instrument(
        name = "skill_exchange.service.send_request",
        skip(self, req),
        fields(from_id = %from_id, to_id = %req.to_user_id, role = %req.role)
    )]
    pub async fn send_request(
        &self,
        from_id: Uuid,
        req: NewSkillRequest,
    ) -> Result<SkillRequest, DomainError> {
        info!("Sending skill request");

        let skill = required_text("skill", &req.skill, self.config.max_skill_length)?;
        let role = SkillRole::parse(&req.role).ok_or_else(|| {
            DomainError::invalid_input("type", format!("'{}' is not one of learn, teach", req.role))
        })?;

        // Recipient must exist.
        self.get_user(req.to_user_id).await?;

        let pending = new_pending(req.to_user_id, from_id, skill, role, Utc::now());
        match self
            .requests
            .insert_pending_if_absent(pending.clone())
            .await
            .map_err(storage)?
        {
            SendOutcome::Inserted => {}
            SendOutcome::DuplicatePending => return Err(DomainError::DuplicatePending),
            SendOutcome::AlreadyAccepted => return Err(DomainError::AlreadyAccepted),
        }

        self.events.publish(&SkillExchangeEvent::RequestSent {
            request_id: pending.id,
            from_id,
            to_id: req.to_user_id,
        });
        info!(request_id = %pending.id, "Request sent");
        Ok(pending)
    }

    /// The caller's pending and accepted requests with counterparts resolved.
    #[instrument(name = "skill_exchange.service.list_requests", skip(self), fields(user_id = %user_id))]
    pub async fn list_requests(&self, user_id: Uuid) -> Result<MyRequests, DomainError> {
        self.get_user(user_id).await?;

        let pending = self
            .requests
            .list_for_owner(user_id, RequestStatus::Pending)
            .await
            .map_err(storage)?;
        let accepted = self
            .requests
            .list_for_owner(user_id, RequestStatus::Accepted)
            .await
            .map_err(storage)?;

        let mut ids: Vec<Uuid> = pending
            .iter()
            .chain(accepted.iter())
            .map(|r| r.from_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let counterparts: HashMap<Uuid, UserRef> = self
            .users
            .find_many(&ids)
            .await
            .map_err(storage)?
            .iter()
            .map(|u| (u.id, UserRef::from(u)))
            .collect();

        let resolve = |r: SkillRequest| RequestView {
            from: counterparts.get(&r.from_id).cloned(),
            id: r.id,
            skill: r.skill,
            role: r.role,
            status: r.status,
            created_at: r.created_at,
            accepted_at: r.accepted_at,
        };

        let out = MyRequests {
            pending: pending.into_iter().map(resolve).collect(),
            accepted: accepted.into_iter().map(resolve).collect(),
        };
        debug!(
            pending = out.pending.len(),
            accepted = out.accepted.len(),
            "Listed requests"
        );
        Ok(out)
    }

    /// Moves a pending request to accepted and mirrors it into the sender's
    /// accepted list with the role inverted. Both writes happen or neither does.
    #[instrument(
        name = "skill_exchange.service.accept_request",
        skip(self),
        fields(user_id = %user_id, request_id = %request_id)
    )]
    pub async fn accept_request(
        &self,
        user_id: Uuid,
        request_id: Uuid,
    ) -> Result<SkillRequest, DomainError> {
        info!("Accepting request");

        let outcome = self
            .requests
            .accept_and_mirror(user_id, request_id, Utc::now())
            .await
            .map_err(storage)?;

        match outcome {
            AcceptOutcome::Accepted { accepted, mirror } => {
                let mirror_id = mirror.map(|m| m.id);
                if accepted.id != request_id {
                    info!(kept_id = %accepted.id, "Crossed request folded into existing exchange");
                }
                self.events.publish(&SkillExchangeEvent::RequestAccepted {
                    request_id: accepted.id,
                    mirror_id,
                    accepter_id: user_id,
                    sender_id: accepted.from_id,
                });
                info!(mirror_id = ?mirror_id, "Request accepted");
                Ok(accepted)
            }
            AcceptOutcome::NotFound => Err(DomainError::request_not_found(request_id)),
            AcceptOutcome::CounterpartMissing { sender_id } => {
                error!(sender_id = %sender_id, "Sender vanished; accept rolled back");
                Err(DomainError::MirrorFailure {
                    request_id,
                    sender_id,
                })
            }
        }
    }

    #[instrument(
        name = "skill_exchange.service.decline_request",
        skip(self),
        fields(user_id = %user_id, request_id = %request_id)
    )]
    pub async fn decline_request(&self, user_id: Uuid, request_id: Uuid) -> Result<(), DomainError> {
        info!("Declining request");
        let removed = self
            .requests
            .delete_for_owner(user_id, request_id, RequestStatus::Pending)
            .await
            .map_err(storage)?;
        if !removed {
            return Err(DomainError::request_not_found(request_id));
        }
        self.events.publish(&SkillExchangeEvent::RequestDeclined {
            request_id,
            owner_id: user_id,
        });
        Ok(())
    }

    /// Removes an accepted entry from the caller's list only. The mirror held
    /// by the counterpart is left alone.
    #[instrument(
        name = "skill_exchange.service.delete_accepted",
        skip(self),
        fields(user_id = %user_id, request_id = %request_id)
    )]
    pub async fn delete_accepted(&self, user_id: Uuid, request_id: Uuid) -> Result<(), DomainError> {
        info!("Deleting accepted request");
        let removed = self
            .requests
            .delete_for_owner(user_id, request_id, RequestStatus::Accepted)
            .await
            .map_err(storage)?;
        if !removed {
            return Err(DomainError::request_not_found(request_id));
        }
        self.events.publish(&SkillExchangeEvent::AcceptedRequestDeleted {
            request_id,
            owner_id: user_id,
        });
        Ok(())
    }
}
