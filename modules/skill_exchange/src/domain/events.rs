use uuid::Uuid;

/// Domain events emitted after a state change has been committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillExchangeEvent {
    UserRegistered {
        user_id: Uuid,
    },
    RequestSent {
        request_id: Uuid,
        from_id: Uuid,
        to_id: Uuid,
    },
    RequestAccepted {
        request_id: Uuid,
        /// `None` when the sender already held this exchange.
        mirror_id: Option<Uuid>,
        accepter_id: Uuid,
        sender_id: Uuid,
    },
    RequestDeclined {
        request_id: Uuid,
        owner_id: Uuid,
    },
    AcceptedRequestDeleted {
        request_id: Uuid,
        owner_id: Uuid,
    },
    MessageSent {
        message_id: Uuid,
        sender_id: Uuid,
        receiver_id: Uuid,
    },
    RatingSubmitted {
        ratee_id: Uuid,
        rater_id: Uuid,
        stars: i64,
    },
}

impl SkillExchangeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SkillExchangeEvent::UserRegistered { .. } => "user_registered",
            SkillExchangeEvent::RequestSent { .. } => "request_sent",
            SkillExchangeEvent::RequestAccepted { .. } => "request_accepted",
            SkillExchangeEvent::RequestDeclined { .. } => "request_declined",
            SkillExchangeEvent::AcceptedRequestDeleted { .. } => "accepted_request_deleted",
            SkillExchangeEvent::MessageSent { .. } => "message_sent",
            SkillExchangeEvent::RatingSubmitted { .. } => "rating_submitted",
        }
    }
}
