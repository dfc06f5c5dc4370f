use modkit::api::problem::{Problem, ValidationError};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::rest::{dto, handlers};

/// Adds the bearer session scheme referenced by authenticated operations.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::signup,
        handlers::update_profile,
        handlers::send_request,
        handlers::my_requests,
        handlers::accept_request,
        handlers::decline_request,
        handlers::delete_accepted,
        handlers::send_message,
        handlers::get_messages,
        handlers::rate_user,
        handlers::get_user,
        handlers::list_users,
    ),
    components(schemas(
        Problem,
        ValidationError,
        dto::MessageResp,
        dto::SignupReq,
        dto::SignupResp,
        dto::UserSummaryDto,
        dto::UpdateProfileReq,
        dto::UserDto,
        dto::UserEnvelope,
        dto::UserProfileDto,
        dto::UserProfileEnvelope,
        dto::ListedUserDto,
        dto::PendingRequestDto,
        dto::SendRequestReq,
        dto::SentRequestDto,
        dto::SendRequestResp,
        dto::RequestIdReq,
        dto::RequestDto,
        dto::MyRequestsResp,
        dto::SendMessageReq,
        dto::MessageDto,
        dto::SendMessageResp,
        dto::MessagesResp,
        dto::RateUserReq,
        dto::RatingSummaryDto,
        dto::RateUserResp,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Account registration and profile"),
        (name = "users", description = "User directory and profiles"),
        (name = "requests", description = "Skill request lifecycle"),
        (name = "messages", description = "Direct messages"),
        (name = "ratings", description = "Peer ratings"),
    )
)]
pub struct SkillExchangeApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = SkillExchangeApiDoc::openapi();
        for path in [
            "/api/auth/signup",
            "/api/auth/update",
            "/api/user/request",
            "/api/user/myrequests",
            "/api/user/accept",
            "/api/user/decline",
            "/api/user/delete-accepted",
            "/api/user/send-message",
            "/api/user/get-messages/{userId}",
            "/api/user/rate-user",
            "/api/user/get-user/{id}",
            "/api/user/all",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let schemes = doc.components.unwrap().security_schemes;
        assert!(schemes.contains_key("bearerAuth"));
    }
}
