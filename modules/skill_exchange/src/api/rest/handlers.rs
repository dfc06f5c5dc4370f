use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    response::Json,
    Extension,
};
use modkit::api::problem::{Problem, ProblemResponse};
use tracing::{error, info};

use crate::api::rest::dto::{
    ListedUserDto, MessageDto, MessageResp, MessagesResp, MyRequestsResp, RateUserReq,
    RateUserResp, RequestIdReq, SendMessageReq, SendMessageResp, SendRequestReq, SendRequestResp,
    SignupReq, SignupResp, UpdateProfileReq, UserEnvelope, UserProfileEnvelope, UserSummaryDto,
};
use crate::api::rest::error::{map_domain_error, ProblemScope};
use crate::api::rest::extract::{parse_id, AuthenticatedUser, JsonBody};
use crate::contract::model::NewSkillRequest;
use crate::domain::error::DomainError;
use crate::domain::service::Service;

type Svc = Extension<Arc<Service>>;

fn fail(what: &str, e: DomainError, scope: &ProblemScope) -> ProblemResponse {
    error!("Failed to {what}: {e}");
    map_domain_error(&e, scope)
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "auth",
    request_body = SignupReq,
    responses(
        (status = 201, description = "User registered", body = SignupResp),
        (status = 400, description = "Invalid input", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Email already in use", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn signup(
    scope: ProblemScope,
    Extension(svc): Svc,
    JsonBody(req): JsonBody<SignupReq>,
) -> Result<(StatusCode, Json<SignupResp>), ProblemResponse> {
    info!("Signing up user");
    let user = svc
        .create_user(req.into())
        .await
        .map_err(|e| fail("sign up", e, &scope))?;
    Ok((
        StatusCode::CREATED,
        Json(SignupResp {
            message: "User registered successfully".into(),
            user: UserSummaryDto::from(&user),
        }),
    ))
}

/// Update the caller's profile
#[utoipa::path(
    put,
    path = "/api/auth/update",
    tag = "auth",
    request_body = UpdateProfileReq,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Updated profile", body = UserEnvelope),
        (status = 400, description = "Invalid input", body = Problem, content_type = "application/problem+json"),
        (status = 401, description = "Unauthorized", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "User not found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn update_profile(
    scope: ProblemScope,
    Extension(svc): Svc,
    AuthenticatedUser(me): AuthenticatedUser,
    JsonBody(req): JsonBody<UpdateProfileReq>,
) -> Result<Json<UserEnvelope>, ProblemResponse> {
    info!(user_id = %me, "Updating profile");
    let user = svc
        .update_profile(me, req.into())
        .await
        .map_err(|e| fail("update profile", e, &scope))?;
    Ok(Json(UserEnvelope { user: user.into() }))
}

/// Send a skill request to another user
#[utoipa::path(
    post,
    path = "/api/user/request",
    tag = "requests",
    request_body = SendRequestReq,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Request sent", body = SendRequestResp),
        (status = 400, description = "Invalid input or duplicate request", body = Problem, content_type = "application/problem+json"),
        (status = 401, description = "Unauthorized", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Recipient not found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn send_request(
    scope: ProblemScope,
    Extension(svc): Svc,
    AuthenticatedUser(me): AuthenticatedUser,
    JsonBody(req): JsonBody<SendRequestReq>,
) -> Result<Json<SendRequestResp>, ProblemResponse> {
    info!(user_id = %me, "Sending request");
    let to_user_id = parse_id("toUserId", req.to_user_id.as_deref())
        .map_err(|e| fail("send request", e, &scope))?;
    let sent = svc
        .send_request(
            me,
            NewSkillRequest {
                to_user_id,
                skill: req.skill,
                role: req.role,
            },
        )
        .await
        .map_err(|e| fail("send request", e, &scope))?;
    Ok(Json(SendRequestResp {
        message: "Request sent successfully".into(),
        request: sent.into(),
    }))
}

/// The caller's pending and accepted requests
#[utoipa::path(
    get,
    path = "/api/user/myrequests",
    tag = "requests",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Pending and accepted requests", body = MyRequestsResp),
        (status = 401, description = "Unauthorized", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "User not found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn my_requests(
    scope: ProblemScope,
    Extension(svc): Svc,
    AuthenticatedUser(me): AuthenticatedUser,
) -> Result<Json<MyRequestsResp>, ProblemResponse> {
    let mine = svc
        .list_requests(me)
        .await
        .map_err(|e| fail("list requests", e, &scope))?;
    Ok(Json(MyRequestsResp {
        requests: mine.pending.into_iter().map(Into::into).collect(),
        accepted_requests: mine.accepted.into_iter().map(Into::into).collect(),
    }))
}

/// Accept a pending request
#[utoipa::path(
    post,
    path = "/api/user/accept",
    tag = "requests",
    request_body = RequestIdReq,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Request accepted", body = MessageResp),
        (status = 400, description = "Invalid input", body = Problem, content_type = "application/problem+json"),
        (status = 401, description = "Unauthorized", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Request not found", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Sender no longer exists", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn accept_request(
    scope: ProblemScope,
    Extension(svc): Svc,
    AuthenticatedUser(me): AuthenticatedUser,
    JsonBody(req): JsonBody<RequestIdReq>,
) -> Result<Json<MessageResp>, ProblemResponse> {
    let request_id = parse_id("requestId", req.request_id.as_deref())
        .map_err(|e| fail("accept request", e, &scope))?;
    info!(user_id = %me, request_id = %request_id, "Accepting request");
    svc.accept_request(me, request_id)
        .await
        .map_err(|e| fail("accept request", e, &scope))?;
    Ok(Json(MessageResp::new("Request accepted successfully")))
}

/// Decline (remove) a pending request
#[utoipa::path(
    post,
    path = "/api/user/decline",
    tag = "requests",
    request_body = RequestIdReq,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Request declined", body = MessageResp),
        (status = 400, description = "Invalid input", body = Problem, content_type = "application/problem+json"),
        (status = 401, description = "Unauthorized", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Request not found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn decline_request(
    scope: ProblemScope,
    Extension(svc): Svc,
    AuthenticatedUser(me): AuthenticatedUser,
    JsonBody(req): JsonBody<RequestIdReq>,
) -> Result<Json<MessageResp>, ProblemResponse> {
    let request_id = parse_id("requestId", req.request_id.as_deref())
        .map_err(|e| fail("decline request", e, &scope))?;
    svc.decline_request(me, request_id)
        .await
        .map_err(|e| fail("decline request", e, &scope))?;
    Ok(Json(MessageResp::new("Request declined successfully")))
}

/// Remove an accepted request from the caller's list
#[utoipa::path(
    post,
    path = "/api/user/delete-accepted",
    tag = "requests",
    request_body = RequestIdReq,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Accepted request removed", body = MessageResp),
        (status = 400, description = "Invalid input", body = Problem, content_type = "application/problem+json"),
        (status = 401, description = "Unauthorized", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Request not found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn delete_accepted(
    scope: ProblemScope,
    Extension(svc): Svc,
    AuthenticatedUser(me): AuthenticatedUser,
    JsonBody(req): JsonBody<RequestIdReq>,
) -> Result<Json<MessageResp>, ProblemResponse> {
    let request_id = parse_id("requestId", req.request_id.as_deref())
        .map_err(|e| fail("delete accepted request", e, &scope))?;
    svc.delete_accepted(me, request_id)
        .await
        .map_err(|e| fail("delete accepted request", e, &scope))?;
    Ok(Json(MessageResp::new("Accepted request deleted successfully")))
}

/// Send a direct message
#[utoipa::path(
    post,
    path = "/api/user/send-message",
    tag = "messages",
    request_body = SendMessageReq,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Message stored", body = SendMessageResp),
        (status = 400, description = "Invalid input", body = Problem, content_type = "application/problem+json"),
        (status = 401, description = "Unauthorized", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn send_message(
    scope: ProblemScope,
    Extension(svc): Svc,
    AuthenticatedUser(me): AuthenticatedUser,
    JsonBody(req): JsonBody<SendMessageReq>,
) -> Result<Json<SendMessageResp>, ProblemResponse> {
    let to = parse_id("toUserId", req.to_user_id.as_deref())
        .map_err(|e| fail("send message", e, &scope))?;
    let sent = svc
        .send_message(me, to, req.text)
        .await
        .map_err(|e| fail("send message", e, &scope))?;
    Ok(Json(SendMessageResp {
        message: "Message sent".into(),
        data: sent.into(),
    }))
}

/// Conversation between the caller and another user, oldest first
#[utoipa::path(
    get,
    path = "/api/user/get-messages/{userId}",
    tag = "messages",
    params(("userId" = String, Path, description = "The other participant's id")),
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Conversation", body = MessagesResp),
        (status = 400, description = "Invalid id", body = Problem, content_type = "application/problem+json"),
        (status = 401, description = "Unauthorized", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn get_messages(
    scope: ProblemScope,
    Extension(svc): Svc,
    AuthenticatedUser(me): AuthenticatedUser,
    Path(user_id): Path<String>,
) -> Result<Json<MessagesResp>, ProblemResponse> {
    let other = parse_id("userId", Some(&user_id)).map_err(|e| fail("get messages", e, &scope))?;
    let messages = svc
        .message_history(me, other)
        .await
        .map_err(|e| fail("get messages", e, &scope))?;
    Ok(Json(MessagesResp {
        messages: messages.into_iter().map(MessageDto::from).collect(),
    }))
}

/// Rate another user from 1 to 5 stars
#[utoipa::path(
    post,
    path = "/api/user/rate-user",
    tag = "ratings",
    request_body = RateUserReq,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Rating recorded", body = RateUserResp),
        (status = 400, description = "Invalid input", body = Problem, content_type = "application/problem+json"),
        (status = 401, description = "Unauthorized", body = Problem, content_type = "application/problem+json"),
        (status = 403, description = "No accepted pairing", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "User not found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn rate_user(
    scope: ProblemScope,
    Extension(svc): Svc,
    AuthenticatedUser(me): AuthenticatedUser,
    JsonBody(req): JsonBody<RateUserReq>,
) -> Result<Json<RateUserResp>, ProblemResponse> {
    let ratee = parse_id("mentorId", req.mentor_id.as_deref())
        .map_err(|e| fail("rate user", e, &scope))?;
    let stars = req
        .rating
        .ok_or_else(|| DomainError::invalid_input("rating", "is required"))
        .map_err(|e| fail("rate user", e, &scope))?;
    let summary = svc
        .submit_rating(me, ratee, stars)
        .await
        .map_err(|e| fail("rate user", e, &scope))?;
    Ok(Json(RateUserResp {
        message: "Rating submitted successfully".into(),
        summary: summary.into(),
    }))
}

/// Public profile with rating summary
#[utoipa::path(
    get,
    path = "/api/user/get-user/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User profile", body = UserProfileEnvelope),
        (status = 400, description = "Invalid id", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "User not found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn get_user(
    scope: ProblemScope,
    Extension(svc): Svc,
    Path(id): Path<String>,
) -> Result<Json<UserProfileEnvelope>, ProblemResponse> {
    let id = parse_id("id", Some(&id)).map_err(|e| fail("get user", e, &scope))?;
    let profile = svc
        .get_user_profile(id)
        .await
        .map_err(|e| fail("get user", e, &scope))?;
    Ok(Json(UserProfileEnvelope {
        user: profile.into(),
    }))
}

/// Every user with the requests still pending for them
#[utoipa::path(
    get,
    path = "/api/user/all",
    tag = "users",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "All users", body = [ListedUserDto]),
        (status = 401, description = "Unauthorized", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn list_users(
    scope: ProblemScope,
    Extension(svc): Svc,
    AuthenticatedUser(_me): AuthenticatedUser,
) -> Result<Json<Vec<ListedUserDto>>, ProblemResponse> {
    let users = svc
        .list_users()
        .await
        .map_err(|e| fail("list users", e, &scope))?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}
