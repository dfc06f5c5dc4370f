pub mod message;
pub mod rating;
pub mod skill_request;
pub mod user;
