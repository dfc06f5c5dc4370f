pub mod client;
pub mod error;
pub mod model;

pub use client::SkillExchangeApi;
pub use error::SkillExchangeError;
pub use model::*;
