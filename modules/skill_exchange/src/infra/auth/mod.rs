pub mod hmac_session;

pub use hmac_session::HmacSessionGuard;
