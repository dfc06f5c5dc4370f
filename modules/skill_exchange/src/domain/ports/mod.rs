pub mod session;

pub use session::SessionGuard;

/// Output port for domain events.
pub trait EventPublisher<E>: Send + Sync + 'static {
    fn publish(&self, event: &E);
}
