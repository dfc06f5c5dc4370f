//! REST-facing helpers shared by modules: the OpenAPI registry seam and
//! RFC 9457 problem responses.

pub mod problem;

use utoipa::openapi::OpenApi;

/// Collects per-module OpenAPI documents into the single document served by the host.
pub trait OpenApiRegistry: Send + Sync {
    /// Merge a module's paths, schemas and security schemes into the host document.
    fn merge_document(&self, doc: OpenApi);

    /// Snapshot of the merged document.
    fn document(&self) -> OpenApi;

    fn as_any(&self) -> &dyn std::any::Any;
}
