//! Per-request GraphQL context.

use axum::http::{HeaderMap, Method, Uri};

use crate::driver::SharedDriver;

/// The parts of the incoming HTTP request resolvers may look at.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

/// Attached to every GraphQL request: the request itself and the driver
/// handle shared by the whole process.
#[derive(Clone)]
pub struct RequestContext {
    pub request: RequestInfo,
    pub driver: SharedDriver,
}

impl RequestContext {
    pub fn new(request: RequestInfo, driver: SharedDriver) -> Self {
        Self { request, driver }
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}
