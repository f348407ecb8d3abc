//! Request channel between the interceptor/panel and the orchestrator.
//!
//! In-process callers use the `Orchestrator` directly; the CLI adds a
//! control-socket client that speaks the same messages as JSON lines.

use anyhow::Result;
use std::future::Future;
use std::sync::Arc;

use crate::orchestrator::{Orchestrator, Request, Response};

pub trait Transport: Send + Sync {
    /// Delivers `request` and waits for its response. Errors mean the
    /// orchestrator could not be reached, not that it said no.
    fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}

impl Transport for Orchestrator {
    fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        async move { Ok(self.handle(request).await) }
    }
}

impl<T: Transport> Transport for Arc<T> {
    fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        (**self).send(request)
    }
}
