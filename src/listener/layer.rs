use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::Request;
use axum::response::Response;
use tower::{Layer, Service};

use crate::listener::DeviceViewListener;

/// Wraps a service with [`DeviceViewListener`] handling.
///
/// The resolved [`ViewState`](crate::view::ViewState) is inserted into the
/// request extensions before the inner service runs.
#[derive(Clone)]
pub struct DeviceViewLayer {
    listener: Arc<DeviceViewListener>,
}

impl DeviceViewLayer {
    pub fn new(listener: Arc<DeviceViewListener>) -> Self {
        Self { listener }
    }
}

impl<S> Layer<S> for DeviceViewLayer {
    type Service = DeviceViewService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DeviceViewService {
            inner,
            listener: self.listener.clone(),
        }
    }
}

#[derive(Clone)]
pub struct DeviceViewService<S> {
    inner: S,
    listener: Arc<DeviceViewListener>,
}

impl<S> Service<Request> for DeviceViewService<S>
where
    S: Service<Request, Response = Response> + Send,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let info = self.listener.request_info(&req);
        let outcome = self.listener.handle_request(&info);
        req.extensions_mut().insert(outcome.state);

        if let Some(redirect) = outcome.redirect {
            return Box::pin(async move { Ok(redirect) });
        }

        let pending = outcome.pending;
        let listener = self.listener.clone();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let response = fut.await?;
            Ok(listener.handle_response(response, pending))
        })
    }
}
