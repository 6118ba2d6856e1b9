//! Fixed-window rate limiting, composed per route in front of the
//! credential endpoints. Independent of the auth core: it sees only the
//! request envelope, never token or credential state.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::{ready, Ready};
use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::error::AuthError;

// Counter maps are pruned once they grow past this many distinct clients.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window_seconds: 60,
        }
    }
}

#[derive(Debug)]
struct WindowCounter {
    count: u32,
    window_start: Instant,
}

/// Per-route rate limiter keyed by client IP. Each middleware instance owns
/// its own counter map, so two routes wrapped with separate instances are
/// limited independently; clones of one instance share the map.
#[derive(Clone)]
pub struct RateLimitMiddleware {
    config: RateLimitConfig,
    counters: Arc<Mutex<HashMap<String, WindowCounter>>>,
}

impl RateLimitMiddleware {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            counters: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_default_config() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            config: self.config.clone(),
            counters: self.counters.clone(),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    config: RateLimitConfig,
    counters: Arc<Mutex<HashMap<String, WindowCounter>>>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let key = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        let exceeded = {
            let mut counters = self
                .counters
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            if counters.len() > PRUNE_THRESHOLD {
                let window = self.config.window_seconds;
                counters.retain(|_, c| c.window_start.elapsed().as_secs() < window);
            }

            let counter = counters.entry(key).or_insert_with(|| WindowCounter {
                count: 0,
                window_start: Instant::now(),
            });

            if counter.window_start.elapsed().as_secs() >= self.config.window_seconds {
                counter.count = 0;
                counter.window_start = Instant::now();
            }

            counter.count += 1;
            counter.count > self.config.max_requests
        };

        if exceeded {
            tracing::warn!(
                max_requests = self.config.max_requests,
                window_seconds = self.config.window_seconds,
                "rate limit exceeded"
            );
            return Box::pin(ready(Err(AuthError::RateLimited.into())));
        }

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}
