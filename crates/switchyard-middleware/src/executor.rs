//! Phase executor.
//!
//! Runs a route's [`ExecutionPlan`] strictly in order, then the handler.
//!
//! - A finalized response stops the chain; later phases and the handler
//!   are skipped.
//! - A policy answering [`PolicyOutcome::Halt`] without finalizing gets a
//!   default rejection for its phase.
//! - Errors and panics from middleware, policies and handlers are contained
//!   here. If the response is still open a `500` error envelope is written,
//!   otherwise the failure is only logged.
//! - A middleware that neither calls [`Next::proceed`] nor finalizes the
//!   response leaves the request pending. Timeouts belong to the caller.

use std::any::Any;
use std::convert::Infallible;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures_util::FutureExt;
use switchyard_core::{
    Body, ErrorCategory, Handler, HandlerResult, Request, Response, SyncHandler,
};
use switchyard_telemetry::metrics;

use crate::middleware::{BoxedMiddleware, Next};
use crate::phase::{ExecutionPlan, Phase, PhaseKind};
use crate::policy::{Policy, PolicyOutcome, PolicySet};

/// How a request left the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The handler ran and its result was written.
    Completed,
    /// A phase finalized the response; the handler did not run.
    ShortCircuited(PhaseKind),
    /// A phase or the handler failed.
    Failed,
}

/// Runs execution plans against the installed policy collaborators.
#[derive(Debug, Clone, Default)]
pub struct PhaseExecutor {
    policies: PolicySet,
}

impl PhaseExecutor {
    /// Creates an executor over a policy set.
    #[must_use]
    pub fn new(policies: PolicySet) -> Self {
        Self { policies }
    }

    /// Returns the installed policies.
    #[must_use]
    pub fn policies(&self) -> &PolicySet {
        &self.policies
    }

    /// Replaces the installed policies.
    pub fn set_policies(&mut self, policies: PolicySet) {
        self.policies = policies;
    }

    /// Runs `plan`, then `handler` unless a phase finalized the response.
    pub async fn execute(
        &self,
        plan: &ExecutionPlan,
        handler: &Handler,
        req: &mut Request,
        res: &mut Response,
    ) -> ExecutionOutcome {
        for phase in plan.phases() {
            let kind = phase.kind();
            if let Err(err) = self.run_phase(phase, req, res).await {
                let source = if kind.is_policy() { kind.name() } else { "middleware" };
                write_failure(res, &err, source, Some(kind));
                return ExecutionOutcome::Failed;
            }
            if res.is_finalized() {
                tracing::debug!(
                    phase = kind.name(),
                    http.path = req.path(),
                    "phase finalized the response"
                );
                metrics::record_short_circuit(kind.name());
                return ExecutionOutcome::ShortCircuited(kind);
            }
        }

        invoke(handler, req, res).await
    }

    async fn run_phase(
        &self,
        phase: &Phase,
        req: &mut Request,
        res: &mut Response,
    ) -> anyhow::Result<()> {
        let kind = phase.kind();
        match phase {
            Phase::Before(list) | Phase::Transform(list) | Phase::After(list) | Phase::Legacy(list) => {
                run_middleware(list, kind, req, res).await
            }
            Phase::RateLimit(config) => {
                run_policy(self.policies.rate_limit(), config, kind, req, res).await
            }
            Phase::Auth(config) => run_policy(self.policies.auth(), config, kind, req, res).await,
            Phase::Validation(config) => {
                run_policy(self.policies.validation(), config, kind, req, res).await
            }
            Phase::Cache(config) => run_policy(self.policies.cache(), config, kind, req, res).await,
        }
    }
}

async fn run_middleware(
    list: &[BoxedMiddleware],
    kind: PhaseKind,
    req: &mut Request,
    res: &mut Response,
) -> anyhow::Result<()> {
    for mw in list {
        let next = Next::new();
        let token = next.clone();
        let (r, s) = (&mut *req, &mut *res);
        guarded(move || mw.call(r, s, token)).await?;

        if res.is_finalized() {
            return Ok(());
        }
        if !next.is_called() {
            tracing::warn!(
                middleware = mw.name(),
                phase = kind.name(),
                http.path = req.path(),
                "middleware neither continued nor finalized the response; request left pending"
            );
            let never: Infallible = std::future::pending().await;
            match never {}
        }
    }
    Ok(())
}

async fn run_policy<C: Sync + 'static>(
    policy: Option<&dyn Policy<C>>,
    config: &C,
    kind: PhaseKind,
    req: &mut Request,
    res: &mut Response,
) -> anyhow::Result<()> {
    let Some(policy) = policy else {
        anyhow::bail!("no {kind} policy installed");
    };

    let (r, s) = (&mut *req, &mut *res);
    let outcome = guarded(move || policy.apply(r, s, config)).await?;

    if outcome == PolicyOutcome::Halt && !res.is_finalized() {
        let (category, message) = default_rejection(kind);
        tracing::debug!(phase = kind.name(), "policy halted without a response; rejecting");
        res.reject(category, message)?;
    }
    Ok(())
}

fn default_rejection(kind: PhaseKind) -> (ErrorCategory, &'static str) {
    match kind {
        PhaseKind::RateLimit => (ErrorCategory::RateLimited, "Too Many Requests"),
        PhaseKind::Auth => (ErrorCategory::Authentication, "Unauthorized"),
        PhaseKind::Validation => (ErrorCategory::Validation, "Bad Request"),
        _ => (ErrorCategory::Internal, "Internal Server Error"),
    }
}

/// Runs a handler and writes its result.
pub async fn invoke(handler: &Handler, req: &mut Request, res: &mut Response) -> ExecutionOutcome {
    let result = match handler {
        Handler::Immediate(h) => call_sync(h.as_ref(), req, res),
        Handler::Deferred(h) => {
            let (r, s) = (&mut *req, &mut *res);
            guarded(move || h.call(r, s)).await
        }
    };
    complete(res, result)
}

/// Runs a synchronous handler in the current call stack and writes its result.
pub fn invoke_sync(handler: &dyn SyncHandler, req: &mut Request, res: &mut Response) -> ExecutionOutcome {
    let result = call_sync(handler, req, res);
    complete(res, result)
}

fn call_sync(handler: &dyn SyncHandler, req: &mut Request, res: &mut Response) -> HandlerResult {
    panic::catch_unwind(AssertUnwindSafe(|| handler.call(req, res)))
        .unwrap_or_else(|p| Err(panic_error(&*p)))
}

/// Writes a handler result to the response.
///
/// A body is written unless the handler already finalized the response.
/// [`Body::Empty`] finalizes an empty response with the current status.
pub fn complete(res: &mut Response, result: HandlerResult) -> ExecutionOutcome {
    match result {
        Ok(body) => {
            if res.is_finalized() {
                if !body.is_empty() {
                    tracing::debug!("handler returned a body after finalizing the response; ignored");
                }
                return ExecutionOutcome::Completed;
            }
            let written = match body {
                Body::Empty => res.end(),
                body => res.send(body),
            };
            match written {
                Ok(()) => ExecutionOutcome::Completed,
                Err(err) => {
                    write_failure(res, &err.into(), "handler", None);
                    ExecutionOutcome::Failed
                }
            }
        }
        Err(err) => {
            write_failure(res, &err, "handler", None);
            ExecutionOutcome::Failed
        }
    }
}

/// Contains a failure: writes a `500` envelope if the response is still open.
pub fn write_failure(
    res: &mut Response,
    err: &anyhow::Error,
    source: &'static str,
    phase: Option<PhaseKind>,
) {
    metrics::record_execution_error(source);
    let phase = phase.map_or("handler", PhaseKind::name);

    if res.is_finalized() {
        tracing::warn!(
            source,
            phase,
            error = %err,
            "execution failed after the response was finalized"
        );
        return;
    }

    tracing::error!(source, phase, error = %err, "execution failed");
    if let Err(write_err) = res.reject(ErrorCategory::Internal, "Internal Server Error") {
        tracing::error!(error = %write_err, "failed to write error response");
    }
}

/// Runs `make` and the future it returns, converting panics into errors.
async fn guarded<T, F, Fut>(make: F) -> anyhow::Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let fut = match panic::catch_unwind(AssertUnwindSafe(make)) {
        Ok(fut) => fut,
        Err(p) => return Err(panic_error(&*p)),
    };
    AssertUnwindSafe(fut)
        .catch_unwind()
        .await
        .unwrap_or_else(|p| Err(panic_error(&*p)))
}

fn panic_error(payload: &(dyn Any + Send)) -> anyhow::Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    anyhow::anyhow!("panicked: {message}")
}
