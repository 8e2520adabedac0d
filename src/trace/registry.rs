//! Startup-built registry of intercepted operations.
//!
//! # Responsibilities
//! - Decide once, at startup, which operations are traced (`TracePolicy`)
//! - Attach per-operation IP guards
//! - Run the ordered advice chain around a call
//!
//! # Design Decisions
//! - `CheckIp` advice always precedes `LogTrace`, so a rejected call never
//!   opens a span
//! - Operations that were never declared run without advice

use std::collections::HashMap;
use std::future::Future;

use futures_util::future::BoxFuture;

use crate::error::Result;
use crate::security::access_guard::AccessGuard;
use crate::security::client_ip::UNKNOWN_IP;

use super::interceptor::CallInterceptor;

/// Name patterns selecting traced operations. `*` matches any run of
/// characters; exclusions are exact names and win over inclusions.
#[derive(Debug, Clone, Default)]
pub struct TracePolicy {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl TracePolicy {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// Trace every controller and service operation.
    pub fn standard() -> Self {
        Self::new(
            vec!["*Controller.*".to_string(), "*Service.*".to_string()],
            Vec::new(),
        )
    }

    /// Policy that traces nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn selects(&self, operation: &str) -> bool {
        if self.exclude.iter().any(|name| name == operation) {
            return false;
        }
        self.include.iter().any(|pattern| glob_match(pattern, operation))
    }
}

fn glob_match(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or_default();
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };

    let mut parts: Vec<&str> = parts.collect();
    let Some(last) = parts.pop() else {
        // No `*` in the pattern.
        return rest.is_empty();
    };

    for part in parts {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}

/// One interceptor step attached to an operation.
#[derive(Debug, Clone)]
pub enum Advice {
    CheckIp(AccessGuard),
    LogTrace,
}

impl Advice {
    pub fn name(&self) -> &'static str {
        match self {
            Advice::CheckIp(_) => "CheckIp",
            Advice::LogTrace => "LogTrace",
        }
    }
}

/// Per-call context handed down the advice chain.
#[derive(Debug, Clone, Copy)]
pub struct CallContext<'a> {
    pub operation: &'a str,
    pub client_ip: Option<&'a str>,
}

impl CallContext<'_> {
    fn client_ip_or_unknown(&self) -> &str {
        self.client_ip.unwrap_or(UNKNOWN_IP)
    }
}

#[derive(Debug)]
pub struct OperationRegistry {
    operations: HashMap<String, Vec<Advice>>,
    interceptor: CallInterceptor,
}

impl OperationRegistry {
    pub fn builder(policy: TracePolicy) -> RegistryBuilder {
        RegistryBuilder {
            policy,
            declared: Vec::new(),
            interceptor: CallInterceptor::default(),
        }
    }

    pub fn advices(&self, operation: &str) -> &[Advice] {
        self.operations
            .get(operation)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn is_traced(&self, operation: &str) -> bool {
        self.advices(operation)
            .iter()
            .any(|a| matches!(a, Advice::LogTrace))
    }

    /// Run `call` through the advice chain of `operation`.
    pub fn invoke<'a, T, Fut>(
        &'a self,
        operation: &'a str,
        client_ip: Option<&'a str>,
        call: Fut,
    ) -> BoxFuture<'a, Result<T>>
    where
        Fut: Future<Output = Result<T>> + Send + 'a,
        T: Send + 'a,
    {
        let ctx = CallContext {
            operation,
            client_ip,
        };
        self.run(self.advices(operation), ctx, Box::pin(call))
    }

    fn run<'a, T: Send + 'a>(
        &'a self,
        advices: &'a [Advice],
        ctx: CallContext<'a>,
        call: BoxFuture<'a, Result<T>>,
    ) -> BoxFuture<'a, Result<T>> {
        match advices.split_first() {
            None => call,
            Some((Advice::CheckIp(guard), rest)) => Box::pin(async move {
                guard.check(ctx.client_ip_or_unknown())?;
                self.run(rest, ctx, call).await
            }),
            Some((Advice::LogTrace, rest)) => Box::pin(
                self.interceptor
                    .intercept_async(ctx.operation, self.run(rest, ctx, call)),
            ),
        }
    }

    /// Synchronous counterpart of [`invoke`](Self::invoke).
    pub fn invoke_sync<'c, T, F>(&self, operation: &str, client_ip: Option<&str>, call: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + 'c,
    {
        let ctx = CallContext {
            operation,
            client_ip,
        };
        self.run_sync(self.advices(operation), ctx, Box::new(call))
    }

    fn run_sync<'c, T>(
        &self,
        advices: &[Advice],
        ctx: CallContext<'_>,
        call: Box<dyn FnOnce() -> Result<T> + 'c>,
    ) -> Result<T> {
        match advices.split_first() {
            None => call(),
            Some((Advice::CheckIp(guard), rest)) => {
                guard.check(ctx.client_ip_or_unknown())?;
                self.run_sync(rest, ctx, call)
            }
            Some((Advice::LogTrace, rest)) => self
                .interceptor
                .intercept(ctx.operation, || self.run_sync(rest, ctx, call)),
        }
    }
}

pub struct RegistryBuilder {
    policy: TracePolicy,
    declared: Vec<(String, Vec<AccessGuard>)>,
    interceptor: CallInterceptor,
}

impl RegistryBuilder {
    /// Declare an operation. It is traced if the policy selects it.
    pub fn operation(mut self, name: impl Into<String>) -> Self {
        self.entry(name.into());
        self
    }

    /// Declare an operation guarded by `guard`.
    pub fn check_ip(mut self, name: impl Into<String>, guard: AccessGuard) -> Self {
        self.entry(name.into()).push(guard);
        self
    }

    pub fn interceptor(mut self, interceptor: CallInterceptor) -> Self {
        self.interceptor = interceptor;
        self
    }

    fn entry(&mut self, name: String) -> &mut Vec<AccessGuard> {
        let idx = match self.declared.iter().position(|(n, _)| *n == name) {
            Some(idx) => idx,
            None => {
                self.declared.push((name, Vec::new()));
                self.declared.len() - 1
            }
        };
        &mut self.declared[idx].1
    }

    pub fn build(self) -> OperationRegistry {
        let mut operations = HashMap::with_capacity(self.declared.len());
        for (name, guards) in self.declared {
            let mut advices: Vec<Advice> = guards.into_iter().map(Advice::CheckIp).collect();
            if self.policy.selects(&name) {
                advices.push(Advice::LogTrace);
            }
            tracing::debug!(operation = %name, advices = advices.len(), "Operation registered");
            operations.insert(name, advices);
        }

        OperationRegistry {
            operations,
            interceptor: self.interceptor,
        }
    }
}
