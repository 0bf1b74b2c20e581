//! Deferred values.
//!
//! An [`Output`] is a handle for a value that may only be known once the
//! engine has realized some upstream resource or answered a provider function
//! call. Outputs never suspend: they record their dependencies and a pure
//! evaluation function, and the engine evaluates them through a [`Resolve`]
//! implementation once every dependency has been realized.
//!
//! ```text
//!   Output::property(account, "name") ─┐
//!                                       ├─ zip ─ map(|(a, b)| ..) ─▶ Output<String>
//!   Output::known("sqldb")  ───────────┘
//! ```
//!
//! Secrets are sticky: combining a secret with anything yields a secret.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    error::{DomainError, DomainResult},
    input::Input,
    resource::{Function, Urn},
};

/// A provider function call with fully resolved arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub function: Function,
    pub args: Value,
}

impl FunctionCall {
    /// Stable key used to memoize identical calls.
    pub fn cache_key(&self) -> String {
        format!("{}({})", self.function.token(), self.args)
    }
}

/// Source of realized values, implemented by the engine.
pub trait Resolve {
    /// An output property of a realized resource.
    fn property(&self, urn: &Urn, key: &str) -> DomainResult<Value>;

    /// Result of a provider function call.
    fn invoke(&self, call: &FunctionCall) -> DomainResult<Value>;
}

/// Resolver that knows nothing. Used for previews: anything that is not a
/// plain known value evaluates to [`DomainError::Unknown`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Unresolved;

impl Resolve for Unresolved {
    fn property(&self, urn: &Urn, key: &str) -> DomainResult<Value> {
        Err(DomainError::Unknown {
            what: format!("{}.{}", urn.name(), key),
        })
    }

    fn invoke(&self, call: &FunctionCall) -> DomainResult<Value> {
        Err(DomainError::Unknown {
            what: call.function.token().to_string(),
        })
    }
}

type Eval<T> = Arc<dyn Fn(&dyn Resolve) -> DomainResult<T> + Send + Sync>;

/// Deferred value handle.
pub struct Output<T> {
    eval: Eval<T>,
    deps: BTreeSet<Urn>,
    secret: bool,
}

impl<T> Clone for Output<T> {
    fn clone(&self) -> Self {
        Self {
            eval: Arc::clone(&self.eval),
            deps: self.deps.clone(),
            secret: self.secret,
        }
    }
}

impl<T> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("deps", &self.deps)
            .field("secret", &self.secret)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> Output<T> {
    /// A value that is already known at declaration time.
    pub fn known(value: T) -> Self {
        Self {
            eval: Arc::new(move |_: &dyn Resolve| Ok(value.clone())),
            deps: BTreeSet::new(),
            secret: false,
        }
    }
}

impl<T: Send + Sync + 'static> Output<T> {
    fn from_parts(eval: Eval<T>, deps: BTreeSet<Urn>, secret: bool) -> Self {
        Self { eval, deps, secret }
    }

    /// Resources that must be realized before this value can be resolved.
    pub fn dependencies(&self) -> &BTreeSet<Urn> {
        &self.deps
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }

    /// Mark this value as secret.
    pub fn as_secret(mut self) -> Self {
        self.secret = true;
        self
    }

    /// Evaluate against realized state.
    pub fn resolve(&self, resolver: &dyn Resolve) -> DomainResult<T> {
        (self.eval)(resolver)
    }

    pub fn map<U, F>(self, f: F) -> Output<U>
    where
        U: Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let eval = self.eval;
        Output::from_parts(
            Arc::new(move |r: &dyn Resolve| eval(r).map(&f)),
            self.deps,
            self.secret,
        )
    }

    pub fn try_map<U, F>(self, f: F) -> Output<U>
    where
        U: Send + Sync + 'static,
        F: Fn(T) -> DomainResult<U> + Send + Sync + 'static,
    {
        let eval = self.eval;
        Output::from_parts(
            Arc::new(move |r: &dyn Resolve| eval(r).and_then(&f)),
            self.deps,
            self.secret,
        )
    }

    pub fn zip<U>(self, other: Output<U>) -> Output<(T, U)>
    where
        U: Send + Sync + 'static,
    {
        let mut deps = self.deps;
        deps.extend(other.deps);
        let (left, right) = (self.eval, other.eval);
        Output::from_parts(
            Arc::new(move |r: &dyn Resolve| -> DomainResult<(T, U)> {
                Ok((left(r)?, right(r)?))
            }),
            deps,
            self.secret || other.secret,
        )
    }
}

/// Combine many outputs into one list, preserving order.
pub fn all<T: Send + Sync + 'static>(outputs: Vec<Output<T>>) -> Output<Vec<T>> {
    let deps = outputs.iter().flat_map(|o| o.deps.iter().cloned()).collect();
    let secret = outputs.iter().any(|o| o.secret);
    let evals: Vec<Eval<T>> = outputs.into_iter().map(|o| o.eval).collect();
    Output::from_parts(
        Arc::new(move |r: &dyn Resolve| {
            evals.iter().map(|e| e(r)).collect::<DomainResult<Vec<T>>>()
        }),
        deps,
        secret,
    )
}

impl Output<Value> {
    /// Output property `key` of the resource identified by `urn`.
    pub fn property(urn: Urn, key: impl Into<String>) -> Self {
        let key = key.into();
        let target = urn.clone();
        Self::from_parts(
            Arc::new(move |r: &dyn Resolve| r.property(&target, &key)),
            BTreeSet::from([urn]),
            false,
        )
    }

    /// Result of calling a provider function with (possibly deferred) arguments.
    pub fn invoke(function: Function, args: Input) -> Self {
        let deps = args.dependencies();
        let secret = args.is_secret();
        Self::from_parts(
            Arc::new(move |r: &dyn Resolve| {
                let call = FunctionCall {
                    function,
                    args: args.resolve(r)?,
                };
                r.invoke(&call)
            }),
            deps,
            secret,
        )
    }

    /// Field `key` of an object value.
    pub fn field(self, key: &'static str) -> Output<Value> {
        self.try_map(move |v| {
            v.get(key).cloned().ok_or_else(|| DomainError::ResolutionFailed {
                what: key.to_string(),
                reason: "field not present in result".into(),
            })
        })
    }

    /// Interpret the value as a string.
    pub fn as_string(self) -> Output<String> {
        self.try_map(|v| match v {
            Value::String(s) => Ok(s),
            other => Err(DomainError::TypeMismatch {
                what: other.to_string(),
                expected: "a string",
            }),
        })
    }
}

impl Output<String> {
    /// Concatenate string parts, known or deferred.
    pub fn concat(parts: impl IntoIterator<Item = Output<String>>) -> Output<String> {
        all(parts.into_iter().collect()).map(|parts| parts.concat())
    }
}

impl From<&str> for Output<String> {
    fn from(value: &str) -> Self {
        Output::known(value.to_string())
    }
}

impl From<String> for Output<String> {
    fn from(value: String) -> Self {
        Output::known(value)
    }
}
