//! Handler registration and resolution.
//!
//! The registry is the statically-built table behind the name
//! convention in [`HandlerName`]: functions keyed by their full name,
//! action types keyed by `container#action`. It is populated once at
//! startup and shared read-only across requests.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use pylon_core::RoutingContext;

use crate::error::{HandlerError, InvalidHandlerName};
use crate::name::HandlerName;

/// Boxed future every handler ultimately produces.
pub type BoxedHandlerResult =
    Pin<Box<dyn Future<Output = Result<Bytes, HandlerError>> + Send>>;

/// A type-erased handler function.
pub type ErasedHandler = Arc<dyn Fn(RoutingContext) -> BoxedHandlerResult + Send + Sync>;

type ContextFactory = Arc<dyn Fn(&RoutingContext) -> Box<dyn Callable> + Send + Sync>;
type ZeroArgFactory = Arc<dyn Fn() -> Box<dyn Callable> + Send + Sync>;

/// A per-request action instance.
///
/// Implementors are constructed fresh for each request, either with no
/// arguments or with the request's [`RoutingContext`], and invoked
/// exactly once.
pub trait Callable: Send + Sync {
    /// Produces the response payload for the current request.
    fn call(&self, ctx: RoutingContext) -> BoxedHandlerResult;
}

/// Factories registered for one `container#action` name.
#[derive(Default)]
struct ActionEntry {
    with_context: Option<ContextFactory>,
    zero_arg: Option<ZeroArgFactory>,
}

/// A handler located by [`HandlerRegistry::resolve`], ready to invoke.
pub enum ResolvedHandler {
    /// A registered function.
    Function(ErasedHandler),

    /// A freshly constructed action instance.
    Instance(Box<dyn Callable>),
}

impl ResolvedHandler {
    /// Runs the handler to completion.
    ///
    /// # Errors
    ///
    /// Returns whatever [`HandlerError`] the handler produced,
    /// including parameter deserialization failures for typed
    /// functions.
    pub async fn invoke(self, ctx: RoutingContext) -> Result<Bytes, HandlerError> {
        match self {
            Self::Function(handler) => handler(ctx).await,
            Self::Instance(action) => action.call(ctx).await,
        }
    }
}

impl fmt::Debug for ResolvedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("ResolvedHandler::Function"),
            Self::Instance(_) => f.write_str("ResolvedHandler::Instance"),
        }
    }
}

/// Registry mapping handler names to application code.
///
/// Lookup is restricted to exactly what was registered. Names outside
/// the convention are rejected at registration time, and
/// [`resolve`](Self::resolve) returns `None` rather than erring when
/// nothing matches, leaving the caller to decide how to respond.
///
/// # Example
///
/// ```rust
/// use pylon_dispatch::HandlerRegistry;
///
/// let registry = HandlerRegistry::new();
/// assert!(registry.is_empty());
/// ```
#[derive(Default)]
pub struct HandlerRegistry {
    functions: HashMap<String, ErasedHandler>,
    actions: HashMap<String, ActionEntry>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
            actions: HashMap::new(),
        }
    }

    /// Registers a typed function handler.
    ///
    /// The request type is deserialized from the request's normalized
    /// parameters, and the response type is serialized to JSON. `name`
    /// must be a bare (`list`) or one-level dotted (`pets.list`)
    /// function name.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHandlerName`] when `name` is not a function
    /// name under the convention.
    pub fn register<Req, Res, F, Fut>(
        &mut self,
        name: impl Into<String>,
        handler: F,
    ) -> Result<(), InvalidHandlerName>
    where
        Req: DeserializeOwned + Send + 'static,
        Res: Serialize + Send + 'static,
        F: Fn(RoutingContext, Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Res, HandlerError>> + Send + 'static,
    {
        let name = name.into();
        if !matches!(HandlerName::parse(&name), Some(HandlerName::Function(_))) {
            return Err(InvalidHandlerName::new(name));
        }
        let handler = Arc::new(handler);
        let erased: ErasedHandler = Arc::new(move |ctx: RoutingContext| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let request: Req = serde_json::from_value(params_value(&ctx))
                    .map_err(|e| HandlerError::Deserialization(e.to_string()))?;
                let response = handler(ctx, request).await?;
                let bytes = serde_json::to_vec(&response)
                    .map_err(|e| HandlerError::Serialization(e.to_string()))?;
                Ok(Bytes::from(bytes))
            })
        });
        self.functions.insert(name, erased);
        Ok(())
    }

    /// Registers a function handler that ignores request parameters.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHandlerName`] when `name` is not a function
    /// name under the convention.
    pub fn register_no_params<Res, F, Fut>(
        &mut self,
        name: impl Into<String>,
        handler: F,
    ) -> Result<(), InvalidHandlerName>
    where
        Res: Serialize + Send + 'static,
        F: Fn(RoutingContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Res, HandlerError>> + Send + 'static,
    {
        let name = name.into();
        if !matches!(HandlerName::parse(&name), Some(HandlerName::Function(_))) {
            return Err(InvalidHandlerName::new(name));
        }
        let handler = Arc::new(handler);
        let erased: ErasedHandler = Arc::new(move |ctx: RoutingContext| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let response = handler(ctx).await?;
                let bytes = serde_json::to_vec(&response)
                    .map_err(|e| HandlerError::Serialization(e.to_string()))?;
                Ok(Bytes::from(bytes))
            })
        });
        self.functions.insert(name, erased);
        Ok(())
    }

    /// Registers a zero-argument constructor for a `container#action`
    /// name.
    ///
    /// Used as a fallback when no context-taking constructor is
    /// registered for the same name.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHandlerName`] when `name` is not an instance
    /// name under the convention.
    pub fn register_action<A, F>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) -> Result<(), InvalidHandlerName>
    where
        A: Callable + 'static,
        F: Fn() -> A + Send + Sync + 'static,
    {
        let name = name.into();
        if !matches!(HandlerName::parse(&name), Some(HandlerName::Instance { .. })) {
            return Err(InvalidHandlerName::new(name));
        }
        self.actions.entry(name).or_default().zero_arg =
            Some(Arc::new(move || Box::new(factory())));
        Ok(())
    }

    /// Registers a context-taking constructor for a `container#action`
    /// name.
    ///
    /// Preferred over a zero-argument constructor registered under the
    /// same name.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHandlerName`] when `name` is not an instance
    /// name under the convention.
    pub fn register_action_with_context<A, F>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) -> Result<(), InvalidHandlerName>
    where
        A: Callable + 'static,
        F: Fn(&RoutingContext) -> A + Send + Sync + 'static,
    {
        let name = name.into();
        if !matches!(HandlerName::parse(&name), Some(HandlerName::Instance { .. })) {
            return Err(InvalidHandlerName::new(name));
        }
        self.actions.entry(name).or_default().with_context =
            Some(Arc::new(move |ctx| Box::new(factory(ctx))));
        Ok(())
    }

    /// Resolves `name` to a ready-to-invoke handler.
    ///
    /// Function names look up the function table; instance names
    /// construct a fresh action, preferring a context-taking
    /// constructor when both are registered. Returns `None` for names
    /// outside the convention and for names nothing was registered
    /// under.
    #[must_use]
    pub fn resolve(&self, name: &str, ctx: &RoutingContext) -> Option<ResolvedHandler> {
        let Some(parsed) = HandlerName::parse(name) else {
            tracing::debug!(handler = name, "handler name outside the lookup convention");
            return None;
        };
        let resolved = match parsed {
            HandlerName::Function(key) => self
                .functions
                .get(key)
                .map(|handler| ResolvedHandler::Function(Arc::clone(handler))),
            HandlerName::Instance { .. } => self.actions.get(name).and_then(|entry| {
                if let Some(factory) = &entry.with_context {
                    Some(ResolvedHandler::Instance(factory(ctx)))
                } else {
                    entry
                        .zero_arg
                        .as_ref()
                        .map(|factory| ResolvedHandler::Instance(factory()))
                }
            }),
        };
        if resolved.is_none() {
            tracing::debug!(handler = name, "no handler registered under name");
        }
        resolved
    }

    /// Checks whether anything is registered under `name`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pylon_dispatch::HandlerRegistry;
    ///
    /// let registry = HandlerRegistry::new();
    /// assert!(!registry.contains("list"));
    /// ```
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name) || self.actions.contains_key(name)
    }

    /// Returns the number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len() + self.actions.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.actions.is_empty()
    }

    /// Returns an iterator over registered names, functions first.
    pub fn handler_names(&self) -> impl Iterator<Item = &str> {
        self.functions
            .keys()
            .chain(self.actions.keys())
            .map(String::as_str)
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn params_value(ctx: &RoutingContext) -> serde_json::Value {
    serde_json::Value::Object(ctx.normalized_params().clone().into_iter().collect())
}
