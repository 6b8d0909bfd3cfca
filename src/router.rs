//! Registration surface.
//!
//! A [`Router`] only exists during setup. Every call consumes and returns it,
//! so registrations chain naturally; [`Router::build`] freezes everything into
//! an [`App`] that serves requests and can no longer be changed.

use http::Method;

use crate::app::App;
use crate::cors::{Cors, CorsConfig};
use crate::handler::{BoxedHandler, IntoHandlers};
use crate::method::MethodFilter;
use crate::table::RouteTable;

/// The application router, generic over the caller environment `E` that
/// handlers receive through [`Context::env`](crate::Context::env).
///
/// ```rust,no_run
/// # use waypost::{BoxError, Context, CorsConfig, Router};
/// # async fn auth(cx: Context<()>) -> Result<(), BoxError> { cx.next().await }
/// # async fn get_user(_: Context<()>) -> Result<(), BoxError> { Ok(()) }
/// # async fn create_user(_: Context<()>) -> Result<(), BoxError> { Ok(()) }
/// # async fn fallback(_: Context<()>) -> Result<(), BoxError> { Ok(()) }
/// let app = Router::new()
///     .middleware(waypost::middleware::trace)
///     .cors(CorsConfig::default())
///     .get("/users/:id", get_user)
///     .post("/users", (auth, create_user))
///     .any("*", fallback)
///     .build();
/// ```
pub struct Router<E = ()> {
    table: RouteTable<E>,
    global: Vec<BoxedHandler<E>>,
    cors: Option<Cors>,
    debug: bool,
}

macro_rules! method_routes {
    ($($name:ident => $method:ident),+ $(,)?) => {
        $(
            #[doc = concat!("Registers handlers for `", stringify!($method), "` requests to `pattern`.")]
            pub fn $name<M>(self, pattern: &str, handlers: impl IntoHandlers<E, M>) -> Self {
                self.add(MethodFilter::Only(Method::$method), pattern, handlers)
            }
        )+
    };
}

impl<E: Send + Sync + 'static> Router<E> {
    pub fn new() -> Self {
        Self { table: RouteTable::new(), global: Vec::new(), cors: None, debug: false }
    }

    method_routes! {
        connect => CONNECT,
        delete  => DELETE,
        get     => GET,
        head    => HEAD,
        options => OPTIONS,
        patch   => PATCH,
        post    => POST,
        put     => PUT,
        trace   => TRACE,
    }

    /// Registers handlers for every method.
    ///
    /// With the pattern `*` this is the catch-all route, used only when no
    /// other route matches.
    pub fn any<M>(self, pattern: &str, handlers: impl IntoHandlers<E, M>) -> Self {
        self.add(MethodFilter::Any, pattern, handlers)
    }

    /// Registers handlers for an arbitrary method, including extension
    /// methods such as `PURGE`.
    pub fn route<M>(self, method: Method, pattern: &str, handlers: impl IntoHandlers<E, M>) -> Self {
        self.add(MethodFilter::Only(method), pattern, handlers)
    }

    /// Appends global handlers. They run before the route's own handlers on
    /// every matched request, in the order they were added across all calls.
    pub fn middleware<M>(mut self, handlers: impl IntoHandlers<E, M>) -> Self {
        self.global.extend(handlers.into_handlers());
        self
    }

    /// Includes diagnostics in error responses: the 404 reason and the error
    /// chain of a 500. Off unless enabled; `debug(true)` turns it on.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Enables CORS with `config`.
    ///
    /// # Panics
    ///
    /// Panics if a configured value is not a valid header value or status code.
    pub fn cors(mut self, config: CorsConfig) -> Self {
        self.cors = Some(Cors::new(config));
        self
    }

    /// Ends registration.
    pub fn build(self) -> App<E> {
        App::new(self.table, self.global.into(), self.cors, self.debug)
    }

    fn add<M>(mut self, method: MethodFilter, pattern: &str, handlers: impl IntoHandlers<E, M>) -> Self {
        self.table.push(method, pattern, handlers.into_handlers());
        self
    }
}

impl<E: Send + Sync + 'static> Default for Router<E> {
    fn default() -> Self { Self::new() }
}
