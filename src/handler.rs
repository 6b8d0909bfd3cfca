//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! A route holds an ordered list of handlers of *different* concrete types,
//! and the global middleware list is prepended to it on every request. Rust
//! collections hold one type, so each handler is erased behind
//! `dyn ErasedHandler<E>` at registration time and stored as an `Arc`.
//!
//! ```text
//! async fn auth(cx: Context<E>) -> Result<(), BoxError> { … }   ← user writes this
//!        ↓ router.get("/", (auth, show))
//! auth.into_boxed_handler()                                     ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(auth))                                     ← stored as BoxedHandler<E>
//!        ↓
//! handler.call(cx)  at request time                             ← one vtable dispatch
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::error::BoxError;

/// What every handler (and every call to [`Context::next`]) resolves to.
pub type HandlerResult = Result<(), BoxError>;

/// A heap-allocated, type-erased handler future.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` because it appears in the return type of the public
/// `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler<E> {
    fn call(&self, cx: Context<E>) -> BoxFuture;
}

#[doc(hidden)]
pub type BoxedHandler<E> = Arc<dyn ErasedHandler<E> + Send + Sync + 'static>;

/// Implemented for every valid handler.
///
/// You never implement this yourself. It is satisfied by any function or
/// closure with the shape:
///
/// ```text
/// async fn name(cx: Context<E>) -> Result<(), BoxError>
/// ```
///
/// A handler either calls `cx.next().await?` to run the rest of the chain,
/// or returns without calling it to end the chain early.
pub trait Handler<E>: private::Sealed<E> + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler<E>;
}

mod private {
    pub trait Sealed<E> {}
}

impl<E, F, Fut> private::Sealed<E> for F
where
    F: Fn(Context<E>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
}

impl<E, F, Fut> Handler<E> for F
where
    E: Send + Sync + 'static,
    F: Fn(Context<E>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler<E> {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<E, F, Fut> ErasedHandler<E> for FnHandler<F>
where
    F: Fn(Context<E>) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, cx: Context<E>) -> BoxFuture {
        Box::pin((self.0)(cx))
    }
}

/// One handler, or a tuple of handlers run left to right.
///
/// This is how registration methods accept a variable number of handlers:
///
/// ```rust,ignore
/// router.get("/users/:id", show_user)
///       .post("/users", (require_auth, validate, create_user))
/// ```
///
/// `M` only tells the single-handler impl apart from the tuple impls; it is
/// always inferred.
pub trait IntoHandlers<E, M> {
    #[doc(hidden)]
    fn into_handlers(self) -> Vec<BoxedHandler<E>>;
}

impl<E, H: Handler<E>> IntoHandlers<E, ()> for H {
    fn into_handlers(self) -> Vec<BoxedHandler<E>> {
        vec![self.into_boxed_handler()]
    }
}

macro_rules! tuple_handlers {
    ($($h:ident),+) => {
        impl<E, $($h: Handler<E>),+> IntoHandlers<E, ($($h,)+)> for ($($h,)+) {
            #[allow(non_snake_case)]
            fn into_handlers(self) -> Vec<BoxedHandler<E>> {
                let ($($h,)+) = self;
                vec![$($h.into_boxed_handler()),+]
            }
        }
    };
}

tuple_handlers!(H1);
tuple_handlers!(H1, H2);
tuple_handlers!(H1, H2, H3);
tuple_handlers!(H1, H2, H3, H4);
tuple_handlers!(H1, H2, H3, H4, H5);
tuple_handlers!(H1, H2, H3, H4, H5, H6);
tuple_handlers!(H1, H2, H3, H4, H5, H6, H7);
tuple_handlers!(H1, H2, H3, H4, H5, H6, H7, H8);

#[cfg(test)]
mod tests {
    use super::*;

    async fn one(_cx: Context<()>) -> HandlerResult { Ok(()) }
    async fn two(cx: Context<()>) -> HandlerResult { cx.next().await }

    fn expand<M>(handlers: impl IntoHandlers<(), M>) -> usize {
        handlers.into_handlers().len()
    }

    #[test]
    fn single_handler_expands_to_one() {
        assert_eq!(expand(one), 1);
    }

    #[test]
    fn tuples_expand_in_order() {
        assert_eq!(expand((one, two, one)), 3);
    }

    #[test]
    fn closures_are_handlers() {
        let h = |cx: Context<()>| async move {
            cx.res().text("hi");
            Ok::<_, BoxError>(())
        };
        assert_eq!(expand(h), 1);
    }
}
