//! Handler system.
//!
//! A handler is any async function whose parameters implement
//! [`FromInvocation`] and whose return type implements [`IntoOutcome`]:
//!
//! ```rust,ignore
//! async fn ping(bot: BotHandle) {
//!     bot.say("pong");
//! }
//!
//! async fn echo(trigger: Arc<Trigger>) -> Option<String> {
//!     trigger.group(2).map(str::to_string)
//! }
//!
//! async fn ticket(bot: BotHandle, url: UrlMatch) -> Outcome {
//!     bot.say(&format!("ticket {}", url.group(1).unwrap_or("?")));
//!     Outcome::NoLimit
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::{error, warn};

use crate::extract::{FromInvocation, Invocation};
use crate::handle::BotHandle;

// ============================================================================
// Outcome
// ============================================================================

/// What a completed handler reports back to the dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Outcome {
    /// The call counts against rate limits as usual.
    #[default]
    Done,
    /// The call should not count against rate limits.
    NoLimit,
}

/// A handler return value that can be turned into an [`Outcome`].
pub trait IntoOutcome: Send {
    /// Performs any output the value implies and returns the outcome.
    fn into_outcome(self, bot: &BotHandle) -> Outcome;
}

impl IntoOutcome for () {
    fn into_outcome(self, _bot: &BotHandle) -> Outcome {
        Outcome::Done
    }
}

impl IntoOutcome for Outcome {
    fn into_outcome(self, _bot: &BotHandle) -> Outcome {
        self
    }
}

/// Says the string where the trigger came from.
impl IntoOutcome for String {
    fn into_outcome(self, bot: &BotHandle) -> Outcome {
        bot.say(&self);
        Outcome::Done
    }
}

impl<T: IntoOutcome> IntoOutcome for Option<T> {
    fn into_outcome(self, bot: &BotHandle) -> Outcome {
        match self {
            Some(t) => t.into_outcome(bot),
            None => Outcome::Done,
        }
    }
}

/// Logs the error and completes normally.
impl<T: IntoOutcome, E: fmt::Display + Send> IntoOutcome for Result<T, E> {
    fn into_outcome(self, bot: &BotHandle) -> Outcome {
        match self {
            Ok(t) => t.into_outcome(bot),
            Err(e) => {
                error!(
                    nick = %bot.trigger().nick(),
                    sender = %bot.trigger().sender(),
                    "Handler error: {e}"
                );
                Outcome::Done
            }
        }
    }
}

// ============================================================================
// Handler Trait
// ============================================================================

/// An async function usable as the body of a [`Callable`](crate::Callable).
///
/// Implemented for functions of up to four [`FromInvocation`] parameters.
#[async_trait]
pub trait Handler<T>: Clone + Send + Sync + 'static {
    /// Calls the handler.
    async fn call(self, inv: Arc<Invocation>) -> Outcome;
}

/// A type-erased handler.
pub type BoxedHandler = Arc<dyn Fn(Arc<Invocation>) -> BoxFuture<'static, Outcome> + Send + Sync>;

/// Erases a handler's type.
pub fn into_handler<H, T>(handler: H) -> BoxedHandler
where
    H: Handler<T>,
    T: 'static,
{
    Arc::new(move |inv| handler.clone().call(inv))
}

macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case)]
        #[async_trait]
        impl<F, Fut, Res, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: FnOnce($($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: IntoOutcome + 'static,
            $( $ty: FromInvocation + Send + 'static, )*
        {
            async fn call(self, inv: Arc<Invocation>) -> Outcome {
                $(
                    let $ty = match $ty::from_invocation(&inv) {
                        Ok(value) => value,
                        Err(e) => {
                            warn!("Skipping handler, argument unavailable: {e}");
                            return Outcome::Done;
                        }
                    };
                )*

                let res = (self)($($ty,)*).await;
                res.into_outcome(inv.bot())
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
