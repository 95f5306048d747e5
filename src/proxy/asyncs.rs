//! Awaiting, async iteration and the async context-manager protocol.
//!
//! Awaiting a proxy resolves it once and then drives the stored future, so
//! `proxy.await` yields `Result<T::Output, LocalError>` and an unbound proxy
//! surfaces as an error instead of a panic.

use super::protocol::AsyncContextManager;
use super::{Op, Proxy};
use crate::error::LocalError;
use crate::shared::Shared;
use futures::future::poll_fn;
use futures::{FutureExt, Stream};
use std::future::{Future, IntoFuture};
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::debug;

/// Future returned by awaiting a proxy.
pub struct Awaiting<T> {
    target: Result<Shared<T>, LocalError>,
}

impl<T: Future + Unpin> Future for Awaiting<T> {
    type Output = Result<T::Output, LocalError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &self.target {
            Ok(cell) => Pin::new(&mut *cell.write()).poll(cx).map(Ok),
            Err(err) => Poll::Ready(Err(err.clone())),
        }
    }
}

impl<T: Future + Unpin> IntoFuture for Proxy<T> {
    type Output = Result<T::Output, LocalError>;
    type IntoFuture = Awaiting<T>;

    fn into_future(self) -> Awaiting<T> {
        (&self).into_future()
    }
}

impl<'a, T: Future + Unpin> IntoFuture for &'a Proxy<T> {
    type Output = Result<T::Output, LocalError>;
    type IntoFuture = Awaiting<T>;

    fn into_future(self) -> Awaiting<T> {
        Awaiting {
            target: self.bound(Op::Await),
        }
    }
}

/// Stream over a stored stream object, bound to the cell resolved when it
/// was created.
pub struct ProxyStream<T> {
    cell: Shared<T>,
}

impl<T: Stream + Unpin> Stream for ProxyStream<T> {
    type Item = T::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T::Item>> {
        Pin::new(&mut *self.cell.write()).poll_next(cx)
    }
}

impl<T> Proxy<T> {
    /// Drive a stored future to completion.
    pub async fn try_await(&self) -> Result<T::Output, LocalError>
    where
        T: Future + Unpin,
    {
        self.into_future().await
    }

    /// Async iteration over a stored stream.
    pub fn stream(&self) -> Result<ProxyStream<T>, LocalError>
    where
        T: Stream + Unpin,
    {
        self.bound(Op::AsyncIter).map(|cell| ProxyStream { cell })
    }

    /// Next item of a stored stream.
    pub async fn next_item(&self) -> Result<Option<T::Item>, LocalError>
    where
        T: Stream + Unpin,
    {
        let cell = self.bound(Op::AsyncIter)?;
        Ok(poll_fn(|cx| Pin::new(&mut *cell.write()).poll_next(cx)).await)
    }
}

/// Storage for an async context manager. The enter and exit hooks run
/// under this async lock, never under the proxy's cell lock, so they may
/// suspend while other tasks on the same thread keep resolving the proxy.
pub type AsyncCell<M> = Arc<tokio::sync::Mutex<M>>;

impl<M: AsyncContextManager> Proxy<AsyncCell<M>> {
    /// Run `body` between the target's async enter and exit. The target is
    /// resolved once. Neither lock is held while `body` runs. If `body`
    /// panics, exit runs with `failed = true` and the panic resumes.
    pub async fn with_async_context<F, Fut, R>(&self, body: F) -> Result<R, LocalError>
    where
        F: FnOnce(M::Entered) -> Fut,
        Fut: Future<Output = R>,
    {
        let manager = self.apply(Op::AsyncEnter, Arc::clone)?;
        let entered = manager.lock().await.enter().await;
        let outcome = AssertUnwindSafe(async move { body(entered).await })
            .catch_unwind()
            .await;
        match outcome {
            Ok(out) => {
                manager.lock().await.exit(false).await;
                debug!("Exited async context manager");
                Ok(out)
            }
            Err(payload) => {
                manager.lock().await.exit(true).await;
                debug!("Exited async context manager after panic");
                panic::resume_unwind(payload)
            }
        }
    }
}
