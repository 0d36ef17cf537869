//! Cancellation and request-scoped values handed to command callbacks.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Canceled;

/// A cancellable context.
///
/// A context is cancelled when it, or any context it was derived from, is
/// cancelled. Values attached with [`Context::with_value`] are looked up by
/// type, nearest first.
#[derive(Clone, Default)]
pub struct Context {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    cancelled: Arc<AtomicBool>,
    value: Option<Arc<dyn Any + Send + Sync>>,
    parent: Option<Context>,
}

impl Context {
    /// A root context that is never cancelled on its own.
    pub fn background() -> Self {
        Self::default()
    }

    fn child(&self, cancelled: Arc<AtomicBool>, value: Option<Arc<dyn Any + Send + Sync>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled,
                value,
                parent: Some(self.clone()),
            }),
        }
    }

    /// Derives a context that can be cancelled through the returned handle.
    pub fn with_cancel(&self) -> (Context, CancelHandle) {
        let flag = Arc::new(AtomicBool::new(false));
        let handle = CancelHandle {
            flag: Arc::clone(&flag),
        };
        (self.child(flag, None), handle)
    }

    /// Derives a context carrying `value`.
    pub fn with_value<T: Any + Send + Sync>(&self, value: T) -> Context {
        self.child(Arc::new(AtomicBool::new(false)), Some(Arc::new(value)))
    }

    pub fn value<T: Any + Send + Sync>(&self) -> Option<&T> {
        let mut current = Some(self);
        while let Some(ctx) = current {
            if let Some(value) = ctx.inner.value.as_deref() {
                if let Some(value) = value.downcast_ref::<T>() {
                    return Some(value);
                }
            }
            current = ctx.inner.parent.as_ref();
        }
        None
    }

    pub fn is_cancelled(&self) -> bool {
        let mut current = Some(self);
        while let Some(ctx) = current {
            if ctx.inner.cancelled.load(Ordering::SeqCst) {
                return true;
            }
            current = ctx.inner.parent.as_ref();
        }
        false
    }

    /// `Err(Canceled)` once cancelled, so callbacks can bail out with `?`.
    pub fn err(&self) -> Result<(), Canceled> {
        if self.is_cancelled() {
            Err(Canceled)
        } else {
            Ok(())
        }
    }

    /// Derives a context that is cancelled when the process receives SIGINT.
    ///
    /// The subscription lives as long as the returned guard.
    pub fn with_interrupt(&self) -> (Context, InterruptGuard) {
        let (ctx, handle) = self.with_cancel();
        let guard = InterruptGuard::subscribe(handle.flag);
        (ctx, guard)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Cancels the context it was created with.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

/// Keeps a SIGINT subscription alive; dropping it unsubscribes.
///
/// While no guard is alive, SIGINT gets its default behavior and terminates
/// the process.
#[derive(Debug)]
pub struct InterruptGuard {
    #[cfg(unix)]
    id: Option<signal_hook::SigId>,
}

#[cfg(unix)]
mod interrupt {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::OnceLock;

    use signal_hook::consts::SIGINT;
    use signal_hook::low_level;

    /// Number of live subscriptions.
    static ACTIVE: AtomicUsize = AtomicUsize::new(0);
    static FALLBACK: OnceLock<()> = OnceLock::new();

    /// Installs, once per process, the action that falls back to the default
    /// disposition when nobody is subscribed.
    fn install_fallback() {
        FALLBACK.get_or_init(|| {
            // SAFETY: the action only reads an atomic and calls
            // `emulate_default_handler`, both async-signal-safe.
            let registered = unsafe {
                low_level::register(SIGINT, || {
                    if ACTIVE.load(Ordering::SeqCst) == 0 {
                        let _ = low_level::emulate_default_handler(SIGINT);
                    }
                })
            };
            if let Err(err) = registered {
                tracing::warn!(error = %err, "Failed to install SIGINT fallback");
            }
        });
    }

    pub(super) fn acquire() {
        ACTIVE.fetch_add(1, Ordering::SeqCst);
        install_fallback();
    }

    pub(super) fn release() {
        ACTIVE.fetch_sub(1, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub(super) fn active() -> usize {
        ACTIVE.load(Ordering::SeqCst)
    }
}

impl InterruptGuard {
    #[cfg(unix)]
    fn subscribe(flag: Arc<AtomicBool>) -> Self {
        use signal_hook::consts::SIGINT;

        interrupt::acquire();
        match signal_hook::flag::register(SIGINT, flag) {
            Ok(id) => Self { id: Some(id) },
            Err(err) => {
                interrupt::release();
                tracing::warn!(error = %err, "Failed to subscribe to SIGINT");
                Self { id: None }
            }
        }
    }

    #[cfg(not(unix))]
    fn subscribe(_flag: Arc<AtomicBool>) -> Self {
        Self {}
    }

    pub fn is_subscribed(&self) -> bool {
        #[cfg(unix)]
        {
            self.id.is_some()
        }
        #[cfg(not(unix))]
        {
            false
        }
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            if let Some(id) = self.id.take() {
                signal_hook::low_level::unregister(id);
                interrupt::release();
            }
        }
    }
}
