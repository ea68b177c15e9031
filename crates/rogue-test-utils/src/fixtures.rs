//! Reusable callback fixtures.
//!
//! - [`square_counter`]: writes `n²` on its n-th call (n from 0).
//! - [`counting`]: counts calls through a shared [`CallCounter`].
//! - [`failing_after`]: recoverable failure from the (n+1)-th call on.
//! - [`fatal_after`]: fatal failure from the (n+1)-th call on.
//! - [`panicking_after`]: panics from the (n+1)-th call on.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rogue_core::{CallbackError, ClientHandle};

/// Shared call counter readable from the test thread.
#[derive(Clone, Debug, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst)
    }
}

/// Writes `counter²` to `port`, then increments `counter` (starting at 0).
pub fn square_counter(
    port: &'static str,
) -> impl FnMut(&mut ClientHandle<'_>) -> Result<(), CallbackError> + Send + 'static {
    let mut counter: i64 = 0;
    move |client| {
        client.set_value(port, counter * counter)?;
        counter += 1;
        Ok(())
    }
}

/// Increments `calls` on every invocation.
pub fn counting(
    calls: CallCounter,
) -> impl FnMut(&mut ClientHandle<'_>) -> Result<(), CallbackError> + Send + 'static {
    move |_| {
        calls.bump();
        Ok(())
    }
}

/// Succeeds `succeed_count` times, then returns a recoverable failure on
/// every later call.
pub fn failing_after(
    succeed_count: usize,
    calls: CallCounter,
) -> impl FnMut(&mut ClientHandle<'_>) -> Result<(), CallbackError> + Send + 'static {
    move |_| {
        let n = calls.bump();
        if n >= succeed_count {
            return Err(CallbackError::failed(format!("call {n} failed")));
        }
        Ok(())
    }
}

/// Succeeds `succeed_count` times, then returns a fatal failure.
pub fn fatal_after(
    succeed_count: usize,
    calls: CallCounter,
) -> impl FnMut(&mut ClientHandle<'_>) -> Result<(), CallbackError> + Send + 'static {
    move |_| {
        let n = calls.bump();
        if n >= succeed_count {
            return Err(CallbackError::fatal(format!("call {n} failed fatally")));
        }
        Ok(())
    }
}

/// Succeeds `succeed_count` times, then panics.
pub fn panicking_after(
    succeed_count: usize,
    calls: CallCounter,
) -> impl FnMut(&mut ClientHandle<'_>) -> Result<(), CallbackError> + Send + 'static {
    move |_| {
        let n = calls.bump();
        if n >= succeed_count {
            panic!("callback panicked on call {n}");
        }
        Ok(())
    }
}
