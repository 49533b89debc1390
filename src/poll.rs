//! Polling of long-running provider jobs (e.g. stem separation) that stops
//! when its owner goes away.

use std::future::Future;
use std::time::Duration;

use futures::future::{AbortHandle, Abortable, Aborted};
use log::{debug, warn};
use thiserror::Error;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollConfig {
	pub interval: Duration,
	pub max_attempts: u32,
}

impl Default for PollConfig {
	fn default() -> Self {
		Self {
			interval: DEFAULT_POLL_INTERVAL,
			max_attempts: DEFAULT_MAX_ATTEMPTS,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollStatus<T> {
	Pending,
	Ready(T),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollError<E> {
	#[error("job still pending after {attempts} attempts")]
	Exhausted { attempts: u32 },
	#[error("polling cancelled")]
	Cancelled,
	#[error("status check failed: {0}")]
	Check(E),
}

/// Calls `check` until it reports `Ready`, sleeping `config.interval`
/// between attempts. A failed check ends polling immediately.
pub async fn poll_job<T, E, C, CF, S, SF>(
	config: PollConfig,
	mut check: C,
	mut sleep: S,
) -> Result<T, PollError<E>>
where
	C: FnMut(u32) -> CF,
	CF: Future<Output = Result<PollStatus<T>, E>>,
	S: FnMut(Duration) -> SF,
	SF: Future<Output = ()>,
{
	for attempt in 1..=config.max_attempts {
		match check(attempt).await.map_err(PollError::Check)? {
			PollStatus::Ready(value) => {
				debug!("job ready after {} attempt(s)", attempt);
				return Ok(value);
			}
			PollStatus::Pending if attempt < config.max_attempts => sleep(config.interval).await,
			PollStatus::Pending => {}
		}
	}
	warn!("job still pending after {} attempts", config.max_attempts);
	Err(PollError::Exhausted {
		attempts: config.max_attempts,
	})
}

/// Cancels the spawned poll when dropped.
#[must_use = "dropping the handle cancels polling"]
pub struct PollHandle {
	abort: AbortHandle,
}

impl PollHandle {
	pub fn cancel(&self) {
		self.abort.abort();
	}
}

impl Drop for PollHandle {
	fn drop(&mut self) {
		self.abort.abort();
	}
}

fn cancellable<F, T, E>(task: F) -> (impl Future<Output = Result<T, PollError<E>>>, PollHandle)
where
	F: Future<Output = Result<T, PollError<E>>>,
{
	let (abort, registration) = AbortHandle::new_pair();
	let task = Abortable::new(task, registration);
	let wrapped = async move {
		match task.await {
			Ok(result) => result,
			Err(Aborted) => {
				debug!("poll cancelled");
				Err(PollError::Cancelled)
			}
		}
	};
	(wrapped, PollHandle { abort })
}

/// Runs [`poll_job`] on the browser task queue using real timers.
/// `on_done` receives `Err(PollError::Cancelled)` if the handle is cancelled
/// or dropped first.
pub fn spawn_poll<T, E, C, CF, D>(config: PollConfig, check: C, on_done: D) -> PollHandle
where
	T: 'static,
	E: 'static,
	C: FnMut(u32) -> CF + 'static,
	CF: Future<Output = Result<PollStatus<T>, E>> + 'static,
	D: FnOnce(Result<T, PollError<E>>) + 'static,
{
	let sleep = |interval: Duration| {
		gloo_timers::future::TimeoutFuture::new(interval.as_millis().min(u32::MAX as u128) as u32)
	};
	let (task, handle) = cancellable(poll_job(config, check, sleep));
	leptos::task::spawn_local(async move {
		on_done(task.await);
	});
	handle
}

#[cfg(test)]
mod tests {
	use std::cell::{Cell, RefCell};

	use futures::executor::block_on;
	use futures::future::{pending, ready};

	use super::*;

	fn quick(max_attempts: u32) -> PollConfig {
		PollConfig {
			interval: Duration::from_millis(1),
			max_attempts,
		}
	}

	#[test]
	fn defaults_match_provider_cadence() {
		let config = PollConfig::default();
		assert_eq!(config.interval, Duration::from_secs(5));
		assert_eq!(config.max_attempts, 60);
	}

	#[test]
	fn returns_first_ready_value_and_sleeps_between_checks() {
		let sleeps = Cell::new(0);
		let result: Result<&str, PollError<()>> = block_on(poll_job(
			quick(10),
			|attempt| {
				ready(Ok(if attempt == 3 {
					PollStatus::Ready("stems")
				} else {
					PollStatus::Pending
				}))
			},
			|_| {
				sleeps.set(sleeps.get() + 1);
				ready(())
			},
		));
		assert_eq!(result, Ok("stems"));
		assert_eq!(sleeps.get(), 2);
	}

	#[test]
	fn gives_up_at_the_attempt_cap() {
		let calls = Cell::new(0);
		let sleeps = Cell::new(0);
		let result: Result<(), PollError<()>> = block_on(poll_job(
			quick(4),
			|_| {
				calls.set(calls.get() + 1);
				ready(Ok(PollStatus::Pending))
			},
			|_| {
				sleeps.set(sleeps.get() + 1);
				ready(())
			},
		));
		assert_eq!(result, Err(PollError::Exhausted { attempts: 4 }));
		assert_eq!(calls.get(), 4);
		assert_eq!(sleeps.get(), 3);
	}

	#[test]
	fn check_failure_stops_immediately() {
		let calls = Cell::new(0);
		let result: Result<(), PollError<String>> = block_on(poll_job(
			quick(60),
			|_| {
				calls.set(calls.get() + 1);
				ready(Err("upstream 502".to_string()))
			},
			|_| ready(()),
		));
		assert_eq!(result, Err(PollError::Check("upstream 502".to_string())));
		assert_eq!(calls.get(), 1);
		assert_eq!(
			PollError::Check("upstream 502").to_string(),
			"status check failed: upstream 502"
		);
	}

	#[test]
	fn cancelling_the_handle_ends_a_waiting_poll() {
		let checks = RefCell::new(Vec::new());
		let (task, handle) = cancellable(poll_job(
			quick(60),
			|attempt| {
				checks.borrow_mut().push(attempt);
				ready(Ok::<_, ()>(PollStatus::<()>::Pending))
			},
			|_| pending::<()>(),
		));
		handle.cancel();
		assert_eq!(block_on(task), Err(PollError::Cancelled));
		assert!(checks.borrow().len() <= 1);
	}

	#[test]
	fn dropping_the_handle_cancels() {
		let (task, handle) = cancellable(poll_job(
			quick(60),
			|_| ready(Ok::<_, ()>(PollStatus::<u8>::Pending)),
			|_| pending::<()>(),
		));
		drop(handle);
		assert_eq!(block_on(task), Err(PollError::Cancelled));
	}
}
