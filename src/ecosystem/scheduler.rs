//! Timers owned by one simulation instance.
//!
//! Nothing here runs on its own: the simulation polls the scheduler from
//! `tick`, so every outstanding callback lives in this collection and is
//! dropped in one go by [`Scheduler::cancel_all`].

use super::effect::EffectId;
use super::pulse::PulseId;
use super::types::HubId;

/// Handle of a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Identifier of a celebratory message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CelebrationId(pub u64);

/// Work a timer hands back to the simulation when it fires.
#[derive(Clone, Debug, PartialEq)]
pub enum Task {
	/// Spawn a batch of pulses and re-arm with the current adaptive interval.
	SpawnPulses,
	/// Advance the progress of every live pulse.
	AdvancePulses,
	/// A pulse's lifetime ran out.
	RetirePulse(PulseId),
	/// An expansion's lifetime ran out.
	RemoveEffect(EffectId),
	/// A celebratory message's lifetime ran out.
	ExpireCelebration(CelebrationId),
	/// Spawn `count` dots at `hub`.
	AddDots {
		/// Target hub.
		hub: HubId,
		/// Dots in this batch.
		count: u32,
	},
}

#[derive(Clone, Debug)]
struct Timer {
	id: TimerId,
	due: f64,
	period: Option<f64>,
	task: Task,
}

/// Ordered collection of one-shot and repeating timers.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
	timers: Vec<Timer>,
	next_id: u64,
}

impl Scheduler {
	/// An empty scheduler.
	pub fn new() -> Self {
		Self::default()
	}

	/// Fire `task` once at `due`.
	pub fn once(&mut self, due: f64, task: Task) -> TimerId {
		self.insert(due, None, task)
	}

	/// Fire `task` at `first_due` and every `period` after that.
	pub fn every(&mut self, first_due: f64, period: f64, task: Task) -> TimerId {
		self.insert(first_due, Some(period.max(f64::EPSILON)), task)
	}

	fn insert(&mut self, due: f64, period: Option<f64>, task: Task) -> TimerId {
		let id = TimerId(self.next_id);
		self.next_id += 1;
		self.timers.push(Timer {
			id,
			due,
			period,
			task,
		});
		id
	}

	/// Drop a timer. Returns whether it was still pending.
	pub fn cancel(&mut self, id: TimerId) -> bool {
		let before = self.timers.len();
		self.timers.retain(|timer| timer.id != id);
		self.timers.len() != before
	}

	/// Drop every pending timer.
	pub fn cancel_all(&mut self) {
		self.timers.clear();
	}

	/// Number of pending timers.
	pub fn len(&self) -> usize {
		self.timers.len()
	}

	/// Whether no timer is pending.
	pub fn is_empty(&self) -> bool {
		self.timers.is_empty()
	}

	/// Whether `id` is still pending.
	pub fn is_pending(&self, id: TimerId) -> bool {
		self.timers.iter().any(|timer| timer.id == id)
	}

	/// Collect every task due at `now`, earliest first (ties in scheduling
	/// order). One-shot timers are consumed; a repeating timer fires at most
	/// once per poll and skips the periods it missed.
	pub fn poll(&mut self, now: f64) -> Vec<Task> {
		let mut due: Vec<(f64, TimerId, Task)> = Vec::new();
		self.timers.retain_mut(|timer| {
			if timer.due > now {
				return true;
			}
			due.push((timer.due, timer.id, timer.task.clone()));
			match timer.period {
				Some(period) => {
					while timer.due <= now {
						timer.due += period;
					}
					true
				}
				None => false,
			}
		});
		due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
		due.into_iter().map(|(_, _, task)| task).collect()
	}
}
