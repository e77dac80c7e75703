//! Monotonic CPU/GPU completion counter ("fence").

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{DemoError, Result};

/// A monotonically increasing value the GPU reports back once all work
/// queued before the matching `signal` has finished.
pub trait CompletionCounter {
    /// Last value handed out by `signal` (0 before the first signal)
    fn current(&self) -> u64;

    /// Highest value the GPU has reported as reached
    fn completed(&self) -> u64;

    /// Allocate the next value and ask the GPU to report it after all work
    /// submitted so far.
    fn signal(&mut self) -> u64;

    /// Block until `completed() >= value`.
    fn wait_until(&mut self, value: u64) -> Result<()>;
}

/// Completion counter backed by wgpu queue submissions.
///
/// `signal` closes the current submission and registers an
/// `on_submitted_work_done` callback that publishes the value; waiting polls
/// the device until the submission carrying that value has retired.
pub struct GpuCompletionCounter {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    current: u64,
    completed: Arc<AtomicU64>,
    /// Signalled values whose submission has not been observed as retired
    pending: VecDeque<(u64, wgpu::SubmissionIndex)>,
}

impl GpuCompletionCounter {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self {
            device,
            queue,
            current: 0,
            completed: Arc::new(AtomicU64::new(0)),
            pending: VecDeque::new(),
        }
    }

    fn retire_reached(&mut self) {
        let completed = self.completed();
        while self.pending.front().is_some_and(|(v, _)| *v <= completed) {
            self.pending.pop_front();
        }
    }
}

impl CompletionCounter for GpuCompletionCounter {
    fn current(&self) -> u64 {
        self.current
    }

    fn completed(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    fn signal(&mut self) -> u64 {
        self.current += 1;
        let value = self.current;

        // Empty submission marks the point in the queue the value stands for
        let index = self.queue.submit(std::iter::empty::<wgpu::CommandBuffer>());
        let completed = Arc::clone(&self.completed);
        self.queue.on_submitted_work_done(move || {
            completed.fetch_max(value, Ordering::AcqRel);
        });

        self.pending.push_back((value, index));
        self.retire_reached();
        value
    }

    fn wait_until(&mut self, value: u64) -> Result<()> {
        if self.completed() >= value {
            return Ok(());
        }

        log::trace!("Waiting for GPU fence {value} (completed {})", self.completed());

        while let Some((pending_value, index)) = self.pending.pop_front() {
            let _ = self.device.poll(wgpu::Maintain::WaitForSubmissionIndex(index));
            if pending_value >= value {
                break;
            }
        }
        // Callbacks for retired submissions run inside poll
        let _ = self.device.poll(wgpu::Maintain::Poll);

        let completed = self.completed();
        if completed >= value {
            Ok(())
        } else {
            Err(DemoError::FenceWait {
                target: value,
                completed,
            })
        }
    }
}

/// In-memory counter for tests: the "GPU" finishes work only when told to,
/// and every wait is recorded.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ManualCounter {
    pub current: u64,
    pub completed: u64,
    pub waits: Vec<u64>,
}

#[cfg(test)]
impl ManualCounter {
    /// Let the GPU catch up to `value`
    pub fn complete_up_to(&mut self, value: u64) {
        self.completed = self.completed.max(value.min(self.current));
    }
}

#[cfg(test)]
impl CompletionCounter for ManualCounter {
    fn current(&self) -> u64 {
        self.current
    }

    fn completed(&self) -> u64 {
        self.completed
    }

    fn signal(&mut self) -> u64 {
        self.current += 1;
        self.current
    }

    fn wait_until(&mut self, value: u64) -> Result<()> {
        self.waits.push(value);
        if value > self.current {
            return Err(DemoError::FenceWait {
                target: value,
                completed: self.completed,
            });
        }
        self.completed = self.completed.max(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_counter_is_monotonic() {
        let mut counter = ManualCounter::default();
        assert_eq!(counter.signal(), 1);
        assert_eq!(counter.signal(), 2);
        assert_eq!(counter.current(), 2);

        counter.complete_up_to(2);
        counter.complete_up_to(1);
        assert_eq!(counter.completed(), 2);
    }

    #[test]
    fn test_manual_counter_cannot_wait_on_unsignalled_value() {
        let mut counter = ManualCounter::default();
        counter.signal();

        assert!(counter.wait_until(1).is_ok());
        assert!(matches!(
            counter.wait_until(5),
            Err(DemoError::FenceWait { target: 5, .. })
        ));
    }

    fn gpu_counter() -> Option<GpuCompletionCounter> {
        let (device, queue) = crate::gpu::headless_device()?;
        Some(GpuCompletionCounter::new(Arc::new(device), Arc::new(queue)))
    }

    #[test]
    fn test_gpu_signal_increments_by_one() {
        let Some(mut counter) = gpu_counter() else {
            return;
        };

        assert_eq!(counter.current(), 0);
        assert_eq!(counter.signal(), 1);
        assert_eq!(counter.signal(), 2);
        assert_eq!(counter.signal(), 3);
        assert_eq!(counter.current(), 3);
        assert!(counter.completed() <= 3);
    }

    #[test]
    fn test_gpu_wait_reaches_signalled_value() {
        let Some(mut counter) = gpu_counter() else {
            return;
        };

        for _ in 0..4 {
            counter.signal();
        }
        let target = counter.signal();
        counter.wait_until(target).unwrap();

        assert!(counter.completed() >= target);
        assert!(counter.pending.is_empty());

        // Already reached: returns without touching the device
        counter.wait_until(2).unwrap();
    }

    #[test]
    fn test_gpu_wait_on_unsignalled_value_fails() {
        let Some(mut counter) = gpu_counter() else {
            return;
        };

        counter.signal();
        let target = counter.current() + 5;

        assert!(matches!(
            counter.wait_until(target),
            Err(DemoError::FenceWait { target: t, completed }) if t == target && completed < target
        ));
        assert!(counter.pending.is_empty());
    }
}
