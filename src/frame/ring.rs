//! Fixed ring of frame resources guarded by completion values.

use super::counter::CompletionCounter;
use crate::error::Result;

/// One ring entry: the frame's resources and the completion value that
/// must be reached before the CPU may touch them again.
#[derive(Debug)]
pub struct FrameSlot<R> {
    /// Counter value signalled after this slot's last submission (0 = never used)
    pub fence: u64,
    pub resources: R,
}

/// Rotates through `depth` frame slots so the CPU can prepare frame N+1
/// while the GPU still executes frame N.
///
/// The only blocking point is `acquire_next_slot`: it waits when the slot
/// about to be reused still has work in flight, which bounds the GPU lag to
/// `depth - 1` frames.
#[derive(Debug)]
pub struct FrameResourceRing<R> {
    slots: Vec<FrameSlot<R>>,
    /// Slot of the frame being prepared
    current: usize,
    /// Slot the next acquire selects
    next: usize,
    frames_acquired: u64,
}

impl<R> FrameResourceRing<R> {
    /// Build a ring of `depth` slots, creating each slot's resources with `create`.
    pub fn new<F>(depth: usize, mut create: F) -> Result<Self>
    where
        F: FnMut(usize) -> Result<R>,
    {
        assert!(depth > 0, "frame ring needs at least one slot");

        let slots = (0..depth)
            .map(|index| {
                Ok(FrameSlot {
                    fence: 0,
                    resources: create(index)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            slots,
            current: 0,
            next: 0,
            frames_acquired: 0,
        })
    }

    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    /// Index of the slot being prepared
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn frames_acquired(&self) -> u64 {
        self.frames_acquired
    }

    /// Move to the next slot, blocking until the GPU has retired the work
    /// last submitted from it.
    pub fn acquire_next_slot<C>(&mut self, counter: &mut C) -> Result<&mut FrameSlot<R>>
    where
        C: CompletionCounter + ?Sized,
    {
        self.current = self.next;
        self.next = (self.next + 1) % self.slots.len();
        self.frames_acquired += 1;

        let slot = &mut self.slots[self.current];
        if slot.fence != 0 && counter.completed() < slot.fence {
            log::trace!(
                "Frame slot {} busy until fence {} (completed {})",
                self.current,
                slot.fence,
                counter.completed()
            );
            counter.wait_until(slot.fence)?;
        }

        Ok(slot)
    }

    pub fn current(&self) -> &FrameSlot<R> {
        &self.slots[self.current]
    }

    pub fn current_mut(&mut self) -> &mut FrameSlot<R> {
        &mut self.slots[self.current]
    }

    /// Record the completion value signalled after the current slot's submission
    pub fn stamp_current(&mut self, fence: u64) {
        debug_assert!(fence >= self.slots[self.current].fence, "fence values must not go back");
        self.slots[self.current].fence = fence;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DemoError;
    use crate::frame::ManualCounter;

    fn ring(depth: usize) -> FrameResourceRing<usize> {
        FrameResourceRing::new(depth, |index| Ok(index)).unwrap()
    }

    #[test]
    fn test_slot_is_frame_index_mod_depth() {
        let mut ring = ring(3);
        let mut counter = ManualCounter::default();

        for frame in 0..10usize {
            let slot = ring.acquire_next_slot(&mut counter).unwrap();
            assert_eq!(slot.resources, frame % 3);
            assert_eq!(ring.current_index(), frame % 3);

            let fence = counter.signal();
            ring.stamp_current(fence);
            counter.complete_up_to(fence);
        }
        assert_eq!(ring.frames_acquired(), 10);
    }

    #[test]
    fn test_no_wait_while_gpu_keeps_up() {
        let mut ring = ring(3);
        let mut counter = ManualCounter::default();

        for _ in 0..9 {
            ring.acquire_next_slot(&mut counter).unwrap();
            let fence = counter.signal();
            ring.stamp_current(fence);
            counter.complete_up_to(fence);
        }
        assert!(counter.waits.is_empty());
    }

    #[test]
    fn test_waits_for_slot_fence_when_gpu_lags() {
        let mut ring = ring(3);
        let mut counter = ManualCounter::default();

        // GPU never finishes on its own: first lap is free, then every
        // acquire waits on the fence stamped one lap earlier
        for _ in 0..7 {
            ring.acquire_next_slot(&mut counter).unwrap();
            let fence = counter.signal();
            ring.stamp_current(fence);
        }
        assert_eq!(counter.waits, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_failed_construction_propagates() {
        let result = FrameResourceRing::<usize>::new(3, |index| {
            if index == 2 {
                Err(DemoError::NoAdapter)
            } else {
                Ok(index)
            }
        });
        assert!(matches!(result, Err(DemoError::NoAdapter)));
    }

    #[test]
    fn test_wait_failure_propagates() {
        let mut ring = ring(1);
        let mut counter = ManualCounter::default();

        ring.acquire_next_slot(&mut counter).unwrap();
        // Stamp a value the counter never handed out
        ring.stamp_current(42);

        assert!(matches!(
            ring.acquire_next_slot(&mut counter),
            Err(DemoError::FenceWait { target: 42, .. })
        ));
    }
}
