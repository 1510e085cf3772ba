use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// A counting semaphore over worker threads.
///
/// Permits are granted in the order `acquire` is called by a single
/// dispatcher, and return their threads when dropped.
#[derive(Debug)]
pub(crate) struct ThreadBudget {
    capacity: usize,
    in_use: Mutex<usize>,
    freed: Condvar,
}

impl ThreadBudget {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: usize::max(1, capacity),
            in_use: Mutex::new(0),
            freed: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_use(&self) -> usize {
        *self.in_use.lock()
    }

    /// Blocks until `want` threads (clamped to the capacity) are free.
    /// Returns `None` once `stop` is set or `deadline` has passed.
    pub fn acquire(&self, want: usize, deadline: Option<Instant>, stop: &AtomicBool) -> Option<Permit<'_>> {
        let want = want.clamp(1, self.capacity);
        let mut in_use = self.in_use.lock();
        loop {
            if stop.load(Ordering::Acquire) {
                return None;
            }
            if deadline.map_or(false, |d| Instant::now() >= d) {
                return None;
            }
            if *in_use + want <= self.capacity {
                *in_use += want;
                return Some(Permit {
                    budget: self,
                    threads: want,
                });
            }
            match deadline {
                Some(d) => {
                    self.freed.wait_until(&mut in_use, d);
                }
                None => self.freed.wait(&mut in_use),
            }
        }
    }

    /// Wakes every waiter so it can observe a stop request.
    pub fn wake_all(&self) {
        let _guard = self.in_use.lock();
        self.freed.notify_all();
    }
}

/// Threads held from a [`ThreadBudget`] until dropped.
#[derive(Debug)]
pub(crate) struct Permit<'a> {
    budget: &'a ThreadBudget,
    threads: usize,
}

impl Permit<'_> {
    pub fn threads(&self) -> usize {
        self.threads
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        let mut in_use = self.budget.in_use.lock();
        *in_use -= self.threads;
        self.budget.freed.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_budget_clamps_and_releases() {
        let budget = ThreadBudget::new(4);
        let stop = AtomicBool::new(false);

        let a = budget.acquire(3, None, &stop).unwrap();
        assert_eq!(a.threads(), 3);
        let b = budget.acquire(16, Some(Instant::now()), &stop);
        assert!(b.is_none());

        drop(a);
        let b = budget.acquire(16, None, &stop).unwrap();
        assert_eq!(b.threads(), 4);
        assert_eq!(budget.in_use(), 4);
        drop(b);
        assert_eq!(budget.in_use(), 0);
        assert_eq!(budget.capacity(), 4);
    }

    #[test]
    fn test_budget_waiter_sees_release_and_stop() {
        let budget = ThreadBudget::new(1);
        let stop = AtomicBool::new(false);

        let held = budget.acquire(1, None, &stop).unwrap();
        std::thread::scope(|s| {
            let waiter = s.spawn(|| budget.acquire(1, None, &stop).map(|p| p.threads()));
            std::thread::sleep(Duration::from_millis(10));
            drop(held);
            assert_eq!(waiter.join().unwrap(), Some(1));
        });

        let held = budget.acquire(1, None, &stop).unwrap();
        std::thread::scope(|s| {
            let waiter = s.spawn(|| budget.acquire(1, None, &stop).is_some());
            std::thread::sleep(Duration::from_millis(10));
            stop.store(true, Ordering::Release);
            budget.wake_all();
            assert!(!waiter.join().unwrap());
        });
        drop(held);
        assert_eq!(budget.in_use(), 0);
    }
}
