use crate::Slot;
use crate::Time;

/// the global event queue: at most one pending event per slot.
///
/// an indexed binary min-heap keyed by (time, slot). keeping the slot
/// inside the key makes the order of coincident events deterministic:
/// the lowest slot index dispatches first. a position map over slots
/// gives constant-time membership and logarithmic schedule, cancel and
/// renumber, independent of population size.
pub struct Queue {
    heap: Vec<(Time, Slot)>,
    pos: Vec<usize>,
    now: Time,
}

impl Queue {
    pub fn new(slots: usize) -> Self {
        Self {
            heap: Vec::with_capacity(slots),
            pos: vec![0; slots],
            now: 0.0,
        }
    }

    /// set the simulation start time. the queue must still be empty.
    pub fn start(&mut self, t: Time) {
        assert!(self.heap.is_empty(), "queue already running");
        self.now = t;
    }

    pub fn now(&self) -> Time {
        self.now
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, n: Slot) -> bool {
        self.pos[n] != 0
    }

    pub fn time_of(&self, n: Slot) -> Option<Time> {
        match self.pos[n] {
            0 => None,
            p => Some(self.heap[p - 1].0),
        }
    }

    /// install or replace the pending time for slot n
    pub fn schedule(&mut self, n: Slot, t: Time) {
        assert!(t >= self.now, "scheduling in the past: {} < {}", t, self.now);
        match self.pos[n] {
            0 => {
                self.heap.push((t, n));
                self.pos[n] = self.heap.len();
                self.up(self.heap.len() - 1);
            }
            p => {
                self.heap[p - 1].0 = t;
                self.up(p - 1);
                self.down(p - 1);
            }
        }
    }

    /// remove the pending event for slot n, if any
    pub fn cancel(&mut self, n: Slot) {
        match self.pos[n] {
            0 => {}
            p => self.remove(p - 1),
        }
    }

    /// rename the entry for n0 to n at its scheduled time. slots with
    /// no pending event pass through unchanged.
    pub fn renumber(&mut self, n: Slot, n0: Slot) {
        match self.pos[n0] {
            0 => {}
            p => {
                assert!(self.pos[n] == 0, "slot {} already queued", n);
                self.heap[p - 1].1 = n;
                self.pos[n0] = 0;
                self.pos[n] = p;
                self.up(p - 1);
                self.down(p - 1);
            }
        }
    }

    /// pop the earliest entry and advance the clock to it
    pub fn next(&mut self) -> Option<(Slot, Time)> {
        match self.heap.first().copied() {
            None => None,
            Some((t, n)) => {
                self.remove(0);
                self.now = t;
                Some((n, t))
            }
        }
    }

    fn remove(&mut self, i: usize) {
        let last = self.heap.len() - 1;
        self.swap(i, last);
        let (_, n) = self.heap.pop().expect("nonempty");
        self.pos[n] = 0;
        if i < self.heap.len() {
            self.up(i);
            self.down(i);
        }
    }

    fn before(a: (Time, Slot), b: (Time, Slot)) -> bool {
        a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).is_lt()
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.pos[self.heap[a].1] = a + 1;
        self.pos[self.heap[b].1] = b + 1;
    }

    fn up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if Self::before(self.heap[i], self.heap[parent]) {
                self.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn down(&mut self, mut i: usize) {
        loop {
            let mut m = i;
            for child in [2 * i + 1, 2 * i + 2] {
                if child < self.heap.len() && Self::before(self.heap[child], self.heap[m]) {
                    m = child;
                }
            }
            if m == i {
                return;
            }
            self.swap(i, m);
            i = m;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::Source;

    #[test]
    fn pops_come_out_in_time_order() {
        let mut queue = Queue::new(16);
        for (n, t) in [(1, 5.0), (2, 1.0), (3, 9.0), (4, 3.0)] {
            queue.schedule(n, t);
        }
        let order = std::iter::from_fn(|| queue.next()).map(|(n, _)| n).collect::<Vec<_>>();
        assert!(order == vec![2, 4, 1, 3]);
    }

    #[test]
    fn coincident_events_dispatch_lowest_slot_first() {
        let mut queue = Queue::new(16);
        for n in [7, 3, 9, 5] {
            queue.schedule(n, 2.0);
        }
        let order = std::iter::from_fn(|| queue.next()).map(|(n, _)| n).collect::<Vec<_>>();
        assert!(order == vec![3, 5, 7, 9]);
    }

    #[test]
    fn cancel_then_reschedule_wakes_once_at_the_new_time() {
        let mut queue = Queue::new(4);
        queue.schedule(1, 10.0);
        queue.cancel(1);
        queue.schedule(1, 5.0);
        assert!(queue.next() == Some((1, 5.0)));
        assert!(queue.now() == 5.0);
        assert!(queue.next().is_none());
    }

    #[test]
    fn rescheduling_replaces_rather_than_duplicates() {
        let mut queue = Queue::new(4);
        queue.schedule(1, 10.0);
        queue.schedule(1, 4.0);
        assert!(queue.len() == 1);
        assert!(queue.next() == Some((1, 4.0)));
        assert!(queue.next().is_none());
    }

    #[test]
    fn renumbering_preserves_the_scheduled_time() {
        let mut queue = Queue::new(8);
        queue.schedule(2, 6.0);
        queue.schedule(3, 1.0);
        queue.renumber(5, 2);
        assert!(!queue.contains(2));
        assert!(queue.time_of(5) == Some(6.0));
        assert!(queue.next() == Some((3, 1.0)));
        assert!(queue.next() == Some((5, 6.0)));
    }

    #[test]
    fn random_churn_stays_monotone() {
        let mut rng = Source::from_seed(11);
        let mut queue = Queue::new(256);
        for n in 1..256 {
            queue.schedule(n, rng.uniform() * 100.0);
        }
        for _ in 0..100 {
            let n = 1 + rng.below(255);
            queue.cancel(n);
        }
        let mut previous = f64::MIN;
        while let Some((_, t)) = queue.next() {
            assert!(t >= previous);
            previous = t;
        }
    }

    #[test]
    #[should_panic]
    fn scheduling_in_the_past_is_fatal() {
        let mut queue = Queue::new(4);
        queue.start(100.0);
        queue.schedule(1, 99.0);
    }
}
