use super::event::Event;
use super::individual::Individual;
use super::ledger::Ledger;
use crate::Group;
use crate::Id;
use crate::NIL;
use crate::NPSEUDO;
use crate::Slot;
use crate::Time;
use crate::random::Source;
use crate::schedule::Queue;

/// the population: individuals packed in contiguous per-group regions,
/// the identity ledger, and the event queue.
///
/// slot 0 is reserved. group k owns the region [lowest[k], lowest[k+1]),
/// its live records occupying the prefix and its empty slots the tail;
/// a spare region past the last group can lend slots like any other.
/// select, add and delete all run in time independent of population
/// size, with add at worst linear in the (small) number of groups.
///
/// the ledger and the queue live inside because every slot relocation
/// must update the identity chain and the scheduler handle together,
/// in one place.
pub struct Cohort {
    slots: Vec<Individual>,
    lowest: Vec<Slot>,
    empty: Vec<usize>,
    vmax: Vec<f64>,
    alive: usize,
    capacity: usize,
    groups: usize,
    ledger: Ledger,
    queue: Queue,
}

impl Cohort {
    /// equal allocation, remainder to the highest-numbered groups
    pub fn new(capacity: usize, groups: usize) -> Self {
        assert!(groups > 0, "at least one group");
        assert!(capacity >= groups, "capacity below group count");
        let share = capacity / groups;
        let rem = capacity - share * groups;
        let caps = (0..groups)
            .map(|k| share + usize::from(k >= groups - rem))
            .collect::<Vec<usize>>();
        Self::with_layout(&caps, 0)
    }

    /// explicit per-group allocation plus a spare tail region
    pub fn with_layout(caps: &[usize], spare: usize) -> Self {
        let groups = caps.len();
        let capacity = caps.iter().sum::<usize>() + spare;
        let mut lowest = vec![NIL; groups + 2];
        let mut empty = vec![0; groups + 1];
        let mut at = 1;
        for (k, &c) in caps.iter().enumerate() {
            lowest[k] = at;
            empty[k] = c;
            at += c;
        }
        lowest[groups] = at;
        empty[groups] = spare;
        lowest[groups + 1] = capacity + 1;
        Self {
            slots: vec![Individual::default(); capacity + 1 + NPSEUDO],
            lowest,
            empty,
            vmax: vec![1.0; groups],
            alive: 0,
            capacity,
            groups,
            ledger: Ledger::new(capacity),
            queue: Queue::new(capacity + 1 + NPSEUDO),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn groups(&self) -> usize {
        self.groups
    }

    pub fn len(&self) -> usize {
        self.alive
    }

    pub fn is_empty(&self) -> bool {
        self.alive == 0
    }

    /// the i-th reserved generator slot, never part of any group
    pub fn pseudo(&self, i: usize) -> Slot {
        assert!(i < NPSEUDO, "no such generator slot");
        self.capacity + 1 + i
    }

    pub fn group_size(&self, k: Group) -> usize {
        match k < self.groups {
            true => self.lowest[k + 1] - self.lowest[k] - self.empty[k],
            false => 0,
        }
    }

    pub fn empties(&self) -> &[usize] {
        &self.empty
    }

    /// uniform draw from group k's live prefix; the common fast path
    pub fn select(&self, k: Group, rng: &mut Source) -> Option<Slot> {
        match self.group_size(k) {
            0 => None,
            h => Some(self.lowest[k] + rng.below(h)),
        }
    }

    /// weighted draw by rejection against the group's maximum weight.
    /// kept apart from select so the uniform path stays branch-free.
    pub fn sieve(&self, k: Group, rng: &mut Source) -> Option<Slot> {
        let h = self.group_size(k);
        if h == 0 {
            return None;
        }
        loop {
            let n = self.lowest[k] + rng.below(h);
            if self.slots[n].v >= self.vmax[k] {
                return Some(n);
            }
            if rng.uniform() < self.slots[n].v / self.vmax[k] {
                return Some(n);
            }
        }
    }

    /// reserve a slot in group k for a record of weight v. the slot
    /// comes back blank for the caller to initialise. None means the
    /// arena is full or the weight exceeds the group's maximum.
    pub fn add(&mut self, k: Group, v: f64) -> Option<Slot> {
        if k >= self.groups {
            return None;
        }
        if self.alive >= self.capacity {
            return None;
        }
        if v > self.vmax[k] {
            return None;
        }
        let donor = self.donor(k)?;
        let m = match donor >= k {
            true => self.shift_down(donor, k),
            false => self.shift_up(donor, k),
        };
        self.alive += 1;
        self.slots[m] = Individual { group: k, v, ..Individual::default() };
        Some(m)
    }

    /// remove the individual in slot n of group k, packing the group by
    /// moving its highest live record into the gap. no-op on empty
    /// groups and out-of-range keys.
    pub fn delete(&mut self, k: Group, n: Slot) {
        if k >= self.groups {
            return;
        }
        if self.group_size(k) == 0 {
            return;
        }
        self.ledger.detach(&mut self.slots, n);
        self.queue.cancel(n);
        self.discard(k, n);
    }

    /// move the individual in slot n into another group, returning its
    /// new slot. identity and the scheduled event follow the move.
    pub fn transfer(&mut self, n: Slot, to: Group) -> Option<Slot> {
        let id = self.slots[n].id;
        let from = self.slots[n].group;
        if to >= self.groups || to == from {
            return None;
        }
        let m = self.add(to, self.slots[n].v)?;
        let n = self.locate(id);
        self.ledger.detach(&mut self.slots, n);
        let mut moved = std::mem::take(&mut self.slots[n]);
        moved.group = to;
        self.slots[m] = moved;
        self.ledger.attach(&mut self.slots, m);
        self.queue.renumber(m, n);
        self.discard(from, n);
        Some(m)
    }

    /// assign a fresh identity to the record in slot n and index it
    pub fn induct(&mut self, n: Slot) -> Id {
        let id = self.ledger.fresh();
        self.slots[n].id = id;
        self.ledger.attach(&mut self.slots, n);
        id
    }

    pub fn find(&self, id: Id) -> Option<Slot> {
        self.ledger.lookup(&self.slots, id)
    }

    pub fn locate(&self, id: Id) -> Slot {
        self.ledger.locate(&self.slots, id)
    }

    /// recompute and install the pending event for slot n. a record
    /// with no future candidate has fallen out of the event loop, which
    /// is unrecoverable.
    pub fn check_all(&mut self, n: Slot) -> Event {
        let kind = Event::earliest(&self.slots[n].times, self.queue.now())
            .expect("a future candidate event");
        self.slots[n].pending = kind;
        self.queue.schedule(n, self.slots[n].times[kind.index()]);
        kind
    }

    /// wake a reserved generator slot at time t
    pub fn alarm(&mut self, n: Slot, kind: Event, t: Time) {
        self.slots[n].pending = kind;
        self.queue.schedule(n, t);
    }

    pub fn cancel(&mut self, n: Slot) {
        self.queue.cancel(n);
    }

    pub fn start(&mut self, t: Time) {
        self.queue.start(t);
    }

    pub fn now(&self) -> Time {
        self.queue.now()
    }

    /// pop the earliest event, advancing the clock
    pub fn next(&mut self) -> Option<(Slot, Time)> {
        self.queue.next()
    }

    pub fn pending_time(&self, n: Slot) -> Option<Time> {
        self.queue.time_of(n)
    }

    pub fn scheduled(&self) -> usize {
        self.queue.len()
    }

    /// nearest group with a spare tail slot, by group-index distance,
    /// trying k-d before k+d+1; the spare region may donate too
    fn donor(&self, k: Group) -> Option<Group> {
        let tail = self.groups;
        let mut d = 0;
        loop {
            let below = k.checked_sub(d);
            let above = k + d + 1;
            if below.is_none() && above > tail {
                return None;
            }
            if let Some(i) = below {
                if self.empty[i] > 0 {
                    return Some(i);
                }
            }
            if above <= tail && self.empty[above] > 0 {
                return Some(above);
            }
            d += 1;
        }
    }

    /// cascade the donated empty slot leftward from the donor to k;
    /// every intervening group gives up its first record to its own
    /// tail and shrinks from the front
    fn shift_down(&mut self, donor: Group, k: Group) -> Slot {
        let mut j = donor;
        loop {
            self.empty[j] -= 1;
            let m = self.lowest[j + 1] - self.empty[j] - 1;
            if j == k {
                return m;
            }
            let n = self.lowest[j];
            if m != n {
                self.relocate(m, n);
            }
            self.empty[j - 1] += 1;
            self.lowest[j] += 1;
            j -= 1;
        }
    }

    /// the symmetric rightward cascade from a lower-numbered donor
    fn shift_up(&mut self, donor: Group, k: Group) -> Slot {
        let mut j = donor;
        loop {
            self.empty[j] -= 1;
            let m = self.lowest[j + 1] - 1;
            if j == k {
                return m;
            }
            let n = self.lowest[j + 2] - 1;
            if m != n {
                self.relocate(m, n);
            }
            self.empty[j + 1] += 1;
            self.lowest[j + 1] -= 1;
            j += 1;
        }
    }

    /// move a live record into a vacant slot, carrying its identity
    /// chain entry and its scheduler handle along
    fn relocate(&mut self, dst: Slot, src: Slot) {
        self.ledger.detach(&mut self.slots, src);
        self.slots[dst] = std::mem::take(&mut self.slots[src]);
        self.ledger.attach(&mut self.slots, dst);
        self.queue.renumber(dst, src);
    }

    /// pack group k after slot n was vacated; n's own ledger entry and
    /// queue handle must already be gone
    fn discard(&mut self, k: Group, n: Slot) {
        self.empty[k] += 1;
        let m = self.lowest[k + 1] - self.empty[k];
        match n == m {
            true => self.slots[n] = Individual::default(),
            false => self.relocate(n, m),
        }
        self.alive -= 1;
    }

    /// assert the structural invariants: regions gapless and disjoint,
    /// counts consistent, identity round-trips, and scheduler agreement
    /// for every queued record
    pub fn audit(&self) {
        let mut total = 0;
        for k in 0..self.groups {
            let lo = self.lowest[k];
            let hi = self.lowest[k + 1];
            let live = hi - lo - self.empty[k];
            total += live;
            for n in lo..hi {
                assert!(
                    self.slots[n].is_vacant() == (n >= lo + live),
                    "gap in group {} at slot {}",
                    k,
                    n
                );
            }
            for n in lo..lo + live {
                let who = &self.slots[n];
                assert!(who.group == k, "group mark astray at slot {}", n);
                assert!(self.find(who.id) == Some(n), "identity lost at slot {}", n);
                if let Some(t) = self.queue.time_of(n) {
                    assert!(
                        t == who.times[who.pending.index()],
                        "scheduler disagrees at slot {}",
                        n
                    );
                }
            }
        }
        assert!(total == self.alive, "group sizes disagree with the live count");
    }
}

impl std::ops::Index<Slot> for Cohort {
    type Output = Individual;
    fn index(&self, n: Slot) -> &Individual {
        &self.slots[n]
    }
}

impl std::ops::IndexMut<Slot> for Cohort {
    fn index_mut(&mut self, n: Slot) -> &mut Individual {
        &mut self.slots[n]
    }
}
