use crate::Time;

/// event kinds.
///
/// the first four are the per-individual candidates, indexed into each
/// record's times array. the last two belong to the reserved generator
/// slots and never appear on a real individual.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Event {
    #[default]
    Death,
    Progress,
    Regress,
    DeathTb,
    Births,
    Contacts,
}

impl Event {
    /// candidate kinds carried on every individual
    pub const CANDIDATES: usize = 4;

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// among the candidate times, the kind with the smallest strictly
    /// future time; ties break to the lowest kind index. a zero entry
    /// marks a kind that does not presently apply.
    pub fn earliest(times: &[Time; Self::CANDIDATES], now: Time) -> Option<Event> {
        let mut best: Option<(Time, usize)> = None;
        for (i, &t) in times.iter().enumerate() {
            if t <= now {
                continue;
            }
            match best {
                Some((b, _)) if t >= b => {}
                _ => best = Some((t, i)),
            }
        }
        best.map(|(_, i)| Event::from(i))
    }
}

impl From<usize> for Event {
    fn from(n: usize) -> Event {
        match n {
            0 => Event::Death,
            1 => Event::Progress,
            2 => Event::Regress,
            3 => Event::DeathTb,
            4 => Event::Births,
            5 => Event::Contacts,
            _ => panic!("invalid event kind"),
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Event::Death => write!(f, "death"),
            Event::Progress => write!(f, "progression"),
            Event::Regress => write!(f, "regression"),
            Event::DeathTb => write!(f, "disease death"),
            Event::Births => write!(f, "birth generator"),
            Event::Contacts => write!(f, "contact generator"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earliest_picks_the_smallest_future_time() {
        let times = [50.0, 30.0, 0.0, 40.0];
        assert!(Event::earliest(&times, 10.0) == Some(Event::Progress));
        assert!(Event::earliest(&times, 35.0) == Some(Event::DeathTb));
        assert!(Event::earliest(&times, 45.0) == Some(Event::Death));
    }

    #[test]
    fn earliest_ignores_past_and_unset_entries() {
        let times = [0.0, 5.0, 0.0, 0.0];
        assert!(Event::earliest(&times, 5.0).is_none());
        assert!(Event::earliest(&times, 4.0) == Some(Event::Progress));
    }

    #[test]
    fn coincident_candidates_break_to_the_lowest_kind() {
        let times = [20.0, 20.0, 20.0, 20.0];
        assert!(Event::earliest(&times, 0.0) == Some(Event::Death));
    }
}
