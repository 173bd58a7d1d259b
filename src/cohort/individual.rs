use super::event::Event;
use super::state::Sex;
use super::state::State;
use crate::Group;
use crate::Id;
use crate::Slot;
use crate::Strain;
use crate::Time;
use crate::bindings::Chain;

/// one member of the population. a vacant slot is all zeros with id 0.
///
/// linkage is by slot index throughout. the link field threads the
/// identity-index hash chain and is distinct from the event-queue
/// handle, which the scheduler keeps on its side; conflating the two
/// is an easy mistake.
#[derive(Clone, Debug, Default)]
pub struct Individual {
    /// stable identifier, never reused within a run; 0 marks a vacant slot
    pub id: Id,
    /// identity-index hash chain
    pub link: Slot,
    pub group: Group,
    pub sex: Sex,
    /// region of birth
    pub region: Group,
    pub born: Time,
    pub state: State,
    /// infecting strain; 0 while uninfected
    pub strain: Strain,
    /// candidate event times by kind; 0 marks a kind that does not apply
    pub times: [Time; Event::CANDIDATES],
    /// the kind currently registered with the scheduler
    pub pending: Event,
    /// contacts this individual emitted
    pub given: Chain,
    /// contacts this individual received
    pub taken: Chain,
    /// selection weight, positive and at most the group's maximum
    pub v: f64,
}

impl Individual {
    pub fn is_vacant(&self) -> bool {
        self.id == 0
    }

    pub fn age(&self, now: Time) -> Time {
        now - self.born
    }
}
