/// the TB natural-history compartments
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum State {
    #[default]
    Uninfected,
    Latent,
    Active,
    Dormant,
}

impl State {
    pub const N: usize = 4;

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl From<usize> for State {
    fn from(n: usize) -> State {
        match n {
            0 => State::Uninfected,
            1 => State::Latent,
            2 => State::Active,
            3 => State::Dormant,
            _ => panic!("invalid state"),
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            State::Uninfected => write!(f, "U"),
            State::Latent => write!(f, "L"),
            State::Active => write!(f, "A"),
            State::Dormant => write!(f, "D"),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Sex {
    #[default]
    Female,
    Male,
}

impl Sex {
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl From<usize> for Sex {
    fn from(n: usize) -> Sex {
        match n {
            0 => Sex::Female,
            1 => Sex::Male,
            _ => panic!("invalid sex"),
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Sex::Female => write!(f, "F"),
            Sex::Male => write!(f, "M"),
        }
    }
}
