//! Completeness phases for tokens and their sub-parts.
//!
//! A token (or an attribute, or an attribute's value) can be cut into pieces
//! when it does not fit one buffer window. Each piece reports where it sits:
//!
//! | previous piece | event  | this piece |
//! |----------------|--------|------------|
//! | none / ended   | flush  | Begin      |
//! | none / ended   | finish | Complete   |
//! | Begin/Continue | flush  | Continue   |
//! | Begin/Continue | finish | End        |

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    None,
    Begin,
    Continue,
    End,
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseEvent {
    /// The piece is cut; more of the same unit follows.
    Flush,
    /// The unit ends inside this piece.
    Finish,
}

impl Phase {
    pub fn advance(self, event: PhaseEvent) -> Phase {
        match (self.is_open(), event) {
            (false, PhaseEvent::Flush) => Phase::Begin,
            (false, PhaseEvent::Finish) => Phase::Complete,
            (true, PhaseEvent::Flush) => Phase::Continue,
            (true, PhaseEvent::Finish) => Phase::End,
        }
    }

    /// Begun in an earlier piece and not yet ended.
    pub fn is_open(self) -> bool {
        matches!(self, Phase::Begin | Phase::Continue)
    }

    /// The unit's first characters are in this piece.
    pub fn starts_here(self) -> bool {
        matches!(self, Phase::Begin | Phase::Complete)
    }

    /// The unit's last characters are in this piece.
    pub fn ends_here(self) -> bool {
        matches!(self, Phase::End | Phase::Complete)
    }
}
