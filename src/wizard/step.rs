//! Step sequencer — the wizard's ordered steps and the pure transition
//! functions that skip the optional addendum steps.
//!
//! Sequencing is a pure function of `(step, toggles)` so forward/back
//! navigation stays symmetric and testable in isolation. Side effects
//! (listing-scraper trigger, draft saves) live in the controller.

use serde::{Deserialize, Serialize};

/// The seven data-entry steps of the offer wizard.
///
/// Linear except for the two optional addendum steps: `Financing` and
/// `Inspection` are only visited when their toggle is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    MlsEntry,
    BuyerInfo,
    OfferDetails,
    Addenda,
    Financing,
    Inspection,
    Review,
}

/// Which optional addendum forms the buyer opted into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggles {
    pub include_financing: bool,
    pub include_inspection: bool,
}

impl Step {
    /// 1-based step index shown to the user.
    pub fn index(&self) -> u8 {
        match self {
            Self::MlsEntry => 1,
            Self::BuyerInfo => 2,
            Self::OfferDetails => 3,
            Self::Addenda => 4,
            Self::Financing => 5,
            Self::Inspection => 6,
            Self::Review => 7,
        }
    }

    pub fn from_index(index: u8) -> Option<Step> {
        match index {
            1 => Some(Self::MlsEntry),
            2 => Some(Self::BuyerInfo),
            3 => Some(Self::OfferDetails),
            4 => Some(Self::Addenda),
            5 => Some(Self::Financing),
            6 => Some(Self::Inspection),
            7 => Some(Self::Review),
            _ => None,
        }
    }

    /// Title shown in the step header and passed to the assistant as context.
    pub fn title(&self) -> &'static str {
        match self {
            Self::MlsEntry => "MLS ID Entry",
            Self::BuyerInfo => "Buyer Information",
            Self::OfferDetails => "Offer Details",
            Self::Addenda => "Settings & Optional Forms",
            Self::Financing => "Financing Details",
            Self::Inspection => "Sewer/Septic Details",
            Self::Review => "Review & Submit",
        }
    }

    /// Whether this step is visible under the given toggle configuration.
    pub fn is_reachable(&self, toggles: Toggles) -> bool {
        match self {
            Self::Financing => toggles.include_financing,
            Self::Inspection => toggles.include_inspection,
            _ => true,
        }
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::MlsEntry
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.index(), self.title())
    }
}

/// Next visible step, skipping addendum steps whose toggle is off.
/// `None` once at `Review` (submission is the only way forward from there).
pub fn advance(step: Step, toggles: Toggles) -> Option<Step> {
    use Step::*;
    match step {
        MlsEntry => Some(BuyerInfo),
        BuyerInfo => Some(OfferDetails),
        OfferDetails => Some(Addenda),
        Addenda => {
            if toggles.include_financing {
                Some(Financing)
            } else if toggles.include_inspection {
                Some(Inspection)
            } else {
                Some(Review)
            }
        }
        Financing => {
            if toggles.include_inspection {
                Some(Inspection)
            } else {
                Some(Review)
            }
        }
        Inspection => Some(Review),
        Review => None,
    }
}

/// Previous visible step. `None` at `MlsEntry`.
pub fn retreat(step: Step, toggles: Toggles) -> Option<Step> {
    use Step::*;
    match step {
        MlsEntry => None,
        BuyerInfo => Some(MlsEntry),
        OfferDetails => Some(BuyerInfo),
        Addenda => Some(OfferDetails),
        Financing => Some(Addenda),
        Inspection => {
            if toggles.include_financing {
                Some(Financing)
            } else {
                Some(Addenda)
            }
        }
        Review => {
            if toggles.include_inspection {
                Some(Inspection)
            } else if toggles.include_financing {
                Some(Financing)
            } else {
                Some(Addenda)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TOGGLES: [Toggles; 4] = [
        Toggles { include_financing: false, include_inspection: false },
        Toggles { include_financing: true, include_inspection: false },
        Toggles { include_financing: false, include_inspection: true },
        Toggles { include_financing: true, include_inspection: true },
    ];

    fn reachable_steps(toggles: Toggles) -> Vec<Step> {
        (1..=7)
            .filter_map(Step::from_index)
            .filter(|s| s.is_reachable(toggles))
            .collect()
    }

    #[test]
    fn advance_from_addenda_honors_toggles() {
        use Step::*;
        let cases = [
            ((false, false), Review),
            ((true, false), Financing),
            ((false, true), Inspection),
            ((true, true), Financing),
        ];
        for ((fin, insp), expected) in cases {
            let toggles = Toggles {
                include_financing: fin,
                include_inspection: insp,
            };
            assert_eq!(
                advance(Addenda, toggles),
                Some(expected),
                "toggles ({fin}, {insp})"
            );
        }
    }

    #[test]
    fn advance_from_financing_skips_inspection_when_off() {
        let on = Toggles { include_financing: true, include_inspection: true };
        let off = Toggles { include_financing: true, include_inspection: false };
        assert_eq!(advance(Step::Financing, on), Some(Step::Inspection));
        assert_eq!(advance(Step::Financing, off), Some(Step::Review));
    }

    #[test]
    fn retreat_from_review_honors_toggles() {
        use Step::*;
        let cases = [
            ((false, false), Addenda),
            ((true, false), Financing),
            ((false, true), Inspection),
            ((true, true), Inspection),
        ];
        for ((fin, insp), expected) in cases {
            let toggles = Toggles {
                include_financing: fin,
                include_inspection: insp,
            };
            assert_eq!(retreat(Review, toggles), Some(expected));
        }
    }

    #[test]
    fn retreat_from_inspection_skips_financing_when_off() {
        let off = Toggles { include_financing: false, include_inspection: true };
        let on = Toggles { include_financing: true, include_inspection: true };
        assert_eq!(retreat(Step::Inspection, off), Some(Step::Addenda));
        assert_eq!(retreat(Step::Inspection, on), Some(Step::Financing));
    }

    #[test]
    fn advance_then_retreat_is_symmetric() {
        for toggles in ALL_TOGGLES {
            for step in reachable_steps(toggles) {
                let Some(next) = advance(step, toggles) else {
                    assert_eq!(step, Step::Review);
                    continue;
                };
                assert_eq!(
                    retreat(next, toggles),
                    Some(step),
                    "retreat(advance({step})) under {toggles:?}"
                );
            }
        }
    }

    #[test]
    fn advance_never_lands_on_hidden_step() {
        for toggles in ALL_TOGGLES {
            for step in reachable_steps(toggles) {
                if let Some(next) = advance(step, toggles) {
                    assert!(next.is_reachable(toggles), "{step} -> {next} under {toggles:?}");
                }
            }
        }
    }

    #[test]
    fn terminal_and_initial_steps() {
        for toggles in ALL_TOGGLES {
            assert_eq!(advance(Step::Review, toggles), None);
            assert_eq!(retreat(Step::MlsEntry, toggles), None);
        }
    }

    #[test]
    fn index_roundtrip() {
        for i in 1..=7u8 {
            let step = Step::from_index(i).unwrap();
            assert_eq!(step.index(), i);
        }
        assert!(Step::from_index(0).is_none());
        assert!(Step::from_index(8).is_none());
    }
}
