//! Per-step validation — the predicate gating forward navigation.
//!
//! Pure over `(step, draft)`; recomputed on every check, never mutates.

use std::sync::LazyLock;

use regex::Regex;

use super::draft::{LoanType, OfferDraft, YesNo};
use super::step::Step;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

/// Whether a string parses as an email address.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Whether the given step's required fields are complete, permitting
/// forward navigation.
pub fn step_is_complete(step: Step, draft: &OfferDraft) -> bool {
    match step {
        Step::MlsEntry => draft
            .mls_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty()),

        Step::BuyerInfo => {
            let Some(buyer) = &draft.buyer else {
                return false;
            };
            present(&buyer.buyer1_name)
                && buyer.email.as_deref().is_some_and(is_valid_email)
                && present(&buyer.status)
                && present(&buyer.closing_date)
        }

        Step::OfferDetails => {
            let Some(buyer) = &draft.buyer else {
                return false;
            };
            positive(buyer.offer_price)
                && positive(buyer.earnest_amount)
                && buyer.earnest_delivery_days.is_some_and(|d| d > 0)
                && present(&buyer.earnest_holder)
                && buyer.offer_expiration_days.is_some_and(|d| d > 0)
                && present(&buyer.charges_assessments)
        }

        // Only selects which optional addenda to include.
        Step::Addenda => true,

        Step::Financing => {
            let Some(form) = &draft.financing else {
                return false;
            };
            let base = form.loan_type.is_some()
                && form.down_payment_type.is_some()
                && positive(form.down_payment_magnitude)
                && form.loan_application_days.is_some_and(|d| d > 0)
                && form.financing_contingency.is_some()
                && form.financing_contingency_days.is_some_and(|d| d > 0)
                && form.appraisal_contingency.is_some();
            if form.loan_type == Some(LoanType::Va) {
                base && form.va_escrow_fee.is_some()
            } else {
                base
            }
        }

        Step::Inspection => {
            let Some(form) = &draft.inspection else {
                return false;
            };
            match form.sewer_survey {
                None => false,
                Some(YesNo::No) => true,
                Some(YesNo::Yes) => form.buyers_notice_days.is_some_and(|d| d > 0),
            }
        }

        // Review-only; the submit action carries no extra gating.
        Step::Review => true,
    }
}

fn present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

fn positive(field: Option<f64>) -> bool {
    field.is_some_and(|v| v > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::draft::{
        BuyerData, DownPaymentType, FinancingAddendum, FinancingContingency, InspectionAddendum,
    };

    fn complete_buyer() -> BuyerData {
        BuyerData {
            buyer1_name: Some("Jane Doe".into()),
            email: Some("buyer@example.com".into()),
            status: Some("A single person".into()),
            closing_date: Some("2026-10-15".into()),
            offer_price: Some(750_000.0),
            earnest_amount: Some(15_000.0),
            earnest_delivery_days: Some(3),
            earnest_holder: Some("Closing Agent".into()),
            offer_expiration_days: Some(2),
            charges_assessments: Some("ProRated".into()),
            ..Default::default()
        }
    }

    fn complete_financing() -> FinancingAddendum {
        FinancingAddendum {
            loan_type: Some(LoanType::ConventionalFirst),
            down_payment_type: Some(DownPaymentType::Percentage),
            down_payment_magnitude: Some(20.0),
            loan_application_days: Some(5),
            financing_contingency: Some(FinancingContingency::SellerNoticeToPerform),
            financing_contingency_days: Some(21),
            appraisal_contingency: Some(YesNo::Yes),
            ..Default::default()
        }
    }

    #[test]
    fn mls_entry_requires_non_blank_id() {
        let mut draft = OfferDraft::default();
        assert!(!step_is_complete(Step::MlsEntry, &draft));
        draft.mls_id = Some("   ".into());
        assert!(!step_is_complete(Step::MlsEntry, &draft));
        draft.mls_id = Some("2254520".into());
        assert!(step_is_complete(Step::MlsEntry, &draft));
    }

    #[test]
    fn buyer_info_rejects_bad_email() {
        let mut draft = OfferDraft {
            buyer: Some(complete_buyer()),
            ..Default::default()
        };
        assert!(step_is_complete(Step::BuyerInfo, &draft));

        draft.buyer.as_mut().unwrap().email = Some("not-an-email".into());
        assert!(!step_is_complete(Step::BuyerInfo, &draft));

        draft.buyer.as_mut().unwrap().email = Some("buyer@example.com".into());
        assert!(step_is_complete(Step::BuyerInfo, &draft));
    }

    #[test]
    fn buyer_info_requires_all_fields() {
        for clear in [
            |b: &mut BuyerData| b.buyer1_name = None,
            |b: &mut BuyerData| b.email = None,
            |b: &mut BuyerData| b.status = None,
            |b: &mut BuyerData| b.closing_date = None,
        ] {
            let mut buyer = complete_buyer();
            clear(&mut buyer);
            let draft = OfferDraft {
                buyer: Some(buyer),
                ..Default::default()
            };
            assert!(!step_is_complete(Step::BuyerInfo, &draft));
        }
    }

    #[test]
    fn offer_details_requires_positive_amounts() {
        let mut draft = OfferDraft {
            buyer: Some(complete_buyer()),
            ..Default::default()
        };
        assert!(step_is_complete(Step::OfferDetails, &draft));

        draft.buyer.as_mut().unwrap().offer_price = Some(0.0);
        assert!(!step_is_complete(Step::OfferDetails, &draft));

        draft.buyer.as_mut().unwrap().offer_price = Some(750_000.0);
        draft.buyer.as_mut().unwrap().earnest_delivery_days = Some(0);
        assert!(!step_is_complete(Step::OfferDetails, &draft));
    }

    #[test]
    fn addenda_and_review_are_always_complete() {
        let draft = OfferDraft::default();
        assert!(step_is_complete(Step::Addenda, &draft));
        assert!(step_is_complete(Step::Review, &draft));
    }

    #[test]
    fn financing_requires_va_escrow_only_for_va_loans() {
        let mut draft = OfferDraft {
            financing: Some(complete_financing()),
            ..Default::default()
        };
        // Non-VA loan: complete without the escrow answer.
        assert!(step_is_complete(Step::Financing, &draft));

        let form = draft.financing.as_mut().unwrap();
        form.loan_type = Some(LoanType::Va);
        assert!(!step_is_complete(Step::Financing, &draft));

        draft.financing.as_mut().unwrap().va_escrow_fee = Some(YesNo::No);
        assert!(step_is_complete(Step::Financing, &draft));
    }

    #[test]
    fn inspection_notice_days_required_only_for_survey_yes() {
        let mut draft = OfferDraft {
            inspection: Some(InspectionAddendum::default()),
            ..Default::default()
        };
        assert!(!step_is_complete(Step::Inspection, &draft));

        draft.inspection.as_mut().unwrap().sewer_survey = Some(YesNo::No);
        assert!(step_is_complete(Step::Inspection, &draft));

        draft.inspection.as_mut().unwrap().sewer_survey = Some(YesNo::Yes);
        assert!(!step_is_complete(Step::Inspection, &draft));

        draft.inspection.as_mut().unwrap().buyers_notice_days = Some(10);
        assert!(step_is_complete(Step::Inspection, &draft));
    }

    #[test]
    fn email_grammar() {
        assert!(is_valid_email("buyer@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("@example.com"));
    }
}
