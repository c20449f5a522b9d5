//! The offer draft — the accumulating, partially-filled record built across
//! the wizard steps, plus the fully-defaulted payload sent upstream.
//!
//! Serde field names follow the offer-processing service's wire contract
//! (`MLS_ID`, `Form22A`, `SEWERSURVEY`, ...) so a persisted draft and the
//! submission payload both round-trip without a translation layer.

use serde::{Deserialize, Serialize};

use super::step::Toggles;
use super::words::amount_in_words;
use crate::error::{Error, StorageError, WizardError};

/// Loan types accepted on the financing addendum (Form 22A).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanType {
    #[serde(rename = "CONVENTIONALFIRST")]
    ConventionalFirst,
    #[serde(rename = "CONVENTIONALSECOND")]
    ConventionalSecond,
    #[serde(rename = "FHA")]
    Fha,
    #[serde(rename = "BRIDGE")]
    Bridge,
    #[serde(rename = "VA")]
    Va,
    #[serde(rename = "USDA")]
    Usda,
    #[serde(rename = "OTHER")]
    Other,
}

impl LoanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConventionalFirst => "CONVENTIONALFIRST",
            Self::ConventionalSecond => "CONVENTIONALSECOND",
            Self::Fha => "FHA",
            Self::Bridge => "BRIDGE",
            Self::Va => "VA",
            Self::Usda => "USDA",
            Self::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownPaymentType {
    #[serde(rename = "PERCENTAGE")]
    Percentage,
    #[serde(rename = "DOLLAR")]
    Dollar,
}

impl DownPaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage => "PERCENTAGE",
            Self::Dollar => "DOLLAR",
        }
    }
}

/// How the financing contingency resolves if the buyer's loan falls through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinancingContingency {
    #[serde(rename = "FINCONTIN_OPTIONA_SELLERNOTICETOPERFORM")]
    SellerNoticeToPerform,
    #[serde(rename = "FINCONTIN_OPTIONB_AUTOWAIVED")]
    AutoWaived,
    #[serde(rename = "FINCONTIN_OPTIONC")]
    OptionC,
}

impl FinancingContingency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SellerNoticeToPerform => "FINCONTIN_OPTIONA_SELLERNOTICETOPERFORM",
            Self::AutoWaived => "FINCONTIN_OPTIONB_AUTOWAIVED",
            Self::OptionC => "FINCONTIN_OPTIONC",
        }
    }
}

/// Yes/no selections serialized the way the upstream forms expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "NO")]
    No,
}

impl YesNo {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
        }
    }
}

/// Buyer and offer-terms fields collected on steps 2–4.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuyerData {
    #[serde(rename = "Buyer1Name", skip_serializing_if = "Option::is_none")]
    pub buyer1_name: Option<String>,
    #[serde(rename = "Buyer2Name", skip_serializing_if = "Option::is_none")]
    pub buyer2_name: Option<String>,
    #[serde(rename = "B_Email", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "B_Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "ClosingDate", skip_serializing_if = "Option::is_none")]
    pub closing_date: Option<String>,

    #[serde(rename = "PI_SellPrice", skip_serializing_if = "Option::is_none")]
    pub sell_price: Option<f64>,
    #[serde(rename = "PI_SellPriceW", skip_serializing_if = "Option::is_none")]
    pub sell_price_words: Option<String>,
    #[serde(rename = "EM_PC1", skip_serializing_if = "Option::is_none")]
    pub earnest_percent: Option<f64>,
    #[serde(rename = "offer_price_num", skip_serializing_if = "Option::is_none")]
    pub offer_price: Option<f64>,
    #[serde(rename = "offer_price_words", skip_serializing_if = "Option::is_none")]
    pub offer_price_words: Option<String>,
    #[serde(rename = "earnest_amount_num", skip_serializing_if = "Option::is_none")]
    pub earnest_amount: Option<f64>,
    #[serde(
        rename = "earnest_amount_delivery_days",
        skip_serializing_if = "Option::is_none"
    )]
    pub earnest_delivery_days: Option<u32>,
    #[serde(rename = "earnest_money_holder", skip_serializing_if = "Option::is_none")]
    pub earnest_holder: Option<String>,
    #[serde(
        rename = "offer_expiration_days",
        skip_serializing_if = "Option::is_none"
    )]
    pub offer_expiration_days: Option<u32>,

    #[serde(rename = "ServicesofUtils", skip_serializing_if = "Option::is_none")]
    pub services_of_utils: Option<String>,
    #[serde(rename = "ChargesAssessments", skip_serializing_if = "Option::is_none")]
    pub charges_assessments: Option<String>,
    #[serde(rename = "VerificationPeriod", skip_serializing_if = "Option::is_none")]
    pub verification_period: Option<String>,
    #[serde(rename = "addendums", skip_serializing_if = "Option::is_none")]
    pub addendums: Option<Vec<String>>,
}

/// Financing addendum (Form 22A), step 5.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancingAddendum {
    #[serde(rename = "TypeofLoan", skip_serializing_if = "Option::is_none")]
    pub loan_type: Option<LoanType>,
    #[serde(rename = "DOWNPAYMENTTYPE", skip_serializing_if = "Option::is_none")]
    pub down_payment_type: Option<DownPaymentType>,
    #[serde(
        rename = "DOWNPAYMENTMAGNITUDE",
        skip_serializing_if = "Option::is_none"
    )]
    pub down_payment_magnitude: Option<f64>,
    #[serde(
        rename = "MAKEAPPLICATIONFORLOANSDAYS",
        skip_serializing_if = "Option::is_none"
    )]
    pub loan_application_days: Option<u32>,
    #[serde(
        rename = "FINANCIALCONTINGENCY",
        skip_serializing_if = "Option::is_none"
    )]
    pub financing_contingency: Option<FinancingContingency>,
    #[serde(
        rename = "FINANCIALCONTINGENCYTIMEFRAME",
        skip_serializing_if = "Option::is_none"
    )]
    pub financing_contingency_days: Option<u32>,
    #[serde(
        rename = "APPRAISALCONTINGENCY",
        skip_serializing_if = "Option::is_none"
    )]
    pub appraisal_contingency: Option<YesNo>,
    #[serde(rename = "LOANCOSTPROVISIONS", skip_serializing_if = "Option::is_none")]
    pub loan_cost_provisions: Option<String>,
    #[serde(
        rename = "BUYERPAYESECROWFEEFORVALOAN",
        skip_serializing_if = "Option::is_none"
    )]
    pub va_escrow_fee: Option<YesNo>,
}

/// Inspection addendum (Form 35), step 6.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InspectionAddendum {
    #[serde(rename = "SEWERSURVEY", skip_serializing_if = "Option::is_none")]
    pub sewer_survey: Option<YesNo>,
    #[serde(rename = "BUYERSNOTICEDAYS", skip_serializing_if = "Option::is_none")]
    pub buyers_notice_days: Option<u32>,
    #[serde(
        rename = "SEWERREQUESTFORINSPECTIONREPORT",
        skip_serializing_if = "Option::is_none"
    )]
    pub inspection_report: Option<YesNo>,
    #[serde(
        rename = "ADDITIONALTIMEFORINSPECTION",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_inspection_days: Option<u32>,
    #[serde(
        rename = "SEWERRESPONSETIMETOREQUESTFORREPAIRSORMODIFICATIONS",
        skip_serializing_if = "Option::is_none"
    )]
    pub seller_response_days: Option<u32>,
    #[serde(
        rename = "BUYERSREPLYTOSELLERSRESPONSE",
        skip_serializing_if = "Option::is_none"
    )]
    pub buyers_reply_days: Option<u32>,
    #[serde(rename = "REPAIRSCLOSINGDATE", skip_serializing_if = "Option::is_none")]
    pub repairs_closing_days: Option<u32>,
    #[serde(
        rename = "NEIGHBORHOODREVIEWCONTINGENCYCHECK",
        skip_serializing_if = "Option::is_none"
    )]
    pub neighborhood_review: Option<YesNo>,
    #[serde(
        rename = "NEIGHBORHOODREVIEWCONTINGENCYDAYS",
        skip_serializing_if = "Option::is_none"
    )]
    pub neighborhood_review_days: Option<u32>,
    #[serde(
        rename = "BUYERWAVIEDRISKASSESSMENT",
        skip_serializing_if = "Option::is_none"
    )]
    pub waived_risk_assessment: Option<YesNo>,
}

/// The in-progress offer record.
///
/// A filled addendum is retained even while its toggle is off; toggles only
/// filter what goes into the submission payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferDraft {
    #[serde(rename = "MLS_ID", skip_serializing_if = "Option::is_none")]
    pub mls_id: Option<String>,
    #[serde(rename = "listingPrice", skip_serializing_if = "Option::is_none")]
    pub listing_price: Option<f64>,
    #[serde(rename = "buyerdata", skip_serializing_if = "Option::is_none")]
    pub buyer: Option<BuyerData>,
    #[serde(rename = "Form22A", skip_serializing_if = "Option::is_none")]
    pub financing: Option<FinancingAddendum>,
    #[serde(rename = "Form35", skip_serializing_if = "Option::is_none")]
    pub inspection: Option<InspectionAddendum>,
    #[serde(rename = "requestAgentHelp", default, skip_serializing_if = "std::ops::Not::not")]
    pub request_agent_help: bool,
    #[serde(rename = "agentHelpNotes", skip_serializing_if = "Option::is_none")]
    pub agent_help_notes: Option<String>,
}

impl OfferDraft {
    /// Merge a partial JSON update into the draft.
    ///
    /// Objects merge recursively, explicit `null` clears a field, and every
    /// other value replaces outright. The merged result must still
    /// deserialize as a draft; a bad patch leaves the draft untouched.
    pub fn apply_patch(&mut self, patch: &serde_json::Value) -> Result<(), Error> {
        let mut current = serde_json::to_value(&*self)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;
        merge_json(&mut current, patch);
        // A merge result that no longer parses is the caller's bad patch,
        // not a persistence problem.
        *self = serde_json::from_value(current)
            .map_err(|e| WizardError::InvalidDraftPatch {
                reason: e.to_string(),
            })?;
        Ok(())
    }

    /// Assemble the fully-defaulted upstream payload.
    ///
    /// Addenda are included only when their toggle is on; an excluded or
    /// absent addendum is sent as its all-defaults form, matching the
    /// upstream contract.
    pub fn submission_payload(&self, toggles: Toggles) -> SubmissionPayload {
        let financing = toggles
            .include_financing
            .then(|| self.financing.clone())
            .flatten()
            .unwrap_or_default();
        let inspection = toggles
            .include_inspection
            .then(|| self.inspection.clone())
            .flatten()
            .unwrap_or_default();
        let buyer = self.buyer.clone().unwrap_or_default();

        SubmissionPayload {
            mls_id: self.mls_id.clone().unwrap_or_default(),
            financing: ProcessedFinancing::from(&financing),
            inspection: ProcessedInspection::from(&inspection),
            buyer: ProcessedBuyer::from(&buyer),
        }
    }
}

fn merge_json(current: &mut serde_json::Value, patch: &serde_json::Value) {
    use serde_json::Value;
    match (current, patch) {
        (Value::Object(cur), Value::Object(new)) => {
            for (key, value) in new {
                if value.is_null() {
                    cur.remove(key);
                } else if let Some(existing) = cur.get_mut(key) {
                    merge_json(existing, value);
                } else {
                    cur.insert(key.clone(), value.clone());
                }
            }
        }
        (current, patch) => *current = patch.clone(),
    }
}

// ── Upstream payload (every field present, defaulted when absent) ───────

/// Financing addendum with upstream defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedFinancing {
    #[serde(rename = "TypeofLoan")]
    pub loan_type: String,
    #[serde(rename = "DOWNPAYMENTTYPE")]
    pub down_payment_type: String,
    #[serde(rename = "DOWNPAYMENTMAGNITUDE")]
    pub down_payment_magnitude: f64,
    #[serde(rename = "MAKEAPPLICATIONFORLOANSDAYS")]
    pub loan_application_days: u32,
    #[serde(rename = "FINANCIALCONTINGENCY")]
    pub financing_contingency: String,
    #[serde(rename = "FINANCIALCONTINGENCYTIMEFRAME")]
    pub financing_contingency_days: u32,
    #[serde(rename = "APPRAISALCONTINGENCY")]
    pub appraisal_contingency: String,
    #[serde(rename = "LOANCOSTPROVISIONS")]
    pub loan_cost_provisions: String,
    #[serde(rename = "BUYERPAYESECROWFEEFORVALOAN")]
    pub va_escrow_fee: String,
}

impl From<&FinancingAddendum> for ProcessedFinancing {
    fn from(form: &FinancingAddendum) -> Self {
        Self {
            loan_type: form.loan_type.map(|t| t.as_str().to_string()).unwrap_or_default(),
            down_payment_type: form
                .down_payment_type
                .unwrap_or(DownPaymentType::Percentage)
                .as_str()
                .to_string(),
            down_payment_magnitude: form.down_payment_magnitude.unwrap_or(0.0),
            loan_application_days: form.loan_application_days.unwrap_or(0),
            financing_contingency: form
                .financing_contingency
                .map(|c| c.as_str().to_string())
                .unwrap_or_default(),
            financing_contingency_days: form.financing_contingency_days.unwrap_or(0),
            appraisal_contingency: form
                .appraisal_contingency
                .unwrap_or(YesNo::No)
                .as_str()
                .to_string(),
            loan_cost_provisions: form
                .loan_cost_provisions
                .clone()
                .unwrap_or_else(|| "EMPTY".to_string()),
            va_escrow_fee: form.va_escrow_fee.unwrap_or(YesNo::No).as_str().to_string(),
        }
    }
}

/// Inspection addendum with upstream defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedInspection {
    #[serde(rename = "SEWERSURVEY")]
    pub sewer_survey: String,
    #[serde(rename = "BUYERSNOTICEDAYS")]
    pub buyers_notice_days: u32,
    #[serde(rename = "SEWERREQUESTFORINSPECTIONREPORT")]
    pub inspection_report: String,
    #[serde(rename = "ADDITIONALTIMEFORINSPECTION")]
    pub additional_inspection_days: u32,
    #[serde(rename = "SEWERRESPONSETIMETOREQUESTFORREPAIRSORMODIFICATIONS")]
    pub seller_response_days: u32,
    #[serde(rename = "BUYERSREPLYTOSELLERSRESPONSE")]
    pub buyers_reply_days: u32,
    #[serde(rename = "REPAIRSCLOSINGDATE")]
    pub repairs_closing_days: u32,
    #[serde(rename = "NEIGHBORHOODREVIEWCONTINGENCYCHECK")]
    pub neighborhood_review: String,
    #[serde(rename = "NEIGHBORHOODREVIEWCONTINGENCYDAYS")]
    pub neighborhood_review_days: u32,
    #[serde(rename = "BUYERWAVIEDRISKASSESSMENT")]
    pub waived_risk_assessment: String,
}

impl From<&InspectionAddendum> for ProcessedInspection {
    fn from(form: &InspectionAddendum) -> Self {
        let yes_no = |v: Option<YesNo>| v.unwrap_or(YesNo::No).as_str().to_string();
        Self {
            sewer_survey: yes_no(form.sewer_survey),
            buyers_notice_days: form.buyers_notice_days.unwrap_or(0),
            inspection_report: yes_no(form.inspection_report),
            additional_inspection_days: form.additional_inspection_days.unwrap_or(0),
            seller_response_days: form.seller_response_days.unwrap_or(0),
            buyers_reply_days: form.buyers_reply_days.unwrap_or(0),
            repairs_closing_days: form.repairs_closing_days.unwrap_or(0),
            neighborhood_review: yes_no(form.neighborhood_review),
            neighborhood_review_days: form.neighborhood_review_days.unwrap_or(0),
            waived_risk_assessment: yes_no(form.waived_risk_assessment),
        }
    }
}

/// Buyer data with upstream defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedBuyer {
    #[serde(rename = "PI_SellPrice")]
    pub sell_price: f64,
    #[serde(rename = "PI_SellPriceW")]
    pub sell_price_words: String,
    #[serde(rename = "EM_PC1")]
    pub earnest_percent: f64,
    #[serde(rename = "Buyer1Name")]
    pub buyer1_name: String,
    #[serde(rename = "B_Email")]
    pub email: String,
    #[serde(rename = "Buyer2Name")]
    pub buyer2_name: String,
    #[serde(rename = "offer_price_num")]
    pub offer_price: f64,
    #[serde(rename = "offer_price_words")]
    pub offer_price_words: String,
    #[serde(rename = "earnest_amount_num")]
    pub earnest_amount: f64,
    #[serde(rename = "earnest_amount_delivery_days")]
    pub earnest_delivery_days: u32,
    #[serde(rename = "earnest_money_holder")]
    pub earnest_holder: String,
    #[serde(rename = "offer_expiration_days")]
    pub offer_expiration_days: u32,
    #[serde(rename = "B_Status")]
    pub status: String,
    #[serde(rename = "ClosingDate")]
    pub closing_date: String,
    #[serde(rename = "ServicesofUtils")]
    pub services_of_utils: String,
    #[serde(rename = "ChargesAssessments")]
    pub charges_assessments: String,
    #[serde(rename = "VerificationPeriod")]
    pub verification_period: String,
    #[serde(rename = "addendums")]
    pub addendums: Vec<String>,
}

/// Spell out a dollar amount for the document, preferring any wording
/// already carried on the draft.
fn price_words(words: &Option<String>, amount: Option<f64>) -> String {
    match words.as_deref().filter(|w| !w.trim().is_empty()) {
        Some(words) => words.to_string(),
        None => match amount {
            Some(amount) if amount > 0.0 => amount_in_words(amount as u64),
            _ => String::new(),
        },
    }
}

impl From<&BuyerData> for ProcessedBuyer {
    fn from(buyer: &BuyerData) -> Self {
        Self {
            sell_price: buyer.sell_price.unwrap_or(0.0),
            sell_price_words: price_words(&buyer.sell_price_words, buyer.sell_price),
            earnest_percent: buyer.earnest_percent.unwrap_or(0.0),
            buyer1_name: buyer.buyer1_name.clone().unwrap_or_default(),
            email: buyer.email.clone().unwrap_or_default(),
            buyer2_name: buyer.buyer2_name.clone().unwrap_or_default(),
            offer_price: buyer.offer_price.unwrap_or(0.0),
            offer_price_words: price_words(&buyer.offer_price_words, buyer.offer_price),
            earnest_amount: buyer.earnest_amount.unwrap_or(0.0),
            earnest_delivery_days: buyer.earnest_delivery_days.unwrap_or(0),
            earnest_holder: buyer.earnest_holder.clone().unwrap_or_default(),
            offer_expiration_days: buyer.offer_expiration_days.unwrap_or(0),
            status: buyer.status.clone().unwrap_or_default(),
            closing_date: buyer.closing_date.clone().unwrap_or_default(),
            services_of_utils: buyer.services_of_utils.clone().unwrap_or_default(),
            charges_assessments: buyer.charges_assessments.clone().unwrap_or_default(),
            verification_period: buyer.verification_period.clone().unwrap_or_default(),
            addendums: buyer.addendums.clone().unwrap_or_default(),
        }
    }
}

/// The request body sent to the offer-processing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    #[serde(rename = "MLS_ID")]
    pub mls_id: String,
    #[serde(rename = "Form22A_FromBuyer")]
    pub financing: ProcessedFinancing,
    #[serde(rename = "Form35_FromBuyer")]
    pub inspection: ProcessedInspection,
    #[serde(rename = "buyerdata")]
    pub buyer: ProcessedBuyer,
}
