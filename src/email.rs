//! Submission emails — internal notification plus buyer confirmation,
//! sent over SMTP via lettre.
//!
//! Email is a side effect of a successful upstream call: failures here are
//! logged and never change the submission result.

use std::sync::Arc;

use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::clients::submission::SubmissionResult;
use crate::error::EmailError;
use crate::wizard::draft::SubmissionPayload;

// ── Configuration ───────────────────────────────────────────────────

/// SMTP configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    /// Internal mailbox that receives every submission.
    pub team_address: String,
}

impl EmailConfig {
    /// Build config from environment variables.
    /// Returns `None` if `OFFER_SMTP_HOST` is not set (email disabled).
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("OFFER_SMTP_HOST").ok()?;

        let smtp_port: u16 = std::env::var("OFFER_SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(465);

        let username = std::env::var("OFFER_SMTP_USERNAME").unwrap_or_default();
        let password = std::env::var("OFFER_SMTP_PASSWORD").unwrap_or_default();
        let from_address =
            std::env::var("OFFER_FROM_ADDRESS").unwrap_or_else(|_| username.clone());
        let team_address = std::env::var("OFFER_TEAM_ADDRESS").unwrap_or_else(|_| from_address.clone());

        Some(Self {
            smtp_host,
            smtp_port,
            username,
            password,
            from_address,
            team_address,
        })
    }
}

// ── Body formatting ─────────────────────────────────────────────────

const DIVIDER: &str = "═══════════════════════════════════════════";

fn earnest_percent(payload: &SubmissionPayload) -> String {
    let offer = payload.buyer.offer_price;
    if offer > 0.0 {
        format!("{:.2}%", payload.buyer.earnest_amount / offer * 100.0)
    } else {
        "n/a".to_string()
    }
}

/// Subject line for the internal notification. Carries the assistance
/// marker so flagged offers stand out in the inbox.
pub fn internal_subject(payload: &SubmissionPayload, agent_help: bool) -> String {
    format!(
        "{}New Offer - MLS {} - {}",
        if agent_help { "[ASSISTANCE NEEDED] " } else { "" },
        payload.mls_id,
        payload.buyer.buyer1_name
    )
}

/// Plain-text body of the internal notification.
pub fn internal_notification_body(
    payload: &SubmissionPayload,
    include_inspection: bool,
    agent_help: bool,
    agent_help_notes: Option<&str>,
    document_url: Option<&str>,
) -> String {
    let buyer = &payload.buyer;
    let mut body = format!("New Offer Submission - MLS ID: {}\n", payload.mls_id);

    if let Some(url) = document_url {
        body.push_str(&format!(
            "\n{DIVIDER}\nOFFER DOCUMENT\n{DIVIDER}\nPDF Download: {url}\n"
        ));
    }

    body.push_str(&format!(
        "\n{DIVIDER}\nBUYER INFORMATION\n{DIVIDER}\nPrimary Buyer: {}\n",
        buyer.buyer1_name
    ));
    if !buyer.buyer2_name.is_empty() {
        body.push_str(&format!("Secondary Buyer: {}\n", buyer.buyer2_name));
    }
    body.push_str(&format!(
        "Email: {}\nBuyer Status: {}\nClosing Date: {}\n",
        buyer.email, buyer.status, buyer.closing_date
    ));

    body.push_str(&format!(
        "\n{DIVIDER}\nOFFER DETAILS\n{DIVIDER}\n\
         Offer Price: ${:.0}\n\
         Offer Price (Words): {}\n\
         Earnest Money: ${:.0}\n\
         Earnest Money %: {}\n\
         Earnest Money Delivery: {} days\n\
         Earnest Money Holder: {}\n\
         Offer Valid For: {} days\n",
        buyer.offer_price,
        buyer.offer_price_words,
        buyer.earnest_amount,
        earnest_percent(payload),
        buyer.earnest_delivery_days,
        buyer.earnest_holder,
        buyer.offer_expiration_days,
    ));

    body.push_str(&format!(
        "\n{DIVIDER}\nADDITIONAL SETTINGS\n{DIVIDER}\n\
         Charges & Assessments: {}\nVerification Period: {}\n",
        buyer.charges_assessments, buyer.verification_period,
    ));

    let financing = &payload.financing;
    body.push_str(&format!(
        "\n{DIVIDER}\nFINANCING ADDENDUM\n{DIVIDER}\n\
         Type of Loan: {}\n\
         Down Payment: {}{}\n\
         Days to Apply for Loan: {}\n\
         Financial Contingency: {}\n\
         Financial Contingency Timeframe: {} days\n\
         Appraisal Contingency: {}\n",
        financing.loan_type,
        financing.down_payment_magnitude,
        if financing.down_payment_type == "PERCENTAGE" { "%" } else { " dollars" },
        financing.loan_application_days,
        financing.financing_contingency,
        financing.financing_contingency_days,
        financing.appraisal_contingency,
    ));
    if financing.loan_type == "VA" {
        body.push_str(&format!(
            "Buyer Pays Escrow Fee for VA Loan: {}\n",
            financing.va_escrow_fee
        ));
    }

    if include_inspection {
        let inspection = &payload.inspection;
        body.push_str(&format!(
            "\n{DIVIDER}\nINSPECTION ADDENDUM\n{DIVIDER}\nSewer Survey: {}\n",
            inspection.sewer_survey
        ));
        if inspection.sewer_survey == "YES" {
            body.push_str(&format!(
                "Buyer's Notice Period: {} days\nRequest Seller's Report: {}\n",
                inspection.buyers_notice_days, inspection.inspection_report
            ));
        }
        body.push_str(&format!(
            "Additional Time for Inspection: {} days\n\
             Seller Response Time: {} days\n\
             Buyer's Reply Time: {} days\n\
             Repairs Before Closing: {} days\n\
             Buyer Waived Risk Assessment: {}\n",
            inspection.additional_inspection_days,
            inspection.seller_response_days,
            inspection.buyers_reply_days,
            inspection.repairs_closing_days,
            inspection.waived_risk_assessment,
        ));
    }

    if agent_help {
        body.push_str(&format!(
            "\n{DIVIDER}\nAGENT ASSISTANCE REQUESTED\n{DIVIDER}\n{}\n",
            agent_help_notes.unwrap_or("No additional notes provided.")
        ));
    }

    body.push_str(&format!(
        "\n{DIVIDER}\nSubmitted: {}\n{DIVIDER}\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    body
}

/// Plain-text body of the buyer confirmation.
pub fn buyer_confirmation_body(
    payload: &SubmissionPayload,
    agent_help: bool,
    document_url: Option<&str>,
) -> String {
    let buyer = &payload.buyer;
    let mut body = format!(
        "Hi {},\n\nThank you for submitting your offer!\n\n\
         We've received your offer for the property (MLS ID: {}) and our team \
         is reviewing it now.\n",
        buyer.buyer1_name, payload.mls_id
    );

    if let Some(url) = document_url {
        body.push_str(&format!(
            "\nYOUR OFFER DOCUMENT\n{DIVIDER}\nDownload your offer: {url}\n"
        ));
    }

    body.push_str(&format!(
        "\nOFFER SUMMARY\n{DIVIDER}\n\
         Offer Price: ${:.0}\n\
         Earnest Money: ${:.0} ({})\n\
         Earnest Money Due: {} days after acceptance\n\
         Earnest Money Holder: {}\n\
         Offer Valid For: {} days\n\
         Desired Closing: {}\n",
        buyer.offer_price,
        buyer.earnest_amount,
        earnest_percent(payload),
        buyer.earnest_delivery_days,
        buyer.earnest_holder,
        buyer.offer_expiration_days,
        buyer.closing_date,
    ));

    body.push_str(&format!(
        "\nWHAT HAPPENS NEXT?\n{DIVIDER}\n\
         1. You'll receive your offer documents for e-signature within a few hours\n\
         2. Once signed, we'll submit your offer to the seller's agent\n\
         3. The seller typically responds within 24-48 hours\n\
         4. We'll keep you updated throughout the entire process\n",
    ));

    if agent_help {
        body.push_str(
            "\nAn agent will reach out to you shortly regarding your request for assistance.\n",
        );
    }

    body.push_str("\nBest regards,\nThe Offer Team\n");
    body
}

// ── Sending ─────────────────────────────────────────────────────────

/// Sends the submission emails over SMTP.
pub struct OfferMailer {
    config: EmailConfig,
}

impl OfferMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn send(
        &self,
        to: &str,
        reply_to: Option<&str>,
        subject: &str,
        body: &str,
    ) -> Result<(), EmailError> {
        let creds = Credentials::new(
            self.config.username.clone(),
            self.config.password.clone(),
        );

        let transport = SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| EmailError::Send(format!("SMTP relay error: {e}")))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build();

        let mut builder = Message::builder()
            .from(
                self.config
                    .from_address
                    .parse()
                    .map_err(|e| EmailError::InvalidAddress {
                        address: self.config.from_address.clone(),
                        reason: format!("{e}"),
                    })?,
            )
            .to(to.parse().map_err(|e| EmailError::InvalidAddress {
                address: to.to_string(),
                reason: format!("{e}"),
            })?)
            .subject(subject);

        if let Some(reply_to) = reply_to {
            if let Ok(addr) = reply_to.parse() {
                builder = builder.reply_to(addr);
            }
        }

        let email = builder
            .body(body.to_string())
            .map_err(|e| EmailError::Build(e.to_string()))?;

        transport
            .send(&email)
            .map_err(|e| EmailError::Send(e.to_string()))?;

        tracing::info!(to, "Submission email sent");
        Ok(())
    }

    /// Send the internal notification and, when the buyer left an address,
    /// the buyer confirmation. Runs on the blocking pool; every failure is
    /// logged and swallowed.
    pub async fn send_submission_emails(
        self: Arc<Self>,
        payload: SubmissionPayload,
        include_inspection: bool,
        agent_help: bool,
        agent_help_notes: Option<String>,
        result: &SubmissionResult,
    ) {
        let document_url = match result {
            SubmissionResult::Success { document_url, .. } => document_url.clone(),
            SubmissionResult::Failure { .. } => return,
        };

        let outcome = tokio::task::spawn_blocking(move || {
            let subject = internal_subject(&payload, agent_help);
            let body = internal_notification_body(
                &payload,
                include_inspection,
                agent_help,
                agent_help_notes.as_deref(),
                document_url.as_deref(),
            );
            let buyer_email = payload.buyer.email.trim().to_string();
            let reply_to = (!buyer_email.is_empty()).then_some(buyer_email.as_str());
            self.send(&self.config.team_address, reply_to, &subject, &body)?;

            if buyer_email.is_empty() {
                tracing::info!("Skipping buyer confirmation, no email address provided");
                return Ok::<(), EmailError>(());
            }
            let subject = format!("Offer Received - MLS {}", payload.mls_id);
            let body = buyer_confirmation_body(&payload, agent_help, document_url.as_deref());
            self.send(&buyer_email, None, &subject, &body)
        })
        .await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Submission email failed"),
            Err(e) => tracing::warn!(error = %e, "Submission email task panicked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::draft::{
        BuyerData, FinancingAddendum, InspectionAddendum, LoanType, OfferDraft, YesNo,
    };
    use crate::wizard::step::Toggles;

    fn payload(toggles: Toggles) -> SubmissionPayload {
        let draft = OfferDraft {
            mls_id: Some("2254520".into()),
            buyer: Some(BuyerData {
                buyer1_name: Some("Jane Doe".into()),
                email: Some("jane@example.com".into()),
                status: Some("A single person".into()),
                closing_date: Some("2026-10-15".into()),
                offer_price: Some(750_000.0),
                earnest_amount: Some(15_000.0),
                earnest_delivery_days: Some(3),
                earnest_holder: Some("Closing Agent".into()),
                offer_expiration_days: Some(2),
                charges_assessments: Some("ProRated".into()),
                ..Default::default()
            }),
            financing: Some(FinancingAddendum {
                loan_type: Some(LoanType::Va),
                va_escrow_fee: Some(YesNo::Yes),
                ..Default::default()
            }),
            inspection: Some(InspectionAddendum {
                sewer_survey: Some(YesNo::Yes),
                buyers_notice_days: Some(10),
                ..Default::default()
            }),
            ..Default::default()
        };
        draft.submission_payload(toggles)
    }

    const BOTH: Toggles = Toggles {
        include_financing: true,
        include_inspection: true,
    };

    #[test]
    fn internal_subject_carries_assistance_marker() {
        let payload = payload(BOTH);
        assert_eq!(
            internal_subject(&payload, false),
            "New Offer - MLS 2254520 - Jane Doe"
        );
        assert_eq!(
            internal_subject(&payload, true),
            "[ASSISTANCE NEEDED] New Offer - MLS 2254520 - Jane Doe"
        );
    }

    #[test]
    fn internal_body_sections_track_inputs() {
        let payload = payload(BOTH);
        let body = internal_notification_body(
            &payload,
            true,
            true,
            Some("first-time buyer"),
            Some("https://offers.example.com/o.pdf"),
        );
        assert!(body.contains("PDF Download: https://offers.example.com/o.pdf"));
        assert!(body.contains("Primary Buyer: Jane Doe"));
        assert!(!body.contains("Secondary Buyer"));
        assert!(body.contains("Earnest Money %: 2.00%"));
        assert!(body.contains("Buyer Pays Escrow Fee for VA Loan: YES"));
        assert!(body.contains("Sewer Survey: YES"));
        assert!(body.contains("Buyer's Notice Period: 10 days"));
        assert!(body.contains("AGENT ASSISTANCE REQUESTED"));
        assert!(body.contains("first-time buyer"));
    }

    #[test]
    fn internal_body_omits_optional_sections() {
        let payload = payload(Toggles {
            include_financing: true,
            include_inspection: false,
        });
        let body = internal_notification_body(&payload, false, false, None, None);
        assert!(!body.contains("OFFER DOCUMENT"));
        assert!(!body.contains("INSPECTION ADDENDUM"));
        assert!(!body.contains("AGENT ASSISTANCE"));
        // Non-VA defaults suppress the escrow line.
        let non_va = OfferDraft::default().submission_payload(Toggles::default());
        let body = internal_notification_body(&non_va, false, false, None, None);
        assert!(!body.contains("Escrow Fee for VA Loan"));
    }

    #[test]
    fn buyer_body_summary_and_next_steps() {
        let payload = payload(BOTH);
        let body = buyer_confirmation_body(&payload, false, None);
        assert!(body.contains("Hi Jane Doe,"));
        assert!(body.contains("MLS ID: 2254520"));
        assert!(body.contains("Earnest Money: $15000 (2.00%)"));
        assert!(body.contains("WHAT HAPPENS NEXT?"));
        assert!(!body.contains("YOUR OFFER DOCUMENT"));
        assert!(!body.contains("reach out to you shortly"));

        let body = buyer_confirmation_body(&payload, true, Some("https://x/o.pdf"));
        assert!(body.contains("Download your offer: https://x/o.pdf"));
        assert!(body.contains("reach out to you shortly"));
    }

    #[test]
    fn earnest_percent_handles_zero_offer() {
        let empty = OfferDraft::default().submission_payload(Toggles::default());
        assert_eq!(earnest_percent(&empty), "n/a");
    }
}
