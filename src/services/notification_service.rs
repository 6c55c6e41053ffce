//! Post-payment fan-out: vendor notification via the payment verification
//! endpoint, and the payer's confirmation email. Neither may fail a settlement.

use crate::external::{EmailService, PaymentVerificationClient, PaymentVerificationRequest};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Write;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct NoticeLine {
    pub title: String,
    pub quantity: i32,
    pub booking_date: Option<NaiveDate>,
    pub total_amount: f64,
    pub recipient_name: Option<String>,
}

/// Everything the notifier needs about a settled order.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementNotice {
    pub order_id: Uuid,
    pub transaction_hash: String,
    /// base units
    pub expected_amount: String,
    pub from_address: String,
    pub to_address: String,
    pub chain_id: u64,
    pub payer_email: String,
    pub payer_name: Option<String>,
    pub subtotal: f64,
    pub platform_fee: f64,
    pub total_amount: f64,
    pub lines: Vec<NoticeLine>,
}

#[async_trait]
pub trait PaymentNotifier: Send + Sync {
    /// Must not panic or propagate errors; failures are logged.
    async fn notify(&self, notice: SettlementNotice);
}

#[derive(Clone)]
pub struct PostPaymentNotifier {
    verification: PaymentVerificationClient,
    email: EmailService,
}

impl PostPaymentNotifier {
    pub fn new(verification: PaymentVerificationClient, email: EmailService) -> Self {
        Self {
            verification,
            email,
        }
    }

    async fn trigger_verification(&self, notice: &SettlementNotice) {
        let request = PaymentVerificationRequest {
            transaction_hash: notice.transaction_hash.clone(),
            order_id: notice.order_id.to_string(),
            expected_amount: notice.expected_amount.clone(),
            from_address: notice.from_address.clone(),
            to_address: notice.to_address.clone(),
            chain_id: notice.chain_id,
        };
        if let Err(e) = self.verification.verify_payment(&request).await {
            log::warn!(
                "Vendor notification for order {} failed: {}",
                notice.order_id,
                e
            );
        }
    }

    async fn send_confirmation(&self, notice: &SettlementNotice) {
        let subject = format!("UniTick payment confirmed - order {}", notice.order_id);
        let body = render_confirmation(notice);
        if let Err(e) = self.email.send(&notice.payer_email, &subject, &body).await {
            log::warn!(
                "Confirmation email for order {} failed: {}",
                notice.order_id,
                e
            );
        }
    }
}

#[async_trait]
impl PaymentNotifier for PostPaymentNotifier {
    async fn notify(&self, notice: SettlementNotice) {
        tokio::join!(
            self.trigger_verification(&notice),
            self.send_confirmation(&notice)
        );
    }
}

pub fn render_confirmation(notice: &SettlementNotice) -> String {
    let mut out = String::new();
    let greeting = notice.payer_name.as_deref().unwrap_or("there");
    let _ = writeln!(out, "Hi {greeting},");
    let _ = writeln!(out);
    let _ = writeln!(out, "Your payment was confirmed on-chain.");
    let _ = writeln!(out);
    let _ = writeln!(out, "Order: {}", notice.order_id);
    let _ = writeln!(out, "Transaction: {}", notice.transaction_hash);
    let _ = writeln!(out);

    for line in &notice.lines {
        let _ = write!(out, "- {} x{}", line.title, line.quantity);
        if let Some(date) = line.booking_date {
            let _ = write!(out, " on {date}");
        }
        if let Some(recipient) = &line.recipient_name {
            let _ = write!(out, " (gift for {recipient})");
        }
        let _ = writeln!(out, ": {:.2} UTICK", line.total_amount);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Subtotal: {:.2} UTICK", notice.subtotal);
    let _ = writeln!(out, "Platform fee: {:.2} UTICK", notice.platform_fee);
    let _ = writeln!(out, "Total: {:.2} UTICK", notice.total_amount);
    out
}
