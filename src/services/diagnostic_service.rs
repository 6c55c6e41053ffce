use crate::error::{AppError, AppResult};
use crate::external::TicketingContract;
use crate::models::{
    CartItemPayload, DiagnosticReport, ItemDiagnostic, PlatformDiagnostic, VendorDiagnostic,
};
use crate::services::{CartService, ProfileService, WalletService};
use crate::utils::wei::has_precision_loss;
use crate::utils::{
    amount_to_wei, compute_cart_totals, is_valid_address, parse_address, requires_approval,
};
use alloy::primitives::{Address, U256};
use std::sync::Arc;
use uuid::Uuid;

/// Read-only pre-flight checklist for a cart. Re-derives what settlement
/// would check and reports it instead of acting on it.
#[derive(Clone)]
pub struct DiagnosticService {
    profiles: ProfileService,
    wallets: WalletService,
    carts: CartService,
    contract: Arc<dyn TicketingContract>,
}

#[derive(Default)]
struct Findings {
    issues: Vec<String>,
    warnings: Vec<String>,
}

impl DiagnosticService {
    pub fn new(
        profiles: ProfileService,
        wallets: WalletService,
        carts: CartService,
        contract: Arc<dyn TicketingContract>,
    ) -> Self {
        Self {
            profiles,
            wallets,
            carts,
            contract,
        }
    }

    /// Checks the listed items as stored in the caller's cart; only their ids
    /// are taken from `requested`.
    pub async fn run(
        &self,
        user_id: Uuid,
        requested: &[CartItemPayload],
    ) -> AppResult<DiagnosticReport> {
        if requested.is_empty() {
            return Err(AppError::ValidationError(
                "cartItems must not be empty".to_string(),
            ));
        }

        let profile = self.profiles.get_profile(user_id).await?;
        let wallet = self
            .wallets
            .find_wallet(user_id, &profile.email)
            .await?
            .ok_or_else(|| AppError::WalletNotFound("No wallet found for this user".to_string()))?;

        let items = self.carts.resolve_items(user_id, requested).await?;
        let cart = items.as_slice();
        let mut findings = Findings::default();

        let totals = compute_cart_totals(cart);
        let required = match amount_to_wei(totals.total_amount) {
            Ok(wei) => wei,
            Err(e) => {
                findings.issues.push(format!("Cart total cannot be converted: {e}"));
                U256::ZERO
            }
        };
        let precision_loss = has_precision_loss(totals.total_amount, required);
        if precision_loss {
            findings.issues.push(format!(
                "Precision loss converting {} to base units",
                totals.total_amount
            ));
        }

        let balance = self.contract.token_balance(wallet.address).await?;
        let allowance = self.contract.token_allowance(wallet.address).await?;
        let has_sufficient_balance = balance >= required;
        let needs_approval = requires_approval(allowance, required);
        if !has_sufficient_balance {
            findings.issues.push(format!(
                "Insufficient UTICK balance: have {balance}, need {required}"
            ));
        }
        if needs_approval {
            findings.issues.push(format!(
                "Token approval required: allowance {allowance}, need {required}"
            ));
        }

        let vendors = self.check_vendors(cart, &mut findings).await;
        let items = check_items(cart, &mut findings);
        let platform = self.check_platform(&mut findings).await;

        let can_proceed = findings.issues.is_empty();
        log::info!(
            "Payment diagnostic for {}: {} issue(s), {} warning(s)",
            user_id,
            findings.issues.len(),
            findings.warnings.len()
        );

        Ok(DiagnosticReport {
            wallet_address: wallet.address.to_checksum(None),
            contract_address: self.contract.contract_address().to_checksum(None),
            subtotal: totals.subtotal,
            platform_fee: totals.platform_fee,
            total_amount: totals.total_amount,
            required_amount: required.to_string(),
            balance: balance.to_string(),
            allowance: allowance.to_string(),
            has_sufficient_balance,
            needs_approval,
            precision_loss,
            vendors,
            items,
            platform,
            issues: findings.issues,
            warnings: findings.warnings,
            can_proceed,
        })
    }

    /// Whitelist status, once per distinct vendor.
    async fn check_vendors(
        &self,
        cart: &[CartItemPayload],
        findings: &mut Findings,
    ) -> Vec<VendorDiagnostic> {
        let mut vendors: Vec<VendorDiagnostic> = Vec::new();

        for item in cart {
            if vendors.iter().any(|v| v.vendor_id == item.vendor_id) {
                continue;
            }
            let wallet_address = item.vendor.wallet_address.clone();

            let whitelisted = match wallet_address
                .as_deref()
                .map(|w| parse_address(w, "vendor wallet"))
            {
                None => {
                    findings
                        .issues
                        .push(format!("Vendor {} has no wallet address", item.vendor_id));
                    false
                }
                Some(Err(e)) => {
                    findings.issues.push(format!("Vendor {}: {e}", item.vendor_id));
                    false
                }
                Some(Ok(address)) => match self.contract.is_vendor_whitelisted(address).await {
                    Ok(true) => true,
                    Ok(false) => {
                        findings.issues.push(format!(
                            "Vendor {} ({}) is not whitelisted on the ticketing contract",
                            item.vendor_id, address
                        ));
                        false
                    }
                    Err(e) => {
                        findings.issues.push(format!(
                            "Could not check whitelist for vendor {}: {e}",
                            item.vendor_id
                        ));
                        false
                    }
                },
            };

            vendors.push(VendorDiagnostic {
                vendor_id: item.vendor_id,
                wallet_address,
                whitelisted,
            });
        }

        vendors
    }

    async fn check_platform(&self, findings: &mut Findings) -> Option<PlatformDiagnostic> {
        let config = match self.contract.platform_config().await {
            Ok(config) => config,
            Err(e) => {
                findings
                    .issues
                    .push(format!("Could not read platform configuration: {e}"));
                return None;
            }
        };

        if config.platform_wallet == Address::ZERO {
            findings
                .issues
                .push("Platform wallet is not configured on the contract".to_string());
        }
        if config.platform_fee_bps.is_zero() {
            findings
                .warnings
                .push("Platform fee is set to 0 bps".to_string());
        }

        Some(PlatformDiagnostic {
            platform_wallet: config.platform_wallet.to_checksum(None),
            platform_fee_bps: config.platform_fee_bps.saturating_to::<u64>(),
        })
    }
}

fn check_items(cart: &[CartItemPayload], findings: &mut Findings) -> Vec<ItemDiagnostic> {
    cart.iter()
        .map(|item| {
            let title = &item.listing.title;
            let vendor_address_valid = item
                .vendor
                .wallet_address
                .as_deref()
                .is_some_and(is_valid_address);
            if !vendor_address_valid {
                findings
                    .issues
                    .push(format!("{title}: vendor wallet address is invalid"));
            }
            if !item.vendor.is_verified {
                findings
                    .warnings
                    .push(format!("{title}: vendor is not verified"));
            }
            if item.quantity <= 0 {
                findings
                    .issues
                    .push(format!("{title}: invalid quantity {}", item.quantity));
            }

            let recipient_wallet_valid = item.is_gift.then(|| {
                let valid = item.recipient_wallet().is_some_and(is_valid_address);
                if !valid {
                    findings
                        .issues
                        .push(format!("{title}: gift recipient wallet is missing or invalid"));
                }
                valid
            });

            ItemDiagnostic {
                item_id: item.id,
                listing_title: title.clone(),
                price: item.listing.price,
                quantity: item.quantity,
                vendor_address_valid,
                vendor_verified: item.vendor.is_verified,
                is_gift: item.is_gift,
                recipient_wallet_valid,
            }
        })
        .collect()
}
