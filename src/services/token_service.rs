use crate::error::{AppError, AppResult};
use crate::external::{CustodialWallet, TicketingContract};
use crate::models::{CreateWalletResponse, TokenApprovalResponse, TokenStatusResponse};
use crate::services::{ProfileService, WalletService};
use crate::utils::format_token_amount;
use alloy::primitives::U256;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct TokenService {
    profiles: ProfileService,
    wallets: WalletService,
    contract: Arc<dyn TicketingContract>,
}

impl TokenService {
    pub fn new(
        profiles: ProfileService,
        wallets: WalletService,
        contract: Arc<dyn TicketingContract>,
    ) -> Self {
        Self {
            profiles,
            wallets,
            contract,
        }
    }

    async fn custodial_wallet(&self, user_id: Uuid) -> AppResult<CustodialWallet> {
        let profile = self.profiles.get_profile(user_id).await?;
        self.wallets
            .find_wallet(user_id, &profile.email)
            .await?
            .ok_or_else(|| {
                AppError::WalletNotFound(
                    "No wallet found for this user. Please create a wallet first.".to_string(),
                )
            })
    }

    pub async fn create_wallet(&self, user_id: Uuid) -> AppResult<CreateWalletResponse> {
        let profile = self.profiles.get_profile(user_id).await?;
        let address = self.wallets.create_wallet(user_id, &profile.email).await?;
        Ok(CreateWalletResponse {
            success: true,
            wallet_address: address.to_checksum(None),
        })
    }

    pub async fn get_token_status(&self, user_id: Uuid) -> AppResult<TokenStatusResponse> {
        let wallet = self.custodial_wallet(user_id).await?;

        let balance = self.contract.token_balance(wallet.address).await?;
        let allowance = self.contract.token_allowance(wallet.address).await?;

        Ok(TokenStatusResponse {
            success: true,
            wallet_address: wallet.address.to_checksum(None),
            contract_address: self.contract.contract_address().to_checksum(None),
            balance: balance.to_string(),
            allowance: allowance.to_string(),
            balance_formatted: format_token_amount(balance),
            allowance_formatted: format_token_amount(allowance),
            needs_wallet_creation: false,
        })
    }

    /// Approves the ticketing contract to spend `amount` base units from the
    /// user's custodial wallet, then confirms the allowance actually moved.
    pub async fn approve_tokens(
        &self,
        user_id: Uuid,
        amount: U256,
    ) -> AppResult<TokenApprovalResponse> {
        let wallet = self.custodial_wallet(user_id).await?;

        let balance = self.contract.token_balance(wallet.address).await?;
        if balance < amount {
            return Err(AppError::InsufficientBalance {
                balance: balance.to_string(),
                required: amount.to_string(),
            });
        }

        let outcome = self.contract.approve_tokens(&wallet, amount).await?;
        if !outcome.success {
            return Err(AppError::TransactionFailed(format!(
                "Approval transaction {} did not succeed",
                outcome.transaction_hash
            )));
        }

        let allowance = self.contract.token_allowance(wallet.address).await?;
        if allowance < amount {
            return Err(AppError::AllowanceVerificationFailed {
                allowance: allowance.to_string(),
                required: amount.to_string(),
            });
        }

        log::info!(
            "Approved {} UTICK base units for {} (tx {})",
            amount,
            wallet.address,
            outcome.transaction_hash
        );

        Ok(TokenApprovalResponse {
            success: true,
            transaction_hash: outcome.transaction_hash.to_string(),
            allowance: allowance.to_string(),
            message: "Token approval successful".to_string(),
        })
    }
}
