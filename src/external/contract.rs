//! UniTick token and ticketing contract access.
//!
//! Services depend on [`TicketingContract`]; [`EvmTicketingContract`] is the
//! JSON-RPC implementation bound to one chain and one pair of contracts.

use crate::config::ChainConfig;
use crate::error::{AppError, AppResult};
use crate::utils::parse_address;
use alloy::network::EthereumWallet;
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{Log, TransactionReceipt};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use async_trait::async_trait;

sol! {
    #[sol(rpc)]
    interface IUniTickToken {
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

sol! {
    struct TicketPurchase {
        address vendor;
        address recipient;
        string listingId;
        uint256 unitPrice;
        uint256 quantity;
        string bookingDate;
    }

    #[sol(rpc)]
    interface IUniTickTicketing {
        event OrderCreated(
            uint256 indexed orderId,
            address indexed buyer,
            uint256 totalAmount,
            address nftContract,
            uint256 batchId
        );

        function createOrder(TicketPurchase[] calldata items, uint256 totalAmount)
            external
            returns (uint256 orderId);
        function createGiftOrder(
            TicketPurchase[] calldata items,
            uint256 totalAmount,
            string calldata giftMessage
        ) external returns (uint256 orderId);
        function isVendorWhitelisted(address vendor) external view returns (bool);
        function platformWallet() external view returns (address);
        function platformFeeBps() external view returns (uint256);
    }
}

/// A decrypted custodial wallet. Only lives for the duration of a request.
#[derive(Clone)]
pub struct CustodialWallet {
    pub address: Address,
    pub signer: PrivateKeySigner,
}

impl std::fmt::Debug for CustodialWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustodialWallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TxOutcome {
    pub transaction_hash: B256,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractOrderItem {
    pub vendor: Address,
    /// Wallet that receives the NFT ticket
    pub recipient: Address,
    pub listing_id: String,
    pub unit_price: U256,
    pub quantity: u64,
    pub booking_date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractOrder {
    pub items: Vec<ContractOrderItem>,
    /// Subtotal plus platform fee, in base units
    pub total_amount: U256,
    pub gift_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractOrderReceipt {
    /// `None` when the mined transaction carried no decodable `OrderCreated`
    pub blockchain_order_id: Option<U256>,
    pub transaction_hash: B256,
    pub nft_contract_address: Option<Address>,
    pub nft_batch_id: Option<U256>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlatformConfig {
    pub platform_wallet: Address,
    pub platform_fee_bps: U256,
}

#[async_trait]
pub trait TicketingContract: Send + Sync {
    fn chain_id(&self) -> u64;
    fn contract_address(&self) -> Address;

    async fn token_balance(&self, owner: Address) -> AppResult<U256>;

    /// Allowance granted by `owner` to the ticketing contract.
    async fn token_allowance(&self, owner: Address) -> AppResult<U256>;

    /// `approve(ticketing contract, amount)`, waiting for one confirmation.
    async fn approve_tokens(&self, wallet: &CustodialWallet, amount: U256)
    -> AppResult<TxOutcome>;

    async fn create_order(
        &self,
        wallet: &CustodialWallet,
        order: &ContractOrder,
    ) -> AppResult<ContractOrderReceipt>;

    async fn create_gift_order(
        &self,
        wallet: &CustodialWallet,
        order: &ContractOrder,
    ) -> AppResult<ContractOrderReceipt>;

    async fn is_vendor_whitelisted(&self, vendor: Address) -> AppResult<bool>;

    async fn platform_config(&self) -> AppResult<PlatformConfig>;
}

pub struct EvmTicketingContract {
    provider: DynProvider,
    rpc_url: reqwest::Url,
    chain_id: u64,
    token_address: Address,
    contract_address: Address,
}

impl EvmTicketingContract {
    pub fn new(config: &ChainConfig) -> AppResult<Self> {
        let rpc_url: reqwest::Url = config
            .rpc_url
            .parse()
            .map_err(|e| AppError::ConfigError(format!("Invalid chain RPC url: {e}")))?;
        let token_address = parse_address(&config.token_address, "token contract")
            .map_err(|e| AppError::ConfigError(e.to_string()))?;
        let contract_address =
            parse_address(&config.ticketing_contract_address, "ticketing contract")
                .map_err(|e| AppError::ConfigError(e.to_string()))?;

        let provider = ProviderBuilder::new()
            .connect_http(rpc_url.clone())
            .erased();

        Ok(Self {
            provider,
            rpc_url,
            chain_id: config.chain_id,
            token_address,
            contract_address,
        })
    }

    fn signing_provider(&self, wallet: &CustodialWallet) -> DynProvider {
        ProviderBuilder::new()
            .wallet(EthereumWallet::from(wallet.signer.clone()))
            .connect_http(self.rpc_url.clone())
            .erased()
    }

    fn purchases(order: &ContractOrder) -> Vec<TicketPurchase> {
        order
            .items
            .iter()
            .map(|item| TicketPurchase {
                vendor: item.vendor,
                recipient: item.recipient,
                listingId: item.listing_id.clone(),
                unitPrice: item.unit_price,
                quantity: U256::from(item.quantity),
                bookingDate: item.booking_date.clone(),
            })
            .collect()
    }

    fn order_receipt(receipt: &TransactionReceipt) -> AppResult<ContractOrderReceipt> {
        Self::settled_order(
            receipt.transaction_hash,
            receipt.status(),
            receipt.inner.logs(),
        )
    }

    /// A reverted transaction is an error. A mined one is always a settled
    /// order, even when its `OrderCreated` event cannot be decoded.
    fn settled_order(
        transaction_hash: B256,
        success: bool,
        logs: &[Log],
    ) -> AppResult<ContractOrderReceipt> {
        if !success {
            return Err(AppError::TransactionFailed(format!(
                "Order transaction {transaction_hash} reverted"
            )));
        }

        let created = logs
            .iter()
            .find_map(|log| log.log_decode::<IUniTickTicketing::OrderCreated>().ok())
            .map(|decoded| decoded.inner.data);
        let Some(event) = created else {
            log::warn!("OrderCreated event missing from transaction {transaction_hash}");
            return Ok(ContractOrderReceipt {
                blockchain_order_id: None,
                transaction_hash,
                nft_contract_address: None,
                nft_batch_id: None,
            });
        };

        Ok(ContractOrderReceipt {
            blockchain_order_id: Some(event.orderId),
            transaction_hash,
            nft_contract_address: (event.nftContract != Address::ZERO)
                .then_some(event.nftContract),
            nft_batch_id: Some(event.batchId),
        })
    }
}

fn rpc_error(action: &str, e: impl std::fmt::Display) -> AppError {
    AppError::ChainError(format!("{action}: {e}"))
}

#[async_trait]
impl TicketingContract for EvmTicketingContract {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn contract_address(&self) -> Address {
        self.contract_address
    }

    async fn token_balance(&self, owner: Address) -> AppResult<U256> {
        IUniTickToken::new(self.token_address, &self.provider)
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| rpc_error("Failed to read UTICK balance", e))
    }

    async fn token_allowance(&self, owner: Address) -> AppResult<U256> {
        IUniTickToken::new(self.token_address, &self.provider)
            .allowance(owner, self.contract_address)
            .call()
            .await
            .map_err(|e| rpc_error("Failed to read UTICK allowance", e))
    }

    async fn approve_tokens(
        &self,
        wallet: &CustodialWallet,
        amount: U256,
    ) -> AppResult<TxOutcome> {
        let provider = self.signing_provider(wallet);
        let token = IUniTickToken::new(self.token_address, &provider);

        let pending = token
            .approve(self.contract_address, amount)
            .from(wallet.address)
            .send()
            .await
            .map_err(|e| rpc_error("Failed to submit approval", e))?;
        log::info!(
            "Approval transaction submitted: {} for {}",
            pending.tx_hash(),
            wallet.address
        );

        let receipt = pending
            .with_required_confirmations(1)
            .get_receipt()
            .await
            .map_err(|e| rpc_error("Failed waiting for approval receipt", e))?;

        Ok(TxOutcome {
            transaction_hash: receipt.transaction_hash,
            success: receipt.status(),
        })
    }

    async fn create_order(
        &self,
        wallet: &CustodialWallet,
        order: &ContractOrder,
    ) -> AppResult<ContractOrderReceipt> {
        let provider = self.signing_provider(wallet);
        let ticketing = IUniTickTicketing::new(self.contract_address, &provider);

        let receipt = ticketing
            .createOrder(Self::purchases(order), order.total_amount)
            .from(wallet.address)
            .send()
            .await
            .map_err(|e| rpc_error("Failed to submit order", e))?
            .with_required_confirmations(1)
            .get_receipt()
            .await
            .map_err(|e| rpc_error("Failed waiting for order receipt", e))?;

        Self::order_receipt(&receipt)
    }

    async fn create_gift_order(
        &self,
        wallet: &CustodialWallet,
        order: &ContractOrder,
    ) -> AppResult<ContractOrderReceipt> {
        let provider = self.signing_provider(wallet);
        let ticketing = IUniTickTicketing::new(self.contract_address, &provider);

        let receipt = ticketing
            .createGiftOrder(
                Self::purchases(order),
                order.total_amount,
                order.gift_message.clone().unwrap_or_default(),
            )
            .from(wallet.address)
            .send()
            .await
            .map_err(|e| rpc_error("Failed to submit gift order", e))?
            .with_required_confirmations(1)
            .get_receipt()
            .await
            .map_err(|e| rpc_error("Failed waiting for gift order receipt", e))?;

        Self::order_receipt(&receipt)
    }

    async fn is_vendor_whitelisted(&self, vendor: Address) -> AppResult<bool> {
        IUniTickTicketing::new(self.contract_address, &self.provider)
            .isVendorWhitelisted(vendor)
            .call()
            .await
            .map_err(|e| rpc_error("Failed to read vendor whitelist", e))
    }

    async fn platform_config(&self) -> AppResult<PlatformConfig> {
        let ticketing = IUniTickTicketing::new(self.contract_address, &self.provider);
        let platform_wallet = ticketing
            .platformWallet()
            .call()
            .await
            .map_err(|e| rpc_error("Failed to read platform wallet", e))?;
        let platform_fee_bps = ticketing
            .platformFeeBps()
            .call()
            .await
            .map_err(|e| rpc_error("Failed to read platform fee", e))?;

        Ok(PlatformConfig {
            platform_wallet,
            platform_fee_bps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_config() -> ChainConfig {
        ChainConfig {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            chain_id: 84532,
            token_address: "0x0000000000000000000000000000000000000001".to_string(),
            ticketing_contract_address: "0x0000000000000000000000000000000000000002"
                .to_string(),
        }
    }

    #[test]
    fn test_contract_client_creation() {
        let client = EvmTicketingContract::new(&chain_config()).unwrap();
        assert_eq!(client.chain_id(), 84532);
        assert_eq!(client.contract_address(), Address::with_last_byte(2));
    }

    #[test]
    fn test_rejects_bad_contract_address() {
        let mut config = chain_config();
        config.ticketing_contract_address = "not-an-address".to_string();
        assert!(matches!(
            EvmTicketingContract::new(&config),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn test_purchases_mapping() {
        let order = ContractOrder {
            items: vec![ContractOrderItem {
                vendor: Address::with_last_byte(7),
                recipient: Address::with_last_byte(8),
                listing_id: "listing".to_string(),
                unit_price: U256::from(5u64),
                quantity: 3,
                booking_date: "2025-10-01".to_string(),
            }],
            total_amount: U256::from(15u64),
            gift_message: None,
        };
        let purchases = EvmTicketingContract::purchases(&order);
        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].quantity, U256::from(3u64));
        assert_eq!(purchases[0].recipient, Address::with_last_byte(8));
    }

    #[test]
    fn test_mined_order_without_event_still_settles() {
        let hash = B256::with_last_byte(9);
        let receipt = EvmTicketingContract::settled_order(hash, true, &[]).unwrap();
        assert_eq!(receipt.blockchain_order_id, None);
        assert_eq!(receipt.transaction_hash, hash);
    }

    #[test]
    fn test_reverted_order_is_an_error() {
        let result = EvmTicketingContract::settled_order(B256::with_last_byte(9), false, &[]);
        assert!(matches!(result, Err(AppError::TransactionFailed(_))));
    }

    #[test]
    fn test_order_created_event_is_decoded() {
        use alloy::sol_types::SolEvent;

        let event = IUniTickTicketing::OrderCreated {
            orderId: U256::from(42u64),
            buyer: Address::with_last_byte(5),
            totalAmount: U256::from(1000u64),
            nftContract: Address::with_last_byte(0xaa),
            batchId: U256::from(3u64),
        };
        let log = Log {
            inner: alloy::primitives::Log {
                address: Address::with_last_byte(2),
                data: event.encode_log_data(),
            },
            ..Default::default()
        };

        let receipt =
            EvmTicketingContract::settled_order(B256::with_last_byte(9), true, &[log]).unwrap();
        assert_eq!(receipt.blockchain_order_id, Some(U256::from(42u64)));
        assert_eq!(receipt.nft_contract_address, Some(Address::with_last_byte(0xaa)));
        assert_eq!(receipt.nft_batch_id, Some(U256::from(3u64)));
    }
}
