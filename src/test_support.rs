//! Shared fixtures for unit tests: an in-memory SQLite schema built from the
//! entities, and in-memory doubles for the contract and the notifier.

use crate::config::WalletConfig;
use crate::entities::{
    booking_entity, cart_item_entity, listing_entity, order_entity, order_item_entity,
    profile_entity, user_wallet_entity, vendor_entity,
};
use crate::error::{AppError, AppResult};
use crate::external::{
    ContractOrder, ContractOrderReceipt, CustodialWallet, PlatformConfig, TicketingContract,
    TxOutcome,
};
use crate::models::{CartItemPayload, CartListing, CartVendor};
use crate::services::{
    CartService, DiagnosticService, OrderService, PaymentNotifier, ProfileService,
    SettlementNotice, SettlementService, TokenService, WalletService,
};
use crate::utils::{JwtService, issue_test_token};
use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use base64::Engine;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    PaginatorTrait, Schema, Set,
};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();

    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let statements = [
        schema.create_table_from_entity(profile_entity::Entity),
        schema.create_table_from_entity(vendor_entity::Entity),
        schema.create_table_from_entity(listing_entity::Entity),
        schema.create_table_from_entity(cart_item_entity::Entity),
        schema.create_table_from_entity(order_entity::Entity),
        schema.create_table_from_entity(booking_entity::Entity),
        schema.create_table_from_entity(order_item_entity::Entity),
        schema.create_table_from_entity(user_wallet_entity::Entity),
    ];
    for statement in statements {
        db.execute(backend.build(&statement)).await.unwrap();
    }
    db
}

pub fn wallet_config() -> WalletConfig {
    WalletConfig {
        encryption_key: base64::engine::general_purpose::STANDARD.encode([7u8; 32]),
    }
}

pub async fn insert_profile(db: &DatabaseConnection, email: &str) -> profile_entity::Model {
    profile_entity::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        full_name: Set(Some("Test User".to_string())),
        wallet_address: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_vendor(db: &DatabaseConnection, last_byte: u8) -> vendor_entity::Model {
    vendor_entity::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(None),
        business_name: Set(format!("Vendor {last_byte}")),
        wallet_address: Set(Some(Address::with_last_byte(last_byte).to_checksum(None))),
        is_verified: Set(true),
        is_whitelisted: Set(true),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_listing(
    db: &DatabaseConnection,
    vendor: &vendor_entity::Model,
    price: f64,
) -> listing_entity::Model {
    listing_entity::ActiveModel {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(vendor.id),
        title: Set(format!("{} ticket", vendor.business_name)),
        price: Set(price),
        is_active: Set(true),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .unwrap()
}

/// Persists a cart row and returns it in the client payload shape.
pub async fn insert_cart_item(
    db: &DatabaseConnection,
    user_id: Uuid,
    vendor: &vendor_entity::Model,
    listing: &listing_entity::Model,
    quantity: i32,
) -> CartItemPayload {
    let row = cart_item_entity::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        listing_id: Set(listing.id),
        vendor_id: Set(vendor.id),
        quantity: Set(quantity),
        booking_date: Set(chrono::NaiveDate::from_ymd_opt(2025, 12, 24)),
        is_gift: Set(false),
        recipient_name: Set(None),
        recipient_email: Set(None),
        recipient_phone: Set(None),
        recipient_wallet: Set(None),
        gift_message: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .unwrap();

    CartItemPayload {
        id: row.id,
        listing_id: listing.id,
        vendor_id: vendor.id,
        quantity,
        booking_date: row.booking_date,
        is_gift: false,
        recipient_name: None,
        recipient_email: None,
        recipient_phone: None,
        recipient_wallet: None,
        gift_message: None,
        listing: CartListing {
            id: listing.id,
            title: listing.title.clone(),
            price: listing.price,
        },
        vendor: CartVendor {
            id: vendor.id,
            business_name: Some(vendor.business_name.clone()),
            wallet_address: vendor.wallet_address.clone(),
            is_verified: vendor.is_verified,
        },
    }
}

/// Turns a stored cart row into a gift and returns the matching payload.
pub async fn make_gift(
    db: &DatabaseConnection,
    mut item: CartItemPayload,
    email: &str,
    wallet: Option<&str>,
) -> CartItemPayload {
    cart_item_entity::ActiveModel {
        id: Set(item.id),
        is_gift: Set(true),
        recipient_name: Set(Some("Friend".to_string())),
        recipient_email: Set(Some(email.to_string())),
        recipient_wallet: Set(wallet.map(str::to_string)),
        gift_message: Set(Some("Enjoy".to_string())),
        ..Default::default()
    }
    .update(db)
    .await
    .unwrap();

    item.is_gift = true;
    item.recipient_name = Some("Friend".to_string());
    item.recipient_email = Some(email.to_string());
    item.recipient_wallet = wallet.map(str::to_string);
    item.gift_message = Some("Enjoy".to_string());
    item
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCounts {
    pub cart_items: u64,
    pub orders: u64,
    pub bookings: u64,
    pub order_items: u64,
}

pub async fn row_counts(db: &DatabaseConnection) -> RowCounts {
    RowCounts {
        cart_items: cart_item_entity::Entity::find().count(db).await.unwrap(),
        orders: order_entity::Entity::find().count(db).await.unwrap(),
        bookings: booking_entity::Entity::find().count(db).await.unwrap(),
        order_items: order_item_entity::Entity::find().count(db).await.unwrap(),
    }
}

pub fn tokens(amount: u64) -> U256 {
    U256::from(amount) * U256::from(10u64).pow(U256::from(18u64))
}

/// In-memory ticketing contract. Approvals raise the allowance to the approved
/// amount unless `approval_sets_allowance` is turned off.
pub struct MockContract {
    pub balance: Mutex<U256>,
    pub allowance: Mutex<U256>,
    pub approval_succeeds: bool,
    pub approval_sets_allowance: bool,
    pub whitelisted: bool,
    pub fail_orders: bool,
    /// Off simulates a mined order whose `OrderCreated` event is unreadable
    pub emit_order_event: bool,
    pub platform: PlatformConfig,
    pub calls: Mutex<Vec<&'static str>>,
    pub last_order: Mutex<Option<ContractOrder>>,
    next_order_id: AtomicU64,
}

impl MockContract {
    pub fn new(balance: U256, allowance: U256) -> Self {
        Self {
            balance: Mutex::new(balance),
            allowance: Mutex::new(allowance),
            approval_succeeds: true,
            approval_sets_allowance: true,
            whitelisted: true,
            fail_orders: false,
            emit_order_event: true,
            platform: PlatformConfig {
                platform_wallet: Address::with_last_byte(0xfe),
                platform_fee_bps: U256::from(50u64),
            },
            calls: Mutex::new(Vec::new()),
            last_order: Mutex::new(None),
            next_order_id: AtomicU64::new(41),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn receipt(&self, order: &ContractOrder) -> AppResult<ContractOrderReceipt> {
        if self.fail_orders {
            return Err(AppError::ChainError("execution reverted".to_string()));
        }
        *self.last_order.lock().unwrap() = Some(order.clone());
        let id = self.next_order_id.fetch_add(1, Ordering::SeqCst) + 1;
        let transaction_hash = B256::with_last_byte(id as u8);
        if !self.emit_order_event {
            return Ok(ContractOrderReceipt {
                blockchain_order_id: None,
                transaction_hash,
                nft_contract_address: None,
                nft_batch_id: None,
            });
        }
        Ok(ContractOrderReceipt {
            blockchain_order_id: Some(U256::from(id)),
            transaction_hash,
            nft_contract_address: Some(Address::with_last_byte(0xaa)),
            nft_batch_id: Some(U256::from(id)),
        })
    }
}

#[async_trait]
impl TicketingContract for MockContract {
    fn chain_id(&self) -> u64 {
        84532
    }

    fn contract_address(&self) -> Address {
        Address::with_last_byte(2)
    }

    async fn token_balance(&self, _owner: Address) -> AppResult<U256> {
        self.record("token_balance");
        Ok(*self.balance.lock().unwrap())
    }

    async fn token_allowance(&self, _owner: Address) -> AppResult<U256> {
        self.record("token_allowance");
        Ok(*self.allowance.lock().unwrap())
    }

    async fn approve_tokens(
        &self,
        _wallet: &CustodialWallet,
        amount: U256,
    ) -> AppResult<TxOutcome> {
        self.record("approve_tokens");
        if self.approval_succeeds && self.approval_sets_allowance {
            *self.allowance.lock().unwrap() = amount;
        }
        Ok(TxOutcome {
            transaction_hash: B256::with_last_byte(0x11),
            success: self.approval_succeeds,
        })
    }

    async fn create_order(
        &self,
        _wallet: &CustodialWallet,
        order: &ContractOrder,
    ) -> AppResult<ContractOrderReceipt> {
        self.record("create_order");
        self.receipt(order)
    }

    async fn create_gift_order(
        &self,
        _wallet: &CustodialWallet,
        order: &ContractOrder,
    ) -> AppResult<ContractOrderReceipt> {
        self.record("create_gift_order");
        self.receipt(order)
    }

    async fn is_vendor_whitelisted(&self, _vendor: Address) -> AppResult<bool> {
        self.record("is_vendor_whitelisted");
        Ok(self.whitelisted)
    }

    async fn platform_config(&self) -> AppResult<PlatformConfig> {
        self.record("platform_config");
        Ok(self.platform.clone())
    }
}

/// Collects notices instead of sending them.
#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<SettlementNotice>>,
}

#[async_trait]
impl PaymentNotifier for RecordingNotifier {
    async fn notify(&self, notice: SettlementNotice) {
        self.notices.lock().unwrap().push(notice);
    }
}

pub const TEST_JWT_SECRET: &str = "test-secret";

/// Every service wired against one in-memory database and one contract double,
/// plus a payer profile and a bearer token for it.
pub struct TestContext {
    pub db: DatabaseConnection,
    pub contract: Arc<MockContract>,
    pub notifier: Arc<RecordingNotifier>,
    pub payer: profile_entity::Model,
    pub bearer: String,
    pub jwt: JwtService,
    pub wallets: WalletService,
    pub settlement: SettlementService,
    pub tokens: TokenService,
    pub diagnostics: DiagnosticService,
    pub carts: CartService,
    pub orders: OrderService,
}

impl TestContext {
    pub async fn new(contract: MockContract) -> Self {
        let db = setup_db().await;
        let payer = insert_profile(&db, "payer@example.com").await;
        let contract = Arc::new(contract);
        let notifier = Arc::new(RecordingNotifier::default());

        let profiles = ProfileService::new(db.clone());
        let wallets = WalletService::new(db.clone(), &wallet_config()).unwrap();
        let carts = CartService::new(db.clone());
        let chain: Arc<dyn TicketingContract> = contract.clone();

        Self {
            settlement: SettlementService::new(
                db.clone(),
                profiles.clone(),
                wallets.clone(),
                carts.clone(),
                chain.clone(),
                notifier.clone(),
            ),
            tokens: TokenService::new(profiles.clone(), wallets.clone(), chain.clone()),
            diagnostics: DiagnosticService::new(profiles, wallets.clone(), carts.clone(), chain),
            carts,
            orders: OrderService::new(db.clone()),
            bearer: format!(
                "Bearer {}",
                issue_test_token(TEST_JWT_SECRET, payer.id, &payer.email)
            ),
            jwt: JwtService::new(TEST_JWT_SECRET, "authenticated"),
            wallets,
            db,
            contract,
            notifier,
            payer,
        }
    }

    pub async fn with_wallet(contract: MockContract) -> Self {
        let ctx = Self::new(contract).await;
        ctx.wallets
            .create_wallet(ctx.payer.id, &ctx.payer.email)
            .await
            .unwrap();
        ctx
    }

    /// Two single-quantity items from two vendors priced 50 and 30.
    pub async fn two_vendor_cart(&self) -> Vec<CartItemPayload> {
        let vendor_a = insert_vendor(&self.db, 0x0a).await;
        let vendor_b = insert_vendor(&self.db, 0x0b).await;
        let listing_a = insert_listing(&self.db, &vendor_a, 50.0).await;
        let listing_b = insert_listing(&self.db, &vendor_b, 30.0).await;
        vec![
            insert_cart_item(&self.db, self.payer.id, &vendor_a, &listing_a, 1).await,
            insert_cart_item(&self.db, self.payer.id, &vendor_b, &listing_b, 1).await,
        ]
    }
}
