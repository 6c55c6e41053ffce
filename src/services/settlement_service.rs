//! Payment settlement: one on-chain order for the whole cart, then best-effort
//! bookkeeping. Nothing is written before the contract call succeeds, and
//! nothing after it can fail the request except recording the order itself.

use crate::entities::{
    booking_entity as bookings, cart_item_entity as cart_items, order_entity as orders,
    order_item_entity as order_items, profile_entity as profiles,
};
use crate::error::{AppError, AppResult};
use crate::external::{
    ContractOrder, ContractOrderItem, ContractOrderReceipt, CustodialWallet, TicketingContract,
};
use crate::models::{
    BOOKING_STATUS_CONFIRMED, CartItemPayload, ORDER_STATUS_CONFIRMED, ProcessPaymentResponse,
};
use crate::services::{
    CartService, NoticeLine, PaymentNotifier, ProfileService, SettlementNotice, WalletService,
};
use crate::utils::{
    CartTotals, amount_to_wei, compute_cart_totals, line_amounts, parse_address, requires_approval,
};
use alloy::primitives::{Address, U256};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct SettlementService {
    pool: DatabaseConnection,
    profiles: ProfileService,
    wallets: WalletService,
    carts: CartService,
    contract: Arc<dyn TicketingContract>,
    notifier: Arc<dyn PaymentNotifier>,
}

/// Settled order and the bookings that made it into the database.
struct Recorded {
    order: orders::Model,
    bookings: Vec<(bookings::Model, String)>,
}

impl SettlementService {
    pub fn new(
        pool: DatabaseConnection,
        profiles: ProfileService,
        wallets: WalletService,
        carts: CartService,
        contract: Arc<dyn TicketingContract>,
        notifier: Arc<dyn PaymentNotifier>,
    ) -> Self {
        Self {
            pool,
            profiles,
            wallets,
            carts,
            contract,
            notifier,
        }
    }

    /// Settles the listed items of the caller's cart. Only the item ids of
    /// `requested` are used; everything that is charged or paid out is
    /// reloaded from the database.
    pub async fn process_payment(
        &self,
        user_id: Uuid,
        requested: &[CartItemPayload],
        use_external_wallet: bool,
    ) -> AppResult<ProcessPaymentResponse> {
        if requested.is_empty() {
            return Err(AppError::ValidationError("Cart is empty".to_string()));
        }

        let profile = self.profiles.get_profile(user_id).await?;
        let wallet = self
            .wallets
            .find_wallet(user_id, &profile.email)
            .await?
            .ok_or_else(|| {
                AppError::ValidationError(
                    "No wallet found for this user. Please create a wallet first.".to_string(),
                )
            })?;

        let items = self.carts.resolve_items(user_id, requested).await?;
        let cart = items.as_slice();
        validate_cart(cart)?;

        let ticket_owner = if use_external_wallet {
            let linked = profile
                .wallet_address
                .as_deref()
                .filter(|w| !w.trim().is_empty())
                .ok_or_else(|| {
                    AppError::ValidationError(
                        "No external wallet is linked to this profile".to_string(),
                    )
                })?;
            parse_address(linked, "external wallet")?
        } else {
            wallet.address
        };

        let has_gifts = cart.iter().any(|item| item.is_gift);
        let contract_order = build_contract_order(cart, ticket_owner)?;
        let totals = compute_cart_totals(cart);
        let required = amount_to_wei(totals.total_amount)?;
        let contract_order = ContractOrder {
            total_amount: required,
            ..contract_order
        };

        self.preflight(&wallet, required).await?;

        log::info!(
            "Submitting {} order for user {}: {} item(s), {} base units",
            if has_gifts { "gift" } else { "regular" },
            user_id,
            cart.len(),
            required
        );
        let receipt = if has_gifts {
            self.contract
                .create_gift_order(&wallet, &contract_order)
                .await?
        } else {
            self.contract.create_order(&wallet, &contract_order).await?
        };
        match receipt.blockchain_order_id {
            Some(id) => log::info!(
                "On-chain order {} confirmed in {}",
                id,
                receipt.transaction_hash
            ),
            None => log::warn!(
                "Order transaction {} confirmed without an OrderCreated event",
                receipt.transaction_hash
            ),
        }

        // The payment is final from here on
        let recorded = self
            .record_settlement(&profile, &wallet, cart, &totals, &receipt)
            .await?;
        self.clear_cart(user_id, cart).await;

        let booking_count = recorded.bookings.len();
        if booking_count < cart.len() {
            log::error!(
                "Order {} recorded with {} of {} bookings",
                recorded.order.id,
                booking_count,
                cart.len()
            );
        }

        self.dispatch_notice(&profile, &wallet, &totals, required, &receipt, &recorded);

        Ok(ProcessPaymentResponse {
            success: true,
            order_id: recorded.order.id,
            transaction_hash: receipt.transaction_hash.to_string(),
            message: format!(
                "Payment processed successfully. {booking_count} booking(s) created."
            ),
        })
    }

    async fn preflight(&self, wallet: &CustodialWallet, required: U256) -> AppResult<()> {
        let balance = self.contract.token_balance(wallet.address).await?;
        if balance < required {
            return Err(AppError::InsufficientBalance {
                balance: balance.to_string(),
                required: required.to_string(),
            });
        }

        let allowance = self.contract.token_allowance(wallet.address).await?;
        if requires_approval(allowance, required) {
            return Err(AppError::ApprovalRequired {
                allowance: allowance.to_string(),
                required: required.to_string(),
            });
        }
        Ok(())
    }

    async fn record_settlement(
        &self,
        payer: &profiles::Model,
        wallet: &CustodialWallet,
        cart: &[CartItemPayload],
        totals: &CartTotals,
        receipt: &ContractOrderReceipt,
    ) -> AppResult<Recorded> {
        let now = Utc::now();
        let order = orders::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(payer.id),
            total_amount: Set(totals.total_amount),
            platform_fee_total: Set(totals.platform_fee),
            wallet_address: Set(wallet.address.to_checksum(None)),
            transaction_hash: Set(order_reference(receipt)),
            status: Set(ORDER_STATUS_CONFIRMED.to_string()),
            nft_batch_contract_address: Set(receipt
                .nft_contract_address
                .map(|a| a.to_checksum(None))),
            nft_batch_id: Set(receipt.nft_batch_id.map(|id| id.to_string())),
            created_at: Set(now),
        }
        .insert(&self.pool)
        .await
        .map_err(|e| AppError::SettlementPersistence {
            transaction_hash: receipt.transaction_hash.to_string(),
            message: e.to_string(),
        })?;

        let mut recorded = Recorded {
            order,
            bookings: Vec::with_capacity(cart.len()),
        };

        for item in cart {
            let (owner, gifted_by) = self.booking_owner(payer, item).await;
            let line = line_amounts(item.listing.price, item.quantity);

            let inserted = bookings::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(recorded.order.id),
                listing_id: Set(item.listing_id),
                vendor_id: Set(item.vendor_id),
                user_id: Set(owner),
                gifted_by: Set(gifted_by),
                quantity: Set(item.quantity),
                booking_date: Set(item.booking_date),
                subtotal: Set(line.subtotal),
                platform_fee: Set(line.platform_fee),
                total_amount: Set(line.total_amount),
                status: Set(BOOKING_STATUS_CONFIRMED.to_string()),
                is_gift: Set(item.is_gift),
                recipient_name: Set(item.recipient_name.clone()),
                recipient_email: Set(item.recipient_email.clone()),
                recipient_phone: Set(item.recipient_phone.clone()),
                recipient_wallet: Set(item.recipient_wallet().map(str::to_string)),
                gift_message: Set(item.gift_message.clone()),
                created_at: Set(now),
            }
            .insert(&self.pool)
            .await;

            let booking = match inserted {
                Ok(booking) => booking,
                Err(e) => {
                    log::error!(
                        "Failed to create booking for cart item {} in order {}: {}",
                        item.id,
                        recorded.order.id,
                        e
                    );
                    continue;
                }
            };

            let link = order_items::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(recorded.order.id),
                booking_id: Set(booking.id),
                created_at: Set(now),
            }
            .insert(&self.pool)
            .await;
            if let Err(e) = link {
                log::error!(
                    "Failed to link booking {} to order {}: {}",
                    booking.id,
                    recorded.order.id,
                    e
                );
            }

            recorded.bookings.push((booking, item.listing.title.clone()));
        }

        Ok(recorded)
    }

    /// `(user_id, gifted_by)` for a booking. A gift whose recipient profile
    /// cannot be resolved stays a gift with no owner.
    async fn booking_owner(
        &self,
        payer: &profiles::Model,
        item: &CartItemPayload,
    ) -> (Option<Uuid>, Option<Uuid>) {
        if !item.is_gift {
            return (Some(payer.id), None);
        }

        let email = item.recipient_email.as_deref().unwrap_or_default();
        match self
            .profiles
            .find_or_create_recipient(
                email,
                item.recipient_name.as_deref(),
                item.recipient_wallet(),
            )
            .await
        {
            Ok(recipient) => (Some(recipient.id), Some(payer.id)),
            Err(e) => {
                log::warn!(
                    "Could not resolve gift recipient {:?} for cart item {}: {}",
                    email,
                    item.id,
                    e
                );
                (None, Some(payer.id))
            }
        }
    }

    async fn clear_cart(&self, user_id: Uuid, cart: &[CartItemPayload]) {
        let ids: Vec<Uuid> = cart.iter().map(|item| item.id).collect();
        let result = cart_items::Entity::delete_many()
            .filter(cart_items::Column::Id.is_in(ids))
            .filter(cart_items::Column::UserId.eq(user_id))
            .exec(&self.pool)
            .await;
        match result {
            Ok(res) => log::info!(
                "Cleared {} cart item(s) for user {}",
                res.rows_affected,
                user_id
            ),
            Err(e) => log::warn!("Failed to clear cart for user {}: {}", user_id, e),
        }
    }

    fn dispatch_notice(
        &self,
        payer: &profiles::Model,
        wallet: &CustodialWallet,
        totals: &CartTotals,
        required: U256,
        receipt: &ContractOrderReceipt,
        recorded: &Recorded,
    ) {
        let notice = SettlementNotice {
            order_id: recorded.order.id,
            transaction_hash: receipt.transaction_hash.to_string(),
            expected_amount: required.to_string(),
            from_address: wallet.address.to_checksum(None),
            to_address: self.contract.contract_address().to_checksum(None),
            chain_id: self.contract.chain_id(),
            payer_email: payer.email.clone(),
            payer_name: payer.full_name.clone(),
            subtotal: totals.subtotal,
            platform_fee: totals.platform_fee,
            total_amount: totals.total_amount,
            lines: recorded
                .bookings
                .iter()
                .map(|(booking, title)| NoticeLine {
                    title: title.clone(),
                    quantity: booking.quantity,
                    booking_date: booking.booking_date,
                    total_amount: booking.total_amount,
                    recipient_name: booking
                        .is_gift
                        .then(|| booking.recipient_name.clone())
                        .flatten(),
                })
                .collect(),
        };

        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            notifier.notify(notice).await;
        });
    }
}

/// `contract_<id>` for the on-chain order, or the transaction hash itself when
/// the order id could not be read from the receipt.
fn order_reference(receipt: &ContractOrderReceipt) -> String {
    match receipt.blockchain_order_id {
        Some(id) => format!("contract_{id}"),
        None => receipt.transaction_hash.to_string(),
    }
}

fn validate_cart(cart: &[CartItemPayload]) -> AppResult<()> {
    if cart.is_empty() {
        return Err(AppError::ValidationError("Cart is empty".to_string()));
    }
    for item in cart {
        if item.quantity <= 0 {
            return Err(AppError::ValidationError(format!(
                "Invalid quantity {} for cart item {}",
                item.quantity, item.id
            )));
        }
        if !item.listing.price.is_finite() || item.listing.price < 0.0 {
            return Err(AppError::ValidationError(format!(
                "Invalid price for cart item {}",
                item.id
            )));
        }
    }
    Ok(())
}

/// Maps the cart onto contract purchases. Gift items are minted to their
/// recipient wallet; one gift without a usable wallet rejects the whole cart.
fn build_contract_order(cart: &[CartItemPayload], ticket_owner: Address) -> AppResult<ContractOrder> {
    let mut items = Vec::with_capacity(cart.len());
    let mut gift_message = None;

    for item in cart {
        let recipient = if item.is_gift {
            let wallet = item.recipient_wallet().ok_or_else(|| {
                AppError::ValidationError(format!(
                    "Gift item {} ({}) is missing a recipient wallet address",
                    item.id, item.listing.title
                ))
            })?;
            if gift_message.is_none() {
                gift_message = item
                    .gift_message
                    .as_deref()
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string);
            }
            parse_address(wallet, "gift recipient")?
        } else {
            ticket_owner
        };

        let vendor_wallet = item.vendor.wallet_address.as_deref().ok_or_else(|| {
            AppError::ValidationError(format!(
                "Vendor {} has no payout wallet",
                item.vendor_id
            ))
        })?;

        items.push(ContractOrderItem {
            vendor: parse_address(vendor_wallet, "vendor wallet")?,
            recipient,
            listing_id: item.listing_id.to_string(),
            unit_price: amount_to_wei(item.listing.price)?,
            quantity: u64::try_from(item.quantity).unwrap_or_default(),
            booking_date: item
                .booking_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
        });
    }

    Ok(ContractOrder {
        items,
        total_amount: U256::ZERO,
        gift_message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        MockContract, RecordingNotifier, insert_cart_item, insert_listing, insert_profile,
        insert_vendor, make_gift, row_counts, setup_db, tokens, wallet_config,
    };
    use alloy::primitives::B256;
    use sea_orm::{ConnectionTrait, IntoActiveModel, PaginatorTrait};

    struct Fixture {
        db: DatabaseConnection,
        service: SettlementService,
        contract: Arc<MockContract>,
        notifier: Arc<RecordingNotifier>,
        payer: profiles::Model,
        wallet_address: Address,
    }

    async fn fixture(contract: MockContract) -> Fixture {
        let db = setup_db().await;
        let payer = insert_profile(&db, "payer@example.com").await;
        let wallets = WalletService::new(db.clone(), &wallet_config()).unwrap();
        let wallet_address = wallets.create_wallet(payer.id, &payer.email).await.unwrap();
        let payer = ProfileService::new(db.clone())
            .get_profile(payer.id)
            .await
            .unwrap();

        let contract = Arc::new(contract);
        let notifier = Arc::new(RecordingNotifier::default());
        let service = SettlementService::new(
            db.clone(),
            ProfileService::new(db.clone()),
            wallets,
            CartService::new(db.clone()),
            contract.clone(),
            notifier.clone(),
        );
        Fixture {
            db,
            service,
            contract,
            notifier,
            payer,
            wallet_address,
        }
    }

    async fn two_vendor_cart(f: &Fixture) -> Vec<CartItemPayload> {
        let vendor_a = insert_vendor(&f.db, 0x0a).await;
        let vendor_b = insert_vendor(&f.db, 0x0b).await;
        let listing_a = insert_listing(&f.db, &vendor_a, 50.0).await;
        let listing_b = insert_listing(&f.db, &vendor_b, 30.0).await;
        vec![
            insert_cart_item(&f.db, f.payer.id, &vendor_a, &listing_a, 1).await,
            insert_cart_item(&f.db, f.payer.id, &vendor_b, &listing_b, 1).await,
        ]
    }

    async fn wait_for_notice(notifier: &RecordingNotifier) -> usize {
        for _ in 0..100 {
            let count = notifier.notices.lock().unwrap().len();
            if count > 0 {
                return count;
            }
            tokio::task::yield_now().await;
        }
        0
    }

    #[tokio::test]
    async fn test_two_vendor_settlement_end_to_end() {
        let f = fixture(MockContract::new(tokens(100), tokens(100))).await;
        let cart = two_vendor_cart(&f).await;

        let response = f
            .service
            .process_payment(f.payer.id, &cart, false)
            .await
            .unwrap();
        assert!(response.success);

        let counts = row_counts(&f.db).await;
        assert_eq!(counts.orders, 1);
        assert_eq!(counts.bookings, 2);
        assert_eq!(counts.order_items, 2);
        assert_eq!(counts.cart_items, 0);

        let order = orders::Entity::find_by_id(response.order_id)
            .one(&f.db)
            .await
            .unwrap()
            .unwrap();
        assert!((order.total_amount - 80.4).abs() < 1e-9);
        assert!((order.platform_fee_total - 0.4).abs() < 1e-9);
        assert_eq!(order.transaction_hash, "contract_42");
        assert_eq!(order.status, "confirmed");
        assert_eq!(order.wallet_address, f.wallet_address.to_checksum(None));

        for booking in bookings::Entity::find().all(&f.db).await.unwrap() {
            assert_eq!(booking.user_id, Some(f.payer.id));
            assert_eq!(booking.subtotal + booking.platform_fee, booking.total_amount);
        }

        let submitted = f.contract.last_order.lock().unwrap().clone().unwrap();
        assert_eq!(submitted.total_amount, amount_to_wei(80.4).unwrap());
        assert!(submitted.items.iter().all(|i| i.recipient == f.wallet_address));
        assert!(f.contract.calls().contains(&"create_order"));

        assert_eq!(wait_for_notice(&f.notifier).await, 1);
        let notice = f.notifier.notices.lock().unwrap()[0].clone();
        assert_eq!(notice.order_id, response.order_id);
        assert_eq!(notice.expected_amount, "80400000000000000000");
        assert_eq!(notice.lines.len(), 2);
    }

    #[tokio::test]
    async fn test_gift_without_wallet_rejects_before_chain_call() {
        let f = fixture(MockContract::new(tokens(100), tokens(100))).await;
        let mut cart = two_vendor_cart(&f).await;
        cart[1] = make_gift(&f.db, cart[1].clone(), "friend@example.com", Some("  ")).await;
        let before = row_counts(&f.db).await;

        let result = f.service.process_payment(f.payer.id, &cart, false).await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert!(f.contract.calls().is_empty());
        assert_eq!(row_counts(&f.db).await, before);
    }

    #[tokio::test]
    async fn test_gift_order_books_for_recipient() {
        let f = fixture(MockContract::new(tokens(100), tokens(100))).await;
        let mut cart = two_vendor_cart(&f).await;
        let recipient_wallet = Address::with_last_byte(0x77).to_checksum(None);
        cart[0] = make_gift(&f.db, cart[0].clone(), "friend@example.com", Some(&recipient_wallet))
            .await;

        f.service
            .process_payment(f.payer.id, &cart, false)
            .await
            .unwrap();

        assert!(f.contract.calls().contains(&"create_gift_order"));
        let submitted = f.contract.last_order.lock().unwrap().clone().unwrap();
        assert_eq!(submitted.items[0].recipient, Address::with_last_byte(0x77));
        assert_eq!(submitted.items[1].recipient, f.wallet_address);
        assert_eq!(submitted.gift_message.as_deref(), Some("Enjoy"));

        let recipient = ProfileService::new(f.db.clone())
            .find_by_email("friend@example.com")
            .await
            .unwrap()
            .unwrap();
        let gift_booking = bookings::Entity::find()
            .filter(bookings::Column::IsGift.eq(true))
            .one(&f.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(gift_booking.user_id, Some(recipient.id));
        assert_eq!(gift_booking.gifted_by, Some(f.payer.id));
    }

    #[tokio::test]
    async fn test_unresolvable_recipient_keeps_gift_unowned() {
        let f = fixture(MockContract::new(tokens(100), tokens(100))).await;
        let mut cart = two_vendor_cart(&f).await;
        let recipient_wallet = Address::with_last_byte(0x77).to_checksum(None);
        cart[0] = make_gift(&f.db, cart[0].clone(), "   ", Some(&recipient_wallet)).await;

        f.service
            .process_payment(f.payer.id, &cart, false)
            .await
            .unwrap();

        let gift_booking = bookings::Entity::find()
            .filter(bookings::Column::IsGift.eq(true))
            .one(&f.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(gift_booking.user_id, None);
        assert_eq!(gift_booking.gifted_by, Some(f.payer.id));
        assert_eq!(row_counts(&f.db).await.bookings, 2);
    }

    #[tokio::test]
    async fn test_allowance_gate() {
        let required = amount_to_wei(80.4).unwrap();

        let f = fixture(MockContract::new(tokens(100), required - U256::from(1u64))).await;
        let cart = two_vendor_cart(&f).await;
        let result = f.service.process_payment(f.payer.id, &cart, false).await;
        assert!(matches!(result, Err(AppError::ApprovalRequired { .. })));
        assert!(!f.contract.calls().contains(&"create_order"));

        let f = fixture(MockContract::new(tokens(100), required)).await;
        let cart = two_vendor_cart(&f).await;
        assert!(f.service.process_payment(f.payer.id, &cart, false).await.is_ok());
    }

    #[tokio::test]
    async fn test_insufficient_balance() {
        let f = fixture(MockContract::new(tokens(80), tokens(100))).await;
        let cart = two_vendor_cart(&f).await;
        let result = f.service.process_payment(f.payer.id, &cart, false).await;
        assert!(matches!(result, Err(AppError::InsufficientBalance { .. })));
    }

    #[tokio::test]
    async fn test_chain_failure_writes_nothing() {
        let mut contract = MockContract::new(tokens(100), tokens(100));
        contract.fail_orders = true;
        let f = fixture(contract).await;
        let cart = two_vendor_cart(&f).await;

        let result = f.service.process_payment(f.payer.id, &cart, false).await;
        assert!(matches!(result, Err(AppError::ChainError(_))));
        let counts = row_counts(&f.db).await;
        assert_eq!(counts.orders, 0);
        assert_eq!(counts.cart_items, 2);
    }

    #[tokio::test]
    async fn test_empty_cart_and_missing_wallet() {
        let f = fixture(MockContract::new(tokens(100), tokens(100))).await;
        assert!(matches!(
            f.service.process_payment(f.payer.id, &[], false).await,
            Err(AppError::ValidationError(_))
        ));

        let stranger = insert_profile(&f.db, "stranger@example.com").await;
        let cart = two_vendor_cart(&f).await;
        assert!(matches!(
            f.service.process_payment(stranger.id, &cart, false).await,
            Err(AppError::ValidationError(_))
        ));
        assert_eq!(orders::Entity::find().count(&f.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_external_wallet_receives_tickets() {
        let f = fixture(MockContract::new(tokens(100), tokens(100))).await;
        let external = Address::with_last_byte(0x55);
        let mut payer = profiles::Entity::find_by_id(f.payer.id)
            .one(&f.db)
            .await
            .unwrap()
            .unwrap()
            .into_active_model();
        payer.wallet_address = Set(Some(external.to_checksum(None)));
        payer.update(&f.db).await.unwrap();

        let cart = two_vendor_cart(&f).await;
        f.service
            .process_payment(f.payer.id, &cart, true)
            .await
            .unwrap();

        let submitted = f.contract.last_order.lock().unwrap().clone().unwrap();
        assert!(submitted.items.iter().all(|i| i.recipient == external));
    }

    #[tokio::test]
    async fn test_charges_stored_prices_and_pays_stored_vendor_wallets() {
        let f = fixture(MockContract::new(tokens(100), tokens(100))).await;
        let mut cart = two_vendor_cart(&f).await;
        for item in &mut cart {
            item.listing.price = 0.01;
            item.vendor.wallet_address =
                Some(Address::with_last_byte(0xee).to_checksum(None));
        }

        let response = f
            .service
            .process_payment(f.payer.id, &cart, false)
            .await
            .unwrap();

        let submitted = f.contract.last_order.lock().unwrap().clone().unwrap();
        assert_eq!(submitted.total_amount, amount_to_wei(80.4).unwrap());
        assert_eq!(submitted.items[0].vendor, Address::with_last_byte(0x0a));
        assert_eq!(submitted.items[1].vendor, Address::with_last_byte(0x0b));
        assert_eq!(submitted.items[0].unit_price, amount_to_wei(50.0).unwrap());

        let order = orders::Entity::find_by_id(response.order_id)
            .one(&f.db)
            .await
            .unwrap()
            .unwrap();
        assert!((order.total_amount - 80.4).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_items_outside_callers_cart_are_rejected() {
        let f = fixture(MockContract::new(tokens(100), tokens(100))).await;
        let mut cart = two_vendor_cart(&f).await;
        let other = insert_profile(&f.db, "other@example.com").await;
        let vendor = insert_vendor(&f.db, 0x0c).await;
        let listing = insert_listing(&f.db, &vendor, 10.0).await;
        cart.push(insert_cart_item(&f.db, other.id, &vendor, &listing, 1).await);

        let result = f.service.process_payment(f.payer.id, &cart, false).await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert!(f.contract.calls().is_empty());
        assert_eq!(row_counts(&f.db).await.orders, 0);
    }

    #[tokio::test]
    async fn test_mined_order_without_event_is_still_recorded() {
        let mut contract = MockContract::new(tokens(100), tokens(100));
        contract.emit_order_event = false;
        let f = fixture(contract).await;
        let cart = two_vendor_cart(&f).await;

        let response = f
            .service
            .process_payment(f.payer.id, &cart, false)
            .await
            .unwrap();

        let tx_hash = B256::with_last_byte(42).to_string();
        assert_eq!(response.transaction_hash, tx_hash);
        let order = orders::Entity::find_by_id(response.order_id)
            .one(&f.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.transaction_hash, tx_hash);
        assert_eq!(order.nft_batch_id, None);

        let counts = row_counts(&f.db).await;
        assert_eq!(counts.bookings, 2);
        assert_eq!(counts.cart_items, 0);
    }

    #[tokio::test]
    async fn test_failed_booking_is_skipped() {
        let f = fixture(MockContract::new(tokens(200), tokens(200))).await;
        let vendor_a = insert_vendor(&f.db, 0x0a).await;
        let vendor_b = insert_vendor(&f.db, 0x0b).await;
        let listing_a = insert_listing(&f.db, &vendor_a, 50.0).await;
        let listing_b = insert_listing(&f.db, &vendor_b, 30.0).await;
        let cart = vec![
            insert_cart_item(&f.db, f.payer.id, &vendor_a, &listing_a, 1).await,
            insert_cart_item(&f.db, f.payer.id, &vendor_b, &listing_b, 2).await,
        ];
        f.db.execute_unprepared(
            "CREATE TRIGGER reject_bulk_booking BEFORE INSERT ON bookings \
             WHEN NEW.quantity > 1 BEGIN SELECT RAISE(ABORT, 'booking rejected'); END",
        )
        .await
        .unwrap();

        let response = f
            .service
            .process_payment(f.payer.id, &cart, false)
            .await
            .unwrap();

        assert!(response.success);
        assert!(response.message.contains("1 booking(s)"));
        let counts = row_counts(&f.db).await;
        assert_eq!(counts.orders, 1);
        assert_eq!(counts.bookings, 1);
        assert_eq!(counts.order_items, 1);
        assert_eq!(counts.cart_items, 0);
        assert_eq!(wait_for_notice(&f.notifier).await, 1);
        assert_eq!(f.notifier.notices.lock().unwrap()[0].lines.len(), 1);
    }

    #[tokio::test]
    async fn test_order_insert_failure_reports_mined_hash() {
        let f = fixture(MockContract::new(tokens(100), tokens(100))).await;
        let cart = two_vendor_cart(&f).await;
        f.db.execute_unprepared(
            "CREATE TRIGGER reject_orders BEFORE INSERT ON orders \
             BEGIN SELECT RAISE(ABORT, 'orders unavailable'); END",
        )
        .await
        .unwrap();

        let result = f.service.process_payment(f.payer.id, &cart, false).await;

        match result {
            Err(AppError::SettlementPersistence {
                transaction_hash, ..
            }) => assert_eq!(transaction_hash, B256::with_last_byte(42).to_string()),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(f.contract.calls().contains(&"create_order"));
        let counts = row_counts(&f.db).await;
        assert_eq!(counts.orders, 0);
        assert_eq!(counts.bookings, 0);
    }

    #[tokio::test]
    async fn test_cart_clear_failure_keeps_success() {
        let f = fixture(MockContract::new(tokens(100), tokens(100))).await;
        let cart = two_vendor_cart(&f).await;
        f.db.execute_unprepared(
            "CREATE TRIGGER keep_cart BEFORE DELETE ON cart_items \
             BEGIN SELECT RAISE(ABORT, 'cart locked'); END",
        )
        .await
        .unwrap();

        let response = f
            .service
            .process_payment(f.payer.id, &cart, false)
            .await
            .unwrap();

        assert!(response.success);
        let counts = row_counts(&f.db).await;
        assert_eq!(counts.orders, 1);
        assert_eq!(counts.bookings, 2);
        assert_eq!(counts.cart_items, 2);
    }
}
