//! Custodial wallets: secp256k1 keys generated server-side and stored
//! AES-256-GCM sealed. The associated data binds each key to `user_id:email`,
//! so a row only opens for the identity it was created for.

use crate::config::WalletConfig;
use crate::entities::{profile_entity as profiles, user_wallet_entity as user_wallets};
use crate::error::{AppError, AppResult};
use crate::external::CustodialWallet;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use rand::RngCore;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use std::str::FromStr;
use uuid::Uuid;

const NONCE_LEN: usize = 12;

#[derive(Clone)]
pub struct WalletService {
    pool: DatabaseConnection,
    encryption_key: [u8; 32],
}

impl WalletService {
    pub fn new(pool: DatabaseConnection, config: &WalletConfig) -> AppResult<Self> {
        let key_bytes = STANDARD
            .decode(config.encryption_key.trim())
            .map_err(|e| AppError::ConfigError(format!("Invalid wallet encryption key: {e}")))?;

        let encryption_key: [u8; 32] = key_bytes.try_into().map_err(|bytes: Vec<u8>| {
            AppError::ConfigError(format!(
                "Wallet encryption key must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;

        Ok(Self {
            pool,
            encryption_key,
        })
    }

    pub async fn find_wallet(
        &self,
        user_id: Uuid,
        email: &str,
    ) -> AppResult<Option<CustodialWallet>> {
        let Some(row) = user_wallets::Entity::find()
            .filter(user_wallets::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let key_hex = self.open(&associated_data(user_id, email), &row.encrypted_private_key)?;
        let signer = PrivateKeySigner::from_str(&key_hex).map_err(|e| {
            AppError::InternalError(format!("Stored wallet key for {user_id} is invalid: {e}"))
        })?;

        let stored = Address::from_str(&row.address).map_err(|e| {
            AppError::InternalError(format!("Stored wallet address for {user_id} is invalid: {e}"))
        })?;
        if signer.address() != stored {
            return Err(AppError::InternalError(format!(
                "Wallet key for {user_id} does not match its stored address"
            )));
        }

        Ok(Some(CustodialWallet {
            address: stored,
            signer,
        }))
    }

    pub async fn create_wallet(&self, user_id: Uuid, email: &str) -> AppResult<Address> {
        let exists = user_wallets::Entity::find()
            .filter(user_wallets::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?
            .is_some();
        if exists {
            return Err(AppError::ValidationError(
                "A wallet already exists for this user".to_string(),
            ));
        }

        let signer = PrivateKeySigner::random();
        let address = signer.address();
        let key_hex = alloy::hex::encode_prefixed(signer.to_bytes());
        let sealed = self.seal(&associated_data(user_id, email), key_hex.as_bytes())?;

        user_wallets::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            address: Set(address.to_checksum(None)),
            encrypted_private_key: Set(sealed),
            created_at: Set(Utc::now()),
        }
        .insert(&self.pool)
        .await?;

        // Mirror into the profile unless the user already linked an external wallet
        if let Some(profile) = profiles::Entity::find_by_id(user_id).one(&self.pool).await?
            && profile.wallet_address.as_deref().is_none_or(str::is_empty)
        {
            let mut model = profile.into_active_model();
            model.wallet_address = Set(Some(address.to_checksum(None)));
            model.update(&self.pool).await?;
        }

        log::info!("Created custodial wallet {} for user {}", address, user_id);
        Ok(address)
    }

    fn seal(&self, aad: &str, plaintext: &[u8]) -> AppResult<String> {
        let cipher = Aes256Gcm::new_from_slice(&self.encryption_key)
            .map_err(|e| AppError::InternalError(format!("AES init failed: {e}")))?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(
                nonce,
                Payload {
                    msg: plaintext,
                    aad: aad.as_bytes(),
                },
            )
            .map_err(|e| AppError::InternalError(format!("Wallet encryption failed: {e}")))?;

        let mut out = nonce_bytes.to_vec();
        out.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(out))
    }

    fn open(&self, aad: &str, sealed: &str) -> AppResult<String> {
        let data = STANDARD
            .decode(sealed)
            .map_err(|e| AppError::InternalError(format!("Corrupt wallet record: {e}")))?;
        if data.len() < NONCE_LEN {
            return Err(AppError::InternalError(
                "Corrupt wallet record: too short".to_string(),
            ));
        }
        let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);

        let cipher = Aes256Gcm::new_from_slice(&self.encryption_key)
            .map_err(|e| AppError::InternalError(format!("AES init failed: {e}")))?;
        let plaintext = cipher
            .decrypt(
                Nonce::from_slice(nonce_bytes),
                Payload {
                    msg: ciphertext,
                    aad: aad.as_bytes(),
                },
            )
            .map_err(|_| {
                AppError::InternalError("Wallet decryption failed for this identity".to_string())
            })?;

        String::from_utf8(plaintext)
            .map_err(|e| AppError::InternalError(format!("Corrupt wallet key: {e}")))
    }
}

fn associated_data(user_id: Uuid, email: &str) -> String {
    format!("{}:{}", user_id, email.trim().to_lowercase())
}
