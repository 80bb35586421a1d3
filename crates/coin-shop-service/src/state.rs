//! Application state.

use std::sync::Arc;

use coin_shop_store::Store;

use crate::config::ServiceConfig;
use crate::gate::AuthGate;
use crate::password::PasswordHasher;
use crate::shop::Shop;
use crate::token::TokenSigner;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Issues and verifies bearer tokens.
    pub signer: Arc<TokenSigner>,

    /// Login-or-register.
    pub gate: AuthGate,

    /// Purchases, transfers and account views.
    pub shop: Shop,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        let signer = Arc::new(TokenSigner::new(
            config.jwt_secret.as_bytes(),
            config.token_ttl_hours,
        ));
        let gate = AuthGate::new(
            Arc::clone(&store),
            PasswordHasher::new(config.hash_cost),
            Arc::clone(&signer),
            config.initial_balance,
        );
        let shop = Shop::new(Arc::clone(&store));

        Self {
            store,
            config,
            signer,
            gate,
            shop,
        }
    }
}
