//! # Identity Port
//!
//! The authentication provider is an external collaborator; Keeper only
//! needs to know which shop is signed in and what to call the person
//! ringing sales. `None` means unauthenticated; callers redirect to the
//! landing state rather than guessing.

use async_trait::async_trait;

use keeper_core::ShopIdentity;

/// Identity provider contract.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The signed-in shop, or `None` when unauthenticated.
    async fn current_shop(&self) -> Option<ShopIdentity>;

    /// Display name for transaction attribution (`added_by`/`sold_by`).
    ///
    /// `None` when the provider has no name on file; callers fall back to
    /// [`DEFAULT_ACTOR`](keeper_core::DEFAULT_ACTOR).
    async fn display_name(&self) -> Option<String>;
}

/// Fixed identity for tests and local development.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    shop: ShopIdentity,
    display_name: Option<String>,
}

impl StaticIdentity {
    pub fn new(shop: ShopIdentity, display_name: Option<String>) -> Self {
        StaticIdentity { shop, display_name }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_shop(&self) -> Option<ShopIdentity> {
        Some(self.shop.clone())
    }

    async fn display_name(&self) -> Option<String> {
        self.display_name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_identity() {
        let identity = StaticIdentity::new(
            ShopIdentity {
                shop_id: "shop-1".to_string(),
                shop_name: "Mama Njeri Groceries".to_string(),
            },
            Some("Amina".to_string()),
        );

        let shop = identity.current_shop().await.unwrap();
        assert_eq!(shop.shop_id, "shop-1");
        assert_eq!(identity.display_name().await.as_deref(), Some("Amina"));
    }
}
