//! Shared behaviour of cacheable aggregates

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// A persisted aggregate root that can travel through the cache.
///
/// Serialized forms use camelCase field names and omit empty optionals, so
/// external readers of the cache see a stable shape.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Type tag used as the first segment of cache keys
    const NAME: &'static str;

    /// Identity of the aggregate
    fn id(&self) -> Uuid;

    /// A blank aggregate (never assigned an identity) must not be cached
    fn is_blank(&self) -> bool {
        self.id().is_nil()
    }

    /// Identity key, `<Name>:<Id>`
    fn identity_key(&self) -> String {
        identity_key::<Self>(self.id())
    }
}

/// Identity key for an entity type without an instance at hand
pub fn identity_key<T: Entity>(id: Uuid) -> String {
    format!("{}:{}", T::NAME, id)
}

/// Round a monetary amount to cents
pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(10.006), 10.01);
        assert_eq!(round_money(36.0), 36.0);
        assert_eq!(round_money(0.1 + 0.2), 0.3);
    }
}
