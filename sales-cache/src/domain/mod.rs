//! Sales domain model
//!
//! Aggregates (sales, users) and the external entities a sale references,
//! together with their validation rules.

pub mod entity;
pub mod external;
pub mod sale;
pub mod user;
pub mod validation;

pub use entity::{identity_key, round_money, Entity};
pub use external::{ExternalBranch, ExternalCustomer, ExternalProduct};
pub use sale::{discount_for_quantity, Sale, SaleItem, MAX_ITEM_QUANTITY};
pub use user::{PasswordHasher, Sha256PasswordHasher, User, UserRole, UserStatus};
pub use validation::{is_valid_email, RuleSet, ValidationErrorDetail};
