//! Inbound authentication shared by every service boundary.

pub mod bearer;
pub mod gate;
pub mod issuer;
pub mod key;
pub mod validator;

pub use gate::{require_role, GateRejection};
pub use issuer::{IssuedClaims, TokenIssuer};
pub use key::{KeyError, SigningKey};
pub use validator::{AuthenticationOutcome, Principal, TokenRejection, TokenValidator};
