//! Domain entities representing core business objects.

pub mod verification_code;

pub use verification_code::VerificationCode;
