//! Business services containing domain logic and use cases.

pub mod verification;

// Re-export commonly used types
pub use verification::{
    Clock, CodeDispatcher, CodeGenerator, CodeGenerators, CodeStore, Delivery, ImageChallenge,
    ImageRenderer, IssuedChallenge, ManualClock, RenderedImage, SmsChallenge, SmsSender,
    SystemClock, VerificationService, VerificationServiceConfig, VerifiedChallenge,
};
