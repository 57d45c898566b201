pub mod deletion;
pub mod directory;
pub mod email;
pub mod error;
pub mod identity;
pub mod otp;

pub use deletion::DeletionService;
pub use directory::DirectoryService;
pub use email::EmailService;
pub use error::{DeletionError, OtpError};
pub use identity::IdentityService;
pub use otp::OtpService;
