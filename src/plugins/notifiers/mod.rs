// Notifier implementations
pub mod email;
pub mod toast;

pub use email::{EmailConfig, EmailNotifier};
pub use toast::DesktopToastNotifier;
