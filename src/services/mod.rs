pub mod email;
pub mod jwt;
pub mod matching;
pub mod notify;
pub mod oauth;

pub use email::EmailService;
pub use jwt::JwtService;
pub use matching::MatchingService;
pub use notify::Notifier;
pub use oauth::OAuthService;
