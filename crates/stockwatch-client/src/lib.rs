pub mod email;
pub mod fetcher;
pub mod parser;
pub mod telegram;

#[cfg(test)]
mod testserver;

pub use email::{EmailConfig, EmailNotifier};
pub use fetcher::ReqwestFetcher;
pub use parser::HtmlPageParser;
pub use telegram::TelegramNotifier;
