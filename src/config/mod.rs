//! Configuration module

mod site;

pub use site::locale_from_host;
pub use site::BackendKind;
pub use site::SiteConfig;
