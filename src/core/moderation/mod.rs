pub mod link_scanner;

pub use link_scanner::{LinkProber, LinkScanner, LinkStatus, LinkWarning};
