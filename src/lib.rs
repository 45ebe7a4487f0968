pub mod config;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod parsers;
pub mod payload;
pub mod toolchain;

pub use dispatch::{ParserDispatch, ParserResponse, call_parser};
pub use error::ParserError;
