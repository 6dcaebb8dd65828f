#![cfg_attr(docsrs, feature(doc_auto_cfg))]
//! Inspect [TON](https://ton.org) payloads before signing them: detect how
//! a payload is encoded, decode its Bag of Cells, list the internal messages
//! it carries and describe what each of them does.
//!
//! ```rust
//! # use tonpeek::{Config, Reason, decode_payload};
//! let decoded = decode_payload(
//!     "ton://transfer/EQBGXZ9ddZeWypx8EkJieHJX75ct0bpkmu0Y4YoYr3NM0Z9e?amount=250000000",
//!     &Config::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(decoded.reason, Reason::ParsedFromUri);
//! assert_eq!(
//!     decoded.actions[0].summary,
//!     "To EQBGXZ9ddZeWypx8EkJieHJX75ct0bpkmu0Y4YoYr3NM0Z9e • Amount 0.25 TON",
//! );
//! ```
mod config;
mod decode;
mod error;
mod hash;
mod input;
mod protocol;

pub use self::{config::*, decode::*, error::*, hash::*, input::*, protocol::*};

pub use tonpeek_boc as boc;
pub use tonpeek_ton as ton;
