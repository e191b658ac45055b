//! Bid sealing.
//!
//! `Encryptor` is the capability the controller uses to turn a bid draft
//! into the `encryptedBid` payload. `SimulatedFhe` is the reversible
//! encoding the auction has always shipped; `AesGcmEncryptor` gives real
//! confidentiality with a locally held key.

pub mod content;
pub mod encryptor;

pub use content::{generate_key, AesGcmEncryptor, ContentKey, ContentNonce};
pub use encryptor::{Encryptor, SimulatedFhe};
