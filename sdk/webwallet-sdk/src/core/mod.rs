pub mod codec;
pub mod connection;
pub mod connector;
pub mod constants;
pub mod signer;
pub mod storage;
