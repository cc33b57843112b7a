//! # telink-protocol
//!
//! Telink message schemas built on `telink-codec`.
//!
//! This crate provides:
//! - Serial port protocol frames (type code, length, payload)
//! - Command and event traits binding payload types to type codes
//! - Advertisement and scan response payloads
//! - Four-byte advertisement and six-byte device addresses
//! - The 24-bit unsigned integer used by mesh messages
//! - Well-known GATT UUIDs

pub mod address;
pub mod advertisement;
pub mod error;
pub mod gatt;
pub mod hexstr;
pub mod message;
pub mod uint24;

pub use address::{Address, BluetoothAddress};
pub use advertisement::{
    AdStructure, AdvertisingData, CompanyIdentifier, ManufacturerData, ManufacturerSpecificData,
    ScanResponse, TelinkAdvertisement,
};
pub use error::ProtocolError;
pub use hexstr::{decode_hex, encode_hex};
pub use message::{
    Message, ProtocolType, SerialPortCommand, SerialPortEvent, FRAME_HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
pub use uint24::U24;
