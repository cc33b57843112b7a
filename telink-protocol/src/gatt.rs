//! Well-known Telink GATT services and characteristics.

use uuid::Uuid;

/// Serial port protocol service.
pub const SERIAL_PORT_PROTOCOL_SERVICE: Uuid =
    Uuid::from_u128(0x00010203_0405_0607_0809_0A0B0C0D1910);

/// Characteristic that notifies serial port protocol events.
pub const SERIAL_PORT_PROTOCOL_NOTIFICATION: Uuid =
    Uuid::from_u128(0x00010203_0405_0607_0809_0A0B0C0D2B10);

/// Characteristic that accepts serial port protocol commands.
pub const SERIAL_PORT_PROTOCOL_COMMAND: Uuid =
    Uuid::from_u128(0x00010203_0405_0607_0809_0A0B0C0D2B11);

/// Mesh service. Shares its UUID with the serial port protocol service.
pub const MESH_SERVICE: Uuid = SERIAL_PORT_PROTOCOL_SERVICE;

pub const STATUS_CHARACTERISTIC: Uuid = Uuid::from_u128(0x00010203_0405_0607_0809_0A0B0C0D1911);

pub const COMMAND_CHARACTERISTIC: Uuid = Uuid::from_u128(0x00010203_0405_0607_0809_0A0B0C0D1912);

pub const FIRMWARE_UPDATE_CHARACTERISTIC: Uuid =
    Uuid::from_u128(0x00010203_0405_0607_0809_0A0B0C0D1913);

pub const PAIRING_CHARACTERISTIC: Uuid = Uuid::from_u128(0x00010203_0405_0607_0809_0A0B0C0D1914);
