//! Command execution.

use crate::config::Config;
use crate::Commands;
use colored::Colorize;
use serde::Serialize;
use telink_codec::Endianness;
use telink_protocol::message::FRAME_ENDIANNESS;
use telink_protocol::{
    decode_hex, encode_hex, Address, AdvertisingData, BluetoothAddress, Message, ProtocolError,
    ProtocolType, ScanResponse, TelinkAdvertisement,
};

/// Executes a command and returns the formatted output.
pub fn execute(
    config: &Config,
    cmd: Commands,
    json: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    match cmd {
        Commands::DecodeFrame { hex, strict } => {
            let data = decode_hex(&hex)?;
            let message: Message = config
                .codec
                .decoder(FRAME_ENDIANNESS)
                .decode(data)
                .map_err(ProtocolError::from)?;
            if strict || config.frame.strict_length {
                message.check_length()?;
            }
            if json {
                return format_json(&message);
            }
            Ok(format_message(&message))
        }

        Commands::EncodeFrame {
            message_type,
            payload,
        } => {
            let message_type: ProtocolType = message_type.parse()?;
            let message = Message::new(message_type, decode_hex(&payload)?)?;
            let bytes = config
                .codec
                .encoder(FRAME_ENDIANNESS)
                .encode(&message)
                .map_err(ProtocolError::from)?;
            if json {
                return format_json(&serde_json::json!({
                    "frame": encode_hex(&bytes),
                    "message": message,
                }));
            }
            Ok(encode_hex(&bytes))
        }

        Commands::Address { hex, endianness } => {
            let data = decode_hex(&hex)?;
            let endianness = endianness.unwrap_or(config.codec.endianness);
            let decoder = config.codec.decoder(endianness);
            let address = match data.len() {
                Address::LENGTH => decoder
                    .decode::<Address>(data)
                    .map_err(ProtocolError::from)?
                    .to_string(),
                BluetoothAddress::LENGTH => decoder
                    .decode::<BluetoothAddress>(data)
                    .map_err(ProtocolError::from)?
                    .to_string(),
                _ => return Err(ProtocolError::InvalidAddress(hex).into()),
            };
            if json {
                return format_json(&serde_json::json!({
                    "address": address,
                    "endianness": endianness,
                }));
            }
            Ok(address)
        }

        Commands::Advertisement { hex } => {
            let data = AdvertisingData::parse(decode_hex(&hex)?)?;
            let advertisement = TelinkAdvertisement::from_advertising_data(&data)?;
            if json {
                return format_json(&advertisement);
            }
            Ok(format!(
                "{}\n  vendor:  {}\n  address: {}",
                format!("Advertisement {}", advertisement.name.cyan()).bold(),
                advertisement.manufacturer_data.vendor,
                advertisement.manufacturer_data.address
            ))
        }

        Commands::ScanResponse { hex } => {
            let data = AdvertisingData::parse(decode_hex(&hex)?)?;
            let response = ScanResponse::from_advertising_data(&data)?;
            if json {
                return format_json(&response);
            }
            Ok(format_scan_response(&response))
        }
    }
}

fn format_message(message: &Message) -> String {
    let mut output = format!(
        "{}\n  length:  {}\n  payload: {} ({} bytes)",
        format!("Frame {}", message.message_type().to_string().cyan()).bold(),
        message.length(),
        encode_hex(message.payload()),
        message.payload().len()
    );
    if message.check_length().is_err() {
        output.push_str(&format!(
            "\n  {}: length field should be {}",
            "Warning".yellow(),
            message.expected_length()
        ));
    }
    output
}

fn format_scan_response(response: &ScanResponse) -> String {
    let mut output = format!("{}", "Scan response".bold());
    let fields = [
        ("vendor", response.vendor.to_string()),
        ("address", response.address.to_string().cyan().to_string()),
        ("product type", response.product_type.to_string()),
        ("status", response.status.to_string()),
        ("mesh", response.mesh.to_string()),
        ("data", encode_hex(&response.additional_data)),
    ];
    for (label, value) in fields {
        output.push_str(&format!("\n  {:<13} {}", format!("{}:", label), value));
    }
    output
}

fn format_json<T: Serialize>(value: &T) -> Result<String, Box<dyn std::error::Error>> {
    Ok(serde_json::to_string_pretty(value)?)
}
