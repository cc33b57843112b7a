//! Advertisement and scan response payloads.
//!
//! Advertising data is a run of `[length][type][data]` structures. Telink
//! devices put a manufacturer specific structure in both the advertisement
//! and the scan response, whose vendor payload is decoded little-endian.

use crate::address::Address;
use crate::error::ProtocolError;
use crate::hexstr::serde_hex;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use telink_codec::{
    keyed_codable, CodecError, CustomDecode, CustomDecodingContainer, CustomEncode,
    CustomEncodingContainer, Decode, Decoder, DecoderEngine, Encode, Encoder, EncoderEngine,
    Endianness,
};

/// Byte order of advertisement payloads.
pub const ADVERTISEMENT_ENDIANNESS: Endianness = Endianness::Little;

/// AD type of a shortened local name.
pub const AD_TYPE_SHORTENED_LOCAL_NAME: u8 = 0x08;
/// AD type of a complete local name.
pub const AD_TYPE_COMPLETE_LOCAL_NAME: u8 = 0x09;
/// AD type of manufacturer specific data.
pub const AD_TYPE_MANUFACTURER_SPECIFIC_DATA: u8 = 0xFF;

/// Bluetooth SIG company identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyIdentifier(pub u16);

impl CompanyIdentifier {
    pub const TELINK_SEMICONDUCTOR: CompanyIdentifier = CompanyIdentifier(0x0211);

    /// Registered name, for the identifiers this crate knows.
    pub fn name(&self) -> Option<&'static str> {
        match *self {
            Self::TELINK_SEMICONDUCTOR => Some("Telink Semiconductor Co. Ltd"),
            _ => None,
        }
    }
}

impl fmt::Display for CompanyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

impl Encode for CompanyIdentifier {
    fn encode(&self, encoder: &mut EncoderEngine) -> Result<(), CodecError> {
        encoder.single_value_container().encode(self.0)
    }
}

impl Decode for CompanyIdentifier {
    fn decode(decoder: &mut DecoderEngine) -> Result<Self, CodecError> {
        decoder.single_value_container().decode().map(Self)
    }
}

/// One `[length][type][data]` advertising structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdStructure {
    pub ad_type: u8,
    pub data: Bytes,
}

/// Raw advertising or scan response data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdvertisingData {
    structures: Vec<AdStructure>,
}

impl AdvertisingData {
    pub fn new(structures: Vec<AdStructure>) -> Self {
        Self { structures }
    }

    /// Splits `data` into advertising structures.
    pub fn parse(data: impl Into<Bytes>) -> Result<Self, ProtocolError> {
        Ok(Decoder::new(ADVERTISEMENT_ENDIANNESS).decode(data)?)
    }

    pub fn encode(&self) -> Result<Bytes, ProtocolError> {
        Ok(Encoder::new(ADVERTISEMENT_ENDIANNESS).encode(self)?)
    }

    pub fn structures(&self) -> &[AdStructure] {
        &self.structures
    }

    fn find(&self, ad_type: u8) -> Option<&AdStructure> {
        self.structures
            .iter()
            .find(|structure| structure.ad_type == ad_type)
    }

    /// Complete local name, or the shortened one when that is all there is.
    pub fn local_name(&self) -> Option<String> {
        self.find(AD_TYPE_COMPLETE_LOCAL_NAME)
            .or_else(|| self.find(AD_TYPE_SHORTENED_LOCAL_NAME))
            .map(|structure| String::from_utf8_lossy(&structure.data).into_owned())
    }

    /// First manufacturer specific structure, if any.
    pub fn manufacturer_data(&self) -> Result<Option<ManufacturerSpecificData>, ProtocolError> {
        self.find(AD_TYPE_MANUFACTURER_SPECIFIC_DATA)
            .map(|structure| ManufacturerSpecificData::parse(structure.data.clone()))
            .transpose()
    }
}

impl CustomEncode for AdvertisingData {
    fn encode_custom(&self, container: &mut CustomEncodingContainer<'_>) -> Result<(), CodecError> {
        for structure in &self.structures {
            let length = u8::try_from(structure.data.len() + 1).map_err(|_| {
                CodecError::ValueTooLarge {
                    path: container.coding_path().clone(),
                    size: structure.data.len() + 1,
                    max: usize::from(u8::MAX),
                }
            })?;
            container.encode(length, Endianness::Little)?;
            container.encode(structure.ad_type, Endianness::Little)?;
            container.encode_bytes(&structure.data)?;
        }
        Ok(())
    }
}

impl CustomDecode for AdvertisingData {
    fn decode_custom(container: &mut CustomDecodingContainer<'_>) -> Result<Self, CodecError> {
        let mut structures = Vec::new();
        while !container.is_at_end() {
            let length: u8 = container.decode(Endianness::Little)?;
            // Zero length marks the start of padding.
            if length == 0 {
                break;
            }
            let ad_type = container.decode(Endianness::Little)?;
            let data = container.decode_bytes(usize::from(length) - 1)?;
            structures.push(AdStructure { ad_type, data });
        }
        Ok(Self { structures })
    }
}

/// Body of a manufacturer specific advertising structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManufacturerSpecificData {
    pub company_identifier: CompanyIdentifier,
    #[serde(with = "serde_hex")]
    pub additional_data: Bytes,
}

impl ManufacturerSpecificData {
    pub fn parse(data: impl Into<Bytes>) -> Result<Self, ProtocolError> {
        Ok(Decoder::new(ADVERTISEMENT_ENDIANNESS).decode(data)?)
    }
}

impl CustomEncode for ManufacturerSpecificData {
    fn encode_custom(&self, container: &mut CustomEncodingContainer<'_>) -> Result<(), CodecError> {
        container.encode(self.company_identifier.0, Endianness::Little)?;
        container.encode_bytes(&self.additional_data)
    }
}

impl CustomDecode for ManufacturerSpecificData {
    fn decode_custom(container: &mut CustomDecodingContainer<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            company_identifier: CompanyIdentifier(container.decode(Endianness::Little)?),
            additional_data: container.decode_remaining()?,
        })
    }
}

fn expect_telink(actual: CompanyIdentifier) -> Result<(), ProtocolError> {
    if actual != CompanyIdentifier::TELINK_SEMICONDUCTOR {
        return Err(ProtocolError::UnexpectedVendor {
            expected: CompanyIdentifier::TELINK_SEMICONDUCTOR,
            actual,
        });
    }
    Ok(())
}

/// Vendor payload of a Telink advertisement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManufacturerData {
    pub vendor: CompanyIdentifier,
    pub address: Address,
}

keyed_codable!(ManufacturerData { vendor, address });

impl ManufacturerData {
    pub fn from_manufacturer_data(data: &ManufacturerSpecificData) -> Result<Self, ProtocolError> {
        expect_telink(data.company_identifier)?;
        Ok(Decoder::new(ADVERTISEMENT_ENDIANNESS).decode(data.additional_data.clone())?)
    }
}

/// Advertisement broadcast by a Telink device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TelinkAdvertisement {
    pub name: String,
    pub manufacturer_data: ManufacturerData,
}

impl TelinkAdvertisement {
    pub fn from_advertising_data(data: &AdvertisingData) -> Result<Self, ProtocolError> {
        let name = data
            .local_name()
            .ok_or(ProtocolError::MissingField("local name"))?;
        let manufacturer_data = data
            .manufacturer_data()?
            .ok_or(ProtocolError::MissingField("manufacturer data"))?;
        Ok(Self {
            name,
            manufacturer_data: ManufacturerData::from_manufacturer_data(&manufacturer_data)?,
        })
    }
}

/// Scan response of a Telink device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanResponse {
    pub vendor: CompanyIdentifier,
    pub address: Address,
    pub product_type: u16,
    pub status: u8,
    pub mesh: u16,
    #[serde(with = "serde_hex")]
    pub additional_data: Bytes,
}

impl ScanResponse {
    /// Decodes the vendor payload of a Telink manufacturer structure.
    pub fn from_manufacturer_data(data: &ManufacturerSpecificData) -> Result<Self, ProtocolError> {
        expect_telink(data.company_identifier)?;
        Ok(Decoder::new(ADVERTISEMENT_ENDIANNESS).decode(data.additional_data.clone())?)
    }

    /// Finds and decodes the scan response in raw advertising data.
    pub fn from_advertising_data(data: &AdvertisingData) -> Result<Self, ProtocolError> {
        let manufacturer_data = data
            .manufacturer_data()?
            .ok_or(ProtocolError::MissingField("manufacturer data"))?;
        Self::from_manufacturer_data(&manufacturer_data)
    }

    pub fn encode(&self) -> Result<Bytes, ProtocolError> {
        Ok(Encoder::new(ADVERTISEMENT_ENDIANNESS).encode(self)?)
    }
}

impl CustomEncode for ScanResponse {
    fn encode_custom(&self, container: &mut CustomEncodingContainer<'_>) -> Result<(), CodecError> {
        let endianness = container.endianness();
        container.encode_value_for_key(&self.vendor, "vendor")?;
        container.encode_value_for_key(&self.address, "address")?;
        container.encode(self.product_type, endianness)?;
        container.encode(self.status, endianness)?;
        container.encode(self.mesh, endianness)?;
        container.encode_bytes(&self.additional_data)
    }
}

impl CustomDecode for ScanResponse {
    fn decode_custom(container: &mut CustomDecodingContainer<'_>) -> Result<Self, CodecError> {
        let endianness = container.endianness();
        Ok(Self {
            vendor: container.decode_value_for_key("vendor")?,
            address: container.decode_value_for_key("address")?,
            product_type: container.decode(endianness)?,
            status: container.decode(endianness)?,
            mesh: container.decode(endianness)?,
            additional_data: container.decode_remaining()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hexstr::decode_hex;

    const ADVERTISEMENT: &str = "02 01 05 \
        0D 09 33 41 42 45 32 36 31 46 44 41 32 32 \
        09 FF 11 02 11 02 78 73 21 43";

    const SCAN_RESPONSE: &str = "1E FF 11 02 11 02 78 73 21 43 60 00 01 4B 00 \
        00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F";

    #[test]
    fn test_parse_advertisement() {
        let data = AdvertisingData::parse(decode_hex(ADVERTISEMENT).unwrap()).unwrap();
        assert_eq!(data.structures().len(), 3);
        assert_eq!(data.local_name().as_deref(), Some("3ABE261FDA22"));

        let manufacturer = data.manufacturer_data().unwrap().unwrap();
        assert_eq!(
            manufacturer.company_identifier,
            CompanyIdentifier::TELINK_SEMICONDUCTOR
        );
        assert_eq!(manufacturer.additional_data.len(), 6);

        let advertisement = TelinkAdvertisement::from_advertising_data(&data).unwrap();
        assert_eq!(advertisement.name, "3ABE261FDA22");
        assert_eq!(
            advertisement.manufacturer_data.vendor,
            CompanyIdentifier::TELINK_SEMICONDUCTOR
        );
        assert_eq!(
            advertisement.manufacturer_data.address.to_string(),
            "43:21:73:78"
        );
    }

    #[test]
    fn test_parse_scan_response() {
        let data = AdvertisingData::parse(decode_hex(SCAN_RESPONSE).unwrap()).unwrap();
        assert_eq!(data.local_name(), None);
        let manufacturer = data.manufacturer_data().unwrap().unwrap();
        assert_eq!(manufacturer.additional_data.len(), 27);

        let response = ScanResponse::from_manufacturer_data(&manufacturer).unwrap();
        assert_eq!(response.vendor, CompanyIdentifier::TELINK_SEMICONDUCTOR);
        assert_eq!(response.address.to_string(), "43:21:73:78");
        assert_eq!(response.product_type, 96);
        assert_eq!(response.status, 1);
        assert_eq!(response.mesh, 75);
        let expected: Vec<u8> = (0..16).collect();
        assert_eq!(response.additional_data.as_ref(), expected.as_slice());

        assert_eq!(response.encode().unwrap(), manufacturer.additional_data);
    }

    #[test]
    fn test_manufacturer_data_round_trip() {
        let value = ManufacturerData {
            vendor: CompanyIdentifier::TELINK_SEMICONDUCTOR,
            address: "43:21:73:78".parse().unwrap(),
        };
        let encoder = Encoder::new(ADVERTISEMENT_ENDIANNESS);
        let bytes = encoder.encode(&value).unwrap();
        assert_eq!(bytes, decode_hex("110278732143").unwrap());
        let decoded: ManufacturerData = Decoder::new(ADVERTISEMENT_ENDIANNESS)
            .decode(bytes)
            .unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_other_vendor_rejected() {
        let data = ManufacturerSpecificData {
            company_identifier: CompanyIdentifier(0x004C),
            additional_data: Bytes::from_static(&[0x02, 0x15]),
        };
        let err = ScanResponse::from_manufacturer_data(&data).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::UnexpectedVendor {
                actual: CompanyIdentifier(0x004C),
                ..
            }
        ));
    }

    #[test]
    fn test_short_scan_response_names_field() {
        let data = ManufacturerSpecificData {
            company_identifier: CompanyIdentifier::TELINK_SEMICONDUCTOR,
            additional_data: Bytes::from_static(&[0x11, 0x02, 0x78, 0x73]),
        };
        match ScanResponse::from_manufacturer_data(&data).unwrap_err() {
            ProtocolError::Codec(err) => assert_eq!(err.path().to_string(), "address"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_advertising_data_round_trip_and_padding() {
        let data = AdvertisingData::new(vec![
            AdStructure {
                ad_type: 0x01,
                data: Bytes::from_static(&[0x05]),
            },
            AdStructure {
                ad_type: AD_TYPE_SHORTENED_LOCAL_NAME,
                data: Bytes::from_static(b"tl"),
            },
        ]);
        let bytes = data.encode().unwrap();
        assert_eq!(bytes, decode_hex("020105 0308746C").unwrap());

        let mut padded = bytes.to_vec();
        padded.extend_from_slice(&[0, 0, 0]);
        let parsed = AdvertisingData::parse(padded).unwrap();
        assert_eq!(parsed, data);
        assert_eq!(parsed.local_name().as_deref(), Some("tl"));
    }

    #[test]
    fn test_truncated_structure() {
        let err = AdvertisingData::parse(decode_hex("0509AB").unwrap()).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_company_identifier() {
        assert_eq!(
            CompanyIdentifier::TELINK_SEMICONDUCTOR.to_string(),
            "0x0211"
        );
        assert!(CompanyIdentifier::TELINK_SEMICONDUCTOR.name().is_some());
        assert_eq!(CompanyIdentifier(1).name(), None);
    }
}
