//! Automatic-mode aggregates.

/// Implements [`Encode`](crate::Encode) and [`Decode`](crate::Decode) for a
/// struct by walking the listed fields in order through a keyed container.
///
/// The field list is the wire order. Each field is coded with its own
/// `Encode`/`Decode` implementation, so a manual-mode field gets a custom
/// container of its own.
///
/// ```
/// use telink_codec::{keyed_codable, Decoder, Encoder, Endianness};
///
/// #[derive(Debug, PartialEq)]
/// struct Status {
///     mesh: u8,
///     level: u16,
/// }
///
/// keyed_codable!(Status { mesh, level });
///
/// let status = Status { mesh: 1, level: 0x0203 };
/// let bytes = Encoder::new(Endianness::Big).encode(&status).unwrap();
/// assert_eq!(bytes.as_ref(), &[0x01, 0x02, 0x03]);
/// let decoded: Status = Decoder::new(Endianness::Big).decode(bytes).unwrap();
/// assert_eq!(decoded, status);
/// ```
#[macro_export]
macro_rules! keyed_codable {
    ($ty:ident { $($field:ident),+ $(,)? }) => {
        impl $crate::Encode for $ty {
            fn encode(
                &self,
                encoder: &mut $crate::EncoderEngine,
            ) -> ::core::result::Result<(), $crate::CodecError> {
                let mut container = encoder.keyed_container();
                $(
                    container.encode(&self.$field, stringify!($field))?;
                )+
                Ok(())
            }
        }

        impl $crate::Decode for $ty {
            fn decode(
                decoder: &mut $crate::DecoderEngine,
            ) -> ::core::result::Result<Self, $crate::CodecError> {
                let mut container = decoder.keyed_container();
                Ok(Self {
                    $(
                        $field: container.decode(stringify!($field))?,
                    )+
                })
            }
        }
    };
}
