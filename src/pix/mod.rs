//! PIX instant-payment payload and QR image.

pub mod crc;
pub mod payload;
pub mod qr;

pub use payload::{
    encode, normalized_key, parse_fields, verify_checksum, PayloadError, PixConfig,
};
pub use qr::{render_png, QrError};
