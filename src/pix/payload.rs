//! PIX "copia e cola" payload: EMV merchant-presented QR fields.
//!
//! Every field is `<id:2><len:2><value>`; some values are themselves field
//! sequences. The payload ends with field 63 holding a CRC-16 over everything
//! before the CRC digits, including the `6304` header.

use thiserror::Error;

use super::crc::crc16_hex;
use crate::domain::money::Money;

pub const PIX_GUI: &str = "br.gov.bcb.pix";

const PAYLOAD_FORMAT_INDICATOR: &str = "00";
const POINT_OF_INITIATION: &str = "01";
const MERCHANT_ACCOUNT_INFO: &str = "26";
const MAI_GUI: &str = "00";
const MAI_KEY: &str = "01";
const MERCHANT_CATEGORY_CODE: &str = "52";
const TRANSACTION_CURRENCY: &str = "53";
const TRANSACTION_AMOUNT: &str = "54";
const COUNTRY_CODE: &str = "58";
const MERCHANT_NAME: &str = "59";
const MERCHANT_CITY: &str = "60";
const ADDITIONAL_DATA: &str = "62";
const ADDITIONAL_REFERENCE: &str = "05";
const CRC: &str = "63";

const FORMAT_VERSION: &str = "01";
const ONE_SHOT: &str = "12";
const CATEGORY_UNSPECIFIED: &str = "0000";
const CURRENCY_BRL: &str = "986";
const COUNTRY_BR: &str = "BR";
const UNSPECIFIED_REFERENCE: &str = "***";

pub const MAX_MERCHANT_NAME: usize = 25;
pub const MAX_MERCHANT_CITY: usize = 15;
pub const MAX_REFERENCE: usize = 25;
pub const MAX_AMOUNT_LEN: usize = 13;
const MAX_FIELD_LEN: usize = 99;

/// Payment parameters after resolving billing overrides against defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixConfig {
    pub key: Option<String>,
    pub merchant_name: Option<String>,
    pub merchant_city: Option<String>,
    pub reference: Option<String>,
}

/// Reasons a payload cannot be built. Callers treat all of them as
/// "payment disabled for this bill".
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("no PIX key configured")]
    MissingKey,
    #[error("no merchant name configured")]
    MissingMerchantName,
    #[error("no merchant city configured")]
    MissingMerchantCity,
    #[error("field {id} is {len} characters long, at most {max} fit")]
    FieldTooLong {
        id: &'static str,
        len: usize,
        max: usize,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("payload is not ASCII")]
    NotAscii,
    #[error("truncated field at offset {0}")]
    Truncated(usize),
    #[error("invalid length at offset {0}")]
    BadLength(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub id: String,
    pub value: String,
}

/// Build the payload text. `None` or a non-positive amount leaves the
/// amount field out so the paying wallet asks for it.
pub fn encode(config: &PixConfig, amount: Option<Money>) -> Result<String, PayloadError> {
    let key = normalized_key(config).ok_or(PayloadError::MissingKey)?;
    let name = required(config.merchant_name.as_deref())
        .ok_or(PayloadError::MissingMerchantName)?;
    let city = required(config.merchant_city.as_deref())
        .ok_or(PayloadError::MissingMerchantCity)?;
    let name = truncate(&name, MAX_MERCHANT_NAME);
    let city = truncate(&city, MAX_MERCHANT_CITY);

    let reference: String = config
        .reference
        .as_deref()
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(MAX_REFERENCE)
        .collect();
    let reference = if reference.is_empty() {
        UNSPECIFIED_REFERENCE.to_string()
    } else {
        reference
    };

    let mut account = String::new();
    push_field(&mut account, MAI_GUI, PIX_GUI)?;
    push_field(&mut account, MAI_KEY, &key)?;

    let mut additional = String::new();
    push_field(&mut additional, ADDITIONAL_REFERENCE, &reference)?;

    let mut out = String::with_capacity(128);
    push_field(&mut out, PAYLOAD_FORMAT_INDICATOR, FORMAT_VERSION)?;
    push_field(&mut out, POINT_OF_INITIATION, ONE_SHOT)?;
    push_field(&mut out, MERCHANT_ACCOUNT_INFO, &account)?;
    push_field(&mut out, MERCHANT_CATEGORY_CODE, CATEGORY_UNSPECIFIED)?;
    push_field(&mut out, TRANSACTION_CURRENCY, CURRENCY_BRL)?;
    if let Some(amount) = amount.filter(|a| a.is_positive()) {
        let amount = amount.to_decimal_string();
        if amount.len() > MAX_AMOUNT_LEN {
            return Err(PayloadError::FieldTooLong {
                id: TRANSACTION_AMOUNT,
                len: amount.len(),
                max: MAX_AMOUNT_LEN,
            });
        }
        push_field(&mut out, TRANSACTION_AMOUNT, &amount)?;
    }
    push_field(&mut out, COUNTRY_CODE, COUNTRY_BR)?;
    push_field(&mut out, MERCHANT_NAME, &name)?;
    push_field(&mut out, MERCHANT_CITY, &city)?;
    push_field(&mut out, ADDITIONAL_DATA, &additional)?;

    out.push_str(CRC);
    out.push_str("04");
    let checksum = crc16_hex(out.as_bytes());
    out.push_str(&checksum);
    Ok(out)
}

/// The key exactly as it is written into the payload, `None` when blank.
pub fn normalized_key(config: &PixConfig) -> Option<String> {
    required(config.key.as_deref())
}

/// Split a field sequence into its top-level fields.
pub fn parse_fields(text: &str) -> Result<Vec<Field>, ParseError> {
    if !text.is_ascii() {
        return Err(ParseError::NotAscii);
    }

    let mut fields = Vec::new();
    let mut pos = 0;
    while pos < text.len() {
        let header = text.get(pos..pos + 4).ok_or(ParseError::Truncated(pos))?;
        let len: usize = header[2..]
            .parse()
            .map_err(|_| ParseError::BadLength(pos))?;
        let value = text
            .get(pos + 4..pos + 4 + len)
            .ok_or(ParseError::Truncated(pos))?;
        fields.push(Field {
            id: header[..2].to_string(),
            value: value.to_string(),
        });
        pos += 4 + len;
    }
    Ok(fields)
}

/// Recompute the trailing CRC over everything before it and compare.
pub fn verify_checksum(payload: &str) -> bool {
    if !payload.is_ascii() || payload.len() < 8 {
        return false;
    }
    let (body, digits) = payload.split_at(payload.len() - 4);
    body.ends_with("6304") && crc16_hex(body.as_bytes()).eq_ignore_ascii_case(digits)
}

fn push_field(out: &mut String, id: &'static str, value: &str) -> Result<(), PayloadError> {
    let len = value.chars().count();
    if len > MAX_FIELD_LEN {
        return Err(PayloadError::FieldTooLong {
            id,
            len,
            max: MAX_FIELD_LEN,
        });
    }
    out.push_str(id);
    out.push_str(&format!("{:02}", len));
    out.push_str(value);
    Ok(())
}

/// Trimmed ASCII rendition of a configured value, `None` when blank.
fn required(value: Option<&str>) -> Option<String> {
    let cleaned = to_ascii(value?);
    let trimmed = cleaned.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn truncate(value: &str, max: usize) -> String {
    value.chars().take(max).collect::<String>().trim_end().to_string()
}

/// Wallet scanners expect plain ASCII: fold Portuguese diacritics and drop
/// anything else outside printable ASCII.
fn to_ascii(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => Some('a'),
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => Some('A'),
            'é' | 'è' | 'ê' | 'ë' => Some('e'),
            'É' | 'È' | 'Ê' | 'Ë' => Some('E'),
            'í' | 'ì' | 'î' | 'ï' => Some('i'),
            'Í' | 'Ì' | 'Î' | 'Ï' => Some('I'),
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => Some('o'),
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => Some('O'),
            'ú' | 'ù' | 'û' | 'ü' => Some('u'),
            'Ú' | 'Ù' | 'Û' | 'Ü' => Some('U'),
            'ç' => Some('c'),
            'Ç' => Some('C'),
            'ñ' => Some('n'),
            'Ñ' => Some('N'),
            c if c.is_ascii() && !c.is_ascii_control() => Some(c),
            _ => None,
        })
        .collect()
}
