//! Hex-form QRL address validation.
//!
//! # Address layout (39 bytes, rendered as `Q` + 78 hex digits)
//!
//! ```text
//! [0..3)   descriptor   byte0 = sig_type << 4 | hash_fn
//!                       byte1 = addr_format << 4 | tree_height / 2
//!                       byte2 = reserved
//! [3..35)  sha256(descriptor || public_key)
//! [35..39) checksum     last 4 bytes of sha256(bytes[0..35])
//! ```
//!
//! Only XMSS signatures with the `SHA256_2X` address format are accepted.

use sha2::{Digest, Sha256};

/// Length of a hex-form address including the leading `Q`.
pub const HEX_ADDRESS_LEN: usize = 79;

const ADDRESS_BYTES: usize = 39;
const DESCRIPTOR_BYTES: usize = 3;
const CHECKSUM_OFFSET: usize = 35;

/// Capability that decides whether a `provider` string is an acceptable
/// address. Injected into the pipeline so tests and alternate chains can
/// substitute their own rules.
pub trait AddressValidator: Send + Sync {
    fn is_valid(&self, address: &str) -> bool;
}

/// Hash function nibble of the address descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashFunction {
    Sha2_256,
    Shake128,
    Shake256,
}

/// A decoded, checksum-verified QRL address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrlAddress {
    pub hash_function: HashFunction,
    /// XMSS tree height (even, 2..=30).
    pub tree_height: u8,
    bytes: [u8; ADDRESS_BYTES],
}

impl QrlAddress {
    /// Lowercase hex form with the leading `Q`.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("Q{}", hex::encode(self.bytes))
    }
}

/// Why an address string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address is {0} bytes, expected {HEX_ADDRESS_LEN}")]
    Length(usize),
    #[error("address does not start with 'Q'")]
    Prefix,
    #[error("address body is not hex")]
    NotHex,
    #[error("unsupported signature type {0}")]
    SignatureType(u8),
    #[error("unsupported hash function {0}")]
    HashFunction(u8),
    #[error("unsupported address format {0}")]
    AddressFormat(u8),
    #[error("invalid tree height {0}")]
    TreeHeight(u8),
    #[error("checksum mismatch")]
    Checksum,
}

/// Parse and verify a hex-form QRL address.
///
/// Hex digits are accepted in either case; the `Q` prefix is case-sensitive.
///
/// # Errors
///
/// Returns the first [`AddressError`] encountered, checked in layout order.
pub fn parse_hex_address(address: &str) -> Result<QrlAddress, AddressError> {
    if address.len() != HEX_ADDRESS_LEN {
        return Err(AddressError::Length(address.len()));
    }
    let body = address.strip_prefix('Q').ok_or(AddressError::Prefix)?;

    let mut bytes = [0u8; ADDRESS_BYTES];
    hex::decode_to_slice(body, &mut bytes).map_err(|_| AddressError::NotHex)?;

    let signature_type = bytes[0] >> 4;
    if signature_type != 0 {
        return Err(AddressError::SignatureType(signature_type));
    }
    let hash_function = match bytes[0] & 0x0f {
        0 => HashFunction::Sha2_256,
        1 => HashFunction::Shake128,
        2 => HashFunction::Shake256,
        other => return Err(AddressError::HashFunction(other)),
    };
    let address_format = bytes[1] >> 4;
    if address_format != 0 {
        return Err(AddressError::AddressFormat(address_format));
    }
    let tree_height = (bytes[1] & 0x0f) * 2;
    if tree_height < 2 {
        return Err(AddressError::TreeHeight(tree_height));
    }

    let checksum = Sha256::digest(&bytes[..CHECKSUM_OFFSET]);
    if checksum[checksum.len() - 4..] != bytes[CHECKSUM_OFFSET..] {
        return Err(AddressError::Checksum);
    }

    Ok(QrlAddress {
        hash_function,
        tree_height,
        bytes,
    })
}

/// Derive the hex-form address for a descriptor and public key.
#[must_use]
pub fn derive_hex_address(descriptor: [u8; DESCRIPTOR_BYTES], public_key: &[u8]) -> String {
    let mut bytes = [0u8; ADDRESS_BYTES];
    bytes[..DESCRIPTOR_BYTES].copy_from_slice(&descriptor);

    let mut hasher = Sha256::new();
    hasher.update(descriptor);
    hasher.update(public_key);
    bytes[DESCRIPTOR_BYTES..CHECKSUM_OFFSET].copy_from_slice(&hasher.finalize());

    let checksum = Sha256::digest(&bytes[..CHECKSUM_OFFSET]);
    bytes[CHECKSUM_OFFSET..].copy_from_slice(&checksum[checksum.len() - 4..]);

    format!("Q{}", hex::encode(bytes))
}

/// The default validator: [`parse_hex_address`] succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrlHexAddress;

impl AddressValidator for QrlHexAddress {
    fn is_valid(&self, address: &str) -> bool {
        parse_hex_address(address).is_ok()
    }
}
