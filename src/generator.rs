//! Short code generation
//!
//! Codes are drawn from the base62 alphabet using the OS random number generator

use std::fmt;
use std::ops::RangeInclusive;

use rand_core::OsRng;
use rand_core::TryRngCore;

/// Alphabet of every short code
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Allowed lengths of generated codes
pub const CODE_LENGTHS: RangeInclusive<usize> = 6..=8;

/// Default length of generated codes
pub const DEFAULT_CODE_LENGTH: usize = 7;

/// Longest code accepted on the read path
const MAX_PARSE_LENGTH: usize = 32;

/// Largest multiple of the alphabet size that fits in a byte, bytes above are rejected
const REJECTION_LIMIT: u8 = 248;

/// A URL-safe short code
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShortCode(String);

impl ShortCode {
    /// Parse a short code from user input
    ///
    /// Only alphabet characters are accepted; anything else can never have been minted
    pub fn parse(code: &str) -> Option<Self> {
        if code.is_empty() || code.len() > MAX_PARSE_LENGTH {
            return None;
        }

        if code.bytes().all(|byte| ALPHABET.contains(&byte)) {
            Some(Self(code.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generates candidate short codes
///
/// Implementations don't talk to storage, uniqueness is up to the caller
pub trait Generator: Send + Sync + 'static {
    fn generate(&self) -> ShortCode;
}

/// Invalid generator configuration
#[derive(Debug)]
pub struct InvalidLength(pub usize);

impl std::error::Error for InvalidLength {}

impl fmt::Display for InvalidLength {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Code length {} is not within {}..={}",
            self.0,
            CODE_LENGTHS.start(),
            CODE_LENGTHS.end()
        )
    }
}

/// Random codes of a fixed length
#[derive(Clone, Debug)]
pub struct RandomGenerator {
    length: usize,
}

impl RandomGenerator {
    /// Create a generator for codes of `length` characters
    ///
    /// # Errors
    ///
    /// Will return `Err` when the length is outside of [`CODE_LENGTHS`]
    pub fn new(length: usize) -> Result<Self, InvalidLength> {
        if CODE_LENGTHS.contains(&length) {
            Ok(Self { length })
        } else {
            Err(InvalidLength(length))
        }
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self {
            length: DEFAULT_CODE_LENGTH,
        }
    }
}

impl Generator for RandomGenerator {
    fn generate(&self) -> ShortCode {
        let mut code = String::with_capacity(self.length);
        let mut buffer = [0u8; 16];

        while code.len() < self.length {
            OsRng
                .try_fill_bytes(&mut buffer)
                .expect("OS random number generator failed");

            for byte in buffer {
                if byte >= REJECTION_LIMIT {
                    continue;
                }

                code.push(ALPHABET[usize::from(byte) % ALPHABET.len()] as char);

                if code.len() == self.length {
                    break;
                }
            }
        }

        ShortCode(code)
    }
}
