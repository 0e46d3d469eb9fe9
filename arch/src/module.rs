use crate::error::Error;

// Layout (little-endian):
//   [signature: 8][version: 8][count: 8][count x 8-byte instruction words]

pub const SIGNATURE: [u8; 8] = *b"meow\0\0\0\0";
pub const VERSION: u64 = 4;
const HEADER_LEN: usize = 24;

/// Serialized program: a flat sequence of instruction words.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Module {
    pub words: Vec<u64>,
}

impl Module {
    pub fn new(words: Vec<u64>) -> Self {
        Module { words }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.words.len() * 8);
        bytes.extend_from_slice(&SIGNATURE);
        bytes.extend_from_slice(&VERSION.to_le_bytes());
        bytes.extend_from_slice(&(self.words.len() as u64).to_le_bytes());
        for word in &self.words {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    /// Signature is checked before version, and both before any word is read.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let field = |at: usize| -> Result<[u8; 8], Error> {
            let mut buf = [0u8; 8];
            let src = bytes.get(at..at + 8).ok_or(Error::Truncated {
                expected: at + 8,
                found: bytes.len(),
            })?;
            buf.copy_from_slice(src);
            Ok(buf)
        };

        let signature = field(0)?;
        if signature != SIGNATURE {
            return Err(Error::InvalidSignature(signature));
        }

        let version = u64::from_le_bytes(field(8)?);
        if version != VERSION {
            return Err(Error::InvalidVersion(version));
        }

        let count = u64::from_le_bytes(field(16)?);
        let end = usize::try_from(count)
            .ok()
            .and_then(|count| count.checked_mul(8))
            .and_then(|size| size.checked_add(HEADER_LEN))
            .ok_or(Error::Truncated {
                expected: usize::MAX,
                found: bytes.len(),
            })?;
        if bytes.len() < end {
            return Err(Error::Truncated {
                expected: end,
                found: bytes.len(),
            });
        }
        if bytes.len() > end {
            return Err(Error::TrailingBytes(bytes.len() - end));
        }

        let words = bytes[HEADER_LEN..end]
            .chunks_exact(8)
            .map(|chunk| {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(chunk);
                u64::from_le_bytes(buf)
            })
            .collect();
        Ok(Module { words })
    }
}
