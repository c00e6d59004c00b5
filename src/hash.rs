use std::fmt;

const FNV1A_BASE64: u64 = 0xcbf2_9ce4_8422_2325;
const FNV1A_PRIME64: u64 = 0x0000_0100_0000_01b3;

/// Hashed section or property name.
///
/// Names are compared by hash only, collisions are not detected.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringHash(u64);

impl StringHash {
    pub fn new(s: &str) -> StringHash {
        StringHash::from_bytes(s.as_bytes())
    }

    /// FNV-1a over `buf`.
    pub fn from_bytes(buf: &[u8]) -> StringHash {
        let hash = buf
            .iter()
            .fold(FNV1A_BASE64, |h, &b| (h ^ b as u64).wrapping_mul(FNV1A_PRIME64));
        StringHash(hash)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<&str> for StringHash {
    fn from(s: &str) -> StringHash {
        StringHash::new(s)
    }
}

impl fmt::Debug for StringHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StringHash({:#018x})", self.0)
    }
}
