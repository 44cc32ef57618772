//! The 64-byte ZMTP greeting exchanged immediately after a transport connects
//! (§6).

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::errors::{ProtocolError, Result};

/// First signature byte.
pub const SIGNATURE_1: u8 = 0xFF;
/// Second signature byte.
pub const SIGNATURE_2: u8 = 0x7F;
/// Highest ZMTP major version this implementation speaks.
pub const VERSION_MAJOR: u8 = 3;
/// Minor version this implementation emits.
pub const VERSION_MINOR: u8 = 1;
/// Fixed wire size of the greeting.
pub const GREETING_LEN: usize = 64;

const MECHANISM_LEN: usize = 16;
const FILLER_LEN: usize = 35;

/// The fixed 64-byte greeting. Laid out to match the wire exactly so it can
/// be read/written via a straight byte-slice cast.
#[repr(C, packed)]
#[derive(Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct Greeting {
    signature_1: u8,
    reserved: [u8; 8],
    signature_2: u8,
    version_major: u8,
    version_minor: u8,
    mechanism: [u8; MECHANISM_LEN],
    as_server: u8,
    filler: [u8; FILLER_LEN],
}

impl Greeting {
    /// Build a greeting announcing `mechanism` (e.g. `"NULL"`, `"CURVE"`).
    ///
    /// # Panics
    ///
    /// Panics if `mechanism` is not ASCII or longer than 16 bytes — a
    /// programmer error, not a wire condition.
    pub fn new(mechanism: &str, as_server: bool) -> Self {
        assert!(mechanism.is_ascii(), "mechanism name must be ASCII");
        assert!(mechanism.len() <= MECHANISM_LEN, "mechanism name too long");

        let mut mechanism_field = [0u8; MECHANISM_LEN];
        mechanism_field[..mechanism.len()].copy_from_slice(mechanism.as_bytes());

        Self {
            signature_1: SIGNATURE_1,
            reserved: [0u8; 8],
            signature_2: SIGNATURE_2,
            version_major: VERSION_MAJOR,
            version_minor: VERSION_MINOR,
            mechanism: mechanism_field,
            as_server: u8::from(as_server),
            filler: [0u8; FILLER_LEN],
        }
    }

    /// Serialize to the fixed 64-byte wire form.
    pub fn to_bytes(self) -> [u8; GREETING_LEN] {
        let mut out = [0u8; GREETING_LEN];
        out.copy_from_slice(self.as_bytes());
        out
    }

    /// Parse a greeting from the front of `buf`. `buf` must be at least
    /// [`GREETING_LEN`] bytes.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        if buf.len() < GREETING_LEN {
            return Err(ProtocolError::FrameTooShort { expected: GREETING_LEN, actual: buf.len() });
        }

        let greeting =
            Self::read_from_bytes(&buf[..GREETING_LEN]).expect("slice length checked above");

        if greeting.signature_1 != SIGNATURE_1 || greeting.signature_2 != SIGNATURE_2 {
            return Err(ProtocolError::InvalidSignature);
        }
        if greeting.mechanism.iter().any(|&b| b != 0 && !b.is_ascii_graphic()) {
            return Err(ProtocolError::InvalidMechanismName);
        }
        if greeting.version_major > VERSION_MAJOR {
            return Err(ProtocolError::UnsupportedVersion(greeting.version_major));
        }

        Ok(greeting)
    }

    /// The negotiated major version.
    pub fn version_major(&self) -> u8 {
        self.version_major
    }

    /// The negotiated minor version.
    pub fn version_minor(&self) -> u8 {
        self.version_minor
    }

    /// Mechanism name with trailing NUL padding stripped.
    pub fn mechanism_name(&self) -> &str {
        let end = self.mechanism.iter().position(|&b| b == 0).unwrap_or(MECHANISM_LEN);
        std::str::from_utf8(&self.mechanism[..end]).unwrap_or("")
    }

    /// Whether the sender of this greeting considers itself the server side
    /// of the connection (relevant for mechanisms like PLAIN/CURVE that
    /// behave asymmetrically).
    pub fn as_server(&self) -> bool {
        self.as_server != 0
    }
}

impl std::fmt::Debug for Greeting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Greeting")
            .field("version_major", &{ self.version_major })
            .field("version_minor", &{ self.version_minor })
            .field("mechanism", &self.mechanism_name())
            .field("as_server", &self.as_server())
            .finish()
    }
}

impl PartialEq for Greeting {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Greeting {}
