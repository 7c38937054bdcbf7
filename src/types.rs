//! Core types shared by devices and their collaborators.

/// Electrical level of a binary output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputLevel {
    /// Output driven low / relay released.
    #[default]
    Inactive,

    /// Output driven high / relay energized.
    Active,
}

impl OutputLevel {
    /// Returns true for [`OutputLevel::Active`].
    #[inline]
    pub const fn is_active(self) -> bool {
        matches!(self, OutputLevel::Active)
    }

    /// The status word reported upstream for this level.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            OutputLevel::Active => "on",
            OutputLevel::Inactive => "off",
        }
    }
}

/// Identifies the physical output a device drives (pin number, relay index, etc).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel(pub u8);

impl From<u8> for Channel {
    fn from(pin: u8) -> Self {
        Channel(pin)
    }
}

impl From<Channel> for usize {
    fn from(channel: Channel) -> Self {
        channel.0 as usize
    }
}

/// Transmission protocols known to signal emitters.
///
/// The discriminants are the selector values used in device configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Protocol {
    Nec = 1,
    Sony = 2,
    Rc5 = 3,
    Rc6 = 4,
    Dish = 5,
    Jvc = 6,
    Samsung = 7,
    Lg = 8,
    Whynter = 9,
    Coolix = 10,
    Denon = 11,
    Sherwood = 12,
    Rcmm = 13,
    Mitsubishi = 14,
    Mitsubishi2 = 15,
    Sharp = 16,
    AiwaRcT501 = 17,
    Midea = 18,
    GiCable = 19,
}

impl Protocol {
    /// Every protocol in selector order.
    pub const ALL: [Protocol; 19] = [
        Protocol::Nec,
        Protocol::Sony,
        Protocol::Rc5,
        Protocol::Rc6,
        Protocol::Dish,
        Protocol::Jvc,
        Protocol::Samsung,
        Protocol::Lg,
        Protocol::Whynter,
        Protocol::Coolix,
        Protocol::Denon,
        Protocol::Sherwood,
        Protocol::Rcmm,
        Protocol::Mitsubishi,
        Protocol::Mitsubishi2,
        Protocol::Sharp,
        Protocol::AiwaRcT501,
        Protocol::Midea,
        Protocol::GiCable,
    ];

    /// Looks up a protocol by selector. Returns `None` for selectors outside the catalogue.
    pub fn from_selector(selector: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.selector() == selector)
    }

    /// The numeric selector for this protocol.
    #[inline]
    pub const fn selector(self) -> u8 {
        self as u8
    }

    /// Upper-case protocol name.
    pub const fn name(self) -> &'static str {
        match self {
            Protocol::Nec => "NEC",
            Protocol::Sony => "SONY",
            Protocol::Rc5 => "RC5",
            Protocol::Rc6 => "RC6",
            Protocol::Dish => "DISH",
            Protocol::Jvc => "JVC",
            Protocol::Samsung => "SAMSUNG",
            Protocol::Lg => "LG",
            Protocol::Whynter => "WHYNTER",
            Protocol::Coolix => "COOLIX",
            Protocol::Denon => "DENON",
            Protocol::Sherwood => "SHERWOOD",
            Protocol::Rcmm => "RCMM",
            Protocol::Mitsubishi => "MITSUBISHI",
            Protocol::Mitsubishi2 => "MITSUBISHI2",
            Protocol::Sharp => "SHARP",
            Protocol::AiwaRcT501 => "AIWARCT501",
            Protocol::Midea => "MIDEA",
            Protocol::GiCable => "GICABLE",
        }
    }
}

/// Code, bit length and protocol selector forwarded to a signal emitter.
///
/// The protocol selector is kept raw: selectors outside the [`Protocol`]
/// catalogue are valid configuration and make the emitter a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalProfile {
    code: u64,
    bits: u8,
    protocol: u8,
}

impl SignalProfile {
    /// Largest supported bit length.
    pub const MAX_BITS: u8 = 64;

    /// Creates a validated signal profile.
    ///
    /// # Errors
    /// * `InvalidBitLength` - `bits` is zero or greater than 64
    /// * `CodeTooWide` - `code` has bits set above `bits`
    pub fn new(code: u64, bits: u8, protocol: u8) -> Result<Self, ConfigError> {
        if bits == 0 || bits > Self::MAX_BITS {
            return Err(ConfigError::InvalidBitLength(bits));
        }

        if bits < Self::MAX_BITS && code >> bits != 0 {
            return Err(ConfigError::CodeTooWide { code, bits });
        }

        Ok(Self {
            code,
            bits,
            protocol,
        })
    }

    pub fn code(&self) -> u64 {
        self.code
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Raw protocol selector.
    pub fn selector(&self) -> u8 {
        self.protocol
    }

    /// Catalogue entry for the selector, if any.
    pub fn protocol(&self) -> Option<Protocol> {
        Protocol::from_selector(self.protocol)
    }
}

/// Device configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Signal bit length outside 1..=64.
    InvalidBitLength(u8),

    /// Signal code does not fit in the configured bit length.
    CodeTooWide { code: u64, bits: u8 },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::InvalidBitLength(bits) => {
                write!(f, "signal bit length {} is outside 1..=64", bits)
            }
            ConfigError::CodeTooWide { code, bits } => {
                write!(f, "signal code {:#x} does not fit in {} bits", code, bits)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
