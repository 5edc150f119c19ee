// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use core::fmt;

/// Encoding of a field's raw data, as specified by the low 5 bits of the
/// field's type byte in EventHeader metadata. The high bits of the type byte
/// are flags: [`FieldEncoding::CArrayFlag`], [`FieldEncoding::VArrayFlag`],
/// [`FieldEncoding::ChainFlag`].
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FieldEncoding(u8);

impl FieldEncoding {
    /// Field is not usable (e.g. failed to parse metadata).
    pub const Invalid: Self = Self(0);
    /// Field is a nested structure with `format.as_int()` logical fields.
    pub const Struct: Self = Self(1);
    /// Field is an 8-bit value (e.g. i8, u8, char8, bool8).
    pub const Value8: Self = Self(2);
    /// Field is a 16-bit value (e.g. i16, u16, char16, bool16, float16).
    pub const Value16: Self = Self(3);
    /// Field is a 32-bit value (e.g. i32, u32, bool32, float32, errno).
    pub const Value32: Self = Self(4);
    /// Field is a 64-bit value (e.g. i64, u64, float64, time64).
    pub const Value64: Self = Self(5);
    /// Field is a 128-bit value (e.g. uuid/guid, ipv6 address).
    pub const Value128: Self = Self(6);
    /// Field is a nul-terminated array of 8-bit characters (Latin1 or UTF-8).
    pub const ZStringChar8: Self = Self(7);
    /// Field is a nul-terminated array of 16-bit characters (UTF-16).
    pub const ZStringChar16: Self = Self(8);
    /// Field is a nul-terminated array of 32-bit characters (UTF-32).
    pub const ZStringChar32: Self = Self(9);
    /// Field is a byte count (u16) followed by that many 8-bit characters.
    pub const StringLength16Char8: Self = Self(10);
    /// Field is a byte count (u16) followed by that many 16-bit characters.
    pub const StringLength16Char16: Self = Self(11);
    /// Field is a byte count (u16) followed by that many 32-bit characters.
    pub const StringLength16Char32: Self = Self(12);
    /// Field is a byte count (u16) followed by that many bytes of binary data.
    /// Same wire layout as [`FieldEncoding::StringLength16Char8`]; the difference
    /// is that the default format for this encoding is `HexBytes` instead of
    /// `String8`, and a length of 0 means the field is null rather than empty.
    pub const BinaryLength16Char8: Self = Self(13);

    /// Mask for the base encoding value (excludes the array/chain flags).
    pub const ValueMask: u8 = 0x1F;

    /// Flag: field is a constant-length array. The element count is given by
    /// the field descriptor's `specified_array_count`/`deduced_array_count`.
    pub const CArrayFlag: u8 = 0x20;

    /// Flag: field is a variable-length array. A `u16` element count
    /// immediately precedes the array's elements in the event payload.
    pub const VArrayFlag: u8 = 0x40;

    /// Flag: this field's type information is followed by another field's
    /// type information using the same tag. (Reserved for future encodings
    /// that need more than one byte to describe a single field's type.)
    pub const ChainFlag: u8 = 0x80;

    /// Mask of both array flags.
    pub const ArrayFlagMask: u8 = Self::CArrayFlag | Self::VArrayFlag;

    /// Mask of all flag bits (array flags and chain flag).
    pub const FlagMask: u8 = Self::ArrayFlagMask | Self::ChainFlag;

    /// Converts a raw byte into a `FieldEncoding`. Accepts any value, including
    /// unrecognized combinations - unrecognized base values are preserved as-is
    /// so that they can be detected and reported as errors by the caller.
    pub const fn from_int(value: u8) -> Self {
        Self(value)
    }

    /// Returns the raw byte value, including any flags.
    pub const fn as_int(self) -> u8 {
        self.0
    }

    /// Returns a copy of this encoding with the specified flag bits set.
    pub const fn with_flags(self, flags: u8) -> Self {
        Self(self.0 | flags)
    }

    /// Returns a copy of this encoding with all flag bits ([`Self::FlagMask`]) cleared.
    pub const fn without_flags(self) -> Self {
        Self(self.0 & !Self::FlagMask)
    }

    /// Returns the array flags ([`Self::CArrayFlag`] / [`Self::VArrayFlag`]), if any.
    pub const fn array_flags(self) -> u8 {
        self.0 & Self::ArrayFlagMask
    }

    /// Returns true if either array flag is set.
    pub const fn is_array(self) -> bool {
        self.array_flags() != 0
    }

    /// Returns true if the chain flag is set.
    pub const fn has_chain_flag(self) -> bool {
        self.0 & Self::ChainFlag != 0
    }

    /// Returns a copy of this encoding with the chain flag cleared, leaving
    /// the array flags and base value intact.
    pub const fn without_chain_flag(self) -> Self {
        Self(self.0 & !Self::ChainFlag)
    }
}

impl fmt::Debug for FieldEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = match self.without_flags() {
            Self::Invalid => "Invalid",
            Self::Struct => "Struct",
            Self::Value8 => "Value8",
            Self::Value16 => "Value16",
            Self::Value32 => "Value32",
            Self::Value64 => "Value64",
            Self::Value128 => "Value128",
            Self::ZStringChar8 => "ZStringChar8",
            Self::ZStringChar16 => "ZStringChar16",
            Self::ZStringChar32 => "ZStringChar32",
            Self::StringLength16Char8 => "StringLength16Char8",
            Self::StringLength16Char16 => "StringLength16Char16",
            Self::StringLength16Char32 => "StringLength16Char32",
            Self::BinaryLength16Char8 => "BinaryLength16Char8",
            other => return write!(f, "FieldEncoding({:#04x})", other.0),
        };
        write!(f, "{}(0x{:02x})", base, self.0)
    }
}

/// Formatting hint for a field's value, as specified by the low 7 bits of the
/// field's format byte in EventHeader metadata. The high bit
/// ([`FieldFormat::ChainFlag`]) indicates that field tag information follows.
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FieldFormat(u8);

impl FieldFormat {
    /// Use the encoding's default format.
    pub const Default: Self = Self(0);
    /// Unsigned decimal integer.
    pub const UnsignedInt: Self = Self(1);
    /// Signed decimal integer.
    pub const SignedInt: Self = Self(2);
    /// Hexadecimal integer.
    pub const HexInt: Self = Self(3);
    /// POSIX errno value, e.g. `ENOENT(2)`.
    pub const Errno: Self = Self(4);
    /// Process or thread id.
    pub const Pid: Self = Self(5);
    /// 32-bit or 64-bit Unix time (seconds since 1970).
    pub const Time: Self = Self(6);
    /// Boolean value.
    pub const Boolean: Self = Self(7);
    /// Floating-point value.
    pub const Float: Self = Self(8);
    /// Binary data formatted as space-separated hex bytes.
    pub const HexBytes: Self = Self(9);
    /// 8-bit-character string (Latin1 or UTF-8, no BOM sniffing).
    pub const String8: Self = Self(10);
    /// Character string, width determined by encoding's element size.
    pub const StringUtf: Self = Self(11);
    /// Character string, possibly prefixed with a byte-order-mark that
    /// determines both the width and byte order of the string.
    pub const StringUtfBom: Self = Self(12);
    /// XML string (same decoding as [`Self::StringUtfBom`]).
    pub const StringXml: Self = Self(13);
    /// JSON string (same decoding as [`Self::StringUtfBom`]).
    pub const StringJson: Self = Self(14);
    /// UUID/GUID, 16 bytes, big-endian (RFC 4122) byte order.
    pub const Uuid: Self = Self(15);
    /// Port number, 16-bit value in big-endian (network) byte order.
    pub const Port: Self = Self(16);
    /// IPv4 address, 4 bytes. Deprecated in favor of [`Self::IPAddress`].
    pub const IPv4: Self = Self(17);
    /// IPv6 address, 16 bytes. Deprecated in favor of [`Self::IPAddress`].
    pub const IPv6: Self = Self(18);
    /// IP address: a 4-byte field formats as IPv4, a 16-byte field formats as
    /// IPv6. Preferred over the separate [`Self::IPv4`]/[`Self::IPv6`] formats.
    pub const IPAddress: Self = Self(19);
    /// Same semantics as [`Self::IPAddress`]. Kept for compatibility with
    /// events generated before `IPAddress` was assigned its own format value.
    pub const IPAddressObsolete: Self = Self(20);

    /// Mask for the base format value (excludes the chain flag).
    pub const ValueMask: u8 = 0x7F;

    /// Flag: another format/tag byte follows this one.
    pub const ChainFlag: u8 = 0x80;

    /// Converts a raw byte into a `FieldFormat`. Accepts any value, including
    /// unrecognized ones, so callers can detect and report unknown formats.
    pub const fn from_int(value: u8) -> Self {
        Self(value)
    }

    /// Returns the raw byte value, including the chain flag if set.
    pub const fn as_int(self) -> u8 {
        self.0
    }

    /// Returns a copy with all flag bits ([`Self::ChainFlag`]) cleared.
    pub const fn without_flags(self) -> Self {
        Self(self.0 & Self::ValueMask)
    }

    /// Returns true if the chain flag is set.
    pub const fn has_chain_flag(self) -> bool {
        self.0 & Self::ChainFlag != 0
    }
}

impl fmt::Debug for FieldFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = match self.without_flags() {
            Self::Default => "Default",
            Self::UnsignedInt => "UnsignedInt",
            Self::SignedInt => "SignedInt",
            Self::HexInt => "HexInt",
            Self::Errno => "Errno",
            Self::Pid => "Pid",
            Self::Time => "Time",
            Self::Boolean => "Boolean",
            Self::Float => "Float",
            Self::HexBytes => "HexBytes",
            Self::String8 => "String8",
            Self::StringUtf => "StringUtf",
            Self::StringUtfBom => "StringUtfBom",
            Self::StringXml => "StringXml",
            Self::StringJson => "StringJson",
            Self::Uuid => "Uuid",
            Self::Port => "Port",
            Self::IPv4 => "IPv4",
            Self::IPv6 => "IPv6",
            Self::IPAddress => "IPAddress",
            Self::IPAddressObsolete => "IPAddressObsolete",
            other => return write!(f, "FieldFormat({:#04x})", other.0),
        };
        write!(f, "{}(0x{:02x})", base, self.0)
    }
}

/// Indicates whether an EventHeader event uses 32-bit or 64-bit pointers,
/// little-endian or big-endian byte order, and whether it has extension blocks.
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HeaderFlags(u8);

impl HeaderFlags {
    /// No flags set. Not a value that should normally be generated.
    pub const None: Self = Self(0);
    /// Event uses 64-bit pointers.
    pub const Pointer64: Self = Self(0x01);
    /// Event uses little-endian byte order. Always set on little-endian hosts,
    /// never set on big-endian hosts.
    pub const LittleEndian: Self = Self(0x02);
    /// Event has one or more [`crate::EventHeaderExtension`] blocks before the payload.
    pub const Extension: Self = Self(0x04);

    /// The flags value that a little-endian host should use for an event with
    /// no extension blocks: `LittleEndian` plus `Pointer64` if `usize` is 8 bytes.
    #[cfg(target_pointer_width = "64")]
    pub const Default: Self = Self(Self::LittleEndian.0 | Self::Pointer64.0);
    /// The flags value that a little-endian host should use for an event with
    /// no extension blocks: `LittleEndian` plus `Pointer64` if `usize` is 8 bytes.
    #[cfg(not(target_pointer_width = "64"))]
    pub const Default: Self = Self(Self::LittleEndian.0);

    /// Same as [`Self::Default`] but with the `Extension` flag set.
    pub const DefaultWithExtension: Self = Self(Self::Default.0 | Self::Extension.0);

    /// Converts a raw byte into a `HeaderFlags`. Accepts any value, including
    /// combinations of unrecognized bits.
    pub const fn from_int(value: u8) -> Self {
        Self(value)
    }

    /// Returns the raw byte value.
    pub const fn as_int(self) -> u8 {
        self.0
    }

    /// Returns true if all bits set in `flag` are also set in `self`.
    pub const fn has_flag(self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0
    }
}

impl fmt::Debug for HeaderFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HeaderFlags(0x{:02x})", self.0)
    }
}

/// Special semantics for an EventHeader event, e.g. activity start/stop.
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Opcode(u8);

impl Opcode {
    /// Informational event, no special semantics.
    pub const Info: Self = Self(0);
    /// Marks the start of an activity. Usually paired with an `ActivityStop` event
    /// and an extension containing the activity's id (and optionally the id of a
    /// related/parent activity).
    pub const ActivityStart: Self = Self(1);
    /// Marks the end of an activity.
    pub const ActivityStop: Self = Self(2);
    /// Marks the start of a collection/batch of events.
    pub const CollectionStart: Self = Self(3);
    /// Marks the end of a collection/batch of events.
    pub const CollectionStop: Self = Self(4);
    /// Extension event, semantics defined by the provider.
    pub const Extension: Self = Self(5);
    /// Reply to a request.
    pub const Reply: Self = Self(6);
    /// Resuming after a suspend.
    pub const Resume: Self = Self(7);
    /// Suspending.
    pub const Suspend: Self = Self(8);
    /// Sending a message.
    pub const Send: Self = Self(9);
    /// Receiving a message.
    pub const Receive: Self = Self(240);

    /// Converts a raw byte into an `Opcode`. Accepts any value, including
    /// unrecognized ones.
    pub const fn from_int(value: u8) -> Self {
        Self(value)
    }

    /// Returns the raw byte value.
    pub const fn as_int(self) -> u8 {
        self.0
    }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::Info => "Info",
            Self::ActivityStart => "ActivityStart",
            Self::ActivityStop => "ActivityStop",
            Self::CollectionStart => "CollectionStart",
            Self::CollectionStop => "CollectionStop",
            Self::Extension => "Extension",
            Self::Reply => "Reply",
            Self::Resume => "Resume",
            Self::Suspend => "Suspend",
            Self::Send => "Send",
            Self::Receive => "Receive",
            other => return write!(f, "Opcode({})", other.0),
        };
        write!(f, "{}({})", name, self.0)
    }
}

/// Event severity level: lower values are more severe.
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(u8);

impl Level {
    /// No level specified. Only meaningful before an event has been parsed.
    pub const Invalid: Self = Self(0);
    /// Critical/fatal error.
    pub const Critical: Self = Self(1);
    /// Error.
    pub const Error: Self = Self(2);
    /// Warning.
    pub const Warning: Self = Self(3);
    /// Informational.
    pub const Information: Self = Self(4);
    /// Verbose/debug.
    pub const Verbose: Self = Self(5);

    /// Converts a raw byte into a `Level`. Accepts any value, including
    /// unrecognized ones.
    pub const fn from_int(value: u8) -> Self {
        Self(value)
    }

    /// Returns the raw byte value.
    pub const fn as_int(self) -> u8 {
        self.0
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::Invalid => "Invalid",
            Self::Critical => "Critical",
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Information => "Information",
            Self::Verbose => "Verbose",
            other => return write!(f, "Level({})", other.0),
        };
        write!(f, "{}({})", name, self.0)
    }
}

/// Type of an [`crate::EventHeaderExtension`] block.
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ExtensionKind(u16);

impl ExtensionKind {
    /// Invalid/unused extension kind.
    pub const Invalid: Self = Self(0);
    /// Extension contains the event's metadata (name and field types), encoded
    /// in the packed EventHeader field-descriptor layout.
    pub const Metadata: Self = Self(1);
    /// Extension contains a 16-byte activity id, optionally followed by a
    /// 16-byte related (parent) activity id.
    pub const ActivityId: Self = Self(2);

    /// Mask for the base kind value (excludes the chain flag).
    pub const ValueMask: u16 = 0x7FFF;

    /// Flag: another extension block follows this one.
    pub const ChainFlag: u16 = 0x8000;

    /// Converts a raw value into an `ExtensionKind`. Accepts any value.
    pub const fn from_int(value: u16) -> Self {
        Self(value)
    }

    /// Returns the raw value, including the chain flag if set.
    pub const fn as_int(self) -> u16 {
        self.0
    }

    /// Returns true if all bits set in `flag` are also set in `self`.
    pub const fn has_flag(self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0
    }
}

impl fmt::Debug for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtensionKind(0x{:04x})", self.0)
    }
}
