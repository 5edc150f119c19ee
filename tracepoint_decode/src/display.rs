// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! `fmt::Display` helpers for using  tracepoint_decode types with format
//! macros like [`write!`] and [`format_args!`].

use core::fmt;
use core::fmt::Write;

use eventheader_types::*;

use crate::charconv;
use crate::filters;
use crate::filters::Filter;
use crate::perf_item;

use crate::PerfConvertOptions;

/// Display implementation that JSON-escapes the provided input string.
/// This escapes control chars, quotes, and backslashes. For example,
/// the string `Hello, "world"!` would be displayed as `Hello, \"world\"!`.
pub struct JsonEscapeDisplay<'str> {
    value: &'str str,
}

impl<'str> JsonEscapeDisplay<'str> {
    /// Creates a new formatter for the specified string.
    pub fn new(value: &'str str) -> Self {
        return Self { value };
    }

    /// Writes the JSON-escaped value to the specified writer.
    pub fn write_to<W: fmt::Write + ?Sized>(&self, writer: &mut W) -> fmt::Result {
        let mut dest = filters::WriteFilter::new(writer);
        return filters::JsonEscapeFilter::new(&mut dest).write_str(self.value);
    }
}

impl<'str> fmt::Display for JsonEscapeDisplay<'str> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> fmt::Result {
        return self.write_to(f);
    }
}

/// Display implementation for string data is expected to be UTF-8. For example,
/// this may be used for the name of an EventHeader event or field.
///
/// Tries to interpret the value as UTF-8, but falls back to Latin1 if the value
/// contains non-UTF-8 sequences. This allows the value to be displayed with
/// best-effort fidelity even if the event is incorrectly-authored or corrupt.
///
/// Instances of this type are returned by methods such as
/// [`crate::EventHeaderEventInfo::name_display`] and
/// [`crate::EventHeaderItemInfo::name_display`].
#[derive(Clone, Copy, Debug)]
pub struct Utf8WithLatin1FallbackDisplay<'dat> {
    utf8_bytes: &'dat [u8],
}

impl<'dat> Utf8WithLatin1FallbackDisplay<'dat> {
    /// Creates a new formatter for the specified string data.
    ///
    /// The `utf8_bytes` value is expected to be UTF-8, but if it is not, the bytes
    /// that are not valid UTF-8 will be interpreted as Latin-1.
    pub fn new(utf8_bytes: &'dat [u8]) -> Self {
        return Self { utf8_bytes };
    }

    /// Writes the value to the specified writer.
    pub fn write_to<W: fmt::Write + ?Sized>(&self, writer: &mut W) -> fmt::Result {
        let mut dest = filters::WriteFilter::new(writer);
        return charconv::write_utf8_with_latin1_fallback_to(self.utf8_bytes, &mut dest);
    }
}

impl<'dat> fmt::Display for Utf8WithLatin1FallbackDisplay<'dat> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> fmt::Result {
        return self.write_to(f);
    }
}

/// Display implementation for the name and tag of an EventHeader field.
///
/// If the field tag is 0, writes just the field name.
/// Otherwise, writes the field name plus a suffix like ";tag=0x1234".
///
/// Tries to interpret the name as UTF-8, but falls back to Latin1 if the name
/// contains non-UTF-8 sequences. This allows the value to be displayed with
/// best-effort fidelity even if the event is incorrectly-authored or corrupt.
///
/// Instances of this type are returned by the
/// [`crate::EventHeaderItemInfo::name_and_tag_display`] method.
#[derive(Clone, Copy, Debug)]
pub struct FieldNameAndTagDisplay<'dat> {
    name_utf8_bytes: &'dat [u8],
    tag: u16,
}

impl<'dat> FieldNameAndTagDisplay<'dat> {
    /// Creates a new formatter for the specified field name and field tag.
    ///
    /// The `name_utf8_bytes` value is expected to be UTF-8, but if it is not, the bytes
    /// that are not valid UTF-8 will be interpreted as Latin-1.
    pub fn new(name_utf8_bytes: &'dat [u8], tag: u16) -> Self {
        return Self {
            name_utf8_bytes,
            tag,
        };
    }

    /// If the field tag is 0, writes just the field name.
    /// Otherwise, writes the field name plus a suffix like ";tag=0x1234".
    pub fn write_to<W: fmt::Write + ?Sized>(&self, writer: &mut W) -> fmt::Result {
        let mut dest = filters::WriteFilter::new(writer);
        charconv::write_utf8_with_latin1_fallback_to(self.name_utf8_bytes, &mut dest)?;
        if self.tag != 0 {
            return write!(dest, ";tag=0x{:X}", self.tag);
        }
        return Ok(());
    }
}

impl<'dat> fmt::Display for FieldNameAndTagDisplay<'dat> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> fmt::Result {
        return self.write_to(f);
    }
}

/// Display implementation for the identity of an EventHeader event, i.e.
/// "ProviderName:EventName".
///
/// Instances of this type are returned by the
/// [`crate::EventHeaderEventInfo::identity_display`] method.
#[derive(Clone, Copy, Debug)]
pub struct EventHeaderIdentityDisplay<'nam, 'dat> {
    provider_name: &'nam str,
    event_name_utf8_bytes: &'dat [u8],
}

impl<'nam, 'dat> EventHeaderIdentityDisplay<'nam, 'dat> {
    /// Creates a new formatter for the specified provider name and event name.
    ///
    /// The `event_name_utf8_bytes` value is expected to be UTF-8, but if it is not,
    /// the bytes that are not valid UTF-8 will be interpreted as Latin-1.
    pub fn new(provider_name: &'nam str, event_name_utf8_bytes: &'dat [u8]) -> Self {
        return Self {
            provider_name,
            event_name_utf8_bytes,
        };
    }

    /// Writes the event identity, i.e. "ProviderName:EventName"
    pub fn write_to<W: fmt::Write + ?Sized>(&self, writer: &mut W) -> fmt::Result {
        let mut dest = filters::WriteFilter::new(writer);
        dest.write_str(self.provider_name)?;
        dest.write_ascii(b':')?;
        return charconv::write_utf8_with_latin1_fallback_to(self.event_name_utf8_bytes, &mut dest);
    }
}

impl<'nam, 'dat> fmt::Display for EventHeaderIdentityDisplay<'nam, 'dat> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> fmt::Result {
        return self.write_to(f);
    }
}

/// Display implementation for the JSON-escaped identity of an EventHeader event,
/// i.e. "ProviderName:EventName".
///
/// Instances of this type are returned by the
/// [`crate::EventHeaderEventInfo::json_identity_display`] method.
#[derive(Clone, Copy, Debug)]
pub struct EventHeaderJsonIdentityDisplay<'nam, 'dat> {
    provider_name: &'nam str,
    event_name_utf8_bytes: &'dat [u8],
}

impl<'nam, 'dat> EventHeaderJsonIdentityDisplay<'nam, 'dat> {
    /// Creates a new formatter for the specified provider name and event name.
    ///
    /// The `event_name_utf8_bytes` value is expected to be UTF-8, but if it is not,
    /// the bytes that are not valid UTF-8 will be interpreted as Latin-1.
    pub fn new(provider_name: &'nam str, event_name_utf8_bytes: &'dat [u8]) -> Self {
        return Self {
            provider_name,
            event_name_utf8_bytes,
        };
    }

    /// Writes the event identity, i.e. "ProviderName:EventName"
    pub fn write_to<W: fmt::Write + ?Sized>(&self, writer: &mut W) -> fmt::Result {
        let mut dest_raw = filters::WriteFilter::new(writer);
        let mut dest = filters::JsonEscapeFilter::new(&mut dest_raw);
        dest.write_str(self.provider_name)?;
        dest.write_ascii(b':')?;
        return charconv::write_utf8_with_latin1_fallback_to(self.event_name_utf8_bytes, &mut dest);
    }
}

impl<'nam, 'dat> fmt::Display for EventHeaderJsonIdentityDisplay<'nam, 'dat> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> fmt::Result {
        return self.write_to(f);
    }
}

/// Text formatter for the value of a [`crate::PerfItemValue`].
/// This formats the value using `value.write_to()`.
pub struct PerfItemValueDisplay<'dat> {
    value: &'dat perf_item::PerfItemValue<'dat>,
    convert_options: PerfConvertOptions,
}

impl<'dat> PerfItemValueDisplay<'dat> {
    /// Creates a new formatter for the specified value.
    pub fn new(value: &'dat perf_item::PerfItemValue<'dat>) -> Self {
        return Self {
            value,
            convert_options: PerfConvertOptions::Default,
        };
    }

    /// Configures the conversion options. The default value is [`PerfConvertOptions::Default`].
    pub fn convert_options(&mut self, value: PerfConvertOptions) -> &mut Self {
        self.convert_options = value;
        return self;
    }

    /// Writes the value to the specified writer.
    pub fn write_to<W: fmt::Write + ?Sized>(&self, writer: &mut W) -> fmt::Result {
        self.value.write_to(writer, self.convert_options)
    }
}

impl<'dat> fmt::Display for PerfItemValueDisplay<'dat> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> fmt::Result {
        self.value.write_to(f, self.convert_options)
    }
}

/// JSON formatter for the value of a [`crate::PerfItemValue`].
/// This formats the value using `value.write_json_to()`.
pub struct PerfItemValueJsonDisplay<'dat> {
    value: &'dat perf_item::PerfItemValue<'dat>,
    convert_options: PerfConvertOptions,
}

impl<'dat> PerfItemValueJsonDisplay<'dat> {
    /// Creates a new formatter for the specified value.
    pub fn new(value: &'dat perf_item::PerfItemValue<'dat>) -> Self {
        return Self {
            value,
            convert_options: PerfConvertOptions::Default,
        };
    }

    /// Configures the conversion options. The default value is [`PerfConvertOptions::Default`].
    pub fn convert_options(&mut self, value: PerfConvertOptions) -> &mut Self {
        self.convert_options = value;
        return self;
    }

    /// Writes the value to the specified writer.
    pub fn write_to<W: fmt::Write + ?Sized>(&self, writer: &mut W) -> fmt::Result {
        self.value.write_json_to(writer, self.convert_options)
    }
}

impl<'dat> fmt::Display for PerfItemValueJsonDisplay<'dat> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> fmt::Result {
        self.value.write_json_to(f, self.convert_options)
    }
}
