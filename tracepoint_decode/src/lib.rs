// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![no_std]
#![warn(missing_docs)]
#![allow(clippy::needless_return)]

//! Decoding support for `perf.data`-style event formats (tracefs `format:`
//! files) and for EventHeader-encoded tracepoint event payloads.

pub use byte_reader::PerfByteReader;
pub use display::EventHeaderIdentityDisplay;
pub use display::EventHeaderJsonIdentityDisplay;
pub use display::FieldNameAndTagDisplay;
pub use display::JsonEscapeDisplay;
pub use display::PerfItemValueDisplay;
pub use display::PerfItemValueJsonDisplay;
pub use display::Utf8WithLatin1FallbackDisplay;
pub use enumerator::EventHeaderEnumerator;
pub use enumerator::EventHeaderEnumeratorContext;
pub use enumerator::EventHeaderEnumeratorError;
pub use enumerator::EventHeaderEnumeratorState;
pub use enumerator::EventHeaderEventInfo;
pub use enumerator::EventHeaderItemInfo;
pub use enumerator::IdentityDisplay;
pub use enumerator::JsonMetaDisplay;
pub use enumerator::NameAndTagDisplay;
pub use enumerator::NameDisplay;
pub use perf_event_format::PerfEventDecodingStyle;
pub use perf_event_format::PerfEventFormat;
pub use perf_field_format::PerfFieldArray;
pub use perf_field_format::PerfFieldFormat;
pub use perf_item::PerfConvertOptions;
pub use perf_item::PerfItemMetadata;
pub use perf_item::PerfItemValue;
pub use perf_item::PerfMetaOptions;
pub use perf_item::PerfTextEncoding;

pub mod _internal;
pub mod changelog;

mod byte_reader;
mod charconv;
mod display;
mod enumerator;
mod filters;
mod perf_event_format;
mod perf_field_format;
mod perf_item;
mod writers;
