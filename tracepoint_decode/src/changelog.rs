// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Release history

#[allow(unused_imports)]
use crate::*; // For docs

/// # v0.4.0 (TBD)
/// - Initial release of the `tracepoint_decode` crate: decoding support for
///   `perf.data`-style event formats (tracefs `format:` files) and for
///   EventHeader-encoded tracepoint payloads, split out of the combined
///   `tracepoint_perf`/`eventheader_decode` crates.
/// - Dropped session- and perf.data-collection-specific types
///   (`PerfSessionInfo`, `PerfTimeSpec`, `PerfEventDesc`) from this crate;
///   decoding a single event's bytes no longer requires a collection session.
pub mod v0_4_0 {}
