#![no_std]
#![warn(missing_docs)]
//! Types shared by decoders and encoders of EventHeader-encoded Linux Tracepoints.

pub use descriptors::EventHeader;
pub use descriptors::EventHeaderExtension;
pub use enums::ExtensionKind;
pub use enums::FieldEncoding;
pub use enums::FieldFormat;
pub use enums::HeaderFlags;
pub use enums::Level;
pub use enums::Opcode;
pub use guid::Guid;

pub mod changelog;
mod descriptors;
mod enums;
mod guid;
