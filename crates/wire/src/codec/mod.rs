//! Codecs that turn raw bytes into message heads and back.
//!
//! The decoders are layered and each implements
//! [`tokio_util::codec::Decoder`] over a [`bytes::BytesMut`]:
//!
//! - [`LineDecoder`] splits one `\n` or `\r\n` terminated line
//! - [`HeaderDecoder`] collects `Name: Value` lines up to the blank line
//! - [`HeadDecoder`] frames a whole head and derives the body length
//!
//! [`HeadEncoder`] writes a head back out with canonical `\r\n` terminators.
//! Bodies are not handled here; they are read lazily through
//! [`crate::protocol::Body`] so that framing never over-reads the stream.

mod head_decoder;
mod head_encoder;
mod header_decoder;
mod line_decoder;

pub use head_decoder::HeadDecoder;
pub use head_encoder::HeadEncoder;
pub use header_decoder::{HeaderBlock, HeaderDecoder};
pub use line_decoder::{Line, LineDecoder};
