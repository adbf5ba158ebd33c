//! Serializes a [`MessageHead`] into its wire form.
//!
//! Output always uses `\r\n` terminators, whatever the head was parsed from:
//! the status line, every header as `Name: Value` sorted by name, then the
//! blank line.

use std::io;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::MessageHead;

#[derive(Debug, Default, Clone, Copy)]
pub struct HeadEncoder;

impl Encoder<&MessageHead> for HeadEncoder {
    type Error = io::Error;

    fn encode(&mut self, head: &MessageHead, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let headers = head.headers();
        dst.reserve(head.status_line().len() + headers.encoded_len() + 4);

        dst.put_slice(head.status_line().as_bytes());
        dst.put_slice(b"\r\n");
        headers.encode(dst);
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
