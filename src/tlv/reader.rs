use super::Tag;
use crate::error::{Error, Result};
use bytes::Buf;

/// Pull parser over a BER/DER encoded byte slice.
///
/// Tolerates indefinite-length constructed values on read (they are
/// terminated by a `00 00` end-of-contents marker); this codec never emits
/// them (see [`super::TlvWriter`]).
pub struct TlvReader<'a> {
    buf: &'a [u8],
}

impl<'a> TlvReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub fn has_remaining(&self) -> bool {
        self.buf.has_remaining()
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Read the identifier octets of the next tag without consuming them.
    pub fn peek_tag(&self) -> Result<Tag> {
        let mut copy = Self::new(self.buf);
        copy.read_tag()
    }

    /// Read one tag's identifier octets.
    pub fn read_tag(&mut self) -> Result<Tag> {
        if !self.buf.has_remaining() {
            return Err(Error::MalformedTlv {
                reason: "EOF reading tag",
            });
        }
        let first = self.buf.get_u8();
        let mut value = first as u32;
        if first & 0x1F == 0x1F {
            // High tag number form: subsequent octets each contribute 7 bits,
            // terminated by one without the continuation bit set.
            loop {
                if !self.buf.has_remaining() {
                    return Err(Error::MalformedTlv {
                        reason: "EOF reading multi-byte tag",
                    });
                }
                let next = self.buf.get_u8();
                value = (value << 8) | next as u32;
                if next & 0x80 == 0 {
                    break;
                }
            }
        }
        Ok(Tag(value))
    }

    /// Read a BER length. Returns `None` for the indefinite-length form
    /// (`0x80` with no trailing length octets).
    pub fn read_length(&mut self) -> Result<Option<usize>> {
        if !self.buf.has_remaining() {
            return Err(Error::MalformedTlv {
                reason: "EOF reading length",
            });
        }
        let first = self.buf.get_u8();
        if first & 0x80 == 0 {
            return Ok(Some(first as usize));
        }
        let n = (first & 0x7F) as usize;
        if n == 0 {
            return Ok(None);
        }
        if n > std::mem::size_of::<usize>() {
            return Err(Error::MalformedTlv {
                reason: "length too large",
            });
        }
        if self.buf.remaining() < n {
            return Err(Error::MalformedTlv {
                reason: "EOF reading long-form length",
            });
        }
        let mut value: usize = 0;
        for _ in 0..n {
            value = (value << 8) | self.buf.get_u8() as usize;
        }
        Ok(Some(value))
    }

    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.buf.remaining() < len {
            return Err(Error::MalformedTlv {
                reason: "EOF reading value",
            });
        }
        let slice = &self.buf[..len];
        self.buf.advance(len);
        Ok(slice)
    }

    /// Read the contents of an indefinite-length constructed value up to
    /// (but not including) its `00 00` end-of-contents marker.
    pub fn read_indefinite(&mut self) -> Result<&'a [u8]> {
        let start = self.buf;
        let mut depth = 0usize;
        loop {
            if self.buf.remaining() < 2 {
                return Err(Error::MalformedTlv {
                    reason: "EOF inside indefinite-length value",
                });
            }
            if self.buf[0] == 0x00 && self.buf[1] == 0x00 && depth == 0 {
                let consumed = start.len() - self.buf.len();
                let body = &start[..consumed];
                self.buf.advance(2);
                return Ok(body);
            }
            let tag = self.read_tag()?;
            let len = self.read_length()?;
            match len {
                Some(len) => {
                    self.read_slice(len)?;
                }
                None => {
                    if !tag.constructed() {
                        return Err(Error::MalformedTlv {
                            reason: "indefinite length on primitive tag",
                        });
                    }
                    depth += 1;
                }
            }
        }
    }

    /// Skip tags (and their values) until one matching `tag` is found,
    /// returning its length header already consumed (caller reads the
    /// value next). Returns `Ok(false)` if the buffer is exhausted first.
    pub fn skip_to_tag(&mut self, tag: Tag) -> Result<bool> {
        while self.has_remaining() {
            let found = self.peek_tag()?;
            if found == tag {
                return Ok(true);
            }
            self.read_tag()?;
            match self.read_length()? {
                Some(len) => {
                    self.read_slice(len)?;
                }
                None => {
                    self.read_indefinite()?;
                }
            }
        }
        Ok(false)
    }
}
