// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::{
    AvroResult, Codec, RecordDecoder,
    decode::read_long,
    error::Details,
    reader::header::{Header, SYNC_SIZE},
    source::ByteSource,
    util::{safe_len, to_len},
};
use log::{debug, trace, warn};
use std::io::{ErrorKind, SeekFrom};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum State {
    /// No records left in the current block, or no block read yet.
    BlockExhausted,
    /// At least one record left in the current block.
    InBlock,
    /// End of stream reached between blocks. Terminal.
    Done,
}

/// Internal Block reader.
#[derive(Debug)]
pub(super) struct Block<R> {
    source: R,
    codec: Codec,
    marker: [u8; SYNC_SIZE],
    state: State,
    /// Number of records left in the current block.
    remaining: usize,
    /// Decompressed payload of the current block. Unused for `Codec::Null`, whose records are
    /// decoded straight from the source.
    buf: Vec<u8>,
    buf_idx: usize,
    blocks_read: usize,
}

impl<R: ByteSource> Block<R> {
    pub(super) fn new(source: R, header: &Header) -> Block<R> {
        Block {
            source,
            codec: header.codec(),
            marker: *header.sync_marker(),
            state: State::BlockExhausted,
            remaining: 0,
            buf: vec![],
            buf_idx: 0,
            blocks_read: 0,
        }
    }

    pub(super) fn blocks_read(&self) -> usize {
        self.blocks_read
    }

    pub(super) fn into_inner(self) -> R {
        self.source
    }

    fn is_eof(&mut self) -> AvroResult<bool> {
        Ok(self.source.is_eof().map_err(Details::CheckEof)?)
    }

    /// Consume the sync marker if the next bytes are one, otherwise put them back.
    ///
    /// Returns whether a marker was consumed.
    fn skip_marker(&mut self) -> AvroResult<bool> {
        let mut marker = [0u8; SYNC_SIZE];
        let mut read = 0;
        while read < SYNC_SIZE {
            match self.source.read(&mut marker[read..]) {
                Ok(0) => break,
                Ok(n) => read += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(Details::ReadBlockMarker(e).into()),
            }
        }

        if read == SYNC_SIZE && marker == self.marker {
            return Ok(true);
        }

        // The first block follows the header's own copy of the marker, so a miss there is normal.
        if self.blocks_read > 0 {
            warn!(
                "Sync marker missing after block {}, reading the next block header in its place",
                self.blocks_read
            );
        } else {
            trace!("No sync marker before the first block");
        }
        self.source
            .seek(SeekFrom::Current(-(read as i64)))
            .map_err(Details::Seek)?;
        Ok(false)
    }

    fn fill_buf(&mut self, n: usize) -> AvroResult<()> {
        // The buffer needs to contain exactly `n` elements, otherwise codecs will potentially read
        // invalid bytes.
        self.buf.resize(safe_len(n)?, 0);
        self.source
            .read_exact(&mut self.buf)
            .map_err(Details::ReadIntoBuf)?;
        self.buf_idx = 0;
        Ok(())
    }

    /// Advance to the next block holding at least one record, or to `State::Done`.
    fn read_block_next(&mut self) -> AvroResult<()> {
        debug_assert_eq!(self.remaining, 0);
        loop {
            if self.is_eof()? || (self.skip_marker()? && self.is_eof()?) {
                debug!("End of stream after {} blocks", self.blocks_read);
                self.state = State::Done;
                return Ok(());
            }

            let record_count = to_len(read_long(&mut self.source)?)?;
            let payload_length = to_len(read_long(&mut self.source)?)?;
            self.blocks_read += 1;
            debug!(
                "Block {}: {record_count} records in {payload_length} bytes",
                self.blocks_read
            );

            if self.codec != Codec::Null {
                self.fill_buf(payload_length)?;
                self.codec.decompress(&mut self.buf)?;
            }

            if record_count > 0 {
                self.remaining = record_count;
                self.state = State::InBlock;
                return Ok(());
            }
        }
    }

    pub(super) fn read_next<D: RecordDecoder>(
        &mut self,
        decoder: &mut D,
        writer_schema: &D::Schema,
        reader_schema: Option<&D::Schema>,
    ) -> AvroResult<Option<D::Value>> {
        if self.state == State::Done {
            return Ok(None);
        }
        if self.state == State::BlockExhausted {
            self.read_block_next()?;
            if self.state == State::Done {
                return Ok(None);
            }
        }

        let item = if self.codec == Codec::Null {
            decoder.read_data(writer_schema, reader_schema, &mut self.source)?
        } else {
            let mut block_bytes = &self.buf[self.buf_idx..];
            let b_original = block_bytes.len();
            let item = decoder.read_data(writer_schema, reader_schema, &mut block_bytes)?;
            self.buf_idx += b_original - block_bytes.len();
            item
        };

        self.remaining -= 1;
        if self.remaining == 0 {
            self.state = State::BlockExhausted;
        }
        Ok(Some(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode::read_string, error::ErrorKind as AvroErrorKind};
    use anyhow::Result as TestResult;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Read};

    const MARKER: [u8; SYNC_SIZE] = [7; SYNC_SIZE];

    /// Records are plain `string`s.
    struct Strings;

    impl RecordDecoder for Strings {
        type Schema = ();
        type Value = String;

        fn parse_schema(&self, _json: &serde_json::Value) -> AvroResult<()> {
            Ok(())
        }

        fn read_data(
            &mut self,
            _writer_schema: &(),
            _reader_schema: Option<&()>,
            cursor: &mut dyn Read,
        ) -> AvroResult<String> {
            read_string(cursor)
        }
    }

    fn block(codec: Codec, bytes: Vec<u8>) -> Block<Cursor<Vec<u8>>> {
        Block {
            source: Cursor::new(bytes),
            codec,
            marker: MARKER,
            state: State::BlockExhausted,
            remaining: 0,
            buf: vec![],
            buf_idx: 0,
            blocks_read: 0,
        }
    }

    fn drain(block: &mut Block<Cursor<Vec<u8>>>) -> AvroResult<Vec<String>> {
        let mut out = Vec::new();
        while let Some(s) = block.read_next(&mut Strings, &(), None)? {
            out.push(s);
        }
        Ok(out)
    }

    #[test]
    fn empty_stream_is_done_immediately() -> TestResult<()> {
        let mut block = block(Codec::Null, vec![]);
        assert_eq!(drain(&mut block)?, Vec::<String>::new());
        assert_eq!(block.state, State::Done);
        assert_eq!(block.blocks_read(), 0);
        Ok(())
    }

    #[test]
    fn null_codec_reads_from_source_and_stops_after_marker() -> TestResult<()> {
        // 2 records, 4 bytes: "a", "b", then the marker
        let mut bytes = vec![4, 8, 2, b'a', 2, b'b'];
        bytes.extend_from_slice(&MARKER);
        let mut block = block(Codec::Null, bytes);

        assert_eq!(drain(&mut block)?, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(block.state, State::Done);
        assert_eq!(block.blocks_read(), 1);
        Ok(())
    }

    #[test]
    fn empty_block_is_skipped() -> TestResult<()> {
        let mut bytes = vec![0, 0];
        bytes.extend_from_slice(&MARKER);
        bytes.extend_from_slice(&[2, 4, 2, b'z']);
        bytes.extend_from_slice(&MARKER);
        let mut block = block(Codec::Null, bytes);

        assert_eq!(drain(&mut block)?, vec!["z".to_string()]);
        assert_eq!(block.blocks_read(), 2);
        Ok(())
    }

    #[test]
    fn missing_marker_between_blocks_is_tolerated() -> TestResult<()> {
        let bytes = vec![2, 4, 2, b'a', 2, 4, 2, b'b'];
        let mut block = block(Codec::Null, bytes);

        assert_eq!(drain(&mut block)?, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(block.blocks_read(), 2);
        Ok(())
    }

    #[test]
    fn short_trailing_bytes_are_put_back() {
        // A complete block followed by three stray bytes that are neither a marker nor a header.
        let mut bytes = vec![2, 4, 2, b'a'];
        bytes.extend_from_slice(&MARKER);
        bytes.extend_from_slice(&[2, 0x80, 0x80]);
        let mut block = block(Codec::Null, bytes);

        assert_eq!(
            block.read_next(&mut Strings, &(), None).ok().flatten(),
            Some("a".to_string())
        );
        let err = block.read_next(&mut Strings, &(), None).unwrap_err();
        assert_eq!(err.kind(), AvroErrorKind::Io);
    }

    #[test]
    fn deflate_block_is_decoded_from_decompressed_bytes() -> TestResult<()> {
        let payload = [2, b'x', 4, b'y', b'y', 6, b'z', b'z', b'z'];
        let compressed = miniz_oxide::deflate::compress_to_vec(&payload, 6);

        let mut bytes = vec![6];
        bytes.push((compressed.len() as u8) << 1);
        bytes.extend_from_slice(&compressed);
        bytes.extend_from_slice(&MARKER);
        let mut block = block(Codec::Deflate, bytes);

        assert_eq!(
            drain(&mut block)?,
            vec!["x".to_string(), "yy".to_string(), "zzz".to_string()]
        );
        Ok(())
    }

    #[test]
    fn negative_record_count_is_rejected() {
        let mut block = block(Codec::Null, vec![1, 0]);
        let err = block.read_next(&mut Strings, &(), None).unwrap_err();
        assert!(matches!(err.details(), Details::ConvertI64ToUsize(_, -1)));
    }

    #[test]
    fn truncated_payload_is_io() {
        let mut block = block(Codec::Deflate, vec![2, 20, 1, 2, 3]);
        let err = block.read_next(&mut Strings, &(), None).unwrap_err();
        assert!(matches!(err.details(), Details::ReadIntoBuf(_)));
    }
}
