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

//! Logic handling reading object container files at user level.

mod block;
pub mod header;

use crate::{AvroResult, Codec, RecordDecoder, source::ByteSource};
use block::Block;
use bon::bon;
use header::{Header, SYNC_SIZE};
use std::collections::HashMap;

/// Main interface for reading object container files.
///
/// The header is read and validated when the `Reader` is created; records are then decoded
/// lazily, one block at a time, by the [`RecordDecoder`] the reader was created with.
///
/// To be used as an iterator:
///
/// ```no_run
/// # use avro_container::{AvroResult, Reader, RecordDecoder, decode::read_long};
/// # use std::io::{Cursor, Read};
/// # struct Longs;
/// # impl RecordDecoder for Longs {
/// #     type Schema = ();
/// #     type Value = i64;
/// #     fn parse_schema(&self, _: &serde_json::Value) -> AvroResult<()> { Ok(()) }
/// #     fn read_data(&mut self, _: &(), _: Option<&()>, c: &mut dyn Read) -> AvroResult<i64> {
/// #         read_long(c)
/// #     }
/// # }
/// # let input = Cursor::new(Vec::<u8>::new());
/// for value in Reader::new(input, Longs).unwrap() {
///     match value {
///         Ok(v) => println!("{:?}", v),
///         Err(e) => println!("Error: {}", e),
///     };
/// }
/// ```
///
/// A `Reader` is not meant to be shared: all iteration state lives in the instance. Open one
/// reader per source to read several files concurrently.
pub struct Reader<'a, R, D: RecordDecoder> {
    block: Block<R>,
    header: Header,
    decoder: D,
    writer_schema: D::Schema,
    reader_schema: Option<&'a D::Schema>,
    errored: bool,
}

#[bon]
impl<'a, R: ByteSource, D: RecordDecoder> Reader<'a, R, D> {
    /// Creates a `Reader` given a byte source to read from and a decoder for its records.
    /// No reader schema will be set.
    ///
    /// **NOTE** The header is going to be read automatically upon creation of the `Reader`.
    pub fn new(source: R, decoder: D) -> AvroResult<Reader<'a, R, D>> {
        Reader::builder(source, decoder).build()
    }

    /// Creates a `Reader` given a byte source to read from and a decoder for its records,
    /// with an optional reader schema handed to the decoder for every record.
    ///
    /// **NOTE** The header is going to be read automatically upon creation of the `Reader`.
    #[builder(finish_fn = build)]
    pub fn builder(
        #[builder(start_fn)] source: R,
        #[builder(start_fn)] decoder: D,
        reader_schema: Option<&'a D::Schema>,
    ) -> AvroResult<Reader<'a, R, D>> {
        let mut source = source;
        let header = Header::read(&mut source)?;
        let writer_schema = decoder.parse_schema(header.schema())?;
        let block = Block::new(source, &header);

        Ok(Reader {
            block,
            header,
            decoder,
            writer_schema,
            reader_schema,
            errored: false,
        })
    }

    /// Get a reference to the file header.
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Get a reference to the writer schema, as parsed by the decoder.
    #[inline]
    pub fn writer_schema(&self) -> &D::Schema {
        &self.writer_schema
    }

    /// Get a reference to the optional reader schema.
    #[inline]
    pub fn reader_schema(&self) -> Option<&D::Schema> {
        self.reader_schema
    }

    #[inline]
    pub fn codec(&self) -> Codec {
        self.header.codec()
    }

    #[inline]
    pub fn sync_marker(&self) -> &[u8; SYNC_SIZE] {
        self.header.sync_marker()
    }

    /// Get the metadata entries outside the reserved `avro.` namespace.
    pub fn user_metadata(&self) -> HashMap<&str, &[u8]> {
        self.header.user_metadata().collect()
    }

    /// Get the raw value of any metadata entry, reserved ones included.
    pub fn metadata(&self, key: &str) -> Option<&[u8]> {
        self.header.metadata().get(key).map(Vec::as_slice)
    }

    /// Number of block headers read so far.
    #[inline]
    pub fn blocks_read(&self) -> usize {
        self.block.blocks_read()
    }

    /// Read every remaining record.
    ///
    /// Stops at the first error, after which the reader yields nothing more.
    pub fn data(&mut self) -> AvroResult<Vec<D::Value>> {
        self.by_ref().collect()
    }

    /// Give back the byte source, positioned wherever reading stopped.
    pub fn into_inner(self) -> R {
        self.block.into_inner()
    }

    /// Release the byte source.
    pub fn close(self) {
        drop(self.into_inner());
    }

    #[inline]
    fn read_next(&mut self) -> AvroResult<Option<D::Value>> {
        self.block
            .read_next(&mut self.decoder, &self.writer_schema, self.reader_schema)
    }
}

impl<R: ByteSource, D: RecordDecoder> Iterator for Reader<'_, R, D> {
    type Item = AvroResult<D::Value>;

    fn next(&mut self) -> Option<Self::Item> {
        // to prevent keep on reading after the first error occurs
        if self.errored {
            return None;
        };
        match self.read_next() {
            Ok(opt) => opt.map(Ok),
            Err(e) => {
                self.errored = true;
                Some(Err(e))
            }
        }
    }
}

/// The sync marker of a complete container file, which is also its last 16 bytes.
///
/// Returns `None` when `bytes` is too short to hold a header and a marker.
pub fn read_marker(bytes: &[u8]) -> Option<[u8; SYNC_SIZE]> {
    if bytes.len() <= SYNC_SIZE {
        return None;
    }
    let mut marker = [0_u8; SYNC_SIZE];
    marker.clone_from_slice(&bytes[(bytes.len() - SYNC_SIZE)..]);
    Some(marker)
}
