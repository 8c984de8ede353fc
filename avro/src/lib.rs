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

//! A reader for **[Apache Avro](https://avro.apache.org/)** object container files.
//!
//! An object container file starts with a header (the magic bytes `Obj\x01`, a metadata map
//! holding the writer schema and the compression codec, and a random 16-byte sync marker)
//! followed by blocks of records. Each block carries its record count, the byte length of its
//! payload, the payload itself (compressed with the file's codec) and a copy of the sync marker.
//!
//! This crate handles the container: it validates the header, walks the blocks, resynchronizes
//! on the sync marker and decompresses payloads. Turning the bytes of one record into a value is
//! left to a [`RecordDecoder`], which the [`Reader`] is generic over. The [`decode`] module has
//! the binary primitives needed to write one.
//!
//! ```no_run
//! # use avro_container::{AvroResult, Reader, RecordDecoder, decode::{read_long, read_string}};
//! # use std::{fs::File, io::{BufReader, Read}};
//! struct Users;
//!
//! impl RecordDecoder for Users {
//!     type Schema = serde_json::Value;
//!     type Value = (i64, String);
//!
//!     fn parse_schema(&self, json: &serde_json::Value) -> AvroResult<serde_json::Value> {
//!         Ok(json.clone())
//!     }
//!
//!     fn read_data(
//!         &mut self,
//!         _writer_schema: &serde_json::Value,
//!         _reader_schema: Option<&serde_json::Value>,
//!         cursor: &mut dyn Read,
//!     ) -> AvroResult<(i64, String)> {
//!         Ok((read_long(cursor)?, read_string(cursor)?))
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = BufReader::new(File::open("users.avro")?);
//! let mut reader = Reader::new(file, Users)?;
//! for (id, name) in reader.data()? {
//!     println!("{id}: {name}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `snappy`: enable support for the Snappy codec
//! - `zstandard`: enable support for the Zstandard codec
//!
//! Files declaring a codec whose feature is disabled can still be opened; reading their first
//! block fails with an error of kind [`ErrorKind::DependencyMissing`](error::ErrorKind).
//!
//! # MSRV
//!
//! The current MSRV is 1.88.0.

mod codec;
mod reader;
mod source;

pub mod decode;
pub mod error;
pub mod util;

pub use codec::Codec;
pub use decode::RecordDecoder;
pub use error::{Error, ErrorKind};
pub use reader::{
    Reader,
    header::{Header, MAGIC, SYNC_SIZE},
    read_marker,
};
pub use source::ByteSource;

/// A convenience type alias for `Result`s with `Error`s.
pub type AvroResult<T> = Result<T, Error>;

/// Set the maximum number of bytes that can be allocated when decoding data.
///
/// This function only changes the setting once. On subsequent calls the value will stay the same
/// as the first time it is called. It is automatically called on first allocation and defaults to
/// [`util::DEFAULT_MAX_ALLOCATION_BYTES`].
///
/// # Returns
/// The configured maximum, which might be different from what the function was called with if the
/// value was already set before.
pub fn max_allocation_bytes(num_bytes: usize) -> usize {
    util::max_allocation_bytes(num_bytes)
}
