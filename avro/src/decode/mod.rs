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

//! Decoding of individual records and of the binary primitives they are built from.

mod primitive;

use crate::AvroResult;
use std::io::Read;

pub use primitive::{
    read_boolean, read_bytes, read_double, read_float, read_int, read_long, read_map, read_string,
};

/// Decodes one record at a time from a positioned cursor.
///
/// The [`Reader`](crate::Reader) owns a `RecordDecoder` and knows nothing about schemas: it hands
/// the writer schema JSON from the file header to [`parse_schema`](Self::parse_schema) once, and
/// then calls [`read_data`](Self::read_data) for every record, with the cursor positioned at the
/// start of that record. The cursor is either the byte source itself (`null` codec) or the
/// decompressed bytes of the current block.
///
/// ```
/// # use avro_container::{AvroResult, RecordDecoder, decode::read_long};
/// # use std::io::Read;
/// /// Files whose schema is `"long"`.
/// struct Longs;
///
/// impl RecordDecoder for Longs {
///     type Schema = ();
///     type Value = i64;
///
///     fn parse_schema(&self, _json: &serde_json::Value) -> AvroResult<()> {
///         Ok(())
///     }
///
///     fn read_data(
///         &mut self,
///         _writer_schema: &(),
///         _reader_schema: Option<&()>,
///         cursor: &mut dyn Read,
///     ) -> AvroResult<i64> {
///         read_long(cursor)
///     }
/// }
/// ```
pub trait RecordDecoder {
    /// Parsed representation of a schema.
    type Schema;
    /// A decoded record.
    type Value;

    /// Parse the writer schema stored under `avro.schema` in the file header.
    fn parse_schema(&self, json: &serde_json::Value) -> AvroResult<Self::Schema>;

    /// Decode one record written with `writer_schema`, resolving it against `reader_schema` if
    /// one is given. Must consume exactly the bytes of that record from `cursor`.
    fn read_data(
        &mut self,
        writer_schema: &Self::Schema,
        reader_schema: Option<&Self::Schema>,
        cursor: &mut dyn Read,
    ) -> AvroResult<Self::Value>;

    /// Decode one record without schema resolution.
    fn read(
        &mut self,
        writer_schema: &Self::Schema,
        cursor: &mut dyn Read,
    ) -> AvroResult<Self::Value> {
        self.read_data(writer_schema, None, cursor)
    }
}

impl<D: RecordDecoder + ?Sized> RecordDecoder for &mut D {
    type Schema = D::Schema;
    type Value = D::Value;

    fn parse_schema(&self, json: &serde_json::Value) -> AvroResult<Self::Schema> {
        (**self).parse_schema(json)
    }

    fn read_data(
        &mut self,
        writer_schema: &Self::Schema,
        reader_schema: Option<&Self::Schema>,
        cursor: &mut dyn Read,
    ) -> AvroResult<Self::Value> {
        (**self).read_data(writer_schema, reader_schema, cursor)
    }
}
