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

//! Builds container files in memory and decodes their records.

#![allow(dead_code)]

use avro_container::{
    AvroResult, MAGIC, RecordDecoder,
    decode::{read_long, read_string},
    error::Details,
};
use std::io::Read;

pub const MARKER: [u8; 16] = *b"0123456789abcdef";

pub const RECORD_SCHEMA: &str = r#"{"type":"record","name":"test","fields":[{"name":"a","type":"long"},{"name":"b","type":"string"}]}"#;

pub fn encode_long(n: i64, out: &mut Vec<u8>) {
    let mut z = ((n << 1) ^ (n >> 63)) as u64;
    loop {
        if z <= 0x7F {
            out.push(z as u8);
            break;
        }
        out.push((0x80 | (z & 0x7F)) as u8);
        z >>= 7;
    }
}

pub fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    encode_long(bytes.len() as i64, out);
    out.extend_from_slice(bytes);
}

/// How a block payload gets compressed.
#[derive(Clone, Copy, Debug)]
pub enum Compress {
    Null,
    Deflate,
    /// Snappy with a correct trailing checksum.
    Snappy,
    /// Snappy applied twice, with a checksum of the original bytes.
    SnappyTwice,
    #[cfg(feature = "zstandard")]
    Zstandard,
}

impl Compress {
    pub fn codec_name(self) -> &'static str {
        match self {
            Compress::Null => "null",
            Compress::Deflate => "deflate",
            Compress::Snappy | Compress::SnappyTwice => "snappy",
            #[cfg(feature = "zstandard")]
            Compress::Zstandard => "zstandard",
        }
    }

    pub fn apply(self, payload: &[u8]) -> Vec<u8> {
        match self {
            Compress::Null => payload.to_vec(),
            Compress::Deflate => miniz_oxide::deflate::compress_to_vec(payload, 6),
            Compress::Snappy => {
                let mut out = snap::raw::Encoder::new()
                    .compress_vec(payload)
                    .expect("snappy compression");
                out.extend_from_slice(&crc32fast::hash(payload).to_be_bytes());
                out
            }
            Compress::SnappyTwice => {
                let mut encoder = snap::raw::Encoder::new();
                let once = encoder.compress_vec(payload).expect("snappy compression");
                let mut out = encoder.compress_vec(&once).expect("snappy compression");
                out.extend_from_slice(&crc32fast::hash(payload).to_be_bytes());
                out
            }
            #[cfg(feature = "zstandard")]
            Compress::Zstandard => zstd::encode_all(payload, 0).expect("zstd compression"),
        }
    }
}

/// A container file under construction.
pub struct ContainerFile {
    bytes: Vec<u8>,
    compress: Compress,
}

impl ContainerFile {
    pub fn new(schema: &str, compress: Compress) -> Self {
        Self::with_metadata(schema, Some(compress.codec_name()), &[], compress)
    }

    pub fn with_metadata(
        schema: &str,
        codec: Option<&str>,
        extra: &[(&str, &[u8])],
        compress: Compress,
    ) -> Self {
        let mut bytes = MAGIC.to_vec();
        let mut entries: Vec<(&str, &[u8])> = vec![("avro.schema", schema.as_bytes())];
        if let Some(codec) = codec {
            entries.push(("avro.codec", codec.as_bytes()));
        }
        entries.extend_from_slice(extra);

        encode_long(entries.len() as i64, &mut bytes);
        for (key, value) in entries {
            encode_bytes(key.as_bytes(), &mut bytes);
            encode_bytes(value, &mut bytes);
        }
        encode_long(0, &mut bytes);
        bytes.extend_from_slice(&MARKER);

        Self { bytes, compress }
    }

    /// Append a block holding `records` already encoded, followed by the sync marker.
    pub fn block(self, records: &[Vec<u8>]) -> Self {
        self.block_without_marker(records).marker()
    }

    pub fn block_without_marker(mut self, records: &[Vec<u8>]) -> Self {
        let payload = self.compress.apply(&records.concat());
        encode_long(records.len() as i64, &mut self.bytes);
        encode_long(payload.len() as i64, &mut self.bytes);
        self.bytes.extend_from_slice(&payload);
        self
    }

    pub fn marker(mut self) -> Self {
        self.bytes.extend_from_slice(&MARKER);
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Encode a `{"a": long, "b": string}` record.
pub fn record(a: i64, b: &str) -> Vec<u8> {
    let mut out = Vec::new();
    encode_long(a, &mut out);
    encode_bytes(b.as_bytes(), &mut out);
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct Test {
    pub a: i64,
    pub b: String,
}

impl Test {
    pub fn new(a: i64, b: &str) -> Self {
        Self {
            a,
            b: b.to_string(),
        }
    }
}

/// Decodes `{"a": long, "b": string}` records and counts the calls that came with a reader
/// schema.
///
/// Only record schemas are accepted, and a reader schema must carry the writer schema's name.
#[derive(Default)]
pub struct TestDecoder {
    pub with_reader_schema: usize,
}

impl RecordDecoder for TestDecoder {
    type Schema = serde_json::Value;
    type Value = Test;

    fn parse_schema(&self, json: &serde_json::Value) -> AvroResult<serde_json::Value> {
        if json["type"] != "record" {
            let message = format!("not a record schema: {json}");
            return Err(Details::ParseWriterSchema(message).into());
        }
        Ok(json.clone())
    }

    fn read_data(
        &mut self,
        writer_schema: &serde_json::Value,
        reader_schema: Option<&serde_json::Value>,
        cursor: &mut dyn Read,
    ) -> AvroResult<Test> {
        if let Some(reader_schema) = reader_schema {
            if reader_schema["name"] != writer_schema["name"] {
                let message = format!("cannot read {writer_schema} as {reader_schema}");
                return Err(Details::DecodeRecord(message).into());
            }
            self.with_reader_schema += 1;
        }
        Ok(Test {
            a: read_long(cursor)?,
            b: read_string(cursor)?,
        })
    }
}
