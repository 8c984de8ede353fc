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
    AvroResult, Codec,
    decode::{read_bytes, read_map},
    error::Details,
};
use log::{debug, warn};
use serde_json::from_slice;
use std::{
    collections::HashMap,
    io::{Read, Seek, SeekFrom},
};

/// The four bytes every object container file starts with.
pub const MAGIC: [u8; 4] = [b'O', b'b', b'j', 1u8];

/// Length of the per-file synchronization marker.
pub const SYNC_SIZE: usize = 16;

pub(crate) const SCHEMA_KEY: &str = "avro.schema";
pub(crate) const CODEC_KEY: &str = "avro.codec";
const RESERVED_PREFIX: &str = "avro.";

/// The header of an object container file.
///
/// Read once when a [`Reader`](crate::Reader) is created and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    metadata: HashMap<String, Vec<u8>>,
    schema: serde_json::Value,
    codec: Codec,
    sync_marker: [u8; SYNC_SIZE],
}

impl Header {
    /// Read the header from the start of `source`.
    ///
    /// On success the source is positioned right after the sync marker. On failure the source is
    /// left wherever reading stopped.
    pub fn read<R: Read + Seek + ?Sized>(source: &mut R) -> AvroResult<Header> {
        source.seek(SeekFrom::Start(0)).map_err(Details::Seek)?;

        let mut magic = [0u8; 4];
        match source.read_exact(&mut magic) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(Details::HeaderMagic.into());
            }
            Err(e) => return Err(Details::ReadHeader(e).into()),
        }
        if magic != MAGIC {
            return Err(Details::HeaderMagic.into());
        }

        let metadata = read_map(source, read_bytes)?;
        let schema = read_writer_schema(&metadata)?;
        let codec = read_codec(&metadata)?;

        for key in metadata.keys() {
            if key != SCHEMA_KEY && key != CODEC_KEY && key.starts_with(RESERVED_PREFIX) {
                warn!("Ignoring unknown metadata key: {key}");
            }
        }

        let mut sync_marker = [0u8; SYNC_SIZE];
        source
            .read_exact(&mut sync_marker)
            .map_err(Details::ReadMarker)?;

        debug!(
            "Read container header: codec {codec}, {} metadata entries",
            metadata.len()
        );

        Ok(Header {
            metadata,
            schema,
            codec,
            sync_marker,
        })
    }

    /// The writer schema, as the JSON stored under `avro.schema`.
    pub fn schema(&self) -> &serde_json::Value {
        &self.schema
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn sync_marker(&self) -> &[u8; SYNC_SIZE] {
        &self.sync_marker
    }

    /// All metadata entries, including the reserved `avro.*` ones.
    pub fn metadata(&self) -> &HashMap<String, Vec<u8>> {
        &self.metadata
    }

    /// Metadata entries outside the reserved `avro.` namespace.
    pub fn user_metadata(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.metadata
            .iter()
            .filter(|(key, _)| !key.starts_with(RESERVED_PREFIX))
            .map(|(key, value)| (key.as_str(), value.as_slice()))
    }
}

fn read_writer_schema(metadata: &HashMap<String, Vec<u8>>) -> AvroResult<serde_json::Value> {
    metadata
        .get(SCHEMA_KEY)
        .and_then(|bytes| from_slice(bytes).ok())
        .ok_or_else(|| Details::GetAvroSchemaFromMap.into())
}

fn read_codec(metadata: &HashMap<String, Vec<u8>>) -> AvroResult<Codec> {
    let name = metadata
        .get(CODEC_KEY)
        .map(|bytes| std::str::from_utf8(bytes).map_err(Details::ConvertToUtf8Error))
        .transpose()?;
    Codec::resolve(name)
}
