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

use crate::Codec;
use std::{error::Error as _, fmt};

/// Errors encountered while reading an object container file.
///
/// To inspect the details of the error use [`details`](Self::details) or [`into_details`](Self::into_details)
/// to get a [`Details`] which contains more precise error information. For a coarse
/// classification use [`kind`](Self::kind).
///
/// See [`Details`] for all possible errors.
#[derive(thiserror::Error, Debug)]
#[repr(transparent)]
#[error(transparent)]
pub struct Error {
    details: Box<Details>,
}

impl Error {
    pub fn new(details: Details) -> Self {
        Self {
            details: Box::new(details),
        }
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    pub fn into_details(self) -> Details {
        *self.details
    }

    /// The category this error falls into.
    pub fn kind(&self) -> ErrorKind {
        self.details.kind()
    }
}

impl From<Details> for Error {
    fn from(details: Details) -> Self {
        Self::new(details)
    }
}

/// Coarse classification of [`Details`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The magic bytes at the start of the stream are missing or wrong.
    NotAContainerFile,
    /// The `avro.codec` metadata names a codec this crate does not know.
    UnknownCodec,
    /// The codec is known but support for it was not compiled in.
    DependencyMissing,
    /// The byte source failed or ended early.
    Io,
    /// The bytes were read but could not be interpreted.
    Decode,
}

#[derive(thiserror::Error)]
pub enum Details {
    #[error("Failed to read header: {0}")]
    ReadHeader(#[source] std::io::Error),

    #[error("wrong magic in header")]
    HeaderMagic,

    #[error("Failed to get JSON from avro.schema key in map")]
    GetAvroSchemaFromMap,

    #[error("Failed to read marker bytes: {0}")]
    ReadMarker(#[source] std::io::Error),

    #[error("Failed to read block marker bytes: {0}")]
    ReadBlockMarker(#[source] std::io::Error),

    #[error("Failed to read bytes into buffer: {0}")]
    ReadIntoBuf(#[source] std::io::Error),

    #[error("Failed to seek in the byte source: {0}")]
    Seek(#[source] std::io::Error),

    #[error("Failed to check the byte source for end of stream: {0}")]
    CheckEof(#[source] std::io::Error),

    #[error("Codec '{0}' is not supported/enabled")]
    CodecNotSupported(String),

    #[error("Codec '{codec}' is not compiled in, enable the '{feature}' feature")]
    CodecUnavailable {
        codec: Codec,
        feature: &'static str,
    },

    #[error("Failed to decompress with flate: {0}")]
    DeflateDecompress(#[source] std::io::Error),

    #[cfg(feature = "snappy")]
    #[error("Failed to get snappy decompression length: {0}")]
    GetSnappyDecompressLen(#[source] snap::Error),

    #[cfg(feature = "snappy")]
    #[error("Failed to decompress with snappy: {0}")]
    SnappyDecompress(#[source] snap::Error),

    #[error("Snappy block of {0} bytes is too short to hold a CRC32 checksum")]
    SnappyTooShort(usize),

    #[error("Failed to decompress with zstd: {0}")]
    ZstdDecompress(#[source] std::io::Error),

    #[error("Failed to read bytes: {0}")]
    ReadBytes(#[source] std::io::Error),

    #[error("Failed to read boolean bytes: {0}")]
    ReadBoolean(#[source] std::io::Error),

    #[error("Invalid u8 for bool: {0}")]
    BoolValue(u8),

    #[error("Failed to read float: {0}")]
    ReadFloat(#[source] std::io::Error),

    #[error("Failed to read double: {0}")]
    ReadDouble(#[source] std::io::Error),

    #[error("Integer overflow")]
    IntegerOverflow,

    #[error("Failed to read bytes for decoding variable length integer: {0}")]
    ReadVariableIntegerBytes(#[source] std::io::Error),

    #[error("Decoded integer out of range for i32: {1}: {0}")]
    ZagI32(#[source] std::num::TryFromIntError, i64),

    #[error("Cannot convert i64 to usize: {1}")]
    ConvertI64ToUsize(#[source] std::num::TryFromIntError, i64),

    #[error("Invalid utf-8 string")]
    ConvertToUtf8(#[source] std::string::FromUtf8Error),

    #[error("Invalid utf-8 string")]
    ConvertToUtf8Error(#[source] std::str::Utf8Error),

    #[error("Unable to allocate {desired} bytes (maximum allowed: {maximum})")]
    MemoryAllocation { desired: usize, maximum: usize },

    #[error("Failed to parse writer schema: {0}")]
    ParseWriterSchema(String),

    #[error("Failed to decode record: {0}")]
    DecodeRecord(String),
}

impl Details {
    /// The category this error falls into.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Details::HeaderMagic => ErrorKind::NotAContainerFile,
            Details::CodecNotSupported(_) => ErrorKind::UnknownCodec,
            Details::CodecUnavailable { .. } => ErrorKind::DependencyMissing,
            Details::ReadHeader(_)
            | Details::ReadMarker(_)
            | Details::ReadBlockMarker(_)
            | Details::ReadIntoBuf(_)
            | Details::Seek(_)
            | Details::CheckEof(_)
            | Details::ReadBytes(_)
            | Details::ReadBoolean(_)
            | Details::ReadFloat(_)
            | Details::ReadDouble(_)
            | Details::ReadVariableIntegerBytes(_) => ErrorKind::Io,
            _ => ErrorKind::Decode,
        }
    }
}

impl fmt::Debug for Details {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut msg = self.to_string();
        if let Some(e) = self.source() {
            msg.extend([": ", &e.to_string()]);
        }
        write!(f, "{msg}")
    }
}
