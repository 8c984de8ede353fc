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

//! Decompression for all codecs a container file may declare.

use crate::{AvroResult, error::Details};
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// The compression codec used to compress blocks.
///
/// The set is closed: every name a file may carry in its `avro.codec` metadata maps to one
/// variant, regardless of which codec features were compiled in. A variant whose support is
/// missing fails with [`Details::CodecUnavailable`] the first time a block needs it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab_case")]
pub enum Codec {
    /// The `Null` codec simply passes through data uncompressed.
    Null,
    /// The `Deflate` codec writes the data block using the deflate algorithm
    /// as specified in RFC 1951, and typically implemented using the zlib library.
    /// Note that this format (unlike the "zlib format" in RFC 1950) does not have a checksum.
    Deflate,
    /// The `Snappy` codec uses Google's [Snappy](http://google.github.io/snappy/)
    /// compression library. Each compressed block is followed by the 4-byte, big-endian
    /// CRC32 checksum of the uncompressed data in the block.
    Snappy,
    /// The `Zstandard` codec uses Facebook's [Zstandard](https://facebook.github.io/zstd/)
    Zstandard,
}

impl Codec {
    /// Resolve the codec named in a file header. A missing name means [`Codec::Null`].
    pub fn resolve(name: Option<&str>) -> AvroResult<Codec> {
        let Some(name) = name else {
            return Ok(Codec::Null);
        };
        Codec::from_str(name).map_err(|_| Details::CodecNotSupported(name.to_owned()).into())
    }

    /// Whether support for this codec was compiled in.
    pub fn is_available(self) -> bool {
        match self {
            Codec::Null | Codec::Deflate => true,
            Codec::Snappy => cfg!(feature = "snappy"),
            Codec::Zstandard => cfg!(feature = "zstandard"),
        }
    }

    /// Decompress a stream of bytes in-place.
    pub fn decompress(self, stream: &mut Vec<u8>) -> AvroResult<()> {
        *stream = match self {
            Codec::Null => return Ok(()),
            Codec::Deflate => inflate(stream)?,
            Codec::Snappy => snappy::decompress(stream)?,
            Codec::Zstandard => zstandard::decompress(stream)?,
        };
        Ok(())
    }
}

fn inflate(stream: &[u8]) -> AvroResult<Vec<u8>> {
    miniz_oxide::inflate::decompress_to_vec(stream).map_err(|e| {
        let err = {
            use miniz_oxide::inflate::TINFLStatus::*;
            use std::io::{Error, ErrorKind};
            match e.status {
                FailedCannotMakeProgress => Error::from(ErrorKind::UnexpectedEof),
                // not possible for _to_vec()
                BadParam => Error::other("miniz_oxide reported an invalid output buffer size"),
                Adler32Mismatch => Error::from(ErrorKind::InvalidData),
                Failed => Error::from(ErrorKind::InvalidData),
                Done => Error::other("miniz_oxide reported an error with a success status"),
                NeedsMoreInput => Error::from(ErrorKind::UnexpectedEof),
                // not possible for _to_vec()
                HasMoreOutput => Error::other("output exceeds the miniz_oxide buffer"),
            }
        };
        Details::DeflateDecompress(err).into()
    })
}

#[cfg(feature = "snappy")]
mod snappy {
    use crate::{AvroResult, error::Details};
    use log::warn;

    fn decompress_raw(compressed: &[u8]) -> AvroResult<Vec<u8>> {
        let decompressed_size =
            snap::raw::decompress_len(compressed).map_err(Details::GetSnappyDecompressLen)?;
        let mut decoded = vec![0; crate::util::safe_len(decompressed_size)?];
        snap::raw::Decoder::new()
            .decompress(compressed, &mut decoded[..])
            .map_err(Details::SnappyDecompress)?;
        Ok(decoded)
    }

    /// The trailing four bytes are the big-endian CRC32 of the decompressed payload.
    ///
    /// When the checksum does not match, the decompressed bytes are decompressed once more and
    /// that result (or its error) is returned instead of a checksum error.
    pub(super) fn decompress(stream: &[u8]) -> AvroResult<Vec<u8>> {
        let Some(split) = stream.len().checked_sub(4) else {
            return Err(Details::SnappyTooShort(stream.len()).into());
        };
        let (compressed, checksum) = stream.split_at(split);
        let decoded = decompress_raw(compressed)?;

        let mut last_four: [u8; 4] = [0; 4];
        last_four.copy_from_slice(checksum);
        let expected: u32 = u32::from_be_bytes(last_four);

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&decoded);
        let actual = hasher.finalize();

        if expected == actual {
            Ok(decoded)
        } else {
            warn!(
                "Bad Snappy CRC32; expected {expected:x} but got {actual:x}, decompressing the block again"
            );
            decompress_raw(&decoded)
        }
    }
}

#[cfg(not(feature = "snappy"))]
mod snappy {
    use crate::{AvroResult, Codec, error::Details};

    pub(super) fn decompress(_stream: &[u8]) -> AvroResult<Vec<u8>> {
        Err(Details::CodecUnavailable {
            codec: Codec::Snappy,
            feature: "snappy",
        }
        .into())
    }
}

#[cfg(feature = "zstandard")]
mod zstandard {
    use crate::{AvroResult, error::Details};
    use std::io::BufReader;
    use zstd::zstd_safe;

    pub(super) fn decompress(stream: &[u8]) -> AvroResult<Vec<u8>> {
        let mut decoded = Vec::new();
        let buffer_size = zstd_safe::DCtx::in_size();
        let buffer = BufReader::with_capacity(buffer_size, stream);
        let mut decoder = zstd::Decoder::with_buffer(buffer).map_err(Details::ZstdDecompress)?;
        std::io::copy(&mut decoder, &mut decoded).map_err(Details::ZstdDecompress)?;
        Ok(decoded)
    }
}

#[cfg(not(feature = "zstandard"))]
mod zstandard {
    use crate::{AvroResult, Codec, error::Details};

    pub(super) fn decompress(_stream: &[u8]) -> AvroResult<Vec<u8>> {
        Err(Details::CodecUnavailable {
            codec: Codec::Zstandard,
            feature: "zstandard",
        }
        .into())
    }
}
