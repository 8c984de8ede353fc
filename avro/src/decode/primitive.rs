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
    AvroResult,
    error::Details,
    util::{safe_len, to_len, zag_i32, zag_i64},
};
use std::{collections::HashMap, io::Read};

pub fn read_long<R: Read + ?Sized>(reader: &mut R) -> AvroResult<i64> {
    zag_i64(reader)
}

pub fn read_int<R: Read + ?Sized>(reader: &mut R) -> AvroResult<i32> {
    zag_i32(reader)
}

pub fn read_boolean<R: Read + ?Sized>(reader: &mut R) -> AvroResult<bool> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf).map_err(Details::ReadBoolean)?;
    match buf[0] {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(Details::BoolValue(other).into()),
    }
}

pub fn read_float<R: Read + ?Sized>(reader: &mut R) -> AvroResult<f32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).map_err(Details::ReadFloat)?;
    Ok(f32::from_le_bytes(buf))
}

pub fn read_double<R: Read + ?Sized>(reader: &mut R) -> AvroResult<f64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf).map_err(Details::ReadDouble)?;
    Ok(f64::from_le_bytes(buf))
}

/// A `long` length followed by that many bytes.
pub fn read_bytes<R: Read + ?Sized>(reader: &mut R) -> AvroResult<Vec<u8>> {
    let len = safe_len(to_len(zag_i64(reader)?)?)?;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).map_err(Details::ReadBytes)?;
    Ok(buf)
}

pub fn read_string<R: Read + ?Sized>(reader: &mut R) -> AvroResult<String> {
    String::from_utf8(read_bytes(reader)?).map_err(|e| Details::ConvertToUtf8(e).into())
}

/// A block-encoded map with string keys.
///
/// Each block starts with an item count; a count of zero ends the map. A negative count means
/// the absolute value is the count and is followed by the block size in bytes, which is read and
/// ignored here.
pub fn read_map<R, V, F>(reader: &mut R, mut read_value: F) -> AvroResult<HashMap<String, V>>
where
    R: Read + ?Sized,
    F: FnMut(&mut R) -> AvroResult<V>,
{
    let mut collected = HashMap::new();
    loop {
        let block = zag_i64(reader)?;
        if block == 0 {
            break;
        }
        if block < 0 {
            let _block_bytes = to_len(zag_i64(reader)?)?;
        }
        let n = to_len(block.checked_abs().ok_or(Details::IntegerOverflow)?)?;
        for _ in 0..n {
            let key = read_string(reader)?;
            let value = read_value(&mut *reader)?;
            collected.insert(key, value);
        }
    }
    Ok(collected)
}
