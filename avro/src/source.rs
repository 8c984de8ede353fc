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

//! The seekable byte stream a container file is read from.

use std::io::{self, BufRead, Read, Seek};

/// A readable, seekable stream that can tell whether it is exhausted.
///
/// Any [`BufRead`] + [`Seek`] type is a `ByteSource`, so a [`std::io::Cursor`] over an
/// in-memory buffer or a [`std::io::BufReader`] over a [`std::fs::File`] can be handed to a
/// [`Reader`](crate::Reader) directly. Closing the source is done by dropping it, or by taking it
/// back with [`Reader::into_inner`](crate::Reader::into_inner).
///
/// Reads and seeks block until the underlying stream satisfies them; timeouts, if any, are the
/// responsibility of the implementation.
pub trait ByteSource: Read + Seek {
    /// Returns `true` when no more bytes can be read from the current position.
    fn is_eof(&mut self) -> io::Result<bool>;
}

impl<T: BufRead + Seek> ByteSource for T {
    fn is_eof(&mut self) -> io::Result<bool> {
        Ok(self.fill_buf()?.is_empty())
    }
}
