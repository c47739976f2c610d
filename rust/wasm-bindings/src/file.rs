// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::utils::describe_js_error;
use futures_util::future::{FutureExt, LocalBoxFuture};
use ifc_view_processing::FileSource;
use js_sys::Uint8Array;
use std::io;
use wasm_bindgen_futures::JsFuture;

/// A browser `File` picked by the user or dropped on the page
pub struct BrowserFile {
    file: web_sys::File,
    name: String,
}

impl BrowserFile {
    pub fn new(file: web_sys::File) -> Self {
        let name = file.name();
        Self { file, name }
    }
}

impl FileSource for BrowserFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.file.size() as u64
    }

    fn read_bytes(&self) -> LocalBoxFuture<'_, io::Result<Vec<u8>>> {
        async move {
            let buffer = JsFuture::from(self.file.array_buffer())
                .await
                .map_err(|e| io::Error::other(describe_js_error(&e)))?;
            Ok(Uint8Array::new(&buffer).to_vec())
        }
        .boxed_local()
    }
}
