// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::error::CaptivateError;
use crate::http::{FileUpload, UploadStream};

/// Fallback part name when a path has no usable final component
const DEFAULT_FILE_NAME: &str = "upload";

/// Open a local file as a streaming multipart upload
///
/// The file is opened eagerly so a missing or unreadable path fails before
/// any request is sent. Its contents are read lazily while the body streams.
pub async fn open_upload(path: &Path) -> Result<FileUpload, CaptivateError> {
    let file = File::open(path)
        .await
        .map_err(|e| CaptivateError::FileReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    let length = file
        .metadata()
        .await
        .map_err(|e| CaptivateError::FileReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?
        .len();

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_FILE_NAME)
        .to_string();

    let body: UploadStream = Box::pin(ReaderStream::new(file));

    Ok(FileUpload {
        file_name,
        mime_type: mime_type_for_file(path),
        length,
        body,
    })
}

/// Guess the MIME type of an upload from its extension
pub fn mime_type_for_file(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match ext.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("m4a") | Some("mp4") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("ogg") => "audio/ogg",
        Some("opus") => "audio/opus",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
