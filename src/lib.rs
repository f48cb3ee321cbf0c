pub mod client;
pub mod episode;
pub mod error;
pub mod http;
mod response;
pub mod upload;

// Re-export main types for convenience
pub use client::{CaptivateClient, DEFAULT_API_BASE};
pub use episode::{EpisodeOptions, EpisodeType, NewEpisode};
pub use error::{CaptivateError, ErrorKind, Result};
pub use http::{ApiRequest, FileUpload, FormPart, HttpClient, HttpMethod, HttpResponse, ReqwestClient};
pub use upload::{mime_type_for_file, open_upload};
