// Image storage for extracted documents.
// - `file_image_sink.rs` downloads images over HTTP and keeps them on disk.

#[path = "file_image_sink.rs"]
pub mod file_image_sink;

pub use file_image_sink::FileImageSink;
