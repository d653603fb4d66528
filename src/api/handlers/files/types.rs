use utoipa::ToSchema;

/// Multipart form field that carries the uploaded file.
pub const UPLOAD_FIELD: &str = "image";

pub const UPLOAD_OK: &str = "File uploaded successfully!";
pub const UPLOAD_FAILED: &str = "Upload failed!";
pub const NO_FILE: &str = "No file uploaded";
pub const DOWNLOAD_FAILED: &str = "Could not generate download link!";

/// `multipart/form-data` body accepted by `POST /upload`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// File contents. Its file name becomes the object key.
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}
