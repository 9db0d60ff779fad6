use regex::Regex;
use std::sync::LazyLock;

static FINAL_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[^.]+$").expect("extension pattern is valid"));

pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Object title for a copied file: the file name minus its final extension.
pub fn title_from_file_name(file_name: &str) -> String {
    FINAL_EXTENSION.replace(file_name, "").into_owned()
}

pub fn extension(file_name: &str) -> Option<String> {
    FINAL_EXTENSION
        .find(file_name)
        .map(|m| m.as_str()[1..].to_ascii_lowercase())
}

/// Mime type guessed from the file extension, `None` when unknown.
pub fn mime_from_file_name(file_name: &str) -> Option<&'static str> {
    let mime = match extension(file_name)?.as_str() {
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "heic" => "image/heic",
        "avif" => "image/avif",
        "mp3" | "m4a" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "avi" => "video/avi",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/x-gzip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "odt" => "application/vnd.oasis.opendocument.text",
        "txt" | "asc" => "text/plain",
        "csv" => "text/csv",
        "tsv" => "text/tab-separated-values",
        "json" => "application/json",
        "xml" => "application/xml",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "vtt" => "text/vtt",
        _ => return None,
    };
    Some(mime)
}

/// Mime type for the target record: guessed from the name, then the
/// source's declared type, then a generic binary type.
pub fn resolve_mime_type(file_name: &str, declared: &str) -> String {
    if let Some(mime) = mime_from_file_name(file_name) {
        return mime.to_string();
    }
    if !declared.trim().is_empty() {
        return declared.to_string();
    }
    FALLBACK_MIME_TYPE.to_string()
}

pub fn is_image(mime_type: &str) -> bool {
    mime_type.starts_with("image/") && mime_type != "image/svg+xml"
}
