// src/classify/mod.rs
// =============================================================================
// Deciding what a fetched resource is, and what it should be called.
//
// Two questions get answered here:
// 1. Is this a page we keep crawling, or a file we collect?
//    Only the declared Content-Type decides this; HTML is traversed,
//    everything else (including a missing Content-Type) is collected.
// 2. What extension should a collected file carry?
//    Magic bytes first, then the declared Content-Type, then nothing.
//
// Submodules:
// - sniff: magic-byte signatures
// =============================================================================

mod sniff;

use url::Url;

use sniff::{is_sniffed_extension, sniff_extension};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// HTML page; its links feed the frontier
    Traversable,
    /// Anything else; ends up in the archive
    Collectible,
}

/// Classifies a response by its declared Content-Type
///
/// The body is accepted so callers don't need to care which signal is used,
/// but markup detection deliberately ignores it: a page served as
/// text/plain is a file, not a page.
pub fn classify(content_type: Option<&str>, _body: &[u8]) -> Classification {
    match content_type.map(media_type) {
        Some(mime) if mime == "text/html" || mime == "application/xhtml+xml" => {
            Classification::Traversable
        }
        _ => Classification::Collectible,
    }
}

/// Works out a file extension (without the dot) for a downloaded payload
///
/// Sniffed signatures win over the declared type, except that a generic
/// container signature (a bare ZIP or OLE file) yields to a declared type
/// that names something more specific, e.g. a .docx served with its
/// proper Office media type.
pub fn resolve_extension(content_type: Option<&str>, body: &[u8]) -> Option<&'static str> {
    let declared = content_type.and_then(extension_from_content_type);

    match sniff_extension(body) {
        Some(sniffed @ ("zip" | "doc")) => match declared {
            Some(specific) if is_container_subtype(specific) => Some(specific),
            _ => Some(sniffed),
        },
        Some(sniffed) => Some(sniffed),
        None => declared,
    }
}

/// Appends `.ext` unless the name already ends with it (case-insensitive)
///
/// Running it twice is a no-op: finalize_name("report.pdf", "pdf") == "report.pdf"
pub fn finalize_name(logical_name: &str, extension: &str) -> String {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        return logical_name.to_string();
    }

    let suffix = format!(".{}", extension.to_ascii_lowercase());
    if logical_name.to_ascii_lowercase().ends_with(&suffix) {
        logical_name.to_string()
    } else {
        format!("{}.{}", logical_name, extension)
    }
}

/// The last path segment of a URL, decoded and made safe as a file name
///
/// Returns None for directory-style URLs (`/files/`) and bare origins,
/// which have nothing to name a file after.
pub fn logical_name(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    if segment.is_empty() {
        return None;
    }

    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());

    let name = sanitize_file_name(&decoded);
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name)
    }
}

/// True when the name already ends in an extension we recognise
///
/// Only extensions from the Content-Type table, the sniffer, or a short list
/// of common spellings count. A dot alone proves nothing: `release-v1.2`
/// and `annual.report` still get an extension appended.
pub fn has_known_extension(name: &str) -> bool {
    let Some((stem, ext)) = name.rsplit_once('.') else {
        return false;
    };
    if stem.is_empty() {
        return false;
    }

    let ext = ext.to_ascii_lowercase();
    CONTENT_TYPES.iter().any(|(_, known)| *known == ext)
        || is_sniffed_extension(&ext)
        || OTHER_EXTENSIONS.contains(&ext.as_str())
}

/// Maps a declared Content-Type onto an extension
pub fn extension_from_content_type(content_type: &str) -> Option<&'static str> {
    let mime = media_type(content_type);
    CONTENT_TYPES
        .iter()
        .find(|(declared, _)| *declared == mime)
        .map(|(_, ext)| *ext)
}

/// (media type, extension)
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("application/pdf", "pdf"),
    ("application/zip", "zip"),
    ("application/x-zip-compressed", "zip"),
    ("application/gzip", "gz"),
    ("application/x-gzip", "gz"),
    ("application/x-tar", "tar"),
    ("application/x-7z-compressed", "7z"),
    ("application/vnd.rar", "rar"),
    ("application/x-rar-compressed", "rar"),
    ("application/msword", "doc"),
    ("application/vnd.openxmlformats-officedocument.wordprocessingml.document", "docx"),
    ("application/vnd.ms-excel", "xls"),
    ("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet", "xlsx"),
    ("application/vnd.ms-powerpoint", "ppt"),
    ("application/vnd.openxmlformats-officedocument.presentationml.presentation", "pptx"),
    ("application/vnd.oasis.opendocument.text", "odt"),
    ("application/vnd.oasis.opendocument.spreadsheet", "ods"),
    ("application/epub+zip", "epub"),
    ("application/java-archive", "jar"),
    ("application/json", "json"),
    ("application/xml", "xml"),
    ("text/xml", "xml"),
    ("application/rtf", "rtf"),
    ("text/rtf", "rtf"),
    ("text/plain", "txt"),
    ("text/csv", "csv"),
    ("text/css", "css"),
    ("text/markdown", "md"),
    ("text/javascript", "js"),
    ("application/javascript", "js"),
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/svg+xml", "svg"),
    ("image/bmp", "bmp"),
    ("image/tiff", "tif"),
    ("image/x-icon", "ico"),
    ("image/vnd.microsoft.icon", "ico"),
    ("audio/mpeg", "mp3"),
    ("audio/ogg", "ogg"),
    ("audio/wav", "wav"),
    ("audio/x-wav", "wav"),
    ("video/mp4", "mp4"),
    ("video/webm", "webm"),
    ("video/quicktime", "mov"),
    ("font/woff", "woff"),
    ("font/woff2", "woff2"),
];

// Common spellings neither table produces
const OTHER_EXTENSIONS: &[&str] = &[
    "jpeg", "tiff", "htm", "html", "tgz", "mpeg", "mpg", "yaml", "yml", "ps", "eps", "exe",
    "msi", "dmg", "iso", "deb", "rpm", "apk", "odp", "key", "pages", "numbers", "ttf", "otf",
];

// "Text/HTML; charset=utf-8" -> "text/html"
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

// Formats that are ZIP or OLE containers underneath
fn is_container_subtype(ext: &str) -> bool {
    matches!(
        ext,
        "docx" | "xlsx" | "pptx" | "odt" | "ods" | "epub" | "jar" | "xls" | "ppt"
    )
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_html_is_traversable() {
        assert_eq!(classify(Some("text/html"), b""), Classification::Traversable);
        assert_eq!(
            classify(Some("Text/HTML; charset=UTF-8"), b""),
            Classification::Traversable
        );
        assert_eq!(
            classify(Some("application/xhtml+xml"), b""),
            Classification::Traversable
        );
    }

    #[test]
    fn test_everything_else_is_collectible() {
        assert_eq!(classify(Some("application/pdf"), b"%PDF-"), Classification::Collectible);
        assert_eq!(classify(Some("text/plain"), b"<html>"), Classification::Collectible);
        assert_eq!(classify(None, b"<html></html>"), Classification::Collectible);
    }

    #[test]
    fn test_sniffing_beats_declared_type() {
        assert_eq!(
            resolve_extension(Some("application/octet-stream"), b"%PDF-1.4"),
            Some("pdf")
        );
        assert_eq!(resolve_extension(Some("text/plain"), b"\x89PNG\r\n\x1a\n"), Some("png"));
    }

    #[test]
    fn test_declared_type_fallback() {
        assert_eq!(resolve_extension(Some("application/pdf"), b"garbage"), Some("pdf"));
        assert_eq!(resolve_extension(Some("text/csv; charset=utf-8"), b"a,b\n1,2"), Some("csv"));
        assert_eq!(resolve_extension(Some("application/x-unknown"), b"???"), None);
        assert_eq!(resolve_extension(None, b"???"), None);
    }

    #[test]
    fn test_office_type_refines_zip_signature() {
        let docx = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
        assert_eq!(resolve_extension(Some(docx), b"PK\x03\x04rest"), Some("docx"));
        assert_eq!(resolve_extension(Some("application/octet-stream"), b"PK\x03\x04"), Some("zip"));
    }

    #[test]
    fn test_finalize_name_appends_once() {
        assert_eq!(finalize_name("report", "pdf"), "report.pdf");
        assert_eq!(finalize_name("report.pdf", "pdf"), "report.pdf");
        assert_eq!(finalize_name("REPORT.PDF", "pdf"), "REPORT.PDF");
        assert_eq!(finalize_name("archive.tar", "gz"), "archive.tar.gz");
        assert_eq!(finalize_name("notes", ""), "notes");
    }

    #[test]
    fn test_finalize_name_idempotent() {
        let once = finalize_name("data", "csv");
        assert_eq!(finalize_name(&once, "csv"), once);
    }

    #[test]
    fn test_logical_name_from_last_segment() {
        assert_eq!(logical_name(&url("http://x.test/docs/report")), Some("report".into()));
        assert_eq!(logical_name(&url("http://x.test/a/b.pdf?v=2")), Some("b.pdf".into()));
        assert_eq!(
            logical_name(&url("http://x.test/my%20file.txt")),
            Some("my file.txt".into())
        );
    }

    #[test]
    fn test_logical_name_empty_for_directories() {
        assert_eq!(logical_name(&url("http://x.test/")), None);
        assert_eq!(logical_name(&url("http://x.test/files/")), None);
    }

    #[test]
    fn test_logical_name_cannot_escape_staging() {
        let name = logical_name(&url("http://x.test/a%2F..%2Fetc%2Fpasswd")).unwrap();
        assert!(!name.contains('/'));
    }

    #[test]
    fn test_has_known_extension() {
        assert!(has_known_extension("report.pdf"));
        assert!(has_known_extension("photo.JPEG"));
        assert!(has_known_extension("clip.heic"));
        assert!(!has_known_extension("report"));
        assert!(!has_known_extension(".hidden"));
        assert!(!has_known_extension("v1.2-final draft"));
    }

    #[test]
    fn test_dotted_names_are_not_extensions() {
        assert!(!has_known_extension("release-v1.2"));
        assert!(!has_known_extension("annual.report"));
        assert!(!has_known_extension("data.2024"));
        assert!(!has_known_extension("build.final"));
    }

    #[test]
    fn test_content_type_table_lookup() {
        assert_eq!(extension_from_content_type("Application/PDF; q=1"), Some("pdf"));
        assert_eq!(extension_from_content_type("image/vnd.microsoft.icon"), Some("ico"));
        assert_eq!(extension_from_content_type("application/octet-stream"), None);
    }
}
