// src/classify/sniff.rs
// =============================================================================
// Extension detection from the first bytes of a payload.
//
// Servers often send binary files as application/octet-stream or with no
// Content-Type at all; the leading "magic" bytes are a much better signal.
// Only signatures that are unambiguous at a fixed offset are listed here.
// =============================================================================

/// (offset, signature, extension)
const SIGNATURES: &[(usize, &[u8], &str)] = &[
    (0, b"%PDF-", "pdf"),
    (0, b"\x89PNG\r\n\x1a\n", "png"),
    (0, b"\xFF\xD8\xFF", "jpg"),
    (0, b"GIF87a", "gif"),
    (0, b"GIF89a", "gif"),
    (0, b"II*\x00", "tif"),
    (0, b"MM\x00*", "tif"),
    (0, b"\x00\x00\x01\x00", "ico"),
    (0, b"PK\x03\x04", "zip"),
    (0, b"\x1F\x8B", "gz"),
    (0, b"BZh", "bz2"),
    (0, b"\xFD7zXZ\x00", "xz"),
    (0, b"7z\xBC\xAF\x27\x1C", "7z"),
    (0, b"Rar!\x1A\x07", "rar"),
    (0, b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1", "doc"),
    (0, b"{\\rtf", "rtf"),
    (0, b"OggS", "ogg"),
    (0, b"fLaC", "flac"),
    (0, b"ID3", "mp3"),
    (0, b"\x1A\x45\xDF\xA3", "mkv"),
    (0, b"wOFF", "woff"),
    (0, b"wOF2", "woff2"),
    (0, b"\x7FELF", "elf"),
    (257, b"ustar", "tar"),
];

// What sniff_riff and sniff_iso_media can answer
const CONTAINER_EXTENSIONS: &[&str] = &["webp", "wav", "avi", "mov", "m4a", "heic", "avif", "mp4"];

/// True when `ext` is one of the answers `sniff_extension` can give
pub fn is_sniffed_extension(ext: &str) -> bool {
    CONTAINER_EXTENSIONS.contains(&ext) || SIGNATURES.iter().any(|(_, _, known)| *known == ext)
}

/// Returns the extension implied by the payload's magic bytes, if any
pub fn sniff_extension(body: &[u8]) -> Option<&'static str> {
    if let Some(ext) = sniff_riff(body) {
        return Some(ext);
    }

    if let Some(ext) = sniff_iso_media(body) {
        return Some(ext);
    }

    SIGNATURES
        .iter()
        .find(|(offset, magic, _)| {
            body.get(*offset..offset + magic.len())
                .is_some_and(|window| window == *magic)
        })
        .map(|(_, _, ext)| *ext)
}

// RIFF containers carry their real type at bytes 8..12
fn sniff_riff(body: &[u8]) -> Option<&'static str> {
    if body.len() < 12 || &body[0..4] != b"RIFF" {
        return None;
    }
    match &body[8..12] {
        b"WEBP" => Some("webp"),
        b"WAVE" => Some("wav"),
        b"AVI " => Some("avi"),
        _ => None,
    }
}

// ISO base media files: "ftyp" box at offset 4, brand right after
fn sniff_iso_media(body: &[u8]) -> Option<&'static str> {
    if body.len() < 12 || &body[4..8] != b"ftyp" {
        return None;
    }
    match &body[8..12] {
        b"qt  " => Some("mov"),
        b"M4A " => Some("m4a"),
        b"heic" | b"heix" => Some("heic"),
        b"avif" => Some("avif"),
        _ => Some("mp4"),
    }
}
