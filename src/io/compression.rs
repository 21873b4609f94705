//! Transparent decompression of input files.
//!
//! Codecs are detected from the file extension first, falling back to the
//! file's magic bytes for formats with a binary signature. Compressed streams cannot seek, so a compressed file is
//! always read as a single shard.
//!
//! ## Built-in Codecs
//! - **Gzip** (`.gz`, `.gzip`) - via `flate2` (feature: `compression-gzip`)
//! - **Zstandard** (`.zst`, `.zstd`) - via `zstd` (feature: `compression-zstd`)
//! - **Bzip2** (`.bz2`, `.bzip2`) - via `bzip2` (feature: `compression-bzip2`)
//! - **XZ** (`.xz`) - via `xz2` (feature: `compression-xz`)

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

/// A decompression codec for input files.
pub trait CompressionCodec: Send + Sync {
    /// Human-readable codec name.
    fn name(&self) -> &str;

    /// File extensions associated with this codec, lowercase, including the dot.
    fn extensions(&self) -> &[&str];

    /// Leading bytes identifying this format, empty if it is only recognized
    /// by extension.
    fn magic_bytes(&self) -> &[u8];

    fn wrap_reader(&self, reader: Box<dyn Read + Send>) -> std::io::Result<Box<dyn Read + Send>>;
}

#[cfg(feature = "compression-gzip")]
struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl CompressionCodec for GzipCodec {
    fn name(&self) -> &str {
        "gzip"
    }

    fn extensions(&self) -> &[&str] {
        &[".gz", ".gzip"]
    }

    fn magic_bytes(&self) -> &[u8] {
        &[0x1f, 0x8b]
    }

    fn wrap_reader(&self, reader: Box<dyn Read + Send>) -> std::io::Result<Box<dyn Read + Send>> {
        // concatenated members are common in log rotation output
        Ok(Box::new(flate2::read::MultiGzDecoder::new(reader)))
    }
}

#[cfg(feature = "compression-zstd")]
struct ZstdCodec;

#[cfg(feature = "compression-zstd")]
impl CompressionCodec for ZstdCodec {
    fn name(&self) -> &str {
        "zstd"
    }

    fn extensions(&self) -> &[&str] {
        &[".zst", ".zstd"]
    }

    fn magic_bytes(&self) -> &[u8] {
        &[0x28, 0xb5, 0x2f, 0xfd]
    }

    fn wrap_reader(&self, reader: Box<dyn Read + Send>) -> std::io::Result<Box<dyn Read + Send>> {
        zstd::stream::read::Decoder::new(reader).map(|d| Box::new(d) as Box<dyn Read + Send>)
    }
}

#[cfg(feature = "compression-bzip2")]
struct Bzip2Codec;

#[cfg(feature = "compression-bzip2")]
impl CompressionCodec for Bzip2Codec {
    fn name(&self) -> &str {
        "bzip2"
    }

    fn extensions(&self) -> &[&str] {
        &[".bz2", ".bzip2"]
    }

    // `BZh` is plain ASCII and starts ordinary words, so bzip2 needs its extension
    fn magic_bytes(&self) -> &[u8] {
        &[]
    }

    fn wrap_reader(&self, reader: Box<dyn Read + Send>) -> std::io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(bzip2::read::MultiBzDecoder::new(reader)))
    }
}

#[cfg(feature = "compression-xz")]
struct XzCodec;

#[cfg(feature = "compression-xz")]
impl CompressionCodec for XzCodec {
    fn name(&self) -> &str {
        "xz"
    }

    fn extensions(&self) -> &[&str] {
        &[".xz"]
    }

    fn magic_bytes(&self) -> &[u8] {
        &[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00]
    }

    fn wrap_reader(&self, reader: Box<dyn Read + Send>) -> std::io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(xz2::read::XzDecoder::new_multi_decoder(reader)))
    }
}

fn codecs() -> Vec<Arc<dyn CompressionCodec>> {
    let mut v: Vec<Arc<dyn CompressionCodec>> = Vec::new();
    #[cfg(feature = "compression-gzip")]
    v.push(Arc::new(GzipCodec));
    #[cfg(feature = "compression-zstd")]
    v.push(Arc::new(ZstdCodec));
    #[cfg(feature = "compression-bzip2")]
    v.push(Arc::new(Bzip2Codec));
    #[cfg(feature = "compression-xz")]
    v.push(Arc::new(XzCodec));
    v
}

fn detect_from_extension(path: &Path) -> Option<Arc<dyn CompressionCodec>> {
    let name = path.file_name()?.to_str()?.to_ascii_lowercase();
    codecs()
        .into_iter()
        .find(|c| c.extensions().iter().any(|ext| name.ends_with(ext)))
}

fn detect_from_magic(path: &Path) -> Result<Option<Arc<dyn CompressionCodec>>> {
    let mut head = [0u8; 8];
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut filled = 0;
    while filled < head.len() {
        let n = f
            .read(&mut head[filled..])
            .with_context(|| format!("read header of {}", path.display()))?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(codecs().into_iter().find(|c| {
        let magic = c.magic_bytes();
        !magic.is_empty() && head[..filled].starts_with(magic)
    }))
}

/// Find the codec for `path`, if the file is compressed.
///
/// # Errors
/// Returns an error if the file header cannot be read.
pub fn detect_codec(path: &Path) -> Result<Option<Arc<dyn CompressionCodec>>> {
    if let Some(codec) = detect_from_extension(path) {
        return Ok(Some(codec));
    }
    detect_from_magic(path)
}

/// Open `path` for line reading, decompressing when needed.
///
/// # Errors
/// Returns an error if the file cannot be opened, its header read, or the
/// decoder initialized.
pub fn open_text_reader(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader: Box<dyn BufRead + Send> = match detect_codec(path)? {
        Some(codec) => {
            tracing::trace!(codec = codec.name(), path = %path.display(), "decompressing input");
            let inner = codec
                .wrap_reader(Box::new(f))
                .with_context(|| format!("wrap {} with {} codec", path.display(), codec.name()))?;
            Box::new(BufReader::new(inner))
        }
        None => Box::new(BufReader::new(f)),
    };
    Ok(reader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_has_no_codec() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("plain.txt");
        std::fs::write(&path, "a\n")?;
        assert!(detect_codec(&path)?.is_none());
        Ok(())
    }

    #[test]
    fn text_starting_like_a_bzip2_header_is_plain() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("corpus.txt");
        std::fs::write(&path, "BZhang listen silent\nenlist tinsel\n")?;
        assert!(detect_codec(&path)?.is_none());

        let lines: Vec<String> = open_text_reader(&path)?.lines().collect::<std::io::Result<_>>()?;
        assert_eq!(lines, vec!["BZhang listen silent", "enlist tinsel"]);
        Ok(())
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn gzip_detected_by_magic_without_extension() -> Result<()> {
        use flate2::Compression;
        use flate2::write::GzEncoder;
        use std::io::Write;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("lines.data");
        let mut enc = GzEncoder::new(File::create(&path)?, Compression::default());
        enc.write_all(b"listen silent\n")?;
        enc.finish()?;

        assert_eq!(detect_codec(&path)?.map(|c| c.name().to_string()), Some("gzip".into()));
        let lines: Vec<String> = open_text_reader(&path)?.lines().collect::<std::io::Result<_>>()?;
        assert_eq!(lines, vec!["listen silent".to_string()]);
        Ok(())
    }

    #[cfg(feature = "compression-zstd")]
    #[test]
    fn zstd_round_trip_by_extension() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("lines.TXT.ZST");
        let packed = zstd::stream::encode_all(&b"evil\nvile\n"[..], 0)?;
        std::fs::write(&path, packed)?;

        let lines: Vec<String> = open_text_reader(&path)?.lines().collect::<std::io::Result<_>>()?;
        assert_eq!(lines, vec!["evil".to_string(), "vile".to_string()]);
        Ok(())
    }
}
