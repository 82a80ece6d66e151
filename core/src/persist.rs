use crate::config::IndexFormat;
use crate::error::{IndexError, Result};
use crate::index::InvertedIndex;
use bincode::Options;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

type CodecResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// One on-disk encoding of an [`InvertedIndex`]. Every implementation keeps
/// the key set and the order of each posting list exactly.
pub trait Codec {
    fn encode(&self, index: &InvertedIndex, out: &mut dyn Write) -> CodecResult<()>;
    fn decode(&self, input: &mut dyn Read) -> CodecResult<InvertedIndex>;
}

pub struct BinaryCodec;
pub struct JsonCodec;
pub struct TomlCodec;

/// Fixed-width integers, matching `bincode::serialize`. Decoding is capped at
/// the payload size so a corrupt length prefix fails instead of allocating.
fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new().with_fixint_encoding().allow_trailing_bytes()
}

impl Codec for BinaryCodec {
    fn encode(&self, index: &InvertedIndex, out: &mut dyn Write) -> CodecResult<()> {
        bincode_options().serialize_into(out, index)?;
        Ok(())
    }

    fn decode(&self, input: &mut dyn Read) -> CodecResult<InvertedIndex> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;
        Ok(bincode_options().with_limit(bytes.len() as u64).deserialize(&bytes)?)
    }
}

impl Codec for JsonCodec {
    fn encode(&self, index: &InvertedIndex, out: &mut dyn Write) -> CodecResult<()> {
        serde_json::to_writer_pretty(out, index)?;
        Ok(())
    }

    fn decode(&self, input: &mut dyn Read) -> CodecResult<InvertedIndex> {
        Ok(serde_json::from_reader(input)?)
    }
}

impl Codec for TomlCodec {
    fn encode(&self, index: &InvertedIndex, out: &mut dyn Write) -> CodecResult<()> {
        let text = toml::to_string(index)?;
        out.write_all(text.as_bytes())?;
        Ok(())
    }

    fn decode(&self, input: &mut dyn Read) -> CodecResult<InvertedIndex> {
        let mut text = String::new();
        input.read_to_string(&mut text)?;
        Ok(toml::from_str(&text)?)
    }
}

impl IndexFormat {
    pub fn codec(self) -> &'static dyn Codec {
        match self {
            IndexFormat::Binary => &BinaryCodec,
            IndexFormat::Json => &JsonCodec,
            IndexFormat::Toml => &TomlCodec,
        }
    }
}

/// Path of the index file of `format` inside `dir`.
pub fn index_path(dir: &Path, format: IndexFormat) -> PathBuf {
    dir.join(format.file_name())
}

/// Write `index` to `dir/indexes.<ext>` and return the file path.
///
/// The bytes land in a temporary sibling first and are renamed into place,
/// so a failed write never leaves a truncated index under the final name.
/// Index files of the other formats are removed once the new one is in place.
pub fn write_index(index: &InvertedIndex, format: IndexFormat, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| IndexError::io(dir, e))?;
    let path = index_path(dir, format);
    let tmp = dir.join(format!("{}.tmp", format.file_name()));

    let file = File::create(&tmp).map_err(|e| IndexError::io(&tmp, e))?;
    let mut out = BufWriter::new(file);
    if let Err(e) = format.codec().encode(index, &mut out) {
        let _ = fs::remove_file(&tmp);
        return Err(IndexError::Encode(e.to_string()));
    }
    out.flush().map_err(|e| IndexError::io(&tmp, e))?;
    drop(out);
    fs::rename(&tmp, &path).map_err(|e| IndexError::io(&path, e))?;
    for stale in IndexFormat::ALL.into_iter().filter(|f| *f != format) {
        let stale = index_path(dir, stale);
        match fs::remove_file(&stale) {
            Ok(()) => tracing::info!(path = %stale.display(), "removed stale index"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(IndexError::io(stale, e)),
        }
    }

    tracing::info!(path = %path.display(), %format, grams = index.len(), "wrote index");
    Ok(path)
}

/// Read an index written by [`write_index`] and check its shape.
pub fn read_index(format: IndexFormat, path: &Path) -> Result<InvertedIndex> {
    let file = File::open(path).map_err(|e| IndexError::io(path, e))?;
    let mut input = BufReader::new(file);
    let decode_error = |reason: String| IndexError::Decode { path: path.to_path_buf(), reason };
    let index = format.codec().decode(&mut input).map_err(|e| decode_error(e.to_string()))?;
    index.check().map_err(decode_error)?;
    tracing::info!(path = %path.display(), %format, n = index.n, grams = index.len(), "loaded index");
    Ok(index)
}
