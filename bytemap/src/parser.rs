use crate::block::RawBytemap;
use crate::errors::Result;
use crate::tables::Layout;
use flate2::read::GzDecoder;
use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::Path,
};

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Read a whole bytemap file, inflating it when it carries the gzip magic.
///
/// The file is closed before this returns, whatever the outcome.
pub fn readgz<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut magic_bytes = [0u8; 2];
    let head = reader.read(&mut magic_bytes)?;
    reader.seek(SeekFrom::Start(0))?;

    let mut stream = vec![];
    if head == 2 && magic_bytes == GZIP_MAGIC {
        let mut gz_decoder = GzDecoder::new(reader);
        gz_decoder.read_to_end(&mut stream)?;
    } else {
        reader.read_to_end(&mut stream)?;
    }

    Ok(stream)
}

/// Reinterpret a decompressed stream as the raw bytemap of `layout`.
pub fn unpack(stream: Vec<u8>, layout: &Layout) -> Result<RawBytemap> {
    RawBytemap::new(stream, layout.shape, layout.band_axis())
}
