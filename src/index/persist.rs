//! Binary persistence for the inverted index.
//!
//! A single little-endian file:
//!
//! ```text
//! Header (40 bytes):
//!   signature[8]  = "BOOLIDX\0"
//!   version       : u32 (= 1)
//!   doc_count     : u32
//!   term_count    : u32
//!   posting_count : u32
//!   reserved      : u32 x 4 (= 0)
//! DocumentBlock (per document, in id order):
//!   id, title_len, title_bytes, url_len, url_bytes, content_len, length
//! TermOffsetTable (per term, in emission order):
//!   term_length : u32
//!   posting_count : u32
//!   file_offset : u64 (absolute offset of the TermRecord)
//! TermRecord (at file_offset):
//!   term_bytes, posting_count, (doc_id, frequency) x posting_count
//! ```
//!
//! Positions are not persisted: reloaded postings carry `frequency`
//! placeholder zero positions, so positional predicates cannot be verified
//! against a loaded index. Document content is likewise dropped (only its
//! byte length is kept as metadata).

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use ahash::AHashMap;

use crate::error::{Result, TesseraError};
use crate::index::document::Document;
use crate::index::inverted::InvertedIndex;
use crate::index::posting::Posting;

const SIGNATURE: [u8; 8] = *b"BOOLIDX\0";
const VERSION: u32 = 1;
const HEADER_LEN: u64 = 40;
const TERM_OFFSET_ENTRY_LEN: u64 = 16;

/// Little-endian field writer over any byte sink.
pub(crate) struct StructWriter<W: Write> {
    inner: W,
}

impl<W: Write> StructWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        StructWriter { inner }
    }

    pub(crate) fn write_u32(&mut self, value: u32) -> Result<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub(crate) fn write_u64(&mut self, value: u64) -> Result<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        Ok(())
    }

    pub(crate) fn finish(mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Little-endian field reader over any byte source.
pub(crate) struct StructReader<R: Read> {
    inner: R,
}

impl<R: Read> StructReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        StructReader { inner }
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    pub(crate) fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.inner.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub(crate) fn read_string(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes)
            .map_err(|_| TesseraError::index("invalid UTF-8 in index file"))
    }
}

impl<R: Read + Seek> StructReader<R> {
    pub(crate) fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }
}

/// Index contents reconstructed from a file.
pub(crate) struct LoadedIndex {
    pub(crate) terms: AHashMap<String, Vec<Posting>>,
    pub(crate) term_order: Vec<String>,
    pub(crate) documents: Vec<Document>,
    pub(crate) url_index: AHashMap<String, u32>,
    pub(crate) posting_count: usize,
    pub(crate) token_count: u64,
}

fn as_u32(value: usize, what: &str) -> Result<u32> {
    value
        .try_into()
        .map_err(|_| TesseraError::index(format!("{what} {value} exceeds u32 range")))
}

/// Write `index` to `path` in the `BOOLIDX` format.
pub(crate) fn save(index: &InvertedIndex, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = StructWriter::new(BufWriter::new(file));

    // Header.
    writer.write_bytes(&SIGNATURE)?;
    writer.write_u32(VERSION)?;
    writer.write_u32(as_u32(index.documents.len(), "document count")?)?;
    writer.write_u32(as_u32(index.terms.len(), "term count")?)?;
    writer.write_u32(as_u32(index.posting_count, "posting count")?)?;
    for _ in 0..4 {
        writer.write_u32(0)?;
    }

    // Document block.
    let mut doc_block_len = 0u64;
    for doc in &index.documents {
        writer.write_u32(doc.id)?;
        writer.write_u32(as_u32(doc.title.len(), "title length")?)?;
        writer.write_bytes(doc.title.as_bytes())?;
        writer.write_u32(as_u32(doc.url.len(), "url length")?)?;
        writer.write_bytes(doc.url.as_bytes())?;
        writer.write_u32(as_u32(doc.content.len(), "content length")?)?;
        writer.write_u32(doc.length)?;
        doc_block_len += 20 + doc.title.len() as u64 + doc.url.len() as u64;
    }

    // Term offset table, with absolute record offsets.
    let mut offset = HEADER_LEN
        + doc_block_len
        + index.term_order.len() as u64 * TERM_OFFSET_ENTRY_LEN;
    for term in &index.term_order {
        let postings = &index.terms[term];
        writer.write_u32(as_u32(term.len(), "term length")?)?;
        writer.write_u32(as_u32(postings.len(), "posting count")?)?;
        writer.write_u64(offset)?;
        offset += term.len() as u64 + 4 + postings.len() as u64 * 8;
    }

    // Term records.
    for term in &index.term_order {
        let postings = &index.terms[term];
        writer.write_bytes(term.as_bytes())?;
        writer.write_u32(as_u32(postings.len(), "posting count")?)?;
        for posting in postings {
            writer.write_u32(posting.doc_id)?;
            writer.write_u32(posting.frequency())?;
        }
    }

    writer.finish()
}

struct TermOffset {
    term_length: u32,
    posting_count: u32,
    file_offset: u64,
}

/// Read an index from `path`, reconstructing postings with placeholder
/// positions.
pub(crate) fn load(path: &Path) -> Result<LoadedIndex> {
    let file = File::open(path)?;
    let mut reader = StructReader::new(BufReader::new(file));

    // Header.
    let signature = reader.read_bytes(8)?;
    if signature != SIGNATURE {
        return Err(TesseraError::index("not a BOOLIDX index file"));
    }
    let version = reader.read_u32()?;
    if version != VERSION {
        return Err(TesseraError::index(format!(
            "unsupported index version {version} (expected {VERSION})"
        )));
    }
    let doc_count = reader.read_u32()?;
    let term_count = reader.read_u32()?;
    let posting_count = reader.read_u32()?;
    for _ in 0..4 {
        reader.read_u32()?;
    }

    // Document block.
    let mut documents = Vec::with_capacity(doc_count as usize);
    let mut url_index = AHashMap::with_capacity(doc_count as usize);
    for expected_id in 0..doc_count {
        let id = reader.read_u32()?;
        if id != expected_id {
            return Err(TesseraError::index(format!(
                "document ids are not dense: expected {expected_id}, found {id}"
            )));
        }
        let title_len = reader.read_u32()? as usize;
        let title = reader.read_string(title_len)?;
        let url_len = reader.read_u32()? as usize;
        let url = reader.read_string(url_len)?;
        let _content_len = reader.read_u32()?;
        let length = reader.read_u32()?;

        url_index.insert(url.clone(), id);
        documents.push(Document {
            id,
            title,
            url,
            content: String::new(),
            length,
        });
    }

    // Term offset table.
    let mut offsets = Vec::with_capacity(term_count as usize);
    for _ in 0..term_count {
        offsets.push(TermOffset {
            term_length: reader.read_u32()?,
            posting_count: reader.read_u32()?,
            file_offset: reader.read_u64()?,
        });
    }

    // Term records.
    let mut terms = AHashMap::with_capacity(term_count as usize);
    let mut term_order = Vec::with_capacity(term_count as usize);
    let mut postings_read = 0usize;
    let mut token_count = 0u64;
    for entry in &offsets {
        reader.seek_to(entry.file_offset)?;
        let term = reader.read_string(entry.term_length as usize)?;

        let record_count = reader.read_u32()?;
        if record_count != entry.posting_count {
            return Err(TesseraError::index(format!(
                "posting count mismatch for term '{term}': table says {}, record says {record_count}",
                entry.posting_count
            )));
        }

        let mut postings = Vec::with_capacity(record_count as usize);
        for _ in 0..record_count {
            let doc_id = reader.read_u32()?;
            if doc_id >= doc_count {
                return Err(TesseraError::index(format!(
                    "posting for term '{term}' references document {doc_id} of {doc_count}"
                )));
            }
            let frequency = reader.read_u32()?;
            token_count += frequency as u64;
            postings.push(Posting::with_positions(
                doc_id,
                vec![0; frequency as usize],
            ));
        }
        postings_read += postings.len();

        if terms.insert(term.clone(), postings).is_some() {
            return Err(TesseraError::index(format!("duplicate term '{term}'")));
        }
        term_order.push(term);
    }

    if postings_read != posting_count as usize {
        return Err(TesseraError::index(format!(
            "posting count mismatch: header says {posting_count}, records hold {postings_read}"
        )));
    }

    Ok(LoadedIndex {
        terms,
        term_order,
        documents,
        url_index,
        posting_count: postings_read,
        token_count,
    })
}
