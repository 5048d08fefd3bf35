//! Blocking side of the loader
//!
//! Data files are ISO-8859-1 text. The reader runs on a blocking thread,
//! decodes and parses lines into records and hands full batches to the
//! async committer over a bounded channel, so at most one batch waits while
//! another is being written.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use uuid::uuid;
use zip::ZipArchive;

use datapipe_common::{Code, Error, ErrorContext, Result};

use crate::records::{DataRecord, Headers, RecordKind};

pub type Batch = Vec<DataRecord>;

/// Where the text of a data file comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    ZipMember { archive: PathBuf, index: usize },
}

#[derive(Debug, Clone, Copy)]
pub struct ReadPlan {
    pub kind: RecordKind,
    pub separator: char,
    /// Body lines already committed by an earlier run
    pub skip: u64,
    pub batch_size: usize,
}

/// A `.txt` entry of an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipMember {
    pub index: usize,
    pub name: String,
    pub size: u64,
}

pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Text members of `archive`, in archive order.
pub fn list_zip_members(archive: &Path) -> Result<Vec<ZipMember>> {
    let file = File::open(archive).site(
        uuid!("387f18e1-152a-4ead-8642-a898aae4fe2d"),
        Code::Unknown,
        "Failed to open archive.",
    )?;
    let mut zip = ZipArchive::new(file).site(
        uuid!("4a982b31-a6c3-4b00-b91c-d0917198f8ee"),
        Code::InvalidArgument,
        "Failed to read archive.",
    )?;

    let mut members = Vec::new();
    for index in 0..zip.len() {
        let entry = zip.by_index(index).site(
            uuid!("31dfb0a6-ceab-4454-ab94-ab91af7c705e"),
            Code::InvalidArgument,
            "Failed to read archive entry.",
        )?;

        let is_text = Path::new(entry.name())
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if entry.is_dir() || !is_text {
            continue;
        }

        members.push(ZipMember {
            index,
            name: entry.name().to_string(),
            size: entry.size(),
        });
    }
    Ok(members)
}

/// Read `source` and send its records in batches. Returns the number of
/// records read past the skipped ones. Stops quietly when the receiver is
/// gone.
pub fn read_batches(source: &Source, plan: &ReadPlan, tx: &mpsc::Sender<Batch>) -> Result<u64> {
    match source {
        Source::File(path) => {
            let file = File::open(path)
                .site(uuid!("aab7a8ea-3bc5-4f2c-9d0c-f094002c51a4"), Code::Unknown, "Failed to open data file.")
                .map_err(|e| e.with_meta("path", path.display().to_string()))?;
            consume(BufReader::new(file), plan, tx)
        },
        Source::ZipMember { archive, index } => {
            let file = File::open(archive).site(
                uuid!("7f57bc6f-1ca0-4b0e-ae93-98bf63f88966"),
                Code::Unknown,
                "Failed to open archive.",
            )?;
            let mut zip = ZipArchive::new(file).site(
                uuid!("1e132628-6699-42b2-8ca3-3aaa858393a2"),
                Code::InvalidArgument,
                "Failed to read archive.",
            )?;
            let entry = zip.by_index(*index).site(
                uuid!("a4f6a805-2592-4292-bd02-1d3c0405a7a9"),
                Code::InvalidArgument,
                "Failed to read archive entry.",
            )?;
            consume(BufReader::new(entry), plan, tx)
        },
    }
}

fn consume<R: BufRead>(mut reader: R, plan: &ReadPlan, tx: &mpsc::Sender<Batch>) -> Result<u64> {
    let mut buf = Vec::new();

    let Some(header) = next_line(&mut reader, &mut buf)? else {
        return Err(Error::invalid_argument(uuid!("5b9ed604-0623-4146-bdb8-bf5134bda74c"), "Missing header line."));
    };
    let headers = Headers::parse(&header, plan.separator);
    headers
        .require(plan.kind.required_headers())
        .map_err(|e| e.forward(uuid!("4fd6ba55-4716-494b-a48c-901ba842207e")))?;

    let mut skipped = 0;
    while skipped < plan.skip {
        match next_line(&mut reader, &mut buf)? {
            Some(line) if line.is_empty() => {},
            Some(_) => skipped += 1,
            None => break,
        }
    }

    let batch_size = plan.batch_size.max(1);
    let mut batch = Vec::with_capacity(batch_size);
    let mut read = 0u64;

    while let Some(line) = next_line(&mut reader, &mut buf)? {
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(plan.separator).collect();
        let record = plan.kind.parse(&headers, &fields).map_err(|e| {
            e.forward(uuid!("f4ca1ebc-e76a-4674-8def-e8fe70496dfb"))
                .with_meta("line", skipped + read + 1)
        })?;
        batch.push(record);
        read += 1;

        if batch.len() == batch_size && tx.blocking_send(std::mem::take(&mut batch)).is_err() {
            return Ok(read);
        }
    }

    if !batch.is_empty() {
        // A closed channel means the committer already stopped.
        let _ = tx.blocking_send(batch);
    }
    Ok(read)
}

fn next_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> Result<Option<String>> {
    buf.clear();
    let n = reader
        .read_until(b'\n', buf)
        .site(uuid!("598f8fc2-8542-4f21-936f-6336b1725d17"), Code::Unknown, "Failed to read line.")?;
    if n == 0 {
        return Ok(None);
    }
    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }
    Ok(Some(decode_latin1(buf)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::partners::attom::ListingVersion;

    const RENTAL_HEADER: &str = "[ATTOM ID]\tPropertyAddressFull";

    fn plan(skip: u64, batch_size: usize) -> ReadPlan {
        ReadPlan {
            kind: RecordKind::AttomRentalAvm,
            separator: '\t',
            skip,
            batch_size,
        }
    }

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    async fn read_all(source: Source, plan: ReadPlan) -> (Vec<Batch>, Result<u64>) {
        let (tx, mut rx) = mpsc::channel(1);
        let handle = tokio::task::spawn_blocking(move || read_batches(&source, &plan, &tx));

        let mut batches = Vec::new();
        while let Some(batch) = rx.recv().await {
            batches.push(batch);
        }
        (batches, handle.await.unwrap())
    }

    fn rental_ids(batches: &[Batch]) -> Vec<i64> {
        batches
            .iter()
            .flatten()
            .map(|r| match r {
                DataRecord::AttomRentalAvm(r) => r.attomid,
                other => panic!("unexpected record {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_decode_latin1() {
        assert_eq!(decode_latin1(b"Caf\xe9"), "Café");
        assert_eq!(decode_latin1(b"plain"), "plain");
    }

    #[tokio::test]
    async fn test_batches_and_resume() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!("{}\r\n1\tA\r\n2\tB\r\n\r\n3\tC\r\n4\tD", RENTAL_HEADER);
        let path = write_file(dir.path(), "rental.txt", body.as_bytes());

        let (batches, read) = read_all(Source::File(path.clone()), plan(0, 3)).await;
        assert_eq!(read.unwrap(), 4);
        assert_eq!(batches.len(), 2);
        assert_eq!(rental_ids(&batches), vec![1, 2, 3, 4]);

        let (batches, read) = read_all(Source::File(path), plan(2, 3)).await;
        assert_eq!(read.unwrap(), 2);
        assert_eq!(rental_ids(&batches), vec![3, 4]);
    }

    #[tokio::test]
    async fn test_parse_error_keeps_earlier_batches() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!("{}\n1\tA\n2\tB\nnot-a-number\tC\n", RENTAL_HEADER);
        let path = write_file(dir.path(), "rental.txt", body.as_bytes());

        let (batches, read) = read_all(Source::File(path), plan(0, 2)).await;
        assert_eq!(rental_ids(&batches), vec![1, 2]);
        let err = read.unwrap_err();
        assert_eq!(err.meta["line"], 3);
    }

    #[tokio::test]
    async fn test_truncated_row_fails_on_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let body = "PropertyAddressFull\t[ATTOM ID]\nA\t1\nB\n";
        let path = write_file(dir.path(), "rental.txt", body.as_bytes());

        let (batches, read) = read_all(Source::File(path), plan(0, 1)).await;
        assert_eq!(rental_ids(&batches), vec![1]);
        let err = read.unwrap_err();
        assert_eq!(err.meta["line"], 2);
        assert!(err.chain().any(|e| e.meta.get("header").is_some_and(|h| h == "[ATTOM ID]")));
    }

    #[tokio::test]
    async fn test_header_checks() {
        let dir = tempfile::tempdir().unwrap();

        let empty = write_file(dir.path(), "empty.txt", b"");
        let (_, read) = read_all(Source::File(empty), plan(0, 10)).await;
        assert_eq!(read.unwrap_err().code, Code::InvalidArgument);

        let missing = write_file(dir.path(), "missing.txt", b"PropertyAddressFull\nA\n");
        let (batches, read) = read_all(Source::File(missing), plan(0, 10)).await;
        assert!(batches.is_empty());
        assert_eq!(read.unwrap_err().origin().meta["header"], "[ATTOM ID]");

        let unknown = write_file(dir.path(), "unknown.txt", b"[ATTOM ID]\tSurprise\n1\tx\n");
        let (_, read) = read_all(Source::File(unknown), plan(0, 10)).await;
        assert_eq!(read.unwrap_err().origin().meta["header"], "Surprise");
    }

    #[tokio::test]
    async fn test_zip_members() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("ABODEMINE_LISTINGANALYTICSCOMPLETE_0350.zip");
        {
            let mut zip = zip::ZipWriter::new(File::create(&archive).unwrap());
            let options = zip::write::SimpleFileOptions::default();
            zip.start_file("README.pdf", options).unwrap();
            zip.write_all(b"%PDF").unwrap();
            zip.start_file("LISTING.TXT", options).unwrap();
            zip.write_all(
                b"ATTOM ID\tMLSRecordID\tMLSListingID\tStatusChangeDate\tCurrentStatus\n9\t8\t7\t04/17/2025\tN\n",
            )
            .unwrap();
            zip.finish().unwrap();
        }

        let members = list_zip_members(&archive).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "LISTING.TXT");
        assert_eq!(members[0].index, 1);

        let plan = ReadPlan {
            kind: RecordKind::AttomListing(ListingVersion::V20250417),
            separator: '\t',
            skip: 0,
            batch_size: 10,
        };
        let source = Source::ZipMember {
            archive,
            index: members[0].index,
        };
        let (batches, read) = read_all(source, plan).await;
        assert_eq!(read.unwrap(), 1);
        match &batches[0][0] {
            DataRecord::AttomListing(listing, ListingVersion::V20250417) => {
                assert_eq!(listing.attom_id, 9);
                assert_eq!(listing.current_status, Some(false));
            },
            other => panic!("unexpected record {:?}", other),
        }
    }
}
