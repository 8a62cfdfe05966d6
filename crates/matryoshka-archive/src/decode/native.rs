use std::fs::File;
use std::io::{self, Read, Seek, Write};

use super::{Decode, DecodedStream};
use crate::format::{ArchiveFormat, Compression, detect_from_reader};
use crate::{Error, Result};

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// Width of the name and linkname fields of a tar header.
const NAME_FIELD: usize = 100;

/// In-process decoder for zip and (optionally compressed) tar.
///
/// The input is rewritten as a plain tar into an anonymous temp file, which
/// is then streamed back. Member names are copied byte for byte; names that
/// do not fit a header travel as GNU long-name records.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeDecoder;

impl Decode for NativeDecoder {
    fn open(&self, mut input: File) -> Result<Box<dyn DecodedStream>> {
        let format = detect_from_reader(&mut input)
            .map_err(Error::Malformed)?
            .ok_or(Error::UnsupportedFormat)?;

        let mut builder = tar::Builder::new(tempfile::tempfile()?);
        match format {
            ArchiveFormat::Zip => renormalise_zip(input, &mut builder)?,
            ArchiveFormat::Tar(codec) => renormalise_tar(input, codec, &mut builder)?,
        }

        let mut spooled = builder.into_inner().map_err(Error::Malformed)?;
        spooled.rewind()?;
        Ok(Box::new(NativeStream(spooled)))
    }

    fn name(&self) -> &str {
        "native"
    }
}

fn renormalise_zip(input: File, builder: &mut tar::Builder<File>) -> Result<()> {
    let mut archive = zip::ZipArchive::new(input).map_err(|_| Error::Corrupted)?;

    for index in 0..archive.len() {
        let mut file = archive.by_index(index).map_err(|_| Error::Corrupted)?;
        let name = file.name_raw().to_vec();
        let unix_mode = file.unix_mode();
        let mut header = tar::Header::new_gnu();

        let appended = if file.is_dir() {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_mode(unix_mode.map_or(0o755, |m| m & 0o7777));
            header.set_size(0);
            append_raw(builder, header, &name, None, io::empty())
        } else if unix_mode.is_some_and(|m| m & S_IFMT == S_IFLNK) {
            let mut target = Vec::new();
            file.read_to_end(&mut target).map_err(Error::Malformed)?;
            header.set_entry_type(tar::EntryType::Symlink);
            header.set_mode(unix_mode.map_or(0o777, |m| m & 0o7777));
            header.set_size(0);
            append_raw(builder, header, &name, Some(&target), io::empty())
        } else {
            header.set_entry_type(tar::EntryType::Regular);
            header.set_mode(unix_mode.map_or(0o644, |m| m & 0o7777));
            header.set_size(file.size());
            append_raw(builder, header, &name, None, &mut file)
        };
        appended.map_err(Error::Malformed)?;
    }
    Ok(())
}

fn renormalise_tar(input: File, codec: Compression, builder: &mut tar::Builder<File>) -> Result<()> {
    let mut archive = tar::Archive::new(codec.decoder(input)?);

    for entry in archive.entries().map_err(Error::Malformed)? {
        let mut entry = entry.map_err(Error::Malformed)?;
        let name = entry.path_bytes().into_owned();
        let link = entry.link_name_bytes().map(|target| target.into_owned());
        let mut header = entry.header().clone();
        header.set_size(entry.size());

        append_raw(builder, header, &name, link.as_deref(), &mut entry).map_err(Error::Malformed)?;
    }
    Ok(())
}

/// Append a member under exactly `name` (and `link`), with no path cleanup.
fn append_raw<W: Write>(
    builder: &mut tar::Builder<W>,
    mut header: tar::Header,
    name: &[u8],
    link: Option<&[u8]>,
    data: impl Read,
) -> io::Result<()> {
    if let Some(link) = link {
        if link.len() > NAME_FIELD {
            append_long_name(builder, tar::EntryType::GNULongLink, link)?;
        }
        fill_field(&mut header.as_old_mut().linkname, link);
    }
    if name.len() > NAME_FIELD {
        append_long_name(builder, tar::EntryType::GNULongName, name)?;
    }
    fill_field(&mut header.as_old_mut().name, name);
    if let Some(ustar) = header.as_ustar_mut() {
        ustar.prefix.fill(0);
    }
    header.set_cksum();
    builder.append(&header, data)
}

fn append_long_name<W: Write>(builder: &mut tar::Builder<W>, kind: tar::EntryType, bytes: &[u8]) -> io::Result<()> {
    let mut header = tar::Header::new_gnu();
    fill_field(&mut header.as_old_mut().name, b"././@LongLink");
    header.set_entry_type(kind);
    header.set_mode(0o644);
    header.set_size(bytes.len() as u64 + 1);
    header.set_cksum();
    builder.append(&header, bytes.chain(&[0u8][..]))
}

fn fill_field(field: &mut [u8; NAME_FIELD], bytes: &[u8]) {
    field.fill(0);
    let len = bytes.len().min(NAME_FIELD);
    field[..len].copy_from_slice(&bytes[..len]);
}

struct NativeStream(File);

impl Read for NativeStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl DecodedStream for NativeStream {
    fn finish(self: Box<Self>) -> Result<()> {
        Ok(())
    }

    fn abort(self: Box<Self>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn read_all(stream: Box<dyn DecodedStream>) -> Vec<(String, tar::EntryType, Vec<u8>)> {
        let mut stream = stream;
        let mut members = Vec::new();
        {
            let mut archive = tar::Archive::new(&mut stream);
            for entry in archive.entries().unwrap() {
                let mut entry = entry.unwrap();
                let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
                let kind = entry.header().entry_type();
                let mut data = Vec::new();
                entry.read_to_end(&mut data).unwrap();
                members.push((name, kind, data));
            }
        }
        stream.finish().unwrap();
        members
    }

    fn rewound(mut file: File) -> File {
        file.rewind().unwrap();
        file
    }

    #[test]
    fn zip_becomes_tar() {
        let mut writer = zip::ZipWriter::new(tempfile::tempfile().unwrap());
        let options = zip::write::SimpleFileOptions::default().unix_permissions(0o640);
        writer.add_directory("docs/", options).unwrap();
        writer.start_file("docs/readme.txt", options).unwrap();
        writer.write_all(b"read me\n").unwrap();
        let input = rewound(writer.finish().unwrap());

        let members = read_all(NativeDecoder.open(input).unwrap());
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].1, tar::EntryType::Directory);
        assert_eq!(members[1].0, "docs/readme.txt");
        assert_eq!(members[1].2, b"read me\n");
    }

    #[test]
    fn gzipped_tar_keeps_links() {
        let encoder =
            flate2::write::GzEncoder::new(tempfile::tempfile().unwrap(), flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let mut header = tar::Header::new_gnu();
        header.set_size(3);
        header.set_mode(0o644);
        builder.append_data(&mut header, "a.txt", &b"abc"[..]).unwrap();
        let mut link = tar::Header::new_gnu();
        link.set_entry_type(tar::EntryType::Symlink);
        link.set_size(0);
        link.set_mode(0o777);
        builder.append_link(&mut link, "b.txt", "a.txt").unwrap();
        let input = rewound(builder.into_inner().unwrap().finish().unwrap());

        let members = read_all(NativeDecoder.open(input).unwrap());
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].2, b"abc");
        assert_eq!(members[1].0, "b.txt");
        assert_eq!(members[1].1, tar::EntryType::Symlink);
    }

    #[test]
    fn names_are_copied_verbatim() {
        let long = format!("{}/file.txt", "deep".repeat(40));
        let mut writer = zip::ZipWriter::new(tempfile::tempfile().unwrap());
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("a/../b.txt", options).unwrap();
        writer.write_all(b"b").unwrap();
        writer.start_file(long.as_str(), options).unwrap();
        writer.write_all(b"long").unwrap();
        let input = rewound(writer.finish().unwrap());

        let members = read_all(NativeDecoder.open(input).unwrap());
        assert_eq!(members[0].0, "a/../b.txt");
        assert_eq!(members[1].0, long);
        assert_eq!(members[1].2, b"long");
    }

    #[test]
    fn unknown_input_is_rejected() {
        let mut input = tempfile::tempfile().unwrap();
        input.write_all(b"definitely not an archive").unwrap();
        let result = NativeDecoder.open(rewound(input));
        assert!(matches!(result, Err(Error::UnsupportedFormat)));
    }

    #[test]
    fn corrupt_zip_is_rejected() {
        let mut input = tempfile::tempfile().unwrap();
        input.write_all(b"PK\x03\x04 truncated local header").unwrap();
        let result = NativeDecoder.open(rewound(input));
        assert!(matches!(result, Err(Error::Corrupted)));
    }
}
