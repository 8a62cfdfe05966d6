#![allow(dead_code)]

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

pub enum Member<'a> {
    File(&'a str, &'a [u8]),
    Symlink(&'a str, &'a str),
    Dir(&'a str),
}

pub fn tar_of(members: &[Member<'_>]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for member in members {
        let mut header = tar::Header::new_gnu();
        match member {
            Member::File(name, data) => {
                header.set_size(data.len() as u64);
                header.set_mode(0o644);
                builder.append_data(&mut header, name, *data).expect("append file");
            }
            Member::Symlink(name, target) => {
                header.set_entry_type(tar::EntryType::Symlink);
                header.set_size(0);
                header.set_mode(0o777);
                builder.append_link(&mut header, name, target).expect("append symlink");
            }
            Member::Dir(name) => {
                header.set_entry_type(tar::EntryType::Directory);
                header.set_size(0);
                header.set_mode(0o755);
                builder
                    .append_data(&mut header, name, std::io::empty())
                    .expect("append dir");
            }
        }
    }
    builder.into_inner().expect("finish tar")
}

pub fn zip_of(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default().unix_permissions(0o644);
    for (name, data) in files {
        writer.start_file(*name, options).expect("start zip member");
        writer.write_all(data).expect("write zip member");
    }
    writer.finish().expect("finish zip").into_inner()
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).expect("gzip");
    encoder.finish().expect("finish gzip")
}

#[cfg(feature = "xz")]
pub fn xz(data: &[u8]) -> Vec<u8> {
    let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
    encoder.write_all(data).expect("xz");
    encoder.finish().expect("finish xz")
}

#[cfg(feature = "bzip2")]
pub fn bzip2(data: &[u8]) -> Vec<u8> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    encoder.write_all(data).expect("bzip2");
    encoder.finish().expect("finish bzip2")
}

#[cfg(feature = "zstd")]
pub fn zstd(data: &[u8]) -> Vec<u8> {
    zstd::encode_all(data, 3).expect("zstd")
}

pub fn gunzip_file(path: &Path) -> Vec<u8> {
    let mut out = Vec::new();
    flate2::read::GzDecoder::new(File::open(path).expect("open stored file"))
        .read_to_end(&mut out)
        .expect("gunzip stored file");
    out
}

pub fn spooled(bytes: &[u8]) -> File {
    let mut file = tempfile::tempfile().expect("temp file");
    file.write_all(bytes).expect("write fixture");
    file.rewind().expect("rewind fixture");
    file
}

pub fn store_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("matryoshka-test-store-")
        .tempdir()
        .expect("Failed to create temp dir")
}

pub fn has_program(program: &str) -> bool {
    which::which(program).is_ok()
}

/// Hidden staging files left in the store root.
pub fn leftover_staging(root: &Path) -> Vec<String> {
    std::fs::read_dir(root)
        .expect("read store root")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp~"))
        .collect()
}
