//! Archive builders for tests.

use anyhow::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::ArchiveKind;

pub const MTIME: u64 = 1_700_000_000;

pub struct Member {
    pub path: String,
    pub mode: u32,
    pub content: Vec<u8>,
    pub is_dir: bool,
}

impl Member {
    pub fn file(path: &str, mode: u32, content: &[u8]) -> Self {
        Self {
            path: path.to_string(),
            mode,
            content: content.to_vec(),
            is_dir: false,
        }
    }

    pub fn dir(path: &str) -> Self {
        Self {
            path: path.to_string(),
            mode: 0o755,
            content: Vec::new(),
            is_dir: true,
        }
    }
}

fn append_members<W: Write>(builder: &mut tar::Builder<W>, members: &[Member]) -> Result<()> {
    for member in members {
        let mut header = tar::Header::new_gnu();
        header.set_mode(member.mode);
        header.set_mtime(MTIME);
        if member.is_dir {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_size(0);
            header.set_cksum();
            builder.append_data(&mut header, format!("{}/", member.path), std::io::empty())?;
        } else {
            header.set_size(member.content.len() as u64);
            header.set_cksum();
            builder.append_data(&mut header, &member.path, member.content.as_slice())?;
        }
    }
    Ok(())
}

pub fn write_archive(path: &Path, kind: ArchiveKind, members: &[Member]) -> Result<()> {
    if kind == ArchiveKind::Zip {
        return write_zip(path, members);
    }
    let file = File::create(path)?;
    match kind {
        ArchiveKind::Tar => {
            let mut builder = tar::Builder::new(file);
            append_members(&mut builder, members)?;
            builder.into_inner()?;
        }
        ArchiveKind::TarGz => {
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            let mut builder = tar::Builder::new(encoder);
            append_members(&mut builder, members)?;
            builder.into_inner()?.finish()?;
        }
        ArchiveKind::TarBz2 => {
            let encoder = bzip2::write::BzEncoder::new(file, bzip2::Compression::default());
            let mut builder = tar::Builder::new(encoder);
            append_members(&mut builder, members)?;
            builder.into_inner()?.finish()?;
        }
        ArchiveKind::TarXz => {
            let encoder = xz2::write::XzEncoder::new(file, 6);
            let mut builder = tar::Builder::new(encoder);
            append_members(&mut builder, members)?;
            builder.into_inner()?.finish()?;
        }
        ArchiveKind::Zip => unreachable!("handled above"),
    }
    Ok(())
}

pub fn write_zip(path: &Path, members: &[Member]) -> Result<()> {
    use zip::CompressionMethod;
    use zip::ZipWriter;
    use zip::write::FileOptions;

    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    for member in members {
        // MTIME, in zip's zone-less date form.
        let mut options: FileOptions<()> = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::from_date_and_time(2023, 11, 14, 22, 13, 20)?);
        if member.mode != 0 {
            options = options.unix_permissions(member.mode);
        }
        if member.is_dir {
            zip.add_directory(member.path.as_str(), options)?;
        } else {
            zip.start_file(member.path.as_str(), options)?;
            zip.write_all(&member.content)?;
        }
    }
    zip.finish()?;
    Ok(())
}
