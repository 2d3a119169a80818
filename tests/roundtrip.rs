use std::fs;
use std::path::Path;

use tarbox::header::{self, HeaderBlock};
use tarbox::{
    create_archive, extract_entries, find_header_offsets, list_entries, write_entries,
    write_entry, EntryType, Error, ReadOptions, ScanMode, SourceOptions, Trailer, WriteOptions,
};

fn write_options(root: &Path) -> WriteOptions {
    WriteOptions {
        source_root: Some(root.to_path_buf()),
        ..Default::default()
    }
}

fn read_options(destination: &Path) -> ReadOptions {
    ReadOptions {
        destination: destination.to_path_buf(),
        ..Default::default()
    }
}

#[test]
fn single_entry_hello() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let src = dir.path().join("src");
    let out = dir.path().join("out");
    fs::create_dir_all(&src)?;
    fs::create_dir_all(&out)?;
    fs::write(src.join("hello.txt"), b"hi")?;

    let archive = dir.path().join("hello.tar");
    write_entry(
        &archive,
        "hello.txt",
        2,
        1_000_000_000,
        EntryType::Regular,
        &write_options(&src),
    )?;

    let bytes = fs::read(&archive)?;
    let descriptor = header::decode(&bytes, 0)?;
    assert_eq!(descriptor.archive_name, "hello.txt");
    assert_eq!(descriptor.size, 2);
    assert_eq!(descriptor.modified_time, 1_000_000_000);
    assert_eq!(bytes[156], b'0');
    HeaderBlock::read(&bytes, 0)?.verify_checksum(0)?;

    let report = extract_entries(
        &archive,
        Some(bytes.len() as u64),
        false,
        false,
        &read_options(&out),
        &mut Vec::new(),
    )?;
    assert_eq!(report.files_written, 1);
    assert_eq!(fs::read(out.join("hello.txt"))?, b"hi");
    Ok(())
}

#[test]
fn manifest_file_and_directory() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let src = dir.path().join("src");
    let out = dir.path().join("out");
    fs::create_dir_all(&src)?;
    fs::create_dir_all(&out)?;
    fs::write(src.join("readme.txt"), b"read me")?;

    let manifest = dir.path().join("entries.manifest");
    fs::write(
        &manifest,
        "part-1:readme.txt:7:1000000000:0\npart-2:assets:0:1000000000:5\n",
    )?;
    let archive = dir.path().join("bundle.tar");
    assert_eq!(write_entries(&archive, &manifest, &write_options(&src))?, 2);

    let bytes = fs::read(&archive)?;
    let offsets = find_header_offsets(&bytes, Some(bytes.len() as u64), ScanMode::Walk)?;
    assert_eq!(offsets.len(), 2);
    assert_eq!(header::decode(&bytes, offsets[0])?.archive_name, "readme.txt");
    let directory = header::decode(&bytes, offsets[1])?;
    assert_eq!(directory.entry_type, EntryType::Directory);
    assert_eq!(directory.size, 0);
    // header only: the trailer follows the directory header directly
    assert!(bytes[offsets[1] + 512..].iter().all(|b| *b == 0));

    let options = read_options(&out);
    extract_entries(&archive, None, false, false, &options, &mut Vec::new())?;
    assert!(out.join("assets").is_dir());
    assert_eq!(fs::read(out.join("readme.txt"))?, b"read me");

    fs::write(out.join("readme.txt"), b"local edit")?;
    let report = extract_entries(&archive, None, false, false, &options, &mut Vec::new())?;
    assert_eq!(report.files_skipped, 1);
    assert_eq!(fs::read(out.join("readme.txt"))?, b"local edit");
    Ok(())
}

#[test]
fn manifest_order_is_preserved() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut lines = String::new();
    let names: Vec<String> = (0..6).map(|i| format!("file-{}.dat", 5 - i)).collect();
    for (i, name) in names.iter().enumerate() {
        let contents = vec![b'a' + i as u8; i * 300];
        fs::write(dir.path().join(name), &contents)?;
        lines.push_str(&format!("p{}:{}:{}:{}:0\n", i, name, contents.len(), 1_600_000_000 + i));
    }
    let manifest = dir.path().join("m.txt");
    fs::write(&manifest, lines)?;
    let archive = dir.path().join("ordered.tar");
    write_entries(&archive, &manifest, &write_options(dir.path()))?;

    let bytes = fs::read(&archive)?;
    for mode in [ScanMode::Walk, ScanMode::Magic] {
        let offsets = find_header_offsets(&bytes, None, mode)?;
        let decoded: Vec<String> = offsets
            .iter()
            .map(|offset| header::decode(&bytes, *offset).map(|d| d.archive_name))
            .collect::<Result<_, _>>()?;
        assert_eq!(decoded, names);
    }
    Ok(())
}

#[test]
fn malformed_manifest_writes_nothing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let manifest = dir.path().join("bad.manifest");
    fs::write(&manifest, "p1:dir:0:0:5\np2:missing-fields:0\n")?;
    let archive = dir.path().join("bad.tar");
    let error = match write_entries(&archive, &manifest, &write_options(dir.path())) {
        Ok(_) => anyhow::bail!("malformed manifest was accepted"),
        Err(error) => error,
    };
    assert!(matches!(error, Error::Manifest { line: 2, .. }));
    assert_eq!(error.status_code(), 2);
    assert!(!archive.exists());
    Ok(())
}

#[test]
fn legacy_archive_with_magic_scan() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("a.txt"), b"alpha")?;
    fs::write(dir.path().join("b.txt"), b"")?;
    let manifest = dir.path().join("m");
    fs::write(&manifest, "x:a.txt:5:1000000000:0\ny:b.txt:0:1000000000:0\n")?;
    let archive = dir.path().join("legacy.tar");
    let options = WriteOptions {
        trailer: Trailer::Legacy,
        ..write_options(dir.path())
    };
    write_entries(&archive, &manifest, &options)?;

    let bytes = fs::read(&archive)?;
    assert_eq!(bytes.len(), 1024 + 1024 + 1537);

    let read = ReadOptions {
        scan_mode: ScanMode::Magic,
        verify_checksums: true,
        ..read_options(dir.path())
    };
    let mut out = Vec::new();
    let entries = list_entries(&archive, Some(bytes.len() as u64), false, &read, &mut out)?;
    assert_eq!(entries.len(), 2);
    assert_eq!(String::from_utf8(out)?.lines().count(), 2);
    Ok(())
}

#[test]
fn gzip_create_and_extract() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let tree = dir.path().join("tree");
    fs::create_dir_all(tree.join("nested"))?;
    fs::write(tree.join("nested/deep.txt"), b"deep")?;
    fs::write(tree.join("top.txt"), vec![b'x'; 1500])?;

    let archive = dir.path().join("tree.tar.gz");
    let options = WriteOptions {
        gzip: true,
        ..Default::default()
    };
    let count = create_archive(
        &archive,
        &[tree.clone()],
        &SourceOptions { flat: true },
        &options,
    )?;
    assert_eq!(count, 4);
    assert_eq!(&fs::read(&archive)?[..2], &[0x1f, 0x8b]);

    let out = dir.path().join("out");
    fs::create_dir_all(&out)?;
    let report = extract_entries(&archive, None, true, true, &read_options(&out), &mut Vec::new())?;
    assert_eq!(report.directories_created, 2);
    assert_eq!(report.files_written, 2);
    assert_eq!(fs::read(out.join("tree/nested/deep.txt"))?, b"deep");
    assert_eq!(fs::read(out.join("tree/top.txt"))?.len(), 1500);
    Ok(())
}

#[test]
fn corrupted_header_fails_strict_read() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let archive = dir.path().join("d.tar");
    write_entry(
        &archive,
        "some-dir",
        0,
        1_000_000_000,
        EntryType::Directory,
        &WriteOptions::default(),
    )?;
    let mut bytes = fs::read(&archive)?;
    bytes[0] = b'S';
    fs::write(&archive, &bytes)?;

    let strict = ReadOptions {
        verify_checksums: true,
        ..read_options(dir.path())
    };
    let result = list_entries(&archive, None, false, &strict, &mut Vec::new());
    assert!(matches!(result, Err(Error::ChecksumMismatch { .. })));

    // without verification the entry still lists
    let entries = list_entries(&archive, None, false, &read_options(dir.path()), &mut Vec::new())?;
    assert_eq!(entries[0].descriptor.archive_name, "Some-dir");
    Ok(())
}

#[test]
fn oversized_manifest_size_is_a_mismatch() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("a.txt"), b"hi")?;
    let manifest = dir.path().join("huge.manifest");
    fs::write(&manifest, "p:a.txt:8589934591:0:0\n")?;
    let archive = dir.path().join("huge.tar");
    let error = match write_entries(&archive, &manifest, &write_options(dir.path())) {
        Ok(_) => anyhow::bail!("a 2 byte file was accepted for an 8 GiB entry"),
        Err(error) => error,
    };
    assert!(matches!(
        error,
        Error::SizeMismatch {
            declared: 8_589_934_591,
            actual: 2,
            ..
        }
    ));
    assert_eq!(error.status_code(), 2);
    assert!(!archive.exists());
    Ok(())
}

#[test]
fn sized_directories_pass_strict_read() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    for (size, posix_adjust) in [(4096, false), (4096, true), (0o70000, true), (0o70000, false)] {
        let archive = dir.path().join(format!("dir-{}-{}.tar", size, posix_adjust));
        let options = WriteOptions {
            posix_adjust,
            ..Default::default()
        };
        write_entry(&archive, "assets", size, 1_000_000_000, EntryType::Directory, &options)?;

        let strict = ReadOptions {
            verify_checksums: true,
            ..read_options(dir.path())
        };
        let entries = list_entries(&archive, None, false, &strict, &mut Vec::new())?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].descriptor.entry_type, EntryType::Directory);
    }
    Ok(())
}

#[test]
fn directory_failure_does_not_stop_extraction() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let src = dir.path().join("src");
    let out = dir.path().join("out");
    fs::create_dir_all(&src)?;
    fs::create_dir_all(&out)?;
    fs::write(src.join("notes.txt"), b"notes")?;
    let manifest = dir.path().join("m");
    fs::write(
        &manifest,
        "d:blocked:0:1000000000:5\nf:notes.txt:5:1000000000:0\n",
    )?;
    let archive = dir.path().join("mixed.tar");
    write_entries(&archive, &manifest, &write_options(&src))?;

    // a regular file where the directory should go
    fs::write(out.join("blocked"), b"")?;
    let report = extract_entries(&archive, None, false, false, &read_options(&out), &mut Vec::new())?;
    assert_eq!(report.directory_failures, 1);
    assert_eq!(report.files_written, 1);
    assert_eq!(fs::read(out.join("notes.txt"))?, b"notes");
    assert!(out.join("blocked").is_file());
    Ok(())
}
