//! Integration tests for the segment providers.

use crate::{FileProvider, MemoryProvider, ProviderError, SegmentProvider};

#[test]
fn file_provider_full_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("segment0.ts");
    std::fs::write(&path, b"livereel segment data").unwrap();

    let provider = FileProvider::new();
    let handle = provider.open(path.to_str().unwrap()).unwrap();

    assert_eq!(provider.length(&handle).unwrap(), Some(21));

    let mut buf = [0u8; 8];
    let n = provider.read_at(&handle, 0, &mut buf).unwrap();
    assert_eq!(n, 8);
    assert_eq!(&buf, b"livereel");

    provider.close(handle).unwrap();
}

#[test]
fn file_provider_read_at_boundaries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boundaries.ts");
    let data: Vec<u8> = (0..=255u8).collect();
    std::fs::write(&path, &data).unwrap();

    let provider = FileProvider::new();
    let handle = provider.open(path.to_str().unwrap()).unwrap();

    // Read from middle
    let mut buf = [0u8; 10];
    let n = provider.read_at(&handle, 100, &mut buf).unwrap();
    assert_eq!(n, 10);
    assert_eq!(&buf, &[100, 101, 102, 103, 104, 105, 106, 107, 108, 109]);

    // Partial read near end
    let n = provider.read_at(&handle, 250, &mut buf).unwrap();
    assert_eq!(n, 6);
    assert_eq!(&buf[..6], &[250, 251, 252, 253, 254, 255]);

    // Read past end is exhaustion, not an error
    let n = provider.read_at(&handle, 1000, &mut buf).unwrap();
    assert_eq!(n, 0);

    provider.close(handle).unwrap();
}

#[test]
fn file_provider_missing_segment() {
    let provider = FileProvider::new();
    let err = provider.open("/nonexistent/segment.ts").unwrap_err();
    assert!(matches!(err, ProviderError::NotFound { .. }));
}

#[test]
fn file_provider_sees_appended_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("growing.ts");
    std::fs::write(&path, b"first").unwrap();

    let provider = FileProvider::new();
    let handle = provider.open(path.to_str().unwrap()).unwrap();
    assert_eq!(provider.length(&handle).unwrap(), Some(5));

    // Append through a second writer, as the external transfer would
    use std::io::Write;
    let mut writer = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    writer.write_all(b" second").unwrap();
    writer.flush().unwrap();

    assert_eq!(provider.length(&handle).unwrap(), Some(12));
    let mut buf = [0u8; 7];
    let n = provider.read_at(&handle, 5, &mut buf).unwrap();
    assert_eq!(n, 7);
    assert_eq!(&buf, b" second");

    provider.close(handle).unwrap();
}

#[test]
fn memory_provider_sealed_segment() {
    let provider = MemoryProvider::new();
    provider.create("mem://a", b"0123456789");

    let handle = provider.open("mem://a").unwrap();
    assert_eq!(provider.length(&handle).unwrap(), Some(10));

    let mut buf = [0u8; 4];
    let n = provider.read_at(&handle, 3, &mut buf).unwrap();
    assert_eq!(n, 4);
    assert_eq!(&buf, b"3456");

    provider.close(handle).unwrap();
}

#[test]
fn memory_provider_live_segment_grows() {
    let provider = MemoryProvider::new();
    provider.create_live("mem://live");

    let handle = provider.open("mem://live").unwrap();
    assert_eq!(provider.length(&handle).unwrap(), None);

    let mut buf = [0u8; 8];
    assert_eq!(provider.read_at(&handle, 0, &mut buf).unwrap(), 0);

    provider.extend("mem://live", b"abcdef").unwrap();
    assert_eq!(provider.read_at(&handle, 0, &mut buf).unwrap(), 6);
    assert_eq!(&buf[..6], b"abcdef");

    // Still unknown length until sealed
    assert_eq!(provider.length(&handle).unwrap(), None);

    provider.seal("mem://live").unwrap();
    assert_eq!(provider.length(&handle).unwrap(), Some(6));

    // Sealed segments reject further growth
    assert!(provider.extend("mem://live", b"x").is_err());

    provider.close(handle).unwrap();
}

#[test]
fn memory_provider_closed_handle_is_invalid() {
    let provider = MemoryProvider::new();
    provider.create("mem://a", b"data");

    let handle = provider.open("mem://a").unwrap();
    let id = handle.id();
    provider.close(handle).unwrap();

    // Re-opening works; the old handle id is gone
    let fresh = provider.open("mem://a").unwrap();
    assert_ne!(fresh.id(), id);
    provider.close(fresh).unwrap();
}
