use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

fn counting_accessors(reads: Arc<AtomicUsize>, writes: Arc<AtomicUsize>) -> (ReadMemoryFn, WriteMemoryFn) {
    let read: ReadMemoryFn = Arc::new(move |buf: &[u8], off: usize, size: usize| {
        reads.fetch_add(1, Ordering::Relaxed);
        read_direct(buf, off, size)
    });
    let write: WriteMemoryFn = Arc::new(move |buf: &mut [u8], off: usize, v: u32, size: usize| {
        writes.fetch_add(1, Ordering::Relaxed);
        write_direct(buf, off, v, size);
    });
    (read, write)
}

#[test]
fn direct_access_uses_native_byte_order() {
    let mut buf = vec![0u8; 8];
    DirectAccess.write(&mut buf, 4, 0x1122_3344, 4);
    assert_eq!(&buf[4..], &0x1122_3344u32.to_ne_bytes());
    assert_eq!(DirectAccess.read(&buf, 4, 4), 0x1122_3344);
    DirectAccess.write(&mut buf, 0, 0xbeef, 2);
    assert_eq!(DirectAccess.read(&buf, 0, 2), 0xbeef);
    DirectAccess.write(&mut buf, 2, 0x1ab, 1);
    assert_eq!(DirectAccess.read(&buf, 2, 1), 0xab);
}

#[test]
fn wrapped_access_matches_direct_access() {
    let reads = Arc::new(AtomicUsize::new(0));
    let writes = Arc::new(AtomicUsize::new(0));
    let (read, write) = counting_accessors(reads.clone(), writes.clone());
    let wrapped = WrappedAccess {
        read: Some(&read),
        write: Some(&write),
    };

    let mut a = vec![0u8; 16];
    let mut b = vec![0u8; 16];
    for (i, size) in [(0usize, 4usize), (4, 2), (6, 1), (8, 4)] {
        DirectAccess.write(&mut a, i, 0xdead_beef, size);
        wrapped.write(&mut b, i, 0xdead_beef, size);
    }
    assert_eq!(a, b);
    assert_eq!(wrapped.read(&b, 8, 4), DirectAccess.read(&a, 8, 4));
    assert_eq!(writes.load(Ordering::Relaxed), 4);
    assert_eq!(reads.load(Ordering::Relaxed), 1);
}

#[test]
fn bulk_operations_go_byte_by_byte_through_accessors() {
    let reads = Arc::new(AtomicUsize::new(0));
    let writes = Arc::new(AtomicUsize::new(0));
    let (read, write) = counting_accessors(reads.clone(), writes.clone());
    let wrapped = WrappedAccess {
        read: Some(&read),
        write: Some(&write),
    };

    let src: Vec<u8> = (0..10).collect();
    let mut dst = vec![0u8; 12];
    wrapped.copy_wrapped(&mut dst, 2, &src, 1, 6);
    assert_eq!(dst, vec![0, 0, 1, 2, 3, 4, 5, 6, 0, 0, 0, 0]);
    assert_eq!(reads.load(Ordering::Relaxed), 6);
    assert_eq!(writes.load(Ordering::Relaxed), 6);

    wrapped.fill_wrapped(&mut dst, 8, 0x7f, 4);
    assert_eq!(&dst[8..], &[0x7f; 4]);
    assert_eq!(writes.load(Ordering::Relaxed), 10);

    let mut direct = vec![0u8; 12];
    DirectAccess.copy_wrapped(&mut direct, 2, &src, 1, 6);
    DirectAccess.fill_wrapped(&mut direct, 8, 0x7f, 4);
    assert_eq!(direct, dst);
}

#[test]
fn missing_side_falls_back_to_direct() {
    let reads = Arc::new(AtomicUsize::new(0));
    let writes = Arc::new(AtomicUsize::new(0));
    let (read, _) = counting_accessors(reads.clone(), writes);
    let read_only = WrappedAccess {
        read: Some(&read),
        write: None,
    };
    let mut buf = vec![0u8; 4];
    read_only.write(&mut buf, 0, 0x0102_0304, 4);
    assert_eq!(read_only.read(&buf, 0, 4), 0x0102_0304);
    assert_eq!(reads.load(Ordering::Relaxed), 1);
}
