use super::*;

#[test]
fn test_new_tally_is_empty() {
    assert!(Tally::new().snapshot().is_empty());
}

#[test]
fn test_record_counts_per_byte() {
    let tally = Tally::new();
    for &b in b"abca" {
        tally.record(b);
    }
    let h = tally.snapshot();
    assert_eq!(h.get(b'a'), 2);
    assert_eq!(h.get(b'b'), 1);
    assert_eq!(h.get(b'c'), 1);
    assert_eq!(h.get(b'd'), 0);
    assert_eq!(h.total(), 4);
}

#[test]
fn test_snapshot_does_not_zero() {
    let tally = Tally::new();
    tally.record(0);
    tally.snapshot();
    assert_eq!(tally.snapshot().get(0), 1);
}

#[test]
fn test_take_zeroes() {
    let tally = Tally::new();
    tally.record(0xFF);
    tally.record(0xFF);
    let taken = tally.take();
    assert_eq!(taken.get(0xFF), 2);
    assert!(tally.snapshot().is_empty());
}

#[test]
fn test_histogram_from_bytes_matches_tally() {
    let data = b"hello, world";
    let tally = Tally::new();
    for &b in data {
        tally.record(b);
    }
    assert_eq!(tally.snapshot(), Histogram::from_bytes(data));
}

#[test]
fn test_nonzero_in_byte_order() {
    let h = Histogram::from_bytes(b"zaz\x00");
    let entries: Vec<_> = h.nonzero().collect();
    assert_eq!(entries, vec![(0, 1), (b'a', 1), (b'z', 2)]);
}

#[test]
fn test_merge() {
    let mut a = Histogram::from_bytes(b"ab");
    a.merge(&Histogram::from_bytes(b"bc"));
    assert_eq!(a, Histogram::from_bytes(b"abbc"));
}

#[test]
fn test_histogram_debug_lists_only_seen_bytes() {
    let h = Histogram::from_bytes(b"AA");
    assert_eq!(format!("{:?}", h), "{\"0x41\": 2}");
}
