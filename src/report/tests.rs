use super::*;
use crate::tally::{CountReport, Histogram};

fn report(pre: &[u8], post: &[u8]) -> CountReport {
    CountReport {
        epoch: 0,
        pre: Histogram::from_bytes(pre),
        post: Histogram::from_bytes(post),
    }
}

#[test]
fn test_render_basic() {
    let text = render_to_string(&report(b"aba", b"bcz"));
    assert_eq!(
        text,
        "Total input count with current key is 3\n\
         a:2 b:1\n\
         Total output count with current key is 3\n\
         b:1 c:1 z:1\n"
    );
}

#[test]
fn test_render_empty_window() {
    let text = render_to_string(&CountReport::default());
    assert_eq!(
        text,
        "Total input count with current key is 0\n\n\
         Total output count with current key is 0\n\n"
    );
}

#[test]
fn test_render_non_graphic_bytes_as_hex() {
    let text = render_to_string(&report(b" \n\xff", b""));
    let second = text.lines().nth(1).unwrap();
    assert_eq!(second, "0x0a:1 0x20:1 0xff:1");
}

#[test]
fn test_render_large_counts() {
    let data = vec![b'Q'; 12_345];
    let text = render_to_string(&report(&data, &data));
    assert!(text.contains("is 12345\nQ:12345\n"));
}

#[test]
fn test_render_propagates_write_error() {
    struct Broken;
    impl std::io::Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("broken"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
    assert!(render(&report(b"a", b"b"), &mut Broken).is_err());
}
