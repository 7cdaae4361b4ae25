use std::io::{self, Write};

use crate::tally::{CountReport, Histogram};

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Write the log text for one report window.
///
/// ```text
/// Total input count with current key is 3
/// a:2 b:1
/// Total output count with current key is 3
/// b:1 c:1 z:1
/// ```
///
/// Only bytes seen at least once are listed, in byte order. Graphic ASCII
/// is written as itself, anything else as `0xNN`.
pub fn render(report: &CountReport, out: &mut impl Write) -> io::Result<()> {
    render_side("input", &report.pre, out)?;
    render_side("output", &report.post, out)
}

pub fn render_to_string(report: &CountReport) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = render(report, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn render_side(label: &str, histogram: &Histogram, out: &mut impl Write) -> io::Result<()> {
    let mut itoa_buf = itoa::Buffer::new();
    let mut line = Vec::with_capacity(64);

    line.extend_from_slice(b"Total ");
    line.extend_from_slice(label.as_bytes());
    line.extend_from_slice(b" count with current key is ");
    line.extend_from_slice(itoa_buf.format(histogram.total()).as_bytes());
    line.push(b'\n');

    for (i, (b, count)) in histogram.nonzero().enumerate() {
        if i > 0 {
            line.push(b' ');
        }
        push_symbol(&mut line, b);
        line.push(b':');
        line.extend_from_slice(itoa_buf.format(count).as_bytes());
    }
    line.push(b'\n');

    out.write_all(&line)
}

#[inline]
fn push_symbol(line: &mut Vec<u8>, b: u8) {
    if b.is_ascii_graphic() {
        line.push(b);
    } else {
        line.extend_from_slice(&[b'0', b'x', HEX[(b >> 4) as usize], HEX[(b & 0x0F) as usize]]);
    }
}
