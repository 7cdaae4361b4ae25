use super::*;

fn run(t: &mut impl ByteTransform, input: &[u8]) -> Vec<u8> {
    input.iter().map(|&b| t.apply(b)).collect()
}

#[test]
fn test_shift_alternates_direction() {
    let mut c = ShiftCipher::new(1);
    // a -> b (forward), a -> z (backward), a -> b (forward)
    assert_eq!(run(&mut c, b"aaa"), b"bzb");
}

#[test]
fn test_shift_preserves_case() {
    let mut c = ShiftCipher::new(3);
    assert_eq!(run(&mut c, b"Ab"), b"Dy");
}

#[test]
fn test_shift_wraps_alphabet() {
    let mut c = ShiftCipher::new(2);
    assert_eq!(run(&mut c, b"zA"), b"bY");
}

#[test]
fn test_shift_non_letters_pass_through_without_flipping() {
    let mut c = ShiftCipher::new(1);
    assert_eq!(run(&mut c, b"a 1!\na"), b"b 1!\nz");
}

#[test]
fn test_shift_key_reduced_modulo_26() {
    assert_eq!(ShiftCipher::new(27).key(), 1);
    let mut c = ShiftCipher::new(26);
    assert_eq!(run(&mut c, b"Hello"), b"Hello");
}

#[test]
fn test_shift_fresh_cipher_restarts_alternation() {
    let mut c = ShiftCipher::new(4);
    c.apply(b'a');
    let mut fresh = ShiftCipher::new(4);
    assert_eq!(fresh.apply(b'a'), b'e');
}

#[test]
fn test_next_key_stays_in_alphabet() {
    let mut key = 1;
    for _ in 0..100 {
        key = ShiftCipher::next_key(key);
        assert!(key < 26);
    }
    assert_eq!(ShiftCipher::next_key(1), 10);
}

#[test]
fn test_offset_wraps() {
    let mut c = OffsetCipher(1);
    assert_eq!(run(&mut c, &[0x41, 0xFF]), vec![0x42, 0x00]);
}

#[test]
fn test_closure_is_a_transform() {
    let mut upper = |b: u8| b.to_ascii_uppercase();
    assert_eq!(run(&mut upper, b"abc"), b"ABC");
}
