use pretty_assertions::assert_eq;
use std::time::Duration;
use textfield_core::{ConfigError, FieldConfig, MemoryClipboard, MonospaceMetrics, TextField};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn fixed_field<'a>(storage: &'a mut [u8], initial: &str) -> TextField<'a> {
    storage[..initial.len()].copy_from_slice(initial.as_bytes());
    TextField::with_fixed_buffer(
        FieldConfig::multi_line(),
        storage,
        initial.len(),
        MonospaceMetrics::unit(),
        MemoryClipboard::new(),
    )
    .unwrap()
}

#[test]
fn test_construction_errors() {
    let mut small = [0u8; 4];
    let err = TextField::with_fixed_buffer(
        FieldConfig::multi_line(),
        &mut small,
        5,
        MonospaceMetrics::unit(),
        MemoryClipboard::new(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        ConfigError::InitialTextTooLarge {
            len: 5,
            capacity: 4
        }
    );

    let mut invalid = [b'a', 0xff];
    let err = TextField::with_fixed_buffer(
        FieldConfig::multi_line(),
        &mut invalid,
        2,
        MonospaceMetrics::unit(),
        MemoryClipboard::new(),
    )
    .unwrap_err();
    assert_eq!(err, ConfigError::InitialTextNotUtf8(1));
}

#[test]
fn test_initial_text_must_fit_row_limit() {
    let initial = b"ab\ncd";
    let mut storage = [0u8; 16];
    storage[..initial.len()].copy_from_slice(initial);
    let err = TextField::with_fixed_buffer(
        FieldConfig::single_line(),
        &mut storage,
        initial.len(),
        MonospaceMetrics::unit(),
        MemoryClipboard::new(),
    )
    .unwrap_err();
    assert_eq!(err, ConfigError::InitialTextExceedsRows { rows: 2, limit: 1 });
    assert_eq!(err.to_string(), "initial text spans 2 rows but the field allows 1");

    let bounded = FieldConfig {
        max_rows: 2,
        ..FieldConfig::multi_line()
    };
    let f = TextField::with_fixed_buffer(
        bounded,
        &mut storage,
        initial.len(),
        MonospaceMetrics::unit(),
        MemoryClipboard::new(),
    )
    .unwrap();
    assert_eq!(f.row_count(), 2);
    assert_eq!(f.text(), "ab\ncd");
}

#[test]
fn test_edits_land_in_caller_storage() {
    let mut storage = [0u8; 16];
    let mut f = fixed_field(&mut storage, "abc");
    assert_eq!(f.capacity(), 16);
    f.set_cursor(3);
    assert!(f.insert_text("d", ms(0)));
    assert_eq!(f.text(), "abcd");
    drop(f);
    assert_eq!(&storage[..4], b"abcd");
}

#[test]
fn test_typing_stops_when_full() {
    let mut storage = [0u8; 3];
    let mut f = fixed_field(&mut storage, "");
    for (i, ch) in ["a", "b", "c"].into_iter().enumerate() {
        assert!(f.insert_text(ch, ms(i as u64 * 10)));
    }
    assert!(!f.insert_text("d", ms(40)));
    assert_eq!(f.text(), "abc");
    assert_eq!(f.undo_depth(), 1);

    // Deleting makes room again.
    assert!(f.delete_backward(ms(1000)));
    assert!(!f.insert_text("é", ms(1010)));
    assert!(f.insert_text("z", ms(1020)));
    assert_eq!(f.text(), "abz");
}

#[test]
fn test_set_text_too_large_is_rejected() {
    let mut storage = [0u8; 8];
    let mut f = fixed_field(&mut storage, "short");
    let depth = f.undo_depth();
    assert!(!f.set_text("123456789"));
    assert_eq!(f.text(), "short");
    assert_eq!(f.undo_depth(), depth);
    assert!(f.set_text("12345678"));
    assert_eq!(f.text(), "12345678");
}

#[test]
fn test_equal_size_replacement_fits() {
    let mut storage = [0u8; 11];
    let mut f = fixed_field(&mut storage, "Hello World");
    f.set_selection(6, 11);
    assert!(f.insert_text("Earth", ms(0)));
    assert_eq!(f.text(), "Hello Earth");

    assert!(f.undo());
    assert!(f.undo());
    assert_eq!(f.text(), "Hello World");
}

#[test]
fn test_oversize_replacement_keeps_selection() {
    let mut storage = [0u8; 11];
    let mut f = fixed_field(&mut storage, "Hello World");
    f.set_selection(6, 11);
    assert!(!f.insert_text("Universe", ms(0)));
    assert_eq!(f.text(), "Hello World");
    assert_eq!(f.selection(), 6..11);
    assert_eq!(f.undo_depth(), 0);
}
