use pretty_assertions::assert_eq;
use std::time::Duration;
use textfield_core::{FieldConfig, Key, MemoryClipboard, Modifiers, MonospaceMetrics, TextField};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn field(config: FieldConfig) -> TextField<'static> {
    TextField::new(config, MonospaceMetrics::unit(), MemoryClipboard::new()).unwrap()
}

#[test]
fn test_insertions_within_window_merge() {
    let mut f = field(FieldConfig::multi_line());
    for i in 0..10 {
        f.insert_text("x", ms(i * 100));
    }
    assert_eq!(f.undo_depth(), 1);
}

#[test]
fn test_insertions_beyond_window_do_not_merge() {
    let mut f = field(FieldConfig::multi_line());
    for i in 0..10 {
        f.insert_text("x", ms(i * 600));
    }
    assert_eq!(f.undo_depth(), 10);
}

#[test]
fn test_merge_window_is_measured_from_previous_edit() {
    let mut f = field(FieldConfig::multi_line());
    for t in [0, 400, 800, 1200] {
        f.insert_text("x", ms(t));
    }
    assert_eq!(f.undo_depth(), 1);
}

#[test]
fn test_backspace_burst_restores_cursor_to_start() {
    let mut f = field(FieldConfig::multi_line());
    f.insert_text("hello", ms(0));
    for t in [2000, 2100, 2200] {
        f.key_press(Key::Backspace, Modifiers::NONE, ms(t));
    }
    assert_eq!(f.text(), "he");
    assert_eq!(f.undo_depth(), 2);

    assert!(f.undo());
    assert_eq!(f.text(), "hello");
    assert_eq!(f.cursor(), 2);
}

#[test]
fn test_forward_delete_burst_merges() {
    let mut f = field(FieldConfig::multi_line());
    f.set_text("abcdef");
    f.set_cursor(1);
    for t in [0, 50, 100] {
        f.delete_forward(ms(t));
    }
    assert_eq!(f.text(), "aef");

    assert!(f.undo());
    assert_eq!(f.text(), "abcdef");
    assert_eq!(f.cursor(), 1);
}

#[test]
fn test_undo_redo_insert_inverse() {
    let mut f = field(FieldConfig::multi_line());
    f.set_text("abc");
    f.set_cursor(1);

    f.insert_text("XY", ms(0));
    assert_eq!((f.text(), f.cursor()), ("aXYbc", 3));

    assert!(f.undo());
    assert_eq!((f.text(), f.cursor()), ("abc", 1));

    assert!(f.redo());
    assert_eq!((f.text(), f.cursor()), ("aXYbc", 3));
    assert!(!f.redo());
}

#[test]
fn test_overwrite_typing_records_one_replace() {
    let mut f = field(FieldConfig::multi_line());
    f.set_text("abcd");
    f.set_cursor(1);
    assert!(f.toggle_overwrite());

    f.insert_text("X", ms(0));
    f.insert_text("Y", ms(50));
    assert_eq!(f.text(), "aXYd");
    assert_eq!(f.undo_depth(), 2);

    assert!(f.undo());
    assert_eq!(f.text(), "abcd");
    assert_eq!(f.cursor(), 3);

    assert!(f.redo());
    assert_eq!(f.text(), "aXYd");
}

#[test]
fn test_overwrite_does_not_consume_newline() {
    let mut f = field(FieldConfig::multi_line());
    f.set_text("ab\ncd");
    f.set_cursor(2);
    f.key_press(Key::Insert, Modifiers::NONE, ms(0));
    f.insert_text("X", ms(10));
    assert_eq!(f.text(), "abX\ncd");
}

#[test]
fn test_paste_is_its_own_step() {
    let clipboard = MemoryClipboard::with_text("bc");
    let mut f =
        TextField::new(FieldConfig::multi_line(), MonospaceMetrics::unit(), clipboard).unwrap();

    f.insert_text("a", ms(0));
    assert!(f.key_press(Key::Char('v'), Modifiers::CTRL, ms(10)));
    f.insert_text("d", ms(20));
    assert_eq!(f.text(), "abcd");
    assert_eq!(f.undo_depth(), 3);
}

#[test]
fn test_typing_over_selection_deletes_first() {
    let mut f = field(FieldConfig::multi_line());
    f.set_text("Hello World");
    f.set_selection(0, 5);

    f.insert_text("J", ms(0));
    assert_eq!(f.text(), "J World");
    assert_eq!(f.undo_depth(), 3);

    f.undo();
    assert_eq!(f.text(), " World");
    f.undo();
    assert_eq!(f.text(), "Hello World");
    assert_eq!(f.cursor(), 0);
}

#[test]
fn test_new_edit_clears_redo() {
    let mut f = field(FieldConfig::multi_line());
    f.insert_text("a", ms(0));
    f.undo();
    assert_eq!(f.redo_depth(), 1);
    f.insert_text("b", ms(1000));
    assert_eq!(f.redo_depth(), 0);
    assert!(!f.redo());
}

#[test]
fn test_empty_log_is_silent_noop() {
    let mut f = field(FieldConfig::multi_line());
    assert!(!f.undo());
    assert!(!f.redo());
    assert!(!f.flush_notifications());
}

#[test]
fn test_zero_budget_disables_undo() {
    let mut f = field(FieldConfig {
        max_undo_bytes: Some(0),
        ..FieldConfig::multi_line()
    });
    assert!(f.insert_text("abc", ms(0)));
    assert_eq!(f.undo_depth(), 0);
    assert!(!f.undo());
    assert_eq!(f.text(), "abc");
}

#[test]
fn test_password_has_no_undo_by_default() {
    let mut f = field(FieldConfig::password());
    f.insert_text("secret", ms(0));
    assert!(!f.undo());
    assert_eq!(f.text(), "secret");
}

#[test]
fn test_small_budget_evicts_oldest() {
    let mut f = field(FieldConfig {
        max_undo_bytes: Some(20),
        ..FieldConfig::multi_line()
    });
    f.insert_text("a", ms(0));
    f.insert_text("b", ms(1000));
    assert_eq!(f.undo_depth(), 1);

    assert!(f.undo());
    assert_eq!(f.text(), "a");
    assert!(!f.undo());
    assert_eq!(f.text(), "a");
}

#[test]
fn test_oversized_edit_still_succeeds() {
    let mut f = field(FieldConfig {
        max_undo_bytes: Some(20),
        ..FieldConfig::multi_line()
    });
    f.insert_text("abcdefghij", ms(0));
    f.select_all();
    assert!(f.delete_backward(ms(1000)));
    assert_eq!(f.text(), "");
    assert_eq!(f.undo_depth(), 0);
}

#[test]
fn test_read_only_rejects_everything() {
    let mut f = field(FieldConfig {
        read_only: true,
        ..FieldConfig::multi_line()
    });
    f.set_text("fixed");
    f.set_cursor(5);
    assert!(!f.insert_text("x", ms(0)));
    assert!(!f.delete_backward(ms(10)));
    assert!(!f.undo());
    assert_eq!(f.text(), "fixed");
}
