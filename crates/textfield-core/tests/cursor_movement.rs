use pretty_assertions::assert_eq;
use std::time::Duration;
use textfield_core::{
    FieldConfig, FieldState, Key, MemoryClipboard, Modifiers, MonospaceMetrics, Motion, TextField,
};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn field_with(text: &str, width: f32, height: f32) -> TextField<'static> {
    let mut f = TextField::new(
        FieldConfig::multi_line(),
        MonospaceMetrics::unit(),
        MemoryClipboard::new(),
    )
    .unwrap();
    f.set_viewport(width, height);
    f.set_text(text);
    f.set_cursor(0);
    f.flush_notifications();
    f
}

#[test]
fn test_word_motion_with_keys() {
    let mut f = field_with("hello world, foo", 100.0, 10.0);
    let mut stops = Vec::new();
    while f.key_press(Key::Right, Modifiers::CTRL, ms(0)) {
        stops.push(f.cursor());
    }
    assert_eq!(stops, vec![6, 11, 13, 16]);

    let mut stops = Vec::new();
    while f.key_press(Key::Left, Modifiers::CTRL, ms(0)) {
        stops.push(f.cursor());
    }
    assert_eq!(stops, vec![13, 11, 6, 0]);
}

#[test]
fn test_char_motion_steps_code_points() {
    let mut f = field_with("aé😀b", 100.0, 10.0);
    let mut stops = Vec::new();
    while f.move_cursor(Motion::Right, false) {
        stops.push(f.cursor());
    }
    assert_eq!(stops, vec![1, 3, 7, 8]);
    f.move_cursor(Motion::Left, false);
    assert_eq!(f.cursor(), 7);
}

#[test]
fn test_shift_extends_and_plain_arrow_collapses() {
    let mut f = field_with("abcdef", 100.0, 10.0);
    f.set_cursor(2);
    f.key_press(Key::Right, Modifiers::SHIFT, ms(0));
    f.key_press(Key::Right, Modifiers::SHIFT, ms(0));
    assert_eq!(f.selection(), 2..4);
    assert_eq!(f.selected_text(), "cd");

    f.key_press(Key::Left, Modifiers::NONE, ms(0));
    assert_eq!(f.cursor(), 2);
    assert!(f.selection().is_empty());
}

#[test]
fn test_home_end_on_wrapped_rows() {
    let mut f = field_with("Hello World", 5.0, 10.0);
    f.set_cursor(8);
    f.key_press(Key::Home, Modifiers::NONE, ms(0));
    assert_eq!(f.cursor(), 6);
    f.key_press(Key::End, Modifiers::NONE, ms(0));
    assert_eq!(f.cursor(), 11);

    // End on a soft-wrapped row stays on that row, so Home comes back to its start.
    f.set_cursor(2);
    f.key_press(Key::End, Modifiers::NONE, ms(0));
    assert_eq!(f.cursor(), 5);
    assert_eq!(f.stats().cursor_row, 0);
    f.key_press(Key::Home, Modifiers::NONE, ms(0));
    assert_eq!(f.cursor(), 0);
}

#[test]
fn test_end_stops_before_hard_newline() {
    let mut f = field_with("first\nsecond", 100.0, 10.0);
    f.key_press(Key::End, Modifiers::NONE, ms(0));
    assert_eq!(f.cursor(), 5);
    f.key_press(Key::End, Modifiers::CTRL, ms(0));
    assert_eq!(f.cursor(), 12);
    f.key_press(Key::Home, Modifiers::CTRL, ms(0));
    assert_eq!(f.cursor(), 0);
}

#[test]
fn test_vertical_motion_keeps_preferred_x() {
    let mut f = field_with("abcdef\nab\nabcdef", 100.0, 10.0);
    f.set_cursor(5);

    f.key_press(Key::Down, Modifiers::NONE, ms(0));
    assert_eq!(f.cursor(), 9);
    assert_eq!(f.edit_state().preferred_x, Some(5.0));

    f.key_press(Key::Down, Modifiers::NONE, ms(0));
    assert_eq!(f.cursor(), 15);

    f.key_press(Key::Left, Modifiers::NONE, ms(0));
    assert_eq!(f.edit_state().preferred_x, None);
}

#[test]
fn test_vertical_motion_at_edges() {
    let mut f = field_with("abc\ndef", 100.0, 10.0);
    f.set_cursor(2);
    f.move_cursor(Motion::Up, false);
    assert_eq!(f.cursor(), 0);

    f.set_cursor(5);
    f.move_cursor(Motion::Down, false);
    assert_eq!(f.cursor(), 7);
}

#[test]
fn test_page_down_scrolls() {
    let mut f = field_with("0\n1\n2\n3\n4\n5", 100.0, 2.0);
    f.key_press(Key::PageDown, Modifiers::NONE, ms(0));
    assert_eq!(f.cursor(), 4);
    assert_eq!(f.scroll().top_row, 1);
    assert_eq!(f.scroll().top_byte_offset, 2);

    f.key_press(Key::PageUp, Modifiers::NONE, ms(0));
    assert_eq!(f.cursor(), 0);
    assert_eq!(f.scroll().top_row, 0);
}

#[test]
fn test_set_cursor_clamps_and_snaps() {
    let mut f = field_with("aé", 100.0, 10.0);
    f.set_cursor(99);
    assert_eq!(f.cursor(), 3);
    f.set_cursor(2);
    assert_eq!(f.cursor(), 1);
    f.set_selection(99, 2);
    assert_eq!(f.selection(), 1..3);
}

#[test]
fn test_multi_click_selects_word_then_line() {
    let mut f = field_with("hello world\nnext", 100.0, 10.0);

    f.mouse_press(7.2, 0.5, false, ms(0));
    f.mouse_release();
    assert_eq!(f.cursor(), 7);
    assert!(f.selection().is_empty());

    f.mouse_press(7.2, 0.5, false, ms(100));
    f.mouse_release();
    assert_eq!(f.selected_text(), "world");

    f.mouse_press(7.2, 0.5, false, ms(200));
    f.mouse_release();
    assert_eq!(f.selected_text(), "hello world");

    f.mouse_press(7.2, 0.5, false, ms(300));
    f.mouse_release();
    assert_eq!(f.selected_text(), "hello world");

    // Too late: back to caret placement.
    f.mouse_press(7.2, 0.5, false, ms(1000));
    f.mouse_release();
    assert!(f.selection().is_empty());
}

#[test]
fn test_drag_selects_range() {
    let mut f = field_with("hello world", 100.0, 10.0);
    f.mouse_press(1.0, 0.5, false, ms(0));
    assert_eq!(f.state(), FieldState::DraggingSelection);
    f.mouse_drag(4.0, 0.5, ms(20));
    assert_eq!(f.selected_text(), "ell");
    assert!(f.mouse_release());
    assert_eq!(f.state(), FieldState::Idle);
    assert!(!f.mouse_drag(6.0, 0.5, ms(40)));
}

#[test]
fn test_shift_click_extends() {
    let mut f = field_with("hello world", 100.0, 10.0);
    f.set_cursor(2);
    f.mouse_press(8.0, 0.5, true, ms(0));
    f.mouse_release();
    assert_eq!(f.selection(), 2..8);
}

#[test]
fn test_auto_scroll_while_dragging_below() {
    let mut f = field_with("0\n1\n2\n3\n4\n5\n6\n7\n8\n9", 100.0, 2.0);
    f.mouse_press(0.0, 0.0, false, ms(0));
    f.mouse_drag(0.0, 5.0, ms(0));
    assert_eq!(f.state(), FieldState::AutoScrolling);
    assert_eq!(f.selection(), 0..10);
    assert_eq!(f.next_deadline(), Some(ms(50)));

    assert!(f.fire_due(ms(50)));
    assert_eq!(f.scroll().top_row, 1);
    assert_eq!(f.selection(), 0..12);
    assert_eq!(f.next_deadline(), Some(ms(100)));

    // Back inside: auto-scroll stops.
    f.mouse_drag(0.0, 1.0, ms(60));
    assert_eq!(f.state(), FieldState::DraggingSelection);
    assert_eq!(f.next_deadline(), None);

    f.mouse_release();
    assert_eq!(f.state(), FieldState::Idle);
}
