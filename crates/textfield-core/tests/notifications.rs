use pretty_assertions::assert_eq;
use std::ops::Range;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use textfield_core::{
    ChangePayload, FieldConfig, FieldStats, MemoryClipboard, MonospaceMetrics, NotifyMode,
    PASSWORD_MASK, TextField,
};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn field(config: FieldConfig) -> TextField<'static> {
    TextField::new(config, MonospaceMetrics::unit(), MemoryClipboard::new()).unwrap()
}

fn recorder(f: &mut TextField<'_>) -> Arc<Mutex<Vec<ChangePayload>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    f.subscribe(move |payload| sink.lock().unwrap().push(payload.clone()));
    seen
}

#[test]
fn test_changes_are_queued_until_flush() {
    let mut f = field(FieldConfig::multi_line());
    let seen = recorder(&mut f);

    f.insert_text("a", ms(0));
    f.insert_text("b", ms(10));
    assert!(seen.lock().unwrap().is_empty());

    assert!(f.flush_notifications());
    assert!(!f.flush_notifications());
    assert_eq!(
        *seen.lock().unwrap(),
        vec![ChangePayload::Text("ab".to_string())]
    );
}

#[test]
fn test_every_subscriber_is_called() {
    let mut f = field(FieldConfig::multi_line());
    let first = recorder(&mut f);
    let second = recorder(&mut f);
    f.set_text("x");
    f.flush_notifications();
    assert_eq!(first.lock().unwrap().len(), 1);
    assert_eq!(second.lock().unwrap().len(), 1);
}

#[test]
fn test_stats_payload() {
    let mut f = field(FieldConfig {
        notify_mode: NotifyMode::Stats,
        ..FieldConfig::multi_line()
    });
    f.set_viewport(5.0, 10.0);
    let seen = recorder(&mut f);

    f.insert_text("Hello World", ms(0));
    f.flush_notifications();

    let expected = FieldStats {
        cursor_byte: 11,
        cursor_row: 1,
        cursor_col: 5,
        total_rows: 2,
        total_bytes: 11,
        pending_undo_count: 1,
    };
    assert_eq!(*seen.lock().unwrap(), vec![ChangePayload::Stats(expected)]);
    assert_eq!(f.stats(), expected);
}

#[test]
fn test_notifications_disabled() {
    let mut f = field(FieldConfig {
        notify_changes: false,
        ..FieldConfig::multi_line()
    });
    let seen = recorder(&mut f);
    f.insert_text("quiet", ms(0));
    assert!(!f.flush_notifications());
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn test_caret_notify() {
    let mut config = FieldConfig::multi_line();
    config.caret.notify = true;
    let mut f = field(config);
    f.set_text("abc");
    f.flush_notifications();
    let seen = recorder(&mut f);

    f.set_cursor(1);
    assert!(f.flush_notifications());
    assert_eq!(seen.lock().unwrap().len(), 1);

    // Without caret notify a pure motion queues nothing.
    let mut quiet = field(FieldConfig::multi_line());
    quiet.set_text("abc");
    quiet.flush_notifications();
    quiet.set_cursor(1);
    assert!(!quiet.flush_notifications());
}

#[test]
fn test_caret_blink_cycle() {
    let mut f = field(FieldConfig::multi_line());
    assert!(!f.caret_visible());

    f.focus_gained(ms(0));
    assert!(f.caret_visible());
    assert_eq!(f.next_deadline(), Some(ms(500)));

    assert!(f.fire_due(ms(500)));
    assert!(!f.caret_visible());
    assert_eq!(f.next_deadline(), Some(ms(1000)));

    // Typing shows the caret and restarts the cycle.
    f.insert_text("a", ms(600));
    assert!(f.caret_visible());
    assert_eq!(f.next_deadline(), Some(ms(1100)));

    f.focus_lost();
    assert!(!f.caret_visible());
    assert_eq!(f.next_deadline(), None);
}

#[test]
fn test_caret_without_blink() {
    let mut config = FieldConfig::multi_line();
    config.caret.blink = false;
    let mut f = field(config);
    f.focus_gained(ms(0));
    assert!(f.caret_visible());
    assert_eq!(f.next_deadline(), None);
}

#[test]
fn test_color_classes_per_row() {
    let mut f = field(FieldConfig::multi_line());
    f.set_text("a1\nb2");
    assert_eq!(f.color_classes(0), vec![0, 0, 0]);

    f.set_color_classifier(|text: &str, range: Range<usize>, classes: &mut [u8]| {
        for (class, byte) in classes.iter_mut().zip(&text.as_bytes()[range]) {
            *class = u8::from(byte.is_ascii_digit());
        }
    });
    assert_eq!(f.color_classes(0), vec![0, 1, 0]);
    assert_eq!(f.color_classes(1), vec![0, 1]);
    assert!(f.color_classes(2).is_empty());

    f.clear_color_classifier();
    assert_eq!(f.color_classes(1), vec![0, 0]);
}

#[test]
fn test_password_display_and_copy() {
    let clipboard = MemoryClipboard::new();
    let mut f = TextField::new(
        FieldConfig::password(),
        MonospaceMetrics::unit(),
        clipboard.clone(),
    )
    .unwrap();
    f.set_text("he\u{301}llo\u{1F44D}\u{1F3FD}");

    let mask: String = std::iter::repeat_n(PASSWORD_MASK, 6).collect();
    assert_eq!(f.display_text(), mask);

    f.select_all();
    assert!(!f.copy());
    assert!(!f.cut(ms(0)));
    assert_eq!(clipboard.contents(), None);
    assert_eq!(f.text(), "he\u{301}llo\u{1F44D}\u{1F3FD}");
}

#[test]
fn test_copy_and_cut_use_clipboard() {
    let clipboard = MemoryClipboard::new();
    let mut f = TextField::new(
        FieldConfig::multi_line(),
        MonospaceMetrics::unit(),
        clipboard.clone(),
    )
    .unwrap();
    f.set_text("hello world");
    f.set_selection(0, 5);
    assert!(f.copy());
    assert_eq!(clipboard.contents().as_deref(), Some("hello"));

    f.set_selection(5, 11);
    assert!(f.cut(ms(0)));
    assert_eq!(f.text(), "hello");
    assert_eq!(clipboard.contents().as_deref(), Some(" world"));
}

#[test]
fn test_placeholder_while_empty_and_unfocused() {
    let config = FieldConfig {
        placeholder: "Search".to_string(),
        ..FieldConfig::single_line()
    };
    let mut f = field(config);
    assert!(f.is_showing_placeholder());
    assert_eq!(f.display_text(), "Search");

    f.focus_gained(ms(0));
    assert_eq!(f.display_text(), "");

    f.insert_text("q", ms(10));
    f.focus_lost();
    assert!(!f.is_showing_placeholder());
    assert_eq!(f.display_text(), "q");
}
