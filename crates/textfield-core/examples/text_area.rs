//! Text area example
//!
//! Drives a word-wrapped multi-line field the way a widget toolkit would: key events, a
//! resize, a change subscriber and the undo log. Run with `RUST_LOG=textfield_core=trace` to
//! see the reflow and timer traces.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use textfield_core::{
    ChangePayload, FieldConfig, Key, MemoryClipboard, Modifiers, MonospaceMetrics, NotifyMode,
    TextField,
};
use tracing_subscriber::EnvFilter;

fn print_rows(field: &TextField<'_>) {
    for row in 0..field.row_count() {
        println!("  {:>2} | {:?}", row, field.row_text(row));
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Text area ===\n");

    let config = FieldConfig {
        notify_mode: NotifyMode::Stats,
        ..FieldConfig::multi_line()
    };
    let mut field =
        TextField::new(config, MonospaceMetrics::unit(), MemoryClipboard::new()).unwrap();
    field.set_viewport(16.0, 4.0);
    field.focus_gained(Duration::ZERO);

    let changes = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&changes);
    field.subscribe(move |payload| {
        if let ChangePayload::Stats(stats) = payload {
            *counter.lock().unwrap() += 1;
            println!(
                "  change: caret {}:{} of {} rows, {} bytes",
                stats.cursor_row, stats.cursor_col, stats.total_rows, stats.total_bytes
            );
        }
    });

    println!("1. Typing:");
    let mut now = Duration::ZERO;
    for ch in "The quick brown fox jumps over the lazy dog".chars() {
        now += Duration::from_millis(40);
        field.key_press(Key::Char(ch), Modifiers::NONE, now);
    }
    field.flush_notifications();
    print_rows(&field);

    println!("\n2. Resize to 24 columns:");
    field.set_viewport(24.0, 4.0);
    print_rows(&field);

    println!("\n3. Word navigation and deletion:");
    field.key_press(Key::Left, Modifiers::CTRL, now);
    field.key_press(Key::Backspace, Modifiers::CTRL, now + Duration::from_secs(1));
    field.flush_notifications();
    println!("  text: {:?}", field.text());

    println!("\n4. Undo:");
    while field.undo() {
        println!("  {:?}", field.text());
    }

    println!("\nchanges delivered: {}", changes.lock().unwrap());
}
