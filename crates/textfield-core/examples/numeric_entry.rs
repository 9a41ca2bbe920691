//! Numeric entry example
//!
//! A double field with bounds and a 0.25 step, driven by a simulated host clock: the step
//! button is held for a second, then released.

use std::time::Duration;
use textfield_core::{FieldConfig, MemoryClipboard, MonospaceMetrics, SpinDirection, TextField};

fn main() {
    println!("=== Numeric entry ===\n");

    let mut config = FieldConfig::double(Some(-1.0), Some(5.0));
    config.numeric.step = 0.25;
    config.numeric.precision = Some(2);
    let mut field =
        TextField::new(config, MonospaceMetrics::unit(), MemoryClipboard::new()).unwrap();

    field.set_value(1.0);
    println!("initial: {}", field.text());

    println!("\nholding the up button:");
    let mut now = Duration::ZERO;
    field.spin_press(SpinDirection::Up, now);
    println!("  {:>5} ms  {}", now.as_millis(), field.text());
    while let Some(deadline) = field.next_deadline() {
        if deadline > Duration::from_millis(1000) {
            break;
        }
        now = deadline;
        field.fire_due(now);
        println!("  {:>5} ms  {}", now.as_millis(), field.text());
    }
    field.spin_release();

    println!("\nvalue: {:?}", field.value());
    field.undo();
    println!("after one undo: {}", field.text());

    println!("\ntyping out of range, then committing:");
    field.select_all();
    field.insert_text("12.5", now);
    field.focus_lost();
    println!("  {}", field.text());
}
