use chrono::Local;
use std::fmt::Write;

use weather_core::{
    AppState,
    display::{FOOTER, chip_text, clock_text, date_text, weather_fields},
};

const TITLE: &str = "Weather App";
const CELL_WIDTH: usize = 28;

/// Render the whole screen as plain text.
pub fn screen(state: &AppState) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:<width$}{}",
        TITLE,
        clock_text(&state.clock),
        width = CELL_WIDTH * 2 - 8
    );

    if !state.recent.is_empty() {
        let chips: Vec<&str> = state.recent.entries().iter().map(|e| chip_text(e)).collect();
        let _ = writeln!(out, "Recent: {}", chips.join(" · "));
    }
    out.push('\n');

    match &state.snapshot {
        Some(snapshot) => {
            let _ = writeln!(out, "{}", state.location_label);
            let _ = writeln!(out, "{}\n", date_text(&state.clock));

            let cells: Vec<String> = weather_fields(&snapshot.conditions)
                .into_iter()
                .map(|f| format!("{}: {}", f.label, f.value))
                .collect();

            for row in cells.chunks(2) {
                let line = row
                    .iter()
                    .map(|cell| format!("{:<width$}", cell, width = CELL_WIDTH))
                    .collect::<String>();
                let _ = writeln!(out, "{}", line.trim_end());
            }

            let fetched = snapshot.fetched_at.with_timezone(&Local);
            let _ = writeln!(out, "\nUpdated {}", clock_text(&fetched));
        }
        None if state.loading => {
            let _ = writeln!(out, "Loading...");
        }
        None => {}
    }

    let _ = write!(out, "\n{}", FOOTER);
    out
}
