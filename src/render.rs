use comfy_table::{Cell, CellAlignment, Table, modifiers, presets};

use crate::core::snapshot::{MONTHS, Snapshot};

/// Render a snapshot as a two-column table, blank sources shown as `n/a`.
#[must_use]
pub fn render_snapshot(snapshot: &Snapshot) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec!["Metric", "Value"]);
    row(&mut table, "Current power", snapshot.current_power.map(|watts| format!("{watts:.0} W")));
    row(&mut table, "Consumption", snapshot.consumption.map(|watts| format!("{watts:.0} W")));
    row(&mut table, "Grid export", snapshot.grid_export.map(|watts| format!("{watts:.0} W")));
    row(&mut table, "Grid import", snapshot.grid_import.map(|watts| format!("{watts:.0} W")));
    row(&mut table, "Battery solar", snapshot.battery_solar.map(|watts| format!("{watts:.0} W")));
    row(
        &mut table,
        "Daily production",
        snapshot.daily_production.map(|kwh| format!("{kwh:.1} kWh")),
    );
    row(
        &mut table,
        "Cumulative production",
        snapshot.cumulative_production.map(|kwh| format!("{kwh:.1} kWh")),
    );
    row(&mut table, "Last update", snapshot.last_update.clone());
    row(&mut table, "System size", snapshot.system_size.map(|kw| format!("{kw:.2} kW")));
    row(&mut table, "Panels", snapshot.num_panels.map(|count| count.to_string()));
    row(&mut table, "Azimuth", snapshot.system_azimuth.map(|degrees| format!("{degrees:.1}°")));
    row(&mut table, "Pitch", snapshot.system_pitch.map(|degrees| format!("{degrees:.1}°")));
    row(&mut table, "Battery", snapshot.has_battery.map(yes_no));
    row(&mut table, "Consumption monitoring", snapshot.has_consumption.map(yes_no));
    row(&mut table, "PTO date", snapshot.pto_date.clone());
    row(&mut table, "Latitude", snapshot.latitude.map(|degrees| format!("{degrees:.4}")));
    row(&mut table, "Longitude", snapshot.longitude.map(|degrees| format!("{degrees:.4}")));
    for (month, exposure) in MONTHS.iter().zip(snapshot.sun_exposure) {
        row(
            &mut table,
            &format!("Sun exposure ({month})"),
            exposure.map(|percent| format!("{percent:.1} %")),
        );
    }
    table
}

fn yes_no(value: bool) -> String {
    (if value { "yes" } else { "no" }).to_string()
}

fn row(table: &mut Table, metric: &str, value: Option<String>) {
    table.add_row(vec![
        Cell::new(metric),
        Cell::new(value.unwrap_or_else(|| "n/a".to_string()))
            .set_alignment(CellAlignment::Right),
    ]);
}
