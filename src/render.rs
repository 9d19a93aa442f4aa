//! Plain-text projection of the grid.

use crate::world::World;

pub const LEGEND: &str = "Legend: . Plains, T Forest, ^ Mountain, ~ Water, : Desert";

/// Marker for the civilization at `index` in founding order: `1`..`9`, then
/// `a`..`z`, then `?` for everyone after that.
pub fn marker(index: usize) -> char {
    u32::try_from(index + 1)
        .ok()
        .and_then(|n| char::from_digit(n, 36))
        .unwrap_or('?')
}

/// Header, bordered grid and legend. Cells owned by one of `names` show
/// that civilization's marker; everything else shows its terrain glyph.
pub fn render_ascii(world: &World, names: &[&str]) -> String {
    let border = format!("+{}+", "-".repeat(world.width() as usize));
    let mut lines = Vec::with_capacity(world.height() as usize + 4 + names.len());
    lines.push(format!(
        "=== Year {}, Day {} ({}) ===",
        world.year(),
        world.day_of_year() + 1,
        world.season().name()
    ));
    lines.push(border.clone());
    for row in world.rows() {
        let mut line = String::with_capacity(row.len() + 2);
        line.push('|');
        for cell in row {
            let owner_marker = cell
                .owner
                .as_deref()
                .and_then(|owner| names.iter().position(|name| *name == owner))
                .map(marker);
            line.push(owner_marker.unwrap_or_else(|| cell.glyph()));
        }
        line.push('|');
        lines.push(line);
    }
    lines.push(border);
    lines.push(LEGEND.to_string());
    for (index, name) in names.iter().enumerate() {
        lines.push(format!("  {} = {name}'s territory", marker(index)));
    }
    lines.join("\n")
}
