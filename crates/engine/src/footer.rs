use crate::grid::Grid;

/// Bold the first cell (bottom-up, left to right, within the last `window` rows)
/// whose trimmed upper-cased text contains `marker`, plus the first non-empty
/// cell to its right. Returns the matched cell.
pub fn highlight_footer(grid: &mut Grid, marker: &str, window: u32) -> Option<(u32, u32)> {
    let last = grid.max_row();
    let floor = last.saturating_sub(window).max(1);
    let marker = marker.to_uppercase();

    let hit = (floor + 1..=last).rev().find_map(|row| {
        (1..=grid.max_col())
            .find(|&col| grid.value(row, col).display().trim().to_uppercase().contains(&marker))
            .map(|col| (row, col))
    })?;

    let (row, col) = hit;
    grid.cell_mut(row, col).style.font.bold = true;
    if let Some(amount_col) = (col + 1..=grid.max_col()).find(|&c| !grid.value(row, c).is_empty()) {
        grid.cell_mut(row, amount_col).style.font.bold = true;
    }
    log::debug!("bolded footer at row {row}, column {col}");
    Some(hit)
}
