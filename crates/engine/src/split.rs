//! In-memory table splitting.
//!
//! `split_grid` runs the whole pipeline against a loaded source grid:
//!
//! 1. scan for header boundaries
//! 2. build table segments
//! 3. compress the first table's header (shared by every output)
//! 4. locate each segment's data start (item continuity)
//! 5. assemble, renumber and highlight one output grid per segment
//!
//! Nothing here touches the filesystem; the io crate saves the plan.

use std::collections::BTreeMap;

use crate::error::{SplitError, SplitWarning};
use crate::footer::highlight_footer;
use crate::grid::Grid;
use crate::header::compress_header;
use crate::layout::assemble;
use crate::naming::segment_letter;
use crate::numbering::{continuation_start, find_item_column, last_item_number, renumber_items};
use crate::options::SplitOptions;
use crate::scan::scan_boundaries;
use crate::segment::{build_segments, TableSegment};

#[derive(Debug, Clone)]
pub struct PlannedOutput {
    /// A, B, C, ... in segment order
    pub letter: String,
    pub segment: TableSegment,
    /// First source row copied after the header
    pub data_start_row: u32,
    pub grid: Grid,
    /// Source row -> output row
    pub row_map: BTreeMap<u32, u32>,
    /// Items renumbered, or None when the output has no ITEM NO row
    pub item_count: Option<usize>,
    /// Cell bolded by the footer highlighter
    pub footer_cell: Option<(u32, u32)>,
}

#[derive(Debug, Clone)]
pub struct SplitPlan {
    pub outputs: Vec<PlannedOutput>,
    pub warnings: Vec<SplitWarning>,
}

pub fn split_grid(source: &Grid, options: &SplitOptions) -> Result<SplitPlan, SplitError> {
    let keywords = &options.keywords;
    let boundaries = scan_boundaries(source, keywords)?;
    let mut warnings = Vec::new();
    let segments = build_segments(source, &boundaries, &mut warnings);
    let Some(first) = segments.first().copied() else {
        return Err(SplitError::BoundaryNotFound { missing_start: true, missing_end: false });
    };

    let header = compress_header(source, first.start_row, first.header_end_row);
    log::debug!("compressed header rows: {:?}", header.rows);

    let first_item_col = find_item_column(
        source,
        first.header_start_row..=first.header_end_row,
        &keywords.item_marker,
    );
    let item_cols: Vec<Option<u32>> = segments
        .iter()
        .map(|s| {
            find_item_column(source, s.header_start_row..=s.header_end_row, &keywords.item_marker)
                .or(first_item_col)
        })
        .collect();

    let mut outputs = Vec::with_capacity(segments.len());
    for (i, segment) in segments.iter().enumerate() {
        let data_start_row = if i == 0 {
            segment.header_end_row + 1
        } else {
            let prev = &segments[i - 1];
            let previous_last = item_cols[i - 1]
                .and_then(|col| last_item_number(source, prev, col, &keywords.footer_marker));
            continuation_start(
                source,
                i,
                segment,
                item_cols[i],
                previous_last,
                options.continuation,
                &mut warnings,
            )?
        };

        let assembled = assemble(
            source,
            &header,
            data_start_row..=segment.end_row,
            &options.layout,
            i,
            &mut warnings,
        );
        let mut grid = assembled.grid;

        let item_count = renumber_items(&mut grid, keywords);
        if item_count.is_none() {
            log::warn!("table {}: no ITEM NO row in output, skipping renumbering", i + 1);
            warnings.push(SplitWarning::RenumberSkipped { segment: i });
        }
        let footer_cell = highlight_footer(&mut grid, &keywords.footer_highlight, options.footer_window);

        outputs.push(PlannedOutput {
            letter: segment_letter(i),
            segment: *segment,
            data_start_row,
            grid,
            row_map: assembled.row_map,
            item_count,
            footer_cell,
        });
    }

    Ok(SplitPlan { outputs, warnings })
}
