//! Mosaic renderer for tilecrawl.
//!
//! Turns the discovery result into a single HTML table whose cells reference
//! the downloaded tiles by name, so the browser lays the mosaic out in its
//! true spatial positions. Runs only after the crawl has reached quiescence.

use std::path::Path;

use log::trace;
use tokio::io::AsyncWriteExt;

use crate::core::coord::TileCoord;
use crate::core::crawler::CrawlReport;
use crate::core::error::Result;

/// Filename of the rendered mosaic inside the output directory
pub const INDEX_NAME: &str = "index.html";

/// Half-width of the fixed output window. Rows run `WINDOW_EXTENT..=-WINDOW_EXTENT`
/// top to bottom, columns `-WINDOW_EXTENT..=WINDOW_EXTENT` left to right; a safe
/// over-approximation of the mosaic's real extent.
pub const WINDOW_EXTENT: i32 = 50;

/// Create the output directory and an empty index file inside it.
///
/// Called before the crawl starts so that an unwritable destination fails the
/// run up front, before any fetch is attempted. Both failures are fatal.
pub async fn create_index_file(dir: &Path) -> Result<tokio::fs::File> {
    tokio::fs::create_dir_all(dir).await?;
    let file = tokio::fs::File::create(dir.join(INDEX_NAME)).await?;
    Ok(file)
}

/// Write the rendered mosaic document to the index file. Fatal on I/O error.
pub async fn write_index(index: &mut tokio::fs::File, report: &CrawlReport) -> Result<()> {
    index.write_all(render_index(report).as_bytes()).await?;
    index.flush().await?;
    Ok(())
}

/// Render the mosaic document for a finished crawl.
///
/// The origin row and column hold no tiles and are skipped entirely: no `<tr>`
/// is emitted for row 0 and no `<td>` for column 0. Cells resolve in three
/// tiers: a found tile references its own image, a tried-but-missing tile
/// references the quadrant placeholder, and a never-attempted cell collapses
/// to whitespace. The style rule strips margins and cell gaps so adjacent
/// tiles abut seamlessly.
pub fn render_index(report: &CrawlReport) -> String {
    let mut html = String::new();
    html.push_str("<html><head>\n");
    html.push_str("<title>clickdrag</title>\n");
    html.push_str("<style>*{margin:0;padding:0;border-collapse:collapse}</style>\n");
    html.push_str("</head><body>\n");
    html.push_str("<table>\n");

    for r in (-WINDOW_EXTENT..=WINDOW_EXTENT).rev() {
        if r == 0 {
            continue;
        }
        html.push_str(&format!("  <tr> <!-- row {r} -->\n"));
        for c in -WINDOW_EXTENT..=WINDOW_EXTENT {
            let Some(coord) = TileCoord::from_row_col(r, c) else {
                continue;
            };
            let name = coord.name();

            html.push_str("  <td>");
            if report.found.contains(&name) {
                html.push_str(&format!("<img src=\"{name}\" />"));
            } else if report.tried.contains(&name) {
                trace!("Could not find {name:?}");
                let placeholder = TileCoord::placeholder(coord.ns, coord.ew).name();
                html.push_str(&format!("<img src=\"{placeholder}\" />"));
            } else {
                html.push_str("&nbsp;");
            }
            html.push_str("</td>\n");
        }
        html.push_str("  </tr>\n");
    }

    html.push_str("</table>\n");
    html.push_str("</body>\n");
    html.push_str("</html>\n");
    html
}
