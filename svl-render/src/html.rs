//! Assembly of the final self-contained HTML document.
//!
//! The page is a CSS grid sized to the layout's extent, one `<div>` per
//! plot cell, and one `Plotly.newPlot` call per cell. Plot dictionaries are
//! embedded as JSON, escaped for the script context so user-controlled
//! strings cannot break out of it.

use std::fmt::Write as _;

use crate::plotly::TemplateVars;

/// Where the plotting library's JavaScript comes from.
#[derive(Debug, Clone)]
pub enum PlotlyJs {
    /// Load from the plotly CDN with a `<script src>` tag.
    Cdn,
    /// Embed the bundled library source directly into the page.
    Embedded(String),
}

const PLOTLY_CDN_URL: &str = "https://cdn.plot.ly/plotly-latest.min.js";

/// Render the page for the given template variables.
pub fn render_page(vars: &TemplateVars, plotly_js: &PlotlyJs) -> String {
    let mut page = String::new();

    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    page.push_str("<title>SVL Visualization</title>\n");

    match plotly_js {
        PlotlyJs::Cdn => {
            let _ = writeln!(page, "<script src=\"{}\"></script>", PLOTLY_CDN_URL);
        }
        PlotlyJs::Embedded(source) => {
            let _ = writeln!(page, "<script>{}</script>", source);
        }
    }

    let _ = writeln!(
        page,
        "<style>\n\
         html, body {{ height: 100%; margin: 0; }}\n\
         .svl-grid {{\n\
           display: grid;\n\
           height: 100%;\n\
           grid-template-rows: repeat({}, 1fr);\n\
           grid-template-columns: repeat({}, 1fr);\n\
         }}\n\
         </style>",
        vars.num_rows, vars.num_columns
    );
    page.push_str("</head>\n<body>\n<div class=\"svl-grid\">\n");

    for (index, cell) in vars.plots.iter().enumerate() {
        let _ = writeln!(
            page,
            "  <div id=\"svl-plot-{}\" style=\"grid-row: {} / {}; grid-column: {} / {};\"></div>",
            index, cell.row_start, cell.row_end, cell.column_start, cell.column_end
        );
    }

    page.push_str("</div>\n<script>\n");
    for (index, cell) in vars.plots.iter().enumerate() {
        let spec = serde_json::to_string(&cell.plotly).unwrap_or_else(|_| "{}".to_string());
        let _ = writeln!(
            page,
            "var spec{index} = {};\n\
             Plotly.newPlot(\"svl-plot-{index}\", spec{index}.data, spec{index}.layout, {{\"responsive\": true}});",
            html_escape::encode_script(&spec),
            index = index
        );
    }
    page.push_str("</script>\n</body>\n</html>\n");

    tracing::debug!(plots = vars.plots.len(), "rendered HTML page");
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plotly::PlotCell;
    use serde_json::json;

    fn vars() -> TemplateVars {
        TemplateVars {
            num_rows: 2,
            num_columns: 1,
            plots: vec![
                PlotCell {
                    row_start: 1,
                    row_end: 2,
                    column_start: 1,
                    column_end: 2,
                    plotly: json!({ "layout": { "title": "top" }, "data": [] }),
                },
                PlotCell {
                    row_start: 2,
                    row_end: 3,
                    column_start: 1,
                    column_end: 2,
                    plotly: json!({ "layout": { "title": "bottom" }, "data": [] }),
                },
            ],
        }
    }

    #[test]
    fn test_page_has_grid_and_cells() {
        let page = render_page(&vars(), &PlotlyJs::Cdn);
        assert!(page.contains("grid-template-rows: repeat(2, 1fr)"));
        assert!(page.contains("grid-template-columns: repeat(1, 1fr)"));
        assert!(page.contains("id=\"svl-plot-0\""));
        assert!(page.contains("grid-row: 2 / 3"));
        assert!(page.contains("Plotly.newPlot(\"svl-plot-1\""));
        assert!(page.contains(PLOTLY_CDN_URL));
    }

    #[test]
    fn test_offline_mode_embeds_js() {
        let page = render_page(
            &vars(),
            &PlotlyJs::Embedded("window.Plotly = {};".to_string()),
        );
        assert!(page.contains("<script>window.Plotly = {};</script>"));
        assert!(!page.contains(PLOTLY_CDN_URL));
    }

    #[test]
    fn test_script_breakout_is_escaped() {
        let mut vars = vars();
        vars.plots[0].plotly =
            json!({ "layout": { "title": "</script><script>alert(1)" }, "data": [] });
        let page = render_page(&vars, &PlotlyJs::Cdn);
        assert!(!page.contains("</script><script>alert(1)"));
    }
}
