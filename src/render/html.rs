use std::io::{self, Write};

use crate::{
    animation::timeline::OpacityKeyframe,
    convert::converter::{AnimatedDocument, StaticDocument},
    mesh::mesher::{Cell, Layout},
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Page-level presentation settings.
pub struct HtmlOptions {
    /// Emit a full `<!DOCTYPE html>` page instead of a bare fragment.
    pub with_html: bool,
    /// Page title; escaped on output.
    pub title: String,
    /// Keep the body hidden until the page has finished loading.
    pub smooth_load: bool,
}

/// Write a single-image document.
///
/// Without the page wrapper only the `<table>` is written.
pub fn write_static_document<W: Write + ?Sized>(
    out: &mut W,
    opts: &HtmlOptions,
    doc: &StaticDocument,
) -> io::Result<()> {
    if !opts.with_html {
        return write_table(out, &doc.layout);
    }

    write_head(out, opts, "")?;
    writeln!(out, r#"<div class="pixcel-container">"#)?;
    write_table(out, &doc.layout)?;
    writeln!(out, "</div>")?;
    write_tail(out)
}

/// Write an animated document: one stacked table layer per frame, each driven by its
/// own `@keyframes` rule over a shared loop duration.
pub fn write_animated_document<W: Write + ?Sized>(
    out: &mut W,
    opts: &HtmlOptions,
    doc: &AnimatedDocument,
) -> io::Result<()> {
    let style = animation_style(doc);
    if opts.with_html {
        write_head(out, opts, &style)?;
    } else {
        writeln!(out, "<style>\n{style}</style>")?;
    }

    writeln!(out, r#"<div class="pixcel-container pixcel-anim-container">"#)?;
    for (i, frame) in doc.frames.iter().enumerate() {
        writeln!(
            out,
            r#"<div class="pixcel-frame" style="animation-name:pixcel-anim-{i}">"#
        )?;
        write_table(out, &frame.layout)?;
        writeln!(out, "</div>")?;
    }
    writeln!(out, "</div>")?;

    if opts.with_html {
        write_tail(out)?;
    }
    Ok(())
}

fn write_head<W: Write + ?Sized>(
    out: &mut W,
    opts: &HtmlOptions,
    extra_style: &str,
) -> io::Result<()> {
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, r#"<html lang="en">"#)?;
    writeln!(out, "<head>")?;
    writeln!(out, r#"<meta charset="utf-8">"#)?;
    writeln!(
        out,
        r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#
    )?;
    writeln!(out, "<title>{}</title>", escape_html(&opts.title))?;
    writeln!(out, "<style>")?;
    writeln!(out, "body{{margin:0}}")?;
    writeln!(out, ".pixcel-container{{display:inline-block;line-height:0}}")?;
    writeln!(out, ".pixcel-container td{{padding:0}}")?;
    if opts.smooth_load {
        writeln!(out, "body{{visibility:hidden}}")?;
    }
    write!(out, "{extra_style}")?;
    writeln!(out, "</style>")?;
    writeln!(out, "</head>")?;
    if opts.smooth_load {
        writeln!(
            out,
            r#"<body onload="document.body.style.visibility='visible'">"#
        )?;
    } else {
        writeln!(out, "<body>")?;
    }
    Ok(())
}

fn write_tail<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")
}

/// Rows are always written, even empty ones: row spans from earlier rows count them.
fn write_table<W: Write + ?Sized>(out: &mut W, layout: &Layout) -> io::Result<()> {
    writeln!(
        out,
        r#"<table width="{}" height="{}" cellspacing="0" cellpadding="0" border="0" style="border-collapse:collapse;table-layout:fixed">"#,
        layout.width, layout.height
    )?;
    for row in &layout.rows {
        write!(out, "<tr>")?;
        for cell in &row.cells {
            write_cell(out, cell)?;
        }
        writeln!(out, "</tr>")?;
    }
    writeln!(out, "</table>")
}

fn write_cell<W: Write + ?Sized>(out: &mut W, cell: &Cell) -> io::Result<()> {
    write!(out, "<td")?;
    if cell.width > 1 {
        write!(out, r#" colspan="{}""#, cell.width)?;
    }
    if cell.height > 1 {
        write!(out, r#" rowspan="{}""#, cell.height)?;
    }
    write!(
        out,
        r#" style="width:{}px;height:{}px" bgcolor="{}"></td>"#,
        cell.width,
        cell.height,
        cell.color.to_hex()
    )
}

fn animation_style(doc: &AnimatedDocument) -> String {
    let mut css = String::new();
    css.push_str(&format!(
        ".pixcel-anim-container{{position:relative;width:{}px;height:{}px}}\n",
        doc.width, doc.height
    ));
    css.push_str(&format!(
        ".pixcel-frame{{position:absolute;top:0;left:0;opacity:0;animation-duration:{:.3}s;animation-iteration-count:infinite;animation-timing-function:step-end}}\n",
        doc.timeline.total_secs()
    ));
    for (i, window) in doc.timeline.windows.iter().enumerate() {
        css.push_str(&format!("@keyframes pixcel-anim-{i}{{"));
        for kf in &window.keyframes {
            css.push_str(&keyframe_css(kf));
        }
        css.push_str("}\n");
    }
    css
}

fn keyframe_css(kf: &OpacityKeyframe) -> String {
    let opacity = u8::from(kf.visible);
    format!("{}{{opacity:{opacity}}}", format_percent(kf.percent))
}

pub(crate) fn format_percent(p: f64) -> String {
    if p <= 0.0 {
        "0%".to_string()
    } else if p >= 100.0 {
        "100%".to_string()
    } else {
        format!("{p:.4}%")
    }
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/html.rs"]
mod tests;
