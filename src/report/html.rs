use std::io::{self, Write};

use crate::table::escape_html;

use super::{ArtifactBody, ReportOutcome, Section, figure_file_name};

pub fn write<W: Write>(writer: &mut W, outcome: &ReportOutcome) -> io::Result<()> {
    let rendered = outcome.artifacts().count();
    let failed = outcome.failures().count();

    write!(
        writer,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>osu! beatmap report</title>
    <style>
        :root {{
            --bg: #f5f6f8;
            --card: #ffffff;
            --border: #d8dce3;
            --text: #1f2430;
            --dim: #6a7385;
            --failed: #c8354d;
        }}
        * {{ box-sizing: border-box; }}
        body {{
            font-family: Inter, 'Segoe UI', Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--text);
            line-height: 1.5;
            margin: 0;
        }}
        .container {{ max-width: 1000px; margin: 0 auto; padding: 2rem; }}
        .summary {{ color: var(--dim); margin-bottom: 2rem; }}
        section {{
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 10px;
            padding: 1.25rem 1.5rem;
            margin-bottom: 1.5rem;
        }}
        h2 {{ font-size: 1.1rem; margin: 0 0 0.5rem; }}
        .note {{ color: var(--dim); font-size: 0.9rem; margin: 0 0 0.75rem; }}
        .failed h2, .failed .note {{ color: var(--failed); }}
        img {{ max-width: 100%; height: auto; }}
        table {{ border-collapse: collapse; width: 100%; font-size: 0.9rem; }}
        th, td {{ border-bottom: 1px solid var(--border); padding: 0.3rem 0.6rem; text-align: left; }}
        td.num {{ text-align: right; font-variant-numeric: tabular-nums; }}
    </style>
</head>
<body>
<div class="container">
    <h1>osu! beatmap report</h1>
    <p class="summary">{rendered} artifact(s) rendered, {failed} failed.</p>
"#
    )?;

    for (position, section) in outcome.sections.iter().enumerate() {
        match section {
            Section::Rendered(artifact) => {
                writeln!(writer, r#"    <section id="{}">"#, escape_html(&artifact.slug))?;
                writeln!(
                    writer,
                    "    <h2>{}. {}</h2>",
                    position + 1,
                    escape_html(&artifact.title)
                )?;
                if let Some(note) = &artifact.note {
                    writeln!(writer, r#"    <p class="note">{}</p>"#, escape_html(note))?;
                }
                match &artifact.body {
                    ArtifactBody::Figure(_) => writeln!(
                        writer,
                        r#"    <img src="{}" alt="{}">"#,
                        escape_html(&figure_file_name(position, &artifact.slug)),
                        escape_html(&artifact.title)
                    )?,
                    ArtifactBody::Table(table) => write!(writer, "{}", table.render_html())?,
                }
                writeln!(writer, "    </section>")?;
            }
            Section::Failed(failure) => {
                writeln!(
                    writer,
                    r#"    <section id="{}" class="failed">"#,
                    escape_html(&failure.slug)
                )?;
                writeln!(
                    writer,
                    "    <h2>{}. {} (failed)</h2>",
                    position + 1,
                    escape_html(&failure.title)
                )?;
                writeln!(
                    writer,
                    r#"    <p class="note">{}</p>"#,
                    escape_html(&failure.message)
                )?;
                writeln!(writer, "    </section>")?;
            }
        }
    }

    writeln!(writer, "</div>\n</body>\n</html>")?;
    Ok(())
}
