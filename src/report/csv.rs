use std::io::Write;

use anyhow::Result;

use super::{LibraryReport, Outcome};

/// Render `name, url, spdx` rows for every resolved library.
///
/// Unresolved libraries are omitted; the caller reports them on stderr and
/// through the exit code. Rows follow the input order, which is already
/// sorted by library name.
pub fn render(reports: &[LibraryReport], out: &mut dyn Write) -> Result<()> {
    writeln!(out, "# Generated by modlicense. DO NOT EDIT.")?;
    for report in reports {
        if let Outcome::Resolved { url } = &report.outcome {
            writeln!(
                out,
                "{}, {}, {}",
                report.name,
                url,
                report.spdx_id.as_deref().unwrap_or("Unknown")
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_skips_failures() {
        let reports = vec![
            LibraryReport {
                name: "github.com/a/b".to_string(),
                version: "v1.0.0".to_string(),
                spdx_id: Some("MIT".to_string()),
                outcome: Outcome::Resolved {
                    url: "https://github.com/a/b/blob/v1.0.0/LICENSE".to_string(),
                },
            },
            LibraryReport {
                name: "example.com/broken".to_string(),
                version: String::new(),
                spdx_id: None,
                outcome: Outcome::Unlicensed,
            },
        ];

        let mut buf = Vec::new();
        render(&reports, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "# Generated by modlicense. DO NOT EDIT.\n\
             github.com/a/b, https://github.com/a/b/blob/v1.0.0/LICENSE, MIT\n"
        );
    }

    #[test]
    fn test_render_unknown_spdx() {
        let reports = vec![LibraryReport {
            name: "github.com/a/b".to_string(),
            version: "v1.0.0".to_string(),
            spdx_id: None,
            outcome: Outcome::Resolved {
                url: "https://example".to_string(),
            },
        }];

        let mut buf = Vec::new();
        render(&reports, &mut buf).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains(", Unknown"));
    }
}
