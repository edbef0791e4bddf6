//! Single-line share codes for map documents.
//!
//! A code reads `maze:v1:<columns>x<rows>:<payload>`, where the payload is the
//! document's JSON in unpadded base64. The size in the header lets a reader
//! reject a truncated or edited payload before building the maze.

use anyhow::{anyhow, bail, ensure, Context, Result};
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use maze_chase_world::MazeDocument;

/// Scheme and version every code starts with.
pub(crate) const SHARE_HEADER: &str = "maze:v1";

/// Encodes a map document into a single-line share code.
pub(crate) fn encode(document: &MazeDocument) -> Result<String> {
    let json = serde_json::to_vec(document).context("map document could not be serialised")?;
    let (columns, rows) = grid_size(document);
    Ok(format!(
        "{SHARE_HEADER}:{columns}x{rows}:{}",
        STANDARD_NO_PAD.encode(json)
    ))
}

/// Decodes the map document carried by `code`.
pub(crate) fn decode(code: &str) -> Result<MazeDocument> {
    let code = code.trim();
    ensure!(!code.is_empty(), "share code is blank");

    let mut fields = code.splitn(4, ':');
    let scheme = fields.next().unwrap_or_default();
    let (Some(version), Some(size), Some(payload)) = (fields.next(), fields.next(), fields.next())
    else {
        bail!("share code must look like '{SHARE_HEADER}:<columns>x<rows>:<payload>'");
    };

    let header = format!("{scheme}:{version}");
    if header != SHARE_HEADER {
        bail!("unrecognised share code header '{header}', expected '{SHARE_HEADER}'");
    }

    let declared = parse_size(size)?;
    let json = STANDARD_NO_PAD
        .decode(payload)
        .context("share code payload is not valid base64")?;
    let document: MazeDocument =
        serde_json::from_slice(&json).context("share code payload is not a map document")?;

    let actual = grid_size(&document);
    ensure!(
        actual == declared,
        "share code header promises a {}x{} grid but carries {}x{}",
        declared.0,
        declared.1,
        actual.0,
        actual.1
    );
    Ok(document)
}

fn grid_size(document: &MazeDocument) -> (usize, usize) {
    let columns = document.layout.first().map_or(0, Vec::len);
    (columns, document.layout.len())
}

fn parse_size(size: &str) -> Result<(usize, usize)> {
    let malformed = || anyhow!("grid size '{size}' is not of the form <columns>x<rows>");
    let (columns, rows) = size.split_once(['x', 'X']).ok_or_else(malformed)?;
    let columns: usize = columns.trim().parse().map_err(|_| malformed())?;
    let rows: usize = rows.trim().parse().map_err(|_| malformed())?;
    ensure!(columns > 0 && rows > 0, "grid size '{size}' is empty");
    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_chase_world::fallback_maze;

    fn rejection(code: &str) -> String {
        match decode(code) {
            Ok(document) => panic!("'{code}' decoded to {document:?}"),
            Err(error) => format!("{error:#}"),
        }
    }

    #[test]
    fn built_in_maze_survives_a_share_code() {
        let maze = fallback_maze().expect("built-in maze");
        let document = MazeDocument::from_maze(&maze);

        let code = encode(&document).expect("encodes");
        assert!(code.starts_with(&format!("{SHARE_HEADER}:35x21:")));
        assert!(!code.contains('\n'));

        let decoded = decode(&format!("  {code}\n")).expect("decodes");
        assert_eq!(decoded, document);
        assert_eq!(decoded.into_maze().expect("valid maze"), maze);
    }

    #[test]
    fn malformed_codes_are_rejected() {
        assert!(rejection("   ").contains("blank"));
        assert!(rejection("maze").contains("must look like"));
        assert!(rejection("maze:v1:3x3").contains("must look like"));
        assert!(rejection("route:v1:3x3:AAAA").contains("'route:v1'"));
        assert!(rejection("maze:v9:3x3:AAAA").contains("'maze:v9'"));
        assert!(rejection("maze:v1:3by3:AAAA").contains("not of the form"));
        assert!(rejection("maze:v1:0x3:AAAA").contains("is empty"));
        assert!(rejection("maze:v1:3x3:@@@").contains("base64"));
        let not_a_document = STANDARD_NO_PAD.encode("true");
        assert!(rejection(&format!("maze:v1:3x3:{not_a_document}")).contains("not a map document"));
    }

    #[test]
    fn header_must_match_the_layout() {
        let document = MazeDocument::from_json(r#"{"layout": [[1,1,1],[1,2,1],[1,1,1]]}"#)
            .expect("valid document");
        let code = encode(&document).expect("encodes");
        let tampered = code.replacen(":3x3:", ":4x3:", 1);

        assert!(rejection(&tampered).contains("promises a 4x3 grid but carries 3x3"));
    }
}
