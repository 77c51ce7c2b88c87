//! STL decoding for binary and ASCII files.
use std::borrow::Cow;
use std::path::Path;

use encoding_rs::Encoding;
use nalgebra::Point3;
use nom::{
    bytes::complete::take,
    combinator::all_consuming,
    multi::count,
    number::complete::{float, le_f32, le_u32},
    sequence::tuple,
    IResult,
};
use tracing::{debug, info};

use super::{ReadOptions, Stl, StlFormat, HEADER_SIZE, TRIANGLE_SIZE};
use crate::error::{Error, Result};

/// Tokens in one ASCII facet block, from `facet` to `endfacet`.
const FACET_TOKENS: usize = 21;

/// Offsets of the three vertex coordinate triples within a facet block.
const VERTEX_OFFSETS: [usize; 3] = [8, 12, 16];

/// Read and parse an STL file.
///
/// An empty object name is replaced by the file stem. Errors carry the path
/// of the file.
pub fn read_stl<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<Stl> {
    let path = path.as_ref();
    let read = || -> Result<Stl> {
        let data = std::fs::read(path)?;
        let mut stl = parse_stl(&data, options)?;
        if stl.name.is_empty() {
            stl.name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(stl)
    };
    read().map_err(|e| e.in_file(path))
}

/// Detect the layout of `data` and decode it.
pub fn parse_stl(data: &[u8], options: &ReadOptions) -> Result<Stl> {
    let format = StlFormat::detect(data);
    debug!(?format, bytes = data.len(), "parsing STL data");
    let stl = match format {
        StlFormat::Binary => parse_binary(data, options.encoding)?,
        StlFormat::Ascii => parse_ascii(data, options.encoding)?,
    };
    info!(name = %stl.name, facets = stl.facet_count(), "read STL data");
    Ok(stl)
}

fn decode(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
        .ok_or(Error::Decode {
            encoding: encoding.name(),
        })
}

// ===== Binary

fn header(input: &[u8]) -> IResult<&[u8], (&[u8], u32)> {
    tuple((take(HEADER_SIZE), le_u32))(input)
}

fn vertex(input: &[u8]) -> IResult<&[u8], Point3<f32>> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, Point3::new(x, y, z)))
}

fn triangle(input: &[u8]) -> IResult<&[u8], [Point3<f32>; 3]> {
    let (input, _normal) = take(12usize)(input)?;
    let (input, (a, b, c)) = tuple((vertex, vertex, vertex))(input)?;
    let (input, _attribute) = take(2usize)(input)?;
    Ok((input, [a, b, c]))
}

/// Markers of the binary color extensions written by Materialise and VisCAM.
const COLOR_MARKERS: [&[u8]; 2] = [b"COLOR=", b"MATERIAL="];

/// Object name from a binary header: up to the first NUL, without the
/// `solid ` prefix and surrounding whitespace.
///
/// Headers carrying color data hold raw bytes instead of a name and give an
/// empty name.
fn binary_name(header: &[u8], encoding: &'static Encoding) -> Result<String> {
    if COLOR_MARKERS
        .iter()
        .any(|m| header.windows(m.len()).any(|w| w == *m))
    {
        debug!("binary header holds color data, ignoring the name");
        return Ok(String::new());
    }
    let end = header.iter().position(|&b| b == 0).unwrap_or(header.len());
    let name = decode(&header[..end], encoding)?;
    Ok(name.replace("solid ", "").trim().to_string())
}

fn parse_binary(data: &[u8], encoding: &'static Encoding) -> Result<Stl> {
    let (records, (head, facets)) = header(data).map_err(|_| {
        Error::format(format!(
            "{} bytes is too small for a binary STL header",
            data.len()
        ))
    })?;

    let expected = u64::from(facets) * TRIANGLE_SIZE as u64;
    if expected != records.len() as u64 {
        return Err(Error::format(format!(
            "header declares {} facets but the file holds {} bytes of facet data",
            facets,
            records.len()
        )));
    }

    let name = binary_name(head, encoding)?;
    let (_, triangles) = all_consuming(count(triangle, facets as usize))(records)
        .map_err(|_| Error::format("malformed facet record"))?;

    Ok(Stl {
        name,
        vertices: triangles.into_iter().flatten().collect(),
    })
}

// ===== ASCII

fn coordinate(token: &[u8]) -> Result<f32> {
    all_consuming(float::<&[u8], nom::error::Error<&[u8]>>)(token)
        .map(|(_, value)| value)
        .map_err(|_| {
            Error::format(format!(
                "'{}' is not a number",
                String::from_utf8_lossy(token)
            ))
        })
}

/// Index of the first token at or after `from` that is one of `stops`, or
/// the number of tokens if there is none.
fn next_keyword(tokens: &[&[u8]], from: usize, stops: &[&[u8]]) -> usize {
    tokens[from..]
        .iter()
        .position(|t| stops.contains(t))
        .map_or(tokens.len(), |p| from + p)
}

/// Decode an ASCII STL file.
///
/// The data is split on whitespace. The name is everything between `solid`
/// and the first `facet` or `endsolid`. From there on every facet is a block of exactly
/// 21 tokens, and the vertex coordinates are taken from fixed offsets in
/// that block. A file may hold several `solid` sections; their facets are
/// concatenated under the name of the first one. Any other token between
/// facets is an error.
fn parse_ascii(data: &[u8], encoding: &'static Encoding) -> Result<Stl> {
    let tokens: Vec<&[u8]> = data
        .split(u8::is_ascii_whitespace)
        .filter(|t| !t.is_empty())
        .collect();

    let solid = tokens
        .iter()
        .position(|t| *t == b"solid")
        .ok_or_else(|| Error::format("missing 'solid' keyword"))?;
    let first = tokens
        .iter()
        .position(|t| *t == b"facet")
        .ok_or_else(|| Error::format("missing 'facet' keyword"))?;
    if first < solid {
        return Err(Error::format("'facet' appears before 'solid'"));
    }

    let mut cursor = next_keyword(&tokens, solid + 1, &[b"facet", b"endsolid"]);
    let name = tokens[solid + 1..cursor]
        .iter()
        .map(|t| decode(t, encoding))
        .collect::<Result<Vec<_>>>()?
        .join(" ");

    let mut vertices = Vec::new();
    loop {
        while matches!(tokens.get(cursor), Some(t) if *t == b"facet") {
            let block = tokens.get(cursor..cursor + FACET_TOKENS).ok_or_else(|| {
                Error::format(format!("facet {} is truncated", vertices.len() / 3 + 1))
            })?;
            for offset in VERTEX_OFFSETS {
                vertices.push(Point3::new(
                    coordinate(block[offset])?,
                    coordinate(block[offset + 1])?,
                    coordinate(block[offset + 2])?,
                ));
            }
            cursor += FACET_TOKENS;
        }

        match tokens.get(cursor) {
            None => break,
            Some(t) if *t == b"endsolid" => {
                // Skip the repeated name up to the next section.
                cursor = next_keyword(&tokens, cursor + 1, &[b"solid"]);
                if cursor == tokens.len() {
                    break;
                }
                cursor = next_keyword(&tokens, cursor + 1, &[b"facet", b"endsolid"]);
            }
            Some(t) => {
                return Err(Error::format(format!(
                    "unexpected '{}' after facet {}",
                    String::from_utf8_lossy(t),
                    vertices.len() / 3
                )))
            }
        }
    }

    Ok(Stl { name, vertices })
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_8, WINDOWS_1252};

    const TWO_FACETS: &str = "solid two facets
  facet normal 0 0 0
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
  facet normal 0 0 1
    outer loop
      vertex 1 0 0
      vertex 1.5 1e1 -2.25
      vertex 0 1 0
    endloop
  endfacet
endsolid two facets
";

    fn binary(name: &[u8], facets: &[[f32; 9]], declared: u32) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_SIZE];
        data[..name.len()].copy_from_slice(name);
        data.extend_from_slice(&declared.to_le_bytes());
        for facet in facets {
            data.extend_from_slice(&[0u8; 12]);
            for c in facet {
                data.extend_from_slice(&c.to_le_bytes());
            }
            data.extend_from_slice(&[0u8; 2]);
        }
        data
    }

    #[test]
    fn test_parse_ascii() {
        let stl = parse_stl(TWO_FACETS.as_bytes(), &ReadOptions::default()).unwrap();
        assert_eq!(stl.name, "two facets");
        assert_eq!(stl.vertices.len(), 6);
        assert_eq!(stl.facet_count(), 2);
        assert_eq!(stl.vertices[4], Point3::new(1.5, 10.0, -2.25));
    }

    #[test]
    fn test_parse_ascii_without_name() {
        let text = TWO_FACETS.replacen("solid two facets", "solid", 1);
        let stl = parse_stl(text.as_bytes(), &ReadOptions::default()).unwrap();
        assert_eq!(stl.name, "");
        assert_eq!(stl.facet_count(), 2);
    }

    #[test]
    fn test_parse_ascii_missing_solid() {
        let text = TWO_FACETS.replacen("solid", "object", 1);
        let result = parse_ascii(text.as_bytes(), UTF_8);
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_parse_ascii_missing_facet() {
        let result = parse_ascii(b"solid empty\nendsolid empty\n", UTF_8);
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_parse_ascii_truncated() {
        let text = &TWO_FACETS[..TWO_FACETS.rfind("endloop").unwrap()];
        let result = parse_stl(text.as_bytes(), &ReadOptions::default());
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_parse_ascii_bad_number() {
        let text = TWO_FACETS.replacen("1.5", "1.5x", 1);
        let result = parse_stl(text.as_bytes(), &ReadOptions::default());
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_parse_ascii_name_encoding() {
        let mut data = b"solid caf\xe9\n".to_vec();
        data.extend_from_slice(&TWO_FACETS.as_bytes()[TWO_FACETS.find('\n').unwrap() + 1..]);

        let result = parse_stl(&data, &ReadOptions::default());
        assert!(matches!(result, Err(Error::Decode { .. })));

        let options = ReadOptions {
            encoding: WINDOWS_1252,
        };
        let stl = parse_stl(&data, &options).unwrap();
        assert_eq!(stl.name, "café");
    }

    #[test]
    fn test_parse_ascii_several_solids() {
        let text = format!("{TWO_FACETS}{}", TWO_FACETS.replace("two facets", "more"));
        let stl = parse_stl(text.as_bytes(), &ReadOptions::default()).unwrap();
        assert_eq!(stl.name, "two facets");
        assert_eq!(stl.facet_count(), 4);
        assert_eq!(stl.vertices[10], Point3::new(1.5, 10.0, -2.25));
    }

    #[test]
    fn test_parse_ascii_empty_solid_section() {
        let text = format!("solid nothing\nendsolid nothing\n{TWO_FACETS}");
        let stl = parse_stl(text.as_bytes(), &ReadOptions::default()).unwrap();
        assert_eq!(stl.name, "nothing");
        assert_eq!(stl.facet_count(), 2);
    }

    #[test]
    fn test_parse_ascii_without_endsolid() {
        let text = &TWO_FACETS[..TWO_FACETS.rfind("endsolid").unwrap()];
        let stl = parse_stl(text.as_bytes(), &ReadOptions::default()).unwrap();
        assert_eq!(stl.facet_count(), 2);
    }

    #[test]
    fn test_parse_ascii_stray_token_between_facets() {
        let text = TWO_FACETS.replacen("  endfacet\n", "  endfacet\ncolor 1 0 0\n", 1);
        let result = parse_stl(text.as_bytes(), &ReadOptions::default());
        match result {
            Err(Error::Format(message)) => {
                assert!(message.contains("'color'"));
                assert!(message.contains("facet 1"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_parse_binary_color_header() {
        let facets = [[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]];
        let mut name = b"COLOR=\xff\x80\x40\xffMATERIAL=".to_vec();
        name.extend_from_slice(&[0xe6, 0x10, 0x20, 0xff]);
        let data = binary(&name, &facets, 1);
        let stl = parse_stl(&data, &ReadOptions::default()).unwrap();
        assert_eq!(stl.name, "");
        assert_eq!(stl.facet_count(), 1);
    }

    #[test]
    fn test_parse_binary() {
        let facets = [
            [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            [1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.5],
        ];
        let data = binary(b"solid wedge", &facets, 2);
        let stl = parse_stl(&data, &ReadOptions::default()).unwrap();
        assert_eq!(stl.name, "wedge");
        assert_eq!(stl.vertices.len(), 6);
        assert_eq!(stl.vertices[5], Point3::new(0.0, 1.0, 0.5));
    }

    #[test]
    fn test_parse_binary_empty() {
        let data = binary(b"", &[], 0);
        let stl = parse_stl(&data, &ReadOptions::default()).unwrap();
        assert_eq!(stl.name, "");
        assert!(stl.vertices.is_empty());
    }

    #[test]
    fn test_parse_binary_count_mismatch() {
        let facets = [[0.0; 9]];
        let data = binary(b"bad", &facets, 2);
        let result = parse_stl(&data, &ReadOptions::default());
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_parse_binary_too_short() {
        let result = parse_stl(&[0u8; 40], &ReadOptions::default());
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_binary_name_stops_at_nul() {
        let mut header = [0u8; HEADER_SIZE];
        header[..5].copy_from_slice(b"part ");
        header[6] = 0xff;
        assert_eq!(binary_name(&header, UTF_8).unwrap(), "part");
    }
}
