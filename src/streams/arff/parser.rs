use crate::core::attributes::{Attribute, AttributeRef, NominalAttribute, NumericAttribute};
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::{DenseInstance, Instance, SparseInstance};
use crate::utils::file_parsing::{split_csv_preserving_quotes, strip_surrounding_quotes};
use std::fs::File;
use std::io::{BufRead, BufReader, Error, ErrorKind, Seek};
use std::sync::Arc;

pub(super) fn is_comment_or_empty(s: &str) -> bool {
    let t = s.trim();
    t.is_empty() || t.starts_with('%')
}

/// Reads the declaration section up to and including `@data`, returning the
/// header and the stream position where data rows begin. `class_index`
/// defaults to the last declared attribute.
pub(super) fn parse_header(
    reader: &mut BufReader<File>,
    class_index: Option<usize>,
) -> Result<(InstanceHeader, u64), Error> {
    let mut relation: Option<String> = None;
    let mut attributes: Vec<AttributeRef> = Vec::new();
    let mut line = String::new();

    let data_start_pos = loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(Error::new(
                ErrorKind::UnexpectedEof,
                "ARFF file ended before @data",
            ));
        }
        if is_comment_or_empty(&line) {
            continue;
        }

        let lower = line.to_lowercase();
        if lower.starts_with("@relation") {
            let raw = line.trim()["@relation".len()..].trim();
            relation = Some(strip_surrounding_quotes(raw).to_string());
        } else if lower.starts_with("@attribute") {
            attributes.push(parse_attribute_line(&line)?);
        } else if lower.starts_with("@data") {
            break reader.stream_position()?;
        } else {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("unsupported header directive: {}", line.trim()),
            ));
        }
    };

    if attributes.is_empty() {
        return Err(Error::new(
            ErrorKind::InvalidData,
            "ARFF header declares no attributes",
        ));
    }

    let class_index = class_index.unwrap_or(attributes.len() - 1);
    if class_index >= attributes.len() {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!(
                "class index {class_index} out of range for {} attributes",
                attributes.len()
            ),
        ));
    }

    let header = InstanceHeader::new(
        relation.unwrap_or_else(|| "unnamed".to_string()),
        attributes,
        class_index,
    );
    Ok((header, data_start_pos))
}

fn parse_attribute_line(line: &str) -> Result<AttributeRef, Error> {
    let rest = line.trim()["@attribute".len()..].trim();

    if let Some(brace) = rest.find('{') {
        let name = strip_surrounding_quotes(rest[..brace].trim()).to_string();
        let end = rest.rfind('}').ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidData,
                format!("unterminated nominal domain: {rest}"),
            )
        })?;
        let values: Vec<String> = rest[brace + 1..end]
            .split(',')
            .map(|v| strip_surrounding_quotes(v.trim()).to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if values.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("nominal attribute '{name}' declares no values"),
            ));
        }
        return Ok(Arc::new(NominalAttribute::with_values(name, values)) as AttributeRef);
    }

    let (name, kind) = rest.rsplit_once(char::is_whitespace).ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidData,
            format!("malformed attribute declaration: {rest}"),
        )
    })?;
    let name = strip_surrounding_quotes(name.trim()).to_string();
    match kind.trim().to_lowercase().as_str() {
        "numeric" | "real" | "integer" => {
            Ok(Arc::new(NumericAttribute::new(name)) as AttributeRef)
        }
        other => Err(Error::new(
            ErrorKind::InvalidData,
            format!("unsupported attribute type '{other}'"),
        )),
    }
}

/// Parses one data row, dense (`v1,v2,...`) or sparse (`{idx value, ...}`).
pub(super) fn parse_data_line(
    header: &Arc<InstanceHeader>,
    line: &str,
) -> Result<Box<dyn Instance>, Error> {
    let t = line.trim();
    if t.starts_with('{') {
        parse_sparse_line(header, t)
    } else {
        parse_dense_line(header, t)
    }
}

fn parse_dense_line(
    header: &Arc<InstanceHeader>,
    line: &str,
) -> Result<Box<dyn Instance>, Error> {
    let fields = split_csv_preserving_quotes(line);
    if fields.len() != header.number_of_attributes() {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!(
                "row has {} values, header declares {}",
                fields.len(),
                header.number_of_attributes()
            ),
        ));
    }

    let mut values = Vec::with_capacity(fields.len());
    for (index, field) in fields.iter().enumerate() {
        let attribute = header
            .attribute_at_index(index)
            .ok_or_else(|| Error::new(ErrorKind::InvalidData, "attribute index out of range"))?;
        values.push(parse_value(attribute, field)?);
    }

    Ok(Box::new(DenseInstance::new(Arc::clone(header), values, 1.0)))
}

fn parse_sparse_line(
    header: &Arc<InstanceHeader>,
    line: &str,
) -> Result<Box<dyn Instance>, Error> {
    let inner = line
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidData,
                format!("unterminated sparse row: {line}"),
            )
        })?;

    let mut pairs = Vec::new();
    for entry in split_csv_preserving_quotes(inner) {
        if entry.is_empty() {
            continue;
        }
        let (index, value) = entry.split_once(char::is_whitespace).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidData,
                format!("sparse entry without value: '{entry}'"),
            )
        })?;
        let index: usize = index.trim().parse().map_err(|_| {
            Error::new(
                ErrorKind::InvalidData,
                format!("invalid sparse index: '{index}'"),
            )
        })?;
        let attribute = header.attribute_at_index(index).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidData,
                format!("sparse index {index} out of range"),
            )
        })?;
        pairs.push((index, parse_value(attribute, value.trim())?));
    }

    Ok(Box::new(SparseInstance::new(Arc::clone(header), pairs, 1.0)))
}

fn parse_value(attribute: &dyn Attribute, raw: &str) -> Result<f64, Error> {
    let raw = strip_surrounding_quotes(raw.trim());
    if raw == "?" {
        return Ok(f64::NAN);
    }

    if let Some(nominal) = attribute.as_any().downcast_ref::<NominalAttribute>() {
        return nominal.index_of_value(raw).map(|i| i as f64).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidData,
                format!("'{raw}' is not in the domain of '{}'", attribute.name()),
            )
        });
    }

    raw.parse::<f64>().map_err(|_| {
        Error::new(
            ErrorKind::InvalidData,
            format!("'{raw}' is not numeric for '{}'", attribute.name()),
        )
    })
}
