use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use std::path::Path;

use crate::sketch::Edge;

/// Weight used when a line carries only `source dest`.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// One edge-list line: `source dest [weight]`, tab or space separated.
/// Comments (`#`) and blank lines yield `None`.
pub fn parse_edge_line(line: &str, lineno: usize) -> Result<Option<Edge>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut cols = line.split_whitespace();
    let (Some(source), Some(dest)) = (cols.next(), cols.next()) else {
        bail!("line {lineno}: expected `source dest [weight]`, got {line:?}");
    };
    let weight = match cols.next() {
        Some(w) => w
            .parse::<f64>()
            .with_context(|| format!("line {lineno}: bad weight {w:?}"))?,
        None => DEFAULT_WEIGHT,
    };
    Ok(Some(Edge::new(source, dest, weight)))
}

/// Parses a whole edge list, keeping file order.
pub fn parse_edge_list(text: &str) -> Result<Vec<Edge>> {
    let lines: Vec<(usize, &str)> = text.lines().enumerate().collect();
    let parsed: Vec<Option<Edge>> = lines
        .par_iter()
        .map(|&(i, l)| parse_edge_line(l, i + 1))
        .collect::<Result<_>>()?;
    Ok(parsed.into_iter().flatten().collect())
}

pub fn read_edge_list(path: &Path) -> Result<Vec<Edge>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("open {}", path.display()))?;
    parse_edge_list(&text).with_context(|| format!("parse {}", path.display()))
}

/// `src:dst` query spec from the command line.
pub fn parse_query(spec: &str) -> Result<(String, String)> {
    match spec.split_once(':') {
        Some((s, d)) if !s.is_empty() && !d.is_empty() => Ok((s.to_string(), d.to_string())),
        _ => bail!("query {spec:?} must look like `source:dest`"),
    }
}
