//! CSV catalog loader.
//!
//! Supports two shapes:
//! - **Columns**: a header row names one concept per column; every cell below
//!   holds comma-separated values for that concept.
//! - **Rows**: no header; the first column is the concept name and the
//!   remaining columns are its values.
//!
//! Malformed rows (column count mismatch, undecodable bytes) are skipped and
//! counted. Only an unreadable source is fatal.

use std::path::Path;

use super::error::{CatalogError, CatalogResult};
use super::{CatalogBuilder, ConceptCatalog};

/// Shape of a catalog source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CatalogFormat {
    /// Header row of concept names, one concept per column.
    #[default]
    Columns,
    /// `concept,value,value,...` per row, no header.
    Rows,
}

impl std::fmt::Display for CatalogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Columns => write!(f, "columns"),
            Self::Rows => write!(f, "rows"),
        }
    }
}

impl std::str::FromStr for CatalogFormat {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "columns" | "column" | "header" => Ok(Self::Columns),
            "rows" | "row" | "raw" => Ok(Self::Rows),
            other => Err(CatalogError::UnknownFormat {
                format: other.to_string(),
            }),
        }
    }
}

/// Load a catalog file.
pub fn load(path: &Path, format: CatalogFormat) -> CatalogResult<ConceptCatalog> {
    let file = std::fs::File::open(path).map_err(|e| CatalogError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let catalog = from_reader(file, format).map_err(|e| match e {
        CatalogError::Io { source, .. } => CatalogError::Io {
            path: path.display().to_string(),
            source,
        },
        other => other,
    })?;
    tracing::info!(
        path = %path.display(),
        %format,
        concepts = catalog.len(),
        values = catalog.value_count(),
        skipped_rows = catalog.skipped_rows(),
        "catalog loaded"
    );
    Ok(catalog)
}

/// Build a catalog from any CSV byte source.
pub fn from_reader<R: std::io::Read>(
    reader: R,
    format: CatalogFormat,
) -> CatalogResult<ConceptCatalog> {
    let builder = match format {
        CatalogFormat::Columns => read_columns(reader)?,
        CatalogFormat::Rows => read_rows(reader)?,
    };
    builder.build()
}

fn read_columns<R: std::io::Read>(reader: R) -> CatalogResult<CatalogBuilder> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut builder = CatalogBuilder::default();
    for header in &headers {
        builder.declare(header);
    }

    for (idx, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(csv_error(e)),
            Err(e) => {
                tracing::warn!(row = idx + 2, "skipping malformed catalog row: {e}");
                builder.skip_row();
                continue;
            }
        };
        for (header, cell) in headers.iter().zip(record.iter()) {
            if header.is_empty() {
                continue;
            }
            builder.insert_cell(header, cell);
        }
    }

    Ok(builder)
}

fn read_rows<R: std::io::Read>(reader: R) -> CatalogResult<CatalogBuilder> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut builder = CatalogBuilder::default();
    for (idx, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(csv_error(e)),
            Err(e) => {
                tracing::warn!(row = idx + 1, "skipping malformed catalog row: {e}");
                builder.skip_row();
                continue;
            }
        };
        let mut fields = record.iter();
        let concept = fields.next().map(str::trim).unwrap_or("");
        if concept.is_empty() {
            tracing::warn!(row = idx + 1, "skipping catalog row without a concept name");
            builder.skip_row();
            continue;
        }
        builder.declare(concept);
        for cell in fields {
            builder.insert_cell(concept, cell);
        }
    }

    Ok(builder)
}

fn csv_error(e: csv::Error) -> CatalogError {
    match e.into_kind() {
        csv::ErrorKind::Io(source) => CatalogError::Io {
            path: "<reader>".into(),
            source,
        },
        other => CatalogError::Csv {
            message: format!("{other:?}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(catalog: &ConceptCatalog, concept: &str) -> Vec<String> {
        catalog
            .get(concept)
            .map(|c| c.values().iter().map(|v| v.text().to_string()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn columns_format_basic() {
        let csv = "titre,acteur1,acteur2,acteur3,annee,genre\n\
                   Mamma Mia!,Meryl Streep,Amanda Seyfried,Colin Firth,2008,\"Comédie, Musical\"\n\
                   Les Misérables,Hugh Jackman,Russell Crowe,Anne Hathaway,2012,Drame\n";
        let catalog = from_reader(csv.as_bytes(), CatalogFormat::Columns).unwrap();

        assert_eq!(
            catalog.concept_names().collect::<Vec<_>>(),
            vec!["titre", "acteur", "annee", "genre"]
        );
        assert_eq!(values(&catalog, "acteur").len(), 6);
        assert_eq!(values(&catalog, "genre"), vec!["Comédie", "Drame", "Musical"]);
        assert_eq!(values(&catalog, "annee"), vec!["2008", "2012"]);
    }

    #[test]
    fn columns_format_deduplicates_across_numbered_columns() {
        let csv = "acteur1,acteur2,acteur3\n\
                   Meryl Streep,Hugh Jackman,\n\
                   Hugh Jackman,Meryl Streep,Meryl Streep\n";
        let catalog = from_reader(csv.as_bytes(), CatalogFormat::Columns).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(values(&catalog, "acteur"), vec!["Hugh Jackman", "Meryl Streep"]);
    }

    #[test]
    fn columns_format_skips_ragged_rows() {
        let csv = "titre,annee\nAlien,1979\nBroken,row,extra\nHeat,1995\n";
        let catalog = from_reader(csv.as_bytes(), CatalogFormat::Columns).unwrap();
        assert_eq!(catalog.skipped_rows(), 1);
        assert_eq!(values(&catalog, "titre"), vec!["Alien", "Heat"]);
    }

    #[test]
    fn columns_format_empty_source() {
        let catalog = from_reader("".as_bytes(), CatalogFormat::Columns).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn rows_format_basic() {
        let csv = "acteur,Meryl Streep,Hugh Jackman\n\
                   genre,Drame\n\
                   acteur2,Nicolas Cage\n\
                   ,orphan value\n";
        let catalog = from_reader(csv.as_bytes(), CatalogFormat::Rows).unwrap();
        assert_eq!(
            catalog.concept_names().collect::<Vec<_>>(),
            vec!["acteur", "genre"]
        );
        assert_eq!(
            values(&catalog, "acteur"),
            vec!["Hugh Jackman", "Meryl Streep", "Nicolas Cage"]
        );
        assert_eq!(catalog.skipped_rows(), 1);
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load(Path::new("/nonexistent/base_films.csv"), CatalogFormat::Columns)
            .unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn format_from_str() {
        assert_eq!("columns".parse::<CatalogFormat>().unwrap(), CatalogFormat::Columns);
        assert_eq!("Rows".parse::<CatalogFormat>().unwrap(), CatalogFormat::Rows);
        assert!("xml".parse::<CatalogFormat>().is_err());
    }
}
