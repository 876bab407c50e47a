//! Rich diagnostic error types for the concept catalog.

use miette::Diagnostic;
use thiserror::Error;

/// Errors from loading or building a concept catalog.
#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("cannot read catalog \"{path}\": {source}")]
    #[diagnostic(
        code(intent::catalog::io),
        help(
            "The catalog file could not be opened or read. Check that the path \
             exists and is readable, e.g. `--catalog base_films_500.csv`."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in catalog: {message}")]
    #[diagnostic(
        code(intent::catalog::csv),
        help(
            "The catalog header could not be decoded. The column format expects a \
             UTF-8 header row naming one concept per column; the row format expects \
             `concept,value,value,...` lines without a header."
        )
    )]
    Csv { message: String },

    #[error("unknown catalog format: \"{format}\"")]
    #[diagnostic(
        code(intent::catalog::unknown_format),
        help("Supported catalog formats are \"columns\" and \"rows\".")
    )]
    UnknownFormat { format: String },

    #[error("value \"{value}\" cannot be compiled into a match pattern: {message}")]
    #[diagnostic(
        code(intent::catalog::pattern),
        help(
            "Catalog values are escaped before compilation, so this only happens for \
             values exceeding the regex size limit. Shorten or split the cell."
        )
    )]
    Pattern { value: String, message: String },
}

/// Convenience alias for catalog results.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
