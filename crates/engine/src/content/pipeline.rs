use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::AppPaths;

use super::catalog::RoomCatalog;
use super::compiler::{parse_catalog_document, read_error, ContentCompileError};
use super::validation::CatalogIntegrityError;

#[derive(Debug, Error)]
pub enum ContentPipelineError {
    #[error(transparent)]
    Compile(#[from] ContentCompileError),
    #[error("chapter '{chapter}' failed integrity checks: {source}")]
    Integrity {
        chapter: String,
        #[source]
        source: CatalogIntegrityError,
    },
}

/// Compiles one chapter document and validates the result.
pub fn compile_room_catalog(
    chapter: &str,
    file_path: &Path,
    raw_xml: &str,
) -> Result<RoomCatalog, ContentPipelineError> {
    let compiled = parse_catalog_document(chapter, file_path, raw_xml)?;
    RoomCatalog::new(
        chapter,
        compiled.walls,
        compiled.flags,
        compiled.inspectables,
    )
    .map_err(|source| ContentPipelineError::Integrity {
        chapter: chapter.to_string(),
        source,
    })
}

pub fn load_room_catalog(
    app_paths: &AppPaths,
    chapter: &str,
) -> Result<RoomCatalog, ContentPipelineError> {
    let file_path = app_paths.chapter_path(chapter);
    let raw = fs::read_to_string(&file_path)
        .map_err(|source| read_error(chapter, file_path.clone(), source))?;
    let catalog = compile_room_catalog(chapter, &file_path, &raw)?;

    info!(
        chapter = %chapter,
        path = %file_path.display(),
        zone_count = catalog.zones().count(),
        flag_count = catalog.declared_flags().len(),
        inspectable_count = catalog.inspectables().len(),
        "room_catalog_loaded"
    );
    Ok(catalog)
}
