use super::criteria::SearchCriteria;
use super::engine::SearchError;
use crate::models::catalog::Taxonomy;
use crate::models::storage::CatalogSnapshot;

/// Confirms that the kind and genre a search filters on exist. A missing
/// reference is reported as `NotFound` instead of an empty result. Kind is
/// checked before genre and the first failure wins.
pub async fn validate_references(
    snapshot: &mut dyn CatalogSnapshot,
    criteria: &SearchCriteria,
) -> Result<(), SearchError> {
    let references = [
        (Taxonomy::Kind, criteria.kind_id),
        (Taxonomy::Genre, criteria.genre_id),
    ];

    for (taxonomy, id) in references {
        let Some(id) = id else { continue };
        if !snapshot.term_exists(taxonomy, id).await? {
            return Err(SearchError::NotFound {
                entity: taxonomy.into(),
                id,
            });
        }
    }

    Ok(())
}
