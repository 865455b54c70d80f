//! Boundary and name fetches, joined and parsed into a region index.

use formats::{BoundaryError, NameTable, NameTableError, parse_boundaries, parse_name_table};
use futures_util::future::join;
use layers::RegionIndex;
use tracing::{info, warn};

/// Which of the two fetches a failure belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Resource {
    Boundaries,
    Names,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Boundaries => write!(f, "boundaries"),
            Resource::Names => write!(f, "names"),
        }
    }
}

#[derive(Debug)]
pub enum LoadError {
    Fetch { resource: Resource, message: String },
    Boundaries(BoundaryError),
    Names(NameTableError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Fetch { resource, message } => write!(f, "fetch {resource}: {message}"),
            LoadError::Boundaries(e) => write!(f, "boundaries: {e}"),
            LoadError::Names(e) => write!(f, "names: {e}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Fetch { .. } => None,
            LoadError::Boundaries(e) => Some(e),
            LoadError::Names(e) => Some(e),
        }
    }
}

impl From<BoundaryError> for LoadError {
    fn from(e: BoundaryError) -> Self {
        LoadError::Boundaries(e)
    }
}

impl From<NameTableError> for LoadError {
    fn from(e: NameTableError) -> Self {
        LoadError::Names(e)
    }
}

/// Supplies the raw boundary payload (TopoJSON or GeoJSON) and the name
/// table. Implementations run on a single thread.
#[allow(async_fn_in_trait)]
pub trait BoundarySource {
    async fn fetch_boundaries(&self) -> Result<String, String>;
    async fn fetch_names(&self) -> Result<String, String>;
}

/// Runs both fetches concurrently, then parses and joins them.
///
/// Either fetch failing fails the load; no partial index is built.
pub async fn load_region_index<S: BoundarySource>(
    source: &S,
    object: Option<&str>,
) -> Result<RegionIndex, LoadError> {
    info!("loading boundaries and names");
    let result = async {
        let (boundaries, names) = join(source.fetch_boundaries(), source.fetch_names()).await;
        let boundaries = boundaries.map_err(|message| LoadError::Fetch {
            resource: Resource::Boundaries,
            message,
        })?;
        let names = names.map_err(|message| LoadError::Fetch {
            resource: Resource::Names,
            message,
        })?;
        let collection = parse_boundaries(&boundaries, object)?;
        let table = NameTable::new(parse_name_table(&names)?);
        Ok(RegionIndex::load(&collection, &table))
    }
    .await;

    match &result {
        Ok(index) => info!(regions = index.len(), "boundaries loaded"),
        Err(e) => warn!(error = %e, "boundary load failed"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::{BoundarySource, LoadError, Resource, load_region_index};
    use foundation::math::GeoPoint;

    struct FixedSource {
        boundaries: Result<String, String>,
        names: Result<String, String>,
    }

    impl BoundarySource for FixedSource {
        async fn fetch_boundaries(&self) -> Result<String, String> {
            self.boundaries.clone()
        }

        async fn fetch_names(&self) -> Result<String, String> {
            self.names.clone()
        }
    }

    const BOUNDARIES: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature", "id": "250", "properties": {},
            "geometry": {"type": "Polygon", "coordinates": [[[0,40],[0,50],[8,50],[8,40],[0,40]]]}
        }]
    }"#;
    const NAMES: &str = r#"[{"name": "France", "alpha-2": "FR", "country-code": "250"}]"#;

    #[test]
    fn joins_both_payloads() {
        let source = FixedSource {
            boundaries: Ok(BOUNDARIES.to_string()),
            names: Ok(NAMES.to_string()),
        };
        let index = pollster::block_on(load_region_index(&source, None)).unwrap();
        assert_eq!(index.len(), 1);
        let hit = index.find_containing(GeoPoint::new(4.0, 45.0)).unwrap();
        assert_eq!(hit.name, "France");
        assert_eq!(hit.code, "FR");
    }

    #[test]
    fn fetch_failure_names_the_resource() {
        let source = FixedSource {
            boundaries: Ok(BOUNDARIES.to_string()),
            names: Err("HTTP 503".to_string()),
        };
        match pollster::block_on(load_region_index(&source, None)) {
            Err(LoadError::Fetch { resource, message }) => {
                assert_eq!(resource, Resource::Names);
                assert_eq!(message, "HTTP 503");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unparseable_payloads_are_typed() {
        let source = FixedSource {
            boundaries: Ok("not json".to_string()),
            names: Ok(NAMES.to_string()),
        };
        assert!(matches!(
            pollster::block_on(load_region_index(&source, None)),
            Err(LoadError::Boundaries(_))
        ));
        let source = FixedSource {
            boundaries: Ok(BOUNDARIES.to_string()),
            names: Ok("{}".to_string()),
        };
        assert!(matches!(
            pollster::block_on(load_region_index(&source, None)),
            Err(LoadError::Names(_))
        ));
    }
}
