//! Page-by-page execution of a search against the engine.
//!
//! One logical search issues one page request in paged mode, or repeated
//! offset-advancing requests in fetch-all mode until the accumulated count
//! reaches the engine's reported total. The fetch-all cursor is the
//! accumulated result size, not a stable token: if the underlying document
//! set changes between pages, entries can be skipped or duplicated.

pub mod materialize;

use ahash::AHashSet;
use log::{debug, error, warn};

use crate::compile;
use crate::engine::client::EngineClient;
use crate::engine::request::EngineRequest;
use crate::error::Result;
use crate::request::{DEFAULT_PAGE_SIZE, SearchQuery};
use crate::result::{ResultInfo, SearchResult};

/// Engine page size forced in fetch-all mode.
pub const ALL_BATCH_SIZE: usize = 10_000;

/// Execute one logical search and materialize its result.
///
/// Transport failures degrade to an empty result with zero-valued metadata
/// unless the query is strict, in which case the error is returned. Compile
/// errors always propagate: they indicate an invalid caller-constructed
/// request.
pub fn run<E: EngineClient + ?Sized>(
    engine: &E,
    search_query: &SearchQuery,
) -> Result<SearchResult> {
    let request = prepare(search_query)?;
    match run_pages(engine, request, search_query) {
        Ok(result) => Ok(result),
        Err(err) if search_query.strict => Err(err),
        Err(err) => {
            error!("search failed, degrading to empty result: {err}");
            let mut result = SearchResult::default();
            extend(&mut result.info, 0, search_query);
            Ok(result)
        }
    }
}

/// Execute one logical search and accumulate only document identifiers.
///
/// Transport failures always degrade silently to the empty set; there is no
/// strict mode. Compile errors still propagate.
pub fn ids<E: EngineClient + ?Sized>(
    engine: &E,
    search_query: &SearchQuery,
) -> Result<AHashSet<String>> {
    let request = prepare(search_query)?;
    match run_id_pages(engine, request, search_query) {
        Ok(ids) => Ok(ids),
        Err(err) => {
            error!("id search failed, degrading to empty set: {err}");
            Ok(AHashSet::new())
        }
    }
}

fn run_pages<E: EngineClient + ?Sized>(
    engine: &E,
    mut request: EngineRequest,
    search_query: &SearchQuery,
) -> Result<SearchResult> {
    let mut result = SearchResult::default();
    let mut total_hits = 0;
    loop {
        if !search_query.paged {
            request.set_from(result.data.len());
        }
        let response = engine.execute(&request)?;
        let page_hits = response.hits.len();
        for hit in &response.hits {
            result.data.push(materialize::hit(hit, search_query));
        }
        total_hits = response.total_hits;
        result
            .aggregations
            .extend(materialize::aggregations(&response));
        debug!(
            "accumulated {} of {total_hits} hits",
            result.data.len()
        );
        if search_query.paged || result.data.len() as u64 >= total_hits {
            break;
        }
        if page_hits == 0 {
            // An empty page cannot advance the offset cursor.
            warn!(
                "engine returned no hits at offset {} with {total_hits} total, stopping early",
                result.data.len()
            );
            break;
        }
    }
    result.info.count = result.data.len() as u64;
    extend(&mut result.info, total_hits, search_query);
    Ok(result)
}

fn run_id_pages<E: EngineClient + ?Sized>(
    engine: &E,
    mut request: EngineRequest,
    search_query: &SearchQuery,
) -> Result<AHashSet<String>> {
    let mut ids = AHashSet::new();
    loop {
        if !search_query.paged {
            request.set_from(ids.len());
        }
        let response = engine.execute(&request)?;
        let page_hits = response.hits.len();
        for hit in &response.hits {
            ids.insert(hit.id.clone());
        }
        if search_query.paged || ids.len() as u64 >= response.total_hits {
            break;
        }
        if page_hits == 0 {
            warn!(
                "engine returned no hits at offset {} with {} total, stopping early",
                ids.len(),
                response.total_hits
            );
            break;
        }
    }
    Ok(ids)
}

/// Build the page request: paging, sorting, aggregations, compiled query,
/// and (in paged, non-full mode) the stored-field projection list.
fn prepare(search_query: &SearchQuery) -> Result<EngineRequest> {
    let mut request = EngineRequest::new();
    setup_paging(&mut request, search_query);
    for (field, order) in &search_query.sort_by {
        request.add_sort(field.clone(), *order);
    }
    for aggregation in &search_query.aggregations {
        request.add_aggregation(compile::aggregation::compile(aggregation));
    }
    request.set_query(compile::query::compile(search_query)?);
    if search_query.paged && !search_query.full_result {
        for field in &search_query.fields {
            request.add_field(field.name.clone());
        }
    }
    Ok(request)
}

fn setup_paging(request: &mut EngineRequest, search_query: &SearchQuery) {
    let start = search_query.page.saturating_sub(1) * search_query.page_size;
    if start > 0 {
        request.set_from(start);
    }
    if !search_query.paged {
        request.set_size(ALL_BATCH_SIZE);
    } else if search_query.page_size > 0 {
        request.set_size(search_query.page_size);
    } else {
        request.set_size(DEFAULT_PAGE_SIZE);
    }
}

/// Fill the result metadata from the engine's total and the request's paging.
fn extend(info: &mut ResultInfo, total_hits: u64, search_query: &SearchQuery) {
    info.total_count = total_hits;
    info.current_page = search_query.page;
    info.page_size = search_query.page_size;
    if search_query.page_size != 0 {
        info.page_count = Some(total_hits.div_ceil(search_query.page_size as u64) as usize);
    }
}
