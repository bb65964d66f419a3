//! End-to-end behaviour of api methods over the in-memory source

use fragments_sdk::testing::MemorySource;
use fragments_sdk::{
    Api, Binding, CancelToken, Entity, EntityError, EntityFetcher, Episode, Fetched, GenericEntity, Params,
    ResultMode, Series,
};
use std::sync::Arc;
use std::time::Duration;

fn build_api(source: MemorySource) -> Api<MemorySource> {
    Api::with_default_methods(EntityFetcher::new(source))
}

fn entity_row(id: &str, name: &str) -> Binding {
    Binding::new()
        .with("?id", format!("<{}>", id))
        .with("?name", format!("\"{}\"", name))
}

#[tokio::test]
async fn test_find_builds_query_from_params() {
    let api = build_api(MemorySource::new());
    let found = api
        .find::<GenericEntity>("find_entities", Params::new().with("name", "Entity"))
        .await
        .unwrap();
    assert!(found.is_empty());

    assert_eq!(
        api.fetcher().source().executed_queries().await,
        vec!["SELECT * WHERE { ?id a Entity ; name \"Entity\" ; age ?age . }"]
    );
}

#[tokio::test]
async fn test_rows_become_entities_in_order() {
    let source = MemorySource::new().with_default_rows(vec![
        entity_row("http://example.org/c", "Carol"),
        entity_row("http://example.org/a", "Alice"),
        entity_row("http://example.org/b", "Bob"),
    ]);
    let api = build_api(source);

    let found = api.find::<GenericEntity>("find_entities", Params::new()).await.unwrap();
    let names: Vec<_> = found.iter().map(|e| e.name().unwrap_or_default()).collect();
    assert_eq!(names, vec!["Carol", "Alice", "Bob"]);
}

#[tokio::test]
async fn test_same_id_resolves_to_same_instance() {
    let source = MemorySource::new().with_default_rows(vec![entity_row("http://example.org/e1", "Alice")]);
    let api = build_api(source);
    let params = || Params::with_id("http://example.org/e1");

    let first = api.get::<GenericEntity>("get_entity_by_id", params()).await.unwrap().unwrap();
    let second = api.get::<GenericEntity>("get_entity_by_id", params()).await.unwrap().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    // the second call is served from the factory without running a query
    assert_eq!(api.fetcher().source().execution_count().await, 1);

    let listed = api.find::<GenericEntity>("find_entities", Params::new()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(Arc::ptr_eq(&first, &listed[0]));
}

#[tokio::test]
async fn test_concurrent_gets_share_one_instance() {
    let source = MemorySource::new().with_default_rows(vec![entity_row("http://example.org/e1", "Alice")]);
    let api = build_api(source);

    let (a, b) = tokio::join!(
        api.get::<GenericEntity>("get_entity_by_id", Params::with_id("http://example.org/e1")),
        api.get::<GenericEntity>("get_entity_by_id", Params::with_id("http://example.org/e1")),
    );
    let a = a.unwrap().unwrap();
    let b = b.unwrap().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(api.fetcher().factory::<GenericEntity>().unwrap().len(), 1);
}

#[tokio::test]
async fn test_single_fetch_merges_params_as_defaults() {
    let source = MemorySource::new().with_default_rows(vec![Binding::new().with("?title", "\"Lost\"")]);
    let api = build_api(source);

    let series = api
        .get::<Series>("get_series_by_id", Params::with_id("http://example.org/series/lost").with("seasons", 6))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(series.id(), "http://example.org/series/lost");
    assert_eq!(series.title(), Some("Lost"));
    assert_eq!(series.seasons(), Some("6"));
    assert_eq!(series.binding().get("?id"), Some("<http://example.org/series/lost>"));
}

#[tokio::test]
async fn test_missing_entity_is_not_cached() {
    let api = build_api(MemorySource::new());

    for _ in 0..2 {
        let found = api
            .get::<Series>("get_series_by_id", Params::with_id("http://example.org/series/none"))
            .await
            .unwrap();
        assert!(found.is_none());
    }
    assert_eq!(api.fetcher().source().execution_count().await, 2);
}

#[tokio::test]
async fn test_missing_identifier_runs_nothing() {
    let api = build_api(MemorySource::new());
    let err = api
        .call::<Series>("get_series_by_id", Params::new().with("title", "Lost"))
        .await
        .unwrap_err();
    assert!(matches!(err, EntityError::MissingIdentifier { .. }));
    assert!(!err.is_recoverable());
    assert!(api.fetcher().source().executed_queries().await.is_empty());
}

#[tokio::test]
async fn test_undeclared_param_fails_before_executing() {
    let with_row = MemorySource::new().with_default_rows(vec![Binding::new().with("?title", "\"Lost\"")]);
    for source in [MemorySource::new(), with_row] {
        let api = build_api(source);
        let params = Params::with_id("http://example.org/series/lost").with("color", "red");

        let err = api.get::<Series>("get_series_by_id", params).await.unwrap_err();
        assert!(matches!(
            err,
            EntityError::UndeclaredVariable { ref entity_type, ref variable }
                if entity_type == "Series" && variable == "color"
        ));

        let err = api
            .find::<Series>("find_series", Params::new().with("color", "red"))
            .await
            .unwrap_err();
        assert!(matches!(err, EntityError::UndeclaredVariable { .. }));
        assert_eq!(api.fetcher().source().execution_count().await, 0);
    }
}

#[tokio::test]
async fn test_source_that_never_completes_never_resolves() {
    let source = MemorySource::new()
        .with_default_rows(vec![entity_row("http://example.org/e1", "Alice")])
        .hanging();
    let api = build_api(source);

    let single = tokio::time::timeout(
        Duration::from_millis(50),
        api.get::<GenericEntity>("get_entity_by_id", Params::with_id("http://example.org/e1")),
    )
    .await;
    assert!(single.is_err());

    let multiple = tokio::time::timeout(
        Duration::from_millis(50),
        api.find::<GenericEntity>("find_entities", Params::new()),
    )
    .await;
    assert!(multiple.is_err());
}

#[tokio::test]
async fn test_cancel_ends_a_hanging_fetch() {
    let api = build_api(MemorySource::new().hanging());
    let cancel = CancelToken::new();

    let canceller = {
        let cancel = cancel.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cancel.cancel();
        }
    };
    let (result, _) = tokio::join!(
        api.call_with_cancel::<Series>("find_series", Params::new(), cancel),
        canceller,
    );

    let err = result.unwrap_err();
    assert!(matches!(err, EntityError::Cancelled { ref entity_type } if entity_type == "Series"));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_source_failures_surface_as_source_errors() {
    let api = build_api(MemorySource::new().failing("endpoint went away"));
    let err = api.find::<Series>("find_series", Params::new()).await.unwrap_err();
    assert!(matches!(err, EntityError::Source { ref reason, .. } if reason == "endpoint went away"));

    let api = build_api(MemorySource::new().rejecting("malformed query"));
    let err = api
        .get::<Series>("get_series_by_id", Params::with_id("http://example.org/series/lost"))
        .await
        .unwrap_err();
    assert!(matches!(err, EntityError::Source { ref entity_type, .. } if entity_type == "Series"));
    assert!(api.fetcher().factory::<Series>().unwrap().is_empty());
}

#[tokio::test]
async fn test_episodes_of_series_use_custom_query() {
    let query = "SELECT * WHERE { ?id a <http://schema.org/TVEpisode> ; \
                 <http://schema.org/partOfSeries> <http://example.org/series/lost> ; \
                 <http://schema.org/name> ?title ; \
                 <http://schema.org/episodeNumber> ?number . } ORDER BY ?number";
    let source = MemorySource::new().on_query(
        query,
        vec![
            Binding::new()
                .with("?id", "<http://example.org/episode/1>")
                .with("?title", "\"Pilot\"")
                .with("?number", "\"1\"^^http://www.w3.org/2001/XMLSchema#integer"),
            Binding::new()
                .with("?id", "<http://example.org/episode/2>")
                .with("?title", "\"Tabula Rasa\"")
                .with("?number", "\"2\"^^http://www.w3.org/2001/XMLSchema#integer"),
        ],
    );
    let api = build_api(source);

    let episodes = match api
        .call::<Episode>(
            "find_episodes_of_series",
            Params::new().with("series", "http://example.org/series/lost"),
        )
        .await
        .unwrap()
    {
        Fetched::Many(all) => all,
        Fetched::One(_) => panic!("expected a list"),
    };

    assert_eq!(episodes.len(), 2);
    assert_eq!(episodes[0].title(), Some("Pilot"));
    assert_eq!(episodes[1].number(), Some("2"));
    assert!(episodes.iter().all(|e| e.series() == Some("http://example.org/series/lost")));
}

#[tokio::test]
async fn test_custom_kind_registration() {
    let mut api = Api::new(EntityFetcher::new(
        MemorySource::new().with_default_rows(vec![entity_row("http://example.org/e9", "Zed")]),
    ));
    assert!(api.method_names().is_empty());

    api.register::<GenericEntity>("people", ResultMode::Multiple, None);
    let people = api.find::<GenericEntity>("people", Params::new()).await.unwrap();
    assert_eq!(people[0].id(), "http://example.org/e9");
}

#[tokio::test]
async fn test_entities_serialize_to_json() {
    let source = MemorySource::new().with_default_rows(vec![entity_row("http://example.org/e1", "Alice")]);
    let api = build_api(source);
    let entity = api
        .get::<GenericEntity>("get_entity_by_id", Params::with_id("http://example.org/e1"))
        .await
        .unwrap()
        .unwrap();

    let json = serde_json::to_value(entity.as_ref()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "id": "http://example.org/e1", "name": "Alice", "age": null })
    );
}
