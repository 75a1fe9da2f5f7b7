//! Federated listing against an oracle built from the full concatenation

mod support;

use common::prelude::*;
use common::window::WindowRequest as Window;
use proptest::prelude::*;
use url::Url;

use support::{items, Federation, Item};

fn window(from: u64, limit: u64, all_nodes: bool) -> Window {
    Window::new(from as i64, limit as i64, all_nodes).unwrap()
}

fn ids(items: &[Item]) -> Vec<&str> {
    items.iter().map(|i| i.0.as_str()).collect()
}

fn four_item_federation() -> Federation {
    Federation::new(
        items("local-", 1),
        vec![Some(items("a-", 1)), Some(items("b-", 2))],
    )
}

#[tokio::test]
async fn test_everything_fits_one_page() {
    let result = four_item_federation().list(window(0, 100, true)).await;
    assert_eq!(result.count, 4);
    assert_eq!(ids(&result.items), vec!["local-0", "a-0", "b-0", "b-1"]);
}

#[tokio::test]
async fn test_tail_page_links() {
    let federation = four_item_federation();
    let request = window(3, 2, true);
    let result = federation.list(request).await;

    let url = Url::parse("http://gateway.test/deployments?from=3&limit=2&allNodes=true").unwrap();
    let page = PageBuilder::new(url, request).build(result.items, result.count);

    assert_eq!(ids(&page.elements), vec!["b-1"]);
    assert!(page.next_page.is_none());
    assert_eq!(
        page.prev_page.unwrap().as_str(),
        "http://gateway.test/deployments?allNodes=true&from=1&limit=2"
    );
}

#[tokio::test]
async fn test_one_of_two_remotes_down() {
    let federation = Federation::new(items("local-", 1), vec![None, Some(items("b-", 2))]);
    let result = federation.list(window(0, 10, true)).await;
    assert_eq!(result.count, 3);
    assert_eq!(ids(&result.items), vec!["local-0", "b-0", "b-1"]);
    assert_eq!(result.failed_nodes, vec!["node-0".to_string()]);
}

#[tokio::test]
async fn test_from_beyond_total_still_reports_count() {
    let result = four_item_federation().list(window(50, 10, true)).await;
    assert!(result.items.is_empty());
    assert_eq!(result.count, 4);
}

fn federation_strategy() -> impl Strategy<Value = (usize, Vec<Option<usize>>)> {
    (
        0usize..6,
        prop::collection::vec(prop::option::weighted(0.8, 0usize..6), 0..4),
    )
}

fn build(local: usize, remotes: &[Option<usize>]) -> Federation {
    Federation::new(
        items("local-", local),
        remotes
            .iter()
            .enumerate()
            .map(|(i, n)| n.map(|n| items(&format!("r{i}-"), n)))
            .collect(),
    )
}

fn run(federation: &Federation, request: Window) -> Aggregate<Item> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
        .block_on(federation.list(request))
}

proptest! {
    #[test]
    fn window_matches_materialized_concatenation(
        (local, remotes) in federation_strategy(),
        from in 0u64..20,
        limit in 1u64..8,
        all_nodes in any::<bool>(),
    ) {
        let federation = build(local, &remotes);
        let result = run(&federation, window(from, limit, all_nodes));

        let oracle = federation.materialized(all_nodes);
        let expected: Vec<Item> = oracle
            .iter()
            .skip(from as usize)
            .take(limit as usize)
            .cloned()
            .collect();

        prop_assert_eq!(&result.items, &expected);
        prop_assert_eq!(result.count, oracle.len() as u64);
        prop_assert!(result.items.len() as u64 <= limit);
    }

    #[test]
    fn links_are_consistent(
        (local, remotes) in federation_strategy(),
        from in 0u64..20,
        limit in 1u64..8,
    ) {
        let federation = build(local, &remotes);
        let request = window(from, limit, true);
        let result = run(&federation, request);

        let url = Url::parse("http://gateway.test/tools").unwrap();
        let page = PageBuilder::new(url, request).build(result.items, result.count);

        prop_assert_eq!(page.next_page.is_some(), from + limit < page.count);
        prop_assert_eq!(page.prev_page.is_some(), from > 0 && page.count > 0);

        if let Some(next) = page.next_page {
            let next_from = from + limit;
            let expected_suffix = format!("from={next_from}&limit={limit}");
            prop_assert!(next.as_str().ends_with(&expected_suffix));

            // following next then prev lands back on the original window
            let next_request = window(next_from, limit, true);
            let next_page = PageBuilder::new(next.clone(), next_request)
                .build(Vec::<Item>::new(), page.count);
            let prev = next_page.prev_page.unwrap();
            prop_assert_eq!(prev.as_str(), page.self_link.as_str());
        }
    }
}
