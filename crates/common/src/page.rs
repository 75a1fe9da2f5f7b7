use serde::{Deserialize, Serialize};
use url::Url;

use crate::window::WindowRequest;

/// Wire envelope of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub from: u64,
    pub limit: u64,
    pub count: u64,
    #[serde(rename = "self")]
    pub self_link: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_page: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<Url>,
    pub elements: Vec<T>,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Builds a [`Page`] and its navigation links for one window.
///
/// Only the `from`, `limit` and `allNodes` query parameters are
///  rewritten; scheme, host and path come from the request URL.
#[derive(Debug, Clone)]
pub struct PageBuilder {
    base: Url,
    window: WindowRequest,
}

impl PageBuilder {
    pub fn new(mut request_url: Url, window: WindowRequest) -> Self {
        request_url.set_query(None);
        request_url.set_fragment(None);
        Self {
            base: request_url,
            window,
        }
    }

    pub fn window(&self) -> WindowRequest {
        self.window
    }

    pub fn build<T>(&self, elements: Vec<T>, count: u64) -> Page<T> {
        let WindowRequest { from, limit, .. } = self.window;

        let next_page = (from.saturating_add(limit) < count).then(|| self.link(from + limit));
        let prev_page = (from > 0 && count > 0).then(|| self.link(from.saturating_sub(limit)));

        Page {
            from,
            limit,
            count,
            self_link: self.link(from),
            prev_page,
            next_page,
            elements,
        }
    }

    fn link(&self, from: u64) -> Url {
        let mut url = self.base.clone();
        let query = if self.window.all_nodes {
            format!("allNodes=true&from={}&limit={}", from, self.window.limit)
        } else {
            format!("from={}&limit={}", from, self.window.limit)
        };
        url.set_query(Some(&query));
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn builder(from: i64, limit: i64, all_nodes: bool) -> PageBuilder {
        let url = Url::parse("http://testserver/allocations?from=9&limit=9&foo=bar#frag").unwrap();
        PageBuilder::new(url, WindowRequest::new(from, limit, all_nodes).unwrap())
    }

    #[test]
    fn test_links_for_federated_window() {
        let page = builder(1, 2, true).build(vec!["a", "b"], 4);

        assert_eq!(
            page.self_link.as_str(),
            "http://testserver/allocations?allNodes=true&from=1&limit=2"
        );
        assert_eq!(
            page.next_page.unwrap().as_str(),
            "http://testserver/allocations?allNodes=true&from=3&limit=2"
        );
        assert_eq!(
            page.prev_page.unwrap().as_str(),
            "http://testserver/allocations?allNodes=true&from=0&limit=2"
        );
    }

    #[test_case(0, 2, 4, true, false ; "first page")]
    #[test_case(2, 2, 4, false, true ; "exact last page")]
    #[test_case(3, 2, 4, false, true ; "partial last page")]
    #[test_case(0, 100, 0, false, false ; "empty")]
    #[test_case(10, 5, 0, false, false ; "beyond empty data")]
    #[test_case(10, 5, 4, false, true ; "beyond end")]
    fn test_link_presence(from: i64, limit: i64, count: u64, next: bool, prev: bool) {
        let page = builder(from, limit, false).build(Vec::<()>::new(), count);
        assert_eq!(page.next_page.is_some(), next);
        assert_eq!(page.prev_page.is_some(), prev);
    }

    #[test]
    fn test_prev_clamps_to_zero() {
        let page = builder(1, 5, false).build(vec![1], 3);
        assert_eq!(
            page.prev_page.unwrap().as_str(),
            "http://testserver/allocations?from=0&limit=5"
        );
    }

    #[test]
    fn test_absent_links_are_omitted_on_the_wire() {
        let page = builder(0, 10, false).build(vec![1, 2], 2);
        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("nextPage").is_none());
        assert!(json.get("prevPage").is_none());
        assert_eq!(json["self"], "http://testserver/allocations?from=0&limit=10");
        assert_eq!(json["count"], 2);
    }
}
