//! Cursor pagination with a page cap

use crate::error::UpstreamError;
use crate::types::SearchPage;
use std::future::Future;

/// Why page collection stopped
#[derive(Debug)]
pub(crate) enum PageEnd {
    /// The source returned no further page token
    Exhausted,
    /// The page cap was reached while the source still offered a token
    Capped,
    /// A page request failed; items from earlier pages are kept
    Failed(UpstreamError),
}

/// Items collected across pages
#[derive(Debug)]
pub(crate) struct Paged<T> {
    pub items: Vec<T>,
    pub pages: usize,
    pub end: PageEnd,
}

/// Fetch pages until the token runs out, a request fails, or `max_pages` pages
/// have been consumed
///
/// `fetch` receives the token of the page to load (`None` for the first one).
/// Empty tokens are treated as absent.
pub(crate) async fn collect_pages<T, F, Fut>(max_pages: usize, mut fetch: F) -> Paged<T>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<SearchPage<T>, UpstreamError>>,
{
    let max_pages = max_pages.max(1);
    let mut items = Vec::new();
    let mut token: Option<String> = None;
    let mut pages = 0;

    loop {
        let page = match fetch(token.take()).await {
            Ok(page) => page,
            Err(e) => {
                return Paged {
                    items,
                    pages,
                    end: PageEnd::Failed(e),
                };
            }
        };
        pages += 1;
        items.extend(page.items);

        let end = match page.next_page_token.filter(|t| !t.is_empty()) {
            None => PageEnd::Exhausted,
            Some(_) if pages >= max_pages => PageEnd::Capped,
            Some(next) => {
                token = Some(next);
                continue;
            }
        };
        return Paged { items, pages, end };
    }
}
